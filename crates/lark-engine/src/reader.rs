//! S-expression reader for Lark source text.
//!
//! Converts source text into [`Object`] trees. Tokenization is done with a
//! logos-generated lexer; tree construction uses an explicit stack of open
//! lists so arbitrarily deep input cannot overflow the host call stack.
//!
//! A list whose first element is an atom gets that atom as its operator head;
//! `()` and lists opening with another list get an empty operator and are
//! pure literal containers.

use crate::object::{List, Object};
use logos::Logos;

/// Logos-based token enum for lexing.
///
/// An atom is any run of characters that is not whitespace, a parenthesis,
/// or the start of a `;` line comment.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum Token {
    #[token("(")]
    Open,

    #[token(")")]
    Close,

    #[regex(r"[^()\s;]+")]
    Atom,

    // Whitespace and line comments (skip)
    #[regex(r"[ \t\r\n]+", logos::skip)]
    Whitespace,

    #[regex(r";[^\n]*", logos::skip)]
    Comment,
}

/// Error while reading source text. Positions are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// `)` with no matching `(`
    #[error("unexpected `)` at byte {0}")]
    UnexpectedClose(usize),
    /// `(` still open at end of input
    #[error("unclosed `(` opened at byte {0}")]
    UnclosedParen(usize),
    /// Input held no expression at all
    #[error("no expression in input")]
    Empty,
    /// A complete expression was followed by more tokens
    #[error("trailing input at byte {0}")]
    Trailing(usize),
    /// Lexer could not recognize the input
    #[error("unrecognized input at byte {0}")]
    Unrecognized(usize),
}

/// An open list under construction: elements read so far plus the byte
/// offset of its `(` (for the unclosed-paren diagnostic).
struct Partial {
    elements: Vec<Object>,
    open_at: usize,
}

/// Read exactly one expression; anything after it is an error.
pub fn read(source: &str) -> Result<Object, ReadError> {
    let mut lexer = Token::lexer(source);
    let object = read_form(&mut lexer)?.ok_or(ReadError::Empty)?;
    match lexer.next() {
        None => Ok(object),
        Some(_) => Err(ReadError::Trailing(lexer.span().start)),
    }
}

/// Read every top-level expression in the source, in order.
pub fn read_all(source: &str) -> Result<Vec<Object>, ReadError> {
    let mut lexer = Token::lexer(source);
    let mut forms = Vec::new();
    while let Some(object) = read_form(&mut lexer)? {
        forms.push(object);
    }
    Ok(forms)
}

/// Read the next expression, or `None` at end of input.
fn read_form(lexer: &mut logos::Lexer<'_, Token>) -> Result<Option<Object>, ReadError> {
    let mut open: Vec<Partial> = Vec::new();

    while let Some(token) = lexer.next() {
        let token = token.map_err(|()| ReadError::Unrecognized(lexer.span().start))?;
        let completed = match token {
            Token::Open => {
                open.push(Partial {
                    elements: Vec::new(),
                    open_at: lexer.span().start,
                });
                continue;
            }
            Token::Close => {
                let partial = open
                    .pop()
                    .ok_or(ReadError::UnexpectedClose(lexer.span().start))?;
                close_list(partial.elements)
            }
            Token::Atom => Object::Atom(lexer.slice().to_owned()),
            // logos::skip never yields these
            Token::Whitespace | Token::Comment => continue,
        };
        match open.last_mut() {
            Some(parent) => parent.elements.push(completed),
            None => return Ok(Some(completed)),
        }
    }

    match open.last() {
        Some(partial) => Err(ReadError::UnclosedParen(partial.open_at)),
        None => Ok(None),
    }
}

/// Turn collected elements into a list, promoting a leading atom to the
/// operator head.
fn close_list(elements: Vec<Object>) -> Object {
    let mut iter = elements.into_iter();
    match iter.next() {
        Some(Object::Atom(head)) => Object::List(List {
            operator: head,
            children: iter.collect(),
        }),
        Some(first) => {
            let mut children = vec![first];
            children.extend(iter);
            Object::List(List {
                operator: String::new(),
                children,
            })
        }
        None => Object::List(List::default()),
    }
}
