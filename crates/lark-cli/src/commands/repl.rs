//! `lark repl` — Interactive REPL.
//!
//! Line editing with history and multi-line input: a line with unbalanced
//! open parens switches to a continuation prompt until the form closes.

use lark_engine::{jit, reader, Object};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = "lark> ";
const CONTINUATION_PROMPT: &str = "  ... ";

pub fn execute() -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;

    // Load history if it exists
    let history_path =
        std::env::var_os("HOME").map(|home| std::path::PathBuf::from(home).join(".lark_history"));
    if let Some(ref path) = history_path {
        let _ = editor.load_history(path);
    }

    println!("Lark v{} REPL", env!("CARGO_PKG_VERSION"));
    println!("Type an S-expression, Ctrl-D to quit\n");

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() {
            PROMPT
        } else {
            CONTINUATION_PROMPT
        };

        match editor.readline(prompt) {
            Ok(line) => {
                if buffer.is_empty() && line.trim().is_empty() {
                    continue;
                }
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if is_incomplete(&buffer) {
                    continue;
                }

                let code = std::mem::take(&mut buffer);
                let _ = editor.add_history_entry(&code);

                match eval_form(&code) {
                    Ok(result) => println!("{result}"),
                    Err(err) => eprintln!("error: {err:#}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(ref path) = history_path {
        let _ = editor.save_history(path);
    }
    Ok(())
}

fn eval_form(code: &str) -> anyhow::Result<Object> {
    match reader::read(code)? {
        Object::List(list) => Ok(jit::compile(&list)?.invoke()?),
        // Bare atoms evaluate to themselves.
        Object::Atom(atom) => Ok(Object::Atom(atom)),
    }
}

/// More `(` than `)` so far, ignoring `;` comments: keep reading lines.
fn is_incomplete(source: &str) -> bool {
    let mut depth = 0i64;
    let mut in_comment = false;
    for ch in source.chars() {
        match ch {
            '\n' => in_comment = false,
            _ if in_comment => {}
            ';' => in_comment = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth > 0
}
