//! Object model for Lark programs.
//!
//! A program is a tree of [`Object`]s: atoms (opaque string payloads) and
//! lists (an operator head plus ordered children). The `Display` impl is the
//! external textual form — it is what `print` writes and what the CLI shows.

use std::fmt;

/// A value in a Lark program: either an atom or a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    /// A leaf value carrying an opaque string payload.
    Atom(String),
    /// A compound value: an operator head plus ordered children.
    List(List),
}

/// A compound object.
///
/// The operator is a distinct head field, not the first child. A `List` with
/// an empty operator is a pure literal container and is never itself
/// evaluated as a call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct List {
    /// Operator name; empty for a literal container.
    pub operator: String,
    /// Children in evaluation order (left to right).
    pub children: Vec<Object>,
}

impl Object {
    /// Build an atom from anything string-like.
    pub fn atom(payload: impl Into<String>) -> Self {
        Object::Atom(payload.into())
    }

    /// Build a list with an operator head.
    pub fn list(operator: impl Into<String>, children: Vec<Object>) -> Self {
        Object::List(List {
            operator: operator.into(),
            children,
        })
    }

    /// The atom payload, if this is an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Object::Atom(payload) => Some(payload),
            Object::List(_) => None,
        }
    }

    /// The list, if this is a list.
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Object::Atom(_) => None,
            Object::List(list) => Some(list),
        }
    }
}

impl List {
    /// A list that evaluates as a call carries a non-empty operator.
    pub fn is_call(&self) -> bool {
        !self.operator.is_empty()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Atom(payload) => f.write_str(payload),
            Object::List(list) => list.fmt(f),
        }
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        let mut sep = "";
        if !self.operator.is_empty() {
            f.write_str(&self.operator)?;
            sep = " ";
        }
        for child in &self.children {
            f.write_str(sep)?;
            child.fmt(f)?;
            sep = " ";
        }
        f.write_str(")")
    }
}
