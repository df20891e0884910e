//! Lark Language Engine
//!
//! This crate provides the complete Lark implementation:
//! - **Reader**: S-expression text to object trees (`reader` module)
//! - **Objects**: the atom/list data model and its textual form (`object` module)
//! - **Built-ins**: the operator table and native handlers (`builtins` module)
//! - **JIT**: code generation straight to executable x86-64 (`jit` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use lark_engine::{jit, reader, Object};
//!
//! let Object::List(program) = reader::read("(+ 1 2)")? else {
//!     unreachable!()
//! };
//! let region = jit::compile(&program)?;
//! assert_eq!(region.invoke()?.to_string(), "3");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Object module: the atom/list data model
pub mod object;

/// Reader module: S-expression text to object trees
pub mod reader;

/// Builtins module: operator table and native handlers
pub mod builtins;

/// JIT module: code generation, executable memory, runtime contract
pub mod jit;

pub use jit::{compile, CompileError, ExecutableRegion, RuntimeError};
pub use object::{List, Object};
pub use reader::{read, read_all, ReadError};
