//! JIT compilation for Lark programs.
//!
//! A program tree is walked in post-order and lowered directly to x86-64
//! machine code following the System V AMD64 calling convention:
//! - `emitter` — write-only byte sink with canonical opcode helpers and
//!   call-alignment bookkeeping
//! - `codegen` — tree traversal driving the emitter
//! - `memory` — page-aligned read+execute mapping holding finished code
//! - `trampoline` — the C-ABI contract between emitted code and the host
//!
//! The emitted stream evaluates the tree against a host-owned evaluation
//! stack, calling built-ins through indirect calls. Built-in dispatch is
//! resolved at compile time; there is no interpreter fallback.

pub mod codegen;
pub mod emitter;
pub mod memory;
pub mod trampoline;

pub use codegen::CodeGenerator;
pub use emitter::Emitter;
pub use memory::ExecutableRegion;
pub use trampoline::{EntryFn, EvalStack};

use crate::object::List;

/// Error during code generation or region construction.
///
/// Compile-time failures abort code generation; no partially constructed
/// region is ever observable.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Operator atom not present in the built-in table
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    /// Child count differs from the operator's declared arity
    #[error("operator `{operator}` expects {expected} operand(s), got {found}")]
    ArityMismatch {
        /// Operator whose call site is malformed
        operator: String,
        /// Arity declared in the built-in table
        expected: usize,
        /// Children actually present
        found: usize,
    },

    /// More literals than a 32-bit immediate index can address
    #[error("immediates table overflow")]
    ImmediatesOverflow,

    /// Emitted code cannot fit in a single contiguous mapping
    #[error("generated code too large for one mapping ({0} bytes)")]
    Capacity(usize),

    /// Page size lookup or mapping allocation failed
    #[error("executable mapping failed: {0}")]
    OsResource(std::io::Error),

    /// The mapping could not be marked read+execute
    #[error("could not mark mapping executable: {0}")]
    Permission(std::io::Error),
}

/// Error raised while a compiled region runs.
///
/// Runtime failures leave the region intact; it may be invoked again.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Atom handed to an arithmetic built-in that is not a signed decimal
    /// integer
    #[error("type error: `{0}` is not an integer")]
    Type(String),

    /// A built-in found fewer operands than its arity; emitted code did not
    /// uphold the stack protocol
    #[error("evaluation stack underflow in built-in")]
    StackUnderflow,

    /// Emitted code returned with a stack size other than one
    #[error("evaluation stack holds {0} value(s) on return, expected exactly 1")]
    StackInvariant(usize),
}

/// Compile a program to native code.
///
/// The root must be a call (its operator resolves in the built-in table).
/// The returned region owns both the mapping and the immediates the emitted
/// code references.
pub fn compile(program: &List) -> Result<ExecutableRegion, CompileError> {
    let (code, immediates) = CodeGenerator::new().generate(program)?;
    ExecutableRegion::new(&code, immediates)
}
