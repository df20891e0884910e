//! Code generation: program tree to x86-64 instruction stream.
//!
//! The tree is walked in post-order with an explicit frame stack (deep
//! programs must not overflow the host call stack). Each literal child
//! becomes an entry in the immediates table plus a call to the hidden
//! `push_immediate` built-in; each completed list becomes an indirect call
//! to its operator's built-in. Operands therefore reach the evaluation
//! stack strictly left to right, and every list is fully reduced before its
//! parent's operator runs.

use crate::builtins;
use crate::object::{List, Object};

use super::emitter::Emitter;
use super::CompileError;

/// A list mid-traversal: the frame is *entering* while its cursor sits on a
/// list child about to be descended into, *iterating* while the cursor
/// advances over literals, and *finishing* once the cursor is past the end
/// and the operator call is emitted.
struct Frame<'tree> {
    list: &'tree List,
    cursor: usize,
}

/// Drives an [`Emitter`] over a program tree.
#[derive(Debug, Default)]
pub struct CodeGenerator {
    asm: Emitter,
    immediates: Vec<Object>,
}

impl CodeGenerator {
    /// Fresh generator with an empty stream and immediates table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower `program` to machine code, yielding the instruction stream and
    /// the immediates table it references.
    pub fn generate(mut self, program: &List) -> Result<(Vec<u8>, Vec<Object>), CompileError> {
        self.emit_prologue();

        let mut frames = vec![Frame {
            list: program,
            cursor: 0,
        }];
        while let Some(frame) = frames.last_mut() {
            let list = frame.list;
            let cursor = frame.cursor;

            if cursor == list.children.len() {
                self.emit_operator_call(list)?;
                frames.pop();
                if let Some(parent) = frames.last_mut() {
                    parent.cursor += 1;
                }
                continue;
            }

            match &list.children[cursor] {
                Object::List(inner) if inner.is_call() => frames.push(Frame {
                    list: inner,
                    cursor: 0,
                }),
                literal => {
                    frame.cursor += 1;
                    self.emit_push_immediate(literal)?;
                }
            }
        }

        self.emit_epilogue();
        Ok((self.asm.into_bytes(), self.immediates))
    }

    /// Conventional frame setup. Entry arguments already sit in RDI and RSI
    /// and stay there between calls; each call site saves and restores them.
    fn emit_prologue(&mut self) {
        self.asm.push_rbp();
        self.asm.mov_rbp_rsp();
    }

    fn emit_epilogue(&mut self) {
        self.asm.pop_rbp();
        self.asm.ret();
    }

    /// Intern a literal and emit the call that pushes it at run time.
    fn emit_push_immediate(&mut self, literal: &Object) -> Result<(), CompileError> {
        if self.immediates.len() >= u32::MAX as usize {
            return Err(CompileError::ImmediatesOverflow);
        }
        let index = self.immediates.len() as u32;
        self.immediates.push(literal.clone());
        self.emit_call(builtins::push_immediate as usize, Some(index));
        Ok(())
    }

    /// Resolve a completed list's operator and emit its call.
    fn emit_operator_call(&mut self, list: &List) -> Result<(), CompileError> {
        let builtin = builtins::lookup(&list.operator)
            .ok_or_else(|| CompileError::UnknownOperator(list.operator.clone()))?;
        if builtin.arity != list.children.len() {
            return Err(CompileError::ArityMismatch {
                operator: list.operator.clone(),
                expected: builtin.arity,
                found: list.children.len(),
            });
        }
        self.emit_call(builtin.handler as usize, None);
        Ok(())
    }

    /// The indirect-call sequence of the runtime contract: save the entry
    /// registers, set the index argument if any, align RSP, call through
    /// RAX, undo.
    fn emit_call(&mut self, target: usize, immediate_index: Option<u32>) {
        self.asm.push_rdi();
        self.asm.push_rsi();
        if let Some(index) = immediate_index {
            self.asm.mov_edx_imm32(index);
        }
        let padded = !self.asm.depth_is_odd();
        if padded {
            self.asm.sub_rsp_8();
        }
        self.asm.mov_rax_imm64(target as u64);
        self.asm.call_rax();
        if padded {
            self.asm.add_rsp_8();
        }
        self.asm.pop_rsi();
        self.asm.pop_rdi();
    }
}
