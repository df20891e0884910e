//! Built-in operators.
//!
//! A process-wide, read-only table maps operator atoms to descriptors:
//! declared arity plus the native handler emitted code reaches through an
//! indirect call. Handlers observe the register contract in
//! [`crate::jit::trampoline`] and operate on the evaluation stack.
//!
//! Handlers never unwind: there are no unwind tables for the JIT frames
//! below them. A handler that fails poisons the stack and returns; every
//! handler starts by bailing out if the stack is already poisoned.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::jit::memory::ExecutableRegion;
use crate::jit::trampoline::EvalStack;
use crate::jit::RuntimeError;
use crate::object::Object;

/// Native handler signature: evaluation stack in RDI, owning region in RSI.
pub type BuiltinFn = unsafe extern "C" fn(*mut EvalStack, *const ExecutableRegion);

/// Descriptor for one built-in operator.
pub struct Builtin {
    /// Operator atom as it appears in source.
    pub name: &'static str,
    /// Exact child count its call sites must have.
    pub arity: usize,
    /// Native handler reached by indirect call.
    pub handler: BuiltinFn,
}

static TABLE: Lazy<FxHashMap<&'static str, Builtin>> = Lazy::new(|| {
    let mut table = FxHashMap::default();
    for builtin in [
        Builtin {
            name: "+",
            arity: 2,
            handler: builtin_add,
        },
        Builtin {
            name: "*",
            arity: 2,
            handler: builtin_mul,
        },
        Builtin {
            name: "print",
            arity: 1,
            handler: builtin_print,
        },
    ] {
        table.insert(builtin.name, builtin);
    }
    table
});

/// Resolve an operator atom against the table.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    TABLE.get(name)
}

/// Hidden built-in: push `region.immediate(index)` onto the stack.
///
/// This is the sole path by which literals reach the runtime; the index
/// argument arrives in RDX, baked into the instruction stream at
/// compile time.
pub(crate) unsafe extern "C" fn push_immediate(
    stack: *mut EvalStack,
    region: *const ExecutableRegion,
    index: u32,
) {
    let stack = &mut *stack;
    if stack.is_poisoned() {
        return;
    }
    let region = &*region;
    stack.push(region.immediate(index).clone());
}

/// `+` — pop two operands, push their sum as a decimal atom.
unsafe extern "C" fn builtin_add(stack: *mut EvalStack, _region: *const ExecutableRegion) {
    binary_integer(&mut *stack, i64::wrapping_add);
}

/// `*` — pop two operands, push their product as a decimal atom.
unsafe extern "C" fn builtin_mul(stack: *mut EvalStack, _region: *const ExecutableRegion) {
    binary_integer(&mut *stack, i64::wrapping_mul);
}

/// `print` — write the top element in its textual form, newline-terminated,
/// leaving the element in place as the result.
unsafe extern "C" fn builtin_print(stack: *mut EvalStack, _region: *const ExecutableRegion) {
    let stack = &mut *stack;
    if stack.is_poisoned() {
        return;
    }
    match stack.top() {
        Some(object) => println!("{object}"),
        None => stack.poison(RuntimeError::StackUnderflow),
    }
}

fn binary_integer(stack: &mut EvalStack, op: fn(i64, i64) -> i64) {
    if stack.is_poisoned() {
        return;
    }
    let Some(rhs) = stack.pop() else {
        return stack.poison(RuntimeError::StackUnderflow);
    };
    let Some(lhs) = stack.pop() else {
        return stack.poison(RuntimeError::StackUnderflow);
    };
    match (parse_integer(&lhs), parse_integer(&rhs)) {
        (Ok(a), Ok(b)) => stack.push(Object::Atom(op(a, b).to_string())),
        (Err(error), _) | (_, Err(error)) => stack.poison(error),
    }
}

/// Operands are re-parsed from their decimal form on every operation; atoms
/// that do not parse, and list operands, are type errors.
fn parse_integer(object: &Object) -> Result<i64, RuntimeError> {
    match object {
        Object::Atom(payload) => payload
            .parse::<i64>()
            .map_err(|_| RuntimeError::Type(payload.clone())),
        Object::List(list) => Err(RuntimeError::Type(list.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn stack_of(payloads: &[&str]) -> EvalStack {
        let mut stack = EvalStack::new();
        for payload in payloads {
            stack.push(Object::atom(*payload));
        }
        stack
    }

    #[test]
    fn test_table_entries() {
        for (name, arity) in [("+", 2), ("*", 2), ("print", 1)] {
            let builtin = lookup(name).expect("in table");
            assert_eq!(builtin.name, name);
            assert_eq!(builtin.arity, arity);
        }
        assert!(lookup("-").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_add() {
        let mut stack = stack_of(&["1", "2"]);
        unsafe { builtin_add(&mut stack, ptr::null()) };
        assert_eq!(stack.finish().expect("sum"), Object::atom("3"));
    }

    #[test]
    fn test_add_negative_operands() {
        let mut stack = stack_of(&["-5", "3"]);
        unsafe { builtin_add(&mut stack, ptr::null()) };
        assert_eq!(stack.finish().expect("sum"), Object::atom("-2"));
    }

    #[test]
    fn test_mul() {
        let mut stack = stack_of(&["6", "7"]);
        unsafe { builtin_mul(&mut stack, ptr::null()) };
        assert_eq!(stack.finish().expect("product"), Object::atom("42"));
    }

    #[test]
    fn test_print_leaves_value_in_place() {
        let mut stack = stack_of(&["42"]);
        unsafe { builtin_print(&mut stack, ptr::null()) };
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.finish().expect("value kept"), Object::atom("42"));
    }

    #[test]
    fn test_non_numeric_operand_poisons() {
        let mut stack = stack_of(&["pelican", "2"]);
        unsafe { builtin_add(&mut stack, ptr::null()) };
        assert!(stack.is_poisoned());
        let err = stack.finish().expect_err("type fault");
        assert!(matches!(err, RuntimeError::Type(atom) if atom == "pelican"));
    }

    #[test]
    fn test_list_operand_poisons() {
        let mut stack = EvalStack::new();
        stack.push(Object::list("", vec![Object::atom("1")]));
        stack.push(Object::atom("2"));
        unsafe { builtin_add(&mut stack, ptr::null()) };
        assert!(matches!(
            stack.finish(),
            Err(RuntimeError::Type(text)) if text == "(1)"
        ));
    }

    #[test]
    fn test_poisoned_stack_is_left_alone() {
        let mut stack = stack_of(&["1", "2"]);
        stack.poison(RuntimeError::Type("x".into()));
        unsafe {
            builtin_add(&mut stack, ptr::null());
            builtin_print(&mut stack, ptr::null());
        }
        // Operands untouched, original fault preserved.
        assert_eq!(stack.len(), 2);
        let err = stack.finish().expect_err("still poisoned");
        assert!(matches!(err, RuntimeError::Type(atom) if atom == "x"));
    }

    #[test]
    fn test_underflow_poisons() {
        let mut stack = stack_of(&["1"]);
        unsafe { builtin_add(&mut stack, ptr::null()) };
        assert!(matches!(
            stack.finish(),
            Err(RuntimeError::StackUnderflow)
        ));
    }

    #[test]
    fn test_wrapping_arithmetic() {
        let mut stack = stack_of(&[&i64::MAX.to_string(), "1"]);
        unsafe { builtin_add(&mut stack, ptr::null()) };
        assert_eq!(
            stack.finish().expect("wraps"),
            Object::Atom(i64::MIN.to_string())
        );
    }

    #[test]
    fn test_push_immediate_clones_from_region() {
        let region = make_region(vec![Object::atom("11"), Object::atom("22")]);
        let mut stack = EvalStack::new();
        unsafe {
            push_immediate(&mut stack, &region, 1);
            push_immediate(&mut stack, &region, 0);
        }
        assert_eq!(stack.pop(), Some(Object::atom("11")));
        assert_eq!(stack.pop(), Some(Object::atom("22")));
    }

    #[test]
    fn test_push_immediate_respects_poison() {
        let region = make_region(vec![Object::atom("1")]);
        let mut stack = EvalStack::new();
        stack.poison(RuntimeError::StackUnderflow);
        unsafe { push_immediate(&mut stack, &region, 0) };
        assert!(stack.is_empty());
    }

    fn make_region(immediates: Vec<Object>) -> ExecutableRegion {
        // A lone `ret`; the region is only used as an immediates holder.
        ExecutableRegion::new(&[0xC3], immediates).expect("mappable")
    }
}
