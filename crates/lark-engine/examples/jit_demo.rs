//! Compile a few forms to native code and run them.
//!
//! Run with:
//!   cargo run --example jit_demo
//!
//! Prints each source form, the size of the generated code, and the result.

use lark_engine::{jit, reader, Object};

fn main() {
    let sources = [
        "(+ 1 2)",
        "(* 3 (+ 4 5))",
        "(print (* 2 21))",
        "(+ (+ 1 2) (+ 3 4))",
    ];

    for source in sources {
        let Object::List(program) = reader::read(source).expect("demo source reads") else {
            unreachable!("every demo form is a list");
        };
        let region = jit::compile(&program).expect("demo source compiles");
        let result = region.invoke().expect("demo source runs");
        println!(
            "{source:24} => {result} ({} bytes, {} immediates)",
            region.code().len(),
            region.immediate_count()
        );
    }
}
