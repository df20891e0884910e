//! `lark eval` — Evaluate an inline expression.

use lark_engine::reader;

use super::run::run_form;

pub fn execute(code: &str, no_print: bool) -> anyhow::Result<()> {
    let form = reader::read(code)?;
    let result = run_form(&form)?;
    if !no_print {
        println!("{result}");
    }
    Ok(())
}
