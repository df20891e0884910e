//! `lark run` — Compile a source file to native code and execute it.
//!
//! Each top-level form is compiled to its own region and invoked in file
//! order. Output normally comes only from `print` forms; `--results` also
//! echoes every form's result.

use std::path::Path;

use anyhow::Context;
use lark_engine::{jit, reader, Object};

pub fn execute(file: &Path, results: bool) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;

    let forms = reader::read_all(&source)
        .with_context(|| format!("reading forms from {}", file.display()))?;
    anyhow::ensure!(!forms.is_empty(), "{} holds no forms", file.display());

    for form in &forms {
        let result = run_form(form)?;
        if results {
            println!("{result}");
        }
    }
    Ok(())
}

pub(crate) fn run_form(form: &Object) -> anyhow::Result<Object> {
    let Object::List(list) = form else {
        anyhow::bail!("top-level form must be a list, got `{form}`");
    };
    let region = jit::compile(list)?;
    Ok(region.invoke()?)
}
