//! `recordkit new`: construct an instance and print it.

use std::path::Path;

use recordkit_engine::{replace, Args, Instance};
use tracing::debug;

use super::{find_record, load_registry, parse_assignments};
use crate::output::StyledOutput;

fn print_instance(label: &str, instance: &Instance, out: &mut StyledOutput) -> anyhow::Result<()> {
    out.dim(&format!("{label:>8} "));
    out.plain(&instance.repr()?);
    out.newline();

    out.dim(&format!("{:>8} ", "hash"));
    match instance.hash() {
        Ok(hash) => out.info(&format!("{hash:#018x}")),
        Err(err) => out.warning(&err.to_string()),
    }
    out.newline();
    Ok(())
}

pub fn execute(
    schema: &Path,
    record: &str,
    set: &[String],
    overrides: &[String],
    out: &mut StyledOutput,
) -> anyhow::Result<()> {
    let registry = load_registry(schema)?;
    let class = find_record(&registry, record)?;

    let args: Args = parse_assignments(set)?.into_iter().collect();
    debug!(record, args = args.len(), "constructing instance");
    let instance = class.instantiate(args)?;
    print_instance("new", &instance, out)?;

    if !overrides.is_empty() {
        let copy = replace(&instance, parse_assignments(overrides)?)?;
        print_instance("replaced", &copy, out)?;
        out.dim(&format!("{:>8} ", "equal"));
        out.plain(&instance.equals(&copy)?.to_string());
        out.newline();
    }
    out.flush();
    Ok(())
}
