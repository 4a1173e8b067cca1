//! `recordkit check`: compile every record in a schema file.

use std::path::Path;

use recordkit_engine::is_record;

use super::load_registry;
use crate::output::StyledOutput;

pub fn execute(schema: &Path, out: &mut StyledOutput) -> anyhow::Result<()> {
    let registry = load_registry(schema)?;

    for class in registry.iter() {
        let fields = class.metadata().map_or(0, |m| m.len());
        out.success("  ok ");
        out.bold(class.name());
        if let Some(base) = class.base().filter(|base| is_record(*base)) {
            out.dim(&format!(" extends {}", base.name()));
        }
        out.plain(&format!(
            "  {} field{}",
            fields,
            if fields == 1 { "" } else { "s" }
        ));
        if class.is_frozen() {
            out.info("  frozen");
        }
        out.newline();
    }

    if registry.is_empty() {
        out.warning("warning");
        out.plain(&format!(": {} declares no records", schema.display()));
        out.newline();
    } else {
        out.success(&format!("{} record(s) compiled", registry.len()));
        out.newline();
    }
    out.flush();
    Ok(())
}
