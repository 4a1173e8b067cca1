//! `recordkit describe`: fields, initializer and generated methods of a record.

use std::path::Path;

use recordkit_engine::{fields_of, Field, FieldDefault};

use super::{find_record, load_registry};
use crate::output::StyledOutput;

fn default_text(field: &Field) -> String {
    match &field.default {
        FieldDefault::Missing => "MISSING".to_string(),
        FieldDefault::Value(value) => value.to_string(),
        FieldDefault::Factory(_) => "<factory>".to_string(),
    }
}

fn flags(field: &Field) -> String {
    let mut flags = Vec::new();
    if field.init {
        flags.push("init");
    }
    if field.repr {
        flags.push("repr");
    }
    if field.compare {
        flags.push("compare");
    }
    if field.contributes_to_hash() {
        flags.push("hash");
    }
    flags.join(",")
}

pub fn execute(schema: &Path, record: &str, out: &mut StyledOutput) -> anyhow::Result<()> {
    let registry = load_registry(schema)?;
    let class = find_record(&registry, record)?;

    out.bold(class.name());
    if let Some(base) = class.base() {
        out.dim(&format!(" ({})", base.name()));
    }
    if class.is_frozen() {
        out.info(" frozen");
    }
    out.newline();

    out.bold("fields:");
    out.newline();
    for field in fields_of(class)? {
        out.plain(&format!("  {:<16}", field.name));
        out.info(&format!("{:<10}", field.type_info.name));
        out.plain(&format!("{:<14}", default_text(&field)));
        out.dim(&flags(&field));
        out.newline();
    }

    out.bold("init: ");
    match class.signature() {
        Some(params) => {
            let params: Vec<String> = params.iter().map(ToString::to_string).collect();
            out.plain(&format!("{}(*, {})", class.name(), params.join(", ")));
        }
        None => out.dim("hand-written"),
    }
    out.newline();

    out.bold("generated: ");
    let generated = class.methods().generated();
    if generated.is_empty() {
        out.dim("none");
    } else {
        out.plain(&generated.join(", "));
    }
    out.newline();
    out.flush();
    Ok(())
}
