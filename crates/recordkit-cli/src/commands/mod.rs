//! Subcommand implementations

pub mod check;
pub mod describe;
pub mod new;

use std::path::Path;

use anyhow::{anyhow, bail, Context};
use recordkit_engine::{parse_literal, Class, ClassRegistry, SchemaFile, Value};

/// Load and compile a schema file
pub fn load_registry(path: &Path) -> anyhow::Result<ClassRegistry> {
    let schema = SchemaFile::from_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    schema
        .compile()
        .with_context(|| format!("failed to compile {}", path.display()))
}

/// Look up a record by name
pub fn find_record<'a>(registry: &'a ClassRegistry, name: &str) -> anyhow::Result<&'a Class> {
    registry.get_by_name(name).ok_or_else(|| {
        let known: Vec<&str> = registry.iter().map(Class::name).collect();
        anyhow!("no record named '{}' (declared: {})", name, known.join(", "))
    })
}

/// Parse a `name=value` argument
pub fn parse_assignment(text: &str) -> anyhow::Result<(String, Value)> {
    let Some((name, value)) = text.split_once('=') else {
        bail!("expected NAME=VALUE, got '{}'", text);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("missing field name in '{}'", text);
    }
    let value = parse_literal(value).with_context(|| format!("invalid value for '{name}'"))?;
    Ok((name.to_string(), value))
}

/// Parse every `name=value` argument, in order
pub fn parse_assignments(items: &[String]) -> anyhow::Result<Vec<(String, Value)>> {
    items.iter().map(|item| parse_assignment(item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let (name, value) = parse_assignment("x=3").unwrap();
        assert_eq!(name, "x");
        assert_eq!(value, Value::Int(3));

        let (name, value) = parse_assignment("title = intro").unwrap();
        assert_eq!(name, "title");
        assert_eq!(value, Value::str("intro"));

        let (_, value) = parse_assignment("expr=a=b").unwrap();
        assert_eq!(value, Value::str("a=b"));
    }

    #[test]
    fn test_parse_assignment_errors() {
        assert!(parse_assignment("x").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn test_find_record_lists_known_names() {
        let registry: ClassRegistry = "[[record]]\nname = \"Point\"\n"
            .parse::<SchemaFile>()
            .unwrap()
            .compile()
            .unwrap();
        assert!(find_record(&registry, "Point").is_ok());
        let err = find_record(&registry, "Line").unwrap_err();
        assert!(err.to_string().contains("Point"));
    }
}
