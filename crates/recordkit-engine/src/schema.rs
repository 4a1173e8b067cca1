//! Record schema files
//!
//! Records can be declared in TOML instead of code:
//!
//! ```toml
//! [config]
//! field_order = "alphabetical"
//!
//! [[record]]
//! name = "Camera"
//! frozen = true
//!
//! [[record.field]]
//! name = "fov"
//! type = "float"
//! default = 75.0
//!
//! [[record.field]]
//! name = "targets"
//! default_factory = "list"
//! compare = false
//! ```
//!
//! A record may `extend` any record declared earlier in the same file.

use std::path::Path;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::compiler::{make_record, Capabilities};
use crate::config::CompilerConfig;
use crate::decl::ClassDecl;
use crate::error::RecordError;
use crate::field::{make_field, FieldDescriptor, HashPolicy, TypeInfo};
use crate::registry::ClassRegistry;
use crate::value::Value;

/// Errors that can occur while loading or compiling a schema file
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Failed to read schema file
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse schema: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid schema: {0}")]
    Invalid(String),

    /// A record failed to compile
    #[error("record '{name}': {source}")]
    Record {
        /// Record being compiled
        name: String,
        /// Compiler error
        #[source]
        source: RecordError,
    },
}

/// Schema file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    /// Compiler settings shared by every record in the file
    #[serde(default)]
    pub config: CompilerConfig,

    /// Record declarations, in dependency order
    #[serde(default, rename = "record")]
    pub records: Vec<RecordSpec>,
}

/// One `[[record]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RecordSpec {
    /// Class name
    pub name: String,

    /// Base record, declared earlier in the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Generate the initializer (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<bool>,

    /// Generate the representation (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repr: Option<bool>,

    /// Generate equality (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<bool>,

    /// Generate ordering (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<bool>,

    /// Force hash generation (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsafe_hash: Option<bool>,

    /// Reject field assignment after construction (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen: Option<bool>,

    /// Own fields, in declaration order
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldSpec>,
}

/// One `[[record.field]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Field name
    pub name: String,

    /// Informational type name
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Fixed default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<toml::Value>,

    /// Default factory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_factory: Option<FactoryKind>,

    /// Initializer parameter
    #[serde(default = "default_true")]
    pub init: bool,

    /// Part of the representation
    #[serde(default = "default_true")]
    pub repr: bool,

    /// Part of equality and ordering
    #[serde(default = "default_true")]
    pub compare: bool,

    /// Hash participation, absent to follow `compare`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<bool>,
}

fn default_true() -> bool {
    true
}

/// Built-in default factories available to schema files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactoryKind {
    /// Fresh empty list
    List,
    /// Empty tuple
    Tuple,
    /// Empty string
    Str,
    /// Zero
    Int,
    /// Zero point zero
    Float,
    /// `None`
    #[serde(rename = "none")]
    Null,
}

impl FactoryKind {
    /// Produce a fresh value
    pub fn produce(self) -> Value {
        match self {
            FactoryKind::List => Value::empty_list(),
            FactoryKind::Tuple => Value::tuple(Vec::new()),
            FactoryKind::Str => Value::str(""),
            FactoryKind::Int => Value::Int(0),
            FactoryKind::Float => Value::Float(0.0),
            FactoryKind::Null => Value::None,
        }
    }
}

impl RecordSpec {
    /// Requested capabilities, unset flags taking their defaults
    pub fn capabilities(&self) -> Capabilities {
        let defaults = Capabilities::default();
        Capabilities {
            init: self.init.unwrap_or(defaults.init),
            repr: self.repr.unwrap_or(defaults.repr),
            eq: self.eq.unwrap_or(defaults.eq),
            order: self.order.unwrap_or(defaults.order),
            unsafe_hash: self.unsafe_hash.unwrap_or(defaults.unsafe_hash),
            frozen: self.frozen.unwrap_or(defaults.frozen),
        }
    }
}

impl FieldSpec {
    /// Field descriptor for this entry
    pub fn descriptor(&self) -> Result<FieldDescriptor, SchemaError> {
        let mut descriptor = make_field()
            .init(self.init)
            .repr(self.repr)
            .compare(self.compare)
            .hash(HashPolicy::from_flag(self.hash));
        if let Some(type_name) = &self.type_name {
            descriptor = descriptor.type_info(TypeInfo::named(type_name));
        }
        if let Some(default) = &self.default {
            descriptor = descriptor.default(value_from_toml(default)?);
        }
        if let Some(kind) = self.default_factory {
            descriptor = descriptor.default_factory(move || kind.produce());
        }
        Ok(descriptor)
    }
}

impl SchemaFile {
    /// Parse a schema from a file
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Validate names and declaration order
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = FxHashSet::default();
        for record in &self.records {
            if !is_valid_identifier(&record.name) {
                return Err(SchemaError::Invalid(format!(
                    "Invalid record name: '{}'",
                    record.name
                )));
            }
            if let Some(base) = &record.extends {
                if !seen.contains(base.as_str()) {
                    return Err(SchemaError::Invalid(format!(
                        "Record '{}' extends '{}', which is not declared before it",
                        record.name, base
                    )));
                }
            }
            if !seen.insert(record.name.as_str()) {
                return Err(SchemaError::Invalid(format!(
                    "Duplicate record: '{}'",
                    record.name
                )));
            }

            let mut fields = FxHashSet::default();
            for field in &record.fields {
                if !is_valid_identifier(&field.name) || field.name.starts_with("__") {
                    return Err(SchemaError::Invalid(format!(
                        "Invalid field name '{}' in record '{}'",
                        field.name, record.name
                    )));
                }
                if !fields.insert(field.name.as_str()) {
                    return Err(SchemaError::Invalid(format!(
                        "Duplicate field '{}' in record '{}'",
                        field.name, record.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Look up a record entry by name
    pub fn record(&self, name: &str) -> Option<&RecordSpec> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Compile every record, in file order
    pub fn compile(&self) -> Result<ClassRegistry, SchemaError> {
        let mut registry = ClassRegistry::new();
        for record in &self.records {
            let mut decl = ClassDecl::new(&record.name);
            if let Some(base) = &record.extends {
                let base = registry.get_by_name(base).ok_or_else(|| {
                    SchemaError::Invalid(format!("Unknown base record: '{base}'"))
                })?;
                decl = decl.extends(base);
            }
            for field in &record.fields {
                decl = decl.field(&field.name, field.descriptor()?);
            }

            let class = make_record(record.capabilities())
                .with_config(self.config.clone())
                .apply(decl)
                .map_err(|source| SchemaError::Record {
                    name: record.name.clone(),
                    source,
                })?;
            registry.register(class);
        }
        debug!(records = registry.len(), "compiled schema");
        Ok(registry)
    }
}

impl FromStr for SchemaFile {
    type Err = SchemaError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let schema: SchemaFile = toml::from_str(content)?;
        schema.validate()?;
        Ok(schema)
    }
}

/// Convert a TOML value. Arrays become lists; tables are rejected.
pub fn value_from_toml(value: &toml::Value) -> Result<Value, SchemaError> {
    Ok(match value {
        toml::Value::String(s) => Value::str(s),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::str(&dt.to_string()),
        toml::Value::Array(items) => Value::list(
            items
                .iter()
                .map(value_from_toml)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        toml::Value::Table(_) => {
            return Err(SchemaError::Invalid(
                "Tables are not supported as field values".to_string(),
            ))
        }
    })
}

/// Parse a command-line literal: `none`, or any TOML value, falling back to
/// a bare string
pub fn parse_literal(text: &str) -> Result<Value, SchemaError> {
    let text = text.trim();
    if text == "none" || text == "None" {
        return Ok(Value::None);
    }
    match toml::from_str::<toml::Table>(&format!("value = {text}")) {
        Ok(table) => match table.get("value") {
            Some(value) => value_from_toml(value),
            None => Ok(Value::str(text)),
        },
        Err(_) => Ok(Value::str(text)),
    }
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
