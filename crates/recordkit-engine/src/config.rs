//! Compiler configuration
//!
//! Loaded from the `[config]` table of a schema file or built in code. Every
//! flag defaults to the permissive, source-compatible behavior.

use serde::{Deserialize, Serialize};

/// Order of the merged field list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrder {
    /// Sorted by name. Generated repr and comparison tuples follow this order,
    /// so declaration order never matters; the initializer is keyword-only.
    #[default]
    Alphabetical,
    /// Inherited fields first in their base order, then new fields as declared
    Declaration,
}

/// Record compiler settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Field ordering of generated methods
    pub field_order: FieldOrder,
    /// Reject `order` requested without `eq`
    pub strict_order: bool,
    /// Reject init-excluded fields without a default at registration time
    /// instead of failing on first read
    pub eager_undefined_check: bool,
}

impl CompilerConfig {
    /// Every strictness check enabled, alphabetical order kept
    pub fn strict() -> Self {
        Self {
            field_order: FieldOrder::Alphabetical,
            strict_order: true,
            eager_undefined_check: true,
        }
    }
}
