//! Record compiler
//!
//! Turns a [`ClassDecl`] into a record class in three steps:
//! 1. collect the merged field list (inherited fields, then own fields)
//! 2. derive a [`TransformSpec`] from the requested capabilities
//! 3. synthesize the method table from the spec
//!
//! ```text
//! ClassDecl ──► collect ──► TransformSpec ──► synth ──► Class + ClassMetadata
//! ```

mod collect;
mod synth;
mod transform;

pub use transform::{HashDecision, TransformSpec};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CompilerConfig;
use crate::decl::ClassDecl;
use crate::error::RecordResult;
use crate::object::{Class, MethodTable};
use crate::reflect::ClassMetadata;

/// Capabilities requested for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Generate a keyword-only initializer
    pub init: bool,
    /// Generate `ClassName(f=v, ...)` representation
    pub repr: bool,
    /// Generate equality over the compare-eligible fields
    pub eq: bool,
    /// Generate `<`, `<=`, `>`, `>=`
    pub order: bool,
    /// Generate a hash regardless of `eq` and `frozen`
    pub unsafe_hash: bool,
    /// Field setters and deleters fail
    pub frozen: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            init: true,
            repr: true,
            eq: true,
            order: false,
            unsafe_hash: false,
            frozen: false,
        }
    }
}

/// Record class decorator, see [`make_record`]
#[derive(Debug, Clone, Default)]
pub struct RecordDecorator {
    capabilities: Capabilities,
    config: CompilerConfig,
}

/// Create a decorator that compiles class declarations into records
pub fn make_record(capabilities: Capabilities) -> RecordDecorator {
    RecordDecorator::new(capabilities)
}

impl RecordDecorator {
    /// Decorator with the default compiler configuration
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            config: CompilerConfig::default(),
        }
    }

    /// Replace the compiler configuration
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Requested capabilities
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Compiler configuration
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `decl` into a record class
    pub fn apply(&self, decl: ClassDecl) -> RecordResult<Class> {
        let spec = TransformSpec::derive(&decl, &self.capabilities, &self.config)?;

        let mut methods = MethodTable::from_namespace(&decl);
        synth::install(&mut methods, &spec, decl.post_init_hook());
        let metadata = ClassMetadata::new(spec.fields.to_vec());

        debug!(
            record = decl.name(),
            fields = metadata.len(),
            generated = ?methods.generated(),
            suppressed = ?spec.suppressed,
            frozen = spec.frozen,
            "compiled record"
        );

        Ok(Class::assemble(decl, methods, Some(metadata), spec.frozen))
    }
}
