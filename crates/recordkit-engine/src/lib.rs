//! Recordkit Engine
//!
//! Declarative record classes with a synthesized object protocol:
//! - **Declarations**: ordered class bodies with fields, methods and
//!   hand-written protocol methods (`decl` module)
//! - **Compiler**: field collection, transform derivation and method
//!   synthesis (`compiler` module)
//! - **Object model**: classes, instances and dynamic values (`object`,
//!   `value` modules)
//! - **Introspection**: `is_record`, `fields_of` and `replace` (`reflect`
//!   module)
//! - **Schema files**: records declared in TOML (`schema` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use recordkit_engine::{make_field, make_record, Args, Capabilities, ClassDecl, Value};
//!
//! let point = make_record(Capabilities::default()).apply(
//!     ClassDecl::new("Point")
//!         .attr("x", 0)
//!         .field("tags", make_field().default_factory(Value::empty_list)),
//! )?;
//!
//! let p = point.instantiate(Args::new().with("x", 3))?;
//! assert_eq!(p.repr()?, "Point(tags=[], x=3)");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Dynamic values stored in record slots
pub mod value;

/// Field descriptors and resolved fields
pub mod field;

/// Class declarations
pub mod decl;

/// Classes, instances and method tables
pub mod object;

/// Record compiler
pub mod compiler;

/// Field metadata and introspection
pub mod reflect;

// ============================================================================
// Support Modules
// ============================================================================

/// Compiler configuration
pub mod config;

/// Error types
pub mod error;

/// Class registry
pub mod registry;

/// TOML schema files
pub mod schema;

// ============================================================================
// Re-exports
// ============================================================================

pub use compiler::{make_record, Capabilities, HashDecision, RecordDecorator, TransformSpec};
pub use config::{CompilerConfig, FieldOrder};
pub use decl::{ClassDecl, Member, ProtocolMethod};
pub use error::{RecordError, RecordResult};
pub use field::{make_field, Field, FieldDefault, FieldDescriptor, HashPolicy, TypeInfo};
pub use object::{Args, Class, Instance, MethodTable, ParamDefault, Parameter};
pub use reflect::{fields_of, is_record, replace, ClassMetadata, RecordLike};
pub use registry::ClassRegistry;
pub use schema::{parse_literal, SchemaError, SchemaFile};
pub use value::{ListRef, Value};
