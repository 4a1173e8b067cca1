//! Error types for record compilation and instance operations

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors raised while compiling a record class or operating on its instances
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// Setter or deleter invoked on a field of a frozen record
    #[error("cannot assign to field '{0}' of a frozen record")]
    ImmutableField(String),

    /// `replace` override naming a field the record does not declare
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// `replace` override naming a field excluded from the initializer
    #[error("Cannot replace field defined with init=false: {0}")]
    NonInitField(String),

    /// Read of an attribute that was never assigned (or was deleted)
    #[error("'{class}' object has no attribute '{name}'")]
    MissingAttribute {
        /// Class of the instance
        class: String,
        /// Attribute name
        name: String,
    },

    /// Field declared with both a default value and a default factory
    #[error("field '{0}' cannot specify both a default value and a default factory")]
    ConflictingDefaults(String),

    /// Initializer called without a required keyword argument
    #[error("{class}() missing required keyword argument '{name}'")]
    MissingArgument {
        /// Class being constructed
        class: String,
        /// Missing parameter
        name: String,
    },

    /// Initializer called with a keyword it does not accept
    #[error("{class}() got an unexpected keyword argument '{name}'")]
    UnexpectedArgument {
        /// Class being constructed
        class: String,
        /// Offending keyword
        name: String,
    },

    /// Hash requested on a record whose hashing was disabled
    #[error("unhashable record type: '{0}'")]
    Unhashable(String),

    /// Ordering requested between values with no defined order
    #[error("ordering not supported between instances of '{left}' and '{right}'")]
    Unorderable {
        /// Type name of the left operand
        left: String,
        /// Type name of the right operand
        right: String,
    },

    /// Init-excluded field with no default, rejected at registration time
    #[error("field '{field}' of '{class}' is excluded from init and has no default")]
    UndefinedField {
        /// Record being compiled
        class: String,
        /// Field without an initial value
        field: String,
    },

    /// `order` requested without `eq` while strict ordering is configured
    #[error("record '{0}' requests order without eq")]
    OrderWithoutEq(String),

    /// Introspection on a class that was never compiled as a record
    #[error("'{0}' is not a record class")]
    NotARecord(String),

    /// Call of a method the class does not define
    #[error("'{class}' has no method '{name}'")]
    NoSuchMethod {
        /// Class searched
        class: String,
        /// Method name
        name: String,
    },

    /// Failure reported by user-supplied code (hooks, methods, factories)
    #[error("{0}")]
    Hook(String),
}
