//! Field declarations and resolved field metadata

use std::fmt;
use std::rc::Rc;

use crate::error::{RecordError, RecordResult};
use crate::value::Value;

/// Zero-argument producer of a field's initial value
pub type DefaultFactory = Rc<dyn Fn() -> Value>;

/// Declared type of a field (informational, never enforced)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Type name
    pub name: String,
}

impl TypeInfo {
    /// Create a named type
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// The unconstrained type used when nothing was declared
    pub fn object() -> Self {
        Self::named("object")
    }
}

impl Default for TypeInfo {
    fn default() -> Self {
        Self::object()
    }
}

/// Per-field rule for hash participation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashPolicy {
    /// Hash the field iff it takes part in comparisons
    #[default]
    FollowCompare,
    /// Always hash the field
    Always,
    /// Never hash the field
    Never,
}

impl HashPolicy {
    /// Policy from an optional flag, absent means follow compare
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => HashPolicy::FollowCompare,
            Some(true) => HashPolicy::Always,
            Some(false) => HashPolicy::Never,
        }
    }

    /// Whether a field with this policy contributes to the hash
    pub fn contributes(self, compare: bool) -> bool {
        match self {
            HashPolicy::FollowCompare => compare,
            HashPolicy::Always => true,
            HashPolicy::Never => false,
        }
    }
}

/// Where a field's initial value comes from when the caller omits it
#[derive(Clone, Default)]
pub enum FieldDefault {
    /// No default: the argument is required (or the slot stays unset)
    #[default]
    Missing,
    /// Fixed value, shared by every instance
    Value(Value),
    /// Factory invoked once per constructed instance
    Factory(DefaultFactory),
}

impl FieldDefault {
    /// Check for `Missing`
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldDefault::Missing)
    }

    /// Produce an initial value, invoking the factory if there is one
    pub fn produce(&self) -> Option<Value> {
        match self {
            FieldDefault::Missing => None,
            FieldDefault::Value(value) => Some(value.clone()),
            FieldDefault::Factory(factory) => Some(factory()),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::Missing => write!(f, "Missing"),
            FieldDefault::Value(value) => write!(f, "Value({value:?})"),
            FieldDefault::Factory(_) => write!(f, "Factory(..)"),
        }
    }
}

/// Field descriptor used in class declarations, see [`make_field`]
#[derive(Clone)]
pub struct FieldDescriptor {
    type_info: TypeInfo,
    default: Option<Value>,
    default_factory: Option<DefaultFactory>,
    init: bool,
    repr: bool,
    compare: bool,
    hash: HashPolicy,
}

/// Explicitly declare a field.
///
/// Every capability defaults to enabled and the hash policy follows
/// `compare`. Setting both a default value and a default factory is
/// rejected when the descriptor is resolved into a [`Field`].
pub fn make_field() -> FieldDescriptor {
    FieldDescriptor::new()
}

// `default` is a builder setter here, so no `Default` impl
#[allow(clippy::new_without_default)]
impl FieldDescriptor {
    /// Descriptor with every capability enabled and no default
    pub fn new() -> Self {
        Self {
            type_info: TypeInfo::object(),
            default: None,
            default_factory: None,
            init: true,
            repr: true,
            compare: true,
            hash: HashPolicy::FollowCompare,
        }
    }

    /// Set the declared type
    pub fn type_info(mut self, type_info: TypeInfo) -> Self {
        self.type_info = type_info;
        self
    }

    /// Set a fixed default value
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set a default factory
    pub fn default_factory(mut self, factory: impl Fn() -> Value + 'static) -> Self {
        self.default_factory = Some(Rc::new(factory));
        self
    }

    /// Set a shared default factory
    pub fn default_factory_rc(mut self, factory: DefaultFactory) -> Self {
        self.default_factory = Some(factory);
        self
    }

    /// Include the field in the initializer's parameters
    pub fn init(mut self, init: bool) -> Self {
        self.init = init;
        self
    }

    /// Include the field in the representation
    pub fn repr(mut self, repr: bool) -> Self {
        self.repr = repr;
        self
    }

    /// Include the field in equality and ordering
    pub fn compare(mut self, compare: bool) -> Self {
        self.compare = compare;
        self
    }

    /// Set the hash policy
    pub fn hash(mut self, policy: HashPolicy) -> Self {
        self.hash = policy;
        self
    }

    /// Resolve into a named field
    pub fn into_field(self, name: &str) -> RecordResult<Field> {
        let default = match (self.default, self.default_factory) {
            (Some(_), Some(_)) => return Err(RecordError::ConflictingDefaults(name.to_string())),
            (Some(value), None) => FieldDefault::Value(value),
            (None, Some(factory)) => FieldDefault::Factory(factory),
            (None, None) => FieldDefault::Missing,
        };
        Ok(Field {
            name: name.to_string(),
            type_info: self.type_info,
            default,
            init: self.init,
            repr: self.repr,
            compare: self.compare,
            hash: self.hash,
        })
    }
}

/// One declared attribute of a record type
#[derive(Clone)]
pub struct Field {
    /// Field name, unique within the record's merged field set
    pub name: String,
    /// Declared type
    pub type_info: TypeInfo,
    /// Initial value source
    pub default: FieldDefault,
    /// Parameter of the generated initializer
    pub init: bool,
    /// Part of the generated representation
    pub repr: bool,
    /// Part of generated equality and ordering
    pub compare: bool,
    /// Hash participation rule
    pub hash: HashPolicy,
}

impl Field {
    /// Field created from a plain class attribute: its value is the default
    pub(crate) fn with_default(name: &str, value: Value) -> Self {
        Self {
            name: name.to_string(),
            type_info: TypeInfo::object(),
            default: FieldDefault::Value(value),
            init: true,
            repr: true,
            compare: true,
            hash: HashPolicy::FollowCompare,
        }
    }

    /// Whether the field contributes to the generated hash
    pub fn contributes_to_hash(&self) -> bool {
        self.hash.contributes(self.compare)
    }

    /// Internal storage name backing the accessors
    pub fn storage_name(&self) -> String {
        format!("_{}", self.name)
    }

    /// Whether the field has a default value or factory
    pub fn has_default(&self) -> bool {
        !self.default.is_missing()
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("type", &self.type_info.name)
            .field("default", &self.default)
            .field("init", &self.init)
            .field("repr", &self.repr)
            .field("compare", &self.compare)
            .field("hash", &self.hash)
            .finish()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            FieldDefault::Value(value) => write!(f, "Field('{}', {})", self.name, value),
            _ => write!(f, "Field('{}', MISSING)", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults() {
        let field = make_field().into_field("x").unwrap();
        assert_eq!(field.name, "x");
        assert!(field.init && field.repr && field.compare);
        assert_eq!(field.hash, HashPolicy::FollowCompare);
        assert!(!field.has_default());
        assert_eq!(field.type_info.name, "object");
        assert_eq!(field.storage_name(), "_x");
    }

    #[test]
    fn test_conflicting_defaults_rejected() {
        let err = make_field()
            .default(1)
            .default_factory(|| Value::Int(2))
            .into_field("both")
            .unwrap_err();
        assert_eq!(err, RecordError::ConflictingDefaults("both".to_string()));
    }

    #[test]
    fn test_hash_policy() {
        let follow = make_field().compare(false).into_field("a").unwrap();
        assert!(!follow.contributes_to_hash());

        let always = make_field()
            .compare(false)
            .hash(HashPolicy::Always)
            .into_field("b")
            .unwrap();
        assert!(always.contributes_to_hash());

        let never = make_field().hash(HashPolicy::Never).into_field("c").unwrap();
        assert!(!never.contributes_to_hash());

        assert_eq!(HashPolicy::from_flag(Some(true)), HashPolicy::Always);
        assert_eq!(HashPolicy::from_flag(None), HashPolicy::FollowCompare);
    }

    #[test]
    fn test_factory_produces_fresh_values() {
        let field = make_field()
            .default_factory(Value::empty_list)
            .into_field("items")
            .unwrap();
        let a = field.default.produce().unwrap();
        let b = field.default.produce().unwrap();
        assert!(!a.as_list().unwrap().ptr_eq(b.as_list().unwrap()));
    }

    #[test]
    fn test_display_and_equality_by_name() {
        let x = make_field().default(0).into_field("x").unwrap();
        let y = make_field().into_field("y").unwrap();
        assert_eq!(x.to_string(), "Field('x', 0)");
        assert_eq!(y.to_string(), "Field('y', MISSING)");

        let other_x = make_field().default(9).into_field("x").unwrap();
        assert_eq!(x, other_x);
        assert_ne!(x, y);
    }
}
