//! Record introspection
//!
//! Field metadata attached to record classes, plus the free functions that
//! read it: [`is_record`], [`fields_of`] and [`replace`].

use rustc_hash::FxHashMap;

use crate::error::{RecordError, RecordResult};
use crate::field::Field;
use crate::object::{Args, Class, Instance};
use crate::value::Value;

/// Field metadata of a single record class
#[derive(Debug, Clone, Default)]
pub struct ClassMetadata {
    /// Fields in generated-method order
    fields: Vec<Field>,
    /// Field name to index mapping
    field_indices: FxHashMap<String, usize>,
}

impl ClassMetadata {
    /// Build metadata from a merged field list
    pub fn new(fields: Vec<Field>) -> Self {
        let field_indices = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.name.clone(), index))
            .collect();
        Self {
            fields,
            field_indices,
        }
    }

    /// Get a field by name
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.field_indices.get(name).map(|&index| &self.fields[index])
    }

    /// Get field index by name
    pub fn get_field_index(&self, name: &str) -> Option<usize> {
        self.field_indices.get(name).copied()
    }

    /// All fields, in order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Check if field exists
    pub fn has_field(&self, name: &str) -> bool {
        self.field_indices.contains_key(name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names, in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Fields accepted by the generated initializer
    pub fn init_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.init)
    }
}

/// Anything that resolves to a class: a class itself or one of its instances
pub trait RecordLike {
    /// The class to inspect
    fn record_class(&self) -> &Class;
}

impl RecordLike for Class {
    fn record_class(&self) -> &Class {
        self
    }
}

impl RecordLike for Instance {
    fn record_class(&self) -> &Class {
        self.class()
    }
}

/// Whether the class (or the instance's class) was compiled as a record
pub fn is_record(obj: &impl RecordLike) -> bool {
    obj.record_class().metadata().is_some()
}

/// Fields of a record class, in generated-method order
pub fn fields_of(obj: &impl RecordLike) -> RecordResult<Vec<Field>> {
    let class = obj.record_class();
    class
        .metadata()
        .map(|metadata| metadata.fields().to_vec())
        .ok_or_else(|| RecordError::NotARecord(class.name().to_string()))
}

/// Construct a new instance of `instance`'s class from its current
/// init-eligible values, with `overrides` applied.
///
/// Every override is validated before any value is read: a name the record
/// does not declare fails with [`RecordError::UnknownField`], an init-excluded
/// field with [`RecordError::NonInitField`].
pub fn replace<K, V>(
    instance: &Instance,
    overrides: impl IntoIterator<Item = (K, V)>,
) -> RecordResult<Instance>
where
    K: Into<String>,
    V: Into<Value>,
{
    let class = instance.class();
    let metadata = class
        .metadata()
        .ok_or_else(|| RecordError::NotARecord(class.name().to_string()))?;

    let mut args = Args::new();
    let overrides: Vec<(String, Value)> = overrides
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    for (name, value) in overrides {
        match metadata.get(&name) {
            None => return Err(RecordError::UnknownField(name)),
            Some(field) if !field.init => return Err(RecordError::NonInitField(name)),
            Some(_) => args.insert(&name, value),
        }
    }

    for field in metadata.init_fields() {
        if !args.contains(&field.name) {
            args.insert(&field.name, instance.get(&field.name)?);
        }
    }
    class.instantiate(args)
}
