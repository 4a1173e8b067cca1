//! Field collection: class namespace plus inherited fields

use crate::config::FieldOrder;
use crate::decl::{is_dunder, ClassDecl, Member};
use crate::error::RecordResult;
use crate::field::Field;

/// Merge the base's fields with the fields declared in `decl`.
///
/// Fields are deduplicated by name, a redeclaration replacing the inherited
/// field at its original position. With [`FieldOrder::Alphabetical`] the
/// merged list is then sorted by name.
pub(crate) fn collect_fields(decl: &ClassDecl, order: FieldOrder) -> RecordResult<Vec<Field>> {
    let mut fields: Vec<Field> = decl
        .base()
        .and_then(|base| base.metadata())
        .map(|metadata| metadata.fields().to_vec())
        .unwrap_or_default();

    for (name, member) in decl.members() {
        let field = match member {
            Member::Descriptor(descriptor) => descriptor.clone().into_field(name)?,
            Member::Value(value) if !is_dunder(name) => Field::with_default(name, value.clone()),
            // dunder values, callables and ignored kinds
            Member::Value(_)
            | Member::Method(_)
            | Member::ClassMethod(_)
            | Member::StaticMethod(_)
            | Member::Property(_)
            | Member::Protocol(_) => continue,
        };
        match fields.iter_mut().find(|f| f.name == field.name) {
            Some(slot) => *slot = field,
            None => fields.push(field),
        }
    }

    if order == FieldOrder::Alphabetical {
        fields.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(fields)
}
