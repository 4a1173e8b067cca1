//! Method synthesis
//!
//! Every generated method is a closure over the class's field list, built
//! once when the record is compiled.

use std::rc::Rc;

use tracing::trace;

use crate::compiler::transform::{HashDecision, TransformSpec};
use crate::error::{RecordError, RecordResult};
use crate::field::{Field, FieldDefault};
use crate::object::{
    Accessor, Args, CompareFn, HashFn, HashSlot, InitFn, Initializer, Instance, MethodTable,
    ParamDefault, Parameter, PostInitFn, ReprFn,
};
use crate::value::{compare_seq_op, hash_tuple, CompareOp, Value};

/// Fill `table` with the methods `spec` asks for
pub(crate) fn install(table: &mut MethodTable, spec: &TransformSpec, post_init: Option<PostInitFn>) {
    for field in spec.fields.iter() {
        table
            .accessors
            .insert(field.name.clone(), accessor(field, spec.frozen));
    }

    if spec.init {
        let hook = if spec.post_init { post_init } else { None };
        table.init = Some(initializer(spec.fields.clone(), hook));
        table.generated.push("__init__".to_string());
    }
    if spec.repr {
        table.repr = Some(repr(spec.fields.clone()));
        table.generated.push("__repr__".to_string());
    }

    let ops = [
        (spec.eq, CompareOp::Eq),
        (spec.lt, CompareOp::Lt),
        (spec.le, CompareOp::Le),
        (spec.gt, CompareOp::Gt),
        (spec.ge, CompareOp::Ge),
    ];
    for (wanted, op) in ops {
        if !wanted {
            continue;
        }
        let method = comparison(&spec.fields, op);
        match op {
            CompareOp::Eq => table.eq = Some(method),
            CompareOp::Lt => table.lt = Some(method),
            CompareOp::Le => table.le = Some(method),
            CompareOp::Gt => table.gt = Some(method),
            CompareOp::Ge => table.ge = Some(method),
        }
        table.generated.push(op.dunder_name().to_string());
    }

    match spec.hash {
        Some(HashDecision::Generate) => {
            table.hash = Some(HashSlot::Compute(hash(&spec.fields)));
            table.generated.push("__hash__".to_string());
        }
        Some(HashDecision::Disable) => {
            table.hash = Some(HashSlot::Disabled);
            table.generated.push("__hash__ = None".to_string());
        }
        Some(HashDecision::Inherit) | None => {}
    }
}

/// Keyword-only initializer over the init-eligible fields
pub(crate) fn initializer(fields: Rc<[Field]>, post_init: Option<PostInitFn>) -> Initializer {
    let parameters: Rc<[Parameter]> = fields
        .iter()
        .filter(|f| f.init)
        .map(|f| Parameter {
            name: f.name.clone(),
            default: match &f.default {
                FieldDefault::Missing => ParamDefault::Required,
                FieldDefault::Value(value) => ParamDefault::Value(value.clone()),
                FieldDefault::Factory(_) => ParamDefault::Factory,
            },
        })
        .collect();

    let body: InitFn = Rc::new(move |instance: &Instance, args: &Args| {
        let class = instance.class().name();
        if let Some(name) = args
            .names()
            .find(|name| !fields.iter().any(|f| f.init && f.name == *name))
        {
            return Err(RecordError::UnexpectedArgument {
                class: class.to_string(),
                name: name.to_string(),
            });
        }
        if let Some(field) = fields
            .iter()
            .find(|f| f.init && f.default.is_missing() && !args.contains(&f.name))
        {
            return Err(RecordError::MissingArgument {
                class: class.to_string(),
                name: field.name.clone(),
            });
        }

        for field in fields.iter() {
            let value = match args.get(&field.name).filter(|_| field.init) {
                Some(value) => Some(value.clone()),
                None => {
                    if let FieldDefault::Factory(_) = field.default {
                        trace!(record = class, field = %field.name, "invoking default factory");
                    }
                    // An init-excluded field without a default stays unset
                    field.default.produce()
                }
            };
            if let Some(value) = value {
                instance.store(&field.name, value);
            }
        }

        if let Some(hook) = &post_init {
            hook(instance)?;
        }
        Ok(())
    });

    Initializer {
        parameters: Some(parameters),
        body,
    }
}

/// Getter/setter/deleter over the field's slot
pub(crate) fn accessor(field: &Field, frozen: bool) -> Accessor {
    let name: Rc<str> = Rc::from(field.name.as_str());

    let getter = {
        let name = name.clone();
        Rc::new(move |instance: &Instance| instance.load_required(&name))
    };
    let setter = {
        let name = name.clone();
        Rc::new(move |instance: &Instance, value: Value| {
            if frozen {
                return Err(RecordError::ImmutableField(name.to_string()));
            }
            instance.store(&name, value);
            Ok(())
        })
    };
    let deleter = Rc::new(move |instance: &Instance| {
        if frozen {
            return Err(RecordError::ImmutableField(name.to_string()));
        }
        instance
            .evict(&name)
            .map(drop)
            .ok_or_else(|| instance.missing(&name))
    });

    Accessor {
        getter,
        setter,
        deleter,
    }
}

/// `ClassName(a=1, b=2)` over the repr-eligible fields
pub(crate) fn repr(fields: Rc<[Field]>) -> ReprFn {
    Rc::new(move |instance: &Instance| {
        let mut parts = Vec::new();
        for field in fields.iter().filter(|f| f.repr) {
            let value = instance.load_required(&field.name)?;
            parts.push(format!("{}={}", field.name, value.repr()?));
        }
        Ok(format!("{}({})", instance.class().name(), parts.join(", ")))
    })
}

/// Compare-eligible values of `instance`, `None` if its record lacks one of
/// the fields
fn field_tuple(instance: &Instance, fields: &[Field]) -> RecordResult<Option<Vec<Value>>> {
    let Some(metadata) = instance.class().metadata() else {
        return Ok(None);
    };
    if !fields.iter().all(|f| metadata.has_field(&f.name)) {
        return Ok(None);
    }
    fields
        .iter()
        .map(|f| instance.load_required(&f.name))
        .collect::<RecordResult<Vec<_>>>()
        .map(Some)
}

/// Tuple comparison over the compare-eligible fields
pub(crate) fn comparison(fields: &[Field], op: CompareOp) -> CompareFn {
    let compared: Rc<[Field]> = fields.iter().filter(|f| f.compare).cloned().collect();

    Rc::new(move |lhs: &Instance, rhs: &Instance| {
        let (Some(left), Some(right)) = (field_tuple(lhs, &compared)?, field_tuple(rhs, &compared)?)
        else {
            return match op {
                CompareOp::Eq => Ok(false),
                _ => Err(RecordError::Unorderable {
                    left: lhs.class().name().to_string(),
                    right: rhs.class().name().to_string(),
                }),
            };
        };
        compare_seq_op(&left, &right, op)
    })
}

/// Hash of the hash-eligible field tuple
pub(crate) fn hash(fields: &[Field]) -> HashFn {
    let hashed: Rc<[Field]> = fields
        .iter()
        .filter(|f| f.contributes_to_hash())
        .cloned()
        .collect();

    Rc::new(move |instance: &Instance| {
        let values = hashed
            .iter()
            .map(|f| instance.load_required(&f.name))
            .collect::<RecordResult<Vec<_>>>()?;
        hash_tuple(&values)
    })
}
