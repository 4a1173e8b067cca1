//! Per-class transform specification

use std::rc::Rc;

use crate::compiler::collect::collect_fields;
use crate::compiler::Capabilities;
use crate::config::CompilerConfig;
use crate::decl::ClassDecl;
use crate::error::{RecordError, RecordResult};
use crate::field::Field;

/// What happens to the hash slot of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashDecision {
    /// Nothing generated, hashing inherited (identity by default)
    Inherit,
    /// Hashing explicitly disabled, instances are unhashable
    Disable,
    /// Hash generated from the hash-eligible fields
    Generate,
}

impl HashDecision {
    /// Decision table: `unsafe_hash` wins, otherwise it depends on eq and frozen
    pub fn decide(eq: bool, frozen: bool, unsafe_hash: bool) -> Self {
        if unsafe_hash {
            return HashDecision::Generate;
        }
        match (eq, frozen) {
            (false, _) => HashDecision::Inherit,
            (true, false) => HashDecision::Disable,
            (true, true) => HashDecision::Generate,
        }
    }
}

/// Everything the synthesizer needs to know about one class
#[derive(Debug, Clone)]
pub struct TransformSpec {
    /// Generate the initializer
    pub init: bool,
    /// The class defines its own construction hook
    pub post_init: bool,
    /// Generate the representation
    pub repr: bool,
    /// Generate equality
    pub eq: bool,
    /// Generate `<`
    pub lt: bool,
    /// Generate `<=`
    pub le: bool,
    /// Generate `>`
    pub gt: bool,
    /// Generate `>=`
    pub ge: bool,
    /// Setters and deleters fail
    pub frozen: bool,
    /// Hash slot outcome, `None` when the class defines its own hash
    pub hash: Option<HashDecision>,
    /// Merged field list
    pub fields: Rc<[Field]>,
    /// Requested capabilities skipped because the class defines them
    pub suppressed: Vec<&'static str>,
}

impl TransformSpec {
    /// Derive the spec for `decl`
    pub fn derive(
        decl: &ClassDecl,
        capabilities: &Capabilities,
        config: &CompilerConfig,
    ) -> RecordResult<Self> {
        if config.strict_order && capabilities.order && !capabilities.eq {
            return Err(RecordError::OrderWithoutEq(decl.name().to_string()));
        }

        let fields = collect_fields(decl, config.field_order)?;
        if config.eager_undefined_check {
            if let Some(field) = fields.iter().find(|f| !f.init && !f.has_default()) {
                return Err(RecordError::UndefinedField {
                    class: decl.name().to_string(),
                    field: field.name.clone(),
                });
            }
        }

        let mut suppressed = Vec::new();
        let mut wanted = |requested: bool, dunder: &'static str| {
            if requested && decl.defines(dunder) {
                suppressed.push(dunder);
                return false;
            }
            requested
        };

        let init = wanted(capabilities.init, "__init__");
        let repr = wanted(capabilities.repr, "__repr__");
        let eq = wanted(capabilities.eq, "__eq__");
        let lt = wanted(capabilities.order, "__lt__");
        let le = wanted(capabilities.order, "__le__");
        let gt = wanted(capabilities.order, "__gt__");
        let ge = wanted(capabilities.order, "__ge__");
        let decision = HashDecision::decide(
            capabilities.eq,
            capabilities.frozen,
            capabilities.unsafe_hash,
        );
        let hash = wanted(decision != HashDecision::Inherit, "__hash__").then_some(decision);

        Ok(Self {
            init,
            post_init: decl.defines("__post_init__"),
            repr,
            eq,
            lt,
            le,
            gt,
            ge,
            frozen: capabilities.frozen,
            hash,
            fields: Rc::from(fields),
            suppressed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_decision_table() {
        assert_eq!(HashDecision::decide(false, false, false), HashDecision::Inherit);
        assert_eq!(HashDecision::decide(false, true, false), HashDecision::Inherit);
        assert_eq!(HashDecision::decide(true, false, false), HashDecision::Disable);
        assert_eq!(HashDecision::decide(true, true, false), HashDecision::Generate);
        assert_eq!(HashDecision::decide(false, false, true), HashDecision::Generate);
        assert_eq!(HashDecision::decide(true, false, true), HashDecision::Generate);
    }

    #[test]
    fn test_user_methods_suppress_generation() {
        let decl = ClassDecl::new("Point")
            .attr("x", 0)
            .init(|_, _| Ok(()))
            .repr(|_| Ok("P".to_string()))
            .lt(|_, _| Ok(false));
        let caps = Capabilities {
            order: true,
            ..Capabilities::default()
        };
        let spec = TransformSpec::derive(&decl, &caps, &CompilerConfig::default()).unwrap();

        assert!(!spec.init);
        assert!(!spec.repr);
        assert!(spec.eq);
        assert!(!spec.lt);
        assert!(spec.le && spec.gt && spec.ge);
        assert_eq!(spec.suppressed, vec!["__init__", "__repr__", "__lt__"]);
        assert_eq!(spec.hash, Some(HashDecision::Disable));
    }

    #[test]
    fn test_user_hash_is_kept() {
        let decl = ClassDecl::new("Point").hash(|_| Ok(7));
        let caps = Capabilities {
            frozen: true,
            ..Capabilities::default()
        };
        let spec = TransformSpec::derive(&decl, &caps, &CompilerConfig::default()).unwrap();
        assert_eq!(spec.hash, None);
        assert_eq!(spec.suppressed, vec!["__hash__"]);
    }

    #[test]
    fn test_post_init_detected_on_own_namespace() {
        let decl = ClassDecl::new("Scene").post_init(|_| Ok(()));
        let spec =
            TransformSpec::derive(&decl, &Capabilities::default(), &CompilerConfig::default())
                .unwrap();
        assert!(spec.post_init);
    }

    #[test]
    fn test_order_without_eq() {
        let caps = Capabilities {
            eq: false,
            order: true,
            ..Capabilities::default()
        };
        let decl = ClassDecl::new("Loose").attr("x", 1);

        let spec = TransformSpec::derive(&decl, &caps, &CompilerConfig::default()).unwrap();
        assert!(!spec.eq);
        assert!(spec.lt);

        let err = TransformSpec::derive(&decl, &caps, &CompilerConfig::strict()).unwrap_err();
        assert_eq!(err, RecordError::OrderWithoutEq("Loose".to_string()));
    }

    #[test]
    fn test_eager_undefined_check() {
        use crate::field::make_field;

        let decl = ClassDecl::new("Scene").field("mesh", make_field().init(false));
        let lazy =
            TransformSpec::derive(&decl, &Capabilities::default(), &CompilerConfig::default());
        assert!(lazy.is_ok());

        let err = TransformSpec::derive(&decl, &Capabilities::default(), &CompilerConfig::strict())
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::UndefinedField {
                class: "Scene".to_string(),
                field: "mesh".to_string()
            }
        );
    }
}
