//! Class declarations
//!
//! A [`ClassDecl`] is the ordered namespace of a class body. Entries are
//! classified when the class is compiled into a record:
//!
//! - [`Member::Descriptor`] entries are fields, named after their entry.
//! - [`Member::Value`] entries are fields whose fixed default is the value,
//!   unless the entry name is dunder (`__x`).
//! - Callables, dunder-named entries and the ignored kinds (class methods,
//!   static methods, properties) are not fields.
//!
//! Protocol methods (`__init__`, `__repr__`, ...) are stored under their
//! dunder names; a record never overwrites one the class defines itself.

use std::rc::Rc;

use crate::error::RecordResult;
use crate::field::FieldDescriptor;
use crate::object::{
    Args, Class, ClassMethodFn, CompareFn, HashFn, InitFn, Instance, MethodFn, MethodTable,
    PostInitFn, PropertyFn, ReprFn, StaticMethodFn,
};
use crate::value::Value;

/// Hand-written object-protocol method
#[derive(Clone)]
pub enum ProtocolMethod {
    /// `__init__`
    Init(InitFn),
    /// `__post_init__`, the construction hook
    PostInit(PostInitFn),
    /// `__repr__`
    Repr(ReprFn),
    /// `__eq__`
    Eq(CompareFn),
    /// `__lt__`
    Lt(CompareFn),
    /// `__le__`
    Le(CompareFn),
    /// `__gt__`
    Gt(CompareFn),
    /// `__ge__`
    Ge(CompareFn),
    /// `__hash__`
    Hash(HashFn),
}

impl ProtocolMethod {
    /// Dunder name the method is stored under
    pub fn dunder_name(&self) -> &'static str {
        match self {
            ProtocolMethod::Init(_) => "__init__",
            ProtocolMethod::PostInit(_) => "__post_init__",
            ProtocolMethod::Repr(_) => "__repr__",
            ProtocolMethod::Eq(_) => "__eq__",
            ProtocolMethod::Lt(_) => "__lt__",
            ProtocolMethod::Le(_) => "__le__",
            ProtocolMethod::Gt(_) => "__gt__",
            ProtocolMethod::Ge(_) => "__ge__",
            ProtocolMethod::Hash(_) => "__hash__",
        }
    }
}

/// One entry of a class namespace
#[derive(Clone)]
pub enum Member {
    /// Explicit field descriptor
    Descriptor(FieldDescriptor),
    /// Plain class attribute
    Value(Value),
    /// Instance method
    Method(MethodFn),
    /// Class method (ignored kind)
    ClassMethod(ClassMethodFn),
    /// Static method (ignored kind)
    StaticMethod(StaticMethodFn),
    /// Computed property (ignored kind)
    Property(PropertyFn),
    /// Object-protocol method
    Protocol(ProtocolMethod),
}

/// Whether a namespace entry name is dunder
pub(crate) fn is_dunder(name: &str) -> bool {
    name.starts_with("__")
}

/// Ordered class body
#[derive(Clone)]
pub struct ClassDecl {
    name: String,
    base: Option<Class>,
    members: Vec<(String, Member)>,
}

impl ClassDecl {
    /// Start a class body
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base: None,
            members: Vec::new(),
        }
    }

    /// Set the base class
    pub fn extends(mut self, base: &Class) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Add a namespace entry; re-declaring a name replaces it in place
    pub fn member(mut self, name: &str, member: Member) -> Self {
        match self.members.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = member,
            None => self.members.push((name.to_string(), member)),
        }
        self
    }

    /// Declare a field with an explicit descriptor
    pub fn field(self, name: &str, descriptor: FieldDescriptor) -> Self {
        self.member(name, Member::Descriptor(descriptor))
    }

    /// Declare a plain class attribute
    pub fn attr(self, name: &str, value: impl Into<Value>) -> Self {
        self.member(name, Member::Value(value.into()))
    }

    /// Declare an instance method
    pub fn method(
        self,
        name: &str,
        f: impl Fn(&Instance, &[Value]) -> RecordResult<Value> + 'static,
    ) -> Self {
        self.member(name, Member::Method(Rc::new(f)))
    }

    /// Declare a class method
    pub fn class_method(
        self,
        name: &str,
        f: impl Fn(&Class, &[Value]) -> RecordResult<Value> + 'static,
    ) -> Self {
        self.member(name, Member::ClassMethod(Rc::new(f)))
    }

    /// Declare a static method
    pub fn static_method(
        self,
        name: &str,
        f: impl Fn(&[Value]) -> RecordResult<Value> + 'static,
    ) -> Self {
        self.member(name, Member::StaticMethod(Rc::new(f)))
    }

    /// Declare a computed property
    pub fn property(
        self,
        name: &str,
        f: impl Fn(&Instance) -> RecordResult<Value> + 'static,
    ) -> Self {
        self.member(name, Member::Property(Rc::new(f)))
    }

    /// Declare an object-protocol method under its dunder name
    pub fn protocol(self, method: ProtocolMethod) -> Self {
        let name = method.dunder_name();
        self.member(name, Member::Protocol(method))
    }

    /// Hand-written initializer
    pub fn init(self, f: impl Fn(&Instance, &Args) -> RecordResult<()> + 'static) -> Self {
        self.protocol(ProtocolMethod::Init(Rc::new(f)))
    }

    /// Construction hook run at the end of a generated initializer
    pub fn post_init(self, f: impl Fn(&Instance) -> RecordResult<()> + 'static) -> Self {
        self.protocol(ProtocolMethod::PostInit(Rc::new(f)))
    }

    /// Hand-written representation
    pub fn repr(self, f: impl Fn(&Instance) -> RecordResult<String> + 'static) -> Self {
        self.protocol(ProtocolMethod::Repr(Rc::new(f)))
    }

    /// Hand-written equality
    pub fn eq(
        self,
        f: impl Fn(&Instance, &Instance) -> RecordResult<bool> + 'static,
    ) -> Self {
        self.protocol(ProtocolMethod::Eq(Rc::new(f)))
    }

    /// Hand-written `<`
    pub fn lt(
        self,
        f: impl Fn(&Instance, &Instance) -> RecordResult<bool> + 'static,
    ) -> Self {
        self.protocol(ProtocolMethod::Lt(Rc::new(f)))
    }

    /// Hand-written hash
    pub fn hash(self, f: impl Fn(&Instance) -> RecordResult<u64> + 'static) -> Self {
        self.protocol(ProtocolMethod::Hash(Rc::new(f)))
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base class, if any
    pub fn base(&self) -> Option<&Class> {
        self.base.as_ref()
    }

    /// Namespace entries in declaration order
    pub fn members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(name, member)| (name.as_str(), member))
    }

    /// Whether the namespace itself defines `name` (bases are not consulted)
    pub fn defines(&self, name: &str) -> bool {
        self.members.iter().any(|(n, _)| n == name)
    }

    /// The class's own construction hook
    pub(crate) fn post_init_hook(&self) -> Option<PostInitFn> {
        self.members.iter().find_map(|(_, member)| match member {
            Member::Protocol(ProtocolMethod::PostInit(hook)) => Some(hook.clone()),
            _ => None,
        })
    }

    pub(crate) fn into_parts(self) -> (String, Option<Class>, Vec<(String, Member)>) {
        (self.name, self.base, self.members)
    }

    /// Finish as a plain class, no record synthesis
    pub fn finish(self) -> Class {
        let methods = MethodTable::from_namespace(&self);
        Class::assemble(self, methods, None, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::make_field;

    #[test]
    fn test_redeclaration_replaces_in_place() {
        let decl = ClassDecl::new("Point")
            .attr("x", 1)
            .attr("y", 2)
            .field("x", make_field().default(5));

        let names: Vec<&str> = decl.members().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert!(matches!(
            decl.members().next().map(|(_, m)| m),
            Some(Member::Descriptor(_))
        ));
    }

    #[test]
    fn test_protocol_methods_use_dunder_names() {
        let decl = ClassDecl::new("Point")
            .repr(|_| Ok("P".to_string()))
            .post_init(|_| Ok(()));

        assert!(decl.defines("__repr__"));
        assert!(decl.defines("__post_init__"));
        assert!(!decl.defines("__init__"));
        assert!(decl.post_init_hook().is_some());
    }

    #[test]
    fn test_dunder_names() {
        assert!(is_dunder("__slots__"));
        assert!(!is_dunder("_private"));
    }
}
