//! Object model and class system
//!
//! A [`Class`] owns a namespace of user members, a [`MethodTable`] holding
//! object-protocol methods (hand-written or synthesized) and, for records,
//! the field metadata. Method lookup walks the base chain, own table first.
//! An [`Instance`] is a shared handle to a set of named slots.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use rustc_hash::{FxHashMap, FxHasher};

use crate::decl::{ClassDecl, Member, ProtocolMethod};
use crate::error::{RecordError, RecordResult};
use crate::reflect::ClassMetadata;
use crate::value::Value;

/// Global counter for generating unique object IDs
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Global counter for generating unique class IDs
static NEXT_CLASS_ID: AtomicUsize = AtomicUsize::new(1);

fn generate_object_id() -> u64 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

fn generate_class_id() -> usize {
    NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed)
}

/// Ordinary instance method
pub type MethodFn = Rc<dyn Fn(&Instance, &[Value]) -> RecordResult<Value>>;
/// Class-level method, receives the class it was called on
pub type ClassMethodFn = Rc<dyn Fn(&Class, &[Value]) -> RecordResult<Value>>;
/// Static method, receives only its arguments
pub type StaticMethodFn = Rc<dyn Fn(&[Value]) -> RecordResult<Value>>;
/// Computed attribute
pub type PropertyFn = Rc<dyn Fn(&Instance) -> RecordResult<Value>>;
/// Initializer body
pub type InitFn = Rc<dyn Fn(&Instance, &Args) -> RecordResult<()>>;
/// Construction hook run at the end of a generated initializer
pub type PostInitFn = Rc<dyn Fn(&Instance) -> RecordResult<()>>;
/// Representation method
pub type ReprFn = Rc<dyn Fn(&Instance) -> RecordResult<String>>;
/// Binary comparison (`==`, `<`, `<=`, `>`, `>=`)
pub type CompareFn = Rc<dyn Fn(&Instance, &Instance) -> RecordResult<bool>>;
/// Hash method
pub type HashFn = Rc<dyn Fn(&Instance) -> RecordResult<u64>>;
/// Field getter
pub type GetterFn = Rc<dyn Fn(&Instance) -> RecordResult<Value>>;
/// Field setter
pub type SetterFn = Rc<dyn Fn(&Instance, Value) -> RecordResult<()>>;
/// Field deleter
pub type DeleterFn = Rc<dyn Fn(&Instance) -> RecordResult<()>>;

/// Keyword arguments passed to an initializer
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: FxHashMap<String, Value>,
}

impl Args {
    /// Create an empty argument set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument (builder style)
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace an argument
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Get an argument by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Check if an argument was passed
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Argument names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no argument was passed
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Default of one initializer parameter
#[derive(Debug, Clone)]
pub enum ParamDefault {
    /// Caller must pass the argument
    Required,
    /// Fixed default value
    Value(Value),
    /// Unset sentinel: an omitted argument invokes the field's factory
    Factory,
}

/// Keyword-only parameter of a generated initializer
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Parameter (and field) name
    pub name: String,
    /// Default when omitted
    pub default: ParamDefault,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            ParamDefault::Required => write!(f, "{}", self.name),
            ParamDefault::Value(value) => write!(f, "{}={}", self.name, value),
            ParamDefault::Factory => write!(f, "{}=<factory>", self.name),
        }
    }
}

/// Initializer slot
#[derive(Clone)]
pub struct Initializer {
    /// Keyword-only parameters, `None` for a hand-written initializer
    pub(crate) parameters: Option<Rc<[Parameter]>>,
    pub(crate) body: InitFn,
}

/// Hash slot of a method table
#[derive(Clone)]
pub enum HashSlot {
    /// Instances are unhashable
    Disabled,
    /// Hash computed by this function
    Compute(HashFn),
}

/// Getter/setter/deleter triad for one field
#[derive(Clone)]
pub struct Accessor {
    pub(crate) getter: GetterFn,
    pub(crate) setter: SetterFn,
    pub(crate) deleter: DeleterFn,
}

/// Object-protocol methods attached to one class
#[derive(Clone, Default)]
pub struct MethodTable {
    pub(crate) init: Option<Initializer>,
    pub(crate) repr: Option<ReprFn>,
    pub(crate) eq: Option<CompareFn>,
    pub(crate) lt: Option<CompareFn>,
    pub(crate) le: Option<CompareFn>,
    pub(crate) gt: Option<CompareFn>,
    pub(crate) ge: Option<CompareFn>,
    pub(crate) hash: Option<HashSlot>,
    pub(crate) accessors: FxHashMap<String, Accessor>,
    /// Names of synthesized methods, in synthesis order
    pub(crate) generated: Vec<String>,
}

impl MethodTable {
    /// Table holding the hand-written protocol methods of a declaration
    pub(crate) fn from_namespace(decl: &ClassDecl) -> Self {
        let mut table = Self::default();
        for (_, member) in decl.members() {
            let Member::Protocol(method) = member else {
                continue;
            };
            match method {
                ProtocolMethod::Init(body) => {
                    table.init = Some(Initializer {
                        parameters: None,
                        body: body.clone(),
                    })
                }
                ProtocolMethod::Repr(f) => table.repr = Some(f.clone()),
                ProtocolMethod::Eq(f) => table.eq = Some(f.clone()),
                ProtocolMethod::Lt(f) => table.lt = Some(f.clone()),
                ProtocolMethod::Le(f) => table.le = Some(f.clone()),
                ProtocolMethod::Gt(f) => table.gt = Some(f.clone()),
                ProtocolMethod::Ge(f) => table.ge = Some(f.clone()),
                ProtocolMethod::Hash(f) => table.hash = Some(HashSlot::Compute(f.clone())),
                // Only a generated initializer calls the hook
                ProtocolMethod::PostInit(_) => {}
            }
        }
        table
    }

    /// Names of synthesized methods
    pub fn generated(&self) -> &[String] {
        &self.generated
    }

    /// Whether a getter/setter/deleter triad exists for the field
    pub fn has_accessor(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }
}

/// Class definition (cheap shared handle)
#[derive(Clone)]
pub struct Class(Rc<ClassInner>);

struct ClassInner {
    id: usize,
    name: String,
    base: Option<Class>,
    namespace: Vec<(String, Member)>,
    methods: MethodTable,
    metadata: Option<ClassMetadata>,
    frozen: bool,
}

impl Class {
    /// Assemble a class from its declaration and finished method table
    pub(crate) fn assemble(
        decl: ClassDecl,
        methods: MethodTable,
        metadata: Option<ClassMetadata>,
        frozen: bool,
    ) -> Self {
        let (name, base, namespace) = decl.into_parts();
        Class(Rc::new(ClassInner {
            id: generate_class_id(),
            name,
            base,
            namespace,
            methods,
            metadata,
            frozen,
        }))
    }

    /// Unique class ID
    pub fn id(&self) -> usize {
        self.0.id
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Base class, if any
    pub fn base(&self) -> Option<&Class> {
        self.0.base.as_ref()
    }

    /// This class's own method table
    pub fn methods(&self) -> &MethodTable {
        &self.0.methods
    }

    /// Field metadata attached to this class itself
    pub fn own_metadata(&self) -> Option<&ClassMetadata> {
        self.0.metadata.as_ref()
    }

    /// Field metadata, looked up along the base chain
    pub fn metadata(&self) -> Option<&ClassMetadata> {
        self.ancestry().find_map(Class::own_metadata)
    }

    /// Whether field setters and deleters are disabled
    pub fn is_frozen(&self) -> bool {
        self.ancestry()
            .find(|class| class.own_metadata().is_some())
            .is_some_and(|class| class.0.frozen)
    }

    /// Whether the class's own namespace defines `name`
    pub fn defines(&self, name: &str) -> bool {
        self.0.namespace.iter().any(|(n, _)| n == name)
    }

    /// Whether `self` is `other` or derives from it
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.ancestry().any(|class| class.ptr_eq(other))
    }

    /// Whether both handles name the same class
    pub fn ptr_eq(&self, other: &Class) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Keyword parameters of the resolved initializer.
    ///
    /// `None` when the resolved initializer was hand-written; an empty list
    /// when no initializer exists at all.
    pub fn signature(&self) -> Option<Vec<Parameter>> {
        match self.resolve(|table| table.init.clone()) {
            Some(init) => init.parameters.map(|params| params.to_vec()),
            None => Some(Vec::new()),
        }
    }

    /// Create an instance and run the resolved initializer
    pub fn instantiate(&self, args: Args) -> RecordResult<Instance> {
        let instance = Instance::allocate(self);
        match self.resolve(|table| table.init.clone()) {
            Some(init) => (init.body)(&instance, &args)?,
            None => {
                if let Some(name) = args.names().next() {
                    return Err(RecordError::UnexpectedArgument {
                        class: self.name().to_string(),
                        name: name.to_string(),
                    });
                }
            }
        }
        Ok(instance)
    }

    /// Call a class method or static method
    pub fn invoke(&self, name: &str, args: &[Value]) -> RecordResult<Value> {
        match self.resolve_member(name) {
            Some(Member::ClassMethod(f)) => f(self, args),
            Some(Member::StaticMethod(f)) => f(args),
            _ => Err(RecordError::NoSuchMethod {
                class: self.name().to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Iterate over this class and its bases, nearest first
    pub(crate) fn ancestry(&self) -> impl Iterator<Item = &Class> {
        std::iter::successors(Some(self), |class| class.base())
    }

    /// First value picked from a method table along the base chain
    pub(crate) fn resolve<T>(&self, pick: impl Fn(&MethodTable) -> Option<T>) -> Option<T> {
        self.ancestry().find_map(|class| pick(&class.0.methods))
    }

    /// Namespace member along the base chain
    pub(crate) fn resolve_member(&self, name: &str) -> Option<&Member> {
        self.ancestry().find_map(|class| {
            class
                .0
                .namespace
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, member)| member)
        })
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.0.name)
    }
}

/// Instance of a class (cheap shared handle)
#[derive(Clone)]
pub struct Instance(Rc<InstanceInner>);

struct InstanceInner {
    id: u64,
    class: Class,
    slots: RefCell<FxHashMap<String, Value>>,
}

impl Instance {
    /// Allocate an instance with no assigned slots
    pub(crate) fn allocate(class: &Class) -> Self {
        Instance(Rc::new(InstanceInner {
            id: generate_object_id(),
            class: class.clone(),
            slots: RefCell::new(FxHashMap::default()),
        }))
    }

    /// Unique object ID
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Class of the instance
    pub fn class(&self) -> &Class {
        &self.0.class
    }

    /// Whether both handles refer to the same instance
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Raw slot read, bypassing accessors
    pub(crate) fn load(&self, name: &str) -> Option<Value> {
        self.0.slots.borrow().get(name).cloned()
    }

    /// Raw slot read that fails like an attribute access
    pub(crate) fn load_required(&self, name: &str) -> RecordResult<Value> {
        self.load(name).ok_or_else(|| self.missing(name))
    }

    /// Raw slot write, bypassing accessors
    pub(crate) fn store(&self, name: &str, value: Value) {
        self.0.slots.borrow_mut().insert(name.to_string(), value);
    }

    /// Raw slot removal
    pub(crate) fn evict(&self, name: &str) -> Option<Value> {
        self.0.slots.borrow_mut().remove(name)
    }

    pub(crate) fn missing(&self, name: &str) -> RecordError {
        RecordError::MissingAttribute {
            class: self.class().name().to_string(),
            name: name.to_string(),
        }
    }

    fn accessor(&self, name: &str) -> Option<Accessor> {
        self.class()
            .resolve(|table| table.accessors.get(name).cloned())
    }

    /// Read an attribute: field accessor, property, instance slot, class attribute
    pub fn get(&self, name: &str) -> RecordResult<Value> {
        if let Some(accessor) = self.accessor(name) {
            return (accessor.getter)(self);
        }
        if let Some(Member::Property(getter)) = self.class().resolve_member(name) {
            return getter(self);
        }
        if let Some(value) = self.load(name) {
            return Ok(value);
        }
        match self.class().resolve_member(name) {
            Some(Member::Value(value)) => Ok(value.clone()),
            _ => Err(self.missing(name)),
        }
    }

    /// Assign an attribute through its setter
    pub fn set(&self, name: &str, value: impl Into<Value>) -> RecordResult<()> {
        let value = value.into();
        match self.accessor(name) {
            Some(accessor) => (accessor.setter)(self, value),
            None => {
                self.store(name, value);
                Ok(())
            }
        }
    }

    /// Delete an attribute through its deleter
    pub fn delete(&self, name: &str) -> RecordResult<()> {
        match self.accessor(name) {
            Some(accessor) => (accessor.deleter)(self),
            None => self.evict(name).map(drop).ok_or_else(|| self.missing(name)),
        }
    }

    /// Call a method resolved along the class chain
    pub fn call(&self, name: &str, args: &[Value]) -> RecordResult<Value> {
        match self.class().resolve_member(name) {
            Some(Member::Method(f)) => f(self, args),
            Some(Member::ClassMethod(f)) => f(self.class(), args),
            Some(Member::StaticMethod(f)) => f(args),
            _ => Err(RecordError::NoSuchMethod {
                class: self.class().name().to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Textual representation
    pub fn repr(&self) -> RecordResult<String> {
        match self.class().resolve(|table| table.repr.clone()) {
            Some(repr) => repr(self),
            None => Ok(format!("<{} object #{}>", self.class().name(), self.id())),
        }
    }

    /// Equality, identity when no equality is defined
    pub fn equals(&self, other: &Instance) -> RecordResult<bool> {
        match self.class().resolve(|table| table.eq.clone()) {
            Some(eq) => eq(self, other),
            None => Ok(self.ptr_eq(other)),
        }
    }

    /// `self < other`
    pub fn lt(&self, other: &Instance) -> RecordResult<bool> {
        self.ordering(other, |table| table.lt.clone())
    }

    /// `self <= other`
    pub fn le(&self, other: &Instance) -> RecordResult<bool> {
        self.ordering(other, |table| table.le.clone())
    }

    /// `self > other`
    pub fn gt(&self, other: &Instance) -> RecordResult<bool> {
        self.ordering(other, |table| table.gt.clone())
    }

    /// `self >= other`
    pub fn ge(&self, other: &Instance) -> RecordResult<bool> {
        self.ordering(other, |table| table.ge.clone())
    }

    fn ordering(
        &self,
        other: &Instance,
        pick: impl Fn(&MethodTable) -> Option<CompareFn>,
    ) -> RecordResult<bool> {
        match self.class().resolve(pick) {
            Some(op) => op(self, other),
            None => Err(RecordError::Unorderable {
                left: self.class().name().to_string(),
                right: other.class().name().to_string(),
            }),
        }
    }

    /// Hash, identity based when no hash is defined
    pub fn hash(&self) -> RecordResult<u64> {
        match self.class().resolve(|table| table.hash.clone()) {
            Some(HashSlot::Compute(hash)) => hash(self),
            Some(HashSlot::Disabled) => {
                Err(RecordError::Unhashable(self.class().name().to_string()))
            }
            None => {
                let mut hasher = FxHasher::default();
                self.id().hash(&mut hasher);
                Ok(hasher.finish())
            }
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} #{}>", self.class().name(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::ClassDecl;

    #[test]
    fn test_plain_class_defaults() {
        let class = ClassDecl::new("Plain").attr("color", "red").finish();
        let a = class.instantiate(Args::new()).unwrap();
        let b = class.instantiate(Args::new()).unwrap();

        assert!(class.metadata().is_none());
        assert!(a.equals(&a).unwrap());
        assert!(!a.equals(&b).unwrap());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.repr().unwrap(), format!("<Plain object #{}>", a.id()));
        assert!(matches!(a.lt(&b), Err(RecordError::Unorderable { .. })));
        assert_eq!(a.hash().unwrap(), a.clone().hash().unwrap());
    }

    #[test]
    fn test_plain_class_rejects_arguments() {
        let class = ClassDecl::new("Plain").finish();
        let err = class.instantiate(Args::new().with("x", 1)).unwrap_err();
        assert_eq!(
            err,
            RecordError::UnexpectedArgument {
                class: "Plain".to_string(),
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn test_class_attributes_and_instance_slots() {
        let class = ClassDecl::new("Plain").attr("color", "red").finish();
        let obj = class.instantiate(Args::new()).unwrap();

        assert_eq!(obj.get("color").unwrap(), Value::str("red"));
        obj.set("color", "blue").unwrap();
        assert_eq!(obj.get("color").unwrap(), Value::str("blue"));
        obj.delete("color").unwrap();
        assert_eq!(obj.get("color").unwrap(), Value::str("red"));
        assert!(matches!(
            obj.get("size"),
            Err(RecordError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_methods_resolve_through_base() {
        let base = ClassDecl::new("Base")
            .method("greet", |_, _| Ok(Value::str("hello")))
            .static_method("answer", |_| Ok(Value::Int(42)))
            .class_method("label", |class, _| Ok(Value::str(class.name())))
            .finish();
        let child = ClassDecl::new("Child").extends(&base).finish();
        let obj = child.instantiate(Args::new()).unwrap();

        assert!(child.is_subclass_of(&base));
        assert!(!base.is_subclass_of(&child));
        assert_eq!(obj.call("greet", &[]).unwrap(), Value::str("hello"));
        assert_eq!(child.invoke("answer", &[]).unwrap(), Value::Int(42));
        assert_eq!(child.invoke("label", &[]).unwrap(), Value::str("Child"));
        assert!(matches!(
            obj.call("missing", &[]),
            Err(RecordError::NoSuchMethod { .. })
        ));
    }

    #[test]
    fn test_args_from_iterator() {
        let args: Args = [("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(args.len(), 2);
        assert_eq!(args.get("y"), Some(&Value::Int(2)));
        assert!(!args.contains("z"));
    }
}
