//! Dynamic values stored in record slots
//!
//! Scalars (`None`, `Bool`, `Int`, `Float`, `Str`, `Tuple`) behave as plain
//! values. `List` and `Record` are handles: cloning one aliases the same
//! underlying storage, so a mutation through one clone is visible through all
//! of them. This matters for default values versus default factories: a fixed
//! list default is shared by every instance, a factory produces a fresh one.
//!
//! Comparison, hashing and repr are fallible because a nested record may route
//! through user-written protocol methods.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::FxHasher;

use crate::error::{RecordError, RecordResult};
use crate::object::Instance;

/// A dynamically typed value
#[derive(Clone)]
pub enum Value {
    /// Absence of a value
    None,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Double precision float
    Float(f64),
    /// Immutable string
    Str(Rc<str>),
    /// Immutable sequence
    Tuple(Rc<[Value]>),
    /// Shared mutable sequence
    List(ListRef),
    /// Record instance handle
    Record(Instance),
}

/// Shared, mutable list storage
#[derive(Clone, Default)]
pub struct ListRef(Rc<RefCell<Vec<Value>>>);

impl ListRef {
    /// Create a list holding the given items
    pub fn new(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    /// Append an item, returns the new length
    pub fn push(&self, value: Value) -> usize {
        let mut items = self.0.borrow_mut();
        items.push(value);
        items.len()
    }

    /// Remove and return the last item
    pub fn pop(&self) -> Option<Value> {
        self.0.borrow_mut().pop()
    }

    /// Item at index
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Copy of the current items
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Whether both handles alias the same storage
    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Value {
    /// Create a string value
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    /// Create a tuple value
    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Rc::from(items))
    }

    /// Create a list value
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(ListRef::new(items))
    }

    /// Create a fresh empty list
    pub fn empty_list() -> Self {
        Value::List(ListRef::default())
    }

    /// Check for `None`
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Integer payload
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float payload (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// List handle
    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Record handle
    pub fn as_record(&self) -> Option<&Instance> {
        match self {
            Value::Record(instance) => Some(instance),
            _ => None,
        }
    }

    /// Name of the value's type, records report their class name
    pub fn type_name(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::Tuple(_) => "tuple".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Record(instance) => instance.class().name().to_string(),
        }
    }

    /// Structural equality
    pub fn equals(&self, other: &Value) -> RecordResult<bool> {
        Ok(match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                int_float_cmp(*a, *b) == Some(Ordering::Equal)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => seq_equals(a, b)?,
            (Value::List(a), Value::List(b)) => {
                a.ptr_eq(b) || seq_equals(&a.snapshot(), &b.snapshot())?
            }
            (Value::Record(a), Value::Record(b)) => a.ptr_eq(b) || a.equals(b)?,
            _ => false,
        })
    }

    /// Same object: shared handles, or bit-identical floats
    pub(crate) fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            (Value::Record(a), Value::Record(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Total comparison where one is defined
    pub fn compare(&self, other: &Value) -> RecordResult<Ordering> {
        let unorderable = || RecordError::Unorderable {
            left: self.type_name(),
            right: other.type_name(),
        };
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).ok_or_else(unorderable),
            (Value::Int(a), Value::Float(b)) => int_float_cmp(*a, *b).ok_or_else(unorderable),
            (Value::Float(a), Value::Int(b)) => int_float_cmp(*b, *a)
                .map(Ordering::reverse)
                .ok_or_else(unorderable),
            (Value::Tuple(a), Value::Tuple(b)) => compare_seq(a, b),
            (Value::List(a), Value::List(b)) => compare_seq(&a.snapshot(), &b.snapshot()),
            (Value::Record(a), Value::Record(b)) => {
                if a.ptr_eq(b) || a.equals(b)? {
                    Ok(Ordering::Equal)
                } else if a.lt(b)? {
                    Ok(Ordering::Less)
                } else if b.lt(a)? {
                    Ok(Ordering::Greater)
                } else if a.le(b)? {
                    Ok(Ordering::Equal)
                } else {
                    Err(unorderable())
                }
            }
            _ => Err(unorderable()),
        }
    }

    /// Evaluate one comparison operator.
    ///
    /// Records dispatch to their own operator and sequences to the first
    /// element pair that differs. A pair of numbers with no order (`NaN`)
    /// answers `false` instead of failing.
    pub(crate) fn compare_op(&self, other: &Value, op: CompareOp) -> RecordResult<bool> {
        match (self, other) {
            (_, _) if op == CompareOp::Eq => self.equals(other),
            (Value::Record(a), Value::Record(b)) => match op {
                CompareOp::Lt => a.lt(b),
                CompareOp::Le => a.le(b),
                CompareOp::Gt => a.gt(b),
                CompareOp::Ge => a.ge(b),
                CompareOp::Eq => a.equals(b),
            },
            (Value::Tuple(a), Value::Tuple(b)) => compare_seq_op(a, b, op),
            (Value::List(a), Value::List(b)) => {
                compare_seq_op(&a.snapshot(), &b.snapshot(), op)
            }
            (Value::Float(a), Value::Float(b)) => Ok(op.holds_partial(a.partial_cmp(b))),
            (Value::Int(a), Value::Float(b)) => Ok(op.holds_partial(int_float_cmp(*a, *b))),
            (Value::Float(a), Value::Int(b)) => {
                Ok(op.holds_partial(int_float_cmp(*b, *a).map(Ordering::reverse)))
            }
            _ => Ok(op.holds(self.compare(other)?)),
        }
    }

    /// Hash consistent with `equals`
    pub fn hash_value(&self) -> RecordResult<u64> {
        let mut hasher = FxHasher::default();
        self.hash_into(&mut hasher)?;
        Ok(hasher.finish())
    }

    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) -> RecordResult<()> {
        match self {
            Value::None => 0u8.hash(state),
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                // Integral floats must hash like the int they compare equal to
                match float_as_int(*f) {
                    Some(i) => {
                        2u8.hash(state);
                        i.hash(state);
                    }
                    None => {
                        3u8.hash(state);
                        f.to_bits().hash(state);
                    }
                }
            }
            Value::Str(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            Value::Tuple(items) => {
                5u8.hash(state);
                hash_seq(items, state)?;
            }
            Value::List(list) => {
                6u8.hash(state);
                hash_seq(&list.snapshot(), state)?;
            }
            Value::Record(instance) => {
                7u8.hash(state);
                instance.hash()?.hash(state);
            }
        }
        Ok(())
    }

    /// Textual representation
    pub fn repr(&self) -> RecordResult<String> {
        Ok(match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => float_repr(*f),
            Value::Str(s) => str_repr(s),
            Value::Tuple(items) if items.len() == 1 => format!("({},)", items[0].repr()?),
            Value::Tuple(items) => format!("({})", repr_seq(items)?),
            Value::List(list) => format!("[{}]", repr_seq(&list.snapshot())?),
            Value::Record(instance) => instance.repr()?,
        })
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub(crate) fn dunder_name(self) -> &'static str {
        match self {
            CompareOp::Eq => "__eq__",
            CompareOp::Lt => "__lt__",
            CompareOp::Le => "__le__",
            CompareOp::Gt => "__gt__",
            CompareOp::Ge => "__ge__",
        }
    }

    /// Whether the operator is satisfied by `ordering`
    pub(crate) fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering.is_eq(),
            CompareOp::Lt => ordering.is_lt(),
            CompareOp::Le => ordering.is_le(),
            CompareOp::Gt => ordering.is_gt(),
            CompareOp::Ge => ordering.is_ge(),
        }
    }

    /// Like [`CompareOp::holds`], unordered pairs never satisfy it
    pub(crate) fn holds_partial(self, ordering: Option<Ordering>) -> bool {
        ordering.is_some_and(|ordering| self.holds(ordering))
    }
}

// 2^63 is exactly representable, i64::MAX is not
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Float with an exact `i64` counterpart
fn float_as_int(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(&f)).then(|| f as i64)
}

/// Exact int/float ordering, `None` when the float is `NaN`
fn int_float_cmp(i: i64, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f >= I64_LIMIT {
        return Some(Ordering::Less);
    }
    if f < -I64_LIMIT {
        return Some(Ordering::Greater);
    }
    let whole = f.trunc();
    Some(i.cmp(&(whole as i64)).then_with(|| {
        // same integer part, the fraction decides
        if f > whole {
            Ordering::Less
        } else if f < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }))
}

fn float_repr(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf" } else { "-inf" }.to_string()
    } else {
        format!("{f:?}")
    }
}

/// Single-quoted unless the text holds a single quote and no double quote
fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Element-wise equality; identical elements short-circuit
pub(crate) fn seq_equals(left: &[Value], right: &[Value]) -> RecordResult<bool> {
    if left.len() != right.len() {
        return Ok(false);
    }
    for (l, r) in left.iter().zip(right) {
        if !(l.is_identical(r) || l.equals(r)?) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Index of the first element pair that is neither identical nor equal
fn first_difference(left: &[Value], right: &[Value]) -> RecordResult<Option<usize>> {
    for (index, (l, r)) in left.iter().zip(right).enumerate() {
        if !(l.is_identical(r) || l.equals(r)?) {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

/// Lexicographic comparison: the first differing pair decides, then length
pub(crate) fn compare_seq(left: &[Value], right: &[Value]) -> RecordResult<Ordering> {
    match first_difference(left, right)? {
        Some(index) => left[index].compare(&right[index]),
        None => Ok(left.len().cmp(&right.len())),
    }
}

/// Lexicographic operator: applied to the first differing pair, else to lengths
pub(crate) fn compare_seq_op(
    left: &[Value],
    right: &[Value],
    op: CompareOp,
) -> RecordResult<bool> {
    match first_difference(left, right)? {
        Some(_) if op == CompareOp::Eq => Ok(false),
        Some(index) => left[index].compare_op(&right[index], op),
        None => Ok(op.holds(left.len().cmp(&right.len()))),
    }
}

/// Hash of a value tuple, identical to hashing `Value::Tuple`
pub(crate) fn hash_tuple(items: &[Value]) -> RecordResult<u64> {
    let mut hasher = FxHasher::default();
    5u8.hash(&mut hasher);
    hash_seq(items, &mut hasher)?;
    Ok(hasher.finish())
}

fn hash_seq<H: Hasher>(items: &[Value], state: &mut H) -> RecordResult<()> {
    items.len().hash(state);
    for item in items {
        item.hash_into(state)?;
    }
    Ok(())
}

fn repr_seq(items: &[Value]) -> RecordResult<String> {
    let parts = items
        .iter()
        .map(Value::repr)
        .collect::<RecordResult<Vec<_>>>()?;
    Ok(parts.join(", "))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other).unwrap_or(false)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::Str(s) => write!(f, "Str({:?})", &**s),
            Value::Tuple(items) => f.debug_tuple("Tuple").field(&&**items).finish(),
            Value::List(list) => f.debug_tuple("List").field(&list.snapshot()).finish(),
            Value::Record(instance) => write!(f, "Record({instance:?})"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.repr().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<ListRef> for Value {
    fn from(list: ListRef) -> Self {
        Value::List(list)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Record(instance)
    }
}
