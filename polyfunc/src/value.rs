//! Dynamic values classified by dispatch rules.
//!
//! A [`Value`] is what a caller hands to [`DispatchTable::resolve`]. The
//! variants line up with the rule grammar: every primitive tag in
//! [`PrimitiveTag`] accepts some subset of these variants.
//!
//! Classes are nominal: a [`ClassRef`] is a shared handle with a name and an
//! optional parent, compared by identity. Instance checks walk the parent
//! chain, so an instance of a subclass is also an instance of its ancestors.
//!
//! [`DispatchTable::resolve`]: crate::DispatchTable::resolve
//! [`PrimitiveTag`]: crate::PrimitiveTag

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;

/// Keyed fields of a hash or an instance, in insertion order.
pub type Fields = IndexMap<String, Value>;

/// Signature of a native callable.
pub type NativeFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A dynamically-typed runtime value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The nulled sentinel. Explicit nulls and absent arguments both map here.
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Symbol(Symbol),
    /// An ordered, indexable sequence.
    Array(Vec<Value>),
    /// A keyed-field aggregate that is not a class instance.
    Hash(Fields),
    /// An instance of a class.
    Object(Instance),
    Regexp(Regex),
    /// An ordinary callable. Never a class.
    Function(Function),
    /// A class definition.
    Class(ClassRef),
}

impl Value {
    /// The nulled sentinel.
    pub const NULL: Value = Value::Null;

    /// Creates a bigint value.
    pub fn bigint(n: i128) -> Self {
        Value::BigInt(n)
    }

    /// Creates a function value from a closure.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Value::Function(Function::new(f))
    }

    /// Returns true for the nulled sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for functions and classes alike.
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Class(_))
    }

    /// Returns true if this is an instance of `class` or of one of its subclasses.
    pub fn is_instance_of(&self, class: &ClassRef) -> bool {
        match self {
            Value::Object(instance) => instance.is_instance_of(class),
            _ => false,
        }
    }

    /// Stable lowercase name of this value's kind, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Hash(_) => "hash",
            Value::Object(_) => "object",
            Value::Regexp(_) => "regexp",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_fields(&self) -> Option<&Fields> {
        match self {
            Value::Hash(fields) => Some(fields),
            Value::Object(instance) => Some(instance.fields()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            // Two compiled regexps are equal when their patterns are.
            (Value::Regexp(a), Value::Regexp(b)) => a.as_str() == b.as_str(),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Class(a), Value::Class(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Value::Hash(fields)
    }
}

impl From<Regex> for Value {
    fn from(re: Regex) -> Self {
        Value::Regexp(re)
    }
}

impl From<Symbol> for Value {
    fn from(symbol: Symbol) -> Self {
        Value::Symbol(symbol)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

impl From<ClassRef> for Value {
    fn from(class: ClassRef) -> Self {
        Value::Class(class)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Object(instance)
    }
}

/// An ordinary callable value.
#[derive(Clone)]
pub struct Function {
    name: Option<Arc<str>>,
    body: Arc<NativeFn>,
}

impl Function {
    /// Wraps an anonymous closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: None,
            body: Arc::new(f),
        }
    }

    /// Wraps a closure under a name shown in diagnostics.
    pub fn named<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            body: Arc::new(f),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Calls the function with the given arguments.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.body)(args)
    }

    /// Returns true if both handles share the same closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.body), Arc::as_ptr(&other.body))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Function({})", name),
            None => write!(f, "Function(<anonymous>)"),
        }
    }
}

#[derive(Debug)]
struct ClassDef {
    name: String,
    parent: Option<ClassRef>,
}

/// A shared handle to a class definition.
///
/// Two handles are equal only if they point at the same definition; two
/// classes that happen to share a name are still distinct.
#[derive(Clone)]
pub struct ClassRef(Arc<ClassDef>);

impl ClassRef {
    /// Defines a root class.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(ClassDef {
            name: name.into(),
            parent: None,
        }))
    }

    /// Defines a subclass of `parent`.
    pub fn extends(name: impl Into<String>, parent: &ClassRef) -> Self {
        Self(Arc::new(ClassDef {
            name: name.into(),
            parent: Some(parent.clone()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&ClassRef> {
        self.0.parent.as_ref()
    }

    /// Iterates this class followed by each of its ancestors.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Returns true if `self` is `other` or inherits from it.
    pub fn is_subclass_of(&self, other: &ClassRef) -> bool {
        self.ancestors().any(|class| class.ptr_eq(other))
    }

    pub fn ptr_eq(&self, other: &ClassRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Creates an instance of this class with no fields.
    pub fn instantiate(&self) -> Instance {
        Instance::new(self)
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ClassRef {}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name())?;
        if let Some(parent) = self.parent() {
            write!(f, " extends {}", parent.name())?;
        }
        Ok(())
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Iterator over a class and its ancestors, nearest first.
pub struct Ancestors<'a> {
    next: Option<&'a ClassRef>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ClassRef;

    fn next(&mut self) -> Option<Self::Item> {
        let class = self.next?;
        self.next = class.parent();
        Some(class)
    }
}

/// An instance of a class.
#[derive(Debug, Clone)]
pub struct Instance {
    class: ClassRef,
    fields: Fields,
}

impl Instance {
    pub fn new(class: &ClassRef) -> Self {
        Self {
            class: class.clone(),
            fields: Fields::new(),
        }
    }

    /// Sets a field, returning the instance for chaining.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn is_instance_of(&self, class: &ClassRef) -> bool {
        self.class.is_subclass_of(class)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.fields == other.fields
    }
}

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(0);

/// A unique symbol. Every call to [`Symbol::new`] yields a distinct symbol,
/// even for equal descriptions.
#[derive(Debug, Clone)]
pub struct Symbol {
    id: u64,
    description: Option<Arc<str>>,
}

impl Symbol {
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: Some(description.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subclass_chain() {
        let shape = ClassRef::new("Shape");
        let square = ClassRef::extends("Square", &shape);
        let unrelated = ClassRef::new("Shape");

        assert!(square.is_subclass_of(&shape));
        assert!(square.is_subclass_of(&square));
        assert!(!shape.is_subclass_of(&square));

        // Same name, different definition
        assert!(!square.is_subclass_of(&unrelated));

        let names: Vec<_> = square.ancestors().map(ClassRef::name).collect();
        assert_eq!(names, vec!["Square", "Shape"]);
    }

    #[test]
    fn test_instance_of() {
        let shape = ClassRef::new("Shape");
        let square = ClassRef::extends("Square", &shape);

        let value = Value::from(square.instantiate().with_field("side", 2));
        assert!(value.is_instance_of(&square));
        assert!(value.is_instance_of(&shape));
        assert!(!Value::from(shape.instantiate()).is_instance_of(&square));

        // A class is not an instance of itself
        assert!(!Value::from(shape.clone()).is_instance_of(&shape));
    }

    #[test]
    fn test_function_identity() {
        let f = Function::new(|_| Value::Null);
        let g = Function::new(|_| Value::Null);

        assert_eq!(Value::from(f.clone()), Value::from(f.clone()));
        assert_ne!(Value::from(f), Value::from(g));
    }

    #[test]
    fn test_symbols_are_unique() {
        let a = Symbol::new("tag");
        let b = Symbol::new("tag");
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
        assert_eq!(a.description(), Some("tag"));
        assert_eq!(Symbol::anonymous().description(), None);
    }

    #[test]
    fn test_regexp_equality_by_pattern() {
        let a = Value::from(Regex::new("ab+").unwrap());
        let b = Value::from(Regex::new("ab+").unwrap());
        let c = Value::from(Regex::new("ab*").unwrap());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(3), Value::Number(3.0));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::Array(vec![Value::Number(1.0), Value::Number(2.0)])
        );
        assert_eq!(Value::default(), Value::NULL);
    }

    #[test]
    fn test_type_names() {
        let class = ClassRef::new("K");
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::bigint(1).type_name(), "bigint");
        assert_eq!(Value::from(class.clone()).type_name(), "class");
        assert_eq!(Value::from(class.instantiate()).type_name(), "object");
        assert_eq!(Value::function(|_| Value::Null).type_name(), "function");
        assert_eq!(Value::Hash(Fields::new()).type_name(), "hash");
    }
}
