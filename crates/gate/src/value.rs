//! Type-erased actors, subjects and check arguments.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased value.
///
/// Actors and subjects are passed around as `Value`s so the gate can carry
/// any application type. Cloning is cheap: the underlying value is behind an
/// `Arc` and two clones point at the same instance.
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap a value the caller already shares.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The concrete type of the wrapped value.
    pub fn type_id(&self) -> TypeId {
        self.inner.as_ref().type_id()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Whether both values point at the same instance.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.type_name)
    }
}

/// The arguments of an ability check.
///
/// The first argument, when present, is the subject used for policy lookup.
/// A single value converts into a one-element sequence.
#[derive(Debug, Clone, Default)]
pub struct Arguments(Vec<Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// The subject of the check.
    pub fn first(&self) -> Option<&Value> {
        self.0.first()
    }

    /// Downcast the argument at `index`.
    pub fn downcast<T: Any>(&self, index: usize) -> Option<&T> {
        self.get(index).and_then(Value::downcast_ref)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl From<()> for Arguments {
    fn from(_: ()) -> Self {
        Self::new()
    }
}

impl From<Value> for Arguments {
    fn from(value: Value) -> Self {
        Self(vec![value])
    }
}

impl From<&Value> for Arguments {
    fn from(value: &Value) -> Self {
        Self(vec![value.clone()])
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[Value; N]> for Arguments {
    fn from(values: [Value; N]) -> Self {
        Self(values.into())
    }
}

impl From<&Arguments> for Arguments {
    fn from(args: &Arguments) -> Self {
        args.clone()
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
