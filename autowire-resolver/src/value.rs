// Type-erased values passed between the resolver and user code

use crate::{ResolveError, Result, TypeKey};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased value.
///
/// Arguments, default values, constructed instances and return values all
/// travel as `Value`. Cloning is a reference-count bump.
#[derive(Clone)]
pub struct Value(Arc<dyn Any + Send + Sync>);

impl Value {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self(value)
    }

    /// The `()` value, returned by routines with nothing to report
    pub fn unit() -> Self {
        Self::new(())
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0.clone().downcast::<T>().ok()
    }

    /// Whether both values point at the same allocation
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Value(..)")
    }
}

/// Positional argument list handed to factories, methods and callables
#[derive(Clone, Default)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.values.push(Value::new(value));
        self
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Borrow the argument at `position` as a `T`
    pub fn get<T: Any>(&self, position: usize) -> Result<&T> {
        self.values
            .get(position)
            .and_then(|value| value.downcast_ref::<T>())
            .ok_or_else(|| mismatch::<T>(position))
    }

    /// Shared handle to the argument at `position`
    pub fn arc<T: Any + Send + Sync>(&self, position: usize) -> Result<Arc<T>> {
        self.values
            .get(position)
            .and_then(|value| value.downcast_arc::<T>())
            .ok_or_else(|| mismatch::<T>(position))
    }

    /// Owned argument at `position`.
    ///
    /// Freshly resolved dependencies are uniquely owned and move out without
    /// a copy; shared values are cloned.
    pub fn take<T: Any + Send + Sync + Clone>(&mut self, position: usize) -> Result<T> {
        let slot = self
            .values
            .get_mut(position)
            .ok_or_else(|| mismatch::<T>(position))?;
        if !slot.is::<T>() {
            return Err(mismatch::<T>(position));
        }
        let taken = std::mem::replace(slot, Value::unit());
        let arc = taken
            .0
            .downcast::<T>()
            .map_err(|_| mismatch::<T>(position))?;
        Ok(Arc::try_unwrap(arc).unwrap_or_else(|shared| (*shared).clone()))
    }
}

fn mismatch<T: ?Sized + 'static>(position: usize) -> ResolveError {
    ResolveError::ArgumentMismatch {
        position,
        expected: std::any::type_name::<T>(),
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<Value> for Arguments {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("len", &self.values.len())
            .finish()
    }
}

/// Build an [`Arguments`] list from expressions.
///
/// ```rust
/// use autowire_resolver::args;
///
/// let args = args!["Event", 42u32];
/// assert_eq!(args.len(), 2);
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Arguments::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Arguments::from(vec![$($crate::Value::new($value)),+])
    };
}

/// An object produced by the resolver, tagged with its type
#[derive(Clone)]
pub struct Instance {
    key: TypeKey,
    value: Value,
}

impl Instance {
    pub(crate) fn new(key: TypeKey, value: Value) -> Self {
        Self { key, value }
    }

    /// Wrap an object that was built outside the resolver
    pub fn of<T: Any + Send + Sync>(object: T) -> Self {
        Self::new(TypeKey::of::<T>(), Value::new(object))
    }

    pub fn type_key(&self) -> TypeKey {
        self.key
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.value.downcast_arc::<T>()
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("type", &self.key).finish()
    }
}
