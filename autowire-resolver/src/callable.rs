// Free functions, closures and bound method references

use crate::{Arguments, Param, Result, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Body = Arc<dyn Fn(Arguments) -> Result<Value> + Send + Sync>;

/// A routine with declared parameters.
///
/// Clones share the body, and equality is identity of that body: a clone of
/// a callable is "the same reference", two separately built callables are
/// never equal.
#[derive(Clone)]
pub struct Callable {
    params: Arc<[Param]>,
    body: Body,
}

impl Callable {
    /// Build a callable from its parameter list and body
    ///
    /// # Examples
    ///
    /// ```rust
    /// use autowire_resolver::{Callable, Param};
    ///
    /// let greet = Callable::new([Param::untyped("name").with_default("world")], |args| {
    ///     Ok(format!("hello {}", args.get::<&str>(0)?))
    /// });
    /// assert_eq!(greet.params().len(), 1);
    /// ```
    pub fn new<P, F, R>(params: P, body: F) -> Self
    where
        P: IntoIterator<Item = Param>,
        F: Fn(Arguments) -> Result<R> + Send + Sync + 'static,
        R: Any + Send + Sync,
    {
        Self {
            params: params.into_iter().collect(),
            body: Arc::new(move |args| body(args).map(Value::new)),
        }
    }

    /// A callable that declares no parameters
    pub fn from_fn<F, R>(body: F) -> Self
    where
        F: Fn(Arguments) -> Result<R> + Send + Sync + 'static,
        R: Any + Send + Sync,
    {
        Self::new(std::iter::empty::<Param>(), body)
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Invoke with the given arguments, bypassing parameter resolution
    pub fn call(&self, args: Arguments) -> Result<Value> {
        (self.body)(args)
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Callable {}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field(
                "params",
                &self.params.iter().map(Param::name).collect::<Vec<_>>(),
            )
            .field("body", &Arc::as_ptr(&self.body).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let first = Callable::from_fn(|_| Ok(()));
        let second = Callable::from_fn(|_| Ok(()));
        assert_eq!(first, first.clone());
        assert_ne!(first, second);
    }

    #[test]
    fn test_call_wraps_return_value() {
        let double = Callable::from_fn(|args| Ok(args.get::<i64>(0)? * 2));
        let result = double.call(crate::args![21i64]).unwrap();
        assert_eq!(result.downcast_ref::<i64>(), Some(&42));
    }
}
