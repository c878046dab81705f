// Parameter descriptors for constructors, methods and callables

use crate::{TypeKey, Value};
use std::any::Any;

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// No declared type
    Untyped,
    /// A primitive or built-in type; never auto-constructed
    Builtin(&'static str),
    /// A class or interface type, resolved by recursive construction
    Class(TypeKey),
}

/// Describes one parameter of a constructor, method or callable
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    kind: ParamType,
    default: Option<Value>,
}

impl Param {
    /// A parameter without a declared type
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamType::Untyped,
            default: None,
        }
    }

    /// A parameter of a built-in type such as `u32` or `String`
    pub fn builtin<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamType::Builtin(std::any::type_name::<T>()),
            default: None,
        }
    }

    /// A parameter whose type the resolver constructs
    pub fn class<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamType::Class(TypeKey::of::<T>()),
            default: None,
        }
    }

    /// Attach a default value
    pub fn with_default<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.default = Some(Value::new(value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamType {
        self.kind
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}
