// Error types for dependency resolution

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("{0} is not instantiable")]
    NotInstantiable(String),

    #[error("Method {class}::{method}() does not exist")]
    MethodNotFound { class: String, method: String },

    #[error("Unable to resolve dependency parameter for `{0}`")]
    UnresolvableParameter(String),

    #[error("Class: {0} is not found")]
    ClassNotFound(String),

    #[error("Dependency cycle suspected: depth {depth} exceeded while resolving {path}")]
    DependencyCycleSuspected { depth: usize, path: String },

    #[error("Argument {position} is missing or is not a {expected}")]
    ArgumentMismatch {
        position: usize,
        expected: &'static str,
    },

    #[error("Need to define class first to resolve")]
    MissingTarget,

    #[error("Invocation failed: {0}")]
    Invocation(String),
}

impl ResolveError {
    /// Build an [`ResolveError::Invocation`] from any displayable failure
    pub fn invocation(message: impl std::fmt::Display) -> Self {
        ResolveError::Invocation(message.to_string())
    }

    /// Check if this error came from the depth guard
    pub fn is_cycle(&self) -> bool {
        matches!(self, ResolveError::DependencyCycleSuspected { .. })
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
