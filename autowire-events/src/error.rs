//! Event bus errors

use autowire_resolver::ResolveError;

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Event name cannot be empty.")]
    InvalidEventName,

    #[error("Incorrect listener format: {0}")]
    InvalidListenerType(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl EventError {
    /// The resolver failure behind this error, if any
    pub fn as_resolve(&self) -> Option<&ResolveError> {
        match self {
            EventError::Resolve(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EventError>;
