//! Deferred events

use autowire_resolver::Arguments;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An emission captured by `defer` and replayed by `dispatch`
#[derive(Debug, Clone)]
pub struct DeferredEvent {
    /// Unique id, used to correlate log lines across dispatches
    pub id: Uuid,

    pub event: String,

    /// Arguments captured at defer time
    pub args: Arguments,

    pub deferred_at: DateTime<Utc>,
}

impl DeferredEvent {
    pub fn new(event: impl Into<String>, args: Arguments) -> Self {
        Self {
            id: Uuid::new_v4(),
            event: event.into(),
            args,
            deferred_at: Utc::now(),
        }
    }
}
