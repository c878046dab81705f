//! Event-name to priority-bucket registry

use crate::listener::{Listener, PriorityBucket};
use std::collections::BTreeMap;

/// Buckets of one event, ascending by priority
pub type EventListeners = BTreeMap<i32, PriorityBucket>;

/// Buckets of every registered event
pub type ListenerMap = BTreeMap<String, EventListeners>;

/// Live listener registry.
///
/// An event name has an entry only while at least one listener is
/// registered for it; emptied buckets and events are pruned eagerly.
#[derive(Debug, Default)]
pub(crate) struct ListenerRegistry {
    events: ListenerMap,
}

impl ListenerRegistry {
    pub(crate) fn add(&mut self, event: &str, listener: Listener, priority: i32, once: bool) {
        let bucket = self
            .events
            .entry(event.to_string())
            .or_default()
            .entry(priority)
            .or_default();

        if once {
            bucket.push_once(listener);
        } else {
            bucket.push_persistent(listener);
        }
    }

    pub(crate) fn get(&self, event: &str) -> Option<&EventListeners> {
        self.events.get(event)
    }

    pub(crate) fn all(&self) -> &ListenerMap {
        &self.events
    }

    /// Detach `members` from the once-slot of `event` at `priority`
    pub(crate) fn take_once(
        &mut self,
        event: &str,
        priority: i32,
        members: &[Listener],
    ) -> Vec<Listener> {
        let Some(buckets) = self.events.get_mut(event) else {
            return Vec::new();
        };
        let Some(bucket) = buckets.get_mut(&priority) else {
            return Vec::new();
        };

        let taken = bucket.take_once(members);
        self.prune(event, priority);
        taken
    }

    /// Remove the first registration equal to `listener`, scanning buckets in
    /// ascending priority
    pub(crate) fn remove_first(&mut self, event: &str, listener: &Listener) -> Option<i32> {
        let buckets = self.events.get_mut(event)?;
        let priority = buckets
            .iter_mut()
            .find_map(|(priority, bucket)| bucket.remove_first(listener).then_some(*priority))?;

        self.prune(event, priority);
        Some(priority)
    }

    pub(crate) fn remove_event(&mut self, event: &str) -> Option<EventListeners> {
        self.events.remove(event)
    }

    pub(crate) fn clear(&mut self) -> usize {
        let count = self.events.len();
        self.events.clear();
        count
    }

    fn prune(&mut self, event: &str, priority: i32) {
        if let Some(buckets) = self.events.get_mut(event) {
            if buckets.get(&priority).is_some_and(PriorityBucket::is_empty) {
                buckets.remove(&priority);
            }
            if buckets.is_empty() {
                self.events.remove(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autowire_resolver::Callable;

    fn listener() -> Listener {
        Callable::from_fn(|_| Ok(())).into()
    }

    #[test]
    fn test_take_last_once_listener_removes_event() {
        let mut registry = ListenerRegistry::default();
        let a = listener();
        registry.add("ready", a.clone(), 0, true);

        assert_eq!(registry.take_once("ready", 0, &[a.clone()]), vec![a.clone()]);
        assert!(registry.get("ready").is_none());
        assert!(registry.take_once("ready", 0, &[a]).is_empty());
    }

    #[test]
    fn test_remove_first_scans_ascending_priority() {
        let mut registry = ListenerRegistry::default();
        let a = listener();
        registry.add("ready", a.clone(), 5, false);
        registry.add("ready", a.clone(), -1, false);

        assert_eq!(registry.remove_first("ready", &a), Some(-1));
        let remaining: Vec<_> = registry.get("ready").unwrap().keys().copied().collect();
        assert_eq!(remaining, vec![5]);

        assert_eq!(registry.remove_first("ready", &a), Some(5));
        assert!(registry.get("ready").is_none());
        assert_eq!(registry.remove_first("ready", &a), None);
    }
}
