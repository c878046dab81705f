//! Listener entries and priority buckets

use autowire_resolver::{Callable, TypeKey};
use std::fmt;

/// Something to invoke when an event fires.
///
/// Equality is reference equality: callables compare by identity of their
/// body, method pairs by class and method name.
#[derive(Clone, PartialEq, Eq)]
pub enum Listener {
    /// A closure, free function or bound method reference
    Callable(Callable),

    /// A method on a receiver the resolver builds fresh at each invocation
    Method { class: TypeKey, method: String },
}

impl Listener {
    /// `(T, method)` listener
    pub fn method<T: ?Sized + 'static>(method: impl Into<String>) -> Self {
        Listener::Method {
            class: TypeKey::of::<T>(),
            method: method.into(),
        }
    }
}

impl From<Callable> for Listener {
    fn from(callable: Callable) -> Self {
        Listener::Callable(callable)
    }
}

impl From<&Callable> for Listener {
    fn from(callable: &Callable) -> Self {
        Listener::Callable(callable.clone())
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Callable(callable) => callable.fmt(f),
            Listener::Method { class, method } => {
                write!(f, "Method({}::{})", class.short_name(), method)
            }
        }
    }
}

/// One position inside a [`PriorityBucket`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Persistent(Listener),

    /// Listeners that fire at most once, discarded together after firing
    Once(Vec<Listener>),
}

/// Listeners registered at one priority of one event.
///
/// Slots keep registration order. A bucket holds at most one once-slot; it
/// sits where the first once-listener was registered and later once-listeners
/// join it there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityBucket {
    slots: Vec<Slot>,
}

impl PriorityBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// All listeners in invocation order
    pub fn listeners(&self) -> Vec<&Listener> {
        self.slots
            .iter()
            .flat_map(|slot| match slot {
                Slot::Persistent(listener) => std::slice::from_ref(listener),
                Slot::Once(listeners) => listeners.as_slice(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Persistent(_) => 1,
                Slot::Once(listeners) => listeners.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn has_once_slot(&self) -> bool {
        self.slots.iter().any(|slot| matches!(slot, Slot::Once(_)))
    }

    pub(crate) fn push_persistent(&mut self, listener: Listener) {
        self.slots.push(Slot::Persistent(listener));
    }

    pub(crate) fn push_once(&mut self, listener: Listener) {
        for slot in &mut self.slots {
            if let Slot::Once(listeners) = slot {
                listeners.push(listener);
                return;
            }
        }
        self.slots.push(Slot::Once(vec![listener]));
    }

    /// Detach `members` from the once-slot and return those still present.
    ///
    /// Each member takes the first equal entry of the slot. Entries that are
    /// not in `members` stay behind; the slot goes away once it is empty.
    pub(crate) fn take_once(&mut self, members: &[Listener]) -> Vec<Listener> {
        let Some(index) = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Slot::Once(_)))
        else {
            return Vec::new();
        };
        let Slot::Once(live) = &mut self.slots[index] else {
            return Vec::new();
        };

        let mut taken = Vec::with_capacity(members.len());
        for member in members {
            if let Some(pos) = live.iter().position(|l| l == member) {
                taken.push(live.remove(pos));
            }
        }
        if live.is_empty() {
            self.slots.remove(index);
        }
        taken
    }

    /// Remove the first registration equal to `listener`.
    ///
    /// Slots are visited in order. Visiting the once-slot searches its
    /// members; visiting a persistent slot removes the first matching
    /// persistent slot of the whole bucket, even one positioned after a
    /// once-slot that also holds the listener.
    pub(crate) fn remove_first(&mut self, listener: &Listener) -> bool {
        for index in 0..self.slots.len() {
            if let Slot::Once(listeners) = &mut self.slots[index] {
                if let Some(pos) = listeners.iter().position(|l| l == listener) {
                    listeners.remove(pos);
                    if listeners.is_empty() {
                        self.slots.remove(index);
                    }
                    return true;
                }
                continue;
            }

            let found = self
                .slots
                .iter()
                .position(|slot| matches!(slot, Slot::Persistent(l) if l == listener));
            if let Some(pos) = found {
                self.slots.remove(pos);
                return true;
            }
        }
        false
    }
}

impl From<Vec<Slot>> for PriorityBucket {
    fn from(slots: Vec<Slot>) -> Self {
        Self { slots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener() -> Listener {
        Callable::from_fn(|_| Ok(())).into()
    }

    #[test]
    fn test_once_slot_keeps_first_position() {
        let (a, b, c, d) = (listener(), listener(), listener(), listener());
        let mut bucket = PriorityBucket::new();

        bucket.push_persistent(a.clone());
        bucket.push_once(b.clone());
        bucket.push_persistent(c.clone());
        bucket.push_once(d.clone());

        assert_eq!(
            bucket.slots(),
            &[
                Slot::Persistent(a.clone()),
                Slot::Once(vec![b.clone(), d.clone()]),
                Slot::Persistent(c.clone()),
            ]
        );
        assert_eq!(bucket.listeners(), vec![&a, &b, &d, &c]);
        assert_eq!(bucket.len(), 4);
    }

    #[test]
    fn test_take_once_then_new_slot_goes_last() {
        let (a, b, c) = (listener(), listener(), listener());
        let mut bucket = PriorityBucket::from(vec![Slot::Once(vec![a.clone()])]);
        bucket.push_persistent(b.clone());

        assert_eq!(bucket.take_once(&[a.clone()]), vec![a]);
        assert!(!bucket.has_once_slot());

        bucket.push_once(c.clone());
        assert_eq!(
            bucket.slots(),
            &[Slot::Persistent(b), Slot::Once(vec![c])]
        );
    }

    #[test]
    fn test_take_once_leaves_unlisted_members() {
        let (a, b, c) = (listener(), listener(), listener());
        let mut bucket = PriorityBucket::from(vec![Slot::Once(vec![a.clone(), b.clone()])]);
        bucket.push_once(c.clone());

        // `b` was removed after `a, b` were read
        bucket.remove_first(&b);
        assert_eq!(bucket.take_once(&[a.clone(), b.clone()]), vec![a.clone()]);
        assert_eq!(bucket.slots(), &[Slot::Once(vec![c.clone()])]);

        assert!(bucket.take_once(&[a]).is_empty());
        assert_eq!(bucket.take_once(&[c.clone()]), vec![c]);
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_remove_first_only_removes_one() {
        let a = listener();
        let mut bucket = PriorityBucket::new();
        bucket.push_persistent(a.clone());
        bucket.push_persistent(a.clone());

        assert!(bucket.remove_first(&a));
        assert_eq!(bucket.slots(), &[Slot::Persistent(a.clone())]);
        assert!(bucket.remove_first(&a));
        assert!(bucket.is_empty());
        assert!(!bucket.remove_first(&a));
    }

    #[test]
    fn test_remove_first_from_once_slot() {
        let (a, b) = (listener(), listener());
        let mut bucket = PriorityBucket::new();
        bucket.push_once(a.clone());
        bucket.push_once(b.clone());

        assert!(bucket.remove_first(&a));
        assert_eq!(bucket.slots(), &[Slot::Once(vec![b.clone()])]);
        assert!(bucket.remove_first(&b));
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_remove_first_prefers_persistent_after_earlier_persistent_slot() {
        let (a, x) = (listener(), listener());
        let mut bucket = PriorityBucket::new();
        bucket.push_persistent(a.clone());
        bucket.push_once(x.clone());
        bucket.push_persistent(x.clone());

        assert!(bucket.remove_first(&x));
        assert_eq!(
            bucket.slots(),
            &[Slot::Persistent(a), Slot::Once(vec![x])]
        );
    }

    #[test]
    fn test_remove_first_checks_leading_once_slot_first() {
        let x = listener();
        let mut bucket = PriorityBucket::new();
        bucket.push_once(x.clone());
        bucket.push_persistent(x.clone());

        assert!(bucket.remove_first(&x));
        assert_eq!(bucket.slots(), &[Slot::Persistent(x)]);
    }

    #[test]
    fn test_method_listener_equality() {
        struct Handler;
        assert_eq!(
            Listener::method::<Handler>("on_ping"),
            Listener::method::<Handler>("on_ping")
        );
        assert_ne!(
            Listener::method::<Handler>("on_ping"),
            Listener::method::<Handler>("on_pong")
        );
    }
}
