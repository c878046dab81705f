//! Class-based subscribers

use autowire_resolver::TypeKey;

/// A type that declares which of its own methods handle which events.
///
/// The bus reads [`events`](EventSubscriber::events) once per
/// `subscribe`/`unsubscribe`. The declared methods must exist on the class
/// descriptor registered for [`type_key`](EventSubscriber::type_key); at
/// emit time the resolver builds a fresh receiver for each call.
///
/// ```rust,ignore
/// struct AuditLog;
///
/// impl EventSubscriber for AuditLog {
///     fn events(&self) -> EventMap {
///         EventMap::new()
///             .on("user.created", "record")
///             .on("user.deleted", ["record", "alert"])
///     }
/// }
/// ```
pub trait EventSubscriber: 'static {
    fn events(&self) -> EventMap;

    /// Identity of the subscriber; the implementing type by default
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }
}

/// One method name or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodRef {
    Single(String),
    Many(Vec<String>),
}

impl MethodRef {
    pub fn names(&self) -> &[String] {
        match self {
            MethodRef::Single(name) => std::slice::from_ref(name),
            MethodRef::Many(names) => names,
        }
    }
}

impl From<&str> for MethodRef {
    fn from(name: &str) -> Self {
        MethodRef::Single(name.to_string())
    }
}

impl From<String> for MethodRef {
    fn from(name: String) -> Self {
        MethodRef::Single(name)
    }
}

impl From<Vec<String>> for MethodRef {
    fn from(names: Vec<String>) -> Self {
        MethodRef::Many(names)
    }
}

impl From<Vec<&str>> for MethodRef {
    fn from(names: Vec<&str>) -> Self {
        MethodRef::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for MethodRef {
    fn from(names: [&str; N]) -> Self {
        MethodRef::Many(names.iter().map(|name| name.to_string()).collect())
    }
}

/// Ordered mapping of event name to handler method(s)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventMap {
    entries: Vec<(String, MethodRef)>,
}

impl EventMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `methods` as handlers of `event`
    pub fn on(mut self, event: impl Into<String>, methods: impl Into<MethodRef>) -> Self {
        self.entries.push((event.into(), methods.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MethodRef)> {
        self.entries
            .iter()
            .map(|(event, methods)| (event.as_str(), methods))
    }

    /// Declared event names, in declaration order
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(event, _)| event.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E, M> FromIterator<(E, M)> for EventMap
where
    E: Into<String>,
    M: Into<MethodRef>,
{
    fn from_iter<I: IntoIterator<Item = (E, M)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(event, methods)| (event.into(), methods.into()))
                .collect(),
        }
    }
}
