//! Event Bus implementation

use crate::deferred::DeferredEvent;
use crate::error::{EventError, Result};
use crate::listener::{Listener, Slot};
use crate::registry::{EventListeners, ListenerMap, ListenerRegistry};
use crate::subscriber::EventSubscriber;
use autowire_resolver::{Arguments, DependencyResolver, TypeKey, TypeRegistry};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Event bus with prioritized, once and deferred listeners.
///
/// Cloning is cheap and clones share the same registry. Listeners run
/// synchronously on the emitting thread, never while the bus is locked, so
/// a listener may emit, register or remove listeners on the same bus.
#[derive(Clone)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,

    /// Supplies dependencies to listeners emitted without arguments
    resolver: DependencyResolver,

    /// Configuration
    config: Arc<EventBusConfig>,
}

#[derive(Default)]
struct BusState {
    listeners: ListenerRegistry,
    deferred: VecDeque<DeferredEvent>,
    subscribed: HashSet<TypeKey>,
}

/// Event bus configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Enable event logging
    pub enable_logging: bool,

    /// Drain the deferred queue on dispatch instead of keeping it for replay
    pub clear_after_dispatch: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            clear_after_dispatch: false,
        }
    }
}

impl EventBus {
    /// Create new event bus with an empty type registry
    pub fn new() -> Self {
        Self::with_resolver(DependencyResolver::new(TypeRegistry::new()))
    }

    /// Create event bus that auto-wires listeners through `resolver`
    pub fn with_resolver(resolver: DependencyResolver) -> Self {
        Self::with_config(resolver, EventBusConfig::default())
    }

    /// Create event bus with custom config
    pub fn with_config(resolver: DependencyResolver, config: EventBusConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState::default())),
            resolver,
            config: Arc::new(config),
        }
    }

    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    pub fn resolver(&self) -> &DependencyResolver {
        &self.resolver
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Register a persistent listener at priority 0
    ///
    /// # Examples
    ///
    /// ```rust
    /// use autowire_events::EventBus;
    /// use autowire_resolver::{Callable, args};
    ///
    /// let bus = EventBus::new();
    /// bus.on("user.created", Callable::from_fn(|_| Ok(())))?
    ///     .on("user.deleted", Callable::from_fn(|_| Ok(())))?;
    /// bus.emit("user.created", args![])?;
    /// # Ok::<(), autowire_events::EventError>(())
    /// ```
    pub fn on(&self, event: &str, listener: impl Into<Listener>) -> Result<&Self> {
        self.on_with_priority(event, listener, 0)
    }

    /// Register a persistent listener; lower priorities run first
    pub fn on_with_priority(
        &self,
        event: &str,
        listener: impl Into<Listener>,
        priority: i32,
    ) -> Result<&Self> {
        self.add_listener(event, listener.into(), priority, false)?;
        Ok(self)
    }

    /// Register a listener that fires at most once, at priority 0
    pub fn once(&self, event: &str, listener: impl Into<Listener>) -> Result<&Self> {
        self.once_with_priority(event, listener, 0)
    }

    /// Register a listener that fires at most once
    pub fn once_with_priority(
        &self,
        event: &str,
        listener: impl Into<Listener>,
        priority: i32,
    ) -> Result<&Self> {
        self.add_listener(event, listener.into(), priority, true)?;
        Ok(self)
    }

    fn add_listener(
        &self,
        event: &str,
        listener: Listener,
        priority: i32,
        once: bool,
    ) -> Result<()> {
        ensure_event_name(event)?;

        if self.config.enable_logging {
            debug!(
                event = event,
                priority = priority,
                once = once,
                listener = ?listener,
                "Registering listener"
            );
        }

        self.state
            .lock()
            .listeners
            .add(event, listener, priority, once);
        Ok(())
    }

    /// Emit an event.
    ///
    /// Buckets run in ascending priority, slots in registration order. Only
    /// listeners registered before the call fire: once-listeners of the
    /// snapshot are detached from the registry before any of them runs, and
    /// once-listeners added meanwhile wait for the next emit. With `args`
    /// empty each listener is invoked through the resolver; otherwise it
    /// receives `args` verbatim.
    ///
    /// The first listener error aborts the emission and is returned.
    pub fn emit(&self, event: &str, args: Arguments) -> Result<()> {
        ensure_event_name(event)?;

        let snapshot = match self.state.lock().listeners.get(event) {
            Some(buckets) => buckets.clone(),
            None => {
                if self.config.enable_logging {
                    trace!(event = event, "No listeners registered for event");
                }
                return Ok(());
            }
        };

        if self.config.enable_logging {
            debug!(
                event = event,
                args = args.len(),
                buckets = snapshot.len(),
                "Emitting event"
            );
        }

        for (priority, bucket) in &snapshot {
            for slot in bucket.slots() {
                match slot {
                    Slot::Persistent(listener) => self.invoke(listener, &args)?,
                    Slot::Once(members) => {
                        let taken = self
                            .state
                            .lock()
                            .listeners
                            .take_once(event, *priority, members);
                        for listener in &taken {
                            self.invoke(listener, &args)?;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn invoke(&self, listener: &Listener, args: &Arguments) -> Result<()> {
        match listener {
            Listener::Callable(callable) => {
                if args.is_empty() {
                    self.resolver.resolve_callable(callable)?;
                } else {
                    callable.call(args.clone())?;
                }
            }
            Listener::Method { class, method } => {
                if args.is_empty() {
                    self.resolver.resolve_method(*class, method)?;
                } else {
                    self.resolver.call_method(*class, method, args.clone())?;
                }
            }
        }
        Ok(())
    }

    /// Queue an emission for the next [`dispatch`](Self::dispatch)
    pub fn defer(&self, event: &str, args: Arguments) -> Result<&Self> {
        ensure_event_name(event)?;

        let deferred = DeferredEvent::new(event, args);
        if self.config.enable_logging {
            debug!(event = event, id = %deferred.id, "Deferring event");
        }

        self.state.lock().deferred.push_back(deferred);
        Ok(self)
    }

    /// Emit every deferred event in the order it was deferred.
    ///
    /// The queue is kept, so a second dispatch replays the same events,
    /// unless `clear_after_dispatch` is set, in which case each event leaves
    /// the queue right before it is emitted. If an emission fails, the
    /// events behind it stay queued. Events deferred while dispatching wait
    /// for the next call.
    pub fn dispatch(&self) -> Result<()> {
        if self.config.clear_after_dispatch {
            self.drain_deferred()
        } else {
            self.replay_deferred()
        }
    }

    fn replay_deferred(&self) -> Result<()> {
        let queued = self.state.lock().deferred.clone();
        if self.config.enable_logging {
            info!(count = queued.len(), "Dispatching deferred events");
        }

        for deferred in &queued {
            self.emit_deferred(deferred)?;
        }
        Ok(())
    }

    fn drain_deferred(&self) -> Result<()> {
        let count = self.state.lock().deferred.len();
        if self.config.enable_logging {
            info!(count = count, "Draining deferred events");
        }

        for _ in 0..count {
            let Some(deferred) = self.state.lock().deferred.pop_front() else {
                break;
            };
            self.emit_deferred(&deferred)?;
        }
        Ok(())
    }

    fn emit_deferred(&self, deferred: &DeferredEvent) -> Result<()> {
        if self.config.enable_logging {
            trace!(event = %deferred.event, id = %deferred.id, "Dispatching deferred event");
        }
        self.emit(&deferred.event, deferred.args.clone())
    }

    /// Snapshot of the deferred queue, oldest first
    pub fn deferred(&self) -> Vec<DeferredEvent> {
        self.state.lock().deferred.iter().cloned().collect()
    }

    /// Drop every deferred event
    pub fn clear_deferred(&self) {
        let count = {
            let mut state = self.state.lock();
            let count = state.deferred.len();
            state.deferred.clear();
            count
        };
        if self.config.enable_logging {
            debug!(count = count, "Cleared deferred events");
        }
    }

    /// Snapshot of the whole registry
    pub fn listeners(&self) -> ListenerMap {
        self.state.lock().listeners.all().clone()
    }

    /// Snapshot of one event's buckets; empty if nothing is registered
    pub fn listeners_for(&self, event: &str) -> Result<EventListeners> {
        ensure_event_name(event)?;
        Ok(self
            .state
            .lock()
            .listeners
            .get(event)
            .cloned()
            .unwrap_or_default())
    }

    pub fn has_listeners(&self, event: &str) -> bool {
        self.state.lock().listeners.get(event).is_some()
    }

    /// Number of listeners registered for an event
    pub fn listener_count(&self, event: &str) -> usize {
        self.state
            .lock()
            .listeners
            .get(event)
            .map(|buckets| buckets.values().map(|bucket| bucket.len()).sum())
            .unwrap_or(0)
    }

    /// Remove every listener of one event
    pub fn remove_listeners(&self, event: &str) -> Result<()> {
        ensure_event_name(event)?;
        let removed = self.state.lock().listeners.remove_event(event);

        if self.config.enable_logging && removed.is_some() {
            debug!(event = event, "Removed all listeners for event");
        }
        Ok(())
    }

    /// Remove every listener of every event
    pub fn remove_all_listeners(&self) {
        let count = self.state.lock().listeners.clear();
        if self.config.enable_logging {
            info!(event_count = count, "Cleared all event listeners");
        }
    }

    /// Remove the first registration of `listener` for `event`.
    ///
    /// Later duplicate registrations stay in place.
    pub fn remove_listener(&self, event: &str, listener: impl Into<Listener>) -> Result<()> {
        ensure_event_name(event)?;
        let listener = listener.into();
        let removed = self.state.lock().listeners.remove_first(event, &listener);

        if self.config.enable_logging {
            match removed {
                Some(priority) => debug!(
                    event = event,
                    priority = priority,
                    listener = ?listener,
                    "Removed listener"
                ),
                None => trace!(event = event, listener = ?listener, "Listener not registered"),
            }
        }
        Ok(())
    }

    /// Wire a subscriber's declared methods as persistent listeners at
    /// priority 0.
    ///
    /// The whole declaration is checked before anything is registered.
    pub fn subscribe(&self, subscriber: &dyn EventSubscriber) -> Result<()> {
        let key = subscriber.type_key();
        let class = self.resolver.registry().lookup(key)?;
        let events = subscriber.events();

        let mut entries = Vec::new();
        for (event, methods) in events.iter() {
            ensure_event_name(event)?;
            if methods.names().is_empty() {
                return Err(EventError::InvalidListenerType(format!(
                    "{} declares no method for event `{}`",
                    key.short_name(),
                    event
                )));
            }
            for method in methods.names() {
                if method.is_empty() || !class.has_method(method) {
                    return Err(EventError::InvalidListenerType(format!(
                        "{} has no method `{}` for event `{}`",
                        key.short_name(),
                        method,
                        event
                    )));
                }
                let listener = Listener::Method {
                    class: key,
                    method: method.clone(),
                };
                entries.push((event, listener));
            }
        }

        {
            let mut state = self.state.lock();
            state.subscribed.insert(key);
            for (event, listener) in entries {
                state.listeners.add(event, listener, 0, false);
            }
        }

        if self.config.enable_logging {
            debug!(
                subscriber = key.name(),
                events = events.len(),
                "Subscriber registered"
            );
        }
        Ok(())
    }

    /// Undo [`subscribe`](Self::subscribe).
    ///
    /// Removes every listener of every event the subscriber declares,
    /// including listeners registered independently on those events. A
    /// subscriber that is not subscribed is ignored.
    pub fn unsubscribe(&self, subscriber: &dyn EventSubscriber) -> Result<()> {
        let key = subscriber.type_key();
        let events = subscriber.events();

        let mut state = self.state.lock();
        if !state.subscribed.remove(&key) {
            trace!(subscriber = key.name(), "Subscriber was not subscribed");
            return Ok(());
        }
        for event in events.event_names() {
            state.listeners.remove_event(event);
        }
        drop(state);

        if self.config.enable_logging {
            debug!(
                subscriber = key.name(),
                events = events.len(),
                "Subscriber removed with all listeners of its events"
            );
        }
        Ok(())
    }

    pub fn is_subscribed(&self, subscriber: &dyn EventSubscriber) -> bool {
        let key = subscriber.type_key();
        self.state.lock().subscribed.contains(&key)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EventBus")
            .field("events", &state.listeners.all().len())
            .field("deferred", &state.deferred.len())
            .field("subscribed", &state.subscribed.len())
            .field("config", &self.config)
            .finish()
    }
}

fn ensure_event_name(event: &str) -> Result<()> {
    if event.is_empty() {
        return Err(EventError::InvalidEventName);
    }
    Ok(())
}

/// Event bus builder
pub struct EventBusBuilder {
    config: EventBusConfig,
    resolver: Option<DependencyResolver>,
}

impl EventBusBuilder {
    /// Create new event bus builder
    pub fn new() -> Self {
        Self {
            config: EventBusConfig::default(),
            resolver: None,
        }
    }

    /// Resolver used for argument-less emissions
    pub fn resolver(mut self, resolver: DependencyResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Build the resolver from a type registry
    pub fn registry(self, registry: TypeRegistry) -> Self {
        self.resolver(DependencyResolver::new(registry))
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: EventBusConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable/disable logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    /// Enable/disable draining the deferred queue on dispatch
    pub fn clear_after_dispatch(mut self, enabled: bool) -> Self {
        self.config.clear_after_dispatch = enabled;
        self
    }

    /// Build the event bus
    pub fn build(self) -> EventBus {
        let resolver = self
            .resolver
            .unwrap_or_else(|| DependencyResolver::new(TypeRegistry::new()));
        EventBus::with_config(resolver, self.config)
    }
}

impl Default for EventBusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autowire_resolver::{Callable, args};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counter() -> (Arc<AtomicU32>, Callable) {
        let count = Arc::new(AtomicU32::new(0));
        let handle = count.clone();
        let callable = Callable::from_fn(move |_| {
            handle.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (count, callable)
    }

    #[test]
    fn test_event_bus_emit() {
        let bus = EventBus::new();
        let (count, listener) = counter();

        bus.on("test", listener).unwrap();
        bus.emit("test", args![]).unwrap();
        bus.emit("test", args![]).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_count() {
        let bus = EventBus::new();
        assert_eq!(bus.listener_count("test"), 0);

        bus.on("test", counter().1).unwrap();
        bus.once_with_priority("test", counter().1, 3).unwrap();
        bus.once_with_priority("test", counter().1, 3).unwrap();
        assert_eq!(bus.listener_count("test"), 3);
        assert!(bus.has_listeners("test"));
    }

    #[test]
    fn test_builder() {
        let bus = EventBusBuilder::new()
            .enable_logging(false)
            .clear_after_dispatch(true)
            .build();

        assert!(!bus.config().enable_logging);
        assert!(bus.config().clear_after_dispatch);
    }

    #[test]
    fn test_config_deserialize() {
        let config: EventBusConfig =
            serde_json::from_str(r#"{"clear_after_dispatch": true}"#).unwrap();
        assert!(config.enable_logging);
        assert!(config.clear_after_dispatch);
    }

    #[test]
    fn test_subscribe_rejects_empty_declarations() {
        use crate::subscriber::{EventMap, MethodRef};
        use autowire_resolver::ClassDef;

        #[derive(Default)]
        struct NoMethods;

        impl EventSubscriber for NoMethods {
            fn events(&self) -> EventMap {
                EventMap::new().on("ready", MethodRef::Many(Vec::new()))
            }
        }

        #[derive(Default)]
        struct EmptyEvent;

        impl EventSubscriber for EmptyEvent {
            fn events(&self) -> EventMap {
                EventMap::new().on("", "handle")
            }
        }

        let registry = TypeRegistry::new();
        registry.register(ClassDef::<NoMethods>::without_constructor());
        registry.register(
            ClassDef::<EmptyEvent>::without_constructor().method("handle", [], |_, _| Ok(())),
        );
        let bus = EventBus::with_resolver(DependencyResolver::new(registry));

        assert!(matches!(
            bus.subscribe(&NoMethods),
            Err(EventError::InvalidListenerType(_))
        ));
        assert!(matches!(
            bus.subscribe(&EmptyEvent),
            Err(EventError::InvalidEventName)
        ));
        assert!(bus.listeners().is_empty());
    }

    #[test]
    fn test_clear_deferred() {
        let bus = EventBus::new();
        bus.defer("later", args![1u8]).unwrap();
        assert_eq!(bus.deferred().len(), 1);

        bus.clear_deferred();
        assert!(bus.deferred().is_empty());
    }
}
