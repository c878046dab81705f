// Autowire - an auto-wiring dependency resolver with a prioritized event bus
//
// Constructors, methods and callables declare their parameters once in a
// `TypeRegistry`; the resolver builds every class-typed dependency fresh on
// demand and the event bus uses it to invoke listeners emitted without
// arguments.

// Re-export the member crates
pub use autowire_events as events;
pub use autowire_log as log;
pub use autowire_resolver as resolver;

#[cfg(feature = "config")]
pub use autowire_config as config;

pub use autowire_events::{
    DeferredEvent, EventBus, EventBusBuilder, EventBusConfig, EventError, EventListeners,
    EventMap, EventSubscriber, Listener, ListenerMap, MethodRef, PriorityBucket, Slot,
};
pub use autowire_resolver::{
    Arguments, Callable, ClassDef, ClassDescriptor, DependencyResolver, Instance,
    MethodDescriptor, Param, ParamType, ResolutionTarget, ResolveError, ResolverConfig, TypeKey,
    TypeRegistry, Value, args,
};

use tracing::debug;

/// A resolver and an event bus sharing one type registry.
#[derive(Debug, Clone)]
pub struct Autowire {
    resolver: DependencyResolver,
    bus: EventBus,
}

impl Autowire {
    /// Default configuration over `registry`
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_configs(registry, ResolverConfig::default(), EventBusConfig::default())
    }

    pub fn with_configs(
        registry: TypeRegistry,
        resolver: ResolverConfig,
        events: EventBusConfig,
    ) -> Self {
        let resolver = DependencyResolver::with_config(registry, resolver);
        let bus = EventBus::with_config(resolver.clone(), events);
        debug!(
            max_depth = resolver.config().max_depth,
            clear_after_dispatch = bus.config().clear_after_dispatch,
            "Autowire runtime created"
        );
        Self { resolver, bus }
    }

    /// Build from loaded settings; logging is left to [`Autowire::init_logging`]
    #[cfg(feature = "config")]
    pub fn from_settings(settings: &autowire_config::Settings, registry: TypeRegistry) -> Self {
        Self::with_configs(
            registry,
            settings.resolver.clone(),
            settings.events.clone(),
        )
    }

    /// Install the global `tracing` subscriber described by `config`.
    ///
    /// Returns `false` if a subscriber was already installed.
    pub fn init_logging(config: &autowire_log::LogConfig) -> bool {
        autowire_log::init_with(config)
    }

    pub fn resolver(&self) -> &DependencyResolver {
        &self.resolver
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.resolver.registry()
    }
}

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Arguments, Autowire, Callable, ClassDef, DependencyResolver, EventBus, EventError,
        EventMap, EventSubscriber, Listener, Param, ResolveError, TypeKey, TypeRegistry, Value,
        args,
    };
}
