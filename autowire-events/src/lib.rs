//! Prioritized event bus for Autowire
//!
//! This crate provides in-process, synchronous event dispatch on top of
//! [`autowire_resolver`].
//!
//! ## Features
//!
//! - **Priorities** - Lower priority values run first
//! - **Once listeners** - Fire at most once, then drop out
//! - **Deferred events** - Queue emissions and replay them on `dispatch`
//! - **Subscribers** - Wire a type's methods to events declaratively
//! - **Auto-wiring** - Emitting without arguments lets the resolver build
//!   every listener's dependencies
//!
//! ## Quick Start
//!
//! ```rust
//! use autowire_events::EventBus;
//! use autowire_resolver::{Callable, args};
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let log = seen.clone();
//! let second = Callable::from_fn(move |_| {
//!     log.lock().unwrap().push("second");
//!     Ok(())
//! });
//! let log = seen.clone();
//! let first = Callable::from_fn(move |_| {
//!     log.lock().unwrap().push("first");
//!     Ok(())
//! });
//!
//! let bus = EventBus::new();
//! bus.on_with_priority("order.placed", second, 10)?
//!     .on_with_priority("order.placed", first, 1)?;
//!
//! bus.emit("order.placed", args![42u64])?;
//! assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
//! # Ok::<(), autowire_events::EventError>(())
//! ```
//!
//! ## Subscribers
//!
//! ```rust,ignore
//! #[derive(Default)]
//! struct Mailer;
//!
//! impl EventSubscriber for Mailer {
//!     fn events(&self) -> EventMap {
//!         EventMap::new().on("user.created", "welcome")
//!     }
//! }
//!
//! registry.register(
//!     ClassDef::<Mailer>::without_constructor()
//!         .method("welcome", [], |_this, _args| Ok(())),
//! );
//!
//! let bus = EventBus::with_resolver(DependencyResolver::new(registry));
//! bus.subscribe(&Mailer)?;
//! bus.emit("user.created", args![])?;   // builds a fresh Mailer
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! let bus = EventBusBuilder::new()
//!     .registry(registry)
//!     .clear_after_dispatch(true)    // Drain the deferred queue on dispatch
//!     .enable_logging(false)
//!     .build();
//! ```

pub mod bus;
pub mod deferred;
pub mod error;
pub mod listener;
mod registry;
pub mod subscriber;

pub use bus::{EventBus, EventBusBuilder, EventBusConfig};
pub use deferred::DeferredEvent;
pub use error::{EventError, Result};
pub use listener::{Listener, PriorityBucket, Slot};
pub use registry::{EventListeners, ListenerMap};
pub use subscriber::{EventMap, EventSubscriber, MethodRef};
