//! Auto-wiring dependency resolution for Autowire
//!
//! The resolver instantiates objects and invokes routines by inspecting
//! their declared parameters. Parameter metadata lives in a [`TypeRegistry`]
//! of class descriptors keyed by [`TypeKey`]; there is no binding layer and
//! no instance cache.
//!
//! ## Resolution rule
//!
//! - **Untyped / built-in parameter** - the declared default, or
//!   [`ResolveError::UnresolvableParameter`]
//! - **Class parameter** - a fresh instance, built recursively with the same
//!   rule
//!
//! Nested resolution stops at [`ResolverConfig::max_depth`] with
//! [`ResolveError::DependencyCycleSuspected`] so a self-dependent type fails
//! instead of exhausting the stack.
//!
//! ## Quick Start
//!
//! ```rust
//! use autowire_resolver::*;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Connection;
//!
//! struct Repository {
//!     connection: Arc<Connection>,
//! }
//!
//! let registry = TypeRegistry::new();
//! registry.register(ClassDef::<Connection>::without_constructor());
//! registry.register(ClassDef::new([Param::class::<Connection>("connection")], |args| {
//!     Ok(Repository { connection: args.arc::<Connection>(0)? })
//! }));
//!
//! let resolver = DependencyResolver::new(registry);
//! let first = resolver.resolve_constructor(TypeKey::of::<Repository>()).unwrap();
//! let second = resolver.resolve_constructor(TypeKey::of::<Repository>()).unwrap();
//!
//! // Every resolution builds the whole graph again
//! let a = first.downcast_ref::<Repository>().unwrap();
//! let b = second.downcast_ref::<Repository>().unwrap();
//! assert!(!Arc::ptr_eq(&a.connection, &b.connection));
//! ```

pub mod callable;
pub mod error;
pub mod param;
pub mod registry;
pub mod resolver;
pub mod type_key;
pub mod value;

pub use callable::Callable;
pub use error::{ResolveError, Result};
pub use param::{Param, ParamType};
pub use registry::{ClassDef, ClassDescriptor, MethodDescriptor, TypeRegistry};
pub use resolver::{
    DEFAULT_MAX_DEPTH, DependencyResolver, MAX_DEPTH_LIMIT, ResolutionTarget, ResolverConfig,
};
pub use type_key::TypeKey;
pub use value::{Arguments, Instance, Value};
