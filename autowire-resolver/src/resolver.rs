// Auto-wiring dependency resolver

use crate::{
    Arguments, Callable, ClassDescriptor, Instance, Param, ParamType, ResolveError, Result,
    TypeKey, TypeRegistry, Value,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Default ceiling on nested constructor resolution
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Highest `max_depth` the resolver honors; larger values are clamped
pub const MAX_DEPTH_LIMIT: usize = 128;

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Deepest nesting of constructor resolution before the resolver gives up
    /// with `DependencyCycleSuspected`.
    ///
    /// Capped at [`MAX_DEPTH_LIMIT`]; see [`effective_max_depth`](Self::effective_max_depth).
    pub max_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ResolverConfig {
    /// Set the depth limit, clamped to [`MAX_DEPTH_LIMIT`]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH_LIMIT);
        self
    }

    /// The limit the resolver applies
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.min(MAX_DEPTH_LIMIT)
    }
}

/// What to resolve: a type, or an existing instance whose type is used
#[derive(Debug, Clone)]
pub enum ResolutionTarget {
    Type(TypeKey),
    Instance(Instance),
}

impl ResolutionTarget {
    pub fn type_key(&self) -> TypeKey {
        match self {
            ResolutionTarget::Type(key) => *key,
            ResolutionTarget::Instance(instance) => instance.type_key(),
        }
    }
}

impl From<TypeKey> for ResolutionTarget {
    fn from(key: TypeKey) -> Self {
        ResolutionTarget::Type(key)
    }
}

impl From<Instance> for ResolutionTarget {
    fn from(instance: Instance) -> Self {
        ResolutionTarget::Instance(instance)
    }
}

impl From<&Instance> for ResolutionTarget {
    fn from(instance: &Instance) -> Self {
        ResolutionTarget::Instance(instance.clone())
    }
}

/// Depth and path of one nested resolution.
///
/// Every dependency gets its own context derived from its parent's; nothing
/// is shared between sibling resolutions.
#[derive(Debug)]
struct ResolutionContext {
    depth: usize,
    path: Vec<&'static str>,
}

impl ResolutionContext {
    fn root(key: TypeKey) -> Self {
        Self {
            depth: 0,
            path: vec![key.short_name()],
        }
    }

    fn descend(&self, key: TypeKey, max_depth: usize) -> Result<Self> {
        let depth = self.depth + 1;
        let mut path = self.path.clone();
        path.push(key.short_name());

        if depth > max_depth {
            let path = path.join(" -> ");
            warn!(depth = depth, path = %path, "Resolution depth exceeded");
            return Err(ResolveError::DependencyCycleSuspected { depth, path });
        }

        Ok(Self { depth, path })
    }
}

/// Builds objects and invokes routines by resolving their declared
/// parameters.
///
/// Class-typed parameters are constructed recursively, from scratch, every
/// time they occur. Untyped and built-in parameters fall back to their
/// default value. Nothing is cached between or within calls.
///
/// # Examples
///
/// ```rust
/// use autowire_resolver::{ClassDef, DependencyResolver, Param, TypeKey, TypeRegistry};
///
/// #[derive(Default)]
/// struct Clock;
///
/// struct Greeter {
///     _clock: std::sync::Arc<Clock>,
/// }
///
/// let registry = TypeRegistry::new();
/// registry.register(ClassDef::<Clock>::without_constructor());
/// registry.register(
///     ClassDef::new([Param::class::<Clock>("clock")], |args| {
///         Ok(Greeter { _clock: args.arc::<Clock>(0)? })
///     })
///     .method("greet", [Param::untyped("name").with_default("world")], |_: &Greeter, args| {
///         Ok(format!("hello {}", args.get::<&str>(0)?))
///     }),
/// );
///
/// let resolver = DependencyResolver::new(registry);
/// let greeting = resolver.resolve_method(TypeKey::of::<Greeter>(), "greet").unwrap();
/// assert_eq!(greeting.downcast_ref::<String>().unwrap(), "hello world");
/// ```
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    registry: TypeRegistry,
    config: Arc<ResolverConfig>,
    target: Option<ResolutionTarget>,
}

impl DependencyResolver {
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_config(registry, ResolverConfig::default())
    }

    pub fn with_config(registry: TypeRegistry, config: ResolverConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
            target: None,
        }
    }

    /// Resolver with a default target for [`constructor`](Self::constructor)
    /// and [`method`](Self::method)
    pub fn for_target(mut self, target: impl Into<ResolutionTarget>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn target(&self) -> Option<&ResolutionTarget> {
        self.target.as_ref()
    }

    /// Construct the default target
    pub fn constructor(&self) -> Result<Instance> {
        let target = self.target.clone().ok_or(ResolveError::MissingTarget)?;
        self.resolve_constructor(target)
    }

    /// Invoke `method` on a fresh instance of the default target
    pub fn method(&self, method: &str) -> Result<Value> {
        let target = self.target.clone().ok_or(ResolveError::MissingTarget)?;
        self.resolve_method(target, method)
    }

    /// Construct an instance of the target type, resolving every constructor
    /// parameter.
    ///
    /// An instance target only contributes its type: the result is always a
    /// new object.
    pub fn resolve_constructor(&self, target: impl Into<ResolutionTarget>) -> Result<Instance> {
        let key = target.into().type_key();
        self.construct(key, &ResolutionContext::root(key))
    }

    /// Invoke `method` on a freshly constructed instance of the target type,
    /// resolving the method's parameters
    pub fn resolve_method(
        &self,
        target: impl Into<ResolutionTarget>,
        method: &str,
    ) -> Result<Value> {
        let key = target.into().type_key();
        let class = self.instantiable(key)?;
        let descriptor = find_method(&class, method)?;

        let ctx = ResolutionContext::root(key);
        let receiver = self.construct_from(&class, &ctx)?;
        let args = self.resolve_parameters(descriptor.params(), &ctx)?;

        debug!(
            class = key.name(),
            method = method,
            args = args.len(),
            "Invoking resolved method"
        );
        descriptor.invoke(&receiver, args)
    }

    /// Invoke `method` on a freshly constructed instance of the target type
    /// with caller-supplied arguments, used verbatim
    pub fn call_method(
        &self,
        target: impl Into<ResolutionTarget>,
        method: &str,
        args: Arguments,
    ) -> Result<Value> {
        let key = target.into().type_key();
        let class = self.instantiable(key)?;
        let descriptor = find_method(&class, method)?;

        let receiver = self.construct_from(&class, &ResolutionContext::root(key))?;

        debug!(
            class = key.name(),
            method = method,
            args = args.len(),
            "Invoking method with explicit arguments"
        );
        descriptor.invoke(&receiver, args)
    }

    /// Invoke a callable after resolving each of its parameters
    pub fn resolve_callable(&self, callable: &Callable) -> Result<Value> {
        let ctx = ResolutionContext {
            depth: 0,
            path: vec!["<callable>"],
        };
        let args = self.resolve_parameters(callable.params(), &ctx)?;

        trace!(args = args.len(), "Invoking resolved callable");
        callable.call(args)
    }

    fn instantiable(&self, key: TypeKey) -> Result<Arc<ClassDescriptor>> {
        let class = self.registry.lookup(key)?;
        if !class.is_instantiable() {
            debug!(class = key.name(), "Class is not instantiable");
            return Err(ResolveError::NotInstantiable(key.name().to_string()));
        }
        Ok(class)
    }

    fn construct(&self, key: TypeKey, ctx: &ResolutionContext) -> Result<Instance> {
        let class = self.instantiable(key)?;
        self.construct_from(&class, ctx)
    }

    fn construct_from(&self, class: &ClassDescriptor, ctx: &ResolutionContext) -> Result<Instance> {
        let args = self.resolve_parameters(class.params()?, ctx)?;

        trace!(
            class = class.key().name(),
            depth = ctx.depth,
            args = args.len(),
            "Constructing instance"
        );
        class.instantiate(args)
    }

    fn resolve_parameters(&self, params: &[Param], ctx: &ResolutionContext) -> Result<Arguments> {
        let mut args = Arguments::new();
        for param in params {
            args.push(self.resolve_parameter(param, ctx)?);
        }
        Ok(args)
    }

    fn resolve_parameter(&self, param: &Param, ctx: &ResolutionContext) -> Result<Value> {
        match param.kind() {
            ParamType::Untyped | ParamType::Builtin(_) => match param.default_value() {
                Some(default) => Ok(default.clone()),
                None => {
                    debug!(parameter = param.name(), "Parameter has no type and no default");
                    Err(ResolveError::UnresolvableParameter(param.name().to_string()))
                }
            },
            ParamType::Class(key) => {
                let nested = ctx.descend(key, self.config.effective_max_depth())?;
                self.construct(key, &nested).map(Instance::into_value)
            }
        }
    }
}

fn find_method<'a>(
    class: &'a ClassDescriptor,
    method: &str,
) -> Result<&'a crate::MethodDescriptor> {
    class.method(method).ok_or_else(|| ResolveError::MethodNotFound {
        class: class.key().name().to_string(),
        method: method.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassDef;

    #[derive(Default)]
    struct Leaf;

    struct Node {
        _leaf: Arc<Leaf>,
    }

    fn registry() -> TypeRegistry {
        let registry = TypeRegistry::new();
        registry.register(ClassDef::<Leaf>::without_constructor());
        registry.register(ClassDef::new([Param::class::<Leaf>("leaf")], |args| {
            Ok(Node {
                _leaf: args.arc::<Leaf>(0)?,
            })
        }));
        registry
    }

    #[test]
    fn test_context_depth_guard() {
        let root = ResolutionContext::root(TypeKey::of::<Node>());
        let child = root.descend(TypeKey::of::<Leaf>(), 1).unwrap();
        assert_eq!(child.depth, 1);
        assert_eq!(child.path, vec!["Node", "Leaf"]);

        let err = child.descend(TypeKey::of::<Leaf>(), 1).unwrap_err();
        match err {
            ResolveError::DependencyCycleSuspected { depth, path } => {
                assert_eq!(depth, 2);
                assert_eq!(path, "Node -> Leaf -> Leaf");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_target() {
        let resolver = DependencyResolver::new(registry());
        assert!(matches!(
            resolver.constructor(),
            Err(ResolveError::MissingTarget)
        ));
        assert!(matches!(
            resolver.method("anything"),
            Err(ResolveError::MissingTarget)
        ));
    }

    #[test]
    fn test_default_target() {
        let resolver = DependencyResolver::new(registry()).for_target(TypeKey::of::<Node>());
        let node = resolver.constructor().unwrap();
        assert!(node.downcast_ref::<Node>().is_some());
    }

    #[test]
    fn test_depth_limit_of_zero_rejects_any_dependency() {
        let config = ResolverConfig::default().with_max_depth(0);
        let resolver = DependencyResolver::with_config(registry(), config);
        assert!(resolver.resolve_constructor(TypeKey::of::<Leaf>()).is_ok());
        let err = resolver.resolve_constructor(TypeKey::of::<Node>()).unwrap_err();
        assert!(err.is_cycle());
    }

    #[test]
    fn test_max_depth_is_clamped() {
        let config = ResolverConfig::default().with_max_depth(20_000);
        assert_eq!(config.max_depth, MAX_DEPTH_LIMIT);

        let config: ResolverConfig = serde_json::from_str(r#"{"max_depth": 20000}"#).unwrap();
        assert_eq!(config.effective_max_depth(), MAX_DEPTH_LIMIT);
        assert_eq!(ResolverConfig::default().effective_max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: ResolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);

        let config: ResolverConfig = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(config.max_depth, 8);
    }
}
