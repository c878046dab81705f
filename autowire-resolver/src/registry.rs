// Type registry: the class metadata the resolver reflects over

use crate::{Arguments, Instance, Param, ResolveError, Result, TypeKey, Value};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

type Factory = Arc<dyn Fn(Arguments) -> Result<Value> + Send + Sync>;
type MethodBody = Arc<dyn Fn(&Instance, Arguments) -> Result<Value> + Send + Sync>;

/// A named method on a registered class
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<Param>,
    body: MethodBody,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Call the method on `receiver` with caller-supplied arguments
    pub fn invoke(&self, receiver: &Instance, args: Arguments) -> Result<Value> {
        (self.body)(receiver, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("params", &self.params.len())
            .finish()
    }
}

#[derive(Clone)]
struct Constructor {
    declared: bool,
    params: Vec<Param>,
    factory: Factory,
}

/// Metadata for one type: whether it can be built, how, and its methods
#[derive(Clone)]
pub struct ClassDescriptor {
    key: TypeKey,
    constructor: Option<Constructor>,
    methods: HashMap<String, MethodDescriptor>,
}

impl ClassDescriptor {
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Abstract types, traits and interfaces are not instantiable
    pub fn is_instantiable(&self) -> bool {
        self.constructor.is_some()
    }

    /// Declared constructor parameters; `None` when no constructor is declared
    pub fn constructor_params(&self) -> Option<&[Param]> {
        self.constructor
            .as_ref()
            .filter(|ctor| ctor.declared)
            .map(|ctor| ctor.params.as_slice())
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub(crate) fn params(&self) -> Result<&[Param]> {
        self.constructor
            .as_ref()
            .map(|ctor| ctor.params.as_slice())
            .ok_or_else(|| ResolveError::NotInstantiable(self.key.name().to_string()))
    }

    pub(crate) fn instantiate(&self, args: Arguments) -> Result<Instance> {
        let ctor = self
            .constructor
            .as_ref()
            .ok_or_else(|| ResolveError::NotInstantiable(self.key.name().to_string()))?;
        let value = (ctor.factory)(args)?;
        Ok(Instance::new(self.key, value))
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("ClassDescriptor")
            .field("key", &self.key)
            .field("instantiable", &self.is_instantiable())
            .field("methods", &methods)
            .finish()
    }
}

/// Typed builder for a [`ClassDescriptor`]
///
/// # Examples
///
/// ```rust
/// use autowire_resolver::{ClassDef, Param, TypeRegistry};
///
/// #[derive(Default)]
/// struct Transport;
///
/// struct Mailer {
///     transport: std::sync::Arc<Transport>,
///     retries: u32,
/// }
///
/// let registry = TypeRegistry::new();
/// registry.register(ClassDef::<Transport>::without_constructor());
/// registry.register(
///     ClassDef::new(
///         [
///             Param::class::<Transport>("transport"),
///             Param::builtin::<u32>("retries").with_default(3u32),
///         ],
///         |args| {
///             Ok(Mailer {
///                 transport: args.arc::<Transport>(0)?,
///                 retries: *args.get::<u32>(1)?,
///             })
///         },
///     )
///     .method("retries", [], |mailer: &Mailer, _| Ok(mailer.retries)),
/// );
/// assert!(registry.has::<Mailer>());
/// ```
pub struct ClassDef<T> {
    descriptor: ClassDescriptor,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ClassDef<T> {
    /// Class with a declared constructor
    pub fn new<P, F>(params: P, factory: F) -> Self
    where
        P: IntoIterator<Item = Param>,
        F: Fn(Arguments) -> Result<T> + Send + Sync + 'static,
    {
        Self::with_constructor(true, params.into_iter().collect(), factory)
    }

    fn with_constructor<F>(declared: bool, params: Vec<Param>, factory: F) -> Self
    where
        F: Fn(Arguments) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            descriptor: ClassDescriptor {
                key: TypeKey::of::<T>(),
                constructor: Some(Constructor {
                    declared,
                    params,
                    factory: Arc::new(move |args| factory(args).map(Value::new)),
                }),
                methods: HashMap::new(),
            },
            _phantom: PhantomData,
        }
    }

    /// Add a method; `body` receives the freshly built receiver
    pub fn method<P, F, R>(mut self, name: impl Into<String>, params: P, body: F) -> Self
    where
        P: IntoIterator<Item = Param>,
        F: Fn(&T, Arguments) -> Result<R> + Send + Sync + 'static,
        R: Any + Send + Sync,
    {
        let name = name.into();
        let method = MethodDescriptor {
            name: name.clone(),
            params: params.into_iter().collect(),
            body: Arc::new(move |receiver, args| {
                let this = receiver.downcast_ref::<T>().ok_or(ResolveError::ArgumentMismatch {
                    position: 0,
                    expected: std::any::type_name::<T>(),
                })?;
                body(this, args).map(Value::new)
            }),
        };
        self.descriptor.methods.insert(name, method);
        self
    }

    /// Finish into the type-erased descriptor
    pub fn build(self) -> ClassDescriptor {
        self.descriptor
    }
}

impl<T: Any + Send + Sync + Default> ClassDef<T> {
    /// Class that declares no constructor; built with `T::default()`
    pub fn without_constructor() -> Self {
        Self::with_constructor(false, Vec::new(), |_| Ok(T::default()))
    }
}

/// Registry of class descriptors keyed by [`TypeKey`].
///
/// Holds metadata only. It never stores instances, so registering a type
/// does not bind it to a value.
#[derive(Clone)]
pub struct TypeRegistry {
    classes: Arc<RwLock<HashMap<TypeKey, Arc<ClassDescriptor>>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        debug!("Creating new type registry");
        Self {
            classes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a concrete class
    pub fn register<T: Any + Send + Sync>(&self, def: ClassDef<T>) -> &Self {
        self.insert(def.build())
    }

    /// Register an abstract type (trait object, interface) that can be named
    /// as a parameter type but never constructed
    pub fn register_abstract<T: ?Sized + 'static>(&self) -> &Self {
        self.insert(ClassDescriptor {
            key: TypeKey::of::<T>(),
            constructor: None,
            methods: HashMap::new(),
        })
    }

    /// Register a pre-built descriptor, replacing any previous one
    pub fn insert(&self, descriptor: ClassDescriptor) -> &Self {
        let key = descriptor.key();
        trace!(class = key.name(), "Acquiring write lock for registration");
        let mut classes = self.classes.write();
        classes.insert(key, Arc::new(descriptor));

        debug!(
            class = key.name(),
            "Class descriptor registered in type registry"
        );
        self
    }

    /// Look up a descriptor, failing with `ClassNotFound`
    pub fn lookup(&self, key: TypeKey) -> Result<Arc<ClassDescriptor>> {
        let classes = self.classes.read();
        let result = classes
            .get(&key)
            .cloned()
            .ok_or_else(|| ResolveError::ClassNotFound(key.name().to_string()));

        if result.is_err() {
            debug!(class = key.name(), "Class not found in type registry");
        }
        result
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        let exists = self.classes.read().contains_key(&key);
        trace!(class = key.name(), exists = exists, "Checked class existence");
        exists
    }

    pub fn has<T: ?Sized + 'static>(&self) -> bool {
        self.contains(TypeKey::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }

    /// Remove every descriptor
    pub fn clear(&self) {
        let mut classes = self.classes.write();
        let count = classes.len();
        classes.clear();

        debug!(class_count = count, "Cleared all classes from type registry");
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("classes", &self.len())
            .finish()
    }
}
