// Typed handles standing in for class names

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies a type in the [`TypeRegistry`](crate::TypeRegistry).
///
/// Equality and hashing use the `TypeId` only; the name is kept for
/// diagnostics and error messages.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for `T`, which may be unsized (e.g. `dyn Trait`)
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(pos) => &self.name[pos + 2..],
            None => self.name,
        }
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mailer;
    trait Transport {}

    #[test]
    fn test_equality_by_type() {
        assert_eq!(TypeKey::of::<Mailer>(), TypeKey::of::<Mailer>());
        assert_ne!(TypeKey::of::<Mailer>(), TypeKey::of::<String>());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(TypeKey::of::<Mailer>().short_name(), "Mailer");
        assert_eq!(TypeKey::of::<u32>().short_name(), "u32");
        assert!(TypeKey::of::<dyn Transport>().name().contains("Transport"));
    }
}
