use std::any::{self, TypeId};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

use crate::registry::Managed;

/// Identity of a singleton type, used as the key of a [`Registry`].
///
/// Two keys are equal if and only if they refer to the same type. The type's
/// name is only kept for diagnostics and doesn't participate in comparison.
///
/// [`Registry`]: crate::registry::Registry
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Debug for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name)
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

/// Returns the key identifying `T`.
pub fn of<T>() -> TypeKey
where
    T: Managed,
{
    TypeKey {
        id: TypeId::of::<T>(),
        name: any::type_name::<T>(),
    }
}
