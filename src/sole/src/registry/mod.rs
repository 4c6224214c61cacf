mod core;
mod object_map;

use std::any::Any;
use std::convert::Infallible;
use std::fmt::{Debug, Display};
use std::sync::Arc;

use snafu::prelude::*;

use crate::key::{self, TypeKey};
use crate::registry::core::{Claim, ConstructionGuard, RegistryCore};
use crate::singleton::Singleton;

/// A type whose single instance can be kept in a [`Registry`].
pub trait Managed: Any + Send + Sync {}

impl<T> Managed for T where T: Any + Send + Sync {}

pub(crate) type SharedObject = Arc<dyn Any + Send + Sync>;

/// A mapping from a type to its only instance, created lazily on the first
/// request.
///
/// Instances are handed out as [`Arc`]s pointing to the very same object, so
/// identity can be checked with [`Arc::ptr_eq`]. An entry, once stored, is
/// never replaced or removed for as long as the registry lives.
///
/// Cloning a [`Registry`] produces another handle to the same mapping, which
/// is handy for moving it into threads. Each [`Registry::new`] call starts
/// from an empty mapping.
///
/// # Concurrency
///
/// The registry can be shared among threads. Checking for an instance and
/// starting its construction is one critical section: when several threads
/// request a missing type at the same time, only one of them runs the
/// constructor while the others block until it finishes and then receive the
/// same instance. If that construction fails, a blocked caller starts over and
/// may run its own constructor.
///
/// The lock is not held while user code runs, so constructors of different
/// types can proceed in parallel and may request other singletons from the
/// same registry.
///
/// ```rust
/// use std::sync::Arc;
///
/// use sole::Registry;
///
/// struct Settings {
///     level: u8,
/// }
///
/// let registry = Registry::new();
/// let first = registry.get_or_init(|| Settings { level: 1 }).unwrap();
/// let second = registry.get_or_init(|| Settings { level: 2 }).unwrap();
///
/// assert_eq!(second.level, 1);
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
#[derive(Clone)]
pub struct Registry {
    core: Arc<RegistryCore>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            core: Arc::new(RegistryCore::new()),
        }
    }

    /// Returns the instance of `T`, running `construct` first if no instance
    /// exists yet.
    ///
    /// `construct` is called at most once per type over the registry's
    /// lifetime, counting only successful calls. When the instance already
    /// exists, `construct` and everything it captured are dropped unused.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Construction`] wrapping the error of
    /// `construct` if it fails. Nothing is stored then, and a later call will
    /// try to construct the instance again.
    ///
    /// Returns [`RegistryError::Reentrant`] if `construct` itself, directly or
    /// not, requests `T` from this registry.
    pub fn get_or_create<T, F, E>(&self, construct: F) -> Result<Arc<T>, RegistryError<E>>
    where
        T: Managed,
        F: FnOnce() -> Result<T, E>,
        E: Debug + Display + 'static,
    {
        let key = key::of::<T>();
        loop {
            match self.core.claim(key) {
                Claim::Constructed(object) => return Ok(Self::downcast(object)),
                Claim::Waiting(receiver) => self.core.wait(key, receiver),
                Claim::Owned(guard) => return Self::construct(guard, construct),
                Claim::Reentrant => return Err(RegistryError::Reentrant { key }),
            }
        }
    }

    /// Same as [`Registry::get_or_create`] for constructors which never fail.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Reentrant`] if `construct` itself, directly or
    /// not, requests `T` from this registry.
    pub fn get_or_init<T, F>(&self, construct: F) -> Result<Arc<T>, RegistryError<Infallible>>
    where
        T: Managed,
        F: FnOnce() -> T,
    {
        self.get_or_create(|| Ok(construct()))
    }

    /// Returns the instance of the [`Singleton`] `T`, constructing it from
    /// `args` if it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// See [`Registry::get_or_create`].
    pub fn instance<T>(&self, args: T::Args) -> Result<Arc<T>, RegistryError<T::Error>>
    where
        T: Singleton,
    {
        T::instance(self, args)
    }

    /// Returns the instance of `T` if it has been constructed, without ever
    /// constructing it.
    pub fn get<T: Managed>(&self) -> Option<Arc<T>> {
        self.core.get(&key::of::<T>()).map(Self::downcast)
    }

    pub fn contains<T: Managed>(&self) -> bool {
        self.core.get(&key::of::<T>()).is_some()
    }

    /// Returns the number of constructed instances.
    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn construct<T, F, E>(
        guard: ConstructionGuard<'_>,
        construct: F,
    ) -> Result<Arc<T>, RegistryError<E>>
    where
        T: Managed,
        F: FnOnce() -> Result<T, E>,
        E: Debug + Display + 'static,
    {
        let key = guard.key();
        match construct() {
            Ok(object) => {
                let object = Arc::new(object);
                guard.complete(Arc::clone(&object) as SharedObject);
                Ok(object)
            }
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "singleton construction failed");
                drop(guard);
                Err(RegistryError::Construction { key, error })
            }
        }
    }

    fn downcast<T: Managed>(object: SharedObject) -> Arc<T> {
        match object.downcast::<T>() {
            Ok(object) => object,
            Err(_) => unreachable!("the object stored under the key of `T` should be a `T`"),
        }
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError<E>
where
    E: Debug + Display + 'static,
{
    /// The constructor failed. Its error is kept as is rather than as the
    /// error source, so it doesn't have to implement [`Error`].
    ///
    /// [`Error`]: std::error::Error
    #[snafu(display("could not construct the singleton {key}: {error}"))]
    #[non_exhaustive]
    Construction { key: TypeKey, error: E },
    #[snafu(display("could not construct the singleton {key} which requests itself during construction"))]
    #[non_exhaustive]
    Reentrant { key: TypeKey },
}

impl<E> RegistryError<E>
where
    E: Debug + Display + 'static,
{
    /// Returns the key of the singleton whose request failed.
    pub fn key(&self) -> TypeKey {
        match self {
            Self::Construction { key, .. } | Self::Reentrant { key } => *key,
        }
    }

    /// Returns the constructor's own error, if that is what failed.
    pub fn into_error(self) -> Option<E> {
        match self {
            Self::Construction { error, .. } => Some(error),
            Self::Reentrant { .. } => None,
        }
    }
}
