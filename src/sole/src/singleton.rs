use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::registry::{Managed, Registry, RegistryError};

/// A type that obtains its instances through a [`Registry`], so that at most
/// one of them ever exists per registry.
///
/// Implementing [`Singleton`] only requires describing how the type is built
/// from its arguments. The provided [`Singleton::instance`] replaces direct
/// construction: it runs [`Singleton::construct`] on the first request and
/// returns the stored instance on every later one, ignoring the arguments.
/// Since the registry is keyed by type, one registry can serve any number of
/// [`Singleton`] types.
///
/// ```rust
/// # use std::convert::Infallible;
/// # use std::sync::Arc;
/// use sole::prelude::*;
///
/// struct Config {
///     path: String,
/// }
///
/// impl Singleton for Config {
///     type Args = &'static str;
///
///     type Error = Infallible;
///
///     fn construct(path: Self::Args) -> Result<Self, Self::Error> {
///         Ok(Self {
///             path: path.to_owned(),
///         })
///     }
/// }
///
/// let registry = Registry::new();
/// let a = Config::instance(&registry, "/etc/app.toml").unwrap();
/// let b = registry.instance::<Config>("/tmp/other.toml").unwrap();
///
/// assert_eq!(b.path, "/etc/app.toml");
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
///
/// For types with an ordinary constructor, the [`singleton`] attribute is an
/// alternative that wraps the constructor instead.
///
/// [`singleton`]: crate::singleton
pub trait Singleton: Managed + Sized {
    /// Everything the constructor needs. Use a tuple for several values.
    type Args;

    /// The error occurred in construction. It is handed back to the caller
    /// unchanged inside [`RegistryError::Construction`].
    type Error: Debug + Display + 'static;

    /// Builds a new instance. Only ever called by the registry, and at most
    /// once successfully per registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance can't be built.
    fn construct(args: Self::Args) -> Result<Self, Self::Error>;

    /// Returns the only instance of `Self` in `registry`, constructing it
    /// from `args` first if needed.
    ///
    /// # Errors
    ///
    /// See [`Registry::get_or_create`].
    fn instance(
        registry: &Registry,
        args: Self::Args,
    ) -> Result<Arc<Self>, RegistryError<Self::Error>> {
        registry.get_or_create(|| Self::construct(args))
    }
}
