#![allow(clippy::new_without_default)]

//! Type-keyed singletons.
//!
//! A [`Registry`] keeps at most one instance per type and hands out shared
//! references to it. Types can opt in two ways, with identical behavior:
//!
//! - annotate an `impl` block with [`singleton`] and mark its constructor with
//!   `#[constructor]`, which adds a `get_instance` factory wrapping that
//!   constructor;
//! - implement the [`Singleton`] trait, whose provided
//!   [`Singleton::instance`] consults the registry before constructing.
//!
//! Registry activity is reported through [`tracing`] events, e.g. with
//! `RUST_LOG=sole=debug` when a subscriber with an env filter is installed.
//!
//! [`tracing`]: https://docs.rs/tracing

pub mod key;
pub mod registry;
pub mod singleton;

pub use registry::{Registry, RegistryError};
pub use singleton::Singleton;

/// Wraps the constructor of a type so that it yields one shared instance per
/// [`Registry`].
///
/// The attribute goes on an `impl` block in which exactly one associated
/// function is marked with `#[constructor]`. That function must not take
/// `self` and must return `Self` or `Result<Self, E>`. The macro keeps the
/// constructor as is and adds a factory to the same block, named
/// `get_instance` unless another name is given as in
/// `#[singleton(instance)]`. The factory takes a `&Registry` followed by the
/// constructor's arguments and returns `Result<Arc<Self>, RegistryError<E>>`,
/// with `E` being [`Infallible`] for constructors returning `Self`. `E` only
/// has to implement `Debug` and `Display`, so `Result<Self, String>` works.
///
/// ```rust
/// use std::sync::Arc;
///
/// use sole::prelude::*;
///
/// struct MySingleton {
///     valor: i32,
/// }
///
/// #[singleton]
/// impl MySingleton {
///     #[constructor]
///     fn new(valor: i32) -> Self {
///         Self { valor }
///     }
/// }
///
/// let registry = Registry::new();
/// let a = MySingleton::get_instance(&registry, 10).unwrap();
/// let b = MySingleton::get_instance(&registry, 20).unwrap();
///
/// assert_eq!(b.valor, 10);
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
///
/// [`Infallible`]: std::convert::Infallible
pub use sole_derive::singleton;

pub mod prelude {
    pub use crate::registry::{Registry, RegistryError};
    pub use crate::singleton;
    pub use crate::singleton::Singleton;
}
