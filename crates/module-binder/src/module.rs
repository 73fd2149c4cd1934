//! # Module Trait
//!
//! The `Module` trait is the contract every unit of functionality implements to be managed by the
//! [`Binder`]: an identity ([`Module::name`]), declared dependencies ([`Module::depends`]), a
//! synchronous setup step ([`Module::configure`]) and a long-running step ([`Module::run`]).
//!
//! # Provided Methods
//! Only [`Module::name`] is required. The other three have zero-behaviour defaults, so a module
//! that has no dependencies, needs no configure step, or does no background work simply leaves
//! the corresponding method out:
//!
//! | Method      | Default                         |
//! |-------------|---------------------------------|
//! | `depends`   | no dependencies                 |
//! | `configure` | succeeds without doing anything |
//! | `run`       | returns `Ok(())` immediately    |
//!
//! # Phases
//! `configure` runs exactly once, after every declared dependency has been configured, and may call
//! [`Binder::resolve`] / [`Handle::get`](crate::Handle::get) to wire itself to those dependencies.
//! It must be deterministic, fast, and must not wait on external events.
//!
//! `run` is invoked once the binder is frozen. It receives the shared [`CancellationToken`] and
//! must return promptly after the token is cancelled. It must not call back into the binder.

use std::any::Any;
use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::binder::Binder;
use crate::key::Key;

/// Error type returned by module-supplied code.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Upcast helper that lets the binder recover the concrete type behind an `Arc<dyn Module>`.
///
/// Implemented for every sized `Any + Send + Sync` type; never implement it by hand.
pub trait AsAnyArc: Any + Send + Sync {
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAnyArc for T {
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A unit of functionality with a configure-then-run lifecycle.
///
/// # Example
///
/// ```rust
/// use module_binder::{Binder, BoxError, Key, Module};
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// #[async_trait]
/// impl Module for Greeter {
///     fn name(&self) -> Key {
///         Key::from("greeter")
///     }
///
///     fn configure(&mut self, _binder: &Binder) -> Result<(), BoxError> {
///         self.greeting = "hello".to_string();
///         Ok(())
///     }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError> {
///         ctx.cancelled().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Module: AsAnyArc {
    /// The key this module is installed under. Must be stable for the life of the module.
    fn name(&self) -> Key;

    /// Keys of the modules that must be configured before this one.
    fn depends(&self) -> Vec<Key> {
        Vec::new()
    }

    /// Sets the module up before it runs. Called once, dependencies first.
    fn configure(&mut self, binder: &Binder) -> Result<(), BoxError> {
        let _ = binder;
        Ok(())
    }

    /// Does the module's work until it is finished or `ctx` is cancelled.
    async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError> {
        let _ = ctx;
        Ok(())
    }
}
