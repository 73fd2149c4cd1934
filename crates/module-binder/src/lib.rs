//! # Module Binder
//!
//! This crate is the dependency-resolution and lifecycle engine of a minimal application runtime.
//! An application is a set of independently developed **modules**; each declares which other
//! modules it depends on, is configured exactly once in dependency order, and then runs
//! concurrently with all the others until the work is done or something fails.
//!
//! ## Lifecycle
//!
//! ```text
//!  install ──► resolve (configure, dependencies first) ──► freeze ──► run (all concurrently)
//! ```
//!
//! 1. **Install** - [`Binder::install`] registers a module under its [`Key`]. Install order does
//!    not matter; the dependency graph alone decides configuration order.
//! 2. **Resolve** - [`Binder::resolve`] configures a module after recursively configuring every
//!    dependency. Each module's `configure` runs once no matter how many dependents reach it, and
//!    a dependency cycle is reported as [`BinderError::CircularDependency`].
//! 3. **Freeze** - [`Binder::run`] resolves everything that is still unconfigured, then freezes
//!    the binder. From here on `install` and `resolve` fail.
//! 4. **Run** - every module's [`Module::run`] starts in its own Tokio task. The first failure
//!    (error or panic) cancels the shared [`CancellationToken`] and becomes the result.
//!
//! ## Example
//!
//! ```rust
//! use module_binder::{Binder, BoxError, Handle, Key, Module};
//! use async_trait::async_trait;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use tokio_util::sync::CancellationToken;
//!
//! // A module other modules can wire themselves to.
//! #[derive(Default)]
//! struct Counter {
//!     hits: AtomicU32,
//! }
//!
//! const COUNTER: Handle<Counter> = Handle::new("counter");
//!
//! impl Module for Counter {
//!     fn name(&self) -> Key {
//!         COUNTER.key()
//!     }
//! }
//!
//! // A module that depends on the counter.
//! struct Client;
//!
//! #[async_trait]
//! impl Module for Client {
//!     fn name(&self) -> Key {
//!         Key::from("client")
//!     }
//!
//!     fn depends(&self) -> Vec<Key> {
//!         vec![COUNTER.key()]
//!     }
//!
//!     fn configure(&mut self, binder: &Binder) -> Result<(), BoxError> {
//!         // Already configured, because it is a declared dependency.
//!         COUNTER.get(binder)?.hits.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     }
//!
//!     async fn run(&self, _ctx: CancellationToken) -> Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), BoxError> {
//!     let binder = Binder::new();
//!     binder.install(Client)?;
//!     binder.install(Counter::default())?;
//!
//!     binder.run(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Model
//!
//! Everything is reported through [`BinderError`]. Setup contract violations (duplicate install,
//! use after freeze, unknown keys) are returned, not panicked; the caller decides whether that
//! is fatal. Panics inside module-supplied `configure` and `run` code are caught and returned as
//! [`BinderError::ConfigurePanic`] / [`BinderError::RunPanic`].
//!
//! ## Concurrency Model
//!
//! - Installation and resolution are synchronous and logically single-threaded.
//! - Resolution may re-enter the binder only through `configure` calling `resolve`.
//! - The run phase is one Tokio task per module, all sharing one cancellation token.
//! - Modules cooperate through `Arc` references obtained while configuring; there is no other
//!   channel between them.

pub mod binder;
pub mod binding;
pub mod error;
pub mod key;
pub mod module;
mod runner;

// Re-export core types for convenience
pub use binder::Binder;
pub use binding::BindingState;
pub use error::BinderError;
pub use key::{Handle, Key};
pub use module::{AsAnyArc, BoxError, Module};
pub use tokio_util::sync::CancellationToken;
