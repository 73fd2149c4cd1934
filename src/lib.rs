#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # App Runtime
//!
//! > **A minimal application runtime built from independently developed modules.**
//!
//! An application is a list of modules. Each module names the modules it depends on, gets
//! configured exactly once after its dependencies, and then runs concurrently with everything
//! else until the work is done, the process is asked to stop, or one module fails.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Why a Binder?
//!
//! Wiring is where modular applications get complicated. Instead of a hand-written `main` that
//! constructs everything in the right order, each module declares its dependencies and the
//! [`Binder`] works out the order:
//! - **Lazy**: a module is configured the first time something needs it.
//! - **Memoized**: however many dependents reach it, `configure` runs once.
//! - **Checked**: unknown keys and dependency cycles are errors, not hangs.
//!
//! ### Configure, Then Run
//!
//! The two phases are strictly separated. While configuring, modules may look each other up and
//! exchange `Arc` references or register callbacks. Once the binder is frozen, only `run` is
//! left: all modules in parallel, all sharing one cancellation token.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Explicit Binders
//! There is no process-wide default registry. [`runtime::run`] builds a fresh binder from the
//! modules it is given, and tests can create as many independent binders as they like.
//!
//! ### 2. Errors, Not Aborts
//! Contract violations such as a duplicate install or a resolve after freeze are returned as
//! [`BinderError`] variants. Panics inside module code are caught at the module boundary and
//! reported with the module's key.
//!
//! ### 3. First Failure Wins
//! The first module to fail cancels its siblings; their follow-up errors are dropped and the
//! run returns that first failure.
//!
//! ### 4. Observability
//! We use `tracing` everywhere with structured fields (`module = "timer"`).
//! See [`runtime::setup_tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`module_binder`])
//! Keys, the [`Module`] trait, the [`Binder`] and its concurrent runner. Re-exported here.
//!
//! ### 2. The Glue ([`runtime`])
//! - **Role**: process entry points, OS signal wiring, shutdown grace period, logging setup.
//! - **Key items**: [`runtime::run_with_options`], [`runtime::RuntimeOptions`].
//!
//! ### 3. The Building Blocks ([`timer`], [`http`])
//! Ready-made modules other modules can depend on.
//! - **Key items**: [`timer::TimerModule`], [`timer::TIMER`], [`http::HttpModule`], [`http::HTTP`].
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the heartbeat demo with lifecycle logs
//! RUST_LOG=info cargo run -p binder-sample
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test --workspace
//! ```

pub mod http;
pub mod runtime;
pub mod timer;

pub use module_binder::{
    AsAnyArc, Binder, BinderError, BindingState, BoxError, CancellationToken, Handle, Key, Module,
};
pub use runtime::{RuntimeError, RuntimeOptions};
