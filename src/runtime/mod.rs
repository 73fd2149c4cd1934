//! # Process Entry Glue
//!
//! Connects a [`Binder`] to the outside world:
//!
//! - installs the application's modules into a fresh, explicit binder (there is no process-wide
//!   registry; every call builds its own);
//! - derives the run's root token from the caller's token and, when enabled, cancels it on
//!   Ctrl-C / SIGTERM;
//! - bounds how long modules may take to stop once shutdown was requested.
//!
//! # Example
//!
//! ```rust,ignore
//! #[tokio::main]
//! async fn main() -> Result<(), RuntimeError> {
//!     setup_tracing();
//!     let options = RuntimeOptions::from_env()?;
//!     runtime::run_with_options(
//!         CancellationToken::new(),
//!         vec![Box::new(TimerModule::new()), Box::new(MyModule::new())],
//!         options,
//!     )
//!     .await
//! }
//! ```
//!
//! # Shutdown Grace
//!
//! The grace period starts when the root token is cancelled, whether by a signal or by the
//! caller. A module failure cancels only the binder's internal token, so it does not start the
//! grace timer. If the period expires, the pending run is dropped, which aborts the module tasks,
//! and [`RuntimeError::ShutdownTimeout`] is returned.

mod options;
mod signal;
pub mod tracing;

pub use options::{RuntimeOptions, HANDLE_SIGNALS_ENV, SHUTDOWN_GRACE_ENV};
pub use self::tracing::setup_tracing;

use std::future::Future;
use std::time::Duration;

use module_binder::{Binder, BinderError, Module};
use tokio_util::sync::CancellationToken;
use ::tracing::{info, warn};

/// Errors returned by the process entry points.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Binder(#[from] BinderError),

    #[error("invalid value {value:?} for {name}")]
    InvalidOption { name: &'static str, value: String },

    #[error("modules did not stop within {0:?} of shutdown")]
    ShutdownTimeout(Duration),
}

/// Runs `modules` with [`RuntimeOptions::default`].
pub async fn run(ctx: CancellationToken, modules: Vec<Box<dyn Module>>) -> Result<(), RuntimeError> {
    run_with_options(ctx, modules, RuntimeOptions::default()).await
}

/// Installs `modules` into a new binder and runs it until every module has stopped.
pub async fn run_with_options(
    ctx: CancellationToken,
    modules: Vec<Box<dyn Module>>,
    options: RuntimeOptions,
) -> Result<(), RuntimeError> {
    let binder = Binder::new();
    for module in modules {
        binder.install_boxed(module)?;
    }
    run_binder(binder, ctx, options).await
}

/// Runs an already populated binder under `options`.
pub async fn run_binder(
    binder: Binder,
    ctx: CancellationToken,
    options: RuntimeOptions,
) -> Result<(), RuntimeError> {
    let shutdown = ctx.child_token();
    let watcher = options
        .handle_signals
        .then(|| signal::spawn_signal_watcher(shutdown.clone()));

    info!(modules = binder.len(), "Starting application");
    let result = supervise(binder.run(shutdown.clone()), &shutdown, options.shutdown_grace).await;

    if let Some(watcher) = watcher {
        watcher.abort();
    }
    match &result {
        Ok(()) => info!("Application stopped"),
        Err(err) => warn!(error = %err, "Application stopped with error"),
    }
    result
}

async fn supervise<F>(
    run: F,
    shutdown: &CancellationToken,
    grace: Option<Duration>,
) -> Result<(), RuntimeError>
where
    F: Future<Output = Result<(), BinderError>>,
{
    let Some(grace) = grace else {
        return run.await.map_err(RuntimeError::from);
    };

    tokio::pin!(run);
    tokio::select! {
        biased;
        result = &mut run => result.map_err(RuntimeError::from),
        () = expire_after_shutdown(shutdown, grace) => Err(RuntimeError::ShutdownTimeout(grace)),
    }
}

async fn expire_after_shutdown(shutdown: &CancellationToken, grace: Duration) {
    shutdown.cancelled().await;
    info!(?grace, "Shutdown requested, waiting for modules to stop");
    tokio::time::sleep(grace).await;
}
