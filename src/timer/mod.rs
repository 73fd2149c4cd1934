//! # Timer Module
//!
//! A reusable module that runs registered callbacks on fixed intervals.
//!
//! Other modules declare a dependency on [`TIMER`] and register their callbacks while they are
//! being configured:
//!
//! ```rust,ignore
//! fn depends(&self) -> Vec<Key> {
//!     vec![TIMER.key()]
//! }
//!
//! fn configure(&mut self, binder: &Binder) -> Result<(), BoxError> {
//!     TIMER.get(binder)?.register(Duration::from_secs(1), |_ctx, at| async move {
//!         tracing::info!(?at, "Tick");
//!         Ok(())
//!     })?;
//!     Ok(())
//! }
//! ```
//!
//! ## Run Semantics
//!
//! - One ticker per registration; the first tick fires one interval after the module starts.
//! - Callbacks run inside a panic boundary; a panic becomes [`TimerError::CallbackPanicked`].
//! - The first failing callback cancels every other ticker and its error is the module's result.
//! - Cancellation of the module's token is a clean exit (`Ok(())`).
//! - With nothing registered, `run` returns immediately.

mod error;

pub use error::TimerError;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use module_binder::error::panic_message;
use module_binder::{BoxError, Handle, Key, Module};
use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Typed key of the timer module.
pub const TIMER: Handle<TimerModule> = Handle::new("timer");

/// Callback invoked on every tick with the module's token and the tick's scheduled instant.
pub type TimerCallback =
    Arc<dyn Fn(CancellationToken, Instant) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

#[derive(Clone)]
struct RegisteredTimer {
    interval: Duration,
    callback: TimerCallback,
}

#[derive(Default)]
struct TimerState {
    timers: Vec<RegisteredTimer>,
    started: bool,
}

/// Periodic ticker module. Has no dependencies and no configure step.
#[derive(Default)]
pub struct TimerModule {
    state: Mutex<TimerState>,
}

impl TimerModule {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `callback` to run every `interval`.
    ///
    /// Must be called before the module starts running, i.e. from a dependent's `configure`.
    pub fn register<F, Fut>(&self, interval: Duration, callback: F) -> Result<(), TimerError>
    where
        F: Fn(CancellationToken, Instant) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        if interval.is_zero() {
            return Err(TimerError::ZeroInterval);
        }

        let callback: TimerCallback = Arc::new(
            move |ctx: CancellationToken, at: Instant| -> BoxFuture<'static, Result<(), BoxError>> {
                callback(ctx, at).boxed()
            },
        );

        let mut state = self.lock();
        if state.started {
            return Err(TimerError::AlreadyStarted);
        }
        state.timers.push(RegisteredTimer { interval, callback });
        debug!(?interval, registered = state.timers.len(), "Registered timer");
        Ok(())
    }

    /// Number of registered timers.
    pub fn len(&self) -> usize {
        self.lock().timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().timers.is_empty()
    }
}

#[async_trait]
impl Module for TimerModule {
    fn name(&self) -> Key {
        TIMER.key()
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError> {
        let timers = {
            let mut state = self.lock();
            state.started = true;
            state.timers.clone()
        };
        if timers.is_empty() {
            debug!("No timers registered");
            return Ok(());
        }

        info!(timers = timers.len(), "Starting timers");
        let token = ctx.child_token();
        let mut tickers = JoinSet::new();
        for timer in timers {
            tickers.spawn(run_ticker(timer, token.clone()));
        }

        let mut first_failure: Option<BoxError> = None;
        while let Some(joined) = tickers.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(err) => Err(err.into()),
            };
            if let Err(err) = result {
                if first_failure.is_none() {
                    warn!(error = %err, "Timer callback failed, stopping timers");
                    token.cancel();
                    first_failure = Some(err);
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

async fn run_ticker(timer: RegisteredTimer, token: CancellationToken) -> Result<(), BoxError> {
    let mut ticker = time::interval_at(Instant::now() + timer.interval, timer.interval);
    loop {
        tokio::select! {
            () = token.cancelled() => return Ok(()),
            at = ticker.tick() => invoke(&timer.callback, token.clone(), at).await?,
        }
    }
}

async fn invoke(
    callback: &TimerCallback,
    token: CancellationToken,
    at: Instant,
) -> Result<(), BoxError> {
    // The call itself sits inside the guarded future so that panics raised before the callback's
    // first await are caught too.
    let guarded = AssertUnwindSafe(async { callback(token, at).await }).catch_unwind();
    match guarded.await {
        Ok(result) => result,
        Err(payload) => Err(TimerError::CallbackPanicked {
            message: panic_message(&*payload),
        }
        .into()),
    }
}
