//! # Concurrent Runner
//!
//! Fan-out/fan-in execution of every resolved module's `run` step.
//!
//! Each module gets its own Tokio task and a clone of one shared [`CancellationToken`], derived
//! from the caller's token. The runner then collects results as tasks finish:
//!
//! - the **first** failure (an `Err` or a panic) cancels the shared token and is kept;
//! - later failures, typically siblings reacting to the cancellation, are logged and dropped;
//! - once every task has finished the kept failure is returned, or `Ok(())` if there was none.
//!
//! Panics are caught at the task boundary and turned into [`BinderError::RunPanic`] tagged with
//! the module's key, so a defective module cannot take the process down or leave its siblings
//! running unobserved.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{panic_message, BinderError};
use crate::key::Key;
use crate::module::Module;

pub(crate) async fn run_modules(
    modules: Vec<(Key, Arc<dyn Module>)>,
    ctx: CancellationToken,
) -> Result<(), BinderError> {
    let shared = ctx.child_token();
    let mut tasks = JoinSet::new();

    for (key, module) in modules {
        let token = shared.clone();
        tasks.spawn(async move {
            let result = run_guarded(&key, module, token).await;
            (key, result)
        });
    }

    let mut first_failure = None;
    while let Some(joined) = tasks.join_next().await {
        let failure = match joined {
            Ok((key, Ok(()))) => {
                info!(module = %key, "Module stopped");
                continue;
            }
            Ok((_, Err(err))) => err,
            Err(err) => BinderError::TaskJoin(err),
        };

        if first_failure.is_none() {
            warn!(error = %failure, "Module failed, cancelling remaining modules");
            shared.cancel();
            first_failure = Some(failure);
        } else {
            debug!(error = %failure, "Discarding failure after first");
        }
    }

    match first_failure {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}

async fn run_guarded(
    key: &Key,
    module: Arc<dyn Module>,
    token: CancellationToken,
) -> Result<(), BinderError> {
    info!(module = %key, "Module started");
    match AssertUnwindSafe(module.run(token)).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(BinderError::Run {
            key: key.clone(),
            source,
        }),
        Err(payload) => Err(BinderError::RunPanic {
            key: key.clone(),
            message: panic_message(&*payload),
        }),
    }
}
