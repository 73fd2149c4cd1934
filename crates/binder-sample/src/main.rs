//! # Binder Sample
//!
//! Runs the timer, the HTTP server, the heartbeat and the ping module until Ctrl-C (or SIGTERM).
//!
//! ```bash
//! RUST_LOG=info cargo run -p binder-sample
//! curl http://127.0.0.1:8080/ping
//! ```
//!
//! `APP_HTTP_ADDRESS` sets the listen address. `APP_SHUTDOWN_GRACE_MS` bounds how long shutdown
//! may take; `0` waits indefinitely.

use app_runtime::http::{HttpConfig, HttpModule};
use app_runtime::runtime::{self, setup_tracing, RuntimeError, RuntimeOptions};
use app_runtime::timer::TimerModule;
use binder_sample::{HeartbeatModule, PingModule};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), RuntimeError> {
    setup_tracing();

    let options = RuntimeOptions::from_env()?;
    let http = HttpConfig::from_env()?;
    info!(?options, address = %http.address, "Starting binder sample");

    runtime::run_with_options(
        CancellationToken::new(),
        vec![
            Box::new(HeartbeatModule::new()),
            Box::new(PingModule::new()),
            Box::new(TimerModule::new()),
            Box::new(HttpModule::new(http)),
        ],
        options,
    )
    .await
}
