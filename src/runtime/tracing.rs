/// Initializes the tracing/logging infrastructure for the application.
///
/// This sets up structured logging using the `tracing` crate with:
/// - **Environment-based filtering**: Controlled via `RUST_LOG` environment variable
/// - **Compact formatting**: One line per event, module keys as structured fields
/// - **Span tracking**: Hierarchical context for debugging async operations
///
/// # Environment Variables
///
/// Set `RUST_LOG` to control log verbosity:
/// - `RUST_LOG=info` - Module lifecycle: installed, configuring, started, stopped
/// - `RUST_LOG=debug` - Also configured modules, registered timers, discarded failures
/// - `RUST_LOG=module_binder=debug` - Debug only for the binder
///
/// Calling this more than once, or after the host installed its own subscriber, is harmless:
/// the first subscriber stays in place.
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Application started");
/// ```
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // module keys are logged as fields instead
        .compact()
        .try_init();
}
