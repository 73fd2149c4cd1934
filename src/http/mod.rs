//! # HTTP Module
//!
//! An [`axum`] server packaged as a module. Dependents declare a dependency on [`HTTP`] and mount
//! their routes while they are being configured; the server starts with the run phase and shuts
//! down gracefully once the module's token is cancelled.
//!
//! ```rust,ignore
//! fn depends(&self) -> Vec<Key> {
//!     vec![HTTP.key()]
//! }
//!
//! fn configure(&mut self, binder: &Binder) -> Result<(), BoxError> {
//!     HTTP.get(binder)?.route("/ping", get(|| async { "pong" }))?;
//!     Ok(())
//! }
//! ```

mod error;

pub use error::HttpError;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use axum::routing::MethodRouter;
use axum::Router;
use module_binder::{BoxError, Handle, Key, Module};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::runtime::RuntimeError;

/// Typed key of the HTTP module.
pub const HTTP: Handle<HttpModule> = Handle::new("http");

/// Environment variable holding the listen address, e.g. `0.0.0.0:8080`.
pub const HTTP_ADDRESS_ENV: &str = "APP_HTTP_ADDRESS";

const DEFAULT_PORT: u16 = 8080;

/// Where the server listens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpConfig {
    pub address: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
        }
    }
}

impl HttpConfig {
    pub fn new(address: SocketAddr) -> Self {
        Self { address }
    }

    /// Defaults, with the address overridden by [`HTTP_ADDRESS_ENV`] when set.
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, RuntimeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(HTTP_ADDRESS_ENV) {
            config.address = value
                .trim()
                .parse()
                .map_err(|_| RuntimeError::InvalidOption {
                    name: HTTP_ADDRESS_ENV,
                    value: value.clone(),
                })?;
        }
        Ok(config)
    }
}

struct HttpState {
    router: Router,
    routes: Vec<String>,
    started: bool,
}

/// HTTP server module. Has no dependencies and no configure step.
pub struct HttpModule {
    config: HttpConfig,
    state: Mutex<HttpState>,
}

impl HttpModule {
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            state: Mutex::new(HttpState {
                router: Router::new(),
                routes: Vec::new(),
                started: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HttpState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn address(&self) -> SocketAddr {
        self.config.address
    }

    /// Mounts `handler` at `path`. Only possible before the server starts.
    pub fn route(&self, path: &str, handler: MethodRouter) -> Result<(), HttpError> {
        self.update(path, |router| router.route(path, handler))
    }

    /// Merges a prepared router, e.g. a dependent's whole API, into the server's router.
    pub fn merge(&self, router: Router) -> Result<(), HttpError> {
        self.update("*", |current| current.merge(router))
    }

    fn update(&self, label: &str, apply: impl FnOnce(Router) -> Router) -> Result<(), HttpError> {
        let mut state = self.lock();
        if state.started {
            return Err(HttpError::AlreadyStarted);
        }
        let router = std::mem::replace(&mut state.router, Router::new());
        state.router = apply(router);
        state.routes.push(label.to_string());
        debug!(route = label, "Mounted route");
        Ok(())
    }

    /// Paths mounted so far, in mount order. Merged routers appear as `*`.
    pub fn routes(&self) -> Vec<String> {
        self.lock().routes.clone()
    }
}

#[async_trait]
impl Module for HttpModule {
    fn name(&self) -> Key {
        HTTP.key()
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError> {
        let router = {
            let mut state = self.lock();
            state.started = true;
            std::mem::replace(&mut state.router, Router::new())
        };

        let address = self.config.address;
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| HttpError::Bind { address, source })?;
        info!(address = %listener.local_addr()?, "HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { ctx.cancelled().await })
            .await
            .map_err(HttpError::Serve)?;

        info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[test]
    fn test_default_config() {
        let module = HttpModule::new(HttpConfig::default());
        assert_eq!(module.address(), SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(module.name(), "http");
        assert!(module.depends().is_empty());
    }

    #[test]
    fn test_address_from_lookup() {
        let config =
            HttpConfig::from_lookup(|_| Some("0.0.0.0:9000".to_string())).unwrap();
        assert_eq!(config.address, SocketAddr::from(([0, 0, 0, 0], 9000)));

        let config = HttpConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, HttpConfig::default());

        let err = HttpConfig::from_lookup(|_| Some("not-an-address".to_string())).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::InvalidOption { name: HTTP_ADDRESS_ENV, ref value } if value == "not-an-address"
        ));
    }

    #[test]
    fn test_routes_recorded_in_order() {
        let module = HttpModule::new(HttpConfig::default());
        module.route("/ping", get(|| async { "pong" })).unwrap();
        module
            .merge(Router::new().route("/health", get(|| async { "ok" })))
            .unwrap();

        assert_eq!(module.routes(), vec!["/ping".to_string(), "*".to_string()]);
    }

    #[test]
    fn test_route_after_start_rejected() {
        let module = HttpModule::new(HttpConfig::default());
        module.lock().started = true;

        let err = module.route("/late", get(|| async { "late" })).unwrap_err();
        assert!(matches!(err, HttpError::AlreadyStarted));
        assert!(module.routes().is_empty());
    }
}
