//! HTTP module errors.

use std::net::SocketAddr;

/// Errors raised by the [`HttpModule`](super::HttpModule).
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("http module is already serving, add routes while configuring")]
    AlreadyStarted,

    #[error("failed to bind http listener on {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: std::io::Error,
    },

    #[error("http server failed: {0}")]
    Serve(#[source] std::io::Error),
}
