//! # Binder Sample
//!
//! A small application assembled from modules: the shared
//! [`TimerModule`](app_runtime::timer::TimerModule) and [`HttpModule`](app_runtime::http::HttpModule),
//! a [`HeartbeatModule`] that ticks on the timer, and a [`PingModule`] that serves `GET /ping`.
//!
//! This library exposes the sample's modules for integration testing.

pub mod heartbeat;
pub mod ping;

pub use heartbeat::{HeartbeatError, HeartbeatModule, HEARTBEAT};
pub use ping::{PingModule, PING};
