//! Answers `GET /ping` on the shared HTTP server.

use app_runtime::http::HTTP;
use axum::routing::get;
use axum::Json;
use module_binder::{Binder, BoxError, Handle, Key, Module};
use serde_json::{json, Value};

pub const PING: Handle<PingModule> = Handle::new("ping");

#[derive(Default)]
pub struct PingModule;

impl PingModule {
    pub fn new() -> Self {
        Self
    }
}

async fn handle_ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

impl Module for PingModule {
    fn name(&self) -> Key {
        PING.key()
    }

    fn depends(&self) -> Vec<Key> {
        vec![HTTP.key()]
    }

    fn configure(&mut self, binder: &Binder) -> Result<(), BoxError> {
        HTTP.get(binder)?.route("/ping", get(handle_ping))?;
        Ok(())
    }
}
