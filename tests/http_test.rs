use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use app_runtime::http::{HttpConfig, HttpError, HttpModule, HTTP};
use app_runtime::runtime::{self, RuntimeOptions};
use app_runtime::{Binder, BinderError, BoxError, CancellationToken, Key, Module, RuntimeError};
use axum::routing::get;
use reqwest::StatusCode;

/// Mounts `GET /hello` on the HTTP module.
struct Greeter;

impl Module for Greeter {
    fn name(&self) -> Key {
        Key::from("greeter")
    }

    fn depends(&self) -> Vec<Key> {
        vec![HTTP.key()]
    }

    fn configure(&mut self, binder: &Binder) -> Result<(), BoxError> {
        HTTP.get(binder)?.route("/hello", get(|| async { "hello" }))?;
        Ok(())
    }
}

/// Find a free port on localhost
fn free_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

fn test_options() -> RuntimeOptions {
    RuntimeOptions::default()
        .with_signals(false)
        .with_shutdown_grace(Some(Duration::from_secs(2)))
}

async fn get_when_ready(url: &str) -> reqwest::Response {
    for _ in 0..100 {
        if let Ok(response) = reqwest::get(url).await {
            return response;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("server at {url} never came up");
}

#[tokio::test]
async fn test_routes_served_until_cancelled() {
    let address = free_address();
    let ctx = CancellationToken::new();
    let running = tokio::spawn(runtime::run_with_options(
        ctx.clone(),
        vec![Box::new(Greeter), Box::new(HttpModule::new(HttpConfig::new(address)))],
        test_options(),
    ));

    let response = get_when_ready(&format!("http://{address}/hello")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "hello");

    let response = reqwest::get(format!("http://{address}/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("server should stop after cancellation")
        .unwrap();
    assert!(result.is_ok());

    assert!(reqwest::get(format!("http://{address}/hello")).await.is_err());
}

#[tokio::test]
async fn test_bind_failure_fails_run() {
    let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = occupied.local_addr().unwrap();

    let err = runtime::run_with_options(
        CancellationToken::new(),
        vec![Box::new(HttpModule::new(HttpConfig::new(address)))],
        test_options(),
    )
    .await
    .unwrap_err();

    match err {
        RuntimeError::Binder(BinderError::Run { key, source }) => {
            assert_eq!(key, "http");
            let cause = source
                .downcast_ref::<HttpError>()
                .expect("source should be an http error");
            assert!(matches!(cause, HttpError::Bind { address: a, .. } if *a == address));
        }
        other => panic!("expected the bind failure, got {other}"),
    }
    drop(occupied);
}

#[test]
fn test_routes_mounted_while_configuring() {
    let binder = Binder::new();
    binder.install(HttpModule::new(HttpConfig::default())).unwrap();
    binder.install(Greeter).unwrap();

    binder.resolve("greeter").unwrap();

    assert_eq!(HTTP.get(&binder).unwrap().routes(), vec!["/hello".to_string()]);
}
