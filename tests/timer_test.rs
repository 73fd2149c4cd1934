use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use app_runtime::timer::{TimerModule, TIMER};
use app_runtime::{Binder, BinderError, BoxError, CancellationToken, Key, Module};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Depends on the timer and counts its ticks.
struct TickCounter {
    ticks: Arc<AtomicUsize>,
}

#[async_trait]
impl Module for TickCounter {
    fn name(&self) -> Key {
        Key::from("tick-counter")
    }

    fn depends(&self) -> Vec<Key> {
        vec![TIMER.key()]
    }

    fn configure(&mut self, binder: &Binder) -> Result<(), BoxError> {
        let ticks = Arc::clone(&self.ticks);
        TIMER.get(binder)?.register(Duration::from_millis(10), move |_, _| {
            let ticks = Arc::clone(&ticks);
            async move {
                ticks.fetch_add(1, Ordering::SeqCst);
                Ok::<(), BoxError>(())
            }
        })?;
        Ok(())
    }
}

#[tokio::test]
async fn test_run_calls_callback() {
    let timer = Arc::new(TimerModule::new());
    let (sender, mut receiver) = mpsc::channel(1);
    timer
        .register(Duration::from_millis(10), move |_, _| {
            let sender = sender.clone();
            async move {
                let _ = sender.try_send(());
                Ok::<(), BoxError>(())
            }
        })
        .unwrap();

    let ctx = CancellationToken::new();
    let running = {
        let timer = Arc::clone(&timer);
        let ctx = ctx.clone();
        tokio::spawn(async move { timer.run(ctx).await })
    };

    tokio::time::timeout(Duration::from_secs(1), receiver.recv())
        .await
        .expect("callback should fire within a second");

    ctx.cancel();
    let result = running.await.unwrap();
    assert!(result.is_ok(), "cancellation is a clean exit");
}

#[tokio::test]
async fn test_callback_panic_becomes_error() {
    let timer = TimerModule::new();
    timer
        .register(Duration::from_millis(10), |_, _| async {
            if true {
                panic!("test panic");
            }
            Ok::<(), BoxError>(())
        })
        .unwrap();

    let err = tokio::time::timeout(Duration::from_secs(1), timer.run(CancellationToken::new()))
        .await
        .expect("run should return after the panic")
        .unwrap_err();

    assert!(err.to_string().contains("timer callback panicked"));
    assert!(err.to_string().contains("test panic"));
}

#[tokio::test]
async fn test_callback_error_stops_other_timers() {
    let timer = TimerModule::new();
    let healthy_ticks = Arc::new(AtomicUsize::new(0));
    {
        let healthy_ticks = Arc::clone(&healthy_ticks);
        timer
            .register(Duration::from_millis(5), move |_, _| {
                let healthy_ticks = Arc::clone(&healthy_ticks);
                async move {
                    healthy_ticks.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), BoxError>(())
                }
            })
            .unwrap();
    }
    timer
        .register(Duration::from_millis(30), |_, _| async {
            Err::<(), BoxError>("disk full".into())
        })
        .unwrap();

    let err = tokio::time::timeout(Duration::from_secs(1), timer.run(CancellationToken::new()))
        .await
        .expect("run should return after the failure")
        .unwrap_err();
    assert_eq!(err.to_string(), "disk full");

    // The healthy ticker was stopped along with the failing one
    let after_stop = healthy_ticks.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(healthy_ticks.load(Ordering::SeqCst), after_stop);
}

#[tokio::test]
async fn test_timer_wired_through_binder() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let binder = Binder::new();
    binder
        .install(TickCounter {
            ticks: Arc::clone(&ticks),
        })
        .unwrap();
    binder.install(TimerModule::new()).unwrap();

    let ctx = CancellationToken::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        canceller.cancel();
    });

    binder.run(ctx).await.unwrap();
    assert!(ticks.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_dependent_without_timer_fails() {
    let binder = Binder::new();
    binder
        .install(TickCounter {
            ticks: Arc::new(AtomicUsize::new(0)),
        })
        .unwrap();

    let err = binder.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(
        err,
        BinderError::MissingDependency { ref dependency, .. } if dependency == "timer"
    ));
}
