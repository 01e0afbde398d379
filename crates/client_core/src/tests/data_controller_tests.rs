use super::*;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use crate::{abort::AbortSignal, fetcher::FnDataFetcher};

type ShipmentController = DataController<u32, String>;

/// Larger ids answer faster, and the abort signal is ignored on purpose.
fn slow_for_small_ids() -> Arc<ShipmentController> {
    let fetcher: FnDataFetcher<_, u32, String> =
        FnDataFetcher::new(|shipment_id: u32, _signal: AbortSignal| async move {
            let delay = Duration::from_millis(400 / u64::from(shipment_id.max(1)));
            tokio::time::sleep(delay).await;
            Ok::<_, FetchError>(format!("shipment-{shipment_id}"))
        });
    DataController::new(Arc::new(fetcher), 1)
}

#[tokio::test(start_paused = true)]
async fn loads_once_on_initialize() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher: FnDataFetcher<_, u32, String> = FnDataFetcher::new({
        let calls = Arc::clone(&calls);
        move |shipment_id: u32, _signal: AbortSignal| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, FetchError>(format!("shipment-{shipment_id}")) }
        }
    });
    let controller: Arc<ShipmentController> = DataController::new(Arc::new(fetcher), 7);
    let mut rx = controller.subscribe();

    assert!(controller.initialize());
    assert!(!controller.initialize());
    assert!(controller.snapshot().is_loading);

    let state = rx
        .wait_for(|state| !state.is_busy())
        .await
        .expect("alive")
        .clone();
    assert_eq!(state.data.as_deref(), Some("shipment-7"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn late_response_for_old_params_is_ignored() {
    let controller = slow_for_small_ids();

    controller.initialize();
    controller.set_params(4);
    tokio::time::sleep(Duration::from_secs(1)).await;

    let state = controller.snapshot();
    assert_eq!(state.data.as_deref(), Some("shipment-4"));
    assert!(!state.is_busy());
}

#[tokio::test(start_paused = true)]
async fn params_before_initialize_do_not_fetch() {
    let controller = slow_for_small_ids();

    controller.set_params(2);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(controller.snapshot(), DataState::default());

    controller.initialize();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(controller.snapshot().data.as_deref(), Some("shipment-2"));
}

#[tokio::test(start_paused = true)]
async fn error_is_reported_then_cleared_by_retry() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let fetcher: FnDataFetcher<_, u32, String> = FnDataFetcher::new({
        let attempts = Arc::clone(&attempts);
        move |_shipment_id: u32, _signal: AbortSignal| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(FetchError::api(404, Some("Shipment not found".into())))
                } else {
                    Ok("recovered".to_string())
                }
            }
        }
    });
    let controller: Arc<ShipmentController> = DataController::new(Arc::new(fetcher), 9);

    controller.initialize();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let state = controller.snapshot();
    assert_eq!(state.error.as_deref(), Some("Shipment not found"));
    assert_eq!(state.data, None);
    assert!(!state.is_busy());

    controller.retry();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let state = controller.snapshot();
    assert_eq!(state.error, None);
    assert_eq!(state.data.as_deref(), Some("recovered"));
}

#[tokio::test(start_paused = true)]
async fn refresh_uses_refreshing_flag() {
    let controller = slow_for_small_ids();

    controller.initialize();
    tokio::time::sleep(Duration::from_secs(1)).await;

    controller.refresh();
    let during = controller.snapshot();
    assert!(during.is_refreshing);
    assert!(!during.is_loading);
    assert_eq!(during.data.as_deref(), Some("shipment-1"));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!controller.snapshot().is_busy());
}

#[tokio::test(start_paused = true)]
async fn teardown_aborts_and_discards() {
    let observed_abort = Arc::new(AtomicUsize::new(0));
    let fetcher: FnDataFetcher<_, u32, String> = FnDataFetcher::new({
        let observed_abort = Arc::clone(&observed_abort);
        move |_shipment_id: u32, signal: AbortSignal| {
            let observed_abort = Arc::clone(&observed_abort);
            async move {
                tokio::select! {
                    _ = signal.aborted() => {
                        observed_abort.fetch_add(1, Ordering::SeqCst);
                        Err(FetchError::Aborted)
                    }
                    _ = tokio::time::sleep(Duration::from_secs(5)) => Ok("late".to_string()),
                }
            }
        }
    });
    let controller: Arc<ShipmentController> = DataController::new(Arc::new(fetcher), 3);

    controller.initialize();
    tokio::time::sleep(Duration::from_millis(10)).await;
    controller.teardown();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(observed_abort.load(Ordering::SeqCst), 1);
    let state = controller.snapshot();
    assert_eq!(state.data, None);
    assert!(!state.is_busy());
    assert!(!controller.initialize());
}
