//! Background worker that applies click accounting to the durable store.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;

/// Retries per event after the first attempt.
const MAX_RETRIES: usize = 3;

/// Drains click events until every sender is dropped.
///
/// Up to `concurrency` increments run at once. Each increment is retried with
/// jittered exponential backoff; an event that still fails is logged and dropped,
/// since click counts are an analytics signal and never affect redirects.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn LinkRepository>,
    concurrency: usize,
) {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        tokio::spawn(async move {
            record_click(repository.as_ref(), &event).await;
            drop(permit);
        });
    }

    // Wait for in-flight increments before returning.
    let _ = permits.acquire_many(concurrency.max(1) as u32).await;
    info!("Click worker stopped");
}

async fn record_click(repository: &dyn LinkRepository, event: &ClickEvent) {
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(std::time::Duration::from_millis(500))
        .map(jitter)
        .take(MAX_RETRIES);

    let result = Retry::spawn(strategy, || {
        repository.increment_clicks(&event.code, event.accessed_at)
    })
    .await;

    match result {
        Ok(()) => {
            debug!("Click recorded for {}", event.code);
            metrics::counter!("clicks_recorded_total").increment(1);
        }
        Err(e) => {
            warn!("Dropping click for {} after retries: {}", event.code, e);
            metrics::counter!("clicks_dropped_total", "reason" => "store_error").increment(1);
        }
    }
}
