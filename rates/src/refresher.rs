//! Periodic background refresh of the active rate table.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::builder::RateTableBuilder;
use crate::error::RateResult;
use crate::service::ConversionService;

/// Periodically rebuilds the rate table and installs it into a
/// [`ConversionService`].
///
/// The loop runs one build immediately on spawn, then one per interval. A
/// failed cycle is logged and the previously installed table, if any, keeps
/// serving until the next attempt.
pub struct Refresher {
    builder: RateTableBuilder,
    service: Arc<ConversionService>,
    interval: Duration,
}

/// Handle to a spawned refresh loop.
///
/// [`shutdown`] stops the loop and waits for it to finish; a pending
/// inter-cycle wait is interrupted immediately and an in-flight build is
/// abandoned without installing anything. Dropping the handle closes the
/// shutdown channel, which stops the loop the same way without waiting.
///
/// [`shutdown`]: RefresherHandle::shutdown
pub struct RefresherHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl Refresher {
    /// Create a refresher. Nothing runs until [`spawn`](Refresher::spawn).
    pub fn new(
        builder: RateTableBuilder,
        service: Arc<ConversionService>,
        interval: Duration,
    ) -> Self {
        Self {
            builder,
            service,
            interval,
        }
    }

    /// Run a single build-and-install cycle.
    pub async fn refresh_once(&self) -> RateResult<()> {
        let table = self.builder.make().await?;
        self.service.install(table);
        Ok(())
    }

    /// Start the background loop, consuming the refresher.
    pub fn spawn(self) -> RefresherHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let task = tokio::spawn(self.run(shutdown_rx));
        RefresherHandle { shutdown_tx, task }
    }

    async fn run(self, mut shutdown: mpsc::Receiver<()>) {
        info!(
            interval_secs = self.interval.as_secs(),
            reference = %self.builder.reference(),
            "refresher started"
        );
        loop {
            tokio::select! {
                result = self.refresh_once() => {
                    if let Err(err) = result {
                        match self.service.current() {
                            Some(table) => error!(
                                error = %err,
                                serving_age_secs = table.age().num_seconds(),
                                "refresh cycle failed; previous table stays active"
                            ),
                            None => error!(
                                error = %err,
                                "refresh cycle failed; no table available yet"
                            ),
                        }
                    }
                }
                _ = shutdown.recv() => break,
            }
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.recv() => break,
            }
        }
        info!("refresher stopped");
    }
}

impl RefresherHandle {
    /// Stop the loop and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCode;
    use crate::error::RateError;
    use crate::provider::MockQuoteProvider;

    fn setup(provider: Arc<MockQuoteProvider>) -> (Refresher, Arc<ConversionService>) {
        let service = Arc::new(ConversionService::new());
        let builder = RateTableBuilder::new(CurrencyCode::new("BRL"), provider);
        let refresher = Refresher::new(builder, service.clone(), Duration::from_secs(3600));
        (refresher, service)
    }

    fn healthy_provider() -> Arc<MockQuoteProvider> {
        let provider = Arc::new(MockQuoteProvider::new("test"));
        provider.add_currency("BRL", "Brazilian Real");
        provider.set_quote("USD", 10.0);
        provider
    }

    async fn wait_until_ready(service: &ConversionService) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !service.is_ready() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("service never became ready");
    }

    #[tokio::test]
    async fn test_refresh_once_installs_a_table() {
        let (refresher, service) = setup(healthy_provider());

        refresher.refresh_once().await.unwrap();

        assert!(service.is_ready());
        assert_eq!(
            service
                .convert(&CurrencyCode::new("USD"), &CurrencyCode::new("BRL"), 1.0)
                .unwrap(),
            10.0
        );
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_table() {
        let provider = healthy_provider();
        let (refresher, service) = setup(provider.clone());

        refresher.refresh_once().await.unwrap();

        provider.fail_listing("connection refused");
        let err = refresher.refresh_once().await.unwrap_err();
        assert!(matches!(err, RateError::ProviderUnavailable(_)));

        // Stale data keeps serving.
        assert_eq!(
            service
                .convert(&CurrencyCode::new("USD"), &CurrencyCode::new("BRL"), 1.0)
                .unwrap(),
            10.0
        );
    }

    #[tokio::test]
    async fn test_delisted_reference_keeps_previous_table() {
        let provider = healthy_provider();
        let (refresher, service) = setup(provider.clone());

        refresher.refresh_once().await.unwrap();

        provider.remove_currency("BRL");
        let err = refresher.refresh_once().await.unwrap_err();
        assert!(matches!(err, RateError::ReferenceNotListed(_)));
        assert!(service.is_ready());
    }

    #[tokio::test]
    async fn test_spawn_runs_an_immediate_first_cycle() {
        let (refresher, service) = setup(healthy_provider());

        // Interval is an hour; readiness must not wait for it.
        let handle = refresher.spawn();
        wait_until_ready(&service).await;

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_the_idle_wait() {
        let (refresher, service) = setup(healthy_provider());

        let handle = refresher.spawn();
        wait_until_ready(&service).await;

        // The loop is now sleeping for an hour; shutdown must return promptly.
        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .expect("shutdown did not interrupt the idle wait");
    }

    #[tokio::test]
    async fn test_shutdown_abandons_an_inflight_build() {
        let provider = Arc::new(MockQuoteProvider::new("test"));
        provider.add_currency("BRL", "Brazilian Real");
        provider.stall_quote("USD");
        let (refresher, service) = setup(provider);

        let handle = refresher.spawn();
        // Give the first cycle time to reach the stalled fetch.
        tokio::time::sleep(Duration::from_millis(50)).await;

        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .expect("shutdown did not abandon the in-flight build");
        assert!(!service.is_ready());
    }
}
