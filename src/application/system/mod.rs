use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

pub mod shutdown_service;

use crate::application::metric_writer::MetricWriter;
use crate::application::poller::{BalancePoller, PollerSettings};
use crate::application::system::shutdown_service::ShutdownService;
use crate::config::Config;
use crate::domain::balance::BalanceReading;
use crate::domain::ports::{BalanceSource, LogStore};
use crate::infrastructure::observability::Metrics;
use crate::infrastructure::sls::SlsLogStore;
use crate::infrastructure::ydapp::YdappClient;

pub struct Application {
    pub metrics: Metrics,
    poller: BalancePoller,
    shutdown_service: ShutdownService,
}

impl Application {
    /// Connect to the portal and the log store.
    ///
    /// The initial session bootstrap runs here; failing it aborts startup.
    pub async fn build(config: Config) -> Result<Self> {
        info!(
            "Building meterwatch (room {}, project {}, store {})...",
            config.ydapp.room_id, config.sls.project, config.sls.store
        );

        let metrics = Metrics::new()?;
        let reader = YdappClient::connect(&config.ydapp, metrics.clone())
            .await
            .context("Failed to connect balance reader")?;
        let store = SlsLogStore::new(&config.sls, metrics.clone())
            .context("Failed to create log store client")?;

        Ok(Self::with_services(
            &config,
            Arc::new(reader),
            Arc::new(store),
            metrics,
        ))
    }

    /// Assemble the application around already-built ports.
    pub fn with_services(
        config: &Config,
        source: Arc<dyn BalanceSource>,
        store: Arc<dyn LogStore>,
        metrics: Metrics,
    ) -> Self {
        let writer = MetricWriter::new(store, metrics.clone());
        let settings = PollerSettings {
            room_id: config.ydapp.room_id,
            metric_name: config.poll.metric_name.clone(),
            interval: config.poll.interval,
        };
        let poller = BalancePoller::new(source, writer, settings, metrics.clone());
        let shutdown_service = ShutdownService::new(metrics.clone());

        Self {
            metrics,
            poller,
            shutdown_service,
        }
    }

    /// Poll until Ctrl+C / SIGTERM, then drain the writer.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_service::wait_for_signal()).await
    }

    pub async fn run_until<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.poller.run_until(shutdown).await;
        self.shutdown_service
            .shutdown(self.poller.writer_mut())
            .await
    }

    /// A single cycle followed by the final drain.
    pub async fn run_once(mut self) -> Result<BalanceReading> {
        let reading = self.poller.poll_once().await;
        let drained = self
            .shutdown_service
            .shutdown(self.poller.writer_mut())
            .await;

        let reading = reading?;
        drained?;
        Ok(reading)
    }
}
