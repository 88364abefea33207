//! Poll-and-forward loop.
//!
//! One cycle reads the balance and records it. Failures are logged and the
//! loop carries on after the regular delay.

use crate::application::metric_writer::MetricWriter;
use crate::domain::balance::BalanceReading;
use crate::domain::metric::Labels;
use crate::domain::ports::BalanceSource;
use crate::infrastructure::observability::Metrics;
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub room_id: i64,
    pub metric_name: String,
    pub interval: Duration,
}

pub struct BalancePoller {
    source: Arc<dyn BalanceSource>,
    writer: MetricWriter,
    settings: PollerSettings,
    metrics: Metrics,
}

impl BalancePoller {
    pub fn new(
        source: Arc<dyn BalanceSource>,
        writer: MetricWriter,
        settings: PollerSettings,
        metrics: Metrics,
    ) -> Self {
        Self {
            source,
            writer,
            settings,
            metrics,
        }
    }

    pub fn writer_mut(&mut self) -> &mut MetricWriter {
        &mut self.writer
    }

    fn labels(&self) -> Labels {
        Labels::new().with("room_id", self.settings.room_id)
    }

    /// Read once and forward the value to the writer.
    pub async fn poll_once(&mut self) -> Result<BalanceReading> {
        let room_id = self.settings.room_id;
        let balance = self
            .source
            .read_balance(room_id)
            .await
            .with_context(|| format!("Failed to read balance for room {}", room_id))?;
        let reading = BalanceReading::new(room_id, balance);
        self.metrics.meter_balance.set(balance);

        let labels = self.labels();
        self.writer
            .record(&self.settings.metric_name, &labels, balance)
            .await?;
        Ok(reading)
    }

    /// Run one cycle, swallowing its failure.
    pub async fn run_cycle(&mut self) {
        match self.poll_once().await {
            Ok(_) => self.metrics.inc_polls("ok"),
            Err(e) => {
                self.metrics.inc_polls("error");
                error!("Poll cycle failed: {:#}", e);
            }
        }
    }

    /// Poll until `shutdown` resolves. The shutdown future is only observed
    /// between cycles, never in the middle of one.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            "Polling room {} every {:?}",
            self.settings.room_id, self.settings.interval
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, leaving poll loop");
                    break;
                }
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }
    }
}
