//! Batching metric writer.
//!
//! Points are buffered in insertion order and shipped to the log store in a
//! single request once `FLUSH_THRESHOLD` of them are pending. The owner must
//! call [`MetricWriter::close`] on shutdown; dropping a writer with pending
//! points loses them.

use crate::domain::metric::{Labels, MetricEntry, MetricTimestamp};
use crate::domain::ports::LogStore;
use crate::infrastructure::observability::Metrics;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

pub const FLUSH_THRESHOLD: usize = 10;

pub struct MetricWriter {
    store: Arc<dyn LogStore>,
    pending: Vec<MetricEntry>,
    metrics: Metrics,
}

impl MetricWriter {
    pub fn new(store: Arc<dyn LogStore>, metrics: Metrics) -> Self {
        Self {
            store,
            pending: Vec::with_capacity(FLUSH_THRESHOLD),
            metrics,
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Record a point stamped with the current wall-clock time.
    pub async fn record(&mut self, name: &str, labels: &Labels, value: f64) -> Result<()> {
        let timestamp = MetricTimestamp::now()?;
        self.record_at(name, labels, value, timestamp).await
    }

    /// Record a point with an explicit timestamp.
    ///
    /// Flushes synchronously when the buffer reaches the threshold.
    pub async fn record_at(
        &mut self,
        name: &str,
        labels: &Labels,
        value: f64,
        timestamp: MetricTimestamp,
    ) -> Result<()> {
        let entry = MetricEntry::new(name, labels, timestamp, value)?;
        info!("[{}] meter balance: {}", timestamp.seconds(), entry.value());
        self.pending.push(entry);

        if self.pending.len() >= FLUSH_THRESHOLD {
            self.flush().await?;
        }
        Ok(())
    }

    /// Ship everything pending as one batch.
    ///
    /// The buffer is emptied before the request goes out; a failed batch is
    /// not re-queued.
    pub async fn flush(&mut self) -> Result<()> {
        let batch = std::mem::take(&mut self.pending);
        if batch.is_empty() {
            return Ok(());
        }

        info!("Flushing {} entries", batch.len());
        match self.store.put_entries(&batch).await {
            Ok(()) => {
                self.metrics.points_flushed_total.inc_by(batch.len() as u64);
                Ok(())
            }
            Err(e) => {
                self.metrics.flush_failures_total.inc();
                Err(e).with_context(|| format!("Failed to flush {} metric entries", batch.len()))
            }
        }
    }

    /// Final drain before shutdown.
    pub async fn close(&mut self) -> Result<()> {
        let pending = self.pending.len();
        self.flush().await?;
        info!("Metric writer closed ({} entries drained)", pending);
        Ok(())
    }
}

impl Drop for MetricWriter {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            warn!(
                "Metric writer dropped with {} unflushed entries",
                self.pending.len()
            );
        }
    }
}
