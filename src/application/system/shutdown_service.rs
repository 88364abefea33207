use crate::application::metric_writer::MetricWriter;
use crate::infrastructure::observability::Metrics;
use anyhow::Result;
use tracing::{debug, error, info, warn};

pub struct ShutdownService {
    metrics: Metrics,
}

impl ShutdownService {
    pub fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }

    pub async fn shutdown(&self, writer: &mut MetricWriter) -> Result<()> {
        info!("Initiating Graceful Shutdown Sequence...");

        info!(
            "Step 1: Draining {} pending metric entries...",
            writer.pending_len()
        );
        let drained = writer.close().await;
        if let Err(e) = &drained {
            error!("Final flush failed, pending entries are lost: {:#}", e);
        }

        info!("Step 2: Dumping counters...");
        debug!("Final counters:\n{}", self.metrics.render());

        info!("Graceful Shutdown Complete. Goodbye!");
        drained
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received"),
        _ = terminate => info!("SIGTERM received"),
    }
}
