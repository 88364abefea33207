use crate::domain::metric::MetricEntry;
use anyhow::Result;
use async_trait::async_trait;

/// Something that can report the remaining balance of a meter.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn read_balance(&self, room_id: i64) -> Result<f64>;
}

/// Remote sink accepting one batch of metric points per call.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn put_entries(&self, entries: &[MetricEntry]) -> Result<()>;
}
