use chrono::{DateTime, Utc};

/// A successful balance observation.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReading {
    pub room_id: i64,
    pub balance: f64,
    pub observed_at: DateTime<Utc>,
}

impl BalanceReading {
    pub fn new(room_id: i64, balance: f64) -> Self {
        Self {
            room_id,
            balance,
            observed_at: Utc::now(),
        }
    }
}
