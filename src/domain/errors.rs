use thiserror::Error;

/// Errors raised while building a metric point
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("System clock is outside the representable Unix nanosecond range")]
    ClockOutOfRange,

    #[error("Metric name must not be empty")]
    EmptyName,
}

/// Errors raised while decoding a balance query response
#[derive(Debug, Error)]
pub enum BalancePayloadError {
    #[error("Response payload is not valid JSON: {reason}")]
    Malformed { reason: String },

    #[error("Response payload has no resultData object")]
    MissingResultData,

    #[error("Response payload has no resultData.MeterBalance field")]
    MissingBalance,

    #[error("MeterBalance is not numeric: {raw}")]
    NotNumeric { raw: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_numeric_formatting() {
        let error = BalancePayloadError::NotNumeric {
            raw: "\"n/a\"".to_string(),
        };

        let msg = error.to_string();
        assert!(msg.contains("MeterBalance"));
        assert!(msg.contains("n/a"));
    }
}
