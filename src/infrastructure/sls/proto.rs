//! Protobuf messages of the SLS `PutLogs` body.
//!
//! Hand-written prost definitions of `sls_logs.proto`; only the fields this
//! crate writes are declared.

use crate::domain::metric::MetricEntry;
use crate::infrastructure::sls::error::SlsError;

#[derive(Clone, PartialEq, prost::Message)]
pub struct LogContent {
    #[prost(string, required, tag = "1")]
    pub key: String,
    #[prost(string, required, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Log {
    #[prost(uint32, required, tag = "1")]
    pub time: u32,
    #[prost(message, repeated, tag = "2")]
    pub contents: Vec<LogContent>,
    #[prost(fixed32, optional, tag = "4")]
    pub time_ns: Option<u32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LogGroup {
    #[prost(message, repeated, tag = "1")]
    pub logs: Vec<Log>,
    #[prost(string, optional, tag = "3")]
    pub topic: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub source: Option<String>,
}

impl TryFrom<&MetricEntry> for Log {
    type Error = SlsError;

    fn try_from(entry: &MetricEntry) -> Result<Self, Self::Error> {
        let timestamp = entry.timestamp();
        let time = u32::try_from(timestamp.seconds()).map_err(|_| SlsError::TimeOutOfRange {
            seconds: timestamp.seconds(),
        })?;

        let contents = entry
            .contents()
            .into_iter()
            .map(|(key, value)| LogContent {
                key: key.to_string(),
                value,
            })
            .collect();

        Ok(Log {
            time,
            contents,
            time_ns: Some(timestamp.nanos()),
        })
    }
}

impl LogGroup {
    pub fn from_entries(entries: &[MetricEntry]) -> Result<Self, SlsError> {
        let logs = entries
            .iter()
            .map(Log::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LogGroup {
            logs,
            topic: None,
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::{Labels, MetricTimestamp};
    use prost::Message;

    fn entry(nanos: u64, value: f64) -> MetricEntry {
        let labels = Labels::new().with("room_id", "4321");
        MetricEntry::new(
            "ac_meter_balance",
            &labels,
            MetricTimestamp::from_unix_nanos(nanos),
            value,
        )
        .unwrap()
    }

    #[test]
    fn test_log_carries_split_timestamp() {
        let log = Log::try_from(&entry(1_700_000_123_987_654_321, 9.5)).unwrap();

        assert_eq!(log.time, 1_700_000_123);
        assert_eq!(log.time_ns, Some(987_654_321));
        let keys: Vec<&str> = log.contents.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["__name__", "__labels__", "__time_nano__", "__value__"]);
        assert_eq!(log.contents[2].value, "1700000123987654321");
    }

    #[test]
    fn test_log_rejects_time_beyond_u32() {
        let far_future = (u32::MAX as u64 + 1) * 1_000_000_000;
        let result = Log::try_from(&entry(far_future, 1.0));
        assert!(matches!(result, Err(SlsError::TimeOutOfRange { .. })));
    }

    #[test]
    fn test_group_encoding_decodes_in_order() {
        let entries = vec![
            entry(1_700_000_000_000_000_001, 3.0),
            entry(1_700_000_030_000_000_002, 2.5),
        ];
        let group = LogGroup::from_entries(&entries).unwrap();
        let bytes = group.encode_to_vec();

        let decoded = LogGroup::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.logs.len(), 2);
        assert_eq!(decoded.logs[0].contents[3].value, "3.0");
        assert_eq!(decoded.logs[1].contents[3].value, "2.5");
        assert_eq!(decoded.logs[1].time, 1_700_000_030);
    }
}
