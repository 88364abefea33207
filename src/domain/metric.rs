//! Metric points as shipped to the log store.
//!
//! A point is a single log item whose contents follow the SLS metricstore
//! layout: `__name__`, `__labels__`, `__time_nano__` and `__value__`.

use crate::domain::errors::MetricError;
use std::fmt;

pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Separator between a label key and its value inside `__labels__`.
pub const LABEL_KV_SEPARATOR: &str = "#$#";
/// Separator between label pairs inside `__labels__`.
pub const LABEL_PAIR_SEPARATOR: &str = "|";

/// A label value that remembers its original type, so falsy values
/// (empty text, zero, `false`) can be dropped at serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl LabelValue {
    pub fn is_falsy(&self) -> bool {
        match self {
            LabelValue::Text(s) => s.is_empty(),
            LabelValue::Int(n) => *n == 0,
            LabelValue::Bool(b) => !b,
        }
    }
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelValue::Text(s) => f.write_str(s),
            LabelValue::Int(n) => write!(f, "{}", n),
            LabelValue::Bool(true) => f.write_str("True"),
            LabelValue::Bool(false) => f.write_str("False"),
        }
    }
}

impl From<&str> for LabelValue {
    fn from(value: &str) -> Self {
        LabelValue::Text(value.to_string())
    }
}

impl From<String> for LabelValue {
    fn from(value: String) -> Self {
        LabelValue::Text(value)
    }
}

impl From<i64> for LabelValue {
    fn from(value: i64) -> Self {
        LabelValue::Int(value)
    }
}

impl From<bool> for LabelValue {
    fn from(value: bool) -> Self {
        LabelValue::Bool(value)
    }
}

/// Insertion-ordered label set.
///
/// Pairs whose value is falsy are kept here but never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    pairs: Vec<(String, LabelValue)>,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<LabelValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a label. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<LabelValue>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Render as `k1#$#v1|k2#$#v2`, skipping falsy values.
    pub fn serialize(&self) -> String {
        self.pairs
            .iter()
            .filter(|(_, v)| !v.is_falsy())
            .map(|(k, v)| format!("{}{}{}", k, LABEL_KV_SEPARATOR, v))
            .collect::<Vec<_>>()
            .join(LABEL_PAIR_SEPARATOR)
    }
}

impl<K, V> FromIterator<(K, V)> for Labels
where
    K: Into<String>,
    V: Into<LabelValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut labels = Labels::new();
        for (k, v) in iter {
            labels.insert(k, v);
        }
        labels
    }
}

/// Unix timestamp at nanosecond resolution, split the way the store wants it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MetricTimestamp {
    unix_nanos: u64,
}

impl MetricTimestamp {
    pub fn from_unix_nanos(unix_nanos: u64) -> Self {
        Self { unix_nanos }
    }

    /// Current wall-clock time.
    pub fn now() -> Result<Self, MetricError> {
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .ok_or(MetricError::ClockOutOfRange)?;
        let nanos = u64::try_from(nanos).map_err(|_| MetricError::ClockOutOfRange)?;
        Ok(Self::from_unix_nanos(nanos))
    }

    pub fn seconds(&self) -> u64 {
        self.unix_nanos / NANOS_PER_SECOND
    }

    /// Sub-second remainder, always `< 1_000_000_000`.
    pub fn nanos(&self) -> u32 {
        (self.unix_nanos % NANOS_PER_SECOND) as u32
    }
}

impl fmt::Display for MetricTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unix_nanos)
    }
}

/// One immutable data point awaiting transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEntry {
    name: String,
    labels: String,
    timestamp: MetricTimestamp,
    value: String,
}

impl MetricEntry {
    pub fn new(
        name: impl Into<String>,
        labels: &Labels,
        timestamp: MetricTimestamp,
        value: f64,
    ) -> Result<Self, MetricError> {
        let name = name.into();
        if name.is_empty() {
            return Err(MetricError::EmptyName);
        }

        Ok(Self {
            name,
            labels: labels.serialize(),
            timestamp,
            value: format_value(value),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> &str {
        &self.labels
    }

    pub fn timestamp(&self) -> MetricTimestamp {
        self.timestamp
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Key/value contents in transmission order.
    pub fn contents(&self) -> [(&'static str, String); 4] {
        [
            ("__name__", self.name.clone()),
            ("__labels__", self.labels.clone()),
            ("__time_nano__", self.timestamp.to_string()),
            ("__value__", self.value.clone()),
        ]
    }
}

/// Float rendering with a fractional part kept on whole numbers
/// (`10.0`, `12.5`).
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
