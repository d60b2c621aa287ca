// File: crates/chart-core/src/request.rs
// Summary: DataRequest value object, indicator options and the structured series key.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Period, Timestamp};

/// Indicator parameters sent along with a request (e.g. `period`, `fastPeriod`).
/// Keys are kept sorted so two option sets with the same entries encode identically
/// regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorOptions(BTreeMap<String, Value>);

impl IndicatorOptions {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }

    pub fn get_f64(&self, key: &str) -> Option<f64> { self.0.get(key).and_then(Value::as_f64) }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Canonical JSON encoding; this string is the options part of a [`SeriesKey`].
    pub fn canonical(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    /// Short 32-bit fingerprint of the canonical encoding, for log lines.
    /// Not used for identity.
    pub fn fingerprint(&self) -> i32 {
        self.canonical()
            .encode_utf16()
            .fold(0i32, |acc, c| acc.wrapping_shl(5).wrapping_sub(acc).wrapping_add(c as i32))
    }
}

/// Identity of one cached series.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    pub symbol: String,
    pub indicator: String,
    pub period: Period,
    pub options: String,
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}s/{}", self.symbol, self.indicator, self.period, self.options)
    }
}

/// One window of one series, built fresh per draw from the chart's time window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    pub symbol: String,
    pub indicator: String,
    pub period: Period,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub options: IndicatorOptions,
}

impl DataRequest {
    pub fn new(
        symbol: impl Into<String>,
        indicator: impl Into<String>,
        period: Period,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            indicator: indicator.into(),
            period,
            start_time: start_time.min(end_time),
            end_time: end_time.max(start_time),
            options: IndicatorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IndicatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Same series, different window.
    pub fn with_range(&self, start_time: Timestamp, end_time: Timestamp) -> Self {
        Self { start_time, end_time, ..self.clone() }
    }

    pub fn key(&self) -> SeriesKey {
        SeriesKey {
            symbol: self.symbol.clone(),
            indicator: self.indicator.clone(),
            period: self.period,
            options: self.options.canonical(),
        }
    }

    /// Whole buckets between start and end.
    pub fn periods(&self) -> i64 {
        if self.period <= 0 { return 0; }
        (self.end_time - self.start_time).div_euclid(self.period)
    }
}
