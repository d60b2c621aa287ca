// File: crates/chart-core/src/record.rs
// Summary: Record model: one bucket of named numeric fields tagged with its timestamp.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: Timestamp,
    fields: BTreeMap<String, f64>,
}

impl Record {
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp, fields: BTreeMap::new() }
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: f64) -> Self {
        self.fields.insert(field.into(), value);
        self
    }

    /// Construct an OHLCV bucket enforcing the candle invariants:
    /// low <= min(open,close), high >= max(open,close) and low <= high.
    pub fn try_ohlcv(
        timestamp: Timestamp,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, &'static str> {
        if low > open.min(close) { return Err("low above min(open,close)"); }
        if high < open.max(close) { return Err("high below max(open,close)"); }
        if low > high { return Err("low above high"); }
        Ok(Self::new(timestamp)
            .with("open", open)
            .with("high", high)
            .with("low", low)
            .with("close", close)
            .with("volume", volume))
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied()
    }

    pub fn set(&mut self, field: impl Into<String>, value: f64) {
        self.fields.insert(field.into(), value);
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}
