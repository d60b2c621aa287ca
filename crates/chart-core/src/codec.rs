// File: crates/chart-core/src/codec.rs
// Summary: Indicator schema registry; decodes (and encodes) base64 series payloads into records.
// Notes:
// - Payload layout: base64 of fixed-width little-endian rows,
//   `i64 timestamp` followed by one `f64` per schema field in schema order.
// - Newlines and carriage returns are stripped before base64 decoding.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::{Buf, BufMut, BytesMut};

use crate::error::CodecError;
use crate::record::Record;

/// Field layout of one indicator's rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    pub name: String,
    pub fields: Vec<String>,
}

impl Schema {
    pub fn new(name: impl Into<String>, fields: &[&str]) -> Self {
        Self { name: name.into(), fields: fields.iter().map(|f| f.to_string()).collect() }
    }

    /// Bytes per encoded row.
    pub fn row_size(&self) -> usize {
        8 + 8 * self.fields.len()
    }

    pub fn decode(&self, payload: &str) -> Result<Vec<Record>, CodecError> {
        let cleaned: String = payload.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        let raw = STANDARD.decode(cleaned.as_bytes())?;
        let row = self.row_size();
        if raw.len() % row != 0 {
            return Err(CodecError::Truncated { len: raw.len(), row });
        }

        let mut buf = raw.as_slice();
        let mut out = Vec::with_capacity(raw.len() / row);
        while buf.has_remaining() {
            let mut rec = Record::new(buf.get_i64_le());
            for field in &self.fields {
                rec.set(field.clone(), buf.get_f64_le());
            }
            out.push(rec);
        }
        Ok(out)
    }

    /// Encode records; a field missing from a record is written as NaN.
    pub fn encode(&self, records: &[Record]) -> String {
        let mut buf = BytesMut::with_capacity(records.len() * self.row_size());
        for rec in records {
            buf.put_i64_le(rec.timestamp);
            for field in &self.fields {
                buf.put_f64_le(rec.get(field).unwrap_or(f64::NAN));
            }
        }
        STANDARD.encode(&buf)
    }

    /// Encode raw rows of `[value; fields.len()]`.
    pub fn encode_rows(&self, rows: &[(i64, Vec<f64>)]) -> Result<String, CodecError> {
        let mut buf = BytesMut::with_capacity(rows.len() * self.row_size());
        for (ts, values) in rows {
            if values.len() != self.fields.len() {
                return Err(CodecError::FieldCount {
                    schema: self.name.clone(),
                    got: values.len(),
                    want: self.fields.len(),
                });
            }
            buf.put_i64_le(*ts);
            for v in values {
                buf.put_f64_le(*v);
            }
        }
        Ok(STANDARD.encode(&buf))
    }
}

/// Schemas keyed by indicator name, loaded once at startup.
#[derive(Clone, Debug, Default)]
pub struct CodecRegistry {
    schemas: HashMap<String, Schema>,
}

impl CodecRegistry {
    pub fn empty() -> Self { Self::default() }

    /// Registry with the schemas the series service publishes.
    pub fn with_defaults() -> Self {
        let mut reg = Self::empty();
        reg.register(Schema::new("OHLCV", &["open", "high", "low", "close", "volume"]));
        for name in [
            "SMA",
            "EMA",
            "RSI",
            "LinearReg",
            "SAR",
            "HilbertDominantCyclePeriod",
            "HilbertDominantCyclePhase",
            "HilbertTrendline",
        ] {
            reg.register(Schema::new(name, &["value"]));
        }
        reg.register(Schema::new("BBands", &["upper", "middle", "lower"]));
        reg.register(Schema::new("MACD", &["macd", "signal", "histogram"]));
        reg.register(Schema::new("Strategy", &["price", "volume"]));
        reg
    }

    pub fn register(&mut self, schema: Schema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    /// Look up by exact name; any name containing "Strategy" resolves to the
    /// strategy schema.
    pub fn schema(&self, indicator: &str) -> Result<&Schema, CodecError> {
        if let Some(s) = self.schemas.get(indicator) {
            return Ok(s);
        }
        if indicator.contains("Strategy") {
            if let Some(s) = self.schemas.get("Strategy") {
                return Ok(s);
            }
        }
        Err(CodecError::UnknownIndicator(indicator.to_string()))
    }

    pub fn decode(&self, indicator: &str, payload: &str) -> Result<Vec<Record>, CodecError> {
        self.schema(indicator)?.decode(payload)
    }

    pub fn encode(&self, indicator: &str, records: &[Record]) -> Result<String, CodecError> {
        Ok(self.schema(indicator)?.encode(records))
    }
}
