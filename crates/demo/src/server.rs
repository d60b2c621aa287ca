// File: crates/demo/src/server.rs
// Summary: In-process series service: a simulated clock over a candle history, answering
//          data/tick/maxTime messages the way the remote service does.
// Notes:
// - Only candles up to the clock cursor are visible; `tick` reveals more.
// - Data replies are period-aggregated, computed, clipped to the request and base64-encoded.

use std::collections::{BTreeMap, VecDeque};

use chart_core::transport::{Channel, Envelope, Reply, Topic};
use chart_core::{CodecRegistry, DataRequest, Record, TransportError};
use serde_json::{json, Value};

use crate::indicators::{self, Candle};

pub struct SimulatedService {
    candles: Vec<Candle>,
    cursor: usize,
    codecs: CodecRegistry,
}

impl SimulatedService {
    /// `revealed` candles are visible before the first tick.
    pub fn new(candles: Vec<Candle>, revealed: usize) -> Self {
        let cursor = revealed.clamp(1usize.min(candles.len()), candles.len());
        Self { candles, cursor, codecs: CodecRegistry::with_defaults() }
    }

    pub fn base_period(&self) -> i64 {
        self.candles.windows(2).map(|w| w[1].t - w[0].t).filter(|d| *d > 0).min().unwrap_or(60)
    }

    pub fn visible(&self) -> &[Candle] { &self.candles[..self.cursor] }

    pub fn max_time(&self) -> Option<i64> { self.visible().last().map(|k| k.t) }

    /// Advance the clock by `steps` candles; returns how many were revealed.
    pub fn tick(&mut self, steps: usize) -> usize {
        let before = self.cursor;
        self.cursor = (self.cursor + steps).min(self.candles.len());
        self.cursor - before
    }

    /// Visible candles bucketed to `period`: open first, close last, high max, low min,
    /// volume summed.
    pub fn aggregate(&self, period: i64) -> Vec<Candle> {
        let period = period.max(1);
        let mut buckets: BTreeMap<i64, Candle> = BTreeMap::new();
        for k in self.visible() {
            let t = k.t.div_euclid(period) * period;
            buckets
                .entry(t)
                .and_modify(|b| {
                    b.h = b.h.max(k.h);
                    b.l = b.l.min(k.l);
                    b.c = k.c;
                    b.v += k.v;
                })
                .or_insert(Candle { t, ..*k });
        }
        buckets.into_values().collect()
    }

    pub fn series(&self, req: &DataRequest) -> Result<Vec<Record>, String> {
        let data = self.aggregate(req.period);
        let opt = |key: &str, default: f64| req.options.get_f64(key).unwrap_or(default);
        let len = |key: &str, default: f64| opt(key, default).max(1.0) as usize;

        let records = match req.indicator.as_str() {
            "OHLCV" => data.iter().map(Candle::record).collect(),
            "SMA" => indicators::sma(&data, len("period", 9.0)),
            "EMA" => indicators::ema(&data, len("period", 9.0)),
            "RSI" => indicators::rsi(&data, len("period", 14.0)),
            "LinearReg" => indicators::linear_reg(&data, len("period", 14.0)),
            "BBands" => indicators::bbands(&data, len("period", 20.0), opt("deviationUp", 2.0), opt("deviationDown", 2.0)),
            "MACD" => indicators::macd(&data, len("fastPeriod", 12.0), len("slowPeriod", 26.0), len("signalPeriod", 9.0)),
            "SAR" => indicators::sar(&data, opt("acceleration", 0.02), opt("maximum", 0.2)),
            name if name.contains("Strategy") => {
                indicators::sar_strategy(&data, opt("acceleration", 0.02), opt("maximum", 0.2))
            }
            other => return Err(format!("unsupported indicator {other}")),
        };

        Ok(records
            .into_iter()
            .filter(|r| r.timestamp >= req.start_time && r.timestamp <= req.end_time)
            .collect())
    }

    fn answer(&mut self, envelope: &Envelope) -> Result<String, String> {
        match envelope.topic {
            Topic::Data => {
                let req: DataRequest = serde_json::from_str(&envelope.body).map_err(|e| e.to_string())?;
                let records = self.series(&req)?;
                log::debug!(
                    "data {} {} p={} [{}, {}] -> {} rows",
                    req.symbol, req.indicator, req.period, req.start_time, req.end_time, records.len()
                );
                self.codecs.encode(&req.indicator, &records).map_err(|e| e.to_string())
            }
            Topic::Tick => {
                let body: Value = serde_json::from_str(&envelope.body).map_err(|e| e.to_string())?;
                let steps = body.get("steps").and_then(Value::as_u64).unwrap_or(1) as usize;
                let revealed = self.tick(steps);
                log::info!("tick {steps}: revealed {revealed}, now at {:?}", self.max_time());
                Ok("success".into())
            }
            Topic::MaxTime => {
                let t = self.max_time().ok_or_else(|| "no data".to_string())?;
                Ok(json!({ "timestamp": t }).to_string())
            }
        }
    }
}

/// Channel whose far end is a [`SimulatedService`]. Replies queue up on send and are
/// delivered in order by `poll`, so the caller sees them on its next pump.
pub struct SimChannel {
    service: SimulatedService,
    outbox: VecDeque<Reply>,
}

impl SimChannel {
    pub fn new(service: SimulatedService) -> Self {
        Self { service, outbox: VecDeque::new() }
    }
}

impl Channel for SimChannel {
    fn send(&mut self, envelope: Envelope) -> Result<(), TransportError> {
        let body = self.service.answer(&envelope).map_err(|e| {
            log::warn!("{} #{} failed: {e}", envelope.topic.as_str(), envelope.id);
            TransportError::Remote(e)
        });
        self.outbox.push_back(Reply { id: envelope.id, body });
        Ok(())
    }

    fn poll(&mut self) -> Option<Reply> {
        self.outbox.pop_front()
    }
}
