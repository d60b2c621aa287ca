// File: crates/demo/src/indicators.rs
// Summary: Indicator math for the simulated series service (SMA, EMA, RSI, MACD, BBands,
//          LinearReg, SAR and a SAR-flip strategy), producing timestamped records.
// Notes:
// - Inputs are candles in ascending time order; outputs skip the warm-up buckets.

use chart_core::Record;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candle {
    pub t: i64,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    pub v: f64,
}

impl Candle {
    pub fn record(&self) -> Record {
        Record::new(self.t)
            .with("open", self.o)
            .with("high", self.h)
            .with("low", self.l)
            .with("close", self.c)
            .with("volume", self.v)
    }
}

fn closes(data: &[Candle]) -> Vec<f64> {
    data.iter().map(|k| k.c).collect()
}

/// Simple moving average; `out[i]` averages `values[i + 1 - period ..= i]`.
fn sma_values(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period { return out; }
    let mut sum = 0.0f64;
    for i in 0..values.len() {
        sum += values[i];
        if i + 1 > period { sum -= values[i - period]; }
        if i + 1 >= period {
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

/// Exponential moving average seeded with the SMA of the first `period` values.
fn ema_values(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 { return out; }
    let k = 2.0 / (period as f64 + 1.0);
    let mut seed = Vec::with_capacity(period);
    let mut prev: Option<f64> = None;
    for (i, v) in values.iter().enumerate() {
        let Some(v) = *v else { continue };
        prev = match prev {
            Some(p) => Some(p + k * (v - p)),
            None => {
                seed.push(v);
                (seed.len() == period).then(|| seed.iter().sum::<f64>() / period as f64)
            }
        };
        out[i] = prev;
    }
    out
}

fn single(data: &[Candle], values: Vec<Option<f64>>) -> Vec<Record> {
    data.iter()
        .zip(values)
        .filter_map(|(k, v)| v.map(|v| Record::new(k.t).with("value", v)))
        .collect()
}

pub fn sma(data: &[Candle], period: usize) -> Vec<Record> {
    single(data, sma_values(&closes(data), period))
}

pub fn ema(data: &[Candle], period: usize) -> Vec<Record> {
    let values: Vec<Option<f64>> = closes(data).into_iter().map(Some).collect();
    single(data, ema_values(&values, period))
}

/// Wilder's RSI.
pub fn rsi(data: &[Candle], period: usize) -> Vec<Record> {
    let mut out = Vec::new();
    if period == 0 || data.len() <= period { return out; }
    let (mut gain, mut loss) = (0.0f64, 0.0f64);
    for w in data[..=period].windows(2) {
        let d = w[1].c - w[0].c;
        if d > 0.0 { gain += d } else { loss -= d }
    }
    gain /= period as f64;
    loss /= period as f64;
    let value = |gain: f64, loss: f64| if loss == 0.0 { 100.0 } else { 100.0 - 100.0 / (1.0 + gain / loss) };
    out.push(Record::new(data[period].t).with("value", value(gain, loss)));

    let p = period as f64;
    for i in period + 1..data.len() {
        let d = data[i].c - data[i - 1].c;
        gain = (gain * (p - 1.0) + d.max(0.0)) / p;
        loss = (loss * (p - 1.0) + (-d).max(0.0)) / p;
        out.push(Record::new(data[i].t).with("value", value(gain, loss)));
    }
    out
}

pub fn macd(data: &[Candle], fast: usize, slow: usize, signal: usize) -> Vec<Record> {
    let values: Vec<Option<f64>> = closes(data).into_iter().map(Some).collect();
    let fast = ema_values(&values, fast);
    let slow = ema_values(&values, slow);
    let line: Vec<Option<f64>> = fast.iter().zip(&slow).map(|(f, s)| Some((*f)? - (*s)?)).collect();
    let sig = ema_values(&line, signal);

    data.iter()
        .zip(line.iter().zip(&sig))
        .filter_map(|(k, (m, s))| {
            let (m, s) = ((*m)?, (*s)?);
            Some(Record::new(k.t).with("macd", m).with("signal", s).with("histogram", m - s))
        })
        .collect()
}

pub fn bbands(data: &[Candle], period: usize, dev_up: f64, dev_down: f64) -> Vec<Record> {
    let values = closes(data);
    let mid = sma_values(&values, period);
    data.iter()
        .enumerate()
        .filter_map(|(i, k)| {
            let m = mid[i]?;
            let window = &values[i + 1 - period..=i];
            let var = window.iter().map(|v| (v - m).powi(2)).sum::<f64>() / period as f64;
            let sd = var.sqrt();
            Some(Record::new(k.t).with("upper", m + dev_up * sd).with("middle", m).with("lower", m - dev_down * sd))
        })
        .collect()
}

/// Least-squares line over the last `period` closes, evaluated at the newest bucket.
pub fn linear_reg(data: &[Candle], period: usize) -> Vec<Record> {
    if period < 2 { return Vec::new(); }
    let values = closes(data);
    let n = period as f64;
    let sx = (0..period).map(|x| x as f64).sum::<f64>();
    let sxx = (0..period).map(|x| (x * x) as f64).sum::<f64>();
    (period - 1..values.len())
        .map(|i| {
            let window = &values[i + 1 - period..=i];
            let sy: f64 = window.iter().sum();
            let sxy: f64 = window.iter().enumerate().map(|(x, y)| x as f64 * y).sum();
            let slope = (n * sxy - sx * sy) / (n * sxx - sx * sx);
            let intercept = (sy - slope * sx) / n;
            Record::new(data[i].t).with("value", intercept + slope * (n - 1.0))
        })
        .collect()
}

/// Parabolic SAR values, with the trend each bucket ended in (`true` = long).
fn sar_values(data: &[Candle], acceleration: f64, maximum: f64) -> Vec<(f64, bool)> {
    let mut out = Vec::with_capacity(data.len());
    let Some(first) = data.first() else { return out };
    let mut long = data.get(1).map_or(true, |k| k.c >= first.c);
    let mut sar = if long { first.l } else { first.h };
    let mut ep = if long { first.h } else { first.l };
    let mut af = acceleration;
    out.push((sar, long));

    for i in 1..data.len() {
        let k = data[i];
        sar += af * (ep - sar);
        let prev = data[i - 1];
        if long {
            sar = sar.min(prev.l);
            if k.l < sar {
                long = false;
                sar = ep;
                ep = k.l;
                af = acceleration;
            } else if k.h > ep {
                ep = k.h;
                af = (af + acceleration).min(maximum);
            }
        } else {
            sar = sar.max(prev.h);
            if k.h > sar {
                long = true;
                sar = ep;
                ep = k.h;
                af = acceleration;
            } else if k.l < ep {
                ep = k.l;
                af = (af + acceleration).min(maximum);
            }
        }
        out.push((sar, long));
    }
    out
}

pub fn sar(data: &[Candle], acceleration: f64, maximum: f64) -> Vec<Record> {
    data.iter()
        .zip(sar_values(data, acceleration, maximum))
        .map(|(k, (v, _))| Record::new(k.t).with("value", v))
        .collect()
}

/// Trades of a SAR-flip strategy: go long on an up flip, short on a down flip, one unit
/// per side. The first trade opens, later ones reverse (two units).
pub fn sar_strategy(data: &[Candle], acceleration: f64, maximum: f64) -> Vec<Record> {
    let mut out = Vec::new();
    let mut position = 0.0f64;
    let mut prev_long: Option<bool> = None;
    for (k, (_, long)) in data.iter().zip(sar_values(data, acceleration, maximum)) {
        if prev_long.is_some_and(|p| p != long) {
            let target = if long { 1.0 } else { -1.0 };
            out.push(Record::new(k.t).with("price", k.c).with("volume", target - position));
            position = target;
        }
        prev_long = Some(long);
    }
    out
}
