// File: crates/chart-core/src/grid.rs
// Summary: Value-axis tick layout: pick a "nice" increment for a range and height,
//          then lay ticks on multiples of it.

/// A candidate increment and the decimals its labels need.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Increment {
    pub step: f64,
    pub precision: usize,
}

/// Base table, coarse to fine. Scaled by powers of 10 000 for other magnitudes.
const BASE: [(f64, usize); 14] = [
    (500.0, 0),
    (250.0, 0),
    (200.0, 0),
    (100.0, 0),
    (50.0, 0),
    (25.0, 0),
    (20.0, 0),
    (10.0, 0),
    (5.0, 0),
    (2.0, 0),
    (1.0, 0),
    (0.5, 1),
    (0.25, 2),
    (0.1, 1),
];

const DECADE: f64 = 10_000.0;

fn scaled(decade: i32) -> impl Iterator<Item = Increment> {
    let scale = DECADE.powi(decade);
    BASE.iter().map(move |&(step, precision)| Increment {
        step: step * scale,
        precision: (precision as i32 - 4 * decade).max(0) as usize,
    })
}

/// Candidate increments for `span`, coarse to fine: the table at the smallest scale
/// whose coarsest entry spans the range, followed by the next finer scale.
pub fn increments(span: f64) -> Vec<Increment> {
    let mut decade: i32 = 0;
    if span.is_finite() && span > 0.0 {
        while BASE[0].0 * DECADE.powi(decade) < span && decade < 8 {
            decade += 1;
        }
        while decade > -4 && BASE[0].0 * DECADE.powi(decade - 1) >= span {
            decade -= 1;
        }
    }
    scaled(decade).chain(scaled(decade - 1)).collect()
}

/// Finest increment that still keeps the tick count under `height / tick_spacing`.
/// Walks from coarse to fine and stops at the first candidate that would crowd the axis.
pub fn select_increment(min: f64, max: f64, height: f64, tick_spacing: f64) -> Increment {
    let span = (max - min).abs();
    let max_incs = (height / tick_spacing.max(1.0)).max(1.0);
    let table = increments(span);
    let mut chosen = table[0];
    for inc in table {
        if span / inc.step < max_incs {
            chosen = inc;
        } else {
            break;
        }
    }
    chosen
}

/// Tick values: multiples of `step` from the first one at or above `min`, strictly below `max`.
pub fn ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let first = (min / step).ceil();
    let mut out = Vec::new();
    let mut i = 0.0;
    loop {
        let v = (first + i) * step;
        if v >= max || out.len() > 10_000 { break; }
        out.push(v);
        i += 1.0;
    }
    out
}

/// Format a tick label with the increment's precision.
pub fn format_value(v: f64, precision: usize) -> String {
    format!("{v:.precision$}")
}
