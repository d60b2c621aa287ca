// File: crates/chart-core/src/chart/ohlc.rs
// Summary: OHLC candle variant: high-low wick and open-close body per bucket.

use crate::chart::{ChartBase, Plottable};
use crate::scene::{Color, Surface};

pub const UP_COLOR: Color = Color::from_hex(0x009900);
pub const DOWN_COLOR: Color = Color::from_hex(0xFF0000);

pub struct OhlcChart {
    base: ChartBase,
    /// Body fill of rising candles; falling candles are filled with their line color.
    pub up_fill: Color,
}

impl OhlcChart {
    /// Candles of the `OHLCV` series for `symbol`.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::from_base(
            ChartBase::new(name, symbol, "OHLCV")
                .with_fields(&["open", "high", "low", "close"])
                .with_color("up", UP_COLOR)
                .with_color("down", DOWN_COLOR),
        )
    }

    pub fn from_base(base: ChartBase) -> Self {
        Self { base, up_fill: Color::WHITE }
    }
}

impl Plottable for OhlcChart {
    fn base(&self) -> &ChartBase { &self.base }
    fn base_mut(&mut self) -> &mut ChartBase { &mut self.base }

    fn draw(&mut self) {
        let Some(frame) = self.base.begin_draw() else { return };
        let time = frame.time();
        let axis = frame.axis();
        let (up, down) = (self.base.color("up"), self.base.color("down"));
        let up_fill = self.up_fill;
        let bar = time.bar_size();
        let s = &mut self.base.scene;

        frame.for_each_visible(|rec| {
            let (Some(o), Some(h), Some(l), Some(c)) =
                (rec.get("open"), rec.get("high"), rec.get("low"), rec.get("close"))
            else {
                return;
            };
            if ![o, h, l, c].iter().all(|v| v.is_finite()) {
                return;
            }
            let rising = c >= o;
            let line = if rising { up } else { down };
            let x = time.min_position(rec.timestamp);
            let mid = time.position(rec.timestamp);

            s.line_style(1.0, line);
            s.move_to(mid, axis.position(l));
            s.line_to(mid, axis.position(h));

            s.begin_fill(if rising { up_fill } else { line });
            s.draw_rect(x, axis.position(o.min(c)), bar, axis.delta(o, c));
            s.end_fill();
        });
    }
}
