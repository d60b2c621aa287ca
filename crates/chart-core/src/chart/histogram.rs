// File: crates/chart-core/src/chart/histogram.rs
// Summary: Histogram variant: a bar from zero to the value for every bucket and field.
// Notes:
// - Bars are `bar_size - 1` px wide; at 1 px or less they degrade to a stroked line.

use crate::chart::{ChartBase, Plottable};
use crate::scene::Surface;

pub struct HistogramChart {
    base: ChartBase,
}

impl HistogramChart {
    pub fn new(base: ChartBase) -> Self { Self { base } }
}

impl Plottable for HistogramChart {
    fn base(&self) -> &ChartBase { &self.base }
    fn base_mut(&mut self) -> &mut ChartBase { &mut self.base }

    fn draw(&mut self) {
        let Some(frame) = self.base.begin_draw() else { return };
        let time = frame.time();
        let axis = frame.axis();
        let width = time.bar_size() - 1.0;
        let zero = axis.position(0.0);

        for field in self.base.fields.clone() {
            let mut bars = Vec::new();
            frame.for_each_visible(|rec| {
                if let Some(v) = rec.get(&field).filter(|v| v.is_finite()) {
                    let h = axis.delta(0.0, v);
                    bars.push((time.min_position(rec.timestamp), if v < 0.0 { -h } else { h }));
                }
            });

            let color = self.base.color(&field);
            let s = &mut self.base.scene;
            if width <= 1.0 {
                s.line_style(1.0, color);
                for (x, h) in bars {
                    s.move_to(x, zero);
                    s.line_to(x, zero + h);
                }
            } else {
                s.line_style(1.0, color.with_alpha(0.5));
                s.begin_fill(color.with_alpha(0.5));
                for (x, h) in bars {
                    s.draw_rect(x, zero, width, h);
                }
                s.end_fill();
            }
        }
    }
}
