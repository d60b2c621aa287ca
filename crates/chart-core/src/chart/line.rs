// File: crates/chart-core/src/chart/line.rs
// Summary: Line variant: one polyline per field across the visible buckets.

use crate::chart::{polyline, ChartBase, Plottable};
use crate::scene::Surface;

pub struct LineChart {
    base: ChartBase,
    pub line_width: f64,
}

impl LineChart {
    pub fn new(base: ChartBase) -> Self {
        Self { base, line_width: 2.0 }
    }
}

impl Plottable for LineChart {
    fn base(&self) -> &ChartBase { &self.base }
    fn base_mut(&mut self) -> &mut ChartBase { &mut self.base }

    fn draw(&mut self) {
        let Some(frame) = self.base.begin_draw() else { return };
        let time = frame.time();
        let axis = frame.axis();

        for field in self.base.fields.clone() {
            // Missing buckets and NaN values are skipped; the line runs on to the next point.
            let mut points = Vec::new();
            frame.for_each_visible(|rec| {
                if let Some(v) = rec.get(&field).filter(|v| v.is_finite()) {
                    points.push((time.position(rec.timestamp), axis.position(v)));
                }
            });
            let color = self.base.color(&field).with_alpha(0.5);
            self.base.scene.line_style(self.line_width, color);
            polyline(&mut self.base.scene, &points);
        }
    }
}
