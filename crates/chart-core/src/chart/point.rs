// File: crates/chart-core/src/chart/point.rs
// Summary: Point variant: one marker per bucket and field. Marker shape, size and color
//          come from a PointStyle so presets can size markers by the datum.

use crate::chart::{ChartBase, Plottable};
use crate::geometry::Point;
use crate::record::Record;
use crate::scene::{Color, Scene, Surface};

pub trait PointStyle {
    /// Draw one marker centered at `at` for `field` of `rec`.
    fn mark(&self, scene: &mut Scene, at: Point, rec: &Record, field: &str, color: Color);
}

/// Stroked circle of fixed radius.
#[derive(Clone, Copy, Debug)]
pub struct DotStyle {
    pub radius: f64,
}

impl Default for DotStyle {
    fn default() -> Self { Self { radius: 2.0 } }
}

impl PointStyle for DotStyle {
    fn mark(&self, scene: &mut Scene, at: Point, _rec: &Record, _field: &str, color: Color) {
        scene.line_style(1.0, color.with_alpha(0.5));
        scene.draw_circle(at.x, at.y, self.radius);
    }
}

pub struct PointChart<S: PointStyle = DotStyle> {
    base: ChartBase,
    style: S,
}

impl PointChart<DotStyle> {
    pub fn new(base: ChartBase) -> Self { Self::with_style(base, DotStyle::default()) }
}

impl<S: PointStyle> PointChart<S> {
    pub fn with_style(base: ChartBase, style: S) -> Self { Self { base, style } }

    pub fn style(&self) -> &S { &self.style }
}

impl<S: PointStyle> Plottable for PointChart<S> {
    fn base(&self) -> &ChartBase { &self.base }
    fn base_mut(&mut self) -> &mut ChartBase { &mut self.base }

    fn draw(&mut self) {
        let Some(frame) = self.base.begin_draw() else { return };
        let time = frame.time();
        let axis = frame.axis();

        for field in self.base.fields.clone() {
            let color = self.base.color(&field);
            let (scene, style) = (&mut self.base.scene, &self.style);
            frame.for_each_visible(|rec| {
                if let Some(v) = rec.get(&field).filter(|v| v.is_finite()) {
                    let at = Point::new(time.position(rec.timestamp), axis.position(v));
                    style.mark(scene, at, rec, &field, color);
                }
            });
        }
    }
}
