// File: crates/chart-core/src/axis/value.rs
// Summary: Vertical value axis for one value-type group: linear mapping, tick selection,
//          gridlines and the label gutter.

use crate::axis::ValueType;
use crate::config::ValueAxisConfig;
use crate::grid::{format_value, select_increment, ticks, Increment};
use crate::scene::{Align, Scene, Surface};
use crate::theme::Theme;

/// Smallest span kept between min and max.
const MIN_SPAN: f64 = 1e-12;

#[derive(Clone, Debug)]
pub struct ValueAxis {
    min: f64,
    max: f64,
    has_range: bool,
    padding: f64,
    width: f64,
    height: f64,
    parent_value_type: ValueType,
    cfg: ValueAxisConfig,
    scene: Scene,
}

impl ValueAxis {
    pub fn new(width: f64, height: f64, padding: f64, parent_value_type: ValueType, cfg: &ValueAxisConfig) -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            has_range: false,
            padding,
            width,
            height,
            parent_value_type,
            cfg: cfg.clone(),
            scene: Scene::new(),
        }
    }

    pub fn min(&self) -> f64 { self.min }
    pub fn max(&self) -> f64 { self.max }
    pub fn padding(&self) -> f64 { self.padding }
    pub fn width(&self) -> f64 { self.width }
    pub fn height(&self) -> f64 { self.height }
    pub fn scene(&self) -> &Scene { &self.scene }

    /// False until a finite range has been set.
    pub fn has_range(&self) -> bool { self.has_range }

    pub fn parent_value_type(&self) -> &ValueType { &self.parent_value_type }

    pub fn set_parent_value_type(&mut self, value_type: ValueType) {
        self.parent_value_type = value_type;
    }

    pub fn set_padding(&mut self, padding: f64) {
        self.padding = padding.max(0.0);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Non-finite bounds (no data) leave the previous range in place.
    pub fn set_min_max(&mut self, lo: f64, hi: f64) {
        if !lo.is_finite() || !hi.is_finite() {
            log::trace!("ignoring non-finite range [{lo}, {hi}]");
            return;
        }
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.min = lo;
        self.max = if hi - lo < MIN_SPAN { lo + 1.0 } else { hi };
        self.has_range = true;
    }

    /// Pixels per value unit.
    pub fn scale(&self) -> f64 {
        (self.height - 2.0 * self.padding).max(1.0) / (self.max - self.min)
    }

    pub fn position(&self, value: f64) -> f64 {
        self.height - (value - self.min) * self.scale() - self.padding
    }

    /// Signed pixel height between two values; never above -0.1.
    pub fn delta(&self, v1: f64, v2: f64) -> f64 {
        -((v1 - v2).abs() * self.scale()).max(0.1)
    }

    pub fn value_at(&self, y: f64) -> f64 {
        self.min + (self.height - self.padding - y) / self.scale()
    }

    pub fn increment(&self) -> Increment {
        select_increment(self.min, self.max, self.height, self.cfg.tick_spacing)
    }

    pub fn ticks(&self) -> Vec<f64> {
        ticks(self.min, self.max, self.increment().step)
    }

    /// Label text for `value` at the current tick precision.
    pub fn format(&self, value: f64) -> String {
        format_value(value, self.increment().precision)
    }

    /// Redraw gridlines across the plot and tick labels in the right-hand gutter.
    pub fn draw(&mut self, theme: &Theme, gutter_width: f64) {
        self.scene.clear();
        if !self.has_range {
            return;
        }
        let inc = self.increment();
        let rows: Vec<(f64, String)> = ticks(self.min, self.max, inc.step)
            .into_iter()
            .map(|v| (self.position(v), format_value(v, inc.precision)))
            .filter(|(y, _)| *y >= 0.0 && *y <= self.height)
            .collect();

        let left = (self.width - gutter_width).max(0.0);
        let (h, size) = (self.height, self.cfg.label_size);
        let s = &mut self.scene;

        s.line_style(1.0, theme.grid);
        for (y, _) in &rows {
            s.move_to(0.0, *y);
            s.line_to(left, *y);
        }

        s.no_line();
        s.begin_fill(theme.gutter);
        s.draw_rect(left, 0.0, gutter_width, h);
        s.end_fill();

        s.line_style(1.0, theme.axis_line);
        s.move_to(left, 0.0);
        s.line_to(left, h);
        for (y, label) in rows {
            s.move_to(left, y);
            s.line_to(left + 4.0, y);
            s.text(left + 6.0, y + size as f64 / 2.0 - 1.0, &label, size, theme.axis_label, Align::Left);
        }
    }
}
