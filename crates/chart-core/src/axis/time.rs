// File: crates/chart-core/src/axis/time.rs
// Summary: Horizontal time axis: visible window, bucket geometry, pan/zoom and the time label strip.
// Notes:
// - Invariant after every mutation: `max == min + bars * period`, `bars = floor(width / delta)`.
// - Positions are relative to the left edge of the plot area.

use chrono::DateTime;

use crate::config::TimeAxisConfig;
use crate::scene::{Align, Scene, Surface};
use crate::theme::Theme;
use crate::types::{now, periodize, Period, Timestamp};

#[derive(Clone, Debug)]
pub struct TimeAxis {
    min: Timestamp,
    max: Timestamp,
    period: Period,
    bar_size: f64,
    bar_spacing: f64,
    delta: f64,
    bars: i64,
    width: f64,
    height: f64,
    anchor: Option<Timestamp>,
    cfg: TimeAxisConfig,
    scene: Scene,
}

impl TimeAxis {
    pub fn new(width: f64, period: Period, cfg: &TimeAxisConfig) -> Self {
        let bar_size = cfg.bar_size.max(1.0);
        let bar_spacing = cfg.bar_spacing.max(0.0);
        let mut axis = Self {
            min: 0,
            max: 0,
            period: period.max(1),
            bar_size,
            bar_spacing,
            delta: bar_size + bar_spacing,
            bars: 1,
            width,
            height: cfg.height,
            anchor: None,
            cfg: cfg.clone(),
            scene: Scene::new(),
        };
        axis.set_period(period, None);
        axis
    }

    pub fn min(&self) -> Timestamp { self.min }
    pub fn max(&self) -> Timestamp { self.max }
    pub fn period(&self) -> Period { self.period }
    pub fn bars(&self) -> i64 { self.bars }
    pub fn bar_size(&self) -> f64 { self.bar_size }
    pub fn delta(&self) -> f64 { self.delta }
    pub fn width(&self) -> f64 { self.width }
    pub fn height(&self) -> f64 { self.height }
    pub fn anchor(&self) -> Option<Timestamp> { self.anchor }
    pub fn scene(&self) -> &Scene { &self.scene }

    fn bars_for(&self, width: f64) -> i64 {
        (width / self.delta).floor().max(1.0) as i64
    }

    fn gutter_bars(&self) -> i64 {
        ((self.cfg.gutter_width / self.delta).ceil() as i64).clamp(0, self.bars)
    }

    pub fn periodize(&self, time: Timestamp) -> Timestamp {
        periodize(time, self.period)
    }

    /// Switch bucket width and rebuild the window ending at the anchor. The first
    /// `max_time` ever supplied becomes the anchor; without one the current time is used
    /// and not remembered. The last bars are kept clear of the value-axis gutter.
    pub fn set_period(&mut self, period: Period, max_time: Option<Timestamp>) {
        self.period = period.max(1);
        if self.anchor.is_none() {
            if let Some(t) = max_time {
                self.anchor = Some(self.periodize(t));
            }
        }
        let end = self.periodize(self.anchor.unwrap_or_else(now));

        self.bars = self.bars_for(self.width);
        self.min = end - (self.bars - self.gutter_bars()) * self.period;
        self.max = self.min + self.bars * self.period;
        log::info!("period {}s window [{}, {}] ({} bars)", self.period, self.min, self.max, self.bars);
    }

    /// Keeps `min`, refits the bar count to the new width.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.bars = self.bars_for(width);
        self.max = self.min + self.bars * self.period;
    }

    /// Dominant-axis gesture: horizontal pans, vertical zooms.
    pub fn scroll(&mut self, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        if dx.abs() > dy.abs() {
            self.pan(dx);
        } else {
            self.zoom(dy);
        }
    }

    fn pan(&mut self, dx: f64) {
        let bars = self.bars as f64;
        let magnitude = (bars * dx * self.cfg.scroll_speed)
            .abs()
            .min(bars * self.cfg.max_scroll_speed)
            .floor()
            .max(1.0) as i64;
        let shift = if dx > 0.0 { magnitude } else { -magnitude };
        self.min += shift * self.period;
        self.max = self.min + self.bars * self.period;
    }

    fn zoom(&mut self, dy: f64) {
        let mid = self.periodize(self.min + (self.max - self.min) / 2);
        self.bar_size = (self.bar_size * (1.0 + dy * self.cfg.zoom_speed)).max(1.0);
        self.delta = self.bar_size + self.bar_spacing;
        self.bars = self.bars_for(self.width);
        let half = (self.bars as f64 / 2.0).round() as i64;
        self.min = mid - half * self.period;
        self.max = self.min + self.bars * self.period;
    }

    /// Buckets between the window start and `t`.
    pub fn period_offset(&self, t: Timestamp) -> f64 {
        (t - self.min) as f64 / self.period as f64
    }

    /// Left pixel edge of `t`'s bucket.
    pub fn min_position(&self, t: Timestamp) -> f64 {
        self.period_offset(t) * self.delta
    }

    /// Right pixel edge of `t`'s bucket.
    pub fn max_position(&self, t: Timestamp) -> f64 {
        self.min_position(t) + self.bar_size
    }

    /// Bucket center line.
    pub fn position(&self, t: Timestamp) -> f64 {
        self.min_position(t) + (self.bar_size / 2.0).floor()
    }

    /// Bucket under pixel `x`.
    pub fn time_at(&self, x: f64) -> Timestamp {
        self.min + (x / self.delta).floor() as i64 * self.period
    }

    /// Every bucket timestamp of the visible window, inclusive.
    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> {
        (self.min..=self.max).step_by(self.period as usize)
    }

    /// Redraw the label strip: one label roughly every 100 px.
    pub fn draw(&mut self, theme: &Theme, label_size: f32) {
        let every = ((100.0 / self.delta).ceil() as i64).max(1);
        let labels: Vec<(f64, String)> = self
            .timestamps()
            .filter(|t| (t / self.period).rem_euclid(every) == 0)
            .map(|t| (self.position(t), format_time(t, self.period)))
            .collect();

        let (w, h) = (self.width, self.height);
        let s = &mut self.scene;
        s.clear();
        s.no_line();
        s.begin_fill(theme.gutter);
        s.draw_rect(0.0, 0.0, w, h);
        s.end_fill();
        s.line_style(1.0, theme.axis_line);
        s.move_to(0.0, 0.0);
        s.line_to(w, 0.0);
        for (x, text) in labels {
            s.move_to(x, 0.0);
            s.line_to(x, 4.0);
            s.text(x, h - 4.0, &text, label_size, theme.axis_label, Align::Center);
        }
    }
}

/// Label for a bucket; daily and coarser periods drop the clock time.
pub fn format_time(t: Timestamp, period: Period) -> String {
    let Some(dt) = DateTime::from_timestamp(t, 0) else { return t.to_string() };
    if period >= 86_400 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%m-%d %H:%M").to_string()
    }
}
