// File: crates/chart-core/src/stack.rs
// Summary: ChartStack: one vertical panel of charts sharing the time axis and, per value
//          type, a value axis. Owns the panel's crosshair layer.
// Notes:
// - The first chart added fixes the panel's primary value type. Charts of that type are
//   bound to the panel axis; any other type gets an independent axis of its own.
// - Only primary-type charts contribute to the panel's low/high.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::axis::{time::format_time, AxisBinding, SharedTimeAxis, SharedValueAxis, ValueAxis, ValueType};
use crate::cache::Redraw;
use crate::chart::{ChartContext, Plottable, SharedCache};
use crate::config::ValueAxisConfig;
use crate::geometry::Rect;
use crate::request::DataRequest;
use crate::scene::{Align, Scene, Surface};
use crate::theme::Theme;

pub struct ChartStack {
    name: String,
    charts: Vec<Box<dyn Plottable>>,
    primary: Option<ValueType>,
    axis: SharedValueAxis,
    independent: Vec<SharedValueAxis>,
    time_axis: SharedTimeAxis,
    cache: SharedCache,
    dirty: Rc<Cell<bool>>,
    redraw: Redraw,
    bounds: Rect,
    theme: Theme,
    value_cfg: ValueAxisConfig,
    gutter_width: f64,
    axis_layer: Scene,
    crosshair: Scene,
    cross_x: Option<f64>,
    cross_y: Option<f64>,
}

impl ChartStack {
    pub fn new(
        name: impl Into<String>,
        time_axis: SharedTimeAxis,
        cache: SharedCache,
        bounds: Rect,
        theme: Theme,
        value_cfg: &ValueAxisConfig,
        gutter_width: f64,
    ) -> Self {
        let dirty = Rc::new(Cell::new(true));
        let flag = dirty.clone();
        let redraw: Redraw = Rc::new(move || flag.set(true));
        let axis = ValueAxis::new(bounds.width(), bounds.height(), value_cfg.padding, ValueType::PRICE, value_cfg);
        Self {
            name: name.into(),
            charts: Vec::new(),
            primary: None,
            axis: Rc::new(RefCell::new(axis)),
            independent: Vec::new(),
            time_axis,
            cache,
            dirty,
            redraw,
            bounds,
            theme,
            value_cfg: value_cfg.clone(),
            gutter_width,
            axis_layer: Scene::new(),
            crosshair: Scene::new(),
            cross_x: None,
            cross_y: None,
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn charts(&self) -> &[Box<dyn Plottable>] { &self.charts }
    pub fn value_axis(&self) -> &SharedValueAxis { &self.axis }
    pub fn primary_value_type(&self) -> Option<&ValueType> { self.primary.as_ref() }

    /// Panel rectangle in manager coordinates.
    pub fn bounds(&self) -> Rect { self.bounds }
    pub fn top(&self) -> f64 { self.bounds.top }
    pub fn height(&self) -> f64 { self.bounds.height() }

    /// Callback that marks this panel for redraw.
    pub fn redraw_handle(&self) -> Redraw { self.redraw.clone() }
    pub fn is_dirty(&self) -> bool { self.dirty.get() }
    pub fn mark_dirty(&self) { self.dirty.set(true); }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.mark_dirty();
    }

    pub fn add_chart(&mut self, mut chart: Box<dyn Plottable>) {
        let value_type = chart.value_type().clone();
        chart.attach(ChartContext {
            time_axis: self.time_axis.clone(),
            cache: self.cache.clone(),
            redraw: self.redraw.clone(),
        });

        let (w, h) = (self.bounds.width(), self.bounds.height());
        let binding = match self.primary.clone() {
            None => {
                let mut axis = self.axis.borrow_mut();
                axis.set_parent_value_type(value_type.clone());
                if let Some(padding) = chart.axis_padding() {
                    axis.set_padding(padding);
                }
                drop(axis);
                self.primary = Some(value_type.clone());
                AxisBinding::shared(self.axis.clone())
            }
            Some(primary) if primary == value_type => AxisBinding::shared(self.axis.clone()),
            Some(primary) => {
                let padding = chart.axis_padding().unwrap_or(self.value_cfg.padding);
                let axis = Rc::new(RefCell::new(ValueAxis::new(w, h, padding, primary, &self.value_cfg)));
                self.independent.push(axis.clone());
                AxisBinding::independent(axis)
            }
        };
        log::info!(
            "stack {}: added {} ({}, {:?} axis)",
            self.name,
            chart.name(),
            value_type,
            binding.group
        );
        chart.bind_axis(binding);
        chart.resize(w, h);
        self.charts.push(chart);
        self.mark_dirty();
    }

    /// Lowest value across primary-type charts; `+inf` when none has data.
    pub fn low(&self) -> f64 {
        self.charts
            .iter()
            .filter(|c| self.primary.as_ref() == Some(c.value_type()))
            .map(|c| c.low())
            .fold(f64::INFINITY, f64::min)
    }

    /// Highest value across primary-type charts; `-inf` when none has data.
    pub fn high(&self) -> f64 {
        self.charts
            .iter()
            .filter(|c| self.primary.as_ref() == Some(c.value_type()))
            .map(|c| c.high())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Current request of every chart, for tail refreshes.
    pub fn requests(&self) -> Vec<DataRequest> {
        self.charts.iter().filter_map(|c| c.request()).collect()
    }

    pub fn draw(&mut self) {
        let (lo, hi) = (self.low(), self.high());
        self.axis.borrow_mut().set_min_max(lo, hi);
        for chart in &mut self.charts {
            chart.draw();
        }
        {
            let mut axis = self.axis.borrow_mut();
            axis.draw(&self.theme, self.gutter_width);
            self.axis_layer = axis.scene().clone();
        }
        self.draw_crosshair();
        self.dirty.set(false);
    }

    pub fn scroll(&mut self, dx: f64, dy: f64) {
        for chart in &mut self.charts {
            chart.scroll(dx, dy);
        }
        self.mark_dirty();
    }

    /// Move and resize the panel; every axis of the panel follows.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        let (w, h) = (bounds.width(), bounds.height());
        self.axis.borrow_mut().resize(w, h);
        for axis in &self.independent {
            axis.borrow_mut().resize(w, h);
        }
        for chart in &mut self.charts {
            chart.resize(w, h);
        }
        self.mark_dirty();
    }

    pub fn set_vertical_crosshair(&mut self, x: Option<f64>) { self.cross_x = x; }

    /// `y` is relative to the top of the panel.
    pub fn set_horizontal_crosshair(&mut self, y: Option<f64>) { self.cross_y = y; }

    /// Rebuild the crosshair layer from the current pointer position.
    pub fn draw_crosshair(&mut self) {
        let (w, h) = (self.bounds.width(), self.bounds.height());
        let left = (w - self.gutter_width).max(0.0);
        let size = self.value_cfg.label_size;
        let theme = self.theme;
        let time_label = self.cross_x.map(|x| {
            let time = self.time_axis.borrow();
            format_time(time.time_at(x), time.period())
        });
        let value_label = self.cross_y.map(|y| {
            let axis = self.axis.borrow();
            axis.format(axis.value_at(y))
        });

        let s = &mut self.crosshair;
        s.clear();
        if let Some(x) = self.cross_x {
            s.line_style(1.0, theme.crosshair);
            s.move_to(x, 0.0);
            s.line_to(x, h);
        }
        let Some(y) = self.cross_y else { return };
        s.line_style(1.0, theme.crosshair);
        s.move_to(0.0, y);
        s.line_to(left, y);

        s.no_line();
        s.begin_fill(theme.crosshair_label_bg);
        s.draw_rect(left, y - size as f64 / 2.0 - 3.0, self.gutter_width, size as f64 + 6.0);
        s.end_fill();
        if let Some(label) = value_label {
            s.text(left + 6.0, y + size as f64 / 2.0 - 1.0, &label, size, theme.axis_label, Align::Left);
        }

        if let (Some(x), Some(label)) = (self.cross_x, time_label) {
            let label_w = 90.0;
            s.begin_fill(theme.crosshair_label_bg);
            s.draw_rect(x - label_w / 2.0, h - size as f64 - 6.0, label_w, size as f64 + 6.0);
            s.end_fill();
            s.text(x, h - 4.0, &label, size, theme.axis_label, Align::Center);
        }
    }

    pub fn crosshair(&self) -> &Scene { &self.crosshair }

    /// Scenes bottom to top: value axis grid and gutter, charts, crosshair.
    pub fn layers(&self) -> Vec<&Scene> {
        let mut out = vec![&self.axis_layer];
        for chart in &self.charts {
            chart.collect_layers(&mut out);
        }
        out.push(&self.crosshair);
        out
    }
}
