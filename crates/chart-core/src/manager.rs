// File: crates/chart-core/src/manager.rs
// Summary: ChartStackManager: owns the shared time axis, the series cache and the ordered
//          panels; fans pan/zoom, resize, period and crosshair events out to every panel.
// Notes:
// - Panels are laid out top to bottom in insertion order, heights proportional to their
//   size ratios. The time axis strip sits below the last panel.
// - `pump` is the event-loop hook: apply channel replies, then redraw dirty panels.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::axis::{SharedTimeAxis, TimeAxis};
use crate::cache::{CacheEvent, SeriesCache};
use crate::chart::{Plottable, SharedCache};
use crate::config::ManagerConfig;
use crate::error::{Result, TransportError};
use crate::geometry::Rect;
use crate::scene::Scene;
use crate::stack::ChartStack;
use crate::theme::{self, Theme};
use crate::transport::{MessageId, TransportAdapter};
use crate::types::{Period, Timestamp};

pub struct ChartStackManager {
    config: ManagerConfig,
    theme: Theme,
    time_axis: SharedTimeAxis,
    cache: SharedCache,
    stacks: Vec<ChartStack>,
    ratios: HashMap<String, f64>,
    width: f64,
    height: f64,
    time_layer: Scene,
}

impl ChartStackManager {
    pub fn new(transport: TransportAdapter, width: f64, height: f64, config: ManagerConfig) -> Self {
        let time_axis = TimeAxis::new(width, config.initial_period, &config.time_axis);
        let cache = SeriesCache::new(transport, config.cache.clone());
        Self {
            theme: theme::find(&config.theme),
            time_axis: Rc::new(RefCell::new(time_axis)),
            cache: Rc::new(RefCell::new(cache)),
            stacks: Vec::new(),
            ratios: HashMap::new(),
            width,
            height,
            time_layer: Scene::new(),
            config,
        }
    }

    pub fn config(&self) -> &ManagerConfig { &self.config }
    pub fn theme(&self) -> &Theme { &self.theme }
    pub fn time_axis(&self) -> &SharedTimeAxis { &self.time_axis }
    pub fn cache(&self) -> &SharedCache { &self.cache }
    pub fn stacks(&self) -> &[ChartStack] { &self.stacks }
    pub fn size(&self) -> (f64, f64) { (self.width, self.height) }

    pub fn stack(&self, name: &str) -> Option<&ChartStack> {
        self.stacks.iter().find(|s| s.name() == name)
    }

    pub fn stack_mut(&mut self, name: &str) -> Option<&mut ChartStack> {
        self.stacks.iter_mut().find(|s| s.name() == name)
    }

    /// Height available to panels, above the time axis strip.
    fn plot_height(&self) -> f64 {
        (self.height - self.config.time_axis.height).max(0.0)
    }

    /// Add `chart` to the named panel, creating the panel (and re-dividing heights) if new.
    pub fn add_chart(&mut self, stack: &str, chart: Box<dyn Plottable>) {
        if self.stack(stack).is_none() {
            let panel = ChartStack::new(
                stack,
                self.time_axis.clone(),
                self.cache.clone(),
                Rect::from_ltwh(0.0, 0.0, self.width, self.plot_height()),
                self.theme,
                &self.config.value_axis,
                self.config.time_axis.gutter_width,
            );
            self.stacks.push(panel);
            self.ratios.insert(stack.to_string(), 1.0);
            log::info!("created stack {stack} ({} total)", self.stacks.len());
            self.layout();
        }
        if let Some(panel) = self.stack_mut(stack) {
            panel.add_chart(chart);
        }
    }

    fn layout(&mut self) {
        let total: f64 = self.stacks.iter().map(|s| self.ratio(s.name())).sum();
        if total <= 0.0 {
            return;
        }
        let plot = self.plot_height();
        let heights: Vec<f64> = self.stacks.iter().map(|s| plot * self.ratio(s.name()) / total).collect();
        let mut top = 0.0;
        for (panel, h) in self.stacks.iter_mut().zip(heights) {
            panel.set_bounds(Rect::from_ltwh(0.0, top, self.width, h));
            top += h;
        }
    }

    fn ratio(&self, name: &str) -> f64 {
        self.ratios.get(name).copied().unwrap_or(1.0)
    }

    /// Proportional panel heights by name. Unknown names and non-positive ratios are ignored.
    pub fn set_stack_size_ratios<'a>(&mut self, ratios: impl IntoIterator<Item = (&'a str, f64)>) {
        for (name, ratio) in ratios {
            if ratio > 0.0 && self.stack(name).is_some() {
                self.ratios.insert(name.to_string(), ratio);
            }
        }
        self.layout();
    }

    /// Move the divider below panel `index` by `dy` pixels, resizing the panel below in
    /// reverse. Neither panel shrinks under the configured minimum height.
    pub fn drag_divider(&mut self, index: usize, dy: f64) {
        if index + 1 >= self.stacks.len() {
            return;
        }
        let min = self.config.min_stack_height;
        let above = self.stacks[index].height();
        let below = self.stacks[index + 1].height();
        let dy = dy.clamp((min - above).min(0.0), (below - min).max(0.0));

        // Ratios become absolute heights so untouched panels keep their size.
        for (i, s) in self.stacks.iter().enumerate() {
            let height = if i == index {
                above + dy
            } else if i == index + 1 {
                below - dy
            } else {
                s.height()
            };
            self.ratios.insert(s.name().to_string(), height.max(1.0));
        }
        self.layout();
    }

    pub fn scroll(&mut self, dx: f64, dy: f64) {
        self.time_axis.borrow_mut().scroll(dx, dy);
        for panel in &mut self.stacks {
            panel.scroll(dx, dy);
        }
        self.draw();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.time_axis.borrow_mut().resize(width, self.config.time_axis.height);
        self.layout();
        self.draw();
    }

    pub fn set_period(&mut self, period: Period) {
        self.time_axis.borrow_mut().set_period(period, None);
        self.mark_all_dirty();
        self.draw();
    }

    pub fn period(&self) -> Period {
        self.time_axis.borrow().period()
    }

    /// Vertical crosshair at `x` in every panel, horizontal one in the panel under `y`.
    /// Coordinates are manager-relative.
    pub fn draw_crosshair(&mut self, x: f64, y: f64) {
        for panel in &mut self.stacks {
            let b = panel.bounds();
            panel.set_vertical_crosshair(Some(x));
            panel.set_horizontal_crosshair(b.contains_y(y).then(|| y - b.top));
            panel.draw_crosshair();
        }
    }

    pub fn clear_crosshair(&mut self) {
        for panel in &mut self.stacks {
            panel.set_vertical_crosshair(None);
            panel.set_horizontal_crosshair(None);
            panel.draw_crosshair();
        }
    }

    pub fn set_theme(&mut self, name: &str) {
        self.theme = theme::find(name);
        for panel in &mut self.stacks {
            panel.set_theme(self.theme);
        }
        self.draw();
    }

    /// Advance the service's simulated clock. Charts are tail-refreshed when it acknowledges.
    pub fn tick(&mut self, steps: u32) -> Result<MessageId, TransportError> {
        self.cache.borrow_mut().request_tick(steps)
    }

    /// Ask for the latest available timestamp; the reply anchors the time axis.
    pub fn request_max_time(&mut self) -> Result<MessageId, TransportError> {
        self.cache.borrow_mut().request_max_time()
    }

    fn mark_all_dirty(&self) {
        for panel in &self.stacks {
            panel.mark_dirty();
        }
    }

    fn refresh_tails(&mut self) {
        for panel in &self.stacks {
            let redraw = panel.redraw_handle();
            for req in panel.requests() {
                self.cache.borrow_mut().refresh_last_tick(&req, Some(redraw.clone()));
            }
        }
    }

    fn anchor(&mut self, max_time: Timestamp) {
        let period = self.period();
        self.time_axis.borrow_mut().set_period(period, Some(max_time));
        self.mark_all_dirty();
    }

    /// Apply pending replies, react to tick/maxTime answers and redraw dirty panels.
    pub fn pump(&mut self) -> Result<Vec<CacheEvent>> {
        let events = self.cache.borrow_mut().pump()?;
        for event in &events {
            match event {
                CacheEvent::TickAck => self.refresh_tails(),
                CacheEvent::MaxTime(t) => self.anchor(*t),
                _ => {}
            }
        }
        self.redraw_dirty();
        Ok(events)
    }

    fn redraw_dirty(&mut self) {
        let mut any = false;
        for panel in self.stacks.iter_mut().filter(|p| p.is_dirty()) {
            panel.draw();
            any = true;
        }
        if any {
            self.draw_time_axis();
        }
    }

    /// Redraw every panel and the time axis strip.
    pub fn draw(&mut self) {
        for panel in &mut self.stacks {
            panel.draw();
        }
        self.draw_time_axis();
    }

    fn draw_time_axis(&mut self) {
        let mut time = self.time_axis.borrow_mut();
        time.draw(&self.theme, self.config.value_axis.label_size);
        self.time_layer = time.scene().clone();
    }

    /// Every scene with its vertical offset, bottom layer first.
    pub fn layers(&self) -> Vec<(f64, &Scene)> {
        let mut out = Vec::new();
        for panel in &self.stacks {
            out.extend(panel.layers().into_iter().map(|s| (panel.top(), s)));
        }
        out.push((self.plot_height(), &self.time_layer));
        out
    }
}
