// File: crates/chart-core/src/chart/composite.rs
// Summary: Composite variant: child charts drawn as one unit on one scale.
// Notes:
// - Context and axis are fanned out to every child. Children are always bound Shared;
//   when the composite itself is independent it sets the range from its children.

use crate::axis::AxisBinding;
use crate::chart::{ChartBase, ChartContext, Plottable};
use crate::request::DataRequest;
use crate::scene::{Scene, Surface};

pub struct CompositeChart {
    base: ChartBase,
    children: Vec<Box<dyn Plottable>>,
}

impl CompositeChart {
    pub fn new(base: ChartBase) -> Self {
        Self { base, children: Vec::new() }
    }

    pub fn add_chart(&mut self, mut chart: Box<dyn Plottable>) {
        if let Some(ctx) = self.base.context() {
            chart.attach(ctx.clone());
        }
        if let Some(binding) = self.base.binding() {
            chart.bind_axis(AxisBinding::shared(binding.axis.clone()));
        }
        self.children.push(chart);
    }

    pub fn with_chart(mut self, chart: Box<dyn Plottable>) -> Self {
        self.add_chart(chart);
        self
    }

    pub fn children(&self) -> &[Box<dyn Plottable>] { &self.children }
}

impl Plottable for CompositeChart {
    fn base(&self) -> &ChartBase { &self.base }
    fn base_mut(&mut self) -> &mut ChartBase { &mut self.base }

    fn attach(&mut self, ctx: ChartContext) {
        for child in &mut self.children {
            child.attach(ctx.clone());
        }
        self.base.ctx = Some(ctx);
    }

    fn bind_axis(&mut self, binding: AxisBinding) {
        for child in &mut self.children {
            child.bind_axis(AxisBinding::shared(binding.axis.clone()));
        }
        self.base.axis = Some(binding);
    }

    fn request(&self) -> Option<DataRequest> { self.base.request() }

    fn draw(&mut self) {
        self.base.scene.clear();
        self.base.rescale(self.low(), self.high());
        for child in &mut self.children {
            child.draw();
        }
    }

    fn low(&self) -> f64 {
        self.children.iter().map(|c| c.low()).fold(f64::INFINITY, f64::min)
    }

    fn high(&self) -> f64 {
        self.children.iter().map(|c| c.high()).fold(f64::NEG_INFINITY, f64::max)
    }

    fn scroll(&mut self, dx: f64, dy: f64) {
        for child in &mut self.children {
            child.scroll(dx, dy);
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.base.width = width;
        self.base.height = height;
        for child in &mut self.children {
            child.resize(width, height);
        }
    }

    fn collect_layers<'a>(&'a self, out: &mut Vec<&'a Scene>) {
        out.push(&self.base.scene);
        for child in &self.children {
            child.collect_layers(out);
        }
    }
}
