// File: crates/chart-core/src/chart/mod.rs
// Summary: Plottable contract shared by every chart variant, plus the ChartBase state
//          variants embed (series identity, fields, colors, bounds policy, scene).
// Notes:
// - A chart is inert until the stack hands it a ChartContext (`attach`) and an
//   AxisBinding (`bind_axis`). Until then `request()` is None and `draw()` is a no-op.
// - Drawing never blocks: `ChartBase::begin_draw` asks the cache for the window and
//   draws whatever is present. The redraw callback fires once a fetch lands.

pub mod composite;
pub mod histogram;
pub mod line;
pub mod ohlc;
pub mod point;
pub mod presets;

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::axis::{AxisBinding, SharedTimeAxis, SharedValueAxis, TimeAxis, ValueAxis, ValueType};
use crate::cache::{Redraw, SeriesCache};
use crate::record::Record;
use crate::request::{DataRequest, IndicatorOptions, SeriesKey};
use crate::scene::{Color, Scene, Surface};

pub use composite::CompositeChart;
pub use histogram::HistogramChart;
pub use line::LineChart;
pub use ohlc::OhlcChart;
pub use point::{DotStyle, PointChart, PointStyle};

pub type SharedCache = Rc<RefCell<SeriesCache>>;

/// Collaborators a chart draws against, handed down by its stack.
#[derive(Clone)]
pub struct ChartContext {
    pub time_axis: SharedTimeAxis,
    pub cache: SharedCache,
    pub redraw: Redraw,
}

/// How a chart reports its low/high to the axis it is scaled on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bounds {
    /// Extrema of the cached fields over the visible window.
    Data,
    /// Fixed domain regardless of data (bounded oscillators).
    Fixed(f64, f64),
    /// Low pinned at zero, high inflated by `scale` to keep bars short.
    ZeroFloor { scale: f64 },
}

pub trait Plottable {
    fn base(&self) -> &ChartBase;
    fn base_mut(&mut self) -> &mut ChartBase;

    fn name(&self) -> &str { &self.base().name }

    fn value_type(&self) -> &ValueType { &self.base().value_type }

    /// Padding this chart wants on its value axis, if it differs from the default.
    fn axis_padding(&self) -> Option<f64> { self.base().padding }

    fn attach(&mut self, ctx: ChartContext) { self.base_mut().ctx = Some(ctx); }

    fn bind_axis(&mut self, binding: AxisBinding) { self.base_mut().axis = Some(binding); }

    fn request(&self) -> Option<DataRequest> { self.base().request() }

    /// Rebuild this chart's scene from the current axes and cache view.
    fn draw(&mut self);

    fn low(&self) -> f64 { self.base().low() }
    fn high(&self) -> f64 { self.base().high() }

    fn scroll(&mut self, _dx: f64, _dy: f64) {}

    fn resize(&mut self, width: f64, height: f64) {
        let base = self.base_mut();
        base.width = width;
        base.height = height;
    }

    fn collect_layers<'a>(&'a self, out: &mut Vec<&'a Scene>) { out.push(&self.base().scene); }
}

pub struct ChartBase {
    pub name: String,
    pub symbol: String,
    pub indicator: String,
    pub options: IndicatorOptions,
    pub fields: Vec<String>,
    pub value_type: ValueType,
    pub bounds: Bounds,
    pub padding: Option<f64>,
    colors: HashMap<String, Color>,
    ctx: Option<ChartContext>,
    axis: Option<AxisBinding>,
    pub(crate) scene: Scene,
    width: f64,
    height: f64,
}

pub const DEFAULT_COLOR: Color = Color::from_hex(0x0099FF);

impl ChartBase {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, indicator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            indicator: indicator.into(),
            options: IndicatorOptions::new(),
            fields: vec!["value".into()],
            value_type: ValueType::PRICE,
            bounds: Bounds::Data,
            padding: None,
            colors: HashMap::new(),
            ctx: None,
            axis: None,
            scene: Scene::new(),
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_option(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.options.set(key, value);
        self
    }

    pub fn with_options(mut self, options: IndicatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_color(mut self, field: &str, color: Color) -> Self {
        self.colors.insert(field.to_string(), color);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn color(&self, field: &str) -> Color {
        self.colors.get(field).copied().unwrap_or(DEFAULT_COLOR)
    }

    pub fn context(&self) -> Option<&ChartContext> { self.ctx.as_ref() }
    pub fn binding(&self) -> Option<&AxisBinding> { self.axis.as_ref() }
    pub fn scene(&self) -> &Scene { &self.scene }
    pub fn size(&self) -> (f64, f64) { (self.width, self.height) }

    /// Visible window of this chart's series, built fresh from the time axis.
    pub fn request(&self) -> Option<DataRequest> {
        let ctx = self.ctx.as_ref()?;
        let time = ctx.time_axis.borrow();
        Some(
            DataRequest::new(&self.symbol, &self.indicator, time.period(), time.min(), time.max())
                .with_options(self.options.clone()),
        )
    }

    pub fn data_low(&self) -> f64 {
        match (self.ctx.as_ref(), self.request()) {
            (Some(ctx), Some(req)) => ctx.cache.borrow().get_min(&req, &self.fields),
            _ => f64::INFINITY,
        }
    }

    pub fn data_high(&self) -> f64 {
        match (self.ctx.as_ref(), self.request()) {
            (Some(ctx), Some(req)) => ctx.cache.borrow().get_max(&req, &self.fields),
            _ => f64::NEG_INFINITY,
        }
    }

    pub fn low(&self) -> f64 {
        match self.bounds {
            Bounds::Data => self.data_low(),
            Bounds::Fixed(lo, _) => lo,
            Bounds::ZeroFloor { .. } => 0.0,
        }
    }

    pub fn high(&self) -> f64 {
        match self.bounds {
            Bounds::Data => self.data_high(),
            Bounds::Fixed(_, hi) => hi,
            Bounds::ZeroFloor { scale } => scale * self.data_high(),
        }
    }

    /// Set an independent axis' range. Shared axes are left to the stack.
    pub fn rescale(&self, lo: f64, hi: f64) {
        if let Some(binding) = self.axis.as_ref().filter(|b| b.is_independent()) {
            binding.axis.borrow_mut().set_min_max(lo, hi);
        }
    }

    /// Clear the scene and pull the visible window from the cache. Returns None while
    /// the chart is not attached and bound.
    pub fn begin_draw(&mut self) -> Option<Frame> {
        self.scene.clear();
        let ctx = self.ctx.clone()?;
        let axis = self.axis.as_ref()?.axis.clone();
        let request = self.request()?;
        ctx.cache.borrow_mut().get_data(&request, Some(ctx.redraw.clone()));
        self.rescale(self.low(), self.high());
        Some(Frame { key: request.key(), request, cache: ctx.cache, time: ctx.time_axis, axis })
    }
}

/// Everything a variant needs to lay out one draw pass.
pub struct Frame {
    pub request: DataRequest,
    key: SeriesKey,
    cache: SharedCache,
    time: SharedTimeAxis,
    axis: SharedValueAxis,
}

impl Frame {
    pub fn time(&self) -> Ref<'_, TimeAxis> { self.time.borrow() }
    pub fn axis(&self) -> Ref<'_, ValueAxis> { self.axis.borrow() }

    /// Visit cached records of the visible window in timestamp order.
    pub fn for_each_visible(&self, mut f: impl FnMut(&Record)) {
        let cache = self.cache.borrow();
        let Some(store) = cache.store(&self.key) else { return };
        for rec in store.window(self.request.start_time, self.request.end_time, self.request.period) {
            f(rec);
        }
    }
}

/// Stroke a polyline through `points`, bridging any gaps between them.
pub(crate) fn polyline(scene: &mut Scene, points: &[(f64, f64)]) {
    let mut it = points.iter();
    if let Some(&(x, y)) = it.next() {
        scene.move_to(x, y);
        for &(x, y) in it {
            scene.line_to(x, y);
        }
    }
}
