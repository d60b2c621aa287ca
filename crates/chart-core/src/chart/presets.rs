// File: crates/chart-core/src/chart/presets.rs
// Summary: Ready-made charts for the indicators the series service publishes:
//          moving averages, Bollinger bands, SAR, RSI, volume, MACD and strategy trades.

use crate::axis::ValueType;
use crate::chart::{
    Bounds, ChartBase, CompositeChart, DotStyle, HistogramChart, LineChart, PointChart, PointStyle,
    Plottable,
};
use crate::geometry::Point;
use crate::record::Record;
use crate::scene::{Color, Scene, Surface};

/// Simple moving average of closes, period 9.
pub fn ma(name: &str, symbol: &str) -> LineChart {
    LineChart::new(ChartBase::new(name, symbol, "SMA").with_option("period", 9))
}

/// Exponential moving average, period 9.
pub fn ema(name: &str, symbol: &str) -> LineChart {
    LineChart::new(ChartBase::new(name, symbol, "EMA").with_option("period", 9))
}

pub fn linear_reg(name: &str, symbol: &str) -> LineChart {
    LineChart::new(ChartBase::new(name, symbol, "LinearReg"))
}

pub fn bbands(name: &str, symbol: &str) -> LineChart {
    LineChart::new(
        ChartBase::new(name, symbol, "BBands")
            .with_fields(&["upper", "lower", "middle"])
            .with_color("upper", Color::from_hex(0x0099FF))
            .with_color("middle", Color::from_hex(0x6699FF))
            .with_color("lower", Color::from_hex(0x0099FF))
            .with_option("period", 20)
            .with_option("deviationUp", 2)
            .with_option("deviationDown", 2)
            .with_option("maType", "SMA"),
    )
}

/// Parabolic SAR dots.
pub fn sar(name: &str, symbol: &str) -> PointChart<DotStyle> {
    PointChart::new(
        ChartBase::new(name, symbol, "SAR")
            .with_color("value", Color::from_hex(0x00CC33))
            .with_option("acceleration", 0.02)
            .with_option("maximum", 0.2),
    )
}

/// Volume bars on their own scale: floor at zero, high inflated tenfold so bars stay
/// in the lower part of a price panel.
pub fn volume(name: &str, symbol: &str) -> HistogramChart {
    HistogramChart::new(
        ChartBase::new(name, symbol, "OHLCV")
            .with_fields(&["volume"])
            .with_value_type(ValueType::VOLUME)
            .with_bounds(Bounds::ZeroFloor { scale: 10.0 })
            .with_padding(0.0)
            .with_color("volume", Color::from_hex(0x0099FF)),
    )
}

/// MACD and signal lines over the MACD histogram, all on one scale.
pub fn macd(name: &str, symbol: &str) -> CompositeChart {
    let macd_base = |child: &str| {
        ChartBase::new(format!("{name}{child}"), symbol, "MACD")
            .with_value_type(ValueType::MACD)
            .with_option("fastPeriod", 12)
            .with_option("slowPeriod", 26)
            .with_option("signalPeriod", 9)
    };
    let lines = LineChart::new(
        macd_base("MA")
            .with_fields(&["macd", "signal"])
            .with_color("macd", Color::from_hex(0x0099FF))
            .with_color("signal", Color::from_hex(0xFF6600)),
    );
    let bars = HistogramChart::new(
        macd_base("Histogram")
            .with_fields(&["histogram"])
            .with_color("histogram", Color::from_hex(0x9999FF)),
    );
    CompositeChart::new(macd_base("").with_fields(&["macd", "signal", "histogram"]))
        .with_chart(Box::new(lines))
        .with_chart(Box::new(bars))
}

/// RSI line on a fixed 0..100 scale with the 20/80 band shaded.
pub struct RsiChart {
    line: LineChart,
    pub low_band: f64,
    pub high_band: f64,
}

impl RsiChart {
    pub fn new(name: &str, symbol: &str) -> Self {
        let base = ChartBase::new(name, symbol, "RSI")
            .with_value_type(ValueType::RSI)
            .with_bounds(Bounds::Fixed(0.0, 100.0))
            .with_padding(0.0)
            .with_option("period", 14)
            .with_color("value", Color::from_hex(0xBB00FF));
        Self { line: LineChart::new(base), low_band: 20.0, high_band: 80.0 }
    }
}

impl Plottable for RsiChart {
    fn base(&self) -> &ChartBase { self.line.base() }
    fn base_mut(&mut self) -> &mut ChartBase { self.line.base_mut() }

    fn draw(&mut self) {
        self.line.draw();

        let base = self.line.base();
        let (Some(ctx), Some(binding)) = (base.context(), base.binding()) else { return };
        let width = ctx.time_axis.borrow().width();
        let (top, h) = {
            let axis = binding.axis.borrow();
            (axis.position(self.low_band), axis.delta(self.low_band, self.high_band))
        };
        let color = base.color("value");

        let s = &mut self.line.base_mut().scene;
        s.line_style(1.0, color);
        s.begin_fill(color.with_alpha(0.1));
        s.draw_rect(-1.0, top, width + 1.0, h);
        s.end_fill();
    }
}

pub const BUY_COLOR: Color = Color::from_hex(0x066800);
pub const SELL_COLOR: Color = Color::from_hex(0xCE0000);
pub const TRADE_OUTLINE: Color = Color::from_hex(0x666666);

/// Triangle markers for strategy trades: pointing up for buys, down for sells,
/// sized and shaded by the traded volume.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrategyStyle;

impl StrategyStyle {
    pub fn radius(volume: f64) -> f64 {
        ((6.0 + volume.abs().sqrt()) / 2.0).max(3.0)
    }

    pub fn fill(volume: f64) -> Color {
        let color = if volume > 0.0 { BUY_COLOR } else { SELL_COLOR };
        color.with_alpha((volume.abs() / 20.0).min(0.75))
    }
}

impl PointStyle for StrategyStyle {
    fn mark(&self, scene: &mut Scene, at: Point, rec: &Record, _field: &str, _color: Color) {
        let volume = rec.get("volume").unwrap_or(0.0);
        let r = Self::radius(volume);
        let half = r * 0.75;
        let tip = if volume > 0.0 { at.y - r } else { at.y + r };
        let triangle = [Point::new(at.x - half, at.y), Point::new(at.x, tip), Point::new(at.x + half, at.y)];

        scene.line_style(1.0, TRADE_OUTLINE);
        scene.begin_fill(Color::WHITE);
        scene.draw_polygon(&triangle);
        scene.begin_fill(Self::fill(volume));
        scene.draw_polygon(&triangle);
        scene.end_fill();
    }
}

/// Trades of a strategy run, drawn over the price panel.
pub struct StrategyChart {
    points: PointChart<StrategyStyle>,
}

impl StrategyChart {
    pub fn new(name: &str, symbol: &str, strategy: &str) -> Self {
        let base = ChartBase::new(name, symbol, strategy).with_fields(&["price"]);
        Self { points: PointChart::with_style(base, StrategyStyle) }
    }

    /// Net traded volume and its volume-weighted price over the visible window.
    pub fn net_position(&self) -> Option<(f64, f64)> {
        let base = self.points.base();
        let ctx = base.context()?;
        let req = base.request()?;
        let cache = ctx.cache.borrow();
        let store = cache.store(&req.key())?;

        let (mut volume, mut price) = (0.0f64, 0.0f64);
        for rec in store.window(req.start_time, req.end_time, req.period) {
            let (Some(p), Some(v)) = (rec.get("price"), rec.get("volume")) else { continue };
            let total = volume + v;
            price = if total.abs() > 1e-12 { (price * volume + p * v) / total } else { 0.0 };
            volume = total;
        }
        Some((volume, price))
    }
}

impl Plottable for StrategyChart {
    fn base(&self) -> &ChartBase { self.points.base() }
    fn base_mut(&mut self) -> &mut ChartBase { self.points.base_mut() }

    fn draw(&mut self) {
        self.points.draw();
        if let Some((volume, price)) = self.net_position().filter(|(v, _)| v.abs() > 1e-5) {
            log::debug!("{}: net volume {volume:.4} at {price:.2}", self.points.base().name);
        }
    }
}
