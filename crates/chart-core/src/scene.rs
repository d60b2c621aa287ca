// File: crates/chart-core/src/scene.rs
// Summary: Retained display list. Charts and axes draw into a Scene through the
//          Surface trait; a renderer replays the primitives later.
// Notes:
// - Stroke and fill are pen state: `line_style` and `begin_fill` apply to every shape
//   drawn until changed. `move_to` starts a new path, `line_to` extends it.

use crate::geometry::{Point, Rect};

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self { Self { r, g, b, a: 255 } }
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self { Self { r, g, b, a } }

    /// `0xRRGGBB`, opaque.
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Same color with alpha `0.0..=1.0`.
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8, ..self }
    }

    pub fn to_hex(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Path { points: Vec<Point>, stroke: Option<Stroke>, fill: Option<Color> },
    Rect { rect: Rect, stroke: Option<Stroke>, fill: Option<Color> },
    Circle { center: Point, radius: f64, stroke: Option<Stroke>, fill: Option<Color> },
    Polygon { points: Vec<Point>, stroke: Option<Stroke>, fill: Option<Color> },
    Text { at: Point, text: String, size: f32, color: Color, align: Align },
}

/// Minimal drawing API the chart layer needs from a graphics backend.
pub trait Surface {
    fn clear(&mut self);
    fn line_style(&mut self, width: f64, color: Color);
    /// Stop stroking subsequent shapes.
    fn no_line(&mut self);
    fn begin_fill(&mut self, color: Color);
    fn end_fill(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn draw_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn draw_circle(&mut self, x: f64, y: f64, radius: f64);
    fn draw_polygon(&mut self, points: &[Point]);
    fn text(&mut self, x: f64, y: f64, text: &str, size: f32, color: Color, align: Align);
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    primitives: Vec<Primitive>,
    stroke: Option<Stroke>,
    fill: Option<Color>,
    path: Vec<Point>,
}

impl Scene {
    pub fn new() -> Self { Self::default() }

    /// Everything drawn so far, including an unfinished path.
    pub fn primitives(&self) -> impl Iterator<Item = Primitive> + '_ {
        let open = (self.path.len() > 1).then(|| self.path_primitive());
        self.primitives.iter().cloned().chain(open)
    }

    pub fn len(&self) -> usize {
        self.primitives.len() + usize::from(self.path.len() > 1)
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    fn path_primitive(&self) -> Primitive {
        Primitive::Path { points: self.path.clone(), stroke: self.stroke, fill: self.fill }
    }

    fn flush_path(&mut self) {
        if self.path.len() > 1 {
            let p = self.path_primitive();
            self.primitives.push(p);
        }
        self.path.clear();
    }
}

impl Surface for Scene {
    fn clear(&mut self) {
        self.primitives.clear();
        self.path.clear();
        self.stroke = None;
        self.fill = None;
    }

    fn line_style(&mut self, width: f64, color: Color) {
        self.flush_path();
        self.stroke = Some(Stroke { width, color });
    }

    fn no_line(&mut self) {
        self.flush_path();
        self.stroke = None;
    }

    fn begin_fill(&mut self, color: Color) {
        self.flush_path();
        self.fill = Some(color);
    }

    fn end_fill(&mut self) {
        self.flush_path();
        self.fill = None;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.flush_path();
        self.path.push(Point::new(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        // Without a preceding move_to the first point opens the path.
        self.path.push(Point::new(x, y));
    }

    fn draw_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.flush_path();
        let rect = Rect::from_ltwh(x, y, w, h).normalized();
        self.primitives.push(Primitive::Rect { rect, stroke: self.stroke, fill: self.fill });
    }

    fn draw_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.flush_path();
        self.primitives.push(Primitive::Circle {
            center: Point::new(x, y),
            radius: radius.abs(),
            stroke: self.stroke,
            fill: self.fill,
        });
    }

    fn draw_polygon(&mut self, points: &[Point]) {
        self.flush_path();
        if points.len() < 3 { return; }
        self.primitives.push(Primitive::Polygon {
            points: points.to_vec(),
            stroke: self.stroke,
            fill: self.fill,
        });
    }

    fn text(&mut self, x: f64, y: f64, text: &str, size: f32, color: Color, align: Align) {
        self.flush_path();
        self.primitives.push(Primitive::Text {
            at: Point::new(x, y),
            text: text.to_string(),
            size,
            color,
            align,
        });
    }
}
