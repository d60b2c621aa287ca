// File: crates/chart-render-skia/src/lib.rs
// Summary: Skia CPU raster backend: replays chart-core scenes onto a surface and encodes PNG.

pub mod text;

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chart_core::scene::{Color, Primitive, Scene, Stroke};
use chart_core::types::{HEIGHT, WIDTH};
use chart_core::ChartStackManager;
use skia_safe as skia;

pub use text::TextShaper;

pub struct RenderOptions {
    pub width: i32,
    pub height: i32,
    pub background: Color,
    /// Skip text primitives; keeps golden images stable across font setups.
    pub draw_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { width: WIDTH, height: HEIGHT, background: Color::rgb(18, 18, 20), draw_labels: true }
    }
}

impl RenderOptions {
    /// Surface sized to the manager, cleared with its theme background.
    pub fn for_manager(manager: &ChartStackManager) -> Self {
        let (w, h) = manager.size();
        Self {
            width: w.round() as i32,
            height: h.round() as i32,
            background: manager.theme().background,
            ..Self::default()
        }
    }
}

fn sk_color(c: Color) -> skia::Color {
    skia::Color::from_argb(c.a, c.r, c.g, c.b)
}

fn stroke_paint(stroke: &Stroke) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(stroke.width as f32);
    paint.set_color(sk_color(stroke.color));
    paint
}

fn fill_paint(color: Color) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Fill);
    paint.set_color(sk_color(color));
    paint
}

fn sk_path(points: &[chart_core::geometry::Point], close: bool) -> skia::Path {
    let mut path = skia::Path::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to((first.x as f32, first.y as f32));
        for p in rest {
            path.line_to((p.x as f32, p.y as f32));
        }
        if close {
            path.close();
        }
    }
    path
}

pub struct SkiaRenderer {
    text: TextShaper,
}

impl Default for SkiaRenderer {
    fn default() -> Self { Self::new() }
}

impl SkiaRenderer {
    pub fn new() -> Self { Self { text: TextShaper::new() } }

    /// Replay `layers` (vertical offset, scene) in order onto a fresh raster surface.
    pub fn render_to_png_bytes(&self, layers: &[(f64, &Scene)], opts: &RenderOptions) -> Result<Vec<u8>> {
        let mut surface = skia::surfaces::raster_n32_premul((opts.width, opts.height))
            .ok_or_else(|| anyhow!("failed to create raster surface"))?;
        let canvas = surface.canvas();
        canvas.clear(sk_color(opts.background));

        for (offset, scene) in layers {
            canvas.save();
            canvas.translate((0.0, *offset as f32));
            for prim in scene.primitives() {
                self.draw_primitive(canvas, &prim, opts);
            }
            canvas.restore();
        }

        let image = surface.image_snapshot();
        #[allow(deprecated)]
        let data = image
            .encode_to_data(skia::EncodedImageFormat::PNG)
            .ok_or_else(|| anyhow!("encode PNG failed"))?;
        Ok(data.as_bytes().to_vec())
    }

    pub fn render_to_png(
        &self,
        layers: &[(f64, &Scene)],
        opts: &RenderOptions,
        output_png_path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = self.render_to_png_bytes(layers, opts)?;
        let path = output_png_path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Render every panel and the time axis of `manager`.
    pub fn render_manager(&self, manager: &ChartStackManager) -> Result<Vec<u8>> {
        self.render_to_png_bytes(&manager.layers(), &RenderOptions::for_manager(manager))
    }

    fn draw_primitive(&self, canvas: &skia::Canvas, prim: &Primitive, opts: &RenderOptions) {
        match prim {
            Primitive::Path { points, stroke, fill } => {
                if let Some(color) = fill {
                    canvas.draw_path(&sk_path(points, true), &fill_paint(*color));
                }
                if let Some(stroke) = stroke {
                    canvas.draw_path(&sk_path(points, false), &stroke_paint(stroke));
                }
            }
            Primitive::Polygon { points, stroke, fill } => {
                let path = sk_path(points, true);
                if let Some(color) = fill {
                    canvas.draw_path(&path, &fill_paint(*color));
                }
                if let Some(stroke) = stroke {
                    canvas.draw_path(&path, &stroke_paint(stroke));
                }
            }
            Primitive::Rect { rect, stroke, fill } => {
                let r = skia::Rect::from_ltrb(rect.left as f32, rect.top as f32, rect.right as f32, rect.bottom as f32);
                if let Some(color) = fill {
                    canvas.draw_rect(r, &fill_paint(*color));
                }
                if let Some(stroke) = stroke {
                    canvas.draw_rect(r, &stroke_paint(stroke));
                }
            }
            Primitive::Circle { center, radius, stroke, fill } => {
                let c = (center.x as f32, center.y as f32);
                if let Some(color) = fill {
                    canvas.draw_circle(c, *radius as f32, &fill_paint(*color));
                }
                if let Some(stroke) = stroke {
                    canvas.draw_circle(c, *radius as f32, &stroke_paint(stroke));
                }
            }
            Primitive::Text { at, text, size, color, align } => {
                if opts.draw_labels {
                    self.text.draw(canvas, text, at.x as f32, at.y as f32, *size, sk_color(*color), *align);
                }
            }
        }
    }
}
