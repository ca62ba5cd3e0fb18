//! CPU raster surface that strokes are rendered onto.
//!
//! Points are stored in logical units and scaled by the device pixel ratio
//! here, at render time. Rendering is deterministic: the same stroke list on
//! a surface of the same configuration always yields the same pixels.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use kurbo::{Line, ParamCurveNearest, Point};
use notesketch_core::{Stroke, SurfaceConfig, ToolKind};
use std::borrow::Cow;

/// Accuracy passed to kurbo's nearest-point query.
const NEAREST_ACCURACY: f64 = 1e-6;

/// Smallest rendered radius, in device pixels, so thin or light strokes stay visible.
const MIN_RADIUS: f64 = 0.5;

/// Pixel buffer sized to the display area.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    config: SurfaceConfig,
    pixels: RgbaImage,
    pressure_sensitive: bool,
    /// Image loaded from a snapshot, repainted under the strokes on every redraw.
    backdrop: Option<RgbaImage>,
}

impl RasterSurface {
    /// Allocate a blank surface.
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            config,
            pixels: RgbaImage::new(config.pixel_width(), config.pixel_height()),
            pressure_sensitive: false,
            backdrop: None,
        }
    }

    /// Scale each point's rendered radius by its pressure.
    pub fn with_pressure_sensitivity(mut self, enabled: bool) -> Self {
        self.pressure_sensitive = enabled;
        self
    }

    pub fn config(&self) -> SurfaceConfig {
        self.config
    }

    /// Buffer width in device pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Buffer height in device pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// RGBA value of a pixel, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// True if every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p[3] == 0)
    }

    pub fn has_backdrop(&self) -> bool {
        self.backdrop.is_some()
    }

    /// Reallocate for a new configuration. Content is dropped; redraw afterwards.
    pub fn resize(&mut self, config: SurfaceConfig) {
        self.config = config;
        self.pixels = RgbaImage::new(config.pixel_width(), config.pixel_height());
        log::debug!("surface resized to {}x{}", self.width(), self.height());
    }

    /// Set every pixel fully transparent.
    pub fn clear(&mut self) {
        self.pixels.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    /// Replace the backdrop and paint it onto the current buffer.
    ///
    /// The image is scaled to fit the buffer, preserving aspect ratio,
    /// centered and letterboxed.
    pub fn set_backdrop(&mut self, image: Option<RgbaImage>) {
        self.backdrop = image;
        if let Some(backdrop) = &self.backdrop {
            composite_fitted(&mut self.pixels, backdrop);
        }
    }

    /// Render one stroke on top of the current contents.
    pub fn draw_stroke(&mut self, stroke: &Stroke) {
        let scale = self.config.scale();
        let Some(mask) = CoverageMask::rasterize(
            stroke,
            scale,
            self.pressure_sensitive,
            self.pixels.width(),
            self.pixels.height(),
        ) else {
            return;
        };

        let [r, g, b, a] = stroke.color.to_rgba();
        for (x, y, coverage) in mask.covered() {
            let pixel = self.pixels.get_pixel_mut(x, y);
            match stroke.tool {
                ToolKind::Pen => blend_over(pixel, Rgba([r, g, b, a]), coverage),
                ToolKind::Eraser => erase(pixel, coverage),
            }
        }
    }

    /// Clear, repaint the backdrop, then draw every stroke in order.
    pub fn redraw_all<'a>(&mut self, strokes: impl IntoIterator<Item = &'a Stroke>) {
        self.clear();
        if let Some(backdrop) = &self.backdrop {
            composite_fitted(&mut self.pixels, backdrop);
        }
        for stroke in strokes {
            self.draw_stroke(stroke);
        }
    }
}

/// Per-stroke coverage over the stroke's device-space bounding box.
///
/// Segments are stamped into the mask with `max`, so overlapping segments
/// and joins are composited once.
struct CoverageMask {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl CoverageMask {
    fn rasterize(
        stroke: &Stroke,
        scale: f64,
        pressure_sensitive: bool,
        surface_width: u32,
        surface_height: u32,
    ) -> Option<Self> {
        let half_width = stroke.width * scale / 2.0;
        let samples: Vec<(Point, f64)> = stroke
            .points()
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .map(|p| {
                let radius = if pressure_sensitive {
                    half_width * p.pressure
                } else {
                    half_width
                };
                (Point::new(p.x * scale, p.y * scale), radius.max(MIN_RADIUS))
            })
            .collect();
        let first = samples.first()?;

        let (mut min, mut max, mut max_radius) = (first.0, first.0, first.1);
        for (point, radius) in &samples[1..] {
            min = Point::new(min.x.min(point.x), min.y.min(point.y));
            max = Point::new(max.x.max(point.x), max.y.max(point.y));
            max_radius = max_radius.max(*radius);
        }

        let pad = max_radius + 1.0;
        let x0 = (min.x - pad).floor().max(0.0) as u32;
        let y0 = (min.y - pad).floor().max(0.0) as u32;
        let x1 = (max.x + pad).ceil().min(surface_width as f64).max(0.0) as u32;
        let y1 = (max.y + pad).ceil().min(surface_height as f64).max(0.0) as u32;
        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        let (width, height) = (x1 - x0, y1 - y0);
        let mut mask = Self {
            x0,
            y0,
            width,
            height,
            coverage: vec![0.0; width as usize * height as usize],
        };

        match samples.as_slice() {
            [(point, radius)] => mask.stamp_segment(*point, *radius, *point, *radius),
            _ => {
                for pair in samples.windows(2) {
                    let ((a, ra), (b, rb)) = (pair[0], pair[1]);
                    mask.stamp_segment(a, ra, b, rb);
                }
            }
        }
        Some(mask)
    }

    /// Round-capped segment whose radius varies linearly from `ra` to `rb`.
    fn stamp_segment(&mut self, a: Point, ra: f64, b: Point, rb: f64) {
        let pad = ra.max(rb) + 1.0;
        let x_end = (self.x0 + self.width) as f64;
        let y_end = (self.y0 + self.height) as f64;
        let sx0 = (a.x.min(b.x) - pad).floor().max(self.x0 as f64) as u32;
        let sy0 = (a.y.min(b.y) - pad).floor().max(self.y0 as f64) as u32;
        let sx1 = (a.x.max(b.x) + pad).ceil().min(x_end) as u32;
        let sy1 = (a.y.max(b.y) + pad).ceil().min(y_end) as u32;

        let line = Line::new(a, b);
        for y in sy0..sy1 {
            for x in sx0..sx1 {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let nearest = line.nearest(center, NEAREST_ACCURACY);
                let radius = ra + (rb - ra) * nearest.t;
                let coverage = (radius - nearest.distance_sq.sqrt() + 0.5).clamp(0.0, 1.0) as f32;

                let index = ((y - self.y0) * self.width + (x - self.x0)) as usize;
                if coverage > self.coverage[index] {
                    self.coverage[index] = coverage;
                }
            }
        }
    }

    /// Surface coordinates and coverage of every touched pixel.
    fn covered(&self) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        self.coverage
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0.0)
            .map(|(i, c)| {
                let i = i as u32;
                (self.x0 + i % self.width, self.y0 + i / self.width, *c)
            })
    }
}

fn to_channel(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Source-over compositing of `src` scaled by `coverage`, on straight alpha.
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let src_a = src[3] as f32 / 255.0 * coverage;
    if src_a <= 0.0 {
        return;
    }
    if dst[3] == 0 {
        let alpha = to_channel(src_a);
        if alpha > 0 {
            *dst = Rgba([src[0], src[1], src[2], alpha]);
        }
        return;
    }

    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    for i in 0..3 {
        let c = (src[i] as f32 * src_a + dst[i] as f32 * dst_a * (1.0 - src_a)) / out_a;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = to_channel(out_a);
}

/// Destination-out: cut the pixel toward transparent by `coverage`.
fn erase(dst: &mut Rgba<u8>, coverage: f32) {
    let remaining = dst[3] as f32 / 255.0 * (1.0 - coverage);
    dst[3] = to_channel(remaining);
    if dst[3] == 0 {
        *dst = Rgba([0, 0, 0, 0]);
    }
}

/// Scale `image` to fit `target` preserving aspect ratio, center it, and composite.
fn composite_fitted(target: &mut RgbaImage, image: &RgbaImage) {
    let (width, height) = target.dimensions();
    let (source_width, source_height) = image.dimensions();
    if source_width == 0 || source_height == 0 {
        return;
    }

    let scale = (width as f64 / source_width as f64).min(height as f64 / source_height as f64);
    let fit_width = ((source_width as f64 * scale).round() as u32).clamp(1, width);
    let fit_height = ((source_height as f64 * scale).round() as u32).clamp(1, height);

    let fitted = if (fit_width, fit_height) == (source_width, source_height) {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(imageops::resize(image, fit_width, fit_height, FilterType::Triangle))
    };

    let offset_x = (width - fit_width) / 2;
    let offset_y = (height - fit_height) / 2;
    for (x, y, pixel) in fitted.enumerate_pixels() {
        blend_over(target.get_pixel_mut(x + offset_x, y + offset_y), *pixel, 1.0);
    }
}
