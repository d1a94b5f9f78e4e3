//! Raster surface backed by an RGBA image buffer.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use slidekit_common::{SlideError, SlideResult};
use slidekit_project_model::Color;

use crate::export::ExportFormat;
use crate::layout::Rect;

/// A drawable RGBA surface.
#[derive(Debug, Clone)]
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    /// Largest width or height accepted.
    pub const MAX_DIMENSION: u32 = 8192;

    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> SlideResult<Self> {
        if width == 0 || height == 0 {
            return Err(SlideError::surface_unavailable(format!(
                "cannot allocate a {width}x{height} surface"
            )));
        }
        if width > Self::MAX_DIMENSION || height > Self::MAX_DIMENSION {
            return Err(SlideError::surface_unavailable(format!(
                "{width}x{height} exceeds the {max}px limit",
                max = Self::MAX_DIMENSION
            )));
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// RGBA value at a pixel. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    /// Overwrite every pixel with a color.
    pub fn fill(&mut self, color: Color) {
        let px = Rgba(color.to_array());
        self.image.pixels_mut().for_each(|p| *p = px);
    }

    /// Pixel span covered by a float rectangle, clipped to the surface.
    fn span(&self, rect: &Rect) -> Option<(u32, u32, u32, u32)> {
        let clip = |v: f32, max: u32| v.round().clamp(0.0, max as f32) as u32;
        let x0 = clip(rect.x, self.width());
        let x1 = clip(rect.right(), self.width());
        let y0 = clip(rect.y, self.height());
        let y1 = clip(rect.bottom(), self.height());
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Alpha-blend a solid rectangle.
    pub fn fill_rect(&mut self, rect: &Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = self.span(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                blend(self.image.get_pixel_mut(x, y), color, 1.0);
            }
        }
    }

    /// Blend `color` into one pixel with the given coverage in `[0, 1]`.
    /// Out-of-bounds coordinates are ignored.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        if coverage <= 0.0 {
            return;
        }
        blend(self.image.get_pixel_mut(x as u32, y as u32), color, coverage);
    }

    /// Draw `source` stretched to fill `rect`, alpha-composited.
    ///
    /// Rects much larger than the surface are resampled only over their
    /// visible part, so the scratch buffer never outgrows the surface.
    pub fn draw_image(&mut self, source: &RgbaImage, rect: &Rect) {
        let w = rect.width.round();
        let h = rect.height.round();
        if w < 1.0 || h < 1.0 || source.width() == 0 || source.height() == 0 {
            return;
        }
        if w > (self.width() * 2) as f32 || h > (self.height() * 2) as f32 {
            self.draw_image_clipped(source, rect);
            return;
        }
        let scaled = if source.width() == w as u32 && source.height() == h as u32 {
            source.clone()
        } else {
            imageops::resize(source, w as u32, h as u32, FilterType::Triangle)
        };
        imageops::overlay(
            &mut self.image,
            &scaled,
            rect.x.round() as i64,
            rect.y.round() as i64,
        );
    }

    fn draw_image_clipped(&mut self, source: &RgbaImage, rect: &Rect) {
        let Some((x0, y0, x1, y1)) = self.span(rect) else {
            return;
        };
        // source pixels per destination pixel
        let sx = source.width() as f32 / rect.width;
        let sy = source.height() as f32 / rect.height;
        let src_x0 = (((x0 as f32 - rect.x) * sx).floor().max(0.0) as u32).min(source.width() - 1);
        let src_y0 = (((y0 as f32 - rect.y) * sy).floor().max(0.0) as u32).min(source.height() - 1);
        let src_x1 = (((x1 as f32 - rect.x) * sx).ceil() as u32).clamp(src_x0 + 1, source.width());
        let src_y1 = (((y1 as f32 - rect.y) * sy).ceil() as u32).clamp(src_y0 + 1, source.height());

        let footprint =
            imageops::crop_imm(source, src_x0, src_y0, src_x1 - src_x0, src_y1 - src_y0).to_image();
        let scaled = imageops::resize(&footprint, x1 - x0, y1 - y0, FilterType::Triangle);
        imageops::overlay(&mut self.image, &scaled, x0 as i64, y0 as i64);
    }

    /// Draw `source` stretched over the whole surface.
    pub fn draw_image_stretched(&mut self, source: &RgbaImage) {
        let full = Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32);
        self.draw_image(source, &full);
    }

    /// Serialize the surface to an image file in memory.
    pub fn encode(&self, format: ExportFormat) -> SlideResult<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        let result = match format {
            ExportFormat::Png => DynamicImage::ImageRgba8(self.image.clone())
                .write_to(&mut bytes, image::ImageFormat::Png),
            ExportFormat::Jpeg => DynamicImage::ImageRgba8(self.image.clone())
                .to_rgb8()
                .write_to(&mut bytes, image::ImageFormat::Jpeg),
        };
        result.map_err(|e| SlideError::render(format!("failed to encode {format:?}: {e}")))?;
        Ok(bytes.into_inner())
    }
}

/// Source-over compositing of a straight-alpha color.
fn blend(dst: &mut Rgba<u8>, color: Color, coverage: f32) {
    let sa = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let src = [color.r, color.g, color.b];
    for (i, s) in src.iter().enumerate() {
        let d = dst.0[i] as f32;
        let c = (*s as f32 * sa + d * da * (1.0 - sa)) / out_a;
        dst.0[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}
