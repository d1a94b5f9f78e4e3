//! Filled vector shapes for overlay elements.

use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_ellipse_mut, draw_polygon_mut};
use imageproc::point::Point;
use slidekit_project_model::{Color, ShapeKind};

use crate::layout::Rect;
use crate::surface::Surface;

/// Shapes smaller than this (in pixels, either side) are skipped.
const MIN_SHAPE_PX: f32 = 2.0;

const COVERED: Luma<u8> = Luma([255]);

/// Paint `shape` filling `rect`. Every shape is alpha-blended over what is
/// already on the surface.
pub fn paint_shape(surface: &mut Surface, shape: ShapeKind, rect: &Rect, color: Color) {
    if rect.width < MIN_SHAPE_PX || rect.height < MIN_SHAPE_PX {
        return;
    }

    match shape {
        ShapeKind::Rectangle => surface.fill_rect(rect, color),
        ShapeKind::Circle => {
            let Some(mut mask) = Mask::covering(surface, rect) else {
                return;
            };
            let (cx, cy) = mask.local(rect.center_x(), rect.center_y());
            draw_filled_ellipse_mut(
                &mut mask.image,
                (cx, cy),
                (rect.width / 2.0).round() as i32,
                (rect.height / 2.0).round() as i32,
                COVERED,
            );
            mask.blend_into(surface, color);
        }
        ShapeKind::Line => {
            // horizontal stroke through the middle of the box
            let thickness = (rect.height * 0.25).max(1.0);
            let stroke = Rect::new(
                rect.x,
                rect.center_y() - thickness / 2.0,
                rect.width,
                thickness,
            );
            surface.fill_rect(&stroke, color);
        }
        ShapeKind::Triangle | ShapeKind::Arrow | ShapeKind::Star => {
            let Some(mut mask) = Mask::covering(surface, rect) else {
                return;
            };
            let points = outline(shape, rect);
            if mask.fill_polygon(&points) {
                mask.blend_into(surface, color);
            }
        }
    }
}

/// Coverage mask over the part of the surface a shape can touch.
struct Mask {
    image: GrayImage,
    origin_x: i32,
    origin_y: i32,
}

impl Mask {
    /// Mask for `rect` clipped to the surface, with one pixel of slack for
    /// rounding. `None` when nothing is visible.
    fn covering(surface: &Surface, rect: &Rect) -> Option<Self> {
        let clip = |v: f32, max: u32| v.clamp(0.0, max as f32) as u32;
        let x0 = clip(rect.x.floor() - 1.0, surface.width());
        let y0 = clip(rect.y.floor() - 1.0, surface.height());
        let x1 = clip(rect.right().ceil() + 1.0, surface.width());
        let y1 = clip(rect.bottom().ceil() + 1.0, surface.height());
        (x0 < x1 && y0 < y1).then(|| Self {
            image: GrayImage::new(x1 - x0, y1 - y0),
            origin_x: x0 as i32,
            origin_y: y0 as i32,
        })
    }

    fn local(&self, x: f32, y: f32) -> (i32, i32) {
        (
            x.round() as i32 - self.origin_x,
            y.round() as i32 - self.origin_y,
        )
    }

    /// Rasterise a polygon given in surface coordinates. Returns false when
    /// the polygon collapses to fewer than three distinct points.
    fn fill_polygon(&mut self, points: &[(f32, f32)]) -> bool {
        let mut poly: Vec<Point<i32>> = Vec::with_capacity(points.len());
        for &(px, py) in points {
            let (x, y) = self.local(px, py);
            let p = Point::new(x, y);
            if poly.last() != Some(&p) {
                poly.push(p);
            }
        }
        while poly.len() > 1 && poly.first() == poly.last() {
            poly.pop();
        }
        // imageproc rejects degenerate polygons
        if poly.len() < 3 {
            return false;
        }
        draw_polygon_mut(&mut self.image, &poly, COVERED);
        true
    }

    fn blend_into(&self, surface: &mut Surface, color: Color) {
        for (x, y, px) in self.image.enumerate_pixels() {
            if px.0[0] > 0 {
                surface.blend_pixel(
                    self.origin_x + x as i32,
                    self.origin_y + y as i32,
                    color,
                    px.0[0] as f32 / 255.0,
                );
            }
        }
    }
}

/// Polygon outline for the polygonal shapes, in surface coordinates.
fn outline(shape: ShapeKind, rect: &Rect) -> Vec<(f32, f32)> {
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
    match shape {
        ShapeKind::Triangle => vec![(x + w / 2.0, y), (x + w, y + h), (x, y + h)],
        ShapeKind::Arrow => {
            let shaft_top = y + h * 0.35;
            let shaft_bottom = y + h * 0.65;
            let head = x + w * 0.6;
            vec![
                (x, shaft_top),
                (head, shaft_top),
                (head, y),
                (x + w, y + h / 2.0),
                (head, y + h),
                (head, shaft_bottom),
                (x, shaft_bottom),
            ]
        }
        ShapeKind::Star => {
            let (cx, cy) = (rect.center_x(), rect.center_y());
            let (rx, ry) = (w / 2.0, h / 2.0);
            (0..10)
                .map(|i| {
                    let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
                    let k = if i % 2 == 0 { 1.0 } else { 0.4 };
                    (cx + rx * k * angle.cos(), cy + ry * k * angle.sin())
                })
                .collect()
        }
        ShapeKind::Rectangle | ShapeKind::Circle | ShapeKind::Line => vec![
            (x, y),
            (x + w, y),
            (x + w, y + h),
            (x, y + h),
        ],
    }
}
