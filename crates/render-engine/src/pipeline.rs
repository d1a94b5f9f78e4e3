//! The layout & paint pipeline.
//!
//! `paint_frame` is synchronous and deterministic: given the same request,
//! decoded assets and fonts it produces the same pixels. All asynchronous
//! work (image decoding) happens up front in [`FrameAssets::load`], so the
//! paint order is always background → text → elements → signature no
//! matter in which order decodes complete.

use slidekit_common::{SlideError, SlideResult};
use slidekit_project_model::{ElementKind, Frame, Margin, Project, Signature};

use crate::decode::{FrameAssets, ImageLoader};
use crate::layout::{element_rect, layout_text, signature_rect, RenderGeometry};
use crate::shapes::paint_shape;
use crate::surface::Surface;
use crate::text::FontBook;

/// Everything needed to paint one frame at one scale.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub frame: &'a Frame,
    pub geometry: RenderGeometry,
    pub margin: Margin,
    pub signature: Option<&'a Signature>,
}

impl<'a> RenderRequest<'a> {
    /// Request for frame `index` of `project` at `scale`.
    pub fn for_project(project: &'a Project, index: usize, scale: f32) -> SlideResult<Self> {
        let frame = project.frames.get(index).ok_or_else(|| {
            SlideError::validation(format!(
                "frame {} does not exist (project has {})",
                index + 1,
                project.frames.len()
            ))
        })?;
        Ok(Self {
            frame,
            geometry: RenderGeometry::new(project.size, scale),
            margin: project.margin,
            signature: project.signature.as_ref(),
        })
    }
}

/// What a paint pass actually drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintSummary {
    pub background_image: bool,
    pub lines_painted: usize,
    pub lines_clipped: usize,
    pub elements_painted: usize,
    pub elements_skipped: usize,
    pub signature: bool,
}

/// Paint a frame onto `surface`. The surface is fully cleared first.
pub fn paint_frame(
    surface: &mut Surface,
    request: &RenderRequest<'_>,
    assets: &FrameAssets,
    fonts: &FontBook,
) -> PaintSummary {
    let frame = request.frame;
    let geometry = &request.geometry;
    let mut summary = PaintSummary::default();

    surface.clear();

    // A missing or undecodable background image leaves the flat color.
    surface.fill(frame.background_color);
    if let Some(background) = &assets.background {
        surface.draw_image_stretched(background);
        summary.background_image = true;
    }

    if !frame.text.is_empty() {
        let face = fonts.resolve(&frame.font_family, frame.bold, frame.italic);
        let px = frame.font_size * geometry.scale;
        let spacing = frame.letter_spacing * geometry.scale;
        let layout = layout_text(frame, geometry, &request.margin, |s| {
            face.measure(s, px, spacing)
        });

        for line in &layout.lines {
            if !line.visible {
                summary.lines_clipped += 1;
                continue;
            }
            if line.text.is_empty() {
                continue;
            }
            face.draw(
                surface,
                &line.text,
                layout.anchor_x,
                line.baseline,
                layout.align,
                layout.font_px,
                spacing,
                frame.text_color,
                frame.underline,
            );
            summary.lines_painted += 1;
        }
    }

    for (i, element) in frame.elements.iter().enumerate() {
        let rect = element_rect(element, geometry);
        match &element.kind {
            ElementKind::Shape { shape } => {
                let color = element.color.unwrap_or(frame.text_color);
                paint_shape(surface, *shape, &rect, color);
                summary.elements_painted += 1;
            }
            ElementKind::Image { .. } => match assets.elements.get(i).and_then(|a| a.as_ref()) {
                Some(image) => {
                    surface.draw_image(image, &rect);
                    summary.elements_painted += 1;
                }
                None => summary.elements_skipped += 1,
            },
        }
    }

    if let (Some(signature), Some(image)) = (request.signature, &assets.signature) {
        let rect = signature_rect(
            signature,
            image.width(),
            image.height(),
            geometry,
            &request.margin,
        );
        surface.draw_image(image, &rect);
        summary.signature = true;
    }

    summary
}

/// Decode every image the request needs, wait for all of them, then paint
/// onto a fresh surface sized to the request geometry.
pub async fn render_frame(
    request: &RenderRequest<'_>,
    loader: &ImageLoader,
    fonts: &FontBook,
) -> SlideResult<(Surface, PaintSummary)> {
    let (width, height) = request.geometry.pixel_size();
    let mut surface = Surface::new(width, height)?;

    let assets = FrameAssets::load(request.frame, request.signature, loader).await;
    let summary = paint_frame(&mut surface, request, &assets, fonts);
    tracing::debug!(
        width,
        height,
        scale = request.geometry.scale,
        lines = summary.lines_painted,
        clipped = summary.lines_clipped,
        failures = assets.failures.len(),
        "Frame painted"
    );
    Ok((surface, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidekit_project_model::{
        Color, Element, ImageRef, OutputSize, ShapeKind, SignaturePosition, VerticalAlign,
    };

    const BG: Color = Color::rgb(20, 40, 60);

    fn project_with_text(text: &str) -> Project {
        let mut project = Project::new("Paint", OutputSize::Square);
        let frame = &mut project.frames[0];
        frame.text = text.to_string();
        frame.background_color = BG;
        frame.text_color = Color::WHITE;
        frame.font_size = 40.0;
        project
    }

    #[tokio::test]
    async fn test_flat_background_and_text() {
        let project = project_with_text("Hello there");
        let request = RenderRequest::for_project(&project, 0, 0.5).unwrap();
        let loader = ImageLoader::local(std::env::temp_dir());
        let (surface, summary) = render_frame(&request, &loader, &FontBook::fallback_only())
            .await
            .unwrap();

        assert_eq!((surface.width(), surface.height()), (540, 540));
        assert_eq!(surface.pixel(2, 2), BG.to_array());
        assert_eq!(summary.lines_painted, 1);
        assert!(surface
            .image()
            .pixels()
            .any(|p| p.0 == Color::WHITE.to_array()));
    }

    #[tokio::test]
    async fn test_empty_text_paints_only_background() {
        let project = project_with_text("");
        let request = RenderRequest::for_project(&project, 0, 0.25).unwrap();
        let loader = ImageLoader::local(std::env::temp_dir());
        let (surface, summary) = render_frame(&request, &loader, &FontBook::fallback_only())
            .await
            .unwrap();
        assert_eq!(summary, PaintSummary::default());
        assert!(surface.image().pixels().all(|p| p.0 == BG.to_array()));
    }

    fn png_data_uri(w: u32, h: u32, rgba: [u8; 4]) -> String {
        use base64::Engine as _;
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
        )
    }

    #[tokio::test]
    async fn test_decoded_background_under_text_and_signature() {
        const GREEN: [u8; 4] = [0, 160, 0, 255];
        const BLUE: [u8; 4] = [0, 0, 255, 255];

        let mut project = project_with_text("On a photo");
        project.frames[0].background_image = Some(ImageRef::new(png_data_uri(4, 4, GREEN)));
        project.signature = Some(Signature {
            image: ImageRef::new(png_data_uri(4, 2, BLUE)),
            size: 200.0,
            position: SignaturePosition::BottomRight,
        });
        let request = RenderRequest::for_project(&project, 0, 1.0).unwrap();
        let loader = ImageLoader::local(std::env::temp_dir());
        let (surface, summary) = render_frame(&request, &loader, &FontBook::fallback_only())
            .await
            .unwrap();

        assert!(summary.background_image);
        assert!(summary.signature);
        assert_eq!(summary.lines_painted, 1);
        // the photo replaces the flat color everywhere
        assert_eq!(surface.pixel(2, 2), GREEN);
        assert_eq!(surface.pixel(1079, 0), GREEN);
        assert!(surface.image().pixels().all(|p| p.0 != BG.to_array()));
        assert!(surface
            .image()
            .pixels()
            .any(|p| p.0 == Color::WHITE.to_array()));
        assert_eq!(surface.pixel(1000, 1000), BLUE);
    }

    #[tokio::test]
    async fn test_missing_background_falls_back_to_color() {
        let mut project = project_with_text("Still here");
        project.frames[0].background_image = Some(ImageRef::new("slidekit-no-bg.png"));
        let request = RenderRequest::for_project(&project, 0, 0.5).unwrap();
        let loader = ImageLoader::local(std::env::temp_dir());
        let (surface, summary) = render_frame(&request, &loader, &FontBook::fallback_only())
            .await
            .unwrap();
        assert!(!summary.background_image);
        assert_eq!(summary.lines_painted, 1);
        assert_eq!(surface.pixel(0, 0), BG.to_array());
    }

    #[test]
    fn test_elements_paint_in_order() {
        let mut project = project_with_text("");
        project.frames[0].elements = vec![
            Element::shape("under", ShapeKind::Rectangle, 100.0, 100.0, 200.0, 200.0)
                .with_color(Color::rgb(255, 0, 0)),
            Element::shape("over", ShapeKind::Rectangle, 150.0, 150.0, 100.0, 100.0)
                .with_color(Color::rgb(0, 0, 255)),
            Element::image("missing", ImageRef::new("nope.png"), 0.0, 0.0, 50.0, 50.0),
        ];
        let request = RenderRequest::for_project(&project, 0, 1.0).unwrap();
        let mut surface = Surface::new(1080, 1080).unwrap();
        let assets = FrameAssets {
            elements: vec![None, None, None],
            ..Default::default()
        };
        let summary = paint_frame(&mut surface, &request, &assets, &FontBook::fallback_only());

        assert_eq!(summary.elements_painted, 2);
        assert_eq!(summary.elements_skipped, 1);
        // centre of the reference box is covered by the later element
        assert_eq!(surface.pixel(540, 540), [0, 0, 255, 255]);
        assert_eq!(surface.pixel(300, 300), [255, 0, 0, 255]);
    }

    #[test]
    fn test_signature_painted_last_at_anchor() {
        let mut project = project_with_text("Covered?");
        project.frames[0].vertical_align = VerticalAlign::Bottom;
        project.signature = Some(Signature {
            image: ImageRef::new("sig.png"),
            size: 200.0,
            position: SignaturePosition::BottomRight,
        });
        let request = RenderRequest::for_project(&project, 0, 1.0).unwrap();
        let mut surface = Surface::new(1080, 1080).unwrap();
        let badge = image::RgbaImage::from_pixel(4, 2, image::Rgba([0, 255, 0, 255]));
        let assets = FrameAssets {
            signature: Some(std::sync::Arc::new(badge)),
            ..Default::default()
        };
        let summary = paint_frame(&mut surface, &request, &assets, &FontBook::fallback_only());

        assert!(summary.signature);
        // badge spans x 860..1060, y 960..1060
        assert_eq!(surface.pixel(1000, 1000), [0, 255, 0, 255]);
        assert_eq!(surface.pixel(1070, 1070), BG.to_array());
    }

    #[test]
    fn test_request_for_missing_frame() {
        let project = project_with_text("x");
        assert!(matches!(
            RenderRequest::for_project(&project, 3, 1.0),
            Err(SlideError::Validation { .. })
        ));
    }
}
