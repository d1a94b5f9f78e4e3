//! Preview and export must agree on line breaks and on which lines are
//! visible; only coordinates scale.

use proptest::prelude::*;
use slidekit_project_model::{
    Color, Frame, ImageRef, Margin, OutputSize, Signature, SignaturePosition, TextAlign,
    VerticalAlign,
};
use slidekit_render_engine::layout::{content_box, layout_text, signature_rect, wrap_text};
use slidekit_render_engine::{RenderGeometry, Typeface};

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z]{1,12}", 0..40).prop_map(|words| words.join(" "))
}

fn arb_size() -> impl Strategy<Value = OutputSize> {
    prop::sample::select(OutputSize::ALL.to_vec())
}

fn arb_valign() -> impl Strategy<Value = VerticalAlign> {
    prop::sample::select(vec![
        VerticalAlign::Top,
        VerticalAlign::Center,
        VerticalAlign::Bottom,
    ])
}

fn frame(text: String, font_size: f32, valign: VerticalAlign) -> Frame {
    let mut frame = Frame::new(Color::WHITE, Color::BLACK, "Inter");
    frame.text = text;
    frame.font_size = font_size;
    frame.vertical_align = valign;
    frame.text_align = TextAlign::Center;
    frame
}

proptest! {
    #[test]
    fn wrapping_is_deterministic(text in arb_text(), width in 50.0f32..1200.0) {
        let face = Typeface::Fallback;
        let measure = |s: &str| face.measure(s, 32.0, 0.0);
        prop_assert_eq!(wrap_text(&text, width, measure), wrap_text(&text, width, measure));
    }

    #[test]
    fn wrapped_lines_fit_unless_single_word(text in arb_text(), width in 50.0f32..1200.0) {
        let face = Typeface::Fallback;
        let measure = |s: &str| face.measure(s, 32.0, 0.0);
        for line in wrap_text(&text, width, measure) {
            prop_assert!(measure(&line) <= width || !line.contains(' '));
        }
    }

    #[test]
    fn layout_is_scale_invariant(
        text in arb_text(),
        font_size in 12u32..120,
        valign in arb_valign(),
        size in arb_size(),
        scale in prop::sample::select(vec![0.25f32, 0.5]),
    ) {
        let frame = frame(text, font_size as f32, valign);
        let margin = Margin::default();
        let face = Typeface::Fallback;

        let layout_at = |geometry: RenderGeometry| {
            let px = frame.font_size * geometry.scale;
            layout_text(&frame, &geometry, &margin, |s| face.measure(s, px, 0.0))
        };
        let full = layout_at(RenderGeometry::full(size));
        let small = layout_at(RenderGeometry::new(size, scale));

        prop_assert_eq!(full.line_texts(), small.line_texts());
        for (a, b) in full.lines.iter().zip(&small.lines) {
            prop_assert_eq!(a.visible, b.visible);
            prop_assert!((a.baseline * scale - b.baseline).abs() < 1e-2);
        }
        prop_assert!((full.anchor_x * scale - small.anchor_x).abs() < 1e-3);
    }

    #[test]
    fn signature_stays_inside_content_box(
        size in arb_size(),
        position in prop::sample::select(SignaturePosition::ALL.to_vec()),
        sig_size in 10.0f32..2000.0,
        src_w in 1u32..800,
        src_h in 1u32..800,
        enabled in any::<bool>(),
    ) {
        let geometry = RenderGeometry::full(size);
        let margin = Margin { enabled, ..Margin::default() };
        let signature = Signature {
            image: ImageRef::new("sig.png"),
            size: sig_size,
            position,
        };
        let rect = signature_rect(&signature, src_w, src_h, &geometry, &margin);
        prop_assert!(content_box(&geometry, &margin).contains_rect(&rect));
    }
}
