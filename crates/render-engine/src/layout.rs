//! Scale-parameterised layout.
//!
//! Everything here is a pure function of the frame, the project settings
//! and a scale factor. Preview and export call the same functions, so line
//! breaks, visible lines and anchors never drift between the two; only
//! absolute coordinates differ by the ratio of the scales.

use slidekit_project_model::{
    Element, Frame, Margin, OutputSize, Signature, SignaturePosition, TextAlign, VerticalAlign,
    ELEMENT_REFERENCE_BOX,
};

/// Logical surface size for one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderGeometry {
    /// Surface width in pixels (design width × scale).
    pub width: f32,
    /// Surface height in pixels (design height × scale).
    pub height: f32,
    /// Design units → surface pixels.
    pub scale: f32,
}

impl RenderGeometry {
    pub fn new(size: OutputSize, scale: f32) -> Self {
        let (w, h) = size.dimensions();
        Self {
            width: w as f32 * scale,
            height: h as f32 * scale,
            scale,
        }
    }

    /// Publish-resolution geometry.
    pub fn full(size: OutputSize) -> Self {
        Self::new(size, 1.0)
    }

    /// Integer raster size that covers the logical surface.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.ceil().max(0.0) as u32,
            self.height.ceil().max(0.0) as u32,
        )
    }
}

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Whether `other` lies entirely inside this rectangle (with a small
    /// tolerance for float rounding).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        const EPS: f32 = 1e-3;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

/// Text-safe area: the surface inset by the effective margin × scale.
pub fn content_box(geometry: &RenderGeometry, margin: &Margin) -> Rect {
    let (mx, my) = margin.effective();
    let mx = mx * geometry.scale;
    let my = my * geometry.scale;
    Rect::new(
        mx,
        my,
        (geometry.width - 2.0 * mx).max(0.0),
        (geometry.height - 2.0 * my).max(0.0),
    )
}

/// Greedy first-fit word wrap.
///
/// Explicit `\n` always starts a new line; an empty paragraph produces one
/// empty line. A word moves to a new line only when the current line
/// already holds at least one word, so an over-long word sits alone on its
/// line instead of being split. Empty text produces no lines.
///
/// Words are split on spaces and rejoined with a single space, so runs of
/// spaces collapse and leading or trailing spaces on a line are dropped. A
/// paragraph of only spaces becomes an empty line.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    if text.is_empty() {
        return vec![];
    }

    let mut lines = vec![];
    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let mut line = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if measure(&candidate) > max_width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    lines
}

/// Baseline y of each line for the given vertical alignment.
///
/// - Top: the first baseline sits one line height below the box top.
/// - Center: the block of `count × line_height` is centred on the box.
/// - Bottom: the last baseline sits one line height above the box bottom.
pub fn baselines(count: usize, line_height: f32, content: &Rect, align: VerticalAlign) -> Vec<f32> {
    let total = count as f32 * line_height;
    let first = match align {
        VerticalAlign::Top => content.y + line_height,
        VerticalAlign::Center => content.center_y() - total / 2.0 + line_height,
        VerticalAlign::Bottom => content.bottom() - total,
    };
    (0..count).map(|i| first + i as f32 * line_height).collect()
}

/// Horizontal anchor shared by every line. The paint call aligns each
/// line against this x using the same [`TextAlign`].
pub fn x_anchor(align: TextAlign, content: &Rect, surface_width: f32) -> f32 {
    match align {
        TextAlign::Start => content.x,
        TextAlign::Center => surface_width / 2.0,
        TextAlign::End => content.right(),
    }
}

/// One laid-out line.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidLine {
    pub text: String,
    pub baseline: f32,
    /// False when the baseline falls outside the content box.
    pub visible: bool,
}

/// Result of laying out a frame's text at one scale.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    /// Font size in surface pixels.
    pub font_px: f32,
    /// Line advance in surface pixels.
    pub line_height: f32,
    pub align: TextAlign,
    pub anchor_x: f32,
    pub content: Rect,
    pub lines: Vec<LaidLine>,
}

impl TextLayout {
    pub fn visible_lines(&self) -> impl Iterator<Item = &LaidLine> {
        self.lines.iter().filter(|l| l.visible)
    }

    /// Line texts, for comparing break points across scales.
    pub fn line_texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

/// Lay out a frame's text.
///
/// `measure` returns the rendered width of a string in surface pixels for
/// the frame's font at `font_size × scale`.
pub fn layout_text<F>(frame: &Frame, geometry: &RenderGeometry, margin: &Margin, measure: F) -> TextLayout
where
    F: Fn(&str) -> f32,
{
    let content = content_box(geometry, margin);
    let font_px = frame.font_size * geometry.scale;
    let line_height = font_px * frame.line_height;

    let wrapped = wrap_text(&frame.text, content.width, measure);
    let ys = baselines(wrapped.len(), line_height, &content, frame.vertical_align);

    let lines = wrapped
        .into_iter()
        .zip(ys)
        .map(|(text, baseline)| LaidLine {
            text,
            baseline,
            visible: baseline >= content.y && baseline <= content.bottom(),
        })
        .collect();

    TextLayout {
        font_px,
        line_height,
        align: frame.text_align,
        anchor_x: x_anchor(frame.text_align, &content, geometry.width),
        content,
        lines,
    }
}

/// Map an element from the reference box onto the surface.
pub fn element_rect(element: &Element, geometry: &RenderGeometry) -> Rect {
    let sx = geometry.width / ELEMENT_REFERENCE_BOX;
    let sy = geometry.height / ELEMENT_REFERENCE_BOX;
    Rect::new(
        element.x * sx,
        element.y * sy,
        element.width * sx,
        element.height * sy,
    )
}

/// Where the signature badge goes.
///
/// The badge is `size × scale` wide, its height follows the source aspect
/// ratio, and it is anchored inside the content box. A badge larger than
/// the content box is shrunk (keeping its aspect) to fit.
pub fn signature_rect(
    signature: &Signature,
    source_width: u32,
    source_height: u32,
    geometry: &RenderGeometry,
    margin: &Margin,
) -> Rect {
    let content = content_box(geometry, margin);
    let aspect = if source_width == 0 {
        1.0
    } else {
        source_height as f32 / source_width as f32
    };

    let mut width = (signature.size * geometry.scale).max(0.0).min(content.width);
    let mut height = width * aspect;
    if height > content.height {
        height = content.height;
        width = if aspect > 0.0 { height / aspect } else { 0.0 };
    }

    let x = match signature.position {
        SignaturePosition::TopLeft | SignaturePosition::BottomLeft => content.x,
        SignaturePosition::TopCenter | SignaturePosition::BottomCenter => {
            content.center_x() - width / 2.0
        }
        SignaturePosition::TopRight | SignaturePosition::BottomRight => content.right() - width,
    };
    let y = if signature.position.is_top() {
        content.y
    } else {
        content.bottom() - height
    };

    Rect::new(x, y, width, height)
}
