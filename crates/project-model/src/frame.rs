//! Frame (slide) and overlay element types.
//!
//! A frame is described in design units and carries no knowledge of the
//! surface it is eventually painted on.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Side length of the reference box overlay elements are authored in.
pub const ELEMENT_REFERENCE_BOX: f32 = 400.0;

/// Opaque image source reference (path, `data:` URI, ...).
///
/// The engine never uploads; references arrive already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(src: impl Into<String>) -> Self {
        Self(src.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Start,
    #[default]
    Center,
    End,
}

/// Vertical text alignment inside the content box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// One slide of a carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Free-form text; `\n` starts a new paragraph.
    pub text: String,

    /// Font size in design units.
    pub font_size: f32,

    #[serde(default)]
    pub text_align: TextAlign,

    #[serde(default)]
    pub vertical_align: VerticalAlign,

    #[serde(default)]
    pub bold: bool,

    #[serde(default)]
    pub italic: bool,

    #[serde(default)]
    pub underline: bool,

    /// Line height as a multiple of the font size.
    #[serde(default = "default_line_height")]
    pub line_height: f32,

    /// Extra spacing between glyphs, in design units.
    #[serde(default)]
    pub letter_spacing: f32,

    pub background_color: Color,

    pub text_color: Color,

    pub font_family: String,

    /// Image stretched over the whole surface, painted before text.
    #[serde(default)]
    pub background_image: Option<ImageRef>,

    /// Overlay graphics; paint order is collection order.
    #[serde(default)]
    pub elements: Vec<Element>,
}

fn default_line_height() -> f32 {
    1.2
}

impl Frame {
    /// Create an empty frame with the given colors and font.
    pub fn new(background_color: Color, text_color: Color, font_family: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            font_size: 32.0,
            text_align: TextAlign::Center,
            vertical_align: VerticalAlign::Center,
            bold: false,
            italic: false,
            underline: false,
            line_height: default_line_height(),
            letter_spacing: 0.0,
            background_color,
            text_color,
            font_family: font_family.into(),
            background_image: None,
            elements: vec![],
        }
    }

    /// Merge a partial attribute set into this frame.
    pub fn apply(&mut self, patch: FramePatch) {
        let FramePatch {
            text,
            font_size,
            text_align,
            vertical_align,
            bold,
            italic,
            underline,
            line_height,
            letter_spacing,
            background_color,
            text_color,
            font_family,
            background_image,
            elements,
        } = patch;

        if let Some(v) = text {
            self.text = v;
        }
        if let Some(v) = font_size {
            self.font_size = v.max(1.0);
        }
        if let Some(v) = text_align {
            self.text_align = v;
        }
        if let Some(v) = vertical_align {
            self.vertical_align = v;
        }
        if let Some(v) = bold {
            self.bold = v;
        }
        if let Some(v) = italic {
            self.italic = v;
        }
        if let Some(v) = underline {
            self.underline = v;
        }
        if let Some(v) = line_height {
            self.line_height = v.max(0.1);
        }
        if let Some(v) = letter_spacing {
            self.letter_spacing = v;
        }
        if let Some(v) = background_color {
            self.background_color = v;
        }
        if let Some(v) = text_color {
            self.text_color = v;
        }
        if let Some(v) = font_family {
            self.font_family = v;
        }
        if let Some(v) = background_image {
            self.background_image = v;
        }
        if let Some(v) = elements {
            self.elements = v;
        }
    }

    /// All image references this frame depends on, in paint order.
    pub fn image_refs(&self) -> Vec<&ImageRef> {
        self.background_image
            .iter()
            .chain(self.elements.iter().filter_map(|e| match &e.kind {
                ElementKind::Image { src } => Some(src),
                ElementKind::Shape { .. } => None,
            }))
            .collect()
    }
}

/// Partial frame update. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramePatch {
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub text_align: Option<TextAlign>,
    pub vertical_align: Option<VerticalAlign>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub line_height: Option<f32>,
    pub letter_spacing: Option<f32>,
    pub background_color: Option<Color>,
    pub text_color: Option<Color>,
    pub font_family: Option<String>,
    /// `Some(None)` clears the background image.
    pub background_image: Option<Option<ImageRef>>,
    pub elements: Option<Vec<Element>>,
}

impl FramePatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Basic vector shapes available as overlay elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Arrow,
    Line,
    Triangle,
    Star,
}

/// What an overlay element draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Image { src: ImageRef },
    Shape { shape: ShapeKind },
}

/// Positioned overlay graphic in reference-box coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(flatten)]
    pub kind: ElementKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Fill color for shapes; ignored by images.
    #[serde(default)]
    pub color: Option<Color>,
}

impl Element {
    pub fn shape(id: impl Into<String>, shape: ShapeKind, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            id: id.into(),
            kind: ElementKind::Shape { shape },
            x,
            y,
            width: w,
            height: h,
            color: None,
        }
    }

    pub fn image(id: impl Into<String>, src: ImageRef, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            id: id.into(),
            kind: ElementKind::Image { src },
            x,
            y,
            width: w,
            height: h,
            color: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}
