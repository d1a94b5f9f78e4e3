//! Font resolution, text measurement and glyph painting.
//!
//! Fonts are looked up by family name in a font directory. When nothing
//! matches, a fixed-advance block face keeps layout well-defined, so a
//! missing font degrades the look of a slide but never its structure.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusttype::{point, Font, Scale};
use slidekit_project_model::{Color, TextAlign};

use crate::layout::Rect;
use crate::surface::Surface;

/// Advance of every glyph in the fallback face, in ems.
const FALLBACK_ADVANCE_EM: f32 = 0.6;

/// A resolved face for one (family, bold, italic) combination.
#[derive(Clone)]
pub enum Typeface {
    Outline(Arc<Font<'static>>),
    /// Deterministic block glyphs used when no font file resolves.
    Fallback,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::Outline(_) => f.write_str("Typeface::Outline"),
            Typeface::Fallback => f.write_str("Typeface::Fallback"),
        }
    }
}

impl Typeface {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Typeface::Fallback)
    }

    /// Rendered width of `text` at `px`, including letter spacing between
    /// glyphs (not after the last one).
    pub fn measure(&self, text: &str, px: f32, letter_spacing: f32) -> f32 {
        let count = text.chars().count();
        if count == 0 {
            return 0.0;
        }
        let spacing = letter_spacing * (count - 1) as f32;
        match self {
            Typeface::Fallback => count as f32 * px * FALLBACK_ADVANCE_EM + spacing,
            Typeface::Outline(font) => {
                let scale = Scale::uniform(px);
                let mut width = 0.0;
                let mut prev = None;
                for ch in text.chars() {
                    let glyph = font.glyph(ch);
                    if let Some(prev_id) = prev {
                        width += font.pair_kerning(scale, prev_id, glyph.id());
                    }
                    prev = Some(glyph.id());
                    width += glyph.scaled(scale).h_metrics().advance_width;
                }
                width + spacing
            }
        }
    }

    /// Paint one line of text. `x` is interpreted according to `align`
    /// (left edge, centre or right edge of the line); `baseline` is the
    /// baseline y.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        surface: &mut Surface,
        text: &str,
        x: f32,
        baseline: f32,
        align: TextAlign,
        px: f32,
        letter_spacing: f32,
        color: Color,
        underline: bool,
    ) {
        let width = self.measure(text, px, letter_spacing);
        let start = match align {
            TextAlign::Start => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::End => x - width,
        };

        match self {
            Typeface::Fallback => {
                let advance = px * FALLBACK_ADVANCE_EM;
                let mut caret = start;
                for ch in text.chars() {
                    if !ch.is_whitespace() {
                        let glyph = Rect::new(
                            caret + advance * 0.1,
                            baseline - px * 0.7,
                            advance * 0.8,
                            px * 0.7,
                        );
                        surface.fill_rect(&glyph, color);
                    }
                    caret += advance + letter_spacing;
                }
            }
            Typeface::Outline(font) => {
                let scale = Scale::uniform(px);
                let mut caret = start;
                let mut prev = None;
                for ch in text.chars() {
                    let glyph = font.glyph(ch);
                    if let Some(prev_id) = prev {
                        caret += font.pair_kerning(scale, prev_id, glyph.id());
                    }
                    prev = Some(glyph.id());

                    let scaled = glyph.scaled(scale);
                    let advance = scaled.h_metrics().advance_width;
                    let positioned = scaled.positioned(point(caret, baseline));
                    if let Some(bb) = positioned.pixel_bounding_box() {
                        positioned.draw(|gx, gy, coverage| {
                            surface.blend_pixel(
                                bb.min.x + gx as i32,
                                bb.min.y + gy as i32,
                                color,
                                coverage,
                            );
                        });
                    }
                    caret += advance + letter_spacing;
                }
            }
        }

        if underline && width > 0.0 {
            let thickness = (px / 16.0).max(1.0);
            let offset = (px * 0.1).max(1.0);
            surface.fill_rect(&Rect::new(start, baseline + offset, width, thickness), color);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    bold: bool,
    italic: bool,
}

/// Resolves family names to faces and caches them.
#[derive(Debug, Default)]
pub struct FontBook {
    /// Lower-cased file stem → font file.
    files: HashMap<String, PathBuf>,
    cache: Mutex<HashMap<FaceKey, Typeface>>,
}

impl FontBook {
    /// A book with no font files; every lookup yields the fallback face.
    pub fn fallback_only() -> Self {
        Self::default()
    }

    /// Index every `.ttf` / `.otf` file in `dir`. A missing directory is
    /// not an error; it just yields an empty book.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut files = HashMap::new();
        match std::fs::read_dir(dir) {
            Ok(entries) => {
                for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
                    let is_font = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
                    if !is_font {
                        continue;
                    }
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        files.insert(normalize(stem), path.clone());
                    }
                }
                tracing::debug!(dir = %dir.display(), fonts = files.len(), "Indexed font directory");
            }
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "Font directory unavailable");
            }
        }
        Self {
            files,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of indexed font files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Face for a family and style. Bold/italic fall back to the regular
    /// file of the same family, then to the block face.
    pub fn resolve(&self, family: &str, bold: bool, italic: bool) -> Typeface {
        let family = primary_family(family);
        let key = FaceKey {
            family: family.clone(),
            bold,
            italic,
        };

        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(face) = cache.get(&key) {
            return face.clone();
        }

        let face = self.load_face(&family, bold, italic);
        cache.insert(key, face.clone());
        face
    }

    fn load_face(&self, family: &str, bold: bool, italic: bool) -> Typeface {
        let suffixes: &[&str] = match (bold, italic) {
            (true, true) => &["bolditalic", "bold", "italic", "regular", ""],
            (true, false) => &["bold", "regular", ""],
            (false, true) => &["italic", "regular", ""],
            (false, false) => &["regular", ""],
        };

        for suffix in suffixes {
            let name = format!("{}{}", normalize(family), suffix);
            let Some(path) = self.files.get(&name) else {
                continue;
            };
            match std::fs::read(path).ok().and_then(Font::try_from_vec) {
                Some(font) => {
                    tracing::debug!(family, bold, italic, file = %path.display(), "Loaded font");
                    return Typeface::Outline(Arc::new(font));
                }
                None => {
                    tracing::warn!(file = %path.display(), "Unreadable font file, skipping");
                }
            }
        }

        tracing::debug!(family, bold, italic, "No font file matched, using fallback face");
        Typeface::Fallback
    }
}

/// First entry of a CSS-style family list, unquoted.
fn primary_family(family: &str) -> String {
    family
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

/// Lower-case and drop separators so `Open Sans-Bold` matches
/// `OpenSans-Bold.ttf` and `opensans_bold.otf`.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}
