//! Project metadata and shared settings.
//!
//! A project is the top-level container that ties together the ordered
//! frames, the output dimensions, and the settings shared by every frame
//! (defaults, margins, signature). It is persisted as a single record.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use slidekit_common::SlideError;

use crate::color::Color;
use crate::frame::{Frame, ImageRef};

/// Top-level project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Schema version.
    pub version: String,

    /// Unique project identifier.
    pub id: String,

    /// Human-readable project name; also the prefix of exported filenames.
    pub name: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Target output dimensions.
    pub size: OutputSize,

    /// Styling applied to newly created frames.
    #[serde(default)]
    pub defaults: FrameDefaults,

    /// Text-safe inset settings.
    #[serde(default)]
    pub margin: Margin,

    /// Optional badge overlaid on every frame.
    #[serde(default)]
    pub signature: Option<Signature>,

    /// Ordered, non-empty slide sequence.
    pub frames: Vec<Frame>,
}

/// Supported output dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputSize {
    /// 1080×1080.
    #[default]
    Square,
    /// 1080×1350 (4:5).
    Portrait,
    /// 1080×1920 (9:16).
    Story,
    /// 1080×566 (1.91:1).
    Landscape,
}

impl OutputSize {
    pub const ALL: [OutputSize; 4] = [
        OutputSize::Square,
        OutputSize::Portrait,
        OutputSize::Story,
        OutputSize::Landscape,
    ];

    /// Width and height in pixels at publish resolution.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            OutputSize::Square => (1080, 1080),
            OutputSize::Portrait => (1080, 1350),
            OutputSize::Story => (1080, 1920),
            OutputSize::Landscape => (1080, 566),
        }
    }

    pub fn width(self) -> u32 {
        self.dimensions().0
    }

    pub fn height(self) -> u32 {
        self.dimensions().1
    }

    /// Parse a CLI-style name (`square`, `portrait`, `story`, `landscape`)
    /// or a `WIDTHxHEIGHT` pair matching one of the supported sizes.
    pub fn parse(input: &str) -> Option<Self> {
        let lower = input.trim().to_ascii_lowercase();
        match lower.as_str() {
            "square" => return Some(OutputSize::Square),
            "portrait" => return Some(OutputSize::Portrait),
            "story" => return Some(OutputSize::Story),
            "landscape" => return Some(OutputSize::Landscape),
            _ => {}
        }
        let (w, h) = lower.split_once('x')?;
        let dims = (w.parse().ok()?, h.parse().ok()?);
        Self::ALL.into_iter().find(|s| s.dimensions() == dims)
    }
}

/// Styling seeded into every new frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameDefaults {
    pub background_color: Color,
    pub text_color: Color,
    pub font_family: String,
}

impl Default for FrameDefaults {
    fn default() -> Self {
        Self {
            background_color: Color::WHITE,
            text_color: Color::BLACK,
            font_family: "Inter".to_string(),
        }
    }
}

impl FrameDefaults {
    /// A fresh frame carrying these defaults.
    pub fn new_frame(&self) -> Frame {
        Frame::new(
            self.background_color,
            self.text_color,
            self.font_family.clone(),
        )
    }
}

/// Text-safe inset, in design units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub enabled: bool,
    pub horizontal: f32,
    pub vertical: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            enabled: false,
            horizontal: 60.0,
            vertical: 60.0,
        }
    }
}

impl Margin {
    /// Inset used on each side when margins are turned off.
    pub const DISABLED_INSET: f32 = 20.0;

    /// Horizontal and vertical inset actually in effect, in design units.
    pub fn effective(&self) -> (f32, f32) {
        if self.enabled {
            (self.horizontal.max(0.0), self.vertical.max(0.0))
        } else {
            (Self::DISABLED_INSET, Self::DISABLED_INSET)
        }
    }
}

/// Anchor for the signature badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignaturePosition {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl SignaturePosition {
    pub const ALL: [SignaturePosition; 6] = [
        SignaturePosition::TopLeft,
        SignaturePosition::TopCenter,
        SignaturePosition::TopRight,
        SignaturePosition::BottomLeft,
        SignaturePosition::BottomCenter,
        SignaturePosition::BottomRight,
    ];

    pub fn is_top(self) -> bool {
        matches!(
            self,
            SignaturePosition::TopLeft | SignaturePosition::TopCenter | SignaturePosition::TopRight
        )
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "top_left" => Some(SignaturePosition::TopLeft),
            "top_center" => Some(SignaturePosition::TopCenter),
            "top_right" => Some(SignaturePosition::TopRight),
            "bottom_left" => Some(SignaturePosition::BottomLeft),
            "bottom_center" => Some(SignaturePosition::BottomCenter),
            "bottom_right" => Some(SignaturePosition::BottomRight),
            _ => None,
        }
    }
}

/// Badge image overlaid identically on every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub image: ImageRef,
    /// Badge width in design units; height follows the image aspect.
    pub size: f32,
    #[serde(default)]
    pub position: SignaturePosition,
}

impl Project {
    /// Create a new project holding one frame seeded from the defaults.
    pub fn new(name: impl Into<String>, size: OutputSize) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        let defaults = FrameDefaults::default();
        Self {
            version: "1.0".to_string(),
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: now.clone(),
            modified_at: now,
            size,
            frames: vec![defaults.new_frame()],
            defaults,
            margin: Margin::default(),
            signature: None,
        }
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Refresh the modification timestamp.
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }

    /// Check structural invariants of a record read from storage.
    pub fn validate(&self) -> Result<(), ProjectError> {
        if self.frames.is_empty() {
            return Err(ProjectError::ValidationError {
                message: format!("project '{}' has no frames", self.id),
            });
        }
        if self.name.trim().is_empty() {
            return Err(ProjectError::ValidationError {
                message: format!("project '{}' has an empty name", self.id),
            });
        }
        if let Some(sig) = &self.signature {
            if !(sig.size > 0.0) {
                return Err(ProjectError::ValidationError {
                    message: format!("signature size must be positive, got {}", sig.size),
                });
            }
        }
        Ok(())
    }

    /// Every image reference used by the project, with a label for reports.
    pub fn image_refs(&self) -> Vec<(String, &ImageRef)> {
        let mut refs = vec![];
        for (i, frame) in self.frames.iter().enumerate() {
            for r in frame.image_refs() {
                refs.push((format!("frame {}", i + 1), r));
            }
        }
        if let Some(sig) = &self.signature {
            refs.push(("signature".to_string(), &sig.image));
        }
        refs
    }
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },

    #[error("A project must keep at least one frame")]
    LastFrame,

    #[error("Frame index {index} out of range (project has {len} frames)")]
    FrameIndexOutOfRange { index: usize, len: usize },

    #[error("Project not found: {id}")]
    NotFound { id: String },
}

impl From<ProjectError> for SlideError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::LastFrame
            | ProjectError::FrameIndexOutOfRange { .. }
            | ProjectError::ValidationError { .. } => SlideError::validation(err.to_string()),
            ProjectError::IoError { source, .. } => SlideError::Io(source),
            ProjectError::ParseError { source, .. } => SlideError::Json(source),
            ProjectError::NotFound { .. } => SlideError::store(err.to_string()),
        }
    }
}
