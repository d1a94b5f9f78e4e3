//! Reduced-scale live preview of the current frame.
//!
//! A repaint is split in three steps so the host can keep editing while
//! images decode:
//!
//! 1. [`PreviewRenderer::begin`] snapshots the current frame and the
//!    editor generation (or declines when the view is hidden or the request
//!    is debounced),
//! 2. [`PreviewJob::load`] awaits every decode for that snapshot,
//! 3. [`PreviewRenderer::commit`] paints, unless the editor moved on in the
//!    meantime, in which case the result is dropped as stale.

use std::sync::Arc;

use slidekit_common::{Debouncer, PreviewDefaults};
use slidekit_project_model::{CarouselEditor, Frame, Margin, OutputSize, Signature};

use crate::decode::{FrameAssets, ImageLoader};
use crate::layout::RenderGeometry;
use crate::pipeline::{paint_frame, PaintSummary, RenderRequest};
use crate::surface::Surface;
use crate::text::FontBook;

/// Result of a repaint attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepaintOutcome {
    Painted(PaintSummary),
    /// The preview view is not visible; nothing was decoded or painted.
    SkippedHidden,
    /// Too soon after the previous repaint; a trailing repaint is pending.
    Debounced,
    /// The editor changed while images were decoding.
    Stale,
    /// No surface could be allocated for the preview size.
    SurfaceUnavailable,
}

/// Snapshot of the state a repaint was started from.
#[derive(Debug, Clone)]
pub struct PreviewJob {
    generation: u64,
    frame_index: usize,
    frame: Frame,
    size: OutputSize,
    margin: Margin,
    signature: Option<Signature>,
    assets: Option<FrameAssets>,
}

impl PreviewJob {
    /// Editor generation this job was taken from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Await every image decode the snapshot needs.
    pub async fn load(mut self, loader: &ImageLoader) -> Self {
        let assets = FrameAssets::load(&self.frame, self.signature.as_ref(), loader).await;
        self.assets = Some(assets);
        self
    }
}

/// Owns the preview surface and decides when to repaint it.
#[derive(Debug)]
pub struct PreviewRenderer {
    scale: f32,
    visible: bool,
    missed_while_hidden: bool,
    debouncer: Debouncer,
    loader: ImageLoader,
    fonts: Arc<FontBook>,
    surface: Option<Surface>,
    painted_generation: Option<u64>,
}

impl PreviewRenderer {
    pub fn new(config: &PreviewDefaults, loader: ImageLoader, fonts: Arc<FontBook>) -> Self {
        Self {
            scale: config.scale,
            visible: true,
            missed_while_hidden: false,
            debouncer: Debouncer::from_millis(config.debounce_ms),
            loader,
            fonts,
            surface: None,
            painted_generation: None,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The last painted preview, if any.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Editor generation shown on the surface.
    pub fn painted_generation(&self) -> Option<u64> {
        self.painted_generation
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the preview view. Returns true when the view became
    /// visible after skipping repaints, i.e. the caller should repaint.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        self.visible = visible;
        if visible && self.missed_while_hidden {
            self.missed_while_hidden = false;
            return true;
        }
        false
    }

    /// Start a repaint for the editor's current frame.
    pub fn begin(&mut self, editor: &CarouselEditor) -> Result<PreviewJob, RepaintOutcome> {
        if !self.visible {
            self.missed_while_hidden = true;
            tracing::debug!(generation = editor.generation(), "Preview hidden, repaint skipped");
            return Err(RepaintOutcome::SkippedHidden);
        }
        let now = self.debouncer.now_ns();
        if !self.debouncer.should_fire(now) {
            return Err(RepaintOutcome::Debounced);
        }
        Ok(self.snapshot(editor))
    }

    /// Start the trailing repaint left behind by debounced requests, if its
    /// quiet interval has elapsed.
    pub fn begin_pending(&mut self, editor: &CarouselEditor) -> Option<PreviewJob> {
        if !self.visible {
            return None;
        }
        let now = self.debouncer.now_ns();
        self.debouncer
            .take_pending(now)
            .then(|| self.snapshot(editor))
    }

    fn snapshot(&self, editor: &CarouselEditor) -> PreviewJob {
        let project = editor.project();
        PreviewJob {
            generation: editor.generation(),
            frame_index: editor.current_index(),
            frame: editor.current_frame().clone(),
            size: project.size,
            margin: project.margin,
            signature: project.signature.clone(),
            assets: None,
        }
    }

    /// Paint a loaded job unless the editor has changed since it began.
    pub fn commit(&mut self, job: PreviewJob, editor: &CarouselEditor) -> RepaintOutcome {
        if job.generation != editor.generation() {
            tracing::debug!(
                job = job.generation,
                current = editor.generation(),
                "Dropping stale preview repaint"
            );
            return RepaintOutcome::Stale;
        }

        let geometry = RenderGeometry::new(job.size, self.scale);
        let (width, height) = geometry.pixel_size();
        let reuse = self
            .surface
            .as_ref()
            .is_some_and(|s| s.width() == width && s.height() == height);
        if !reuse {
            match Surface::new(width, height) {
                Ok(surface) => self.surface = Some(surface),
                Err(e) => {
                    tracing::warn!(error = %e, "Preview surface unavailable");
                    return RepaintOutcome::SurfaceUnavailable;
                }
            }
        }
        let Some(surface) = self.surface.as_mut() else {
            return RepaintOutcome::SurfaceUnavailable;
        };

        let assets = job.assets.unwrap_or_default();
        let request = RenderRequest {
            frame: &job.frame,
            geometry,
            margin: job.margin,
            signature: job.signature.as_ref(),
        };
        let summary = paint_frame(surface, &request, &assets, &self.fonts);
        self.painted_generation = Some(job.generation);
        RepaintOutcome::Painted(summary)
    }

    /// Begin, load and commit in one go.
    pub async fn repaint(&mut self, editor: &CarouselEditor) -> RepaintOutcome {
        let job = match self.begin(editor) {
            Ok(job) => job,
            Err(outcome) => return outcome,
        };
        let job = job.load(&self.loader).await;
        self.commit(job, editor)
    }
}
