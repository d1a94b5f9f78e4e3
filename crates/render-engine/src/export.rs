//! Full-resolution export of single frames and whole carousels.

use std::io::{Cursor, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use slidekit_common::{SlideError, SlideResult};
use slidekit_project_model::Project;

use crate::decode::ImageLoader;
use crate::pipeline::{render_frame, RenderRequest};
use crate::sink::DownloadSink;
use crate::surface::Surface;
use crate::text::FontBook;

/// Encoded image format of exported frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Progress callback for export jobs.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames encoded so far.
    pub frames_done: usize,

    /// Total frames in the job.
    pub total_frames: usize,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of an export job. Frame indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Idle,
    Rendering { frame: usize },
    Encoding { frame: usize },
    Archiving,
    Complete,
    Failed,
}

/// Result of a whole-carousel export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub archive_name: String,
    pub entries: Vec<String>,
    pub archive_bytes: usize,
}

/// Replace characters that cannot appear in a download filename.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "carousel".to_string()
    } else {
        cleaned
    }
}

/// `<name>-slide-<n>.<ext>`, `number` being one-based.
pub fn slide_filename(project_name: &str, number: usize, format: ExportFormat) -> String {
    format!(
        "{}-slide-{number}.{}",
        sanitize_name(project_name),
        format.extension()
    )
}

/// `<name>_frame_<n>.<ext>`, `number` being one-based.
pub fn archive_entry_name(project_name: &str, number: usize, format: ExportFormat) -> String {
    format!(
        "{}_frame_{number}.{}",
        sanitize_name(project_name),
        format.extension()
    )
}

pub fn archive_filename(project_name: &str) -> String {
    format!("{}-carousel.zip", sanitize_name(project_name))
}

/// Zip `entries` in order, deflate-compressed.
pub fn build_archive(entries: &[(String, Vec<u8>)]) -> SlideResult<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, bytes) in entries {
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| SlideError::archive(format!("cannot add '{name}': {e}")))?;
        writer.write_all(bytes)?;
    }
    let cursor = writer
        .finish()
        .map_err(|e| SlideError::archive(format!("cannot finish archive: {e}")))?;
    Ok(cursor.into_inner())
}

/// Renders frames at publish resolution and hands the results to a sink.
pub struct Exporter {
    loader: ImageLoader,
    fonts: Arc<FontBook>,
    format: ExportFormat,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("format", &self.format)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Exporter {
    pub fn new(loader: ImageLoader, fonts: Arc<FontBook>) -> Self {
        Self {
            loader,
            fonts,
            format: ExportFormat::default(),
            progress: None,
        }
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    fn report(&self, stage: ExportStage, frames_done: usize, total_frames: usize) {
        tracing::debug!(?stage, frames_done, total_frames, "Export stage");
        if let Some(cb) = &self.progress {
            let progress = if total_frames == 0 {
                0.0
            } else {
                frames_done as f64 / total_frames as f64
            };
            cb(ExportProgress {
                progress: if stage == ExportStage::Complete { 1.0 } else { progress },
                frames_done,
                total_frames,
                stage,
            });
        }
    }

    /// Render frame `index` at scale 1.0 and encode it. Every image decode
    /// for the frame settles before the surface is encoded.
    pub async fn render_frame_bytes(&self, project: &Project, index: usize) -> SlideResult<Vec<u8>> {
        let surface = self.render_surface(project, index).await?;
        self.encode(surface).await
    }

    async fn render_surface(&self, project: &Project, index: usize) -> SlideResult<Surface> {
        let request = RenderRequest::for_project(project, index, 1.0)?;
        let (surface, summary) = render_frame(&request, &self.loader, &self.fonts).await?;
        if summary.elements_skipped > 0 {
            tracing::info!(
                frame = index + 1,
                skipped = summary.elements_skipped,
                "Frame exported without some image elements"
            );
        }
        Ok(surface)
    }

    async fn encode(&self, surface: Surface) -> SlideResult<Vec<u8>> {
        let format = self.format;
        tokio::task::spawn_blocking(move || surface.encode(format))
            .await
            .map_err(|e| SlideError::render(format!("encode task failed: {e}")))?
    }

    /// Render then encode one frame, reporting each stage as it starts.
    /// `done` counts frames already finished in this job.
    async fn render_tracked(
        &self,
        project: &Project,
        index: usize,
        done: usize,
        total: usize,
    ) -> SlideResult<Vec<u8>> {
        self.report(ExportStage::Rendering { frame: index }, done, total);
        let surface = self.render_surface(project, index).await?;
        self.report(ExportStage::Encoding { frame: index }, done, total);
        self.encode(surface).await
    }

    /// Export one frame as `<name>-slide-<n>.<ext>`. Returns the filename
    /// handed to the sink.
    pub async fn export_frame(
        &self,
        project: &Project,
        index: usize,
        sink: &dyn DownloadSink,
    ) -> SlideResult<String> {
        tracing::info!(project = %project.name, frame = index + 1, format = ?self.format, "Starting frame export");
        self.report(ExportStage::Idle, 0, 1);

        let result = async {
            let bytes = self.render_tracked(project, index, 0, 1).await?;
            let filename = slide_filename(&project.name, index + 1, self.format);
            sink.deliver(&filename, &bytes)?;
            Ok(filename)
        }
        .await;

        match &result {
            Ok(filename) => {
                self.report(ExportStage::Complete, 1, 1);
                tracing::info!(%filename, "Frame exported");
            }
            Err(e) => {
                self.report(ExportStage::Failed, 0, 1);
                tracing::error!(error = %e, "Frame export failed");
            }
        }
        result
    }

    /// Export every frame, in project order, as one zip archive. Nothing is
    /// delivered unless every frame encodes and the archive is written.
    pub async fn export_all(&self, project: &Project, sink: &dyn DownloadSink) -> SlideResult<ExportSummary> {
        let total = project.frame_count();
        tracing::info!(project = %project.name, frames = total, format = ?self.format, "Starting carousel export");
        self.report(ExportStage::Idle, 0, total);

        let result = self.build_and_deliver(project, sink, total).await;
        match &result {
            Ok(summary) => {
                self.report(ExportStage::Complete, total, total);
                tracing::info!(
                    archive = %summary.archive_name,
                    entries = summary.entries.len(),
                    bytes = summary.archive_bytes,
                    "Carousel exported"
                );
            }
            Err(e) => {
                self.report(ExportStage::Failed, 0, total);
                tracing::error!(error = %e, "Carousel export failed");
            }
        }
        result
    }

    async fn build_and_deliver(
        &self,
        project: &Project,
        sink: &dyn DownloadSink,
        total: usize,
    ) -> SlideResult<ExportSummary> {
        if total == 0 {
            return Err(SlideError::validation("project has no frames to export"));
        }

        let mut entries = Vec::with_capacity(total);
        for index in 0..total {
            let bytes = self.render_tracked(project, index, index, total).await?;
            entries.push((archive_entry_name(&project.name, index + 1, self.format), bytes));
        }

        self.report(ExportStage::Archiving, total, total);
        let names: Vec<String> = entries.iter().map(|(name, _)| name.clone()).collect();
        let archive = tokio::task::spawn_blocking(move || build_archive(&entries))
            .await
            .map_err(|e| SlideError::archive(format!("archive task failed: {e}")))??;

        let archive_name = archive_filename(&project.name);
        sink.deliver(&archive_name, &archive)?;
        Ok(ExportSummary {
            archive_name,
            entries: names,
            archive_bytes: archive.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use slidekit_project_model::OutputSize;
    use std::sync::Mutex;

    fn exporter() -> Exporter {
        Exporter::new(
            ImageLoader::local(std::env::temp_dir()),
            Arc::new(FontBook::fallback_only()),
        )
    }

    #[test]
    fn test_filenames() {
        assert_eq!(slide_filename("Launch", 2, ExportFormat::Png), "Launch-slide-2.png");
        assert_eq!(
            archive_entry_name("Launch", 10, ExportFormat::Jpeg),
            "Launch_frame_10.jpg"
        );
        assert_eq!(archive_filename("Launch"), "Launch-carousel.zip");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_name("  Tips: 2024 "), "Tips_ 2024");
        assert_eq!(sanitize_name("tab\there"), "tab_here");
        assert_eq!(sanitize_name("   "), "carousel");
        assert_eq!(sanitize_name(".."), "carousel");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("PNG"), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::parse("jpg"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::parse("gif"), None);
        assert_eq!(ExportFormat::default().extension(), "png");
    }

    #[test]
    fn test_build_archive_empty_is_valid_zip() {
        let bytes = build_archive(&[]).unwrap();
        // end-of-central-directory signature
        assert_eq!(&bytes[..4], &[0x50, 0x4b, 0x05, 0x06]);
    }

    #[tokio::test]
    async fn test_single_frame_export_delivers_png() {
        let mut project = Project::new("Deck", OutputSize::Landscape);
        project.frames[0].text = "One".into();
        let sink = MemorySink::new();

        let name = exporter().export_frame(&project, 0, &sink).await.unwrap();
        assert_eq!(name, "Deck-slide-1.png");

        let delivered = sink.deliveries();
        assert_eq!(delivered.len(), 1);
        let image = image::load_from_memory(&delivered[0].1).unwrap();
        assert_eq!((image.width(), image.height()), (1080, 566));
    }

    #[tokio::test]
    async fn test_stage_sequence() {
        let mut project = Project::new("Deck", OutputSize::Square);
        project.frames.push(project.defaults.new_frame());
        let stages = Arc::new(Mutex::new(vec![]));
        let seen = stages.clone();
        let exporter = exporter().with_progress(Box::new(move |p: ExportProgress| {
            seen.lock().unwrap().push(p.stage)
        }));

        exporter.export_all(&project, &MemorySink::new()).await.unwrap();
        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                ExportStage::Idle,
                ExportStage::Rendering { frame: 0 },
                ExportStage::Encoding { frame: 0 },
                ExportStage::Rendering { frame: 1 },
                ExportStage::Encoding { frame: 1 },
                ExportStage::Archiving,
                ExportStage::Complete,
            ]
        );
    }

    #[tokio::test]
    async fn test_encoding_is_reported_before_the_frame_counts_as_done() {
        let mut project = Project::new("Deck", OutputSize::Square);
        project.frames.push(project.defaults.new_frame());
        let events = Arc::new(Mutex::new(vec![]));
        let seen = events.clone();
        let exporter = exporter().with_progress(Box::new(move |p: ExportProgress| {
            seen.lock().unwrap().push((p.stage, p.frames_done))
        }));

        exporter.export_all(&project, &MemorySink::new()).await.unwrap();
        let events = events.lock().unwrap();
        assert!(events.contains(&(ExportStage::Encoding { frame: 0 }, 0)));
        assert!(events.contains(&(ExportStage::Encoding { frame: 1 }, 1)));
        assert!(events.contains(&(ExportStage::Rendering { frame: 1 }, 1)));
        assert!(events.contains(&(ExportStage::Archiving, 2)));
    }

    #[tokio::test]
    async fn test_single_frame_progress_stays_below_complete() {
        let project = Project::new("Deck", OutputSize::Square);
        let events = Arc::new(Mutex::new(vec![]));
        let seen = events.clone();
        let exporter = exporter().with_progress(Box::new(move |p: ExportProgress| {
            seen.lock().unwrap().push((p.stage, p.progress))
        }));

        exporter.export_frame(&project, 0, &MemorySink::new()).await.unwrap();
        let events = events.lock().unwrap();
        assert_eq!(events.last(), Some(&(ExportStage::Complete, 1.0)));
        for (stage, progress) in events.iter().filter(|(s, _)| *s != ExportStage::Complete) {
            assert!(*progress < 1.0, "{stage:?} reported {progress}");
        }
    }

    #[tokio::test]
    async fn test_out_of_range_frame_fails_without_delivery() {
        let project = Project::new("Deck", OutputSize::Square);
        let sink = MemorySink::new();
        let stages = Arc::new(Mutex::new(vec![]));
        let seen = stages.clone();
        let exporter = exporter().with_progress(Box::new(move |p: ExportProgress| {
            seen.lock().unwrap().push(p.stage)
        }));

        let err = exporter.export_frame(&project, 5, &sink).await.unwrap_err();
        assert!(matches!(err, SlideError::Validation { .. }));
        assert!(sink.deliveries().is_empty());
        assert_eq!(stages.lock().unwrap().last(), Some(&ExportStage::Failed));
    }
}
