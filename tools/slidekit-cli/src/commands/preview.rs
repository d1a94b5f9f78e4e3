//! Render the reduced-scale preview of one frame.

use std::path::PathBuf;

use slidekit_project_model::CarouselEditor;
use slidekit_render_engine::{ExportFormat, PreviewRenderer, RepaintOutcome};

use super::{frame_index, Context};

pub async fn run(
    ctx: &Context,
    id: String,
    frame: usize,
    output: Option<PathBuf>,
    scale: Option<f32>,
) -> anyhow::Result<()> {
    let project = ctx.load(&id)?;
    let index = frame_index(&project, frame)?;
    let mut editor =
        CarouselEditor::new(project).map_err(|e| anyhow::anyhow!("Invalid project: {e}"))?;
    editor
        .select_frame(index)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut settings = ctx.config.preview.clone();
    if let Some(scale) = scale {
        if !(scale > 0.0 && scale <= 1.0) {
            anyhow::bail!("Preview scale must be in (0, 1], got {scale}");
        }
        settings.scale = scale;
    }

    let mut renderer = PreviewRenderer::new(&settings, ctx.loader(), ctx.fonts());
    let summary = match renderer.repaint(&editor).await {
        RepaintOutcome::Painted(summary) => summary,
        other => anyhow::bail!("Preview was not painted: {other:?}"),
    };
    let surface = renderer
        .surface()
        .ok_or_else(|| anyhow::anyhow!("Preview surface missing after paint"))?;

    let output = output.unwrap_or_else(|| PathBuf::from(format!("{id}-preview-{frame}.png")));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, surface.encode(ExportFormat::Png)?)?;

    println!("Preview written: {}", output.display());
    println!(
        "  {}x{} @ {:.2}x, {} line(s) painted, {} clipped",
        surface.width(),
        surface.height(),
        renderer.scale(),
        summary.lines_painted,
        summary.lines_clipped
    );
    if summary.elements_skipped > 0 {
        println!(
            "  {} image element(s) could not be decoded",
            summary.elements_skipped
        );
    }

    Ok(())
}
