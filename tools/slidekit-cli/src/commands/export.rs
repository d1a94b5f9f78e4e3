//! Export frames at publish resolution.

use std::path::PathBuf;

use slidekit_render_engine::{DirectorySink, ExportFormat, ExportProgress, ExportStage, Exporter};

use super::{frame_index, Context};

pub async fn run(
    ctx: &Context,
    id: String,
    frame: Option<usize>,
    output: Option<PathBuf>,
    format: Option<String>,
) -> anyhow::Result<()> {
    let project = ctx.load(&id)?;

    let format = format.unwrap_or_else(|| ctx.config.export.format.clone());
    let export_format = ExportFormat::parse(&format)
        .ok_or_else(|| anyhow::anyhow!("Unknown format: {format}. Use: png, jpeg"))?;

    let output_dir = output
        .or_else(|| ctx.config.export.downloads_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let sink = DirectorySink::new(&output_dir);

    let (width, height) = project.size.dimensions();
    println!("Exporting project: {}", project.name);
    println!("  Output: {}", output_dir.display());
    println!("  Format: {:?}", export_format);
    println!("  Resolution: {width}x{height}");

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p: ExportProgress| match p.stage {
        ExportStage::Rendering { frame } => print!(
            "\r  Rendering frame {} ({}/{})  ",
            frame + 1,
            p.frames_done + 1,
            p.total_frames
        ),
        ExportStage::Archiving => print!("\r  Archiving {} frame(s)  ", p.total_frames),
        _ => {}
    });
    let exporter = Exporter::new(ctx.loader(), ctx.fonts())
        .with_format(export_format)
        .with_progress(progress_cb);

    match frame {
        Some(number) => {
            let index = frame_index(&project, number)?;
            let filename = exporter
                .export_frame(&project, index, &sink)
                .await
                .map_err(|e| anyhow::anyhow!("\nExport failed: {e}"))?;
            println!("\nExport complete: {}", sink.path_for(&filename).display());
        }
        None => {
            let summary = exporter
                .export_all(&project, &sink)
                .await
                .map_err(|e| anyhow::anyhow!("\nExport failed: {e}"))?;
            println!(
                "\nExport complete: {} ({} frame(s), {} bytes)",
                sink.path_for(&summary.archive_name).display(),
                summary.entries.len(),
                summary.archive_bytes
            );
        }
    }

    Ok(())
}
