//! Create a new SlideKit project.

use slidekit_project_model::{CarouselEditor, OutputSize};

use super::Context;

pub fn run(ctx: &Context, name: String, size: String) -> anyhow::Result<()> {
    let size = OutputSize::parse(&size).ok_or_else(|| {
        anyhow::anyhow!("Unknown size: {size}. Use: square, portrait, story, landscape")
    })?;

    let mut editor = CarouselEditor::create(name, size);
    editor
        .save(&ctx.store)
        .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;

    let project = editor.project();
    let (width, height) = size.dimensions();
    println!("Project created successfully:");
    println!("  Name: {}", project.name);
    println!("  ID: {}", project.id);
    println!("  Size: {:?} ({width}x{height})", size);
    println!("  Store: {}", ctx.store.root().display());

    Ok(())
}
