//! Validate a SlideKit project.

use super::Context;

pub async fn run(ctx: &Context, id: String) -> anyhow::Result<()> {
    println!("Validating project: {id}");

    let project = ctx.load(&id)?;
    println!("  Name: {}", project.name);
    println!("  Version: {}", project.version);
    println!("  Frames: {}", project.frame_count());

    let mut errors = vec![];
    if let Err(e) = project.validate() {
        errors.push(e.to_string());
    }

    // Check image references
    let loader = ctx.loader();
    for (label, src) in project.image_refs() {
        if let Err(e) = loader.decode(src).await {
            errors.push(format!("{label}: {e}"));
        }
    }

    if errors.is_empty() {
        println!("  Images: All resolvable");
        println!("\nProject is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. Missing images will be left out of exports.",
            errors.len()
        );
    }

    Ok(())
}
