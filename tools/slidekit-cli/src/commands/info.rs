//! Show project information.

use super::Context;

pub fn run(ctx: &Context, id: String, json: bool) -> anyhow::Result<()> {
    let p = ctx.load(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&p)?);
        return Ok(());
    }

    let (width, height) = p.size.dimensions();
    println!("Project: {}", p.name);
    println!("  ID: {}", p.id);
    println!("  Created: {}", p.created_at);
    println!("  Modified: {}", p.modified_at);
    println!("  Size: {:?} ({width}x{height})", p.size);
    println!();

    println!("Layout:");
    if p.margin.enabled {
        println!(
            "  Margins: {} x {} (horizontal x vertical)",
            p.margin.horizontal, p.margin.vertical
        );
    } else {
        println!("  Margins: off");
    }
    match &p.signature {
        Some(sig) => println!("  Signature: {:?}, size {}", sig.position, sig.size),
        None => println!("  Signature: none"),
    }
    println!();

    println!("Frames ({}):", p.frame_count());
    for (i, frame) in p.frames.iter().enumerate() {
        let preview: String = frame.text.chars().take(40).collect();
        let ellipsis = if frame.text.chars().count() > 40 { "…" } else { "" };
        println!(
            "  {:>2}. \"{preview}{ellipsis}\" ({}px {}, {} element(s){})",
            i + 1,
            frame.font_size,
            frame.font_family,
            frame.elements.len(),
            if frame.background_image.is_some() {
                ", background image"
            } else {
                ""
            }
        );
    }

    Ok(())
}
