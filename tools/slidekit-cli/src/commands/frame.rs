//! Frame editing commands.

use clap::Subcommand;
use slidekit_project_model::{
    CarouselEditor, Color, FramePatch, ImageRef, TextAlign, VerticalAlign,
};

use super::{frame_index, Context};

#[derive(Subcommand)]
pub enum FrameAction {
    /// Append a frame built from the project defaults
    Add {
        /// Project id
        id: String,
    },

    /// Remove a frame (the last remaining frame cannot be removed)
    Remove {
        /// Project id
        id: String,

        /// One-based frame number
        frame: usize,
    },

    /// Change properties of one frame
    Update {
        /// Project id
        id: String,

        /// One-based frame number
        frame: usize,

        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        font_size: Option<f32>,

        /// Font family, e.g. "Inter"
        #[arg(long)]
        font: Option<String>,

        /// Horizontal alignment: start, center, end
        #[arg(long)]
        align: Option<String>,

        /// Vertical alignment: top, center, bottom
        #[arg(long)]
        valign: Option<String>,

        #[arg(long)]
        bold: Option<bool>,

        #[arg(long)]
        italic: Option<bool>,

        #[arg(long)]
        underline: Option<bool>,

        #[arg(long)]
        line_height: Option<f32>,

        #[arg(long)]
        letter_spacing: Option<f32>,

        /// Background color as #rrggbb
        #[arg(long)]
        background: Option<String>,

        /// Text color as #rrggbb
        #[arg(long)]
        color: Option<String>,

        /// Background image path or data URI ("none" clears it)
        #[arg(long)]
        image: Option<String>,
    },

    /// Show one frame in detail
    Select {
        /// Project id
        id: String,

        /// One-based frame number
        frame: usize,
    },
}

fn parse_align(value: &str) -> anyhow::Result<TextAlign> {
    match value {
        "start" | "left" => Ok(TextAlign::Start),
        "center" => Ok(TextAlign::Center),
        "end" | "right" => Ok(TextAlign::End),
        _ => anyhow::bail!("Unknown alignment: {value}. Use: start, center, end"),
    }
}

fn parse_valign(value: &str) -> anyhow::Result<VerticalAlign> {
    match value {
        "top" => Ok(VerticalAlign::Top),
        "center" | "middle" => Ok(VerticalAlign::Center),
        "bottom" => Ok(VerticalAlign::Bottom),
        _ => anyhow::bail!("Unknown vertical alignment: {value}. Use: top, center, bottom"),
    }
}

fn parse_color(value: &str) -> anyhow::Result<Color> {
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid color '{value}': {e}"))
}

fn open(ctx: &Context, id: &str) -> anyhow::Result<CarouselEditor> {
    CarouselEditor::new(ctx.load(id)?).map_err(|e| anyhow::anyhow!("Invalid project: {e}"))
}

fn save(ctx: &Context, editor: &mut CarouselEditor) -> anyhow::Result<()> {
    editor
        .save(&ctx.store)
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))
}

pub fn run(ctx: &Context, action: FrameAction) -> anyhow::Result<()> {
    match action {
        FrameAction::Add { id } => {
            let mut editor = open(ctx, &id)?;
            let index = editor.add_frame();
            save(ctx, &mut editor)?;
            println!(
                "Added frame {} ({} frame(s) total)",
                index + 1,
                editor.frame_count()
            );
        }
        FrameAction::Remove { id, frame } => {
            let mut editor = open(ctx, &id)?;
            let index = frame_index(editor.project(), frame)?;
            editor
                .remove_frame(index)
                .map_err(|e| anyhow::anyhow!("Cannot remove frame {frame}: {e}"))?;
            save(ctx, &mut editor)?;
            println!(
                "Removed frame {frame} ({} frame(s) left)",
                editor.frame_count()
            );
        }
        FrameAction::Update {
            id,
            frame,
            text,
            font_size,
            font,
            align,
            valign,
            bold,
            italic,
            underline,
            line_height,
            letter_spacing,
            background,
            color,
            image,
        } => {
            let mut editor = open(ctx, &id)?;
            let index = frame_index(editor.project(), frame)?;

            let patch = FramePatch {
                // the shell delivers "\n" literally
                text: text.map(|t| t.replace("\\n", "\n")),
                font_size,
                font_family: font,
                text_align: align.as_deref().map(parse_align).transpose()?,
                vertical_align: valign.as_deref().map(parse_valign).transpose()?,
                bold,
                italic,
                underline,
                line_height,
                letter_spacing,
                background_color: background.as_deref().map(parse_color).transpose()?,
                text_color: color.as_deref().map(parse_color).transpose()?,
                background_image: image.map(|src| match src.as_str() {
                    "" | "none" => None,
                    _ => Some(ImageRef::new(src)),
                }),
                elements: None,
            };
            if patch.is_empty() {
                println!("Nothing to update.");
                return Ok(());
            }

            editor
                .select_frame(index)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            editor.update_current_frame(patch);
            save(ctx, &mut editor)?;
            println!("Updated frame {frame}");
        }
        FrameAction::Select { id, frame } => {
            let mut editor = open(ctx, &id)?;
            let index = frame_index(editor.project(), frame)?;
            editor
                .select_frame(index)
                .map_err(|e| anyhow::anyhow!("{e}"))?;

            let f = editor.current_frame();
            println!("Frame {} of {}:", frame, editor.frame_count());
            println!("  Text: {:?}", f.text);
            println!(
                "  Font: {} {}px{}{}{}",
                f.font_family,
                f.font_size,
                if f.bold { " bold" } else { "" },
                if f.italic { " italic" } else { "" },
                if f.underline { " underline" } else { "" }
            );
            println!("  Align: {:?} / {:?}", f.text_align, f.vertical_align);
            println!(
                "  Line height: {}, letter spacing: {}",
                f.line_height, f.letter_spacing
            );
            println!("  Colors: text {}, background {}", f.text_color, f.background_color);
            match &f.background_image {
                Some(src) => println!("  Background image: {src}"),
                None => println!("  Background image: none"),
            }
            println!("  Elements: {}", f.elements.len());
            for element in &f.elements {
                println!(
                    "    - {} {:?} at ({}, {}) {}x{}",
                    element.id, element.kind, element.x, element.y, element.width, element.height
                );
            }
        }
    }

    Ok(())
}
