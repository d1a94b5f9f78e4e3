use std::io::{Cursor, Read};
use std::sync::Arc;

use base64::Engine as _;
use slidekit_project_model::{Color, ImageRef, OutputSize, Project, Signature, SignaturePosition};
use slidekit_render_engine::{DirectorySink, ExportFormat, Exporter, FontBook, ImageLoader, MemorySink};

const BLUE: Color = Color::rgb(0, 0, 200);
const RED: Color = Color::rgb(220, 0, 0);

fn exporter() -> Exporter {
    Exporter::new(
        ImageLoader::local(std::env::temp_dir()),
        Arc::new(FontBook::fallback_only()),
    )
}

fn solid_png_uri(w: u32, h: u32, rgba: [u8; 4]) -> String {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("png encode");
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
    )
}

fn project_with_frames(name: &str, count: usize) -> Project {
    let mut project = Project::new(name, OutputSize::Portrait);
    project.frames[0].text = "Slide 1".into();
    for i in 1..count {
        let mut frame = project.defaults.new_frame();
        frame.text = format!("Slide {}", i + 1);
        project.frames.push(frame);
    }
    project
}

#[tokio::test]
async fn archive_has_one_entry_per_frame_in_order() {
    let project = project_with_frames("Launch", 4);
    let sink = MemorySink::new();

    let summary = exporter().export_all(&project, &sink).await.unwrap();
    assert_eq!(summary.archive_name, "Launch-carousel.zip");

    let deliveries = sink.deliveries();
    assert_eq!(deliveries.len(), 1, "exactly one download for the archive");
    let (name, bytes) = &deliveries[0];
    assert_eq!(name, "Launch-carousel.zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
    assert_eq!(archive.len(), 4);
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        assert_eq!(entry.name(), format!("Launch_frame_{}.png", i + 1));

        let mut png = vec![];
        entry.read_to_end(&mut png).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1080, 1350));
    }
    assert_eq!(summary.entries.len(), 4);
}

#[tokio::test]
async fn jpeg_archive_uses_jpg_entries() {
    let project = project_with_frames("Tips", 2);
    let sink = MemorySink::new();

    let summary = exporter()
        .with_format(ExportFormat::Jpeg)
        .export_all(&project, &sink)
        .await
        .unwrap();
    assert_eq!(summary.entries, vec!["Tips_frame_1.jpg", "Tips_frame_2.jpg"]);
}

#[tokio::test]
async fn single_frame_export_writes_named_file() {
    let project = project_with_frames("Weekly Recap", 3);
    let dir = std::env::temp_dir().join(format!("slidekit-export-{}", std::process::id()));
    let sink = DirectorySink::new(&dir);

    let filename = exporter().export_frame(&project, 2, &sink).await.unwrap();
    assert_eq!(filename, "Weekly Recap-slide-3.png");
    assert!(sink.path_for(&filename).exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn unresolvable_background_falls_back_to_color() {
    let mut project = Project::new("Resilient", OutputSize::Square);
    let frame = &mut project.frames[0];
    frame.text = "Still renders".into();
    frame.font_size = 60.0;
    frame.background_color = BLUE;
    frame.text_color = RED;
    frame.background_image = Some(ImageRef::new("slidekit-definitely-missing.png"));
    project.signature = Some(Signature {
        image: ImageRef::new(solid_png_uri(40, 20, [0, 200, 0, 255])),
        size: 200.0,
        position: SignaturePosition::BottomRight,
    });

    let bytes = exporter().render_frame_bytes(&project, 0).await.unwrap();
    let image = image::load_from_memory(&bytes).unwrap().to_rgba8();

    // background keeps its flat color
    assert_eq!(image.get_pixel(5, 5).0, BLUE.to_array());
    // text painted
    assert!(image.pixels().any(|p| p.0 == RED.to_array()));
    // signature at bottom-right of the 20px inset box: x 860..1060, y 960..1060
    assert_eq!(image.get_pixel(960, 1010).0, [0, 200, 0, 255]);
    assert_eq!(image.get_pixel(1070, 1070).0, BLUE.to_array());
}

#[tokio::test]
async fn export_without_frames_delivers_nothing() {
    let mut project = project_with_frames("Empty", 1);
    project.frames.clear();
    let sink = MemorySink::new();

    assert!(exporter().export_all(&project, &sink).await.is_err());
    assert!(sink.deliveries().is_empty());
}
