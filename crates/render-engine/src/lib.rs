//! SlideKit Render Engine
//!
//! Paints carousel frames onto raster surfaces and packages them for
//! download. The same layout code runs for the reduced-scale live preview
//! and for full-resolution export; only the scale factor differs.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Frame ──┐
//!         ├── decode images (background, element images, signature)
//! refs ───┘         │   all awaited before painting
//!                   ▼
//!            clear → background → wrapped text → elements → signature
//!                   │
//!        ┌──────────┴──────────┐
//!        ▼                     ▼
//!   preview surface      encode PNG/JPEG ──► zip archive ──► download sink
//! ```

pub mod decode;
pub mod export;
pub mod layout;
pub mod pipeline;
pub mod preview;
pub mod shapes;
pub mod sink;
pub mod surface;
pub mod text;

pub use decode::{AssetResolver, FrameAssets, ImageLoader, LocalAssetResolver};
pub use export::*;
pub use layout::{RenderGeometry, TextLayout};
pub use pipeline::{paint_frame, render_frame, PaintSummary, RenderRequest};
pub use preview::{PreviewJob, PreviewRenderer, RepaintOutcome};
pub use sink::{DirectorySink, DownloadSink, MemorySink};
pub use surface::Surface;
pub use text::{FontBook, Typeface};
