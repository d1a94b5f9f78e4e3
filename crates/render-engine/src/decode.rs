//! Asynchronous image decoding.
//!
//! Every image a frame needs (background, element images, signature) is
//! decoded concurrently and the whole set is awaited before anything is
//! painted. A failed decode is logged and that one image is left out; the
//! rest of the frame still renders.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use futures_util::future::join_all;
use image::RgbaImage;
use slidekit_common::{SlideError, SlideResult};
use slidekit_project_model::{ElementKind, Frame, ImageRef, Signature};

/// Turns an opaque image reference into encoded bytes.
pub trait AssetResolver: Send + Sync {
    fn fetch(&self, src: &ImageRef) -> SlideResult<Vec<u8>>;
}

/// Resolves `data:` URIs and filesystem paths (relative ones against an
/// asset root). Remote URLs are expected to be fetched by the host.
#[derive(Debug, Clone)]
pub struct LocalAssetResolver {
    root: PathBuf,
}

impl LocalAssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn decode_data_uri(src: &str) -> SlideResult<Vec<u8>> {
        let rest = &src["data:".len()..];
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| SlideError::decode(truncate(src), "malformed data URI"))?;
        if !meta.ends_with(";base64") {
            return Err(SlideError::unsupported(
                "only base64 data URIs are supported",
            ));
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| SlideError::decode(truncate(src), e.to_string()))
    }
}

impl AssetResolver for LocalAssetResolver {
    fn fetch(&self, src: &ImageRef) -> SlideResult<Vec<u8>> {
        let raw = src.as_str();
        if raw.starts_with("data:") {
            return Self::decode_data_uri(raw);
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Err(SlideError::unsupported(format!(
                "remote image '{raw}' must be resolved by the host"
            )));
        }

        let path = Path::new(raw.strip_prefix("file://").unwrap_or(raw));
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        if !path.exists() {
            return Err(SlideError::FileNotFound { path });
        }
        Ok(std::fs::read(&path)?)
    }
}

/// Keeps data URIs readable in logs.
fn truncate(src: &str) -> String {
    const MAX: usize = 64;
    match src.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &src[..idx]),
        None => src.to_string(),
    }
}

/// Decodes images off the async thread, caching successes by reference.
#[derive(Clone)]
pub struct ImageLoader {
    resolver: Arc<dyn AssetResolver>,
    cache: Arc<Mutex<HashMap<ImageRef, Arc<RgbaImage>>>>,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("cached", &self.cached_count())
            .finish()
    }
}

impl ImageLoader {
    pub fn new(resolver: Arc<dyn AssetResolver>) -> Self {
        Self {
            resolver,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Loader over a [`LocalAssetResolver`] rooted at `root`.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(LocalAssetResolver::new(root)))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ImageRef, Arc<RgbaImage>>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn cached_count(&self) -> usize {
        self.lock().len()
    }

    /// Fetch and decode one image.
    pub async fn decode(&self, src: &ImageRef) -> SlideResult<Arc<RgbaImage>> {
        if let Some(hit) = self.lock().get(src) {
            return Ok(hit.clone());
        }

        let resolver = self.resolver.clone();
        let owned = src.clone();
        let decoded = tokio::task::spawn_blocking(move || -> SlideResult<RgbaImage> {
            let bytes = resolver.fetch(&owned)?;
            let image = image::load_from_memory(&bytes)
                .map_err(|e| SlideError::decode(truncate(owned.as_str()), e.to_string()))?;
            Ok(image.to_rgba8())
        })
        .await
        .map_err(|e| SlideError::render(format!("decode task failed: {e}")))??;

        let decoded = Arc::new(decoded);
        self.lock().insert(src.clone(), decoded.clone());
        Ok(decoded)
    }

    /// Decode, logging and swallowing failures.
    async fn settle(&self, src: &ImageRef, role: &str, failures: &Mutex<Vec<String>>) -> Option<Arc<RgbaImage>> {
        match self.decode(src).await {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(role, source = %truncate(src.as_str()), error = %e, "Image decode failed, omitting");
                failures
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(format!("{role}: {e}"));
                None
            }
        }
    }
}

/// Every decoded image one frame paint needs.
#[derive(Debug, Clone, Default)]
pub struct FrameAssets {
    pub background: Option<Arc<RgbaImage>>,
    /// Aligned with `frame.elements`; `None` for shapes and failed images.
    pub elements: Vec<Option<Arc<RgbaImage>>>,
    pub signature: Option<Arc<RgbaImage>>,
    /// Human-readable description of each failed decode.
    pub failures: Vec<String>,
}

impl FrameAssets {
    /// Decode everything `frame` and `signature` reference, concurrently,
    /// and return once all decodes have settled.
    pub async fn load(frame: &Frame, signature: Option<&Signature>, loader: &ImageLoader) -> Self {
        let failures = Mutex::new(vec![]);

        let background = async {
            match &frame.background_image {
                Some(src) => loader.settle(src, "background", &failures).await,
                None => None,
            }
        };
        let elements = join_all(frame.elements.iter().map(|element| {
            let failures = &failures;
            async move {
                match &element.kind {
                    ElementKind::Image { src } => {
                        let role = format!("element {}", element.id);
                        loader.settle(src, &role, failures).await
                    }
                    ElementKind::Shape { .. } => None,
                }
            }
        }));
        let signature = async {
            match signature {
                Some(sig) => loader.settle(&sig.image, "signature", &failures).await,
                None => None,
            }
        };

        let (background, elements, signature) = tokio::join!(background, elements, signature);
        Self {
            background,
            elements,
            signature,
            failures: failures
                .into_inner()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use slidekit_project_model::{Color, Element, ShapeKind};

    fn png_data_uri(w: u32, h: u32, rgba: [u8; 4]) -> String {
        let img = RgbaImage::from_pixel(w, h, Rgba(rgba));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
        )
    }

    #[test]
    fn test_resolver_rejects_remote_and_missing() {
        let resolver = LocalAssetResolver::new(std::env::temp_dir());
        assert!(matches!(
            resolver.fetch(&ImageRef::new("https://cdn.example.com/a.png")),
            Err(SlideError::Unsupported { .. })
        ));
        assert!(matches!(
            resolver.fetch(&ImageRef::new("slidekit-no-such-file.png")),
            Err(SlideError::FileNotFound { .. })
        ));
        assert!(resolver
            .fetch(&ImageRef::new("data:image/png;base64"))
            .is_err());
    }

    #[test]
    fn test_truncate_long_refs() {
        let long = format!("data:image/png;base64,{}", "A".repeat(500));
        assert!(truncate(&long).chars().count() <= 65);
        assert_eq!(truncate("bg.png"), "bg.png");
    }

    #[tokio::test]
    async fn test_decode_data_uri_and_cache() {
        let loader = ImageLoader::local(std::env::temp_dir());
        let src = ImageRef::new(png_data_uri(3, 2, [0, 255, 0, 255]));
        let image = loader.decode(&src).await.unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(loader.cached_count(), 1);

        let again = loader.decode(&src).await.unwrap();
        assert!(Arc::ptr_eq(&image, &again));
    }

    #[tokio::test]
    async fn test_frame_assets_settle_independently() {
        let loader = ImageLoader::local(std::env::temp_dir());
        let mut frame = Frame::new(Color::WHITE, Color::BLACK, "Inter");
        frame.background_image = Some(ImageRef::new("slidekit-missing-bg.png"));
        frame.elements = vec![
            Element::image("ok", ImageRef::new(png_data_uri(2, 2, [1, 2, 3, 255])), 0.0, 0.0, 10.0, 10.0),
            Element::shape("s", ShapeKind::Circle, 0.0, 0.0, 10.0, 10.0),
            Element::image("bad", ImageRef::new("data:image/png;base64,AAAA"), 0.0, 0.0, 10.0, 10.0),
        ];
        let sig = Signature {
            image: ImageRef::new(png_data_uri(4, 2, [9, 9, 9, 255])),
            size: 80.0,
            position: Default::default(),
        };

        let assets = FrameAssets::load(&frame, Some(&sig), &loader).await;
        assert!(assets.background.is_none());
        assert_eq!(assets.elements.len(), 3);
        assert!(assets.elements[0].is_some());
        assert!(assets.elements[1].is_none());
        assert!(assets.elements[2].is_none());
        assert!(assets.signature.is_some());
        assert_eq!(assets.failures.len(), 2);
    }
}
