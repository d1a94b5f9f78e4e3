pub mod export;
pub mod frame;
pub mod info;
pub mod init;
pub mod preview;
pub mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use slidekit_common::AppConfig;
use slidekit_project_model::{FileProjectStore, Project, ProjectStore};
use slidekit_render_engine::{FontBook, ImageLoader};

/// Shared state every command needs.
pub struct Context {
    pub config: AppConfig,
    pub store: FileProjectStore,
    pub assets: PathBuf,
}

impl Context {
    pub fn new(config: AppConfig, store: Option<PathBuf>, assets: PathBuf) -> Self {
        let root = store.unwrap_or_else(|| config.projects_dir.clone());
        tracing::debug!(store = %root.display(), assets = %assets.display(), "Using project store");
        Self {
            store: FileProjectStore::new(root),
            config,
            assets,
        }
    }

    pub fn load(&self, id: &str) -> anyhow::Result<Project> {
        self.store
            .require(id)
            .map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))
    }

    pub fn loader(&self) -> ImageLoader {
        ImageLoader::local(&self.assets)
    }

    pub fn fonts(&self) -> Arc<FontBook> {
        Arc::new(FontBook::from_dir(&self.config.fonts_dir))
    }
}

/// Convert a one-based frame number into an index, checking bounds.
pub fn frame_index(project: &Project, number: usize) -> anyhow::Result<usize> {
    if number == 0 || number > project.frame_count() {
        anyhow::bail!(
            "Frame {number} does not exist (project has {} frame(s))",
            project.frame_count()
        );
    }
    Ok(number - 1)
}
