//! Local site content read from a directory

use async_trait::async_trait;
use siteflow_cloud::{AssetSource, CloudError};
use std::path::{Component, Path, PathBuf};

/// Reads `<root>/<key>` when the bucket is seeded
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for DirAssets {
    async fn load(&self, key: &str) -> siteflow_cloud::Result<Vec<u8>> {
        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(CloudError::InvalidConfig(format!(
                "asset key must be a relative path: {key}"
            )));
        }

        let path = self.root.join(relative);
        tracing::debug!(path = %path.display(), "reading asset");
        tokio::fs::read(&path).await.map_err(|e| {
            CloudError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            ))
        })
    }
}
