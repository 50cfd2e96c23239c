use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Stages uploaded image bytes at a publicly reachable URL.
///
/// URL-only providers cannot read inline bytes, so the upload handler stages
/// the image here first and hands the resulting URL down the pipeline. Files
/// land in a local directory served by the HTTP layer; a deployment fronted
/// by object storage would swap this implementation out.
pub struct ImageStager {
    dir: PathBuf,
    base_url: String,
}

impl ImageStager {
    pub async fn new(dir: &str, base_url: &str) -> AppResult<Self> {
        let dir = PathBuf::from(dir);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Staging(format!("failed to create staging directory: {}", e))
        })?;

        Ok(Self {
            dir,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Writes the bytes under a unique name and returns their public URL
    pub async fn stage(&self, bytes: &[u8]) -> AppResult<String> {
        let filename = format!("{}.jpg", Uuid::new_v4());
        let path = self.dir.join(&filename);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Staging(format!("failed to write staged image: {}", e)))?;

        let url = format!("{}/{}", self.base_url, filename);
        tracing::info!(url = %url, "Image staged for URL-only provider");
        Ok(url)
    }

    /// Directory the HTTP layer serves staged images from
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_test_stager() -> ImageStager {
        let dir = std::env::temp_dir().join(format!("staging-test-{}", Uuid::new_v4()));
        ImageStager::new(dir.to_str().unwrap(), "http://localhost:3000/staged/")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_stage_writes_file_and_returns_url() {
        let stager = create_test_stager().await;
        let url = stager.stage(&[0xFF, 0xD8, 0xFF, 0xE0]).await.unwrap();

        assert!(url.starts_with("http://localhost:3000/staged/"));
        assert!(url.ends_with(".jpg"));

        let filename = url.rsplit('/').next().unwrap();
        let staged = tokio::fs::read(stager.dir().join(filename)).await.unwrap();
        assert_eq!(staged, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[tokio::test]
    async fn test_staged_files_get_unique_names() {
        let stager = create_test_stager().await;
        let first = stager.stage(&[1]).await.unwrap();
        let second = stager.stage(&[2]).await.unwrap();
        assert_ne!(first, second);
    }
}
