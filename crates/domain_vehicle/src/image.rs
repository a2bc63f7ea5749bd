//! Vehicle image attachments and where their bytes live

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{ImageId, VehicleId};

use crate::error::VehicleError;

/// Directory under the media root holding vehicle images
pub const IMAGE_DIR: &str = "car_images";

/// An image attached to a vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleImage {
    pub id: ImageId,
    pub vehicle_id: VehicleId,
    /// Location relative to the media root
    pub path: String,
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Byte storage for image files
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Writes `bytes` and returns the path to record on the image
    async fn store(&self, image_id: ImageId, file_name: &str, bytes: &[u8]) -> Result<String, VehicleError>;

    /// Removes a stored file; a file that is already gone is not an error
    async fn remove(&self, path: &str) -> Result<(), VehicleError>;
}

/// Keeps only characters that are safe in a file name
fn sanitize_file_name(file_name: &str) -> String {
    let name = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Relative path an image is stored under
pub fn image_path(image_id: ImageId, file_name: &str) -> String {
    format!("{IMAGE_DIR}/{}_{}", image_id.as_uuid().simple(), sanitize_file_name(file_name))
}

/// Stores images on the local filesystem under `media_root/car_images/`
#[derive(Debug, Clone)]
pub struct FsImageStorage {
    media_root: PathBuf,
}

impl FsImageStorage {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }
}

#[async_trait]
impl ImageStorage for FsImageStorage {
    async fn store(&self, image_id: ImageId, file_name: &str, bytes: &[u8]) -> Result<String, VehicleError> {
        let relative = image_path(image_id, file_name);
        let full = self.media_root.join(&relative);
        if let Some(dir) = full.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&full, bytes).await?;
        debug!(path = %full.display(), size = bytes.len(), "image stored");
        Ok(relative)
    }

    async fn remove(&self, path: &str) -> Result<(), VehicleError> {
        match tokio::fs::remove_file(self.media_root.join(path)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Image storage kept in memory
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryImageStorage {
        files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    }

    impl InMemoryImageStorage {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
            self.files.read().await.get(path).cloned()
        }

        pub async fn len(&self) -> usize {
            self.files.read().await.len()
        }
    }

    #[async_trait]
    impl ImageStorage for InMemoryImageStorage {
        async fn store(&self, image_id: ImageId, file_name: &str, bytes: &[u8]) -> Result<String, VehicleError> {
            let path = image_path(image_id, file_name);
            self.files.write().await.insert(path.clone(), bytes.to_vec());
            Ok(path)
        }

        async fn remove(&self, path: &str) -> Result<(), VehicleError> {
            self.files.write().await.remove(path);
            Ok(())
        }
    }
}
