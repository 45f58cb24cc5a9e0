//! Image upload storage
//!
//! Files land in the configured uploads directory as
//! `{unix_millis}-{sanitized original name}` and are served from `/uploads`.

use std::path::PathBuf;

use chrono::Utc;

use crate::config::UploadConfig;
use crate::error::{AppError, AppResult};
use shared::validation::{sanitize_filename, validate_image_upload};

/// Public URL prefix for stored files
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Upload service
#[derive(Clone)]
pub struct UploadService {
    dir: PathBuf,
    max_file_size: usize,
}

impl UploadService {
    /// Create a new UploadService instance
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            max_file_size: config.max_file_size,
        }
    }

    /// Check type and size before anything touches the disk
    pub fn check(&self, filename: &str, content_type: &str, size: usize) -> AppResult<()> {
        validate_image_upload(filename, content_type)
            .map_err(|msg| AppError::UnsupportedMediaType(msg.to_string()))?;

        if size > self.max_file_size {
            return Err(AppError::PayloadTooLarge);
        }

        Ok(())
    }

    /// Name under which an upload is stored
    pub fn stored_name(filename: &str) -> String {
        format!("{}-{}", Utc::now().timestamp_millis(), sanitize_filename(filename))
    }

    /// Validate and store an image, returning its public URL
    pub async fn save_image(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> AppResult<String> {
        self.check(filename, content_type, data.len())?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::StorageError(format!("Cannot create upload dir: {}", e)))?;

        let name = Self::stored_name(filename);
        let path = self.dir.join(&name);

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::StorageError(format!("Cannot write {}: {}", path.display(), e)))?;

        tracing::info!(file = %name, bytes = data.len(), "Image uploaded");

        Ok(format!("{}/{}", UPLOADS_URL_PREFIX, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: PathBuf) -> UploadService {
        UploadService::new(&UploadConfig {
            dir: dir.to_string_lossy().into_owned(),
            max_file_size: 16,
        })
    }

    #[test]
    fn test_check_rejects_wrong_type_and_size() {
        let svc = service(std::env::temp_dir());
        assert!(matches!(
            svc.check("a.gif", "image/gif", 1),
            Err(AppError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            svc.check("a.png", "image/png", 17),
            Err(AppError::PayloadTooLarge)
        ));
        assert!(svc.check("a.png", "image/png", 16).is_ok());
    }

    #[test]
    fn test_stored_name_is_prefixed_and_sanitized() {
        let name = UploadService::stored_name("../my photo.png");
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest, "my_photo.png");
    }

    #[tokio::test]
    async fn test_save_image_writes_file() {
        let dir = std::env::temp_dir().join(format!("storefront-upload-{}", uuid::Uuid::new_v4()));
        let svc = service(dir.clone());

        let url = svc.save_image("pic.jpg", "image/jpeg", b"jpegdata").await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-pic.jpg"));

        let stored = dir.join(url.trim_start_matches("/uploads/"));
        assert_eq!(tokio::fs::read(&stored).await.unwrap(), b"jpegdata");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
