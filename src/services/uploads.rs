//! Cover image storage service

use std::path::Path;

use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::{config::UploadsConfig, error::AppResult};

/// An uploaded image: original client file name plus raw bytes
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Stores cover images on the local filesystem and hands out the public
/// URLs they are served under.
#[derive(Debug, Clone)]
pub struct UploadsService {
    dir: String,
    public_path: String,
}

impl UploadsService {
    pub fn new(config: UploadsConfig) -> Self {
        Self {
            dir: config.dir,
            public_path: config.public_path,
        }
    }

    /// Resolve an optional upload to the URL stored on the record.
    /// No image resolves to an empty string.
    pub async fn resolve(&self, image: Option<UploadedImage>) -> AppResult<String> {
        match image {
            Some(image) => self.store(image).await,
            None => Ok(String::new()),
        }
    }

    /// Write the image under a timestamped name and return its public URL
    async fn store(&self, image: UploadedImage) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = stored_filename(Utc::now().timestamp_millis(), &image.file_name);
        let path = Path::new(&self.dir).join(&file_name);

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(&image.data).await?;
        file.flush().await?;

        tracing::debug!("Stored cover image {}", path.display());
        Ok(format!("{}/{}", self.public_path, file_name))
    }
}

/// Stored file name: upload timestamp plus the client name. Only the final
/// path component of the client name is kept.
fn stored_filename(timestamp_millis: i64, original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let base = if base.is_empty() || base == "." || base == ".." {
        "upload"
    } else {
        base
    };
    format!("{}-{}", timestamp_millis, base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_in(dir: &Path) -> UploadsService {
        UploadsService::new(UploadsConfig {
            dir: dir.to_string_lossy().into_owned(),
            public_path: "/uploads".to_string(),
        })
    }

    #[test]
    fn test_stored_filename_is_timestamp_plus_name() {
        assert_eq!(
            stored_filename(1700000000000, "cover.png"),
            "1700000000000-cover.png"
        );
    }

    #[test]
    fn test_stored_filename_strips_path_components() {
        assert_eq!(stored_filename(1, "../../etc/passwd"), "1-passwd");
        assert_eq!(stored_filename(1, "covers\\dune.jpg"), "1-dune.jpg");
    }

    #[test]
    fn test_stored_filename_falls_back_for_empty_names() {
        assert_eq!(stored_filename(1, ""), "1-upload");
        assert_eq!(stored_filename(1, "images/"), "1-upload");
        assert_eq!(stored_filename(1, ".."), "1-upload");
    }

    #[tokio::test]
    async fn test_resolve_none_is_empty_reference() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service_in(tmp.path());

        assert_eq!(service.resolve(None).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_resolve_stores_bytes_under_public_path() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service_in(tmp.path());

        let url = service
            .resolve(Some(UploadedImage {
                file_name: "cover.png".to_string(),
                data: vec![1, 2, 3, 4],
            }))
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-cover.png"));

        let stored_name = url.strip_prefix("/uploads/").unwrap();
        let bytes = tokio::fs::read(tmp.path().join(stored_name)).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_resolve_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service_in(&tmp.path().join("nested").join("covers"));

        let url = service
            .resolve(Some(UploadedImage {
                file_name: "a.jpg".to_string(),
                data: b"x".to_vec(),
            }))
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/"));
    }
}
