//! Media validation and multipart upload with progress reporting.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::Deserialize;

use super::ApiClient;
use crate::errors::{ClientError, Result};

/// Maximum number of media attachments on a single post.
pub const MAX_ATTACHMENTS: usize = 3;
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;
pub const MAX_VIDEO_BYTES: u64 = 30 * 1024 * 1024;
pub const MAX_PROFILE_PICTURE_BYTES: u64 = 5 * 1024 * 1024;

const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// A file selected for upload, held in memory.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl MediaFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk. The MIME type is supplied by the caller.
    pub async fn from_path(path: &Path, content_type: &str) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, content_type, data))
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn kind(&self) -> Option<MediaKind> {
        let ct = self.content_type.to_ascii_lowercase();
        if ct.starts_with("image/") {
            Some(MediaKind::Image)
        } else if ct.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// Check a single post attachment's type and size.
pub fn validate_attachment(file: &MediaFile) -> Result<MediaKind> {
    let kind = file.kind().ok_or_else(|| {
        ClientError::Validation("Only image and video files are allowed".to_string())
    })?;
    match kind {
        MediaKind::Image if file.len() > MAX_IMAGE_BYTES => Err(ClientError::Validation(
            "Image size should be less than 10MB".to_string(),
        )),
        MediaKind::Video if file.len() > MAX_VIDEO_BYTES => Err(ClientError::Validation(
            "Video size should be less than 30MB".to_string(),
        )),
        _ => Ok(kind),
    }
}

/// Check a batch of attachments being added to `existing` already selected ones.
pub fn validate_attachments(existing: usize, files: &[MediaFile]) -> Result<()> {
    if existing + files.len() > MAX_ATTACHMENTS {
        return Err(ClientError::Validation(format!(
            "A post can have at most {} media files",
            MAX_ATTACHMENTS
        )));
    }
    for file in files {
        validate_attachment(file)?;
    }
    Ok(())
}

pub fn validate_profile_picture(file: &MediaFile) -> Result<()> {
    if file.kind() != Some(MediaKind::Image) {
        return Err(ClientError::Validation(
            "Please select an image file".to_string(),
        ));
    }
    if file.len() > MAX_PROFILE_PICTURE_BYTES {
        return Err(ClientError::Validation(
            "File size should be less than 5MB".to_string(),
        ));
    }
    Ok(())
}

/// Bytes sent so far for one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: u64,
}

impl UploadProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.loaded.min(self.total) * 100) / self.total) as u8
    }
}

pub type ProgressFn = Arc<dyn Fn(UploadProgress) + Send + Sync>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_url: String,
}

impl ApiClient {
    /// POST /api/upload - Upload one media file, returning its public URL.
    ///
    /// The file is validated first; an invalid file never reaches the network.
    pub async fn upload(&self, file: &MediaFile, progress: Option<ProgressFn>) -> Result<String> {
        validate_attachment(file)?;

        let total = file.len();
        let data = file.data.clone();
        let chunks: Vec<Bytes> = (0..data.len())
            .step_by(UPLOAD_CHUNK_BYTES)
            .map(|start| data.slice(start..(start + UPLOAD_CHUNK_BYTES).min(data.len())))
            .collect();

        let mut loaded = 0u64;
        let stream = futures_util::stream::iter(chunks).map(move |chunk| {
            loaded += chunk.len() as u64;
            if let Some(report) = &progress {
                report(UploadProgress { loaded, total });
            }
            Ok::<Bytes, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        tracing::debug!("Uploading {} ({} bytes)", file.file_name, total);
        let body: UploadResponse = self.json(self.post("/api/upload").multipart(form)).await?;
        Ok(body.file_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, size: usize) -> MediaFile {
        MediaFile::new("f", content_type, vec![0u8; size])
    }

    #[test]
    fn test_video_over_limit_rejected() {
        let err = validate_attachment(&file("video/mp4", 31 * 1024 * 1024)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_video_between_image_and_video_limit_accepted() {
        assert_eq!(
            validate_attachment(&file("video/mp4", 20 * 1024 * 1024)).unwrap(),
            MediaKind::Video
        );
    }

    #[test]
    fn test_image_limits() {
        assert!(validate_attachment(&file("image/png", 9 * 1024 * 1024)).is_ok());
        assert!(validate_attachment(&file("image/png", 10 * 1024 * 1024)).is_ok());
        assert!(validate_attachment(&file("image/png", 10 * 1024 * 1024 + 1)).is_err());
    }

    #[test]
    fn test_non_media_rejected() {
        let err = validate_attachment(&file("application/pdf", 10)).unwrap_err();
        assert_eq!(err.user_message(""), "Only image and video files are allowed");
    }

    #[test]
    fn test_attachment_count() {
        let files = vec![file("image/png", 1), file("image/png", 1)];
        assert!(validate_attachments(1, &files).is_ok());
        assert!(validate_attachments(2, &files).is_err());
    }

    #[test]
    fn test_profile_picture_rules() {
        assert!(validate_profile_picture(&file("image/jpeg", 1024)).is_ok());
        assert!(validate_profile_picture(&file("video/mp4", 1024)).is_err());
        assert!(validate_profile_picture(&file("image/jpeg", 6 * 1024 * 1024)).is_err());
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(UploadProgress { loaded: 50, total: 200 }.percent(), 25);
        assert_eq!(UploadProgress { loaded: 0, total: 0 }.percent(), 100);
    }
}
