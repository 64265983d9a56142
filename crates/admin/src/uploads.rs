//! Image upload validation.
//!
//! Files are checked against the configured limits before anything is read
//! into memory or sent to the backend.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::instrument;

use crate::config::UploadConfig;

/// Accepted extensions and their MIME types.
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

/// Upload rejected before reaching the backend.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Maximum {max} images allowed")]
    TooManyImages { max: usize },

    #[error("No images selected")]
    NoFiles,

    #[error("{0}: only JPG, PNG and WEBP images are supported")]
    UnsupportedType(String),

    #[error("{name} is larger than the {max_bytes} byte limit")]
    TooLarge { name: String, max_bytes: u64 },

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An image ready to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Build an image from in-memory bytes, checking type and size.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` for unsupported extensions or oversized data.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>, limits: UploadConfig) -> Result<Self, UploadError> {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).ok_or_else(|| UploadError::UnsupportedType(file_name.clone()))?;
        check_size(&file_name, u64::try_from(bytes.len()).unwrap_or(u64::MAX), limits)?;
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }
}

/// MIME type for a file name, if its extension is accepted.
#[must_use]
pub fn mime_for(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    ACCEPTED_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Check that `new` more images fit next to `existing` ones.
///
/// # Errors
///
/// Returns `UploadError::NoFiles` for an empty selection or
/// `UploadError::TooManyImages` when the limit would be exceeded.
pub const fn check_count(existing: usize, new: usize, limits: UploadConfig) -> Result<(), UploadError> {
    if new == 0 {
        return Err(UploadError::NoFiles);
    }
    if existing.saturating_add(new) > limits.max_images {
        return Err(UploadError::TooManyImages {
            max: limits.max_images,
        });
    }
    Ok(())
}

fn check_size(name: &str, len: u64, limits: UploadConfig) -> Result<(), UploadError> {
    if len > limits.max_bytes {
        return Err(UploadError::TooLarge {
            name: name.to_string(),
            max_bytes: limits.max_bytes,
        });
    }
    Ok(())
}

/// Validate and read image files from disk.
///
/// Count, type and size are all checked before any file is read.
///
/// # Errors
///
/// Returns the first `UploadError` encountered.
#[instrument(skip(paths), fields(count = paths.len()))]
pub async fn read_images(
    paths: &[PathBuf],
    existing: usize,
    limits: UploadConfig,
) -> Result<Vec<ImageFile>, UploadError> {
    check_count(existing, paths.len(), limits)?;

    let mut pending = Vec::with_capacity(paths.len());
    for path in paths {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let mime = mime_for(&file_name).ok_or_else(|| UploadError::UnsupportedType(path.display().to_string()))?;
        let metadata = tokio::fs::metadata(path).await.map_err(|source| UploadError::Io {
            path: path.clone(),
            source,
        })?;
        check_size(&file_name, metadata.len(), limits)?;
        pending.push((path, file_name, mime));
    }

    let mut images = Vec::with_capacity(pending.len());
    for (path, file_name, mime) in pending {
        let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
            path: path.clone(),
            source,
        })?;
        images.push(ImageFile {
            file_name,
            mime,
            bytes,
        });
    }
    tracing::debug!(count = images.len(), "Images ready for upload");
    Ok(images)
}
