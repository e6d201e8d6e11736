// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Captured proof images.
//!
//! A [`CapturedImage`] is the raw payload picked by the user plus its declared
//! MIME type. It carries a SHA-256 fingerprint of the bytes so a verdict can be
//! tied to the exact payload it was produced against.

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::error::ProofQuestError;

/// An image held transiently by one in-flight submission attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedImage {
    bytes: Arc<[u8]>,
    mime_type: String,
    fingerprint: String,
}

impl CapturedImage {
    /// Wraps raw bytes with a declared MIME type.
    ///
    /// Rejects empty payloads and types outside `image/*`.
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Result<Self, ProofQuestError> {
        let bytes: Vec<u8> = bytes.into();
        let mime_type = mime_type.into();

        if bytes.is_empty() {
            return Err(ProofQuestError::image("image payload is empty"));
        }
        if !mime_type.starts_with("image/") {
            return Err(ProofQuestError::image(format!(
                "unsupported MIME type `{mime_type}`, expected image/*"
            )));
        }

        let fingerprint = hex::encode(Sha256::digest(&bytes));
        Ok(Self {
            bytes: bytes.into(),
            mime_type,
            fingerprint,
        })
    }

    /// Reads an image from disk, inferring the MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, ProofQuestError> {
        let mime_type = mime_type_for_path(path).ok_or_else(|| {
            ProofQuestError::image(format!(
                "cannot infer image type of {}, expected jpg, png, webp, gif or heic",
                path.display()
            ))
        })?;

        let bytes = tokio::fs::read(path).await.map_err(|e| ProofQuestError::Image {
            message: format!("failed to read {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;

        tracing::debug!(path = %path.display(), size = bytes.len(), mime_type, "image loaded");
        Self::new(bytes, mime_type)
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared MIME type, e.g. `image/jpeg`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Hex SHA-256 of the payload.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; empty payloads are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard base64 of the payload, without a `data:` URL prefix.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl std::fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedImage")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Maps a file extension to an image MIME type.
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_payload() {
        let err = CapturedImage::new(Vec::new(), "image/png").unwrap_err();
        assert!(err.to_string().contains("empty"), "got: {err}");
    }

    #[test]
    fn rejects_non_image_mime() {
        let err = CapturedImage::new(vec![1, 2, 3], "application/pdf").unwrap_err();
        assert!(err.to_string().contains("application/pdf"), "got: {err}");
    }

    #[test]
    fn base64_has_no_data_url_prefix() {
        let image = CapturedImage::new(b"hello".to_vec(), "image/png").unwrap();
        assert_eq!(image.to_base64(), "aGVsbG8=");
    }

    #[test]
    fn fingerprint_tracks_bytes() {
        let a = CapturedImage::new(b"one".to_vec(), "image/png").unwrap();
        let b = CapturedImage::new(b"one".to_vec(), "image/jpeg").unwrap();
        let c = CapturedImage::new(b"two".to_vec(), "image/png").unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn mime_inferred_from_extension() {
        assert_eq!(mime_type_for_path(Path::new("proof.JPG")), Some("image/jpeg"));
        assert_eq!(mime_type_for_path(Path::new("a/b/proof.webp")), Some("image/webp"));
        assert_eq!(mime_type_for_path(Path::new("proof.txt")), None);
        assert_eq!(mime_type_for_path(Path::new("proof")), None);
    }

    #[tokio::test]
    async fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let image = CapturedImage::from_path(&path).await.unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.len(), 4);
    }

    #[tokio::test]
    async fn from_path_missing_file_is_image_error() {
        let err = CapturedImage::from_path(Path::new("/nonexistent/proof.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProofQuestError::Image { .. }));
    }
}
