use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use snafu::{ResultExt, Snafu};

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// File staged by the user, held in memory as a base64 data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub data_url: String,
}

impl Attachment {
    /// Encodes raw bytes into a data URL attachment.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        let mime_type = mime_type.into();
        let data_url = format!("data:{mime_type};base64,{}", STANDARD.encode(bytes));
        Self {
            name: name.into(),
            mime_type,
            data_url,
        }
    }

    /// Reads a local file without size or content checks.
    pub async fn read(path: impl AsRef<Path>) -> AttachmentResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.context(ReadFileSnafu {
            stage: "read-attachment",
            path: path.to_path_buf(),
        })?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::debug!(name = %name, size = bytes.len(), "attachment staged from disk");
        Ok(Self::from_bytes(name, guess_mime_type(path), &bytes))
    }

    /// True for `image/*` MIME types, the only ones sent to the model.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Raw base64 payload with any `data:...;base64,` prefix removed.
    pub fn base64_payload(&self) -> &str {
        if self.data_url.starts_with("data:")
            && let Some((_, payload)) = self.data_url.split_once(',')
        {
            return payload;
        }
        &self.data_url
    }
}

/// Extension based lookup; the picker hint covers images, PDF and plain text.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => FALLBACK_MIME_TYPE,
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AttachmentError {
    #[snafu(display("failed to read attachment from {}", path.display()))]
    ReadFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for attachment ingestion.
pub type AttachmentResult<T> = Result<T, AttachmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_encoded_as_data_url() {
        let attachment = Attachment::from_bytes("note.txt", "text/plain", b"hello");

        assert_eq!(attachment.data_url, "data:text/plain;base64,aGVsbG8=");
        assert_eq!(attachment.base64_payload(), "aGVsbG8=");
        assert!(!attachment.is_image());
    }

    #[test]
    fn payload_without_prefix_is_returned_as_is() {
        let attachment = Attachment {
            name: "raw.png".to_string(),
            mime_type: "image/png".to_string(),
            data_url: "iVBORw0KGgo=".to_string(),
        };

        assert!(attachment.is_image());
        assert_eq!(attachment.base64_payload(), "iVBORw0KGgo=");
    }

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(guess_mime_type(Path::new("cat.JPG")), "image/jpeg");
        assert_eq!(guess_mime_type(Path::new("doc.pdf")), "application/pdf");
        assert_eq!(guess_mime_type(Path::new("notes.txt")), "text/plain");
        assert_eq!(guess_mime_type(Path::new("archive")), FALLBACK_MIME_TYPE);
    }

    #[tokio::test]
    async fn reading_a_file_stages_it_with_its_name() {
        let path = std::env::temp_dir().join(format!("telechat-attach-{}.png", std::process::id()));
        tokio::fs::write(&path, [0x89, b'P', b'N', b'G'])
            .await
            .expect("write fixture");

        let attachment = Attachment::read(&path).await.expect("read attachment");
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(attachment.mime_type, "image/png");
        assert!(attachment.name.ends_with(".png"));
        assert_eq!(attachment.base64_payload(), STANDARD.encode([0x89, b'P', b'N', b'G']));
    }

    #[tokio::test]
    async fn missing_file_reports_its_path() {
        let error = Attachment::read("/definitely/not/here.png")
            .await
            .expect_err("missing file");

        assert!(error.to_string().contains("/definitely/not/here.png"));
    }
}
