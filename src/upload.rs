//! Upload widget: pick or drop a file, validate it locally, post it,
//! hand the stored URL back to the form.
//!
//! ```text
//! Idle -> Validating -> Idle                  (rejected, nothing sent)
//!                    -> Uploading -> Idle     (success or failure)
//! ```

use std::fmt;
use std::path::Path;

use anyhow::Context;
use mime::Mime;
use tracing::{info, warn};

use crate::api::Uploader;

pub const UPLOAD_FAILED: &str = "Upload failed.";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Which backend endpoint a widget posts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Video,
    Pdf,
    Any,
}

impl UploadKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            UploadKind::Image => "/upload/image",
            UploadKind::Video => "/upload/video",
            UploadKind::Pdf => "/upload/pdf",
            UploadKind::Any => "/upload",
        }
    }

    pub fn accepted(self) -> &'static [&'static str] {
        match self {
            UploadKind::Image => &["image/*"],
            UploadKind::Video => &["video/*"],
            UploadKind::Pdf => &["application/pdf"],
            UploadKind::Any => &["*/*"],
        }
    }

    pub fn default_max_size_mb(self) -> u64 {
        match self {
            UploadKind::Image => 5,
            UploadKind::Video => 100,
            UploadKind::Pdf => 10,
            UploadKind::Any => 20,
        }
    }
}

/// A file chosen through the picker or dropped on the widget
#[derive(Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FileSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSelection")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl FileSelection {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a local file, guessing its MIME type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("Path has no file name")?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        Ok(Self::new(name, mime.to_string(), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No file selected.")]
    NothingSelected,
    #[error("Invalid file type. Accepted: {accepted}")]
    InvalidType { accepted: String },
    #[error("File size exceeds {max_mb}MB limit.")]
    TooLarge { max_mb: u64 },
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    Validating,
    Uploading,
}

type StateListener = Box<dyn FnMut(UploadState) + Send>;

pub struct UploadWidget {
    kind: UploadKind,
    max_size_mb: u64,
    accept: Vec<String>,
    state: UploadState,
    error: Option<String>,
    selection: Option<FileSelection>,
    listener: Option<StateListener>,
}

impl UploadWidget {
    pub fn new(kind: UploadKind) -> Self {
        Self {
            kind,
            max_size_mb: kind.default_max_size_mb(),
            accept: kind.accepted().iter().map(|s| s.to_string()).collect(),
            state: UploadState::Idle,
            error: None,
            selection: None,
            listener: None,
        }
    }

    pub fn max_size_mb(mut self, max_size_mb: u64) -> Self {
        self.max_size_mb = max_size_mb;
        self
    }

    /// Override the accepted MIME patterns (`image/*`, `application/pdf`, ...)
    pub fn accept<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn on_state(mut self, listener: impl FnMut(UploadState) + Send + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn kind(&self) -> UploadKind {
        self.kind
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn is_uploading(&self) -> bool {
        self.state == UploadState::Uploading
    }

    /// Inline error shown under the control
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn selection(&self) -> Option<&FileSelection> {
        self.selection.as_ref()
    }

    pub fn select(&mut self, file: FileSelection) {
        self.selection = Some(file);
    }

    pub fn validate(&self, file: &FileSelection) -> Result<(), UploadError> {
        let type_ok = file
            .mime
            .parse::<Mime>()
            .map(|actual| self.accept.iter().any(|pattern| mime_matches(pattern, &actual)))
            .unwrap_or(false);
        if !type_ok {
            return Err(UploadError::InvalidType {
                accepted: self.accept.join(", "),
            });
        }

        if file.size() > self.max_size_mb.saturating_mul(BYTES_PER_MB) {
            return Err(UploadError::TooLarge {
                max_mb: self.max_size_mb,
            });
        }

        Ok(())
    }

    /// Validate and send the selected file. On success `on_change` receives
    /// the stored URL. The selection is cleared whatever the outcome so the
    /// same file can be picked again.
    pub async fn submit<F>(&mut self, uploader: &dyn Uploader, on_change: F) -> Result<String, UploadError>
    where
        F: FnOnce(String),
    {
        let Some(file) = self.selection.take() else {
            self.error = Some(UploadError::NothingSelected.to_string());
            return Err(UploadError::NothingSelected);
        };

        self.transition(UploadState::Validating);
        if let Err(rejection) = self.validate(&file) {
            warn!(file = %file.name, "{}", rejection);
            self.error = Some(rejection.to_string());
            self.transition(UploadState::Idle);
            return Err(rejection);
        }

        self.error = None;
        self.transition(UploadState::Uploading);
        let outcome = uploader.upload(self.kind, &file).await;
        self.transition(UploadState::Idle);

        match outcome {
            Ok(url) => {
                info!(file = %file.name, url = %url, "upload complete");
                on_change(url.clone());
                Ok(url)
            }
            Err(e) => {
                let message = e.user_message(UPLOAD_FAILED);
                warn!(file = %file.name, error = %e, "upload failed");
                self.error = Some(message.clone());
                Err(UploadError::Failed(message))
            }
        }
    }

    /// `select` followed by `submit`, for the drag-and-drop path
    pub async fn upload<F>(
        &mut self,
        uploader: &dyn Uploader,
        file: FileSelection,
        on_change: F,
    ) -> Result<String, UploadError>
    where
        F: FnOnce(String),
    {
        self.select(file);
        self.submit(uploader, on_change).await
    }

    fn transition(&mut self, next: UploadState) {
        self.state = next;
        if let Some(listener) = self.listener.as_mut() {
            listener(next);
        }
    }
}

fn mime_matches(pattern: &str, actual: &Mime) -> bool {
    match pattern.trim().parse::<Mime>() {
        Ok(expected) => {
            (expected.type_() == mime::STAR || expected.type_() == actual.type_())
                && (expected.subtype() == mime::STAR || expected.subtype() == actual.subtype())
        }
        Err(_) => false,
    }
}
