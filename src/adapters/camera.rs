use crate::domain::ports::Camera;
use crate::utils::error::{CaptureError, QsineError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

/// Camera backed by an image file already on disk (used by the CLI).
#[derive(Debug, Clone)]
pub struct FileCamera {
    source: Option<PathBuf>,
}

impl FileCamera {
    pub fn new(source: Option<PathBuf>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Camera for FileCamera {
    fn permission_granted(&self) -> bool {
        true
    }

    async fn take_picture(&self) -> Result<String> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| CaptureError::Hardware("No image file given".to_string()))?;

        let absolute = tokio::fs::canonicalize(source)
            .await
            .map_err(|e| CaptureError::Hardware(format!("{}: {}", source.display(), e)))?;

        Url::from_file_path(&absolute)
            .map(String::from)
            .map_err(|_| CaptureError::Hardware(format!("Not a file path: {}", absolute.display())).into())
    }
}

/// Accepts either a `file://` URI or a plain filesystem path.
pub fn path_from_uri(uri: &str) -> Result<PathBuf> {
    if uri.starts_with("file://") {
        let url = Url::parse(uri).map_err(|e| QsineError::validation(format!("Invalid URI {}: {}", uri, e)))?;
        return url
            .to_file_path()
            .map_err(|_| QsineError::validation(format!("Invalid file URI: {}", uri)));
    }
    Ok(Path::new(uri).to_path_buf())
}
