//! multipart/form-data bodies for secure file uploads
//!
//! Uploads are sent as a single-part form. The part carries the file bytes
//! under the `file-content` field and the local file's base name as its
//! filename.

use crate::{Result, SecureFileError};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::debug;

/// Form field carrying the uploaded file
pub const FILE_CONTENT_FIELD: &str = "file-content";

/// A complete upload form and the content type describing it
#[derive(Debug)]
pub struct MultipartBody {
    content_type: String,
    form: Form,
}

impl MultipartBody {
    /// Wrap a finished form
    pub fn new(form: Form) -> Self {
        let content_type = format!("multipart/form-data; boundary={}", form.boundary());
        Self { content_type, form }
    }

    /// `multipart/form-data; boundary=...`
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The form to send
    pub fn into_form(self) -> Form {
        self.form
    }
}

/// Encode a local file as a single-part upload form
///
/// Only the base name of `local_file` is sent as the part's filename. The file
/// is read completely before this returns, so local failures surface before
/// anything touches the network.
pub async fn encode_file_upload(field: &str, local_file: &Path) -> Result<MultipartBody> {
    let filename = local_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            SecureFileError::local_io(
                local_file,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;

    let data = tokio::fs::read(local_file)
        .await
        .map_err(|e| SecureFileError::local_io(local_file, e))?;
    let size = data.len();

    let part = Part::bytes(data)
        .file_name(filename.clone())
        .mime_str("application/octet-stream")
        .map_err(|e| SecureFileError::UploadBody(e.to_string()))?;

    let form = Form::new().part(field.to_string(), part);

    debug!("Encoded {} bytes of {} as multipart part {:?}", size, filename, field);
    Ok(MultipartBody::new(form))
}
