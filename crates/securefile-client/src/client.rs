//! Secure file client implementation

use crate::{
    disposition::download_filename,
    multipart::{encode_file_upload, FILE_CONTENT_FIELD},
    route,
    transport::{BodyStream, HttpTransport, Transport},
    Config, Result, SecureFileError, SecureFilesResponse,
};
use futures::StreamExt;
use reqwest::{Method, StatusCode};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// Cerberus secure file client
///
/// Every operation is a single request/response exchange. Nothing is
/// retried here; callers that want retries can simply call again.
pub struct SecureFileClient<T = HttpTransport> {
    transport: T,
    list_base_path: String,
    file_base_path: String,
}

impl SecureFileClient<HttpTransport> {
    /// Create a client that talks HTTP to the configured endpoint
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(transport, &config))
    }

    /// Create with endpoint URL
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Self::new(Config::new(endpoint))
    }
}

impl<T: Transport> SecureFileClient<T> {
    /// Create a client on top of an existing transport
    pub fn with_transport(transport: T, config: &Config) -> Self {
        Self {
            transport,
            list_base_path: config.list_base_path.clone(),
            file_base_path: config.file_base_path.clone(),
        }
    }

    /// Get the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// List secure files under `root_path`; an empty root lists everything
    #[instrument(skip(self))]
    pub async fn list(&self, root_path: &str) -> Result<SecureFilesResponse> {
        let path = route::join(&self.list_base_path, root_path);
        let response = self
            .transport
            .request(Method::GET, &path, &[])
            .await
            .map_err(|e| SecureFileError::transport("listing secure files", e))?;

        if response.status != StatusCode::OK {
            return Err(SecureFileError::UnexpectedStatus {
                status: response.status.as_u16(),
                path,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SecureFileError::transport("reading secure file listing", e))?;
        let files = SecureFilesResponse::from_json(&body)?;

        debug!(
            "Listed {} of {} secure files under {:?}",
            files.file_count_in_result, files.total_file_count, root_path
        );
        Ok(files)
    }

    /// List every secure file
    ///
    /// Same as `list("")`. Older client releases exposed a listing call
    /// without a root path; this keeps that call shape available.
    pub async fn list_all(&self) -> Result<SecureFilesResponse> {
        self.list("").await
    }

    /// Download a secure file into `local_dir`
    ///
    /// The file is saved under the name the server sends in its
    /// `Content-Disposition` header. Returns the path that was written.
    #[instrument(skip(self, local_dir), fields(dir = %local_dir.as_ref().display()))]
    pub async fn get(&self, remote_path: &str, local_dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = route::join(&self.file_base_path, remote_path);
        let response = self
            .transport
            .request(Method::GET, &path, &[])
            .await
            .map_err(|e| {
                SecureFileError::transport(format!("downloading secure file {}", remote_path), e)
            })?;

        if response.status != StatusCode::OK {
            return Err(SecureFileError::UnexpectedStatus {
                status: response.status.as_u16(),
                path: remote_path.to_string(),
            });
        }

        let filename = download_filename(&response.headers)?;
        let target = local_dir.as_ref().join(&filename);

        let mut out = tokio::fs::File::create(&target)
            .await
            .map_err(|e| SecureFileError::local_io(&target, e))?;

        match copy_body(response.body, &mut out, &target, remote_path).await {
            Ok(written) => {
                info!("Downloaded {} ({} bytes) to {}", remote_path, written, target.display());
                Ok(target)
            }
            Err(e) => {
                drop(out);
                if let Err(cleanup) = tokio::fs::remove_file(&target).await {
                    warn!("Could not remove partial download {}: {}", target.display(), cleanup);
                }
                Err(e)
            }
        }
    }

    /// Upload `local_file` to `remote_path`
    ///
    /// The part's filename is the local file's base name. The server answers
    /// a successful upload with 204 No Content; any other status is an error.
    #[instrument(skip(self, local_file), fields(file = %local_file.as_ref().display()))]
    pub async fn put(&self, remote_path: &str, local_file: impl AsRef<Path>) -> Result<()> {
        let upload = encode_file_upload(FILE_CONTENT_FIELD, local_file.as_ref()).await?;

        let path = route::join(&self.file_base_path, remote_path);
        let response = self
            .transport
            .request_with_body(Method::POST, &path, &[], upload)
            .await
            .map_err(|e| {
                SecureFileError::transport(format!("uploading secure file {}", remote_path), e)
            })?;

        if response.status != StatusCode::NO_CONTENT {
            return Err(SecureFileError::UnexpectedStatus {
                status: response.status.as_u16(),
                path: remote_path.to_string(),
            });
        }

        info!("Uploaded {}", remote_path);
        Ok(())
    }
}

async fn copy_body(
    mut body: BodyStream,
    out: &mut tokio::fs::File,
    target: &Path,
    remote_path: &str,
) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| {
            SecureFileError::transport(format!("reading secure file {}", remote_path), e)
        })?;
        out.write_all(&chunk)
            .await
            .map_err(|e| SecureFileError::local_io(target, e))?;
        written += chunk.len() as u64;
    }
    out.flush()
        .await
        .map_err(|e| SecureFileError::local_io(target, e))?;
    Ok(written)
}
