//! # Secure File Client SDK
//!
//! A client for the secure file feature of a Cerberus secrets service.
//!
//! ## Features
//!
//! - **List**: page through secure file metadata, optionally under a root path
//! - **Download**: stream a secure file to disk under the server-chosen name
//! - **Upload**: send a local file as a `multipart/form-data` body
//! - **Pluggable transport**: bring your own [`Transport`] for auth, retries
//!   or testing; [`HttpTransport`] is the reqwest-based default
//!
//! ## Example
//!
//! ```rust,ignore
//! use securefile_client::{Config, SecureFileClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SecureFileClient::new(
//!         Config::new("https://cerberus.example.com").with_token("your-token"),
//!     )?;
//!
//!     // List everything under app/
//!     let files = client.list("app").await?;
//!     for file in files.iter() {
//!         println!("{} ({} bytes)", file.path, file.size_in_bytes);
//!     }
//!
//!     // Upload, then download into the current directory
//!     client.put("app/config/secret.txt", "./secret.txt").await?;
//!     let saved = client.get("app/config/secret.txt", ".").await?;
//!     println!("Saved to {}", saved.display());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod disposition;
mod error;
mod multipart;
mod route;
mod transport;
mod types;

pub use client::SecureFileClient;
pub use config::{Config, DEFAULT_FILE_BASE_PATH, DEFAULT_LIST_BASE_PATH};
pub use disposition::ContentDisposition;
pub use error::{Result, SecureFileError, TransportError};
pub use multipart::{encode_file_upload, MultipartBody, FILE_CONTENT_FIELD};
pub use transport::{BodyStream, HttpTransport, Transport, TransportResponse, CERBERUS_TOKEN_HEADER};
pub use types::*;

// Re-export the HTTP vocabulary used by the Transport trait
pub use reqwest::{header::HeaderMap, Method, StatusCode};
