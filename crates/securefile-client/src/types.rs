//! Secure file listing types

use crate::{Result, SecureFileError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata describing one stored secure file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureFileSummary {
    /// Safe deposit box that owns the file
    pub sdbox_id: String,
    /// Logical path of the file
    pub path: String,
    /// Size in bytes
    pub size_in_bytes: u64,
    /// Display name
    pub name: String,
    /// Creator identity
    pub created_by: String,
    /// Creation time
    pub created_ts: DateTime<Utc>,
    /// Identity of the last updater
    pub last_updated_by: String,
    /// Last update time
    pub last_updated_ts: DateTime<Utc>,
}

/// One page of secure file summaries
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureFilesResponse {
    /// Whether more results exist
    pub has_next: bool,
    /// Offset of the next page, `None` when there is none
    pub next_offset: Option<u64>,
    /// Page size limit
    pub limit: u64,
    /// Offset of this page
    pub offset: u64,
    /// Number of summaries in this page
    pub file_count_in_result: u64,
    /// Total number of files across all pages
    pub total_file_count: u64,
    /// The summaries
    pub secure_file_summaries: Vec<SecureFileSummary>,
}

impl SecureFilesResponse {
    /// Decode a listing body and check its paging invariants
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let response: Self = serde_json::from_slice(body).map_err(|e| {
            SecureFileError::MalformedResponse(format!("invalid secure file listing: {}", e))
        })?;
        response.validate()?;
        Ok(response)
    }

    fn validate(&self) -> Result<()> {
        let count = self.secure_file_summaries.len() as u64;
        if self.file_count_in_result != count {
            return Err(SecureFileError::MalformedResponse(format!(
                "file_count_in_result is {} but {} summaries were returned",
                self.file_count_in_result, count
            )));
        }
        if !self.has_next && self.next_offset.is_some() {
            return Err(SecureFileError::MalformedResponse(
                "next_offset present on the last page".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of summaries in this page
    pub fn len(&self) -> usize {
        self.secure_file_summaries.len()
    }

    /// Whether this page holds no summaries
    pub fn is_empty(&self) -> bool {
        self.secure_file_summaries.is_empty()
    }

    /// Iterate over the summaries in this page
    pub fn iter(&self) -> std::slice::Iter<'_, SecureFileSummary> {
        self.secure_file_summaries.iter()
    }
}
