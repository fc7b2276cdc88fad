//! Client configuration

use std::time::Duration;

/// Default route for listing secure files
pub const DEFAULT_LIST_BASE_PATH: &str = "/v1/secure-files";

/// Default route for a single secure file
pub const DEFAULT_FILE_BASE_PATH: &str = "/v1/secure-file";

/// Client configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Cerberus endpoint URL
    pub endpoint: String,
    /// Cerberus token sent as `X-Cerberus-Token`
    pub token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Route used by `list`
    pub list_base_path: String,
    /// Route used by `get` and `put`
    pub file_base_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("securefile-client/{}", env!("CARGO_PKG_VERSION")),
            list_base_path: DEFAULT_LIST_BASE_PATH.to_string(),
            file_base_path: DEFAULT_FILE_BASE_PATH.to_string(),
        }
    }
}

impl Config {
    /// Create a new config with the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the Cerberus token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the listing and single-file routes
    pub fn with_routes(
        mut self,
        list_base_path: impl Into<String>,
        file_base_path: impl Into<String>,
    ) -> Self {
        self.list_base_path = list_base_path.into();
        self.file_base_path = file_base_path.into();
        self
    }

    /// Build the base URL for API requests
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}
