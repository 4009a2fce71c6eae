use std::time::Duration;

use gofile_transfer::DEFAULT_PIPE_CAPACITY;

/// Base URL of the public API (server listing).
pub const DEFAULT_API_BASE_URL: &str = "https://api.gofile.io";

/// Upload endpoint template; [`SERVER_PLACEHOLDER`] is replaced by the server name.
pub const DEFAULT_UPLOAD_URL: &str = "https://{server}.gofile.io/contents/uploadfile";

pub const SERVER_PLACEHOLDER: &str = "{server}";

/// Timeout for the server listing request.
pub const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Endpoints, timeouts and buffering for a [`crate::Client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub upload_url: String,
    pub server_timeout: Duration,
    /// Deadline for a whole upload. `None` waits for the network layer.
    pub upload_timeout: Option<Duration>,
    /// Bytes buffered between the encoder and the request body.
    pub pipe_capacity: usize,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            upload_url: DEFAULT_UPLOAD_URL.into(),
            server_timeout: SERVER_SELECTION_TIMEOUT,
            upload_timeout: None,
            pipe_capacity: DEFAULT_PIPE_CAPACITY,
            user_agent: concat!("gofile-client/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ClientConfig {
    /// URL of the server listing endpoint.
    pub fn servers_url(&self) -> String {
        format!("{}/servers", self.api_base_url.trim_end_matches('/'))
    }

    /// Upload URL for `server`. The name is not validated here.
    pub fn upload_url_for(&self, server: &str) -> String {
        self.upload_url.replace(SERVER_PLACEHOLDER, server)
    }
}
