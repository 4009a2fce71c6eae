use std::fmt;

use serde::{Deserialize, Serialize};

/// Upload zone accepted by the server listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "eu")]
    Europe,
    #[serde(rename = "na")]
    NorthAmerica,
}

impl Region {
    /// Wire value sent as the `zone` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Europe => "eu",
            Region::NorthAmerica => "na",
        }
    }

    /// Parses a wire value (`eu` / `na`), case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "eu" => Some(Region::Europe),
            "na" => Some(Region::NorthAmerica),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the server listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub zone: String,
}

/// `data` payload of `GET /servers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerList {
    pub servers: Vec<Server>,
}

impl ServerList {
    /// Returns the first server with a non-empty name.
    pub fn first_available(&self) -> Option<&Server> {
        self.servers.iter().find(|s| !s.name.is_empty())
    }
}

/// `data` payload of a successful `POST /contents/uploadfile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub download_page: String,
    pub code: String,
    pub parent_folder: String,
    pub guest_token: String,
    pub file_id: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub md5: String,
}
