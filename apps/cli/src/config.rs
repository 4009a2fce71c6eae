//! Persistent CLI settings and session.
//!
//! Stored as TOML:
//! - Linux: `~/.config/gofile-upload/config.toml`
//! - Windows: `%APPDATA%/gofile-upload/config.toml`

use std::path::{Path, PathBuf};

use gofile_client::Region;
use serde::{Deserialize, Serialize};

/// CLI configuration. Token and folder are rewritten after uploads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Zone used for server selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,

    /// Guest or account token reused across uploads.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    /// Folder receiving uploads.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub folder_id: String,

    /// Server used when selection fails (empty = fail instead).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fallback_server: String,
}

impl Config {
    /// Loads `path`, or returns defaults if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves to `path`, readable only by the owner on Unix.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

/// Returns the platform-specific configuration file path.
pub fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata)
            .join("gofile-upload")
            .join("config.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("gofile-upload")
            .join("config.toml")
    }
}
