//! Guest token and folder shared by consecutive uploads.

use gofile_protocol::FileData;

/// Form field carrying the destination folder.
pub const FOLDER_FIELD: &str = "folderId";

/// Form field carrying the account or guest token.
pub const TOKEN_FIELD: &str = "token";

/// Caller-held upload session. Empty strings mean "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    folder_id: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn folder_id(&self) -> Option<&str> {
        self.folder_id.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = non_empty(token.into());
    }

    pub fn set_folder_id(&mut self, folder_id: impl Into<String>) {
        self.folder_id = non_empty(folder_id.into());
    }

    /// Fills unset fields from an upload response. Set fields never change.
    pub fn adopt(&mut self, data: &FileData) {
        if self.folder_id.is_none() {
            self.folder_id = non_empty(data.parent_folder.clone());
        }
        if self.token.is_none() {
            self.token = non_empty(data.guest_token.clone());
        }
    }

    /// Text parts to send with a file, folder first.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::with_capacity(2);
        if let Some(folder) = &self.folder_id {
            fields.push((FOLDER_FIELD, folder.clone()));
        }
        if let Some(token) = &self.token {
            fields.push((TOKEN_FIELD, token.clone()));
        }
        fields
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
