use serde::{Deserialize, Serialize};

/// Envelope status reported by the service for accepted requests.
pub const STATUS_OK: &str = "ok";

/// Envelope for every gofile.io JSON response.
///
/// `T` is chosen by the caller: [`crate::ServerList`] for the server
/// listing, [`crate::FileData`] for an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Returns true when the service reported `"ok"`.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Consumes the envelope and returns its payload.
    pub fn into_data(self) -> T {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileData, ServerList};

    #[test]
    fn decode_server_envelope() {
        let json = r#"{"status":"ok","data":{"servers":[{"name":"store1","zone":"eu"}]}}"#;
        let resp: ApiResponse<ServerList> = serde_json::from_str(json).unwrap();
        assert!(resp.is_ok());
        let list = resp.into_data();
        assert_eq!(list.servers.len(), 1);
        assert_eq!(list.servers[0].name, "store1");
    }

    #[test]
    fn non_ok_status_is_reported() {
        let json = r#"{"status":"error-rateLimit","data":{"servers":[]}}"#;
        let resp: ApiResponse<ServerList> = serde_json::from_str(json).unwrap();
        assert!(!resp.is_ok());
        assert_eq!(resp.status, "error-rateLimit");
    }

    #[test]
    fn missing_data_is_an_error() {
        let json = r#"{"status":"ok"}"#;
        assert!(serde_json::from_str::<ApiResponse<FileData>>(json).is_err());
    }

    #[test]
    fn wrong_shape_is_an_error() {
        // A server listing cannot be decoded as an upload result.
        let json = r#"{"status":"ok","data":{"servers":[{"name":"store1"}]}}"#;
        assert!(serde_json::from_str::<ApiResponse<FileData>>(json).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(serde_json::from_str::<ApiResponse<ServerList>>("{\"status\":").is_err());
    }
}
