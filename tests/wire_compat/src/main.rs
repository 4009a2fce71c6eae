fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use gofile_client::decode::decode_envelope;
    use gofile_client::{Error, UploadResult};
    use gofile_protocol::{ApiResponse, FileData, ServerList};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn load_bytes(name: &str) -> Vec<u8> {
        let path = fixtures_dir().join(name);
        fs::read(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_slice(&load_bytes(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Deserializes a fixture, re-serializes it, and compares the JSON values.
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  service: {fixture}\n  rust:    {reserialized}"
        );
    }

    #[test]
    fn fixture_servers_roundtrip() {
        roundtrip_test::<ApiResponse<ServerList>>("servers_ok.json");
    }

    #[test]
    fn fixture_upload_roundtrip() {
        roundtrip_test::<ApiResponse<FileData>>("upload_ok.json");
    }

    #[test]
    fn fixture_servers_first_available() {
        let list: ServerList = decode_envelope(&load_bytes("servers_ok.json")).unwrap();
        assert_eq!(list.first_available().unwrap().name, "store3");
    }

    #[test]
    fn fixture_servers_empty() {
        let list: ServerList = decode_envelope(&load_bytes("servers_empty.json")).unwrap();
        assert!(list.first_available().is_none());
    }

    #[test]
    fn fixture_upload_result() {
        let data: FileData = decode_envelope(&load_bytes("upload_ok.json")).unwrap();
        let result = UploadResult::from(data);
        assert_eq!(result.download_page(), "https://gofile.io/d/Ab12Cd");
        assert_eq!(result.code(), "Ab12Cd");
        assert_eq!(result.guest_token(), "Xk3N9pQw2LmZ7vRt");
        assert_eq!(result.md5(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn fixture_upload_ignores_extra_fields() {
        let data: FileData = decode_envelope(&load_bytes("upload_extra_fields.json")).unwrap();
        assert_eq!(data.code, "Qw34Er");
        assert_eq!(data.parent_folder, "7a6b5c4d-3e2f-1a0b-9c8d-7e6f5a4b3c2d");
        assert_eq!(data.file_name, "better-day-186374.mp3");
    }

    #[test]
    fn fixture_error_status() {
        let err = decode_envelope::<FileData>(&load_bytes("error_rate_limit.json")).unwrap_err();
        assert!(matches!(err, Error::Rejected { ref status } if status == "error-rateLimit"));
    }

    #[test]
    fn upload_fixture_is_not_a_server_list() {
        let err = decode_envelope::<ServerList>(&load_bytes("upload_ok.json")).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
