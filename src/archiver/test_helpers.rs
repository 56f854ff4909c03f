//! Shared helpers for archiver tests.

use crate::archiver::Archiver;
use crate::config::ExportConfig;
use crate::types::DetailRecord;
use tempfile::TempDir;
use url::Url;
use wiremock::MockServer;

/// Bearer token used by every test archiver
pub(crate) const TEST_TOKEN: &str = "Bearer test-token";

/// Build an archiver pointed at a mock server, exporting into a temp dir
///
/// Both the API origin and the media origin resolve to the mock server, so
/// relative header-image references hit mockable paths.
pub(crate) fn test_archiver(server: &MockServer) -> (Archiver, TempDir) {
    let (config, temp_dir) = test_config(server);
    (Archiver::new(config).unwrap(), temp_dir)
}

/// Like [`test_archiver`] but yields the config for per-test adjustment
pub(crate) fn test_config(server: &MockServer) -> (ExportConfig, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = ExportConfig {
        token: TEST_TOKEN.to_string(),
        api_base: Url::parse(&format!("{}/auth/", server.uri())).unwrap(),
        media_base: Url::parse(&format!("{}/", server.uri())).unwrap(),
        export_dir: temp_dir.path().join("exported"),
        ..Default::default()
    };
    (config, temp_dir)
}

/// Build a detail record from raw JSON, the way the wire would deliver it
pub(crate) fn record_from_json(json: serde_json::Value) -> DetailRecord {
    serde_json::from_value(json).unwrap()
}
