//! Wire-level tests: the real reqwest transport against a local mock server.
//!
//! These pin the HTTP contract with the Storage API (verbs, paths, query
//! keys, multipart field names, Basic Auth) rather than client internals.

use std::time::Duration;

use httpmock::prelude::*;
use sauce_storage_client::{
    file_id_of, ClientConfig, Credentials, FileQuery, GroupQuery, StorageClient, StorageError,
};

/// base64("sauce-user:sauce-key")
const BASIC_AUTH: &str = "Basic c2F1Y2UtdXNlcjpzYXVjZS1rZXk=";

fn client_for(server: &MockServer) -> StorageClient {
    StorageClient::with_endpoint("sauce-user", "sauce-key", &server.base_url()).unwrap()
}

#[test]
fn test_upload_sends_multipart_fields() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.apk");
    std::fs::write(&path, b"APK-CONTENTS").unwrap();

    let upload_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/storage/upload")
            .header("authorization", BASIC_AUTH)
            .body_includes("name=\"payload\"")
            .body_includes("name=\"file_name\"")
            .body_includes("APK-CONTENTS");
        then.status(201)
            .header("content-type", "application/json")
            .json_body(serde_json::json!({
                "item": {"id": "7a1c", "name": "app.apk", "kind": "android"}
            }));
    });

    let json = client_for(&server).upload(&path, None).unwrap();

    upload_mock.assert();
    assert_eq!(file_id_of(&json).as_deref(), Some("7a1c"));
    assert_eq!(json["item"]["kind"], "android");
}

#[test]
fn test_upload_remote_name_override() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.apk");
    std::fs::write(&path, b"bytes").unwrap();

    let upload_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/storage/upload")
            .body_includes("checkout-1.2.apk");
        then.status(200).json_body(serde_json::json!({"item": {"id": "x"}}));
    });

    client_for(&server).upload(&path, Some("checkout-1.2.apk")).unwrap();
    upload_mock.assert();
}

#[test]
fn test_upload_rejected_is_api_error() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.apk");
    std::fs::write(&path, b"bytes").unwrap();

    server.mock(|when, then| {
        when.method(POST).path("/storage/upload");
        then.status(401).body("{\"detail\":\"Invalid credentials\"}");
    });

    let err = client_for(&server).upload(&path, None).unwrap_err();
    match err {
        StorageError::Api { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid credentials"), "body: {}", body);
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[test]
fn test_download_writes_named_file() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();

    let download_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/storage/download/abc")
            .header("authorization", BASIC_AUTH);
        then.status(200)
            .header("content-disposition", "attachment; filename=\"app-release.apk\"")
            .body(b"\x50\x4b\x03\x04release");
    });

    let path = client_for(&server).download("abc", dir.path()).unwrap();

    download_mock.assert();
    assert_eq!(path, dir.path().join("app-release.apk"));
    assert_eq!(std::fs::read(&path).unwrap(), b"\x50\x4b\x03\x04release");
}

#[test]
fn test_download_non_ascii_filename() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();

    let download_mock = server.mock(|when, then| {
        when.method(GET).path("/storage/download/abc");
        then.status(200)
            .header("content-disposition", "attachment; filename=\"café-app.apk\"")
            .body("apk-bytes");
    });

    let path = client_for(&server).download("abc", dir.path()).unwrap();

    download_mock.assert();
    assert_eq!(path, dir.path().join("café-app.apk"));
    assert_eq!(std::fs::read(&path).unwrap(), b"apk-bytes");
}

#[test]
fn test_download_missing_header_is_malformed() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/storage/download/abc");
        then.status(200).body("bytes");
    });

    let err = client_for(&server).download("abc", dir.path()).unwrap_err();
    assert!(matches!(err, StorageError::MalformedResponse(_)), "got {:?}", err);
}

#[test]
fn test_edit_puts_json_body() {
    let server = MockServer::start();

    let edit_mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/storage/files/f1")
            .header("authorization", BASIC_AUTH)
            .json_body(serde_json::json!({"item": {"name": "renamed.apk"}}));
        then.status(200)
            .json_body(serde_json::json!({"item": {"id": "f1", "name": "renamed.apk"}}));
    });

    let json = client_for(&server)
        .edit("f1", &serde_json::json!({"item": {"name": "renamed.apk"}}))
        .unwrap();

    edit_mock.assert();
    assert_eq!(json["item"]["name"], "renamed.apk");
}

#[test]
fn test_delete_file_and_group_paths() {
    let server = MockServer::start();

    let file_mock = server.mock(|when, then| {
        when.method(DELETE).path("/storage/files/abc");
        then.status(200).json_body(serde_json::json!({"item": {"id": "abc"}}));
    });
    let group_mock = server.mock(|when, then| {
        when.method(DELETE).path("/storage/groups/g1");
        then.status(200).json_body(serde_json::json!({"item": {"id": 1, "files": 3}}));
    });

    let client = client_for(&server);
    let deleted = client.delete(Some("abc"), None).unwrap();
    let group = client.delete(None, Some("g1")).unwrap();

    file_mock.assert();
    group_mock.assert();
    assert_eq!(deleted["item"]["id"], "abc");
    assert_eq!(group["item"]["files"], 3);
}

#[test]
fn test_delete_without_target_sends_nothing() {
    let server = MockServer::start();
    let any_mock = server.mock(|when, then| {
        when.method(DELETE);
        then.status(200).json_body(serde_json::json!({}));
    });

    let err = client_for(&server).delete(None, None).unwrap_err();
    assert!(matches!(err, StorageError::Usage(_)));
    any_mock.assert_calls(0);
}

#[test]
fn test_list_files_default_query() {
    let server = MockServer::start();

    let list_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/storage/files")
            .header("authorization", BASIC_AUTH)
            .query_param("page", "1")
            .query_param("per_page", "25")
            .query_param_missing("q")
            .query_param_missing("kind")
            .query_param_missing("file_id")
            .query_param_missing("team_id");
        then.status(200).json_body(serde_json::json!({
            "items": [{"id": "a", "name": "app.apk"}],
            "links": {"self": "?page=1&per_page=25"},
            "page": 1,
            "per_page": 25,
            "total_items": 1
        }));
    });

    let resp = client_for(&server).list_files(&FileQuery::default()).unwrap();

    list_mock.assert();
    assert_eq!(resp.status, 200);
    let json: serde_json::Value = resp.json().unwrap();
    assert_eq!(json["items"][0]["id"], "a");
}

#[test]
fn test_list_files_with_filters() {
    let server = MockServer::start();

    let list_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/storage/files")
            .query_param("q", "checkout")
            .query_param("kind", "ios")
            .query_param("team_id", "team-7")
            .query_param("page", "2")
            .query_param("per_page", "100")
            .query_param_missing("file_id");
        then.status(200).json_body(serde_json::json!({"items": []}));
    });

    let query = FileQuery::new()
        .search("checkout")
        .kind("ios")
        .team_id("team-7")
        .page(2)
        .per_page(100);
    client_for(&server).list_files(&query).unwrap();
    list_mock.assert();
}

#[test]
fn test_list_groups_error_status_is_returned_raw() {
    let server = MockServer::start();

    let groups_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/storage/groups")
            .query_param("file_id", "f1")
            .query_param("page", "1")
            .query_param("per_page", "25");
        then.status(403).body("{\"detail\":\"forbidden\"}");
    });

    let resp = client_for(&server).list_groups(&GroupQuery::new().file_id("f1")).unwrap();

    groups_mock.assert();
    assert_eq!(resp.status, 403);
    assert!(!resp.is_success());
    assert!(resp.text().contains("forbidden"));
}

#[test]
fn test_upload_then_download_round_trip() {
    let server = MockServer::start();
    let src_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();

    let original: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let src = src_dir.path().join("app.apk");
    std::fs::write(&src, &original).unwrap();

    server.mock(|when, then| {
        when.method(POST).path("/storage/upload");
        then.status(201).json_body(serde_json::json!({"item": {"id": "rt-1", "name": "app.apk"}}));
    });
    let download_mock = server.mock(|when, then| {
        when.method(GET).path("/storage/download/rt-1");
        then.status(200)
            .header("content-disposition", "attachment; filename=\"app.apk\"")
            .body(original.clone());
    });

    let client = client_for(&server);
    let uploaded = client.upload(&src, None).unwrap();
    let file_id = file_id_of(&uploaded).unwrap();
    let written = client.download(&file_id, out_dir.path()).unwrap();

    download_mock.assert();
    assert_eq!(written, out_dir.path().join("app.apk"));
    assert_eq!(std::fs::read(&written).unwrap(), original);
}

#[test]
fn test_with_config_trailing_slash_endpoint() {
    let server = MockServer::start();

    let list_mock = server.mock(|when, then| {
        when.method(GET).path("/storage/groups");
        then.status(200).json_body(serde_json::json!({"items": []}));
    });

    let creds = Credentials::new("sauce-user", "sauce-key").unwrap();
    let config = ClientConfig::default().with_api_base(format!("{}/", server.base_url()));
    let client = StorageClient::with_config(creds, config).unwrap();

    assert!(client.list_groups(&GroupQuery::default()).unwrap().is_success());
    list_mock.assert();
}

#[test]
fn test_timeout_applied_to_requests() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/storage/files");
        then.status(200)
            .delay(Duration::from_secs(3))
            .json_body(serde_json::json!({"items": []}));
    });

    let creds = Credentials::new("sauce-user", "sauce-key").unwrap();
    let config = ClientConfig::default()
        .with_api_base(server.base_url())
        .with_timeout(Duration::from_millis(300));
    let client = StorageClient::with_config(creds, config).unwrap();

    let err = client.list_files(&FileQuery::default()).unwrap_err();
    assert!(matches!(err, StorageError::Network(_)), "got {:?}", err);
}

#[test]
fn test_default_user_agent_sent() {
    let server = MockServer::start();

    let ua_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/storage/files")
            .header("user-agent", concat!("sauce-storage/", env!("CARGO_PKG_VERSION")));
        then.status(200).json_body(serde_json::json!({"items": []}));
    });

    client_for(&server).list_files(&FileQuery::default()).unwrap();
    ua_mock.assert();
}

#[test]
fn test_custom_user_agent_sent() {
    let server = MockServer::start();

    let ua_mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/storage/files/f1")
            .header("user-agent", "ci-uploader/2.0");
        then.status(200).json_body(serde_json::json!({"item": {"id": "f1"}}));
    });

    let creds = Credentials::new("sauce-user", "sauce-key").unwrap();
    let config = ClientConfig::default()
        .with_api_base(server.base_url())
        .with_user_agent("ci-uploader/2.0");
    StorageClient::with_config(creds, config).unwrap().delete_file("f1").unwrap();
    ua_mock.assert();
}

#[test]
fn test_unreachable_endpoint_is_network_error() {
    // Port 9 (discard) on loopback: nothing listens in CI.
    let client = StorageClient::with_endpoint("sauce-user", "sauce-key", "http://127.0.0.1:9").unwrap();
    let err = client.list_files(&FileQuery::default()).unwrap_err();
    assert!(matches!(err, StorageError::Network(_)), "got {:?}", err);
}
