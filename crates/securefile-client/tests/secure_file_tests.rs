//! Secure file client tests against a mock Cerberus server
//!
//! Run with: cargo test --package securefile-client --test secure_file_tests

use rstest::rstest;
use securefile_client::{Config, SecureFileClient, SecureFilesResponse};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_REPLY: &str = r#"{
    "has_next" : false,
    "next_offset" : null,
    "limit" : 1000,
    "offset" : 0,
    "file_count_in_result" : 1,
    "total_file_count" : 1,
    "secure_file_summaries" : [ {
      "sdbox_id" : "3f40b0ca-f7e4-4e38-bf1f-c36e05e1856f",
      "path" : "godmiljaar/README.md",
      "size_in_bytes" : 3296,
      "name" : "README.md",
      "created_by" : "jane.doe@example.com",
      "created_ts" : "2018-06-14T10:34:55.057Z",
      "last_updated_by" : "jane.doe@example.com",
      "last_updated_ts" : "2018-06-14T10:34:55.057Z"
    } ]
}"#;

/// Nothing listens here
const DEAD_ENDPOINT: &str = "http://127.0.0.1:1";

fn client_for(server: &MockServer) -> SecureFileClient {
    SecureFileClient::new(Config::new(server.uri()).with_token("a-cool-token")).unwrap()
}

fn file_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Pull (part headers, content) out of a single-part multipart body
fn single_part(body: &[u8], boundary: &str) -> (String, Vec<u8>) {
    let opening = format!("--{}\r\n", boundary);
    let closing = format!("\r\n--{}--\r\n", boundary);
    assert!(body.starts_with(opening.as_bytes()), "body must open with the boundary");
    assert!(body.ends_with(closing.as_bytes()), "body must end with the closing boundary");

    let inner = &body[opening.len()..body.len() - closing.len()];
    let delimiter = format!("\r\n--{}", boundary);
    assert!(
        !inner.windows(delimiter.len()).any(|w| w == delimiter.as_bytes()),
        "expected exactly one part"
    );

    let split = inner
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("part headers are terminated");
    (
        String::from_utf8(inner[..split].to_vec()).unwrap(),
        inner[split + 4..].to_vec(),
    )
}

// ==================== List ====================

#[tokio::test]
async fn test_list_valid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secure-files"))
        .and(header("x-cerberus-token", "a-cool-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIST_REPLY))
        .expect(1)
        .mount(&server)
        .await;

    let files = client_for(&server).list_all().await.unwrap();

    let expected: SecureFilesResponse = serde_json::from_str(LIST_REPLY).unwrap();
    assert_eq!(files, expected);
    assert_eq!(files.file_count_in_result as usize, files.len());
    assert_eq!(files.secure_file_summaries[0].name, "README.md");
}

#[tokio::test]
async fn test_list_under_root_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secure-files/godmiljaar"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIST_REPLY))
        .expect(1)
        .mount(&server)
        .await;

    let files = client_for(&server).list("godmiljaar").await.unwrap();
    assert_eq!(files.total_file_count, 1);
}

#[tokio::test]
async fn test_list_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secure-files"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).list("").await.unwrap_err();

    assert!(err.is_unexpected_status());
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_list_undecodable_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secure-files"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"has_next\": \"maybe\"}"))
        .mount(&server)
        .await;

    let err = client_for(&server).list("").await.unwrap_err();

    assert!(err.is_malformed_response());
    assert!(!err.is_unexpected_status());
}

#[tokio::test]
async fn test_list_unreachable_server() {
    let client = SecureFileClient::with_endpoint(DEAD_ENDPOINT).unwrap();

    let err = client.list_all().await.unwrap_err();
    assert!(err.is_transport());
}

// ==================== Get ====================

#[tokio::test]
async fn test_get_saves_under_server_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secure-file/test/file/hello.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/octet-stream")
                .insert_header("Content-Disposition", "attachment; filename=\"hello.txt\"")
                .set_body_bytes(b"hello world".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let saved = client_for(&server)
        .get("/test/file/hello.txt", dir.path())
        .await
        .unwrap();

    assert_eq!(saved, dir.path().join("hello.txt"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"hello world");
}

#[tokio::test]
async fn test_get_ignores_requested_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secure-file/app/alias.pem"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"cert.pem\"")
                .set_body_bytes(b"-----BEGIN CERTIFICATE-----".to_vec()),
        )
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    client_for(&server).get("app/alias.pem", dir.path()).await.unwrap();

    assert!(dir.path().join("cert.pem").exists());
    assert!(!dir.path().join("alias.pem").exists());
}

#[tokio::test]
async fn test_get_server_error_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(500)
                .insert_header("Content-Disposition", "attachment; filename=\"hello.txt\"")
                .set_body_bytes(b"hello world".to_vec()),
        )
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let err = client_for(&server)
        .get("/test/file/hello.txt", dir.path())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("/test/file/hello.txt"));
    assert_eq!(file_count(dir.path()), 0);
}

#[rstest]
#[case::no_header(None)]
#[case::no_filename(Some("attachment"))]
#[case::garbage(Some("attachment; filename=\"unterminated"))]
#[tokio::test]
async fn test_get_without_filename_is_malformed(#[case] disposition: Option<&str>) {
    let server = MockServer::start().await;
    let mut template = ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec());
    if let Some(value) = disposition {
        template = template.insert_header("Content-Disposition", value);
    }
    Mock::given(method("GET"))
        .respond_with(template)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let err = client_for(&server)
        .get("/test/file/hello.txt", dir.path())
        .await
        .unwrap_err();

    assert!(err.is_malformed_response(), "got {err}");
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn test_get_unreachable_server() {
    let dir = tempfile::tempdir().unwrap();
    let client = SecureFileClient::with_endpoint(DEAD_ENDPOINT).unwrap();

    let err = client.get("/test/file/hello.txt", dir.path()).await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(file_count(dir.path()), 0);
}

// ==================== Put ====================

#[tokio::test]
async fn test_put_sends_single_part_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/secure-file/app/config/secret.txt"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("secret.txt");
    let content = b"B\x00\xffline\r\n--not-a-boundary".to_vec();
    std::fs::write(&local, &content).unwrap();

    client_for(&server)
        .put("app/config/secret.txt", &local)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("multipart content type");

    let (part_headers, part_content) = single_part(&requests[0].body, boundary);
    assert!(part_headers
        .contains(r#"Content-Disposition: form-data; name="file-content"; filename="secret.txt""#));
    assert_eq!(part_content, content);
}

#[tokio::test]
async fn test_put_uses_local_base_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("local-name.txt");
    std::fs::write(&local, b"data").unwrap();

    client_for(&server)
        .put("app/remote-name.txt", &local)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("filename=\"local-name.txt\""));
    assert!(!body.contains("remote-name.txt"));
}

#[rstest]
#[case::fragment_marker("app/notes#1.txt", "/v1/secure-file/app/notes%231.txt")]
#[case::query_marker("app/what?.txt", "/v1/secure-file/app/what%3F.txt")]
#[case::percent_sign("app/100%.txt", "/v1/secure-file/app/100%25.txt")]
#[case::space("app/my notes.txt", "/v1/secure-file/app/my%20notes.txt")]
#[tokio::test]
async fn test_put_encodes_reserved_characters(#[case] remote: &str, #[case] expected: &str) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("secret.txt");
    std::fs::write(&local, b"B").unwrap();

    client_for(&server).put(remote, &local).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), expected);
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_get_encodes_reserved_characters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"notes.txt\"")
                .set_body_bytes(b"notes".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    client_for(&server)
        .get("app/notes#1?.txt", dir.path())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), "/v1/secure-file/app/notes%231%3F.txt");
    assert_eq!(requests[0].url.query(), None);
}

#[rstest]
#[case::ok_is_not_enough(200)]
#[case::created_is_not_enough(201)]
#[case::server_error(500)]
#[tokio::test]
async fn test_put_requires_no_content(#[case] status: u16) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("secret.txt");
    std::fs::write(&local, b"B").unwrap();

    let err = client_for(&server)
        .put("app/secret.txt", &local)
        .await
        .unwrap_err();

    assert!(err.is_unexpected_status());
    assert_eq!(err.status(), Some(status));
    assert!(err.to_string().contains("app/secret.txt"));
}

#[tokio::test]
async fn test_put_missing_local_file_never_calls_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let err = client_for(&server)
        .put("app/secret.txt", dir.path().join("missing.txt"))
        .await
        .unwrap_err();

    assert!(err.is_local_io());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_put_unreachable_server() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("secret.txt");
    std::fs::write(&local, b"B").unwrap();
    let client = SecureFileClient::with_endpoint(DEAD_ENDPOINT).unwrap();

    let err = client.put("app/secret.txt", &local).await.unwrap_err();
    assert!(err.is_transport());
}
