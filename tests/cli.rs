use std::net::TcpListener;

use assert_cmd::Command;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reqdeck(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reqdeck").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("--data-dir")
        .arg(dir.path().join("data"));
    cmd
}

fn stdout(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

fn first_id(out: &str) -> String {
    out.lines().next().unwrap().split('\t').next().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_prints_normalized_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(query_param("q", "rust"))
        .and(body_string("ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-secret", "hidden")
                .set_body_json(json!({"hello": "world"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out = stdout(reqdeck(&dir).args([
        "send",
        "--url",
        &format!("{}/echo", server.uri()),
        "-X",
        "post",
        "--params",
        r#"[{"key":"q","value":"rust"}]"#,
        "--body",
        "ping",
    ]));

    assert!(out.starts_with("200 OK"));
    assert!(out.lines().next().unwrap().ends_with("success"));
    assert!(out.contains("content-type: application/json"));
    assert!(!out.contains("x-secret"));
    assert!(out.contains("\"hello\": \"world\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_json_and_save() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let saved = dir.path().join("out.json");
    let out = stdout(reqdeck(&dir).args(["send", "--url", &server.uri(), "--json", "--save"]).arg(&saved));

    let data: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(data["success"], true);
    assert_eq!(data["requestRun"]["id"], "direct-request");
    assert_eq!(data["requestRun"]["status"], 404);
    assert_eq!(data["requestRun"]["body"], "nope");

    let file: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(file["status"], 404);
}

#[test]
fn test_unreachable_host_reports_generic_failure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dir = tempfile::tempdir().unwrap();
    let assert = reqdeck(&dir)
        .args(["send", "--url", &format!("http://127.0.0.1:{}/", port)])
        .assert()
        .code(1);

    let output = assert.get_output();
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to send request."));
}

#[test]
fn test_send_requires_url_without_request_id() {
    let dir = tempfile::tempdir().unwrap();
    reqdeck(&dir).args(["send"]).assert().failure().code(2);
}

#[test]
fn test_request_add_requires_name_and_url() {
    let dir = tempfile::tempdir().unwrap();
    let assert = reqdeck(&dir)
        .args(["request", "add", "some-collection", "--url", "https://example.com"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Name and URL are required"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_saved_request_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(204).insert_header("etag", "v1"))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ws = first_id(&stdout(reqdeck(&dir).args(["workspace", "init"])));
    let col = first_id(&stdout(reqdeck(&dir).args(["collection", "create", &ws, "API"])));
    let req = first_id(&stdout(reqdeck(&dir).args([
        "request",
        "add",
        &col,
        "--name",
        "Remove item",
        "-X",
        "DELETE",
        "--url",
        &format!("{}/items/1", server.uri()),
    ])));

    let listed = stdout(reqdeck(&dir).args(["request", "list", &col]));
    assert!(listed.contains(&req));
    assert!(listed.contains("DELETE\tRemove item"));

    let out = stdout(reqdeck(&dir).args(["run", &req]));
    assert!(out.starts_with("204 No Content"));
    assert!(out.contains("etag: v1"));

    let linked = stdout(reqdeck(&dir).args(["send", "--request-id", &req]));
    assert!(linked.starts_with("204 No Content"));

    stdout(reqdeck(&dir).args(["request", "delete", &col, &req]));
    assert!(stdout(reqdeck(&dir).args(["request", "list", &col])).is_empty());
}

#[test]
fn test_workspace_init_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let first = stdout(reqdeck(&dir).args(["workspace", "init"]));
    let second = stdout(reqdeck(&dir).args(["workspace", "init"]));
    assert_eq!(first, second);
    assert!(first.contains("Personal Workspace"));

    let listed = stdout(reqdeck(&dir).args(["workspace", "list"]));
    assert_eq!(listed.lines().count(), 1);
}
