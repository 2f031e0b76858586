//! End-to-end tests of the `idm` binary.

use std::path::Path;
use std::process::Output;

use axum::Json;
use axum::Router;
use axum::routing::post;
use serde_json::{Value, json};
use tokio::process::Command;

fn idm(config: &Path) -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_idm"));
	cmd.arg("--config").arg(config).env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}

fn stdout_json(output: &Output) -> Value {
	serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
		panic!(
			"stdout is not JSON ({err}): {}\nstderr: {}",
			String::from_utf8_lossy(&output.stdout),
			String::from_utf8_lossy(&output.stderr)
		)
	})
}

/// Batch endpoint knowing only user `alice`.
async fn serve() -> String {
	let router = Router::new().route(
		"/ipa/session/json",
		post(|Json(body): Json<Value>| async move {
			let results: Vec<Value> = body["params"][0]
				.as_array()
				.cloned()
				.unwrap_or_default()
				.iter()
				.map(|command| match command["params"][0][0].as_str() {
					Some("alice") => json!({"result": {"uid": ["alice"]}, "value": "alice", "summary": null, "error": null}),
					Some(uid) => json!({"error": {"code": 4001, "name": "NotFound", "message": format!("{uid}: user not found")}}),
					None => json!({"error": {"code": 3005, "name": "RequirementError", "message": "'uid' is required"}}),
				})
				.collect();
			Json(json!({
				"result": {"count": results.len(), "results": results},
				"error": null,
				"id": body["id"],
				"principal": "admin@EXAMPLE.TEST",
				"version": "4.12.2"
			}))
		}),
	);
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		axum::serve(listener, router).await.unwrap();
	});
	format!("http://{addr}")
}

#[tokio::test]
async fn config_set_then_show() {
	let dir = tempfile::tempdir().unwrap();
	let config = dir.path().join("config.json");

	let set = idm(&config).args(["config", "set", "server", "https://ipa.example.test"]).output().await.unwrap();
	assert!(set.status.success(), "{}", String::from_utf8_lossy(&set.stderr));
	assert!(config.exists());

	let show = idm(&config).args(["-f", "json", "config", "show", "--timeout", "7"]).output().await.unwrap();
	let effective = stdout_json(&show);
	assert_eq!(effective["server"], "https://ipa.example.test/");
	assert_eq!(effective["apiVersion"], "2.251");
	assert_eq!(effective["timeoutSecs"], 7);
}

#[tokio::test]
async fn invalid_config_value_fails() {
	let dir = tempfile::tempdir().unwrap();
	let config = dir.path().join("config.json");

	let output = idm(&config).args(["config", "set", "timeout-secs", "soon"]).output().await.unwrap();
	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).contains("invalid timeout"));
	assert!(!config.exists());
}

#[tokio::test]
async fn exec_without_server_explains_how_to_set_one() {
	let dir = tempfile::tempdir().unwrap();
	let output = idm(&dir.path().join("config.json")).args(["exec", "ping"]).output().await.unwrap();
	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).contains("no server configured"));
}

#[tokio::test]
async fn batch_reports_each_command_in_order() {
	let server = serve().await;
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("batch.ndjson");
	std::fs::write(
		&input,
		"{\"method\": \"user_show\", \"args\": [\"alice\"]}\n{\"method\": \"user_show\", \"args\": [\"ghost\"]}\n",
	)
	.unwrap();

	let output = idm(&dir.path().join("config.json"))
		.args(["-f", "json", "--server", server.as_str(), "batch", "--file"])
		.arg(&input)
		.output()
		.await
		.unwrap();

	assert_eq!(output.status.code(), Some(2), "per-command failure exits with 2");
	let report = stdout_json(&output);
	assert_eq!(report["ok"], false);
	assert_eq!(report["results"][0]["ok"], true);
	assert_eq!(report["results"][0]["result"]["uid"][0], "alice");
	assert_eq!(report["results"][1]["error"]["code"], 4001);
}

#[tokio::test]
async fn bulk_delete_prints_summary() {
	let server = serve().await;
	let dir = tempfile::tempdir().unwrap();

	let output = idm(&dir.path().join("config.json"))
		.args(["--server", server.as_str(), "bulk", "delete", "user", "alice", "bob"])
		.output()
		.await
		.unwrap();

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert_eq!(output.status.code(), Some(2));
	assert!(stdout.starts_with("1 of 2 deleted; 1 failed: bob"), "{stdout}");
}

#[tokio::test]
async fn exec_prints_payload() {
	let server = serve().await;
	let dir = tempfile::tempdir().unwrap();

	let output = idm(&dir.path().join("config.json"))
		.args(["--server", server.as_str(), "exec", "user_show", "alice", "-o", "all=true"])
		.output()
		.await
		.unwrap();

	assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("user_show(\"alice\")"));
	assert!(stdout.contains("\"uid\""));
}
