use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};
use url::Url;

use super::*;
use crate::client::{BatchClient, ClientConfig};
use crate::error::Error;
use crate::transport::mock::{batch_body, batched_commands, error_element, ok_element};
use idm_protocol::Command;

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn serve(router: Router) -> Url {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		axum::serve(listener, router).await.unwrap();
	});
	Url::parse(&format!("http://{addr}")).unwrap()
}

/// Emulates the server's JSON endpoint: requires the Referer header and
/// answers `user_show` for "alice" only.
async fn json_endpoint(headers: HeaderMap, Json(body): Json<Value>) -> std::result::Result<Json<Value>, (StatusCode, String)> {
	let referer = headers.get("referer").and_then(|v| v.to_str().ok()).unwrap_or_default();
	if !referer.ends_with("/ipa") {
		return Err((StatusCode::BAD_REQUEST, "missing referer".to_string()));
	}
	if body["method"] != "batch" {
		return Err((StatusCode::BAD_REQUEST, "expected batch".to_string()));
	}

	let elements = batched_commands(&body)
		.into_iter()
		.map(|(_, args, _)| match args.first().and_then(Value::as_str) {
			Some("alice") => ok_element(json!({"uid": ["alice"]}), "alice"),
			Some(uid) => error_element(4001, "NotFound", &format!("{uid}: user not found")),
			None => error_element(3005, "RequirementError", "'uid' is required"),
		})
		.collect();
	Ok(Json(batch_body(elements)))
}

fn http_client(server: Url) -> BatchClient {
	let transport = HttpTransport::new(HttpTransportConfig::new(server)).unwrap();
	BatchClient::new(transport, ClientConfig::default())
}

#[tokio::test]
async fn round_trip_over_http() {
	init_tracing();
	let server = serve(Router::new().route(JSON_ENDPOINT_PATH, post(json_endpoint))).await;
	let client = http_client(server);

	let response = client
		.execute(vec![Command::new("user_show").arg("alice"), Command::new("user_show").arg("ghost")])
		.await
		.unwrap();

	assert_eq!(response.len(), 2);
	assert!(response.get(0).unwrap().is_ok());
	assert!(response.get(1).unwrap().as_ref().unwrap_err().is_not_found());
	assert_eq!(response.principal(), Some("admin@EXAMPLE.TEST"));
}

#[tokio::test]
async fn server_error_status_fails_batch() {
	init_tracing();
	let router = Router::new().route(
		JSON_ENDPOINT_PATH,
		post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error") }),
	);
	let client = http_client(serve(router).await);

	let err = client.execute(vec![Command::new("user_show").arg("alice")]).await.unwrap_err();
	match err {
		Error::Status { status, body } => {
			assert_eq!(status, 500);
			assert_eq!(body, "Internal Server Error");
		}
		other => panic!("expected Status, got {other:?}"),
	}
}

#[tokio::test]
async fn unauthorized_is_a_transport_error() {
	let router = Router::new().route(JSON_ENDPOINT_PATH, post(|| async { StatusCode::UNAUTHORIZED }));
	let client = http_client(serve(router).await);

	let err = client.execute(vec![Command::new("user_find")]).await.unwrap_err();
	assert!(matches!(err, Error::Status { status: 401, .. }), "got {err:?}");
}

#[tokio::test]
async fn non_json_body_fails_batch() {
	let router = Router::new().route(JSON_ENDPOINT_PATH, post(|| async { "<html>login</html>" }));
	let client = http_client(serve(router).await);

	let err = client.execute(vec![Command::new("user_find")]).await.unwrap_err();
	assert!(matches!(err, Error::Json(_)), "got {err:?}");
	assert!(err.is_protocol());
}

#[tokio::test]
async fn truncated_results_over_http() {
	let router = Router::new().route(
		JSON_ENDPOINT_PATH,
		post(|| async { Json(batch_body(vec![ok_element(json!({}), "alice")])) }),
	);
	let client = http_client(serve(router).await);

	let err = client
		.execute(vec![Command::new("user_show").arg("alice"), Command::new("user_show").arg("bob")])
		.await
		.unwrap_err();
	assert!(matches!(err, Error::LengthMismatch { expected: 2, actual: 1 }), "got {err:?}");
}

#[tokio::test]
async fn slow_server_hits_transport_timeout() {
	let router = Router::new().route(
		JSON_ENDPOINT_PATH,
		post(|| async {
			tokio::time::sleep(Duration::from_secs(5)).await;
			Json(batch_body(Vec::new()))
		}),
	);
	let server = serve(router).await;
	let transport = HttpTransport::new(HttpTransportConfig::new(server).timeout(Duration::from_millis(100))).unwrap();
	let client = BatchClient::new(transport, ClientConfig::default());

	let err = client.execute(vec![Command::new("user_find")]).await.unwrap_err();
	assert!(err.is_timeout(), "got {err:?}");
}

#[tokio::test]
async fn configured_headers_are_sent() {
	let router = Router::new().route(
		JSON_ENDPOINT_PATH,
		post(|headers: HeaderMap, Json(body): Json<Value>| async move {
			let lang = headers.get("accept-language").and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
			let count = batched_commands(&body).len();
			let elements = (0..count).map(|_| ok_element(json!({"lang": lang}), Value::Null)).collect();
			Json(batch_body(elements))
		}),
	);
	let server = serve(router).await;
	let transport = HttpTransport::new(HttpTransportConfig::new(server).header("Accept-Language", "de")).unwrap();
	let client = BatchClient::new(transport, ClientConfig::default());

	let reply = client.execute_single(Command::new("ping")).await.unwrap().unwrap();
	assert_eq!(reply.result["lang"], "de");
}

#[tokio::test]
async fn connection_refused_is_http_error() {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	drop(listener);

	let client = http_client(Url::parse(&format!("http://{addr}")).unwrap());
	let err = client.execute(vec![Command::new("ping")]).await.unwrap_err();
	assert!(matches!(err, Error::Http(_)), "got {err:?}");
}
