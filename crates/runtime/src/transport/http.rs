use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, REFERER};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{Transport, TransportFuture};
use crate::error::{Error, Result};

/// Path of the session JSON-RPC endpoint relative to the server root.
pub const JSON_ENDPOINT_PATH: &str = "/ipa/session/json";

/// Path the server expects in the `Referer` header.
const REFERER_PATH: &str = "/ipa";

/// Longest error body kept in [`Error::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
	/// Server root, e.g. `https://ipa.example.test`.
	pub server: Url,
	/// Per-request timeout. `None` leaves it to the underlying client.
	pub timeout: Option<Duration>,
	/// Prebuilt client carrying cookies, auth or TLS settings.
	pub client: Option<reqwest::Client>,
	/// Extra headers sent with every request.
	pub headers: Vec<(String, String)>,
}

impl HttpTransportConfig {
	pub fn new(server: Url) -> Self {
		Self {
			server,
			timeout: None,
			client: None,
			headers: Vec::new(),
		}
	}

	/// Parses the server root URL.
	pub fn parse(server: &str) -> Result<Self> {
		let url = Url::parse(server).map_err(|e| Error::InvalidConfig(format!("invalid server URL '{server}': {e}")))?;
		Ok(Self::new(url))
	}

	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn client(mut self, client: reqwest::Client) -> Self {
		self.client = Some(client);
		self
	}

	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));
		self
	}
}

/// POSTs request bodies to the server's JSON endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
	endpoint: Url,
	referer: HeaderValue,
	headers: HeaderMap,
	timeout: Option<Duration>,
}

impl HttpTransport {
	pub fn new(config: HttpTransportConfig) -> Result<Self> {
		let HttpTransportConfig {
			server,
			timeout,
			client,
			headers,
		} = config;

		if server.cannot_be_a_base() {
			return Err(Error::InvalidConfig(format!("server URL '{server}' cannot be a base URL")));
		}

		let endpoint = server
			.join(JSON_ENDPOINT_PATH)
			.map_err(|e| Error::InvalidConfig(format!("cannot build endpoint from '{server}': {e}")))?;
		let referer = server
			.join(REFERER_PATH)
			.map_err(|e| Error::InvalidConfig(format!("cannot build referer from '{server}': {e}")))?;
		let referer = HeaderValue::from_str(referer.as_str()).map_err(|e| Error::InvalidConfig(format!("invalid referer: {e}")))?;

		let mut header_map = HeaderMap::new();
		for (name, value) in headers {
			let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidConfig(format!("invalid header name '{name}': {e}")))?;
			let value = HeaderValue::from_str(&value).map_err(|e| Error::InvalidConfig(format!("invalid value for header '{name}': {e}")))?;
			header_map.insert(name, value);
		}

		let client = match client {
			Some(client) => client,
			None => reqwest::Client::builder().build()?,
		};

		debug!(target: "idm.rpc", endpoint = %endpoint, "http transport ready");

		Ok(Self {
			client,
			endpoint,
			referer,
			headers: header_map,
			timeout,
		})
	}

	/// Full URL requests are posted to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	async fn post(&self, body: Value) -> Result<Value> {
		let mut request = self
			.client
			.post(self.endpoint.clone())
			.headers(self.headers.clone())
			.header(REFERER, self.referer.clone())
			.header(ACCEPT, "application/json")
			.json(&body);
		if let Some(timeout) = self.timeout {
			request = request.timeout(timeout);
		}

		let response = request.send().await.inspect_err(|e| {
			warn!(target: "idm.rpc", endpoint = %self.endpoint, error = %e, "request failed");
		})?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			warn!(target: "idm.rpc", endpoint = %self.endpoint, status = status.as_u16(), "non-success status");
			return Err(Error::Status {
				status: status.as_u16(),
				body: truncate(body, MAX_ERROR_BODY),
			});
		}

		let bytes = response.bytes().await?;
		Ok(serde_json::from_slice(&bytes)?)
	}
}

impl Transport for HttpTransport {
	fn call(&self, body: Value) -> TransportFuture<'_> {
		Box::pin(self.post(body))
	}
}

fn truncate(mut text: String, max: usize) -> String {
	if text.len() > max {
		let mut end = max;
		while !text.is_char_boundary(end) {
			end -= 1;
		}
		text.truncate(end);
		text.push('…');
	}
	text
}

#[cfg(test)]
mod unit_tests {
	use super::*;

	#[test]
	fn endpoint_and_referer_are_rooted_at_server() {
		let transport = HttpTransport::new(HttpTransportConfig::parse("https://ipa.example.test/some/page").unwrap()).unwrap();
		assert_eq!(transport.endpoint().as_str(), "https://ipa.example.test/ipa/session/json");
		assert_eq!(transport.referer.to_str().unwrap(), "https://ipa.example.test/ipa");
	}

	#[test]
	fn rejects_unusable_server_urls() {
		assert!(matches!(HttpTransportConfig::parse("not a url"), Err(Error::InvalidConfig(_))));
		let config = HttpTransportConfig::new(Url::parse("mailto:admin@example.test").unwrap());
		assert!(matches!(HttpTransport::new(config), Err(Error::InvalidConfig(_))));
	}

	#[test]
	fn rejects_invalid_header_names() {
		let config = HttpTransportConfig::parse("https://ipa.example.test").unwrap().header("bad header", "x");
		assert!(matches!(HttpTransport::new(config), Err(Error::InvalidConfig(_))));
	}

	#[test]
	fn truncate_respects_char_boundaries() {
		assert_eq!(truncate("short".to_string(), 10), "short");
		assert_eq!(truncate("ééé".to_string(), 3), "é…");
	}
}
