//! DevTools HTTP discovery.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{CdpError, Result};

/// `/json/version` response subset.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
	#[serde(rename = "webSocketDebuggerUrl")]
	pub web_socket_debugger_url: String,
	#[serde(rename = "Browser")]
	pub browser: Option<String>,
}

/// Resolves an endpoint to the browser-level WebSocket URL.
///
/// `ws://` and `wss://` endpoints are used as-is; anything else is treated
/// as the HTTP base of a DevTools server (`http://127.0.0.1:9222`).
pub async fn resolve_ws_url(endpoint: &str) -> Result<String> {
	if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
		return Ok(endpoint.to_string());
	}
	Ok(fetch_version(endpoint).await?.web_socket_debugger_url)
}

/// Fetches `/json/version` from `base`.
pub async fn fetch_version(base: &str) -> Result<VersionInfo> {
	let client = reqwest::Client::builder()
		.timeout(Duration::from_millis(2_000))
		.build()
		.map_err(|e| CdpError::Probe(format!("failed to create HTTP client: {e}")))?;

	let url = format!("{}/json/version", base.trim_end_matches('/'));
	let response = client
		.get(&url)
		.send()
		.await
		.map_err(|e| CdpError::Probe(format!("{url}: {e}")))?;
	if !response.status().is_success() {
		return Err(CdpError::Probe(format!("{url}: unexpected status {}", response.status())));
	}

	let info: VersionInfo = response
		.json()
		.await
		.map_err(|e| CdpError::Probe(format!("failed to parse {url}: {e}")))?;
	debug!(target = "lumo.cdp", browser = ?info.browser, "browser discovered");
	Ok(info)
}

/// Endpoint for a local browser started with `--remote-debugging-port`.
pub fn local_endpoint(port: u16) -> String {
	format!("http://127.0.0.1:{port}")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn websocket_endpoints_skip_discovery() {
		let url = "ws://127.0.0.1:9222/devtools/browser/abc";
		assert_eq!(resolve_ws_url(url).await.unwrap(), url);
	}

	#[test]
	fn version_info_parses_devtools_payload() {
		let info: VersionInfo = serde_json::from_str(
			r#"{"Browser":"Chrome/126.0","Protocol-Version":"1.3","webSocketDebuggerUrl":"ws://127.0.0.1:9222/devtools/browser/x"}"#,
		)
		.unwrap();
		assert_eq!(info.browser.as_deref(), Some("Chrome/126.0"));
		assert!(info.web_socket_debugger_url.ends_with("/browser/x"));
	}

	#[test]
	fn local_endpoint_uses_loopback() {
		assert_eq!(local_endpoint(9333), "http://127.0.0.1:9333");
	}
}
