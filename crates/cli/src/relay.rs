//! Relay message retrieval.
//!
//! A relay URL points at an endpoint that serves one message in JSON, YAML,
//! HTML or plain text. The format is named by the URL's `format` query
//! parameter; the message is the first non-empty string value of the
//! document (or the tag-stripped body for HTML).

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{CliError, Result};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Returned when a document holds no usable string.
pub const NO_MESSAGE: &str = "No message found.";

static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[^>]+(>|$)").expect("tag pattern should compile"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayFormat {
	#[default]
	Json,
	Yaml,
	Html,
	Txt,
}

impl RelayFormat {
	fn parse(value: &str) -> Option<Self> {
		match value.to_ascii_lowercase().as_str() {
			"json" => Some(Self::Json),
			"yaml" => Some(Self::Yaml),
			"html" => Some(Self::Html),
			"txt" => Some(Self::Txt),
			_ => None,
		}
	}

	pub fn accept(self) -> &'static str {
		match self {
			Self::Json => "application/json",
			Self::Yaml => "application/x-yaml, text/yaml",
			Self::Html => "text/html",
			Self::Txt => "text/plain",
		}
	}
}

/// A validated relay URL and its negotiated format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRequest {
	pub url: Url,
	pub format: RelayFormat,
}

impl RelayRequest {
	/// Parses `raw`, which must be an http(s) URL carrying an `apikey`
	/// query parameter. Unknown or missing `format` values fall back to JSON.
	pub fn parse(raw: &str) -> Result<Self> {
		let url = Url::parse(raw).map_err(|err| CliError::Relay(format!("invalid url: {err}")))?;
		if !matches!(url.scheme(), "http" | "https") {
			return Err(CliError::Relay(format!("unsupported scheme {}", url.scheme())));
		}
		if !url.query_pairs().any(|(key, _)| key == "apikey") {
			return Err(CliError::Relay("url must carry an apikey= parameter".into()));
		}

		let format = url
			.query_pairs()
			.find(|(key, _)| key.eq_ignore_ascii_case("format"))
			.and_then(|(_, value)| RelayFormat::parse(&value))
			.unwrap_or_default();

		Ok(Self { url, format })
	}
}

/// Fetches the relay document and extracts its message.
pub async fn fetch_message(client: &reqwest::Client, request: &RelayRequest) -> Result<String> {
	info!(target = "lumo.relay", host = request.url.host_str().unwrap_or_default(), format = ?request.format, "fetching relay message");

	let response = client
		.get(request.url.clone())
		.header(reqwest::header::ACCEPT, request.format.accept())
		.timeout(FETCH_TIMEOUT)
		.send()
		.await?
		.error_for_status()?;

	let content_type = response
		.headers()
		.get(reqwest::header::CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.unwrap_or_default()
		.to_ascii_lowercase();
	let body = response.text().await?;
	debug!(target = "lumo.relay", %content_type, bytes = body.len(), "relay body received");

	extract_message(&body, &content_type, request.format)
}

/// Pulls the message out of a fetched body.
///
/// Each kind is chosen when either the response content type or the
/// requested format names it, checked in the order JSON, YAML, HTML, text.
pub fn extract_message(body: &str, content_type: &str, format: RelayFormat) -> Result<String> {
	let kind = body_kind(content_type, format);
	let message = match kind {
		RelayFormat::Json => {
			let document: serde_json::Value =
				serde_json::from_str(body).map_err(|err| CliError::Relay(format!("response is not valid JSON: {err}")))?;
			first_json_string(&document)
		}
		RelayFormat::Yaml => match serde_yaml::from_str::<serde_yaml::Value>(body) {
			Ok(document) => first_yaml_string(&document),
			// not a YAML document; the raw body is the message
			Err(_) => non_empty(body.trim()),
		},
		RelayFormat::Html => non_empty(TAGS.replace_all(body, "").trim()),
		RelayFormat::Txt => (!body.trim().is_empty()).then(|| body.to_string()),
	};
	Ok(message.unwrap_or_else(|| NO_MESSAGE.to_string()))
}

fn body_kind(content_type: &str, format: RelayFormat) -> RelayFormat {
	if content_type.contains("application/json") || format == RelayFormat::Json {
		RelayFormat::Json
	} else if content_type.contains("yaml") || format == RelayFormat::Yaml {
		RelayFormat::Yaml
	} else if content_type.contains("text/html") || format == RelayFormat::Html {
		RelayFormat::Html
	} else {
		RelayFormat::Txt
	}
}

fn non_empty(text: &str) -> Option<String> {
	(!text.is_empty()).then(|| text.to_string())
}

fn first_json_string(value: &serde_json::Value) -> Option<String> {
	use serde_json::Value;
	match value {
		Value::Object(map) => map.values().find_map(direct_json_string),
		Value::Array(items) => items.iter().find_map(direct_json_string),
		Value::String(text) => non_empty(text.trim()),
		Value::Null => None,
		other => Some(other.to_string()),
	}
}

fn direct_json_string(value: &serde_json::Value) -> Option<String> {
	value.as_str().and_then(|text| non_empty(text.trim()))
}

fn first_yaml_string(value: &serde_yaml::Value) -> Option<String> {
	use serde_yaml::Value;
	match value {
		Value::Mapping(map) => map.values().find_map(direct_yaml_string),
		Value::Sequence(items) => items.iter().find_map(direct_yaml_string),
		Value::String(text) => non_empty(text.trim()),
		Value::Bool(flag) => Some(flag.to_string()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

fn direct_yaml_string(value: &serde_yaml::Value) -> Option<String> {
	value.as_str().and_then(|text| non_empty(text.trim()))
}
