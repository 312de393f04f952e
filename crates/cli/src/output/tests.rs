use std::path::PathBuf;

use serde_json::{Value, json};

use super::*;

#[test]
fn success_envelope_is_camel_case() {
	let result = ResultBuilder::new("send")
		.data(json!({ "prompt": "hi", "response": "Hello" }))
		.duration_ms(42)
		.config(EffectiveConfig {
			endpoint: "http://127.0.0.1:9222".into(),
			endpoint_source: EndpointSource::Default,
			service_url: "https://lumo.proton.me/chat".into(),
			config_path: None,
		})
		.build();

	let value = serde_json::to_value(&result).unwrap();
	assert_eq!(value["ok"], true);
	assert_eq!(value["command"], "send");
	assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
	assert_eq!(value["durationMs"], 42);
	assert_eq!(value["data"]["response"], "Hello");
	assert_eq!(value["config"]["endpointSource"], "default");
	assert!(value.get("error").is_none());
	assert!(value.get("diagnostics").is_none());
	assert!(value["config"].get("configPath").is_none());
}

#[test]
fn failure_envelope_carries_code() {
	let result: EmptyResult = ResultBuilder::new("relay")
		.error(ErrorCode::RelayFailed, "url must carry an apikey= parameter")
		.build();

	assert!(!result.ok);
	let value = serde_json::to_value(&result).unwrap();
	assert_eq!(value["error"]["code"], "RELAY_FAILED");
	assert!(value.get("data").is_none());
}

#[test]
fn data_with_error_is_not_ok() {
	let result = ResultBuilder::new("dialogue")
		.data(Value::Null)
		.error(ErrorCode::NoReply, "no reply received for the initial prompt")
		.build();
	assert!(!result.ok);
}

#[test]
fn diagnostics_keep_order() {
	let result = ResultBuilder::new("dialogue")
		.data(json!({}))
		.diagnostic(DiagnosticLevel::Info, "stopped after 2 of 30 turns")
		.diagnostic(DiagnosticLevel::Warning, "turn 2 skipped")
		.build();

	let value = serde_json::to_value(&result).unwrap();
	assert_eq!(value["diagnostics"][0]["level"], "info");
	assert_eq!(value["diagnostics"][1]["level"], "warning");
}

#[test]
fn error_code_display_matches_serde() {
	for code in [ErrorCode::NotAuthenticated, ErrorCode::InputNotFound, ErrorCode::ToggleFailed, ErrorCode::ConnectFailed] {
		let serialized = serde_json::to_value(code).unwrap();
		assert_eq!(serialized, Value::String(code.to_string()));
	}
}

#[test]
fn format_parses_case_insensitively() {
	assert_eq!("NDJSON".parse::<OutputFormat>().unwrap(), OutputFormat::Ndjson);
	assert_eq!(OutputFormat::Text.to_string(), "text");
	assert!("toon".parse::<OutputFormat>().is_err());
}

#[test]
fn config_path_is_serialized_when_known() {
	let config = EffectiveConfig {
		endpoint: "ws://127.0.0.1:9222/devtools/browser/abc".into(),
		endpoint_source: EndpointSource::CliFlag,
		service_url: "https://lumo.proton.me/chat".into(),
		config_path: Some(PathBuf::from("/home/me/.config/lumo/config.json")),
	};
	let value = serde_json::to_value(&config).unwrap();
	assert_eq!(value["endpointSource"], "cli_flag");
	assert_eq!(value["configPath"], "/home/me/.config/lumo/config.json");
}
