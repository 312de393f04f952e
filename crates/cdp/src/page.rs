//! A single attached tab.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::connection::Connection;
use crate::error::{CdpError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetInfo {
	target_id: String,
	#[serde(rename = "type")]
	kind: String,
	url: String,
}

/// Page-scoped command surface over a flattened target session.
#[derive(Debug, Clone)]
pub struct Page {
	connection: Arc<Connection>,
	target_id: String,
	session_id: String,
}

impl Page {
	/// Attaches to the first tab whose URL starts with `url`, opening one if
	/// none exists.
	pub async fn attach(connection: Arc<Connection>, url: &str) -> Result<Self> {
		let targets = connection.send_command("Target.getTargets", json!({}), None).await?;
		let infos: Vec<TargetInfo> = serde_json::from_value(targets.get("targetInfos").cloned().unwrap_or(Value::Null))?;

		let target_id = match infos.into_iter().find(|t| t.kind == "page" && t.url.starts_with(url)) {
			Some(existing) => {
				debug!(target = "lumo.cdp", url = %existing.url, "reusing open tab");
				existing.target_id
			}
			None => {
				info!(target = "lumo.cdp", %url, "opening tab");
				let created = connection.send_command("Target.createTarget", json!({ "url": url }), None).await?;
				string_field(&created, "targetId")?
			}
		};

		let attached = connection
			.send_command("Target.attachToTarget", json!({ "targetId": target_id, "flatten": true }), None)
			.await?;
		let session_id = string_field(&attached, "sessionId")?;
		debug!(target = "lumo.cdp", %target_id, %session_id, "attached");

		Ok(Self {
			connection,
			target_id,
			session_id,
		})
	}

	pub fn target_id(&self) -> &str {
		&self.target_id
	}

	pub async fn command(&self, method: &str, params: Value) -> Result<Value> {
		self.connection.send_command(method, params, Some(&self.session_id)).await
	}

	/// Evaluates `expression` and returns its JSON value (`null` for
	/// `undefined`). Promises are awaited.
	pub async fn evaluate(&self, expression: &str) -> Result<Value> {
		let response = self
			.command(
				"Runtime.evaluate",
				json!({ "expression": expression, "returnByValue": true, "awaitPromise": true }),
			)
			.await?;
		by_value(response)
	}

	/// Evaluates `expression` and returns a remote object id, or `None` when
	/// it yields `null`/`undefined`.
	pub async fn evaluate_handle(&self, expression: &str) -> Result<Option<String>> {
		let response = self
			.command("Runtime.evaluate", json!({ "expression": expression, "returnByValue": false }))
			.await?;
		check_exception(&response)?;
		Ok(response
			.pointer("/result/objectId")
			.and_then(Value::as_str)
			.map(str::to_string))
	}

	/// Calls `function` with `this` bound to the remote object `object_id`.
	pub async fn call_on(&self, object_id: &str, function: &str, args: &[Value]) -> Result<Value> {
		let arguments: Vec<Value> = args.iter().map(|value| json!({ "value": value })).collect();
		let response = self
			.command(
				"Runtime.callFunctionOn",
				json!({
					"objectId": object_id,
					"functionDeclaration": function,
					"arguments": arguments,
					"returnByValue": true,
					"awaitPromise": true,
				}),
			)
			.await?;
		by_value(response)
	}

	pub async fn bring_to_front(&self) -> Result<()> {
		self.command("Page.bringToFront", json!({})).await.map(drop)
	}

	/// Inserts `text` at the focused element as if typed.
	pub async fn insert_text(&self, text: &str) -> Result<()> {
		self.command("Input.insertText", json!({ "text": text })).await.map(drop)
	}

	pub async fn press_enter(&self) -> Result<()> {
		self.command(
			"Input.dispatchKeyEvent",
			json!({ "type": "keyDown", "key": "Enter", "code": "Enter", "windowsVirtualKeyCode": 13, "text": "\r" }),
		)
		.await?;
		self.command(
			"Input.dispatchKeyEvent",
			json!({ "type": "keyUp", "key": "Enter", "code": "Enter", "windowsVirtualKeyCode": 13 }),
		)
		.await
		.map(drop)
	}
}

fn string_field(value: &Value, field: &str) -> Result<String> {
	value
		.get(field)
		.and_then(Value::as_str)
		.map(str::to_string)
		.ok_or_else(|| CdpError::Evaluation(format!("response missing {field}")))
}

fn check_exception(response: &Value) -> Result<()> {
	match response.get("exceptionDetails") {
		Some(details) => {
			let message = details
				.pointer("/exception/description")
				.or_else(|| details.get("text"))
				.and_then(Value::as_str)
				.unwrap_or("script threw");
			Err(CdpError::Evaluation(message.to_string()))
		}
		None => Ok(()),
	}
}

fn by_value(response: Value) -> Result<Value> {
	check_exception(&response)?;
	Ok(response.pointer("/result/value").cloned().unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn by_value_unwraps_remote_object() {
		let response = json!({ "result": { "type": "boolean", "value": true } });
		assert_eq!(by_value(response).unwrap(), json!(true));
		assert_eq!(by_value(json!({ "result": { "type": "undefined" } })).unwrap(), Value::Null);
	}

	#[test]
	fn exceptions_surface_description() {
		let response = json!({
			"result": { "type": "object", "subtype": "error" },
			"exceptionDetails": { "text": "Uncaught", "exception": { "description": "TypeError: x is null" } }
		});
		match by_value(response) {
			Err(CdpError::Evaluation(message)) => assert_eq!(message, "TypeError: x is null"),
			other => panic!("unexpected: {other:?}"),
		}
	}
}
