//! CDP command/response correlation.
//!
//! Every command carries a sequential `id`; the browser echoes it in the
//! response. `send_command` parks a oneshot sender under that id and the
//! receive loop in [`Connection::run`] completes it. Frames without an id
//! are events; the driver polls instead of subscribing, so they are only
//! traced.
//!
//! Commands for a page go through a flattened session: the `sessionId`
//! returned by `Target.attachToTarget` rides along on each frame.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, error, trace, warn};

use crate::error::{CdpError, Result};
use crate::transport::{Transport, TransportParts, TransportReceiver};

/// Outgoing command frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Command<'a> {
	pub id: u32,
	pub method: &'a str,
	pub params: Value,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub session_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
	code: i64,
	message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Incoming {
	id: Option<u32>,
	result: Option<Value>,
	error: Option<ErrorPayload>,
	method: Option<String>,
	session_id: Option<String>,
}

type Callbacks = Arc<Mutex<HashMap<u32, oneshot::Sender<Result<Value>>>>>;

/// Shared, cloneable-by-`Arc` connection to one browser.
pub struct Connection {
	last_id: AtomicU32,
	callbacks: Callbacks,
	sender: Mutex<Box<dyn Transport>>,
	receiver: Mutex<Option<Box<dyn TransportReceiver>>>,
	message_rx: Mutex<Option<mpsc::UnboundedReceiver<Value>>>,
}

impl Connection {
	pub fn new(parts: TransportParts) -> Self {
		Self {
			last_id: AtomicU32::new(0),
			callbacks: Arc::new(Mutex::new(HashMap::new())),
			sender: Mutex::new(parts.sender),
			receiver: Mutex::new(Some(parts.receiver)),
			message_rx: Mutex::new(Some(parts.message_rx)),
		}
	}

	/// Sends `method` and waits for its response.
	///
	/// Ids start at 1. Fails with [`CdpError::Protocol`] when the browser
	/// answers with an error and [`CdpError::ChannelClosed`] when the receive
	/// loop ends first.
	pub async fn send_command(&self, method: &str, params: Value, session_id: Option<&str>) -> Result<Value> {
		let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
		let (tx, rx) = oneshot::channel();
		self.callbacks.lock().await.insert(id, tx);

		let frame = serde_json::to_value(Command {
			id,
			method,
			params,
			session_id,
		})?;
		trace!(target = "lumo.cdp", id, method, "send");
		if let Err(err) = self.sender.lock().await.send(frame).await {
			self.callbacks.lock().await.remove(&id);
			return Err(err);
		}

		rx.await.map_err(|_| CdpError::ChannelClosed)?
	}

	/// Runs the receive loop until the transport closes. Call once, from a
	/// spawned task.
	pub async fn run(&self) {
		let (Some(receiver), Some(mut message_rx)) = (self.receiver.lock().await.take(), self.message_rx.lock().await.take())
		else {
			warn!(target = "lumo.cdp", "receive loop already running");
			return;
		};

		let transport = tokio::spawn(async move {
			if let Err(err) = receiver.run().await {
				error!(target = "lumo.cdp", error = %err, "transport failed");
			}
		});

		while let Some(message) = message_rx.recv().await {
			match serde_json::from_value::<Incoming>(message) {
				Ok(incoming) => self.dispatch(incoming).await,
				Err(err) => warn!(target = "lumo.cdp", error = %err, "unparseable frame"),
			}
		}
		debug!(target = "lumo.cdp", "receive loop ended");

		// pending commands fail with ChannelClosed once their senders drop
		self.callbacks.lock().await.clear();
		let _ = transport.await;
	}

	async fn dispatch(&self, incoming: Incoming) {
		let Some(id) = incoming.id else {
			if let Some(method) = incoming.method {
				trace!(target = "lumo.cdp", %method, session = ?incoming.session_id, "event");
			}
			return;
		};

		let Some(callback) = self.callbacks.lock().await.remove(&id) else {
			warn!(target = "lumo.cdp", id, "response for unknown command");
			return;
		};

		let result = match incoming.error {
			Some(ErrorPayload { code, message }) => Err(CdpError::Protocol { code, message }),
			None => Ok(incoming.result.unwrap_or(Value::Null)),
		};
		let _ = callback.send(result);
	}
}

impl std::fmt::Debug for Connection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Connection")
			.field("last_id", &self.last_id.load(Ordering::Relaxed))
			.finish_non_exhaustive()
	}
}
