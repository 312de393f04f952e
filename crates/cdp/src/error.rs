//! Driver error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdpError {
	/// The browser answered a command with an error object.
	#[error("protocol error {code}: {message}")]
	Protocol { code: i64, message: String },

	#[error("transport error: {0}")]
	Transport(String),

	/// The connection closed before a response arrived.
	#[error("connection closed")]
	ChannelClosed,

	/// Page script threw.
	#[error("evaluation failed: {0}")]
	Evaluation(String),

	/// No debuggable browser answered at the endpoint.
	#[error("CDP discovery failed: {0}")]
	Probe(String),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CdpError>;

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
	fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
		CdpError::Transport(err.to_string())
	}
}

impl From<CdpError> for lumo::Error {
	fn from(err: CdpError) -> Self {
		lumo::Error::view(err)
	}
}
