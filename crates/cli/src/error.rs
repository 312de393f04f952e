use std::path::PathBuf;

use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Lumo(#[from] lumo::Error),

	#[error("cannot reach browser: {0}")]
	Connect(#[from] lumo_cdp::CdpError),

	#[error("config {}: {source:#}", .path.display())]
	Config {
		path: PathBuf,
		#[source]
		source: anyhow::Error,
	},

	#[error("relay: {0}")]
	Relay(String),

	#[error("relay fetch failed: {0}")]
	Fetch(#[from] reqwest::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::Lumo(err) => match err {
				lumo::Error::NotAuthenticated => ErrorCode::NotAuthenticated,
				lumo::Error::Busy => ErrorCode::Busy,
				lumo::Error::InputNotFound { .. } => ErrorCode::InputNotFound,
				lumo::Error::ElementNotFound(_) => ErrorCode::ElementNotFound,
				lumo::Error::InvalidInput(_) => ErrorCode::InvalidInput,
				lumo::Error::NoInitialReply => ErrorCode::NoReply,
				lumo::Error::ToggleNotApplied { .. } => ErrorCode::ToggleFailed,
				lumo::Error::Timeout { .. } => ErrorCode::Timeout,
				lumo::Error::View(_) => ErrorCode::ViewError,
			},
			CliError::Connect(_) => ErrorCode::ConnectFailed,
			CliError::Config { .. } => ErrorCode::ConfigError,
			CliError::Relay(_) | CliError::Fetch(_) => ErrorCode::RelayFailed,
			CliError::Io(_) => ErrorCode::IoError,
			CliError::Json(_) => ErrorCode::InternalError,
		}
	}

	pub fn to_command_error(&self) -> CommandError {
		let details = match self {
			CliError::Lumo(lumo::Error::InputNotFound { candidates }) => Some(serde_json::json!({ "candidates": candidates })),
			_ => None,
		};
		CommandError {
			code: self.code(),
			message: self.to_string(),
			details,
		}
	}
}
