use std::sync::Arc;

use lumo::{Config, Projects, Session};
use serde_json::json;

use super::CommandOutput;
use crate::error::Result;

pub async fn new_chat(session: Arc<Session>, config: &Config) -> Result<CommandOutput> {
	Projects::new(session, config.layout.clone(), config.timings.clone())
		.start_new_chat()
		.await?;
	CommandOutput::new(&json!({ "started": true }))
}
