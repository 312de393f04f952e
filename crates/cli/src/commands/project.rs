use std::sync::Arc;

use lumo::{Config, Projects, Session};
use serde::Serialize;

use super::CommandOutput;
use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
	pub name: String,
	pub action: &'static str,
}

fn projects(session: Arc<Session>, config: &Config) -> Projects {
	Projects::new(session, config.layout.clone(), config.timings.clone())
}

pub async fn create(session: Arc<Session>, config: &Config, name: &str, instructions: Option<&str>) -> Result<CommandOutput> {
	projects(session, config).create_project(name, instructions).await?;
	CommandOutput::new(&ProjectData {
		name: name.to_string(),
		action: "created",
	})
}

pub async fn open(session: Arc<Session>, config: &Config, name: &str) -> Result<CommandOutput> {
	projects(session, config).open_project(name).await?;
	CommandOutput::new(&ProjectData {
		name: name.to_string(),
		action: "opened",
	})
}
