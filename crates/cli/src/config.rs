//! Settings file loading and command-line overrides.
//!
//! The file lives at `<config dir>/lumo/config.json` unless `--config`
//! names another. It holds the orchestration [`lumo::Config`] plus the
//! browser endpoint and service URL; every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::output::{EffectiveConfig, EndpointSource};

/// Remote debugging port assumed when nothing else is configured.
pub const DEFAULT_DEBUG_PORT: u16 = 9222;

/// On-disk settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsFile {
	pub cdp_endpoint: Option<String>,
	pub service_url: Option<String>,
	#[serde(flatten)]
	pub lumo: lumo::Config,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
	pub endpoint: String,
	pub endpoint_source: EndpointSource,
	pub service_url: String,
	pub config_path: Option<PathBuf>,
	pub lumo: lumo::Config,
}

pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("lumo").join("config.json"))
}

/// Reads the settings file.
///
/// A missing file at the default location yields defaults; a missing file
/// the user named explicitly is an error, and so is malformed JSON.
pub fn load_file(path: &Path, explicit: bool) -> Result<SettingsFile> {
	let raw = match fs::read_to_string(path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
			debug!(target = "lumo.config", path = %path.display(), "no settings file, using defaults");
			return Ok(SettingsFile::default());
		}
		Err(err) => {
			return Err(CliError::Config {
				path: path.to_path_buf(),
				source: anyhow::Error::new(err).context("cannot read settings file"),
			});
		}
	};

	serde_json::from_str(&raw)
		.context("malformed settings file")
		.map_err(|source| CliError::Config {
			path: path.to_path_buf(),
			source,
		})
}

impl Settings {
	/// Resolves settings from the file and `cli` overrides.
	///
	/// Endpoint precedence: `--cdp-endpoint`, `--port`, file, default port.
	pub fn resolve(cli: &Cli) -> Result<Self> {
		let (path, explicit) = match &cli.config {
			Some(path) => (Some(path.clone()), true),
			None => (default_config_path(), false),
		};
		let file = match &path {
			Some(path) => load_file(path, explicit)?,
			None => SettingsFile::default(),
		};
		Ok(Self::merge(file, cli, path))
	}

	fn merge(file: SettingsFile, cli: &Cli, config_path: Option<PathBuf>) -> Self {
		let (endpoint, endpoint_source) = if let Some(endpoint) = &cli.cdp_endpoint {
			(endpoint.clone(), EndpointSource::CliFlag)
		} else if let Some(port) = cli.port {
			(lumo_cdp::probe::local_endpoint(port), EndpointSource::Port)
		} else if let Some(endpoint) = file.cdp_endpoint {
			(endpoint, EndpointSource::ConfigFile)
		} else {
			(lumo_cdp::probe::local_endpoint(DEFAULT_DEBUG_PORT), EndpointSource::Default)
		};

		let service_url = cli
			.url
			.clone()
			.or(file.service_url)
			.unwrap_or_else(|| lumo_cdp::DEFAULT_SERVICE_URL.to_string());

		Self {
			endpoint,
			endpoint_source,
			service_url,
			config_path,
			lumo: file.lumo,
		}
	}

	pub fn effective(&self) -> EffectiveConfig {
		EffectiveConfig {
			endpoint: self.endpoint.clone(),
			endpoint_source: self.endpoint_source,
			service_url: self.service_url.clone(),
			config_path: self.config_path.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use clap::Parser;

	use super::*;

	fn cli(args: &[&str]) -> Cli {
		let mut argv = vec!["lumo"];
		argv.extend_from_slice(args);
		argv.push("status");
		Cli::try_parse_from(argv).unwrap()
	}

	#[test]
	fn missing_default_file_yields_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let file = load_file(&dir.path().join("config.json"), false).unwrap();
		assert_eq!(file, SettingsFile::default());
	}

	#[test]
	fn missing_explicit_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = load_file(&dir.path().join("nope.json"), true).unwrap_err();
		assert!(matches!(err, CliError::Config { .. }));
	}

	#[test]
	fn malformed_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		fs::write(&path, "{ not json").unwrap();

		let err = load_file(&path, false).unwrap_err();
		assert!(err.to_string().contains("malformed settings file"));
	}

	#[test]
	fn partial_file_keeps_other_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		fs::write(
			&path,
			r#"{ "cdpEndpoint": "http://10.0.0.5:9222", "timings": { "settleMs": 3000 }, "dialogue": { "maxTurns": 5 } }"#,
		)
		.unwrap();

		let file = load_file(&path, true).unwrap();
		assert_eq!(file.cdp_endpoint.as_deref(), Some("http://10.0.0.5:9222"));
		assert_eq!(file.lumo.timings.settle_ms, 3000);
		assert_eq!(file.lumo.timings.ceiling_ms, lumo::config::DEFAULT_CEILING_MS);
		assert_eq!(file.lumo.dialogue.max_turns, 5);
		assert_eq!(file.lumo.layout, lumo::Layout::default());
	}

	#[test]
	fn cli_flags_override_file() {
		let file = SettingsFile {
			cdp_endpoint: Some("http://10.0.0.5:9222".into()),
			service_url: Some("https://lumo.example/chat".into()),
			..SettingsFile::default()
		};

		let settings = Settings::merge(file.clone(), &cli(&["--cdp-endpoint", "ws://127.0.0.1:9333/devtools/browser/x"]), None);
		assert_eq!(settings.endpoint, "ws://127.0.0.1:9333/devtools/browser/x");
		assert_eq!(settings.endpoint_source, EndpointSource::CliFlag);
		assert_eq!(settings.service_url, "https://lumo.example/chat");

		let settings = Settings::merge(file.clone(), &cli(&["--port", "9444", "--url", "https://other/chat"]), None);
		assert_eq!(settings.endpoint, lumo_cdp::probe::local_endpoint(9444));
		assert_eq!(settings.endpoint_source, EndpointSource::Port);
		assert_eq!(settings.service_url, "https://other/chat");

		let settings = Settings::merge(file, &cli(&[]), None);
		assert_eq!(settings.endpoint, "http://10.0.0.5:9222");
		assert_eq!(settings.endpoint_source, EndpointSource::ConfigFile);
	}

	#[test]
	fn defaults_without_file_or_flags() {
		let settings = Settings::merge(SettingsFile::default(), &cli(&[]), None);
		assert_eq!(settings.endpoint, lumo_cdp::probe::local_endpoint(DEFAULT_DEBUG_PORT));
		assert_eq!(settings.endpoint_source, EndpointSource::Default);
		assert_eq!(settings.service_url, lumo_cdp::DEFAULT_SERVICE_URL);
	}

	#[test]
	fn explicit_path_is_reported() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("lumo.json");
		fs::write(&path, "{}").unwrap();

		let path_arg = path.to_string_lossy().to_string();
		let settings = Settings::resolve(&cli(&["--config", &path_arg])).unwrap();
		assert_eq!(settings.effective().config_path, Some(path));
	}
}
