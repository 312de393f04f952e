use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "lumo")]
#[command(about = "Drive a logged-in Lumo chat tab from the command line")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	/// Configuration file (defaults to the user config directory)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// DevTools endpoint of the browser (http://host:port or ws:// URL)
	#[arg(long, global = true, value_name = "URL")]
	pub cdp_endpoint: Option<String>,

	/// Remote debugging port on localhost, shorthand for --cdp-endpoint
	#[arg(long, global = true, conflicts_with = "cdp_endpoint")]
	pub port: Option<u16>,

	/// Chat service URL to attach to
	#[arg(long, global = true, value_name = "URL")]
	pub url: Option<String>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Wait until the chat tab shows a logged-in account
	Login {
		/// Give up after this many milliseconds
		#[arg(long)]
		timeout_ms: Option<u64>,
	},

	/// Send one prompt and print the settled reply
	Send { prompt: String },

	/// Run a self-directed dialogue seeded by a prompt (Ctrl-C stops it)
	Dialogue {
		prompt: String,
		/// Number of turns including the opening prompt
		#[arg(long)]
		max_turns: Option<u32>,
	},

	/// Fetch a message from a relay URL and forward it to the chat
	Relay { url: String },

	/// Project management
	Project {
		#[command(subcommand)]
		action: ProjectAction,
	},

	/// Start a fresh conversation
	NewChat,

	/// Turn web search on or off
	WebSearch { state: Switch },

	/// Turn ghost mode on or off
	GhostMode { state: Switch },

	/// Show connection and login state
	Status,
}

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
	/// Create a project with a name and optional instructions
	Create {
		name: String,
		#[arg(long)]
		instructions: Option<String>,
	},

	/// Open an existing project by its title
	Open { name: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Switch {
	On,
	Off,
}

impl Switch {
	pub fn enabled(self) -> bool {
		matches!(self, Switch::On)
	}
}

impl Commands {
	/// Dotted name used in result envelopes.
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Login { .. } => "login",
			Commands::Send { .. } => "send",
			Commands::Dialogue { .. } => "dialogue",
			Commands::Relay { .. } => "relay",
			Commands::Project {
				action: ProjectAction::Create { .. },
			} => "project.create",
			Commands::Project {
				action: ProjectAction::Open { .. },
			} => "project.open",
			Commands::NewChat => "new-chat",
			Commands::WebSearch { .. } => "web-search",
			Commands::GhostMode { .. } => "ghost-mode",
			Commands::Status => "status",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_send_command() {
		let cli = Cli::try_parse_from(["lumo", "send", "what is proton lumo"]).unwrap();

		match cli.command {
			Commands::Send { prompt } => assert_eq!(prompt, "what is proton lumo"),
			_ => panic!("Expected Send command"),
		}
		assert_eq!(cli.format, OutputFormat::Json);
	}

	#[test]
	fn parse_dialogue_with_turn_limit() {
		let cli = Cli::try_parse_from(["lumo", "dialogue", "tell me about zurich", "--max-turns", "4"]).unwrap();

		match cli.command {
			Commands::Dialogue { prompt, max_turns } => {
				assert_eq!(prompt, "tell me about zurich");
				assert_eq!(max_turns, Some(4));
			}
			_ => panic!("Expected Dialogue command"),
		}
	}

	#[test]
	fn parse_project_create() {
		let cli = Cli::try_parse_from(["lumo", "project", "create", "Research", "--instructions", "Be brief"]).unwrap();

		assert_eq!(cli.command.name(), "project.create");
		match cli.command {
			Commands::Project {
				action: ProjectAction::Create { name, instructions },
			} => {
				assert_eq!(name, "Research");
				assert_eq!(instructions.as_deref(), Some("Be brief"));
			}
			_ => panic!("Expected project create"),
		}
	}

	#[test]
	fn parse_toggle_state() {
		let cli = Cli::try_parse_from(["lumo", "web-search", "on"]).unwrap();
		match cli.command {
			Commands::WebSearch { state } => assert!(state.enabled()),
			_ => panic!("Expected WebSearch command"),
		}

		let cli = Cli::try_parse_from(["lumo", "ghost-mode", "off"]).unwrap();
		match cli.command {
			Commands::GhostMode { state } => assert!(!state.enabled()),
			_ => panic!("Expected GhostMode command"),
		}

		assert!(Cli::try_parse_from(["lumo", "ghost-mode", "maybe"]).is_err());
	}

	#[test]
	fn global_options_after_subcommand() {
		let cli = Cli::try_parse_from(["lumo", "status", "--port", "9333", "-f", "text", "-vv"]).unwrap();
		assert_eq!(cli.port, Some(9333));
		assert_eq!(cli.format, OutputFormat::Text);
		assert_eq!(cli.verbose, 2);
	}

	#[test]
	fn port_conflicts_with_endpoint() {
		let args = ["lumo", "status", "--port", "9333", "--cdp-endpoint", "http://127.0.0.1:9222"];
		assert!(Cli::try_parse_from(args).is_err());
	}

	#[test]
	fn invalid_command_fails() {
		assert!(Cli::try_parse_from(["lumo", "screenshot"]).is_err());
	}
}
