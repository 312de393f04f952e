// lumo-cli: command-line driver for the Lumo chat interface
//
// Attaches to a browser started with remote debugging, runs one command
// against the chat tab and prints a JSON result envelope.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod output;
pub mod relay;
