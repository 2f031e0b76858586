use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use idm::BulkAction;
use idm_runtime::ApiVersion;
use serde_json::Value;

use crate::config::{ConfigKey, Overrides};
use crate::output::OutputFormat;
use crate::styles::cli_styles;

#[derive(Parser, Debug)]
#[command(name = "idm")]
#[command(about = "Batched JSON-RPC client for FreeIPA-compatible identity servers")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	/// Config file (defaults to the user config directory)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Server base URL, e.g. https://ipa.example.test
	#[arg(long, global = true, value_name = "URL")]
	pub server: Option<String>,

	/// API version sent with every batch
	#[arg(long, global = true, value_name = "MAJOR.MINOR")]
	pub api_version: Option<ApiVersion>,

	/// Request timeout in seconds
	#[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
	pub timeout: Option<u64>,

	#[command(subcommand)]
	pub command: Commands,
}

impl Cli {
	pub fn overrides(&self) -> Overrides {
		Overrides {
			server: self.server.clone(),
			api_version: self.api_version.clone(),
			timeout_secs: self.timeout,
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Run one command
	Exec {
		/// Method name, e.g. user_show
		method: String,

		/// Positional arguments, sent as strings
		args: Vec<String>,

		/// Keyword option as KEY=VALUE; VALUE is parsed as JSON when it can be
		#[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
		options: Vec<(String, Value)>,
	},

	/// Run many commands in one round trip
	///
	/// Input is a JSON array or newline-delimited JSON of
	/// {"method": ..., "args": [...], "options": {...}} objects.
	Batch {
		/// Read commands from FILE instead of stdin
		#[arg(long, value_name = "FILE")]
		file: Option<PathBuf>,
	},

	/// Delete, enable or disable many entities at once
	Bulk {
		#[arg(value_enum)]
		action: CliBulkAction,

		/// Entity type, e.g. user, group, hbacrule
		entity: String,

		/// Primary keys
		#[arg(required = true)]
		keys: Vec<String>,
	},

	/// Show or change stored settings
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
	/// Print the effective settings
	Show,
	/// Store one setting
	Set {
		#[arg(value_enum)]
		key: ConfigKey,
		value: String,
	},
	/// Print the config file location
	Path,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliBulkAction {
	Delete,
	Enable,
	Disable,
}

impl From<CliBulkAction> for BulkAction {
	fn from(action: CliBulkAction) -> Self {
		match action {
			CliBulkAction::Delete => BulkAction::Delete,
			CliBulkAction::Enable => BulkAction::Enable,
			CliBulkAction::Disable => BulkAction::Disable,
		}
	}
}

fn parse_option(raw: &str) -> Result<(String, Value), String> {
	let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
	if key.is_empty() {
		return Err(format!("empty option name in '{raw}'"));
	}
	let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
	Ok((key.to_string(), value))
}
