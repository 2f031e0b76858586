//! Result rendering for `-f json` and `-f text`.
//!
//! JSON output is one envelope per invocation:
//!
//! ```json
//! {
//!   "ok": false,
//!   "results": [
//!     { "ok": true, "command": "user_show(\"alice\")", "result": { ... }, "value": "alice" },
//!     { "ok": false, "command": "user_show(\"ghost\")", "error": { "code": 4001, "name": "NotFound", "message": "..." } }
//!   ]
//! }
//! ```

use std::fmt::Write as _;

use colored::Colorize;
use idm::{BulkOutcome, EntityKey};
use idm_runtime::{Command, CommandError, CommandResult};
use serde::Serialize;
use serde_json::Value;

/// Schema version of JSON output.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text
	#[default]
	Text,
	/// JSON envelope
	Json,
}

/// Outcome of one command, positioned like its request.
#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub summary: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
}

impl CommandReport {
	pub fn new(command: &Command, result: CommandResult) -> Self {
		match result {
			Ok(reply) => Self {
				ok: true,
				command: command.label(),
				result: Some(reply.result),
				value: Some(reply.value).filter(|v| !v.is_null()),
				summary: reply.summary,
				error: None,
			},
			Err(err) => Self {
				ok: false,
				command: command.label(),
				result: None,
				value: None,
				summary: None,
				error: Some(err),
			},
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportEnvelope<'a> {
	schema_version: u32,
	ok: bool,
	results: &'a [CommandReport],
}

#[derive(Debug, Serialize)]
struct FailedKey<'a> {
	key: String,
	error: &'a CommandError,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkEnvelope<'a> {
	schema_version: u32,
	ok: bool,
	action: String,
	summary: String,
	succeeded: Vec<String>,
	failed: Vec<FailedKey<'a>>,
}

/// Renders command reports. `detailed` prints payloads in text mode too.
pub fn render_reports(reports: &[CommandReport], format: OutputFormat, detailed: bool) -> String {
	match format {
		OutputFormat::Json => to_json(&ReportEnvelope {
			schema_version: SCHEMA_VERSION,
			ok: reports.iter().all(|r| r.ok),
			results: reports,
		}),
		OutputFormat::Text => {
			let mut out = String::new();
			for report in reports {
				match &report.error {
					None => {
						let note = report.summary.as_deref().unwrap_or("ok");
						let _ = writeln!(out, "{} {} {}", "✓".green(), report.command.bold(), note);
						if detailed {
							if let Some(result) = &report.result {
								let _ = writeln!(out, "{}", pretty(result));
							}
						}
					}
					Some(err) => {
						let _ = writeln!(out, "{} {} {}", "✗".red(), report.command.bold(), err.to_string().red());
					}
				}
			}
			out
		}
	}
}

pub fn render_bulk<K: EntityKey>(outcome: &BulkOutcome<K>, format: OutputFormat) -> String {
	match format {
		OutputFormat::Json => to_json(&BulkEnvelope {
			schema_version: SCHEMA_VERSION,
			ok: outcome.is_complete(),
			action: outcome.action.to_string(),
			summary: outcome.summary(),
			succeeded: outcome.succeeded.iter().map(EntityKey::label).collect(),
			failed: outcome
				.failed
				.iter()
				.map(|(key, error)| FailedKey { key: key.label(), error })
				.collect(),
		}),
		OutputFormat::Text => {
			let mut out = String::new();
			let summary = outcome.summary();
			let _ = writeln!(out, "{}", if outcome.is_complete() { summary.green() } else { summary.yellow() });
			for (key, err) in &outcome.failed {
				let _ = writeln!(out, "  {} {}: {}", "✗".red(), key.label().bold(), err);
			}
			out
		}
	}
}

pub fn render_value<T: Serialize>(value: &T, format: OutputFormat) -> String {
	match format {
		OutputFormat::Json => to_json(value),
		OutputFormat::Text => match serde_json::to_value(value) {
			Ok(Value::Object(map)) => {
				let mut out = String::new();
				for (key, value) in map {
					let value = match value {
						Value::String(s) => s,
						Value::Null => "-".to_string(),
						other => other.to_string(),
					};
					let _ = writeln!(out, "{}: {value}", key.cyan());
				}
				out
			}
			Ok(other) => format!("{}\n", pretty(&other)),
			Err(err) => format!("{err}\n"),
		},
	}
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
	match serde_json::to_string_pretty(value) {
		Ok(mut json) => {
			json.push('\n');
			json
		}
		Err(err) => format!("{{\"ok\":false,\"error\":\"{err}\"}}\n"),
	}
}

fn pretty(value: &Value) -> String {
	serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
