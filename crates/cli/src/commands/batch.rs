use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use idm_runtime::{BatchClient, Command};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::Success;
use crate::output::{CommandReport, OutputFormat, render_reports};

/// One command as written in batch input.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandInput {
	method: String,
	#[serde(default)]
	args: Vec<Value>,
	#[serde(default)]
	options: Map<String, Value>,
}

impl From<CommandInput> for Command {
	fn from(input: CommandInput) -> Self {
		input.options
			.into_iter()
			.fold(Command::new(input.method).args(input.args), |command, (key, value)| command.option(key, value))
	}
}

pub async fn run(client: &BatchClient, file: Option<&Path>, format: OutputFormat) -> Result<Success> {
	let input = match file {
		Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
		None => {
			let mut buf = String::new();
			std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
			buf
		}
	};
	let commands = parse_commands(&input)?;

	let response = client.execute(commands.clone()).await?;
	let reports: Vec<CommandReport> = commands.iter().zip(response).map(|(command, result)| CommandReport::new(command, result)).collect();
	let ok = reports.iter().all(|r| r.ok);
	print!("{}", render_reports(&reports, format, false));
	Ok(ok)
}

/// Accepts a JSON array of commands or one command per line.
fn parse_commands(input: &str) -> Result<Vec<Command>> {
	let trimmed = input.trim_start();
	let inputs: Vec<CommandInput> = if trimmed.starts_with('[') {
		serde_json::from_str(trimmed).context("parsing command array")?
	} else {
		input
			.lines()
			.enumerate()
			.filter(|(_, line)| !line.trim().is_empty())
			.map(|(n, line)| serde_json::from_str(line).with_context(|| format!("parsing line {}", n + 1)))
			.collect::<Result<_>>()?
	};
	if inputs.is_empty() {
		bail!("no commands given");
	}
	Ok(inputs.into_iter().map(Command::from).collect())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn array_input() {
		let commands = parse_commands(
			r#"[
				{"method": "user_show", "args": ["alice"], "options": {"all": true}},
				{"method": "user_find"}
			]"#,
		)
		.unwrap();
		assert_eq!(commands.len(), 2);
		assert_eq!(commands[0].label(), "user_show(\"alice\")");
		assert_eq!(commands[0].options()["all"], json!(true));
		assert!(commands[1].positional().is_empty());
	}

	#[test]
	fn line_delimited_input() {
		let input = "{\"method\": \"user_del\", \"args\": [\"bob\"]}\n\n{\"method\": \"user_del\", \"args\": [\"carol\"]}\n";
		let commands = parse_commands(input).unwrap();
		let labels: Vec<String> = commands.iter().map(Command::label).collect();
		assert_eq!(labels, vec!["user_del(\"bob\")", "user_del(\"carol\")"]);
	}

	#[test]
	fn bad_line_is_reported_by_number() {
		let err = parse_commands("{\"method\": \"ping\"}\nnot json\n").unwrap_err();
		assert!(err.to_string().contains("line 2"), "{err}");
	}

	#[test]
	fn unknown_fields_and_empty_input_are_rejected() {
		assert!(parse_commands(r#"[{"method": "ping", "params": []}]"#).is_err());
		assert!(parse_commands("[]").is_err());
		assert!(parse_commands("  \n").is_err());
	}
}
