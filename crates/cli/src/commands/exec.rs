use anyhow::Result;
use idm_runtime::{BatchClient, Command};
use serde_json::Value;

use super::Success;
use crate::output::{CommandReport, OutputFormat, render_reports};

pub async fn run(client: &BatchClient, method: String, args: Vec<String>, options: Vec<(String, Value)>, format: OutputFormat) -> Result<Success> {
	let command = options
		.into_iter()
		.fold(Command::new(method).args(args), |command, (key, value)| command.option(key, value));

	let result = client.execute_single(command.clone()).await?;
	let report = CommandReport::new(&command, result);
	let ok = report.ok;
	print!("{}", render_reports(&[report], format, true));
	Ok(ok)
}
