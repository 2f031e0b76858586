mod cli;
mod commands;
mod config;
mod logging;
mod output;
mod styles;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	match commands::dispatch(cli).await {
		Ok(true) => ExitCode::SUCCESS,
		// Per-command failures were already printed with the results.
		Ok(false) => ExitCode::from(2),
		Err(err) => {
			eprintln!("{} {err:#}", "error:".red().bold());
			ExitCode::FAILURE
		}
	}
}
