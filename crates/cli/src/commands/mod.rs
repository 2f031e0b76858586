//! Subcommand implementations.

mod batch;
mod bulk;
mod config;
mod exec;

use std::path::PathBuf;

use anyhow::{Context, Result};
use idm_runtime::{BatchClient, ClientConfig, HttpTransport, HttpTransportConfig};
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::config::{CliConfig, Effective};

/// Whether every command the invocation ran succeeded.
pub type Success = bool;

pub async fn dispatch(cli: Cli) -> Result<Success> {
	let config_path = config_path(&cli)?;
	let stored = CliConfig::load(&config_path)?;
	let effective = stored.resolve(&cli.overrides())?;
	debug!(path = %config_path.display(), server = ?effective.server, version = %effective.api_version, "config resolved");

	let format = cli.format;
	match cli.command {
		Commands::Exec { method, args, options } => exec::run(&client(&effective)?, method, args, options, format).await,
		Commands::Batch { file } => batch::run(&client(&effective)?, file.as_deref(), format).await,
		Commands::Bulk { action, entity, keys } => bulk::run(&client(&effective)?, action.into(), &entity, keys, format).await,
		Commands::Config { action } => config::run(action, &config_path, stored, &effective, format),
	}
}

fn config_path(cli: &Cli) -> Result<PathBuf> {
	match &cli.config {
		Some(path) => Ok(path.clone()),
		None => CliConfig::default_path().context("cannot determine the user config directory; pass --config"),
	}
}

fn client(effective: &Effective) -> Result<BatchClient> {
	let server = effective.require_server()?.clone();
	let transport = HttpTransport::new(HttpTransportConfig::new(server).timeout(effective.timeout()))?;
	Ok(BatchClient::new(
		transport,
		ClientConfig {
			version: effective.api_version.clone(),
		},
	))
}
