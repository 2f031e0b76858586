use std::path::Path;

use anyhow::Result;
use serde_json::json;

use super::Success;
use crate::cli::ConfigAction;
use crate::config::{CliConfig, Effective};
use crate::output::{OutputFormat, render_value};

pub fn run(action: ConfigAction, path: &Path, mut stored: CliConfig, effective: &Effective, format: OutputFormat) -> Result<Success> {
	match action {
		ConfigAction::Show => print!("{}", render_value(effective, format)),
		ConfigAction::Set { key, value } => {
			stored.set(key, &value)?;
			stored.save(path)?;
			tracing::info!(path = %path.display(), ?key, "config updated");
			print!("{}", render_value(&stored, format));
		}
		ConfigAction::Path => print!("{}", render_value(&json!({ "path": path }), format)),
	}
	Ok(true)
}
