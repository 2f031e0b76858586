use anyhow::Result;
use idm::{BulkAction, run_bulk};
use idm_runtime::BatchClient;

use super::Success;
use crate::output::{OutputFormat, render_bulk};

pub async fn run(client: &BatchClient, action: BulkAction, entity: &str, keys: Vec<String>, format: OutputFormat) -> Result<Success> {
	let outcome = run_bulk(client, entity, action, keys).await?;
	print!("{}", render_bulk(&outcome, format));
	Ok(outcome.is_complete())
}
