//! Persistent CLI settings and their resolution against flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use idm_runtime::ApiVersion;
use serde::{Deserialize, Serialize};
use url::Url;

/// Schema version of the config file.
pub const SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings stored in `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
	#[serde(default)]
	pub schema: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub server: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub api_version: Option<ApiVersion>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timeout_secs: Option<u64>,
}

/// Keys accepted by `idm config set`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
	Server,
	ApiVersion,
	TimeoutSecs,
}

/// Per-invocation overrides from global flags.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
	pub server: Option<String>,
	pub api_version: Option<ApiVersion>,
	pub timeout_secs: Option<u64>,
}

/// Settings after flags were applied over the file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Effective {
	pub server: Option<Url>,
	pub api_version: ApiVersion,
	pub timeout_secs: u64,
}

impl Effective {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	pub fn require_server(&self) -> Result<&Url> {
		self.server
			.as_ref()
			.context("no server configured; pass --server or run `idm config set server <URL>`")
	}
}

impl CliConfig {
	/// Creates a config with current [`SCHEMA_VERSION`].
	pub fn new() -> Self {
		Self {
			schema: SCHEMA_VERSION,
			..Default::default()
		}
	}

	/// `$XDG_CONFIG_HOME/idm/config.json` or the platform equivalent.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("idm").join("config.json"))
	}

	/// Reads `path`; a missing file yields a fresh config.
	pub fn load(path: &Path) -> Result<Self> {
		let raw = match fs::read_to_string(path) {
			Ok(raw) => raw,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
			Err(err) => return Err(err).with_context(|| format!("reading {}", path.display())),
		};
		let config: Self = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
		if config.schema > SCHEMA_VERSION {
			bail!(
				"{} has schema {} but this idm understands up to {SCHEMA_VERSION}",
				path.display(),
				config.schema
			);
		}
		Ok(config)
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
		}
		let mut json = serde_json::to_string_pretty(self)?;
		json.push('\n');
		fs::write(path, json).with_context(|| format!("writing {}", path.display()))
	}

	/// Validates and stores one value.
	pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
		match key {
			ConfigKey::Server => {
				parse_server(value)?;
				self.server = Some(value.to_string());
			}
			ConfigKey::ApiVersion => {
				self.api_version = Some(value.parse().map_err(anyhow::Error::msg)?);
			}
			ConfigKey::TimeoutSecs => {
				let secs: u64 = value.parse().with_context(|| format!("invalid timeout '{value}'"))?;
				if secs == 0 {
					bail!("timeout must be at least one second");
				}
				self.timeout_secs = Some(secs);
			}
		}
		self.schema = SCHEMA_VERSION;
		Ok(())
	}

	pub fn resolve(&self, overrides: &Overrides) -> Result<Effective> {
		let server = overrides.server.as_deref().or(self.server.as_deref()).map(parse_server).transpose()?;
		Ok(Effective {
			server,
			api_version: overrides
				.api_version
				.clone()
				.or_else(|| self.api_version.clone())
				.unwrap_or_default(),
			timeout_secs: overrides.timeout_secs.or(self.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS),
		})
	}
}

fn parse_server(value: &str) -> Result<Url> {
	let url = Url::parse(value).with_context(|| format!("invalid server URL '{value}'"))?;
	if !matches!(url.scheme(), "http" | "https") {
		bail!("server URL must be http or https, got '{}'", url.scheme());
	}
	Ok(url)
}
