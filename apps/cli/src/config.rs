//! CLI configuration management

use std::{
	fs,
	num::NonZeroUsize,
	path::{Path, PathBuf},
	time::Duration,
};

use anyhow::{anyhow, Result};
use pf_flickr_api::{ApiConfig, BASE_URL, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "photofeed.json";

/// CLI configuration stored in the data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Flickr API key, the `FLICKR_API_KEY` env var or `--api-key` take precedence
	pub api_key: Option<String>,
	pub base_url: String,
	/// Photos requested per search page
	pub page_size: u32,
	/// Time bound for each remote call
	pub timeout_secs: u64,
	/// Cap on concurrent size lookups per page, unbounded when absent
	pub max_parallel_lookups: Option<NonZeroUsize>,
	/// `host:port` probed to decide whether the network is reachable
	pub reachability_host: String,
	pub reachability_interval_secs: u64,
	/// Default tracing filter when `RUST_LOG` is not set
	pub log_level: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			api_key: None,
			base_url: BASE_URL.to_string(),
			page_size: DEFAULT_PAGE_SIZE,
			timeout_secs: pf_flickr_api::Timeout::SHORT.as_secs(),
			max_parallel_lookups: None,
			reachability_host: "api.flickr.com:443".to_string(),
			reachability_interval_secs: 10,
			log_level: "info".to_string(),
		}
	}
}

impl Config {
	/// Platform specific data directory
	pub fn default_data_dir() -> Result<PathBuf> {
		dirs::data_local_dir()
			.map(|dir| dir.join("photofeed"))
			.ok_or_else(|| anyhow!("Could not determine data directory"))
	}

	pub fn config_path(data_dir: &Path) -> PathBuf {
		data_dir.join(CONFIG_FILE_NAME)
	}

	/// Load config from the data directory, writing the defaults on first use
	pub fn load(data_dir: &Path) -> Result<Self> {
		let config_path = Self::config_path(data_dir);

		if config_path.exists() {
			let json = fs::read_to_string(&config_path)?;
			Ok(serde_json::from_str(&json)?)
		} else {
			let config = Self::default();
			config.save(data_dir)?;
			Ok(config)
		}
	}

	pub fn save(&self, data_dir: &Path) -> Result<()> {
		fs::create_dir_all(data_dir)?;

		let json = serde_json::to_string_pretty(self)?;
		fs::write(Self::config_path(data_dir), json)?;
		Ok(())
	}

	pub fn api_config(&self, api_key: String) -> ApiConfig {
		ApiConfig {
			base_url: self.base_url.clone(),
			api_key,
			page_size: self.page_size,
			timeout: Duration::from_secs(self.timeout_secs),
		}
	}

	pub const fn reachability_interval(&self) -> Duration {
		Duration::from_secs(self.reachability_interval_secs)
	}
}
