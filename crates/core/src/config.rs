//! Scraper configuration.
//!
//! Defaults target the Finnkino deployment. A JSON file may override any
//! subset of fields, and a handful of environment variables override both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use showtimes_runtime::LaunchProfile;
use url::Url;

use crate::acquirer::AcquireRequest;
use crate::error::ConfigError;
use crate::partition::PartitionLayout;

pub const DEFAULT_BASE_URL: &str = "https://www.finnkino.fi";
pub const DEFAULT_DIGITAL_API_HOST: &str = "https://digital-api.finnkino.fi/WSVistaWebClient/ocapi/v1";

const TOKEN_FILE_NAME: &str = "bearer_token.json";
const THEATERS_FILE_NAME: &str = "vistacinema_list.json";

const ENV_OVERRIDES: &[(&str, EnvField)] = &[
	("FINNKINO_BASE_URL", EnvField::BaseUrl),
	("DIGITAL_API_HOST", EnvField::DigitalApiHost),
	("SHOWTIMES_DATA_DIR", EnvField::DataDir),
	("CHROME_PATH", EnvField::ChromeExecutable),
];

#[derive(Debug, Clone, Copy)]
enum EnvField {
	BaseUrl,
	DigitalApiHost,
	DataDir,
	ChromeExecutable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
	/// Public site navigated to capture a credential.
	pub base_url: String,
	/// Root of the digital API; also identifies requests that carry the token.
	pub digital_api_host: String,
	/// Root of the ISO-week partitioned document tree.
	pub data_dir: PathBuf,
	/// Cached credential record; `<dataDir>/bearer_token.json` when unset.
	pub token_file: Option<PathBuf>,
	/// Theater list used by the batch drivers; `<dataDir>/vistacinema_list.json` when unset.
	pub theaters_file: Option<PathBuf>,
	pub user_agent: String,
	pub headless: bool,
	pub chrome_executable: Option<PathBuf>,
	pub navigation_timeout_ms: u64,
	pub grace_ms: u64,
	pub request_timeout_ms: u64,
	pub request_delay_ms: u64,
}

impl Default for Config {
	fn default() -> Self {
		let profile = LaunchProfile::default();
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			digital_api_host: DEFAULT_DIGITAL_API_HOST.to_string(),
			data_dir: PathBuf::from("data"),
			token_file: None,
			theaters_file: None,
			user_agent: profile.user_agent,
			headless: profile.headless,
			chrome_executable: None,
			navigation_timeout_ms: 90_000,
			grace_ms: 5_000,
			request_timeout_ms: 30_000,
			request_delay_ms: 500,
		}
	}
}

impl Config {
	/// Reads `path` when given, then applies environment overrides.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let mut config = match path {
			Some(path) => Self::from_file(path)?,
			None => Self::default(),
		};
		config.apply_env(|key| std::env::var(key).ok());
		config.validate()?;
		Ok(config)
	}

	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
			path: path.to_path_buf(),
			source,
		})
	}

	/// Applies overrides from `lookup`, which maps variable names to values.
	pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
		for (key, field) in ENV_OVERRIDES {
			let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) else {
				continue;
			};
			match field {
				EnvField::BaseUrl => self.base_url = value,
				EnvField::DigitalApiHost => self.digital_api_host = value,
				EnvField::DataDir => self.data_dir = PathBuf::from(value),
				EnvField::ChromeExecutable => self.chrome_executable = Some(PathBuf::from(value)),
			}
		}
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		for (field, value) in [("baseUrl", &self.base_url), ("digitalApiHost", &self.digital_api_host)] {
			Url::parse(value).map_err(|source| ConfigError::Url {
				field,
				value: value.clone(),
				source,
			})?;
		}
		Ok(())
	}

	/// Pattern that recognises requests to the digital API.
	pub fn api_host_match(&self) -> &str {
		&self.digital_api_host
	}

	pub fn acquire_request(&self) -> AcquireRequest {
		AcquireRequest::new(&self.base_url, self.api_host_match(), Duration::from_millis(self.navigation_timeout_ms))
	}

	pub fn launch_profile(&self) -> LaunchProfile {
		LaunchProfile::default()
			.with_user_agent(&self.user_agent)
			.with_headless(self.headless)
	}

	pub fn token_file(&self) -> PathBuf {
		self.token_file.clone().unwrap_or_else(|| self.data_dir.join(TOKEN_FILE_NAME))
	}

	pub fn theaters_file(&self) -> PathBuf {
		self.theaters_file.clone().unwrap_or_else(|| self.data_dir.join(THEATERS_FILE_NAME))
	}

	pub fn layout(&self) -> PartitionLayout {
		PartitionLayout::new(&self.data_dir)
	}

	pub fn grace(&self) -> Duration {
		Duration::from_millis(self.grace_ms)
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.request_timeout_ms)
	}

	pub fn request_delay(&self) -> Duration {
		Duration::from_millis(self.request_delay_ms)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use tempfile::TempDir;

	use super::*;

	#[test]
	fn defaults_match_deployment() {
		let config = Config::default();
		assert_eq!(config.base_url, DEFAULT_BASE_URL);
		assert_eq!(config.request_timeout(), Duration::from_secs(30));
		assert_eq!(config.request_delay(), Duration::from_millis(500));
		assert_eq!(config.grace(), Duration::from_secs(5));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn file_overrides_only_given_fields() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join("showtimes.json");
		std::fs::write(&path, r#"{"dataDir": "/srv/showtimes", "requestDelayMs": 0}"#).unwrap();

		let config = Config::from_file(&path).unwrap();
		assert_eq!(config.data_dir, PathBuf::from("/srv/showtimes"));
		assert_eq!(config.request_delay(), Duration::ZERO);
		assert_eq!(config.digital_api_host, DEFAULT_DIGITAL_API_HOST);
	}

	#[test]
	fn malformed_file_reports_path() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join("showtimes.json");
		std::fs::write(&path, "{").unwrap();

		let err = Config::from_file(&path).unwrap_err();
		assert!(matches!(err, ConfigError::Parse { .. }));
		assert!(err.to_string().contains("showtimes.json"));
	}

	#[test]
	fn env_overrides_win_and_blank_values_are_ignored() {
		let env = HashMap::from([
			("DIGITAL_API_HOST", "https://api.example.test/ocapi/v1"),
			("CHROME_PATH", "/opt/chromium/chrome"),
			("FINNKINO_BASE_URL", "  "),
		]);
		let mut config = Config::default();
		config.apply_env(|key| env.get(key).map(|v| v.to_string()));

		assert_eq!(config.digital_api_host, "https://api.example.test/ocapi/v1");
		assert_eq!(config.chrome_executable, Some(PathBuf::from("/opt/chromium/chrome")));
		assert_eq!(config.base_url, DEFAULT_BASE_URL);
	}

	#[test]
	fn data_dir_override_moves_derived_files() {
		let env = HashMap::from([("SHOWTIMES_DATA_DIR", "/srv/showtimes")]);
		let mut config = Config::default();
		assert_eq!(config.token_file(), PathBuf::from("data/bearer_token.json"));
		config.apply_env(|key| env.get(key).map(|v| v.to_string()));

		assert_eq!(config.token_file(), PathBuf::from("/srv/showtimes/bearer_token.json"));
		assert_eq!(config.theaters_file(), PathBuf::from("/srv/showtimes/vistacinema_list.json"));
		assert_eq!(config.layout().root(), Path::new("/srv/showtimes"));
	}

	#[test]
	fn explicit_files_are_kept_when_data_dir_moves() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join("showtimes.json");
		std::fs::write(&path, r#"{"tokenFile": "/var/cache/token.json"}"#).unwrap();
		let mut config = Config::from_file(&path).unwrap();
		config.apply_env(|key| (key == "SHOWTIMES_DATA_DIR").then(|| "/srv/showtimes".to_string()));

		assert_eq!(config.token_file(), PathBuf::from("/var/cache/token.json"));
		assert_eq!(config.theaters_file(), PathBuf::from("/srv/showtimes/vistacinema_list.json"));
	}

	#[test]
	fn invalid_url_is_rejected() {
		let config = Config {
			digital_api_host: "not a url".into(),
			..Config::default()
		};
		assert!(matches!(config.validate(), Err(ConfigError::Url { field: "digitalApiHost", .. })));
	}

	#[test]
	fn acquire_request_targets_api_host() {
		let request = Config::default().acquire_request();
		assert_eq!(request.target_url, DEFAULT_BASE_URL);
		assert_eq!(request.api_host.host(), "digital-api.finnkino.fi");
		assert_eq!(request.timeout, Duration::from_secs(90));
	}
}
