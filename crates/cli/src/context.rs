use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use showtimes::{
	ApiEndpoints, AuthorizedClient, Config, Credential, CredentialAcquirer, CredentialManager, FileCredentialStore, PartitionLayout,
	SeatAvailabilityClient, ShowtimeFetchClient,
};
use showtimes_runtime::ChromeDriver;
use tracing::debug;

use crate::theaters::{Theater, load_theaters};

pub type Manager = CredentialManager<FileCredentialStore, CredentialAcquirer<ChromeDriver>>;

/// Everything a command needs, built once from configuration.
pub struct CommandContext {
	config: Config,
	theaters_file: PathBuf,
	manager: Arc<Manager>,
	api: AuthorizedClient,
}

impl CommandContext {
	pub fn new(config: Config, theaters_override: Option<PathBuf>) -> Result<Self> {
		let acquirer = CredentialAcquirer::new(ChromeDriver::new(config.chrome_executable.clone()), config.launch_profile()).with_grace(config.grace());
		let manager = Arc::new(CredentialManager::new(
			FileCredentialStore::new(config.token_file()),
			acquirer,
			config.acquire_request(),
		));
		let api = AuthorizedClient::from_config(&config, manager.clone()).context("failed to build HTTP client")?;
		let theaters_file = theaters_override.unwrap_or_else(|| config.theaters_file());
		debug!(target = "showtimes", data_dir = %config.data_dir.display(), theaters = %theaters_file.display(), "context ready");

		Ok(Self {
			config,
			theaters_file,
			manager,
			api,
		})
	}

	pub fn load(config_path: Option<&Path>, theaters_override: Option<PathBuf>) -> Result<Self> {
		let config = Config::load(config_path)?;
		Self::new(config, theaters_override)
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn layout(&self) -> PartitionLayout {
		self.config.layout()
	}

	pub fn theaters(&self) -> Result<Vec<Theater>> {
		load_theaters(&self.theaters_file)
	}

	/// Credential to start a batch with. Exhaustion here aborts the command.
	pub async fn credential(&self, force_refresh: bool) -> Result<Credential> {
		self.manager
			.get_credential(force_refresh)
			.await
			.context("no bearer credential available")
	}

	pub fn showtimes_client(&self) -> ShowtimeFetchClient {
		ShowtimeFetchClient::new(self.api.clone(), self.endpoints(), self.layout())
	}

	pub fn seat_client(&self) -> SeatAvailabilityClient {
		SeatAvailabilityClient::new(self.api.clone(), self.endpoints(), self.layout())
	}

	fn endpoints(&self) -> ApiEndpoints {
		ApiEndpoints::new(&self.config.digital_api_host)
	}
}
