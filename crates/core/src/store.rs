//! Persistence of the single cached credential.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::credential::{Credential, Validity};

/// On-disk record: `{"token": "<credential>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
	pub token: Credential,
}

/// Holds at most one credential.
///
/// `load` and `save` never fail: a missing or unreadable cache is the same
/// as an empty one, and a lost write only costs a future acquisition.
pub trait CredentialStore: Send + Sync {
	fn load(&self) -> Option<Credential>;

	fn save(&self, credential: &Credential);

	fn validity(&self, credential: &Credential) -> Validity {
		credential.validity()
	}

	fn is_valid(&self, credential: &Credential) -> bool {
		self.validity(credential).is_valid()
	}
}

/// JSON file store at a caller-chosen path.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
	path: PathBuf,
}

impl FileCredentialStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn write(&self, credential: &Credential) -> std::io::Result<()> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}
		let record = TokenRecord { token: credential.clone() };
		fs::write(&self.path, serde_json::to_string(&record)?)
	}
}

impl CredentialStore for FileCredentialStore {
	fn load(&self) -> Option<Credential> {
		let content = match fs::read_to_string(&self.path) {
			Ok(content) => content,
			Err(err) => {
				debug!(target = "showtimes.credential", path = %self.path.display(), error = %err, "no cached credential");
				return None;
			}
		};
		match serde_json::from_str::<TokenRecord>(&content) {
			Ok(record) if !record.token.as_str().is_empty() => Some(record.token),
			Ok(_) => None,
			Err(err) => {
				warn!(target = "showtimes.credential", path = %self.path.display(), error = %err, "ignoring unreadable credential cache");
				None
			}
		}
	}

	fn save(&self, credential: &Credential) {
		match self.write(credential) {
			Ok(()) => debug!(target = "showtimes.credential", path = %self.path.display(), "credential cached"),
			Err(err) => warn!(target = "showtimes.credential", path = %self.path.display(), error = %err, "failed to cache credential"),
		}
	}
}

/// In-memory store for tests and one-off `--token` runs.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
	slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_credential(credential: Credential) -> Self {
		Self {
			slot: Mutex::new(Some(credential)),
		}
	}
}

impl CredentialStore for MemoryCredentialStore {
	fn load(&self) -> Option<Credential> {
		self.slot.lock().clone()
	}

	fn save(&self, credential: &Credential) {
		*self.slot.lock() = Some(credential.clone());
	}
}
