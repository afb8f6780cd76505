//! Credential lifecycle: cached, freshly acquired, or stale.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::acquirer::{AcquireRequest, CredentialAcquire};
use crate::credential::{Credential, Validity};
use crate::error::CredentialUnavailable;
use crate::store::CredentialStore;

/// Anything that can hand out a credential, optionally forcing a new one.
#[async_trait]
pub trait CredentialSource: Send + Sync {
	async fn get_credential(&self, force_refresh: bool) -> Result<Credential, CredentialUnavailable>;
}

/// Serves credentials from the store, acquiring new ones only when needed.
///
/// Resolution order:
/// 1. unless forced, a cached credential that has not expired;
/// 2. a freshly acquired credential, which is then cached;
/// 3. the cached credential even if expired, since callers retry on 401;
/// 4. [`CredentialUnavailable`].
///
/// Calls are serialised, so concurrent callers never launch two browsers
/// or race on the cache file.
pub struct CredentialManager<S, A> {
	store: S,
	acquirer: A,
	request: AcquireRequest,
	lock: Mutex<()>,
}

impl<S: CredentialStore, A: CredentialAcquire> CredentialManager<S, A> {
	pub fn new(store: S, acquirer: A, request: AcquireRequest) -> Self {
		Self {
			store,
			acquirer,
			request,
			lock: Mutex::new(()),
		}
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	pub async fn get_credential(&self, force_refresh: bool) -> Result<Credential, CredentialUnavailable> {
		let _guard = self.lock.lock().await;

		if !force_refresh {
			if let Some(cached) = self.store.load() {
				match self.store.validity(&cached) {
					Validity::Valid { expires_at } => {
						debug!(target = "showtimes.credential", expires_at, "using cached credential");
						return Ok(cached);
					}
					other => debug!(target = "showtimes.credential", validity = ?other, "cached credential not usable"),
				}
			}
		}

		if let Some(fresh) = self.acquirer.acquire(&self.request).await {
			self.store.save(&fresh);
			return Ok(fresh);
		}

		match self.store.load() {
			Some(stale) => {
				warn!(target = "showtimes.credential", forced = force_refresh, "acquisition failed; falling back to cached credential");
				Ok(stale)
			}
			None => {
				info!(target = "showtimes.credential", "acquisition failed and no credential is cached");
				Err(CredentialUnavailable)
			}
		}
	}
}

#[async_trait]
impl<S: CredentialStore, A: CredentialAcquire> CredentialSource for CredentialManager<S, A> {
	async fn get_credential(&self, force_refresh: bool) -> Result<Credential, CredentialUnavailable> {
		CredentialManager::get_credential(self, force_refresh).await
	}
}

#[cfg(test)]
mod tests {
	use std::collections::VecDeque;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;

	use parking_lot::Mutex as SyncMutex;

	use super::*;
	use crate::credential::tests::token_expiring_at;
	use crate::credential::unix_now;
	use crate::store::MemoryCredentialStore;

	/// Hands out queued results and counts calls.
	#[derive(Default)]
	struct FakeAcquirer {
		results: SyncMutex<VecDeque<Option<Credential>>>,
		calls: AtomicUsize,
	}

	impl FakeAcquirer {
		fn returning(results: impl IntoIterator<Item = Option<Credential>>) -> Arc<Self> {
			Arc::new(Self {
				results: SyncMutex::new(results.into_iter().collect()),
				calls: AtomicUsize::new(0),
			})
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl CredentialAcquire for Arc<FakeAcquirer> {
		async fn acquire(&self, _request: &AcquireRequest) -> Option<Credential> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.results.lock().pop_front().flatten()
		}
	}

	fn manager(store: MemoryCredentialStore, acquirer: &Arc<FakeAcquirer>) -> CredentialManager<MemoryCredentialStore, Arc<FakeAcquirer>> {
		let request = AcquireRequest::new("https://www.example.fi", "digital-api.example.fi", Duration::from_secs(1));
		CredentialManager::new(store, Arc::clone(acquirer), request)
	}

	fn valid() -> Credential {
		token_expiring_at(unix_now() + 3600)
	}

	fn expired() -> Credential {
		token_expiring_at(unix_now() - 3600)
	}

	#[tokio::test]
	async fn valid_cache_skips_acquisition() {
		let acquirer = FakeAcquirer::returning([Some(valid())]);
		let cached = valid();
		let manager = manager(MemoryCredentialStore::with_credential(cached.clone()), &acquirer);

		assert_eq!(manager.get_credential(false).await, Ok(cached));
		assert_eq!(acquirer.calls(), 0);
	}

	#[tokio::test]
	async fn expired_cache_triggers_acquisition_and_save() {
		let fresh = valid();
		let acquirer = FakeAcquirer::returning([Some(fresh.clone())]);
		let manager = manager(MemoryCredentialStore::with_credential(expired()), &acquirer);

		assert_eq!(manager.get_credential(false).await, Ok(fresh.clone()));
		assert_eq!(acquirer.calls(), 1);
		assert_eq!(manager.store().load(), Some(fresh));
	}

	#[tokio::test]
	async fn unparseable_cache_triggers_acquisition() {
		let fresh = valid();
		let acquirer = FakeAcquirer::returning([Some(fresh.clone())]);
		let manager = manager(MemoryCredentialStore::with_credential(Credential::new("garbage")), &acquirer);

		assert_eq!(manager.get_credential(false).await, Ok(fresh));
		assert_eq!(acquirer.calls(), 1);
	}

	#[tokio::test]
	async fn forced_refresh_ignores_valid_cache() {
		let fresh = valid();
		let acquirer = FakeAcquirer::returning([Some(fresh.clone())]);
		let manager = manager(MemoryCredentialStore::with_credential(valid()), &acquirer);

		assert_eq!(manager.get_credential(true).await, Ok(fresh));
		assert_eq!(acquirer.calls(), 1);
	}

	#[tokio::test]
	async fn failed_acquisition_falls_back_to_stale_cache() {
		let stale = expired();
		let acquirer = FakeAcquirer::returning([None]);
		let manager = manager(MemoryCredentialStore::with_credential(stale.clone()), &acquirer);

		assert_eq!(manager.get_credential(false).await, Ok(stale));
		assert_eq!(acquirer.calls(), 1);
	}

	#[tokio::test]
	async fn failed_forced_refresh_returns_cached_even_if_valid() {
		let cached = valid();
		let acquirer = FakeAcquirer::returning([None]);
		let manager = manager(MemoryCredentialStore::with_credential(cached.clone()), &acquirer);

		assert_eq!(manager.get_credential(true).await, Ok(cached));
	}

	#[tokio::test]
	async fn nothing_anywhere_is_unavailable() {
		let acquirer = FakeAcquirer::returning([None]);
		let manager = manager(MemoryCredentialStore::new(), &acquirer);

		assert_eq!(manager.get_credential(false).await, Err(CredentialUnavailable));
		assert_eq!(acquirer.calls(), 1);
	}

	#[tokio::test]
	async fn concurrent_callers_share_one_acquisition() {
		let fresh = valid();
		let acquirer = FakeAcquirer::returning([Some(fresh.clone()), Some(valid())]);
		let manager = Arc::new(manager(MemoryCredentialStore::new(), &acquirer));

		let (a, b) = tokio::join!(manager.get_credential(false), manager.get_credential(false));

		assert_eq!(a, Ok(fresh.clone()));
		assert_eq!(b, Ok(fresh));
		assert_eq!(acquirer.calls(), 1);
	}
}
