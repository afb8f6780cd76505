//! Credential capture from a live browser session.
//!
//! The ticketing site mints its API token client-side, so there is no
//! endpoint to ask for one. Instead we load the public site in a browser and
//! copy the `Authorization` header off the first request it makes to the API
//! host.

use std::time::Duration;

use async_trait::async_trait;
use showtimes_runtime::{BrowserDriver, BrowserSession, LaunchProfile, ObservedRequest, PageEvent};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};
use url::Url;

use crate::credential::Credential;

pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Decides whether a request URL goes to the API we need a token for.
///
/// A pattern with a scheme (`https://api.example.com/ocapi/v1`) matches on
/// host and path prefix; a bare host (`api.example.com`) matches that host
/// and its subdomains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMatcher {
	host: String,
	path_prefix: String,
	include_subdomains: bool,
}

impl HostMatcher {
	pub fn new(pattern: &str) -> Self {
		let pattern = pattern.trim();
		if let Ok(url) = Url::parse(pattern) {
			if let Some(host) = url.host_str() {
				return Self {
					host: host.to_ascii_lowercase(),
					path_prefix: url.path().trim_end_matches('/').to_string(),
					include_subdomains: false,
				};
			}
		}
		let host = pattern.split('/').next().unwrap_or_default();
		Self {
			host: host.to_ascii_lowercase(),
			path_prefix: String::new(),
			include_subdomains: true,
		}
	}

	pub fn host(&self) -> &str {
		&self.host
	}

	pub fn matches(&self, request_url: &str) -> bool {
		let Ok(url) = Url::parse(request_url) else {
			return false;
		};
		let Some(host) = url.host_str() else {
			return false;
		};
		let host = host.to_ascii_lowercase();
		let host_ok = host == self.host || (self.include_subdomains && host.ends_with(&format!(".{}", self.host)));
		host_ok && url.path().starts_with(&self.path_prefix)
	}
}

/// Where to look for a credential and how long to try.
#[derive(Debug, Clone)]
pub struct AcquireRequest {
	pub target_url: String,
	pub api_host: HostMatcher,
	pub timeout: Duration,
}

impl AcquireRequest {
	pub fn new(target_url: impl Into<String>, api_host_match: &str, timeout: Duration) -> Self {
		Self {
			target_url: target_url.into(),
			api_host: HostMatcher::new(api_host_match),
			timeout,
		}
	}
}

/// Source of fresh credentials. Failure is `None`; callers own the fallback.
#[async_trait]
pub trait CredentialAcquire: Send + Sync {
	async fn acquire(&self, request: &AcquireRequest) -> Option<Credential>;
}

/// Captures credentials by driving a browser.
pub struct CredentialAcquirer<D> {
	driver: D,
	profile: LaunchProfile,
	grace: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settle {
	Idle,
	TimedOut,
	Closed,
	Failed,
}

struct Capture<'a> {
	matcher: &'a HostMatcher,
	credential: Option<Credential>,
}

impl<'a> Capture<'a> {
	fn new(matcher: &'a HostMatcher) -> Self {
		Self { matcher, credential: None }
	}

	fn observe(&mut self, request: &ObservedRequest) {
		let Some(value) = request.header("authorization").filter(|v| !v.trim().is_empty()) else {
			return;
		};
		if !self.matcher.matches(&request.url) {
			return;
		}
		match &self.credential {
			None => {
				let credential = Credential::new(value);
				debug!(target = "showtimes.credential", url = %request.url, credential = ?credential, "authorization observed");
				self.credential = Some(credential);
			}
			Some(first) if first.as_str() != value => {
				debug!(target = "showtimes.credential", url = %request.url, "ignoring later authorization with a different value");
			}
			Some(_) => {}
		}
	}

	fn captured(&self) -> bool {
		self.credential.is_some()
	}
}

impl<D: BrowserDriver> CredentialAcquirer<D> {
	pub fn new(driver: D, profile: LaunchProfile) -> Self {
		Self {
			driver,
			profile,
			grace: DEFAULT_GRACE,
		}
	}

	pub fn with_grace(mut self, grace: Duration) -> Self {
		self.grace = grace;
		self
	}

	async fn observe(&self, session: &mut dyn BrowserSession, request: &AcquireRequest) -> Option<Credential> {
		let mut capture = Capture::new(&request.api_host);
		let deadline = Instant::now() + request.timeout;

		info!(target = "showtimes.credential", url = %request.target_url, "navigating for credential capture");
		let settle = match timeout_at(deadline, session.navigate(&request.target_url)).await {
			Ok(Ok(())) => wait_until_settled(session, &mut capture, deadline).await,
			Ok(Err(err)) => {
				warn!(target = "showtimes.credential", url = %request.target_url, error = %err, "navigation failed");
				Settle::Failed
			}
			Err(_) => {
				warn!(target = "showtimes.credential", url = %request.target_url, timeout = ?request.timeout, "navigation timed out");
				Settle::TimedOut
			}
		};
		debug!(target = "showtimes.credential", ?settle, captured = capture.captured(), "page settled");

		if !capture.captured() && matches!(settle, Settle::Idle | Settle::TimedOut) {
			debug!(target = "showtimes.credential", grace = ?self.grace, "waiting for late API calls");
			let grace_deadline = Instant::now() + self.grace;
			while !capture.captured() {
				match timeout_at(grace_deadline, session.next_event()).await {
					Ok(Some(PageEvent::Request(observed))) => capture.observe(&observed),
					Ok(Some(PageEvent::NetworkIdle)) => {}
					Ok(None) | Err(_) => break,
				}
			}
		}

		capture.credential
	}
}

async fn wait_until_settled(session: &mut dyn BrowserSession, capture: &mut Capture<'_>, deadline: Instant) -> Settle {
	loop {
		match timeout_at(deadline, session.next_event()).await {
			Ok(Some(PageEvent::Request(observed))) => capture.observe(&observed),
			Ok(Some(PageEvent::NetworkIdle)) => return Settle::Idle,
			Ok(None) => return Settle::Closed,
			Err(_) => return Settle::TimedOut,
		}
	}
}

#[async_trait]
impl<D: BrowserDriver> CredentialAcquire for CredentialAcquirer<D> {
	async fn acquire(&self, request: &AcquireRequest) -> Option<Credential> {
		let mut session = match self.driver.launch(&self.profile).await {
			Ok(session) => session,
			Err(err) => {
				warn!(target = "showtimes.credential", error = %err, "browser launch failed");
				return None;
			}
		};

		let credential = self.observe(session.as_mut(), request).await;

		if let Err(err) = session.close().await {
			warn!(target = "showtimes.credential", error = %err, "browser close failed");
		}

		match &credential {
			Some(credential) => info!(target = "showtimes.credential", credential = ?credential, "credential captured"),
			None => warn!(target = "showtimes.credential", url = %request.target_url, "no credential observed"),
		}
		credential
	}
}
