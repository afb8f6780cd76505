//! Browser capability traits.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

/// Hides `navigator.webdriver` so naive bot checks do not block navigation.
pub const MASK_WEBDRIVER_SCRIPT: &str = "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

pub const DEFAULT_USER_AGENT: &str =
	"Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
	pub width: u32,
	pub height: u32,
}

impl Default for Viewport {
	fn default() -> Self {
		Self { width: 1920, height: 1080 }
	}
}

/// How a browser session should present itself.
#[derive(Debug, Clone)]
pub struct LaunchProfile {
	pub headless: bool,
	pub user_agent: String,
	pub viewport: Viewport,
	/// Scripts evaluated in every new document before page scripts run.
	pub init_scripts: Vec<String>,
}

impl Default for LaunchProfile {
	fn default() -> Self {
		Self {
			headless: true,
			user_agent: DEFAULT_USER_AGENT.to_string(),
			viewport: Viewport::default(),
			init_scripts: vec![MASK_WEBDRIVER_SCRIPT.to_string()],
		}
	}
}

impl LaunchProfile {
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();
		self
	}

	pub fn with_headless(mut self, headless: bool) -> Self {
		self.headless = headless;
		self
	}
}

/// An outgoing request seen by the page.
#[derive(Debug, Clone, Default)]
pub struct ObservedRequest {
	pub url: String,
	pub headers: HashMap<String, String>,
}

impl ObservedRequest {
	/// Looks a header up case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

#[derive(Debug, Clone)]
pub enum PageEvent {
	Request(ObservedRequest),
	/// The current navigation has had no network activity for a while.
	NetworkIdle,
}

/// Launches isolated browser sessions.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
	async fn launch(&self, profile: &LaunchProfile) -> Result<Box<dyn BrowserSession>>;
}

/// One isolated page in a running browser.
///
/// Implementations must release every OS resource when dropped, even if
/// [`BrowserSession::close`] is never reached.
#[async_trait]
pub trait BrowserSession: Send {
	/// Starts navigation to `url`. Returns once the browser accepted it.
	async fn navigate(&mut self, url: &str) -> Result<()>;

	/// Next page event, or `None` once the session can produce no more.
	async fn next_event(&mut self) -> Option<PageEvent>;

	/// Tears the browser down.
	async fn close(self: Box<Self>) -> Result<()>;
}
