//! Chromium over CDP: the production [`BrowserDriver`].
//!
//! Each launch starts a private Chromium with its own profile directory and
//! debugging port, opens an isolated browser context with one page, and
//! attaches to that page with a flattened session so page events arrive on
//! the browser socket tagged with our `sessionId`.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Value, json};
use showtimes_protocol::{CdpEvent, LifecycleEvent, RequestWillBeSent, RequestWillBeSentExtraInfo};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::connection::CdpConnection;
use crate::driver::{BrowserDriver, BrowserSession, LaunchProfile, ObservedRequest, PageEvent};
use crate::error::{Result, RuntimeError};
use crate::process::free_local_port;

mod finder;
mod launcher;

pub use launcher::ChromeProcess;

/// Launches a fresh local Chromium per session.
#[derive(Debug, Clone, Default)]
pub struct ChromeDriver {
	executable: Option<PathBuf>,
}

impl ChromeDriver {
	/// Uses `executable` when given, otherwise searches well-known locations.
	pub fn new(executable: Option<PathBuf>) -> Self {
		Self { executable }
	}

	fn resolve_executable(&self) -> Result<PathBuf> {
		match &self.executable {
			Some(path) => Ok(path.clone()),
			None => finder::find_chrome_executable().ok_or(RuntimeError::BrowserNotFound),
		}
	}
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
	async fn launch(&self, profile: &LaunchProfile) -> Result<Box<dyn BrowserSession>> {
		let executable = self.resolve_executable()?;
		let port = free_local_port()?;
		let (process, info) = launcher::launch_chrome(&executable, port, profile).await?;
		info!(
			target = "showtimes.browser",
			port,
			browser = info.browser.as_deref().unwrap_or("unknown"),
			"browser launched"
		);

		let (connection, events) = CdpConnection::connect(&info.web_socket_debugger_url).await?;
		let session = ChromeSession::open(connection, events, process, profile).await?;
		Ok(Box::new(session))
	}
}

/// A page inside its own browser context, plus the process that hosts it.
pub struct ChromeSession {
	connection: CdpConnection,
	events: mpsc::UnboundedReceiver<CdpEvent>,
	process: ChromeProcess,
	browser_context_id: String,
	session_id: String,
	frame_id: String,
	loader_id: Option<String>,
	request_urls: HashMap<String, String>,
}

impl ChromeSession {
	async fn open(connection: CdpConnection, events: mpsc::UnboundedReceiver<CdpEvent>, process: ChromeProcess, profile: &LaunchProfile) -> Result<Self> {
		let context = connection.send("Target.createBrowserContext", json!({ "disposeOnDetach": true }), None).await?;
		let browser_context_id = string_field(&context, "browserContextId", "Target.createBrowserContext")?;

		let target = connection
			.send(
				"Target.createTarget",
				json!({ "url": "about:blank", "browserContextId": browser_context_id }),
				None,
			)
			.await?;
		let target_id = string_field(&target, "targetId", "Target.createTarget")?;

		let attached = connection
			.send("Target.attachToTarget", json!({ "targetId": target_id, "flatten": true }), None)
			.await?;
		let session_id = string_field(&attached, "sessionId", "Target.attachToTarget")?;
		let sid = Some(session_id.as_str());

		connection.send("Page.enable", json!({}), sid).await?;
		connection.send("Network.enable", json!({}), sid).await?;
		connection.send("Page.setLifecycleEventsEnabled", json!({ "enabled": true }), sid).await?;
		connection
			.send("Network.setUserAgentOverride", json!({ "userAgent": profile.user_agent }), sid)
			.await?;
		connection
			.send(
				"Emulation.setDeviceMetricsOverride",
				json!({
					"width": profile.viewport.width,
					"height": profile.viewport.height,
					"deviceScaleFactor": 1,
					"mobile": false,
				}),
				sid,
			)
			.await?;
		for source in &profile.init_scripts {
			connection
				.send("Page.addScriptToEvaluateOnNewDocument", json!({ "source": source }), sid)
				.await?;
		}

		let tree = connection.send("Page.getFrameTree", json!({}), sid).await?;
		let frame_id = tree
			.pointer("/frameTree/frame/id")
			.and_then(Value::as_str)
			.map(str::to_string)
			.unwrap_or_else(|| target_id.clone());

		debug!(target = "showtimes.browser", %session_id, %frame_id, "page session ready");

		Ok(Self {
			connection,
			events,
			process,
			browser_context_id,
			session_id,
			frame_id,
			loader_id: None,
			request_urls: HashMap::new(),
		})
	}

	fn translate(&mut self, event: CdpEvent) -> Option<PageEvent> {
		match event.method.as_str() {
			"Network.requestWillBeSent" => {
				let params: RequestWillBeSent = serde_json::from_value(event.params).ok()?;
				self.request_urls.insert(params.request_id, params.request.url.clone());
				Some(PageEvent::Request(ObservedRequest {
					url: params.request.url,
					headers: params.request.headers,
				}))
			}
			"Network.requestWillBeSentExtraInfo" => {
				let params: RequestWillBeSentExtraInfo = serde_json::from_value(event.params).ok()?;
				let url = self.request_urls.get(&params.request_id)?.clone();
				Some(PageEvent::Request(ObservedRequest { url, headers: params.headers }))
			}
			"Page.lifecycleEvent" => {
				let params: LifecycleEvent = serde_json::from_value(event.params).ok()?;
				let current_navigation = match (&self.loader_id, &params.loader_id) {
					(Some(expected), Some(actual)) => expected == actual,
					(Some(_), None) => true,
					(None, _) => false,
				};
				(params.name == "networkIdle" && params.frame_id == self.frame_id && current_navigation).then_some(PageEvent::NetworkIdle)
			}
			_ => None,
		}
	}
}

#[async_trait]
impl BrowserSession for ChromeSession {
	async fn navigate(&mut self, url: &str) -> Result<()> {
		let result = self
			.connection
			.send("Page.navigate", json!({ "url": url }), Some(self.session_id.as_str()))
			.await?;
		if let Some(reason) = result.get("errorText").and_then(Value::as_str) {
			return Err(RuntimeError::Navigation {
				url: url.to_string(),
				reason: reason.to_string(),
			});
		}
		self.loader_id = result.get("loaderId").and_then(Value::as_str).map(str::to_string);
		Ok(())
	}

	async fn next_event(&mut self) -> Option<PageEvent> {
		loop {
			let event = self.events.recv().await?;
			if event.session_id.as_deref() != Some(self.session_id.as_str()) {
				continue;
			}
			if let Some(page_event) = self.translate(event) {
				return Some(page_event);
			}
		}
	}

	async fn close(self: Box<Self>) -> Result<()> {
		let mut this = *self;
		if let Err(err) = this
			.connection
			.send("Target.disposeBrowserContext", json!({ "browserContextId": this.browser_context_id }), None)
			.await
		{
			debug!(target = "showtimes.browser", error = %err, "dispose browser context failed");
		}
		// The socket usually closes before Browser.close is acknowledged.
		let _ = this.connection.send("Browser.close", json!({}), None).await;
		this.process.shutdown().await?;
		info!(target = "showtimes.browser", port = this.process.port(), "browser closed");
		Ok(())
	}
}

fn string_field(value: &Value, field: &str, method: &str) -> Result<String> {
	value
		.get(field)
		.and_then(Value::as_str)
		.map(str::to_string)
		.ok_or_else(|| RuntimeError::Protocol {
			method: method.to_string(),
			message: format!("missing `{field}` in reply"),
		})
}
