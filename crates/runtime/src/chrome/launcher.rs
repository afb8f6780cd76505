//! Chromium process launch.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use showtimes_protocol::CdpVersionInfo;
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::driver::LaunchProfile;
use crate::error::{Result, RuntimeError};

const PROBE_ATTEMPTS: usize = 40;
const PROBE_INTERVAL: Duration = Duration::from_millis(200);
const PROBE_TIMEOUT: Duration = Duration::from_millis(400);
const EXIT_GRACE: Duration = Duration::from_secs(5);

/// A running browser process with a throwaway profile directory.
///
/// Dropping it kills the process; the profile directory is removed after.
pub struct ChromeProcess {
	child: Child,
	port: u16,
	_profile_dir: TempDir,
}

impl ChromeProcess {
	pub fn port(&self) -> u16 {
		self.port
	}

	/// Waits briefly for a requested shutdown, then kills.
	pub async fn shutdown(&mut self) -> Result<()> {
		match tokio::time::timeout(EXIT_GRACE, self.child.wait()).await {
			Ok(status) => {
				debug!(target = "showtimes.browser", port = self.port, status = ?status.ok(), "browser exited");
				Ok(())
			}
			Err(_) => {
				debug!(target = "showtimes.browser", port = self.port, "browser did not exit; killing");
				self.child.kill().await?;
				Ok(())
			}
		}
	}
}

impl Drop for ChromeProcess {
	fn drop(&mut self) {
		if matches!(self.child.try_wait(), Ok(None)) {
			let _ = self.child.start_kill();
		}
	}
}

pub(super) fn chrome_args(port: u16, profile_dir: &Path, profile: &LaunchProfile) -> Vec<String> {
	let mut args = vec![
		format!("--remote-debugging-port={port}"),
		format!("--user-data-dir={}", profile_dir.display()),
		"--no-first-run".to_string(),
		"--no-default-browser-check".to_string(),
		"--disable-blink-features=AutomationControlled".to_string(),
		"--no-sandbox".to_string(),
		"--disable-setuid-sandbox".to_string(),
		format!("--window-size={},{}", profile.viewport.width, profile.viewport.height),
		format!("--user-agent={}", profile.user_agent),
	];
	if profile.headless {
		args.push("--headless=new".to_string());
	}
	args.push("about:blank".to_string());
	args
}

pub(super) async fn launch_chrome(executable: &Path, port: u16, profile: &LaunchProfile) -> Result<(ChromeProcess, CdpVersionInfo)> {
	let profile_dir = tempfile::Builder::new().prefix("showtimes-chrome-").tempdir()?;
	let args = chrome_args(port, profile_dir.path(), profile);

	let mut cmd = Command::new(executable);
	cmd.args(&args)
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.kill_on_drop(true);

	let child = cmd.spawn().map_err(|source| RuntimeError::Launch {
		path: executable.display().to_string(),
		source,
	})?;
	debug!(target = "showtimes.browser", path = %executable.display(), port, pid = ?child.id(), "browser spawned");

	let mut process = ChromeProcess {
		child,
		port,
		_profile_dir: profile_dir,
	};

	let probe = reqwest::Client::builder()
		.timeout(PROBE_TIMEOUT)
		.build()
		.map_err(|e| RuntimeError::Probe(format!("failed to create HTTP client: {e}")))?;
	let version_url = format!("http://127.0.0.1:{port}/json/version");

	let mut last_error = "endpoint not reachable".to_string();
	for _ in 0..PROBE_ATTEMPTS {
		tokio::time::sleep(PROBE_INTERVAL).await;

		if let Ok(Some(status)) = process.child.try_wait() {
			return Err(RuntimeError::EarlyExit(status.to_string()));
		}

		match read_version(&probe, &version_url).await {
			Ok(info) => return Ok((process, info)),
			Err(reason) => last_error = reason,
		}
	}

	Err(RuntimeError::EndpointUnavailable { port, last_error })
}

/// One `/json/version` request. Failures are only reasons to keep polling.
async fn read_version(client: &reqwest::Client, url: &str) -> std::result::Result<CdpVersionInfo, String> {
	let response = client.get(url).send().await.map_err(|e| e.to_string())?;
	if !response.status().is_success() {
		return Err(format!("unexpected status {}", response.status()));
	}
	response
		.json::<CdpVersionInfo>()
		.await
		.map_err(|e| format!("unreadable version payload: {e}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn args_carry_profile_and_masking_flags() {
		let profile = LaunchProfile::default().with_user_agent("TestAgent/1.0");
		let args = chrome_args(9333, Path::new("/tmp/profile"), &profile);

		assert!(args.contains(&"--remote-debugging-port=9333".to_string()));
		assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
		assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
		assert!(args.contains(&"--user-agent=TestAgent/1.0".to_string()));
		assert!(args.contains(&"--window-size=1920,1080".to_string()));
		assert!(args.contains(&"--headless=new".to_string()));
	}

	#[test]
	fn headed_profile_omits_headless_flag() {
		let profile = LaunchProfile::default().with_headless(false);
		let args = chrome_args(9333, Path::new("/tmp/profile"), &profile);
		assert!(!args.iter().any(|arg| arg.starts_with("--headless")));
	}
}
