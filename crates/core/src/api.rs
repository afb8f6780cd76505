//! Authenticated GETs against the digital API.
//!
//! Every call follows the same two-attempt sequence:
//!
//! ```text
//! First --401--> forced refresh --> Retry --401--> AuthFailure
//!   |                                 |
//!   +--other--> done                  +--other--> done
//! ```
//!
//! Transport errors end the sequence at whichever attempt they occur.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::credential::Credential;
use crate::error::FetchError;
use crate::manager::CredentialSource;
use crate::partition::format_date;

/// URL templates of the endpoints we call.
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
	host: String,
}

impl ApiEndpoints {
	pub fn new(host: impl Into<String>) -> Self {
		let host: String = host.into();
		Self {
			host: host.trim_end_matches('/').to_string(),
		}
	}

	/// `{host}/showtimes/by-business-date/{date}?siteIds={site}`
	pub fn showtimes_by_business_date(&self, site_id: &str, date: NaiveDate) -> String {
		let base = format!("{}/showtimes/by-business-date/{}", self.host, format_date(date));
		match Url::parse(&base) {
			Ok(mut url) => {
				url.query_pairs_mut().append_pair("siteIds", site_id);
				url.to_string()
			}
			Err(_) => format!("{base}?siteIds={site_id}"),
		}
	}

	/// `{host}/showtimes/{show}/seat-availability`
	pub fn seat_availability(&self, show_id: &str) -> String {
		format!("{}/showtimes/{show_id}/seat-availability", self.host)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
	First,
	Retry,
}

impl Attempt {
	fn number(self) -> u8 {
		match self {
			Attempt::First => 1,
			Attempt::Retry => 2,
		}
	}
}

/// A non-401 response.
#[derive(Debug)]
pub struct AuthorizedResponse {
	pub url: String,
	pub status: StatusCode,
	pub body: String,
	pub attempts: u8,
}

/// HTTP client that retries once with a refreshed credential on 401.
#[derive(Clone)]
pub struct AuthorizedClient {
	http: reqwest::Client,
	credentials: Arc<dyn CredentialSource>,
	delay: Duration,
}

impl AuthorizedClient {
	pub fn new(credentials: Arc<dyn CredentialSource>, timeout: Duration, delay: Duration) -> Result<Self, reqwest::Error> {
		let http = reqwest::Client::builder().timeout(timeout).build()?;
		Ok(Self { http, credentials, delay })
	}

	pub fn from_config(config: &Config, credentials: Arc<dyn CredentialSource>) -> Result<Self, reqwest::Error> {
		Self::new(credentials, config.request_timeout(), config.request_delay())
	}

	/// GETs `url`, replacing `credential` in place when a 401 forces a
	/// refresh. The replacement sticks even if the retry then fails, so
	/// callers keep the refreshed value for their next request.
	pub async fn get(&self, url: &str, credential: &mut Credential) -> Result<AuthorizedResponse, FetchError> {
		let mut attempt = Attempt::First;

		loop {
			let result = self.send_once(url, credential).await;
			self.pause().await;
			let (status, body) = result?;

			if status != StatusCode::UNAUTHORIZED {
				debug!(target = "showtimes.fetch", %url, %status, attempt = attempt.number(), "response received");
				return Ok(AuthorizedResponse {
					url: url.to_string(),
					status,
					body,
					attempts: attempt.number(),
				});
			}

			match attempt {
				Attempt::First => {
					warn!(target = "showtimes.fetch", %url, "401 unauthorized; refreshing credential and retrying");
					*credential = self.credentials.get_credential(true).await?;
					attempt = Attempt::Retry;
				}
				Attempt::Retry => {
					warn!(target = "showtimes.fetch", %url, "401 unauthorized after refresh; giving up");
					return Err(FetchError::AuthFailure { attempts: attempt.number() });
				}
			}
		}
	}

	async fn send_once(&self, url: &str, credential: &Credential) -> Result<(StatusCode, String), FetchError> {
		let transport = |source| FetchError::Transport {
			url: url.to_string(),
			source,
		};
		let response = self
			.http
			.get(url)
			.header(AUTHORIZATION, credential.as_str())
			.header(CONTENT_TYPE, "application/json")
			.header(ACCEPT, "application/json")
			.send()
			.await
			.map_err(transport)?;
		let status = response.status();
		let body = response.text().await.map_err(transport)?;
		Ok((status, body))
	}

	async fn pause(&self) {
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	#[test]
	fn showtimes_url_matches_upstream_template() {
		let endpoints = ApiEndpoints::new("https://digital-api.finnkino.fi/WSVistaWebClient/ocapi/v1/");
		assert_eq!(
			endpoints.showtimes_by_business_date("1014", ymd(2026, 1, 2)),
			"https://digital-api.finnkino.fi/WSVistaWebClient/ocapi/v1/showtimes/by-business-date/2026-01-02?siteIds=1014"
		);
	}

	#[test]
	fn site_ids_are_query_encoded() {
		let endpoints = ApiEndpoints::new("https://api.example.test");
		assert_eq!(
			endpoints.showtimes_by_business_date("10 14&x", ymd(2026, 1, 2)),
			"https://api.example.test/showtimes/by-business-date/2026-01-02?siteIds=10+14%26x"
		);
	}

	#[test]
	fn seat_url_embeds_show_id() {
		let endpoints = ApiEndpoints::new("https://api.example.test/v1");
		assert_eq!(endpoints.seat_availability("0000-123"), "https://api.example.test/v1/showtimes/0000-123/seat-availability");
	}
}
