//! Per-cinema, per-day showtime documents.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use showtimes_protocol::ShowtimesPayload;
use tracing::info;

use crate::api::{ApiEndpoints, AuthorizedClient};
use crate::credential::Credential;
use crate::error::FetchError;
use crate::partition::{PartitionLayout, format_date};

/// One theater on one business day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowtimeRequest {
	pub site_id: String,
	pub date: NaiveDate,
}

impl ShowtimeRequest {
	pub fn new(site_id: impl Into<String>, date: NaiveDate) -> Self {
		Self {
			site_id: site_id.into(),
			date,
		}
	}
}

impl fmt::Display for ShowtimeRequest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "site {} on {}", self.site_id, format_date(self.date))
	}
}

/// A persisted showtimes document.
#[derive(Debug)]
pub struct ShowtimeFetchOutcome {
	pub path: PathBuf,
	pub payload: Value,
	pub attempts: u8,
}

pub struct ShowtimeFetchClient {
	api: AuthorizedClient,
	endpoints: ApiEndpoints,
	layout: PartitionLayout,
}

impl ShowtimeFetchClient {
	pub fn new(api: AuthorizedClient, endpoints: ApiEndpoints, layout: PartitionLayout) -> Self {
		Self { api, endpoints, layout }
	}

	pub fn layout(&self) -> &PartitionLayout {
		&self.layout
	}

	/// Fetches and stores one document. `credential` is updated in place when
	/// a refresh happens, whether or not the fetch then succeeds.
	pub async fn fetch_showtimes(&self, credential: &mut Credential, request: &ShowtimeRequest) -> Result<ShowtimeFetchOutcome, FetchError> {
		let url = self.endpoints.showtimes_by_business_date(&request.site_id, request.date);
		let response = self.api.get(&url, credential).await?;

		if !response.status.is_success() {
			return Err(FetchError::Status {
				url,
				status: response.status,
			});
		}

		let payload = decode_showtimes(&url, &response.body)?;
		let path = self.layout.showtimes_path(&request.site_id, request.date);
		write_json(&path, &payload)?;
		info!(target = "showtimes.fetch", %request, path = %path.display(), "showtimes saved");

		Ok(ShowtimeFetchOutcome {
			path,
			payload,
			attempts: response.attempts,
		})
	}
}

/// Parses a body as a showtimes document, keeping the raw JSON.
fn decode_showtimes(url: &str, body: &str) -> Result<Value, FetchError> {
	let decode = |reason: String| FetchError::Decode { url: url.to_string(), reason };
	let value: Value = serde_json::from_str(body).map_err(|e| decode(e.to_string()))?;
	ShowtimesPayload::deserialize(&value).map_err(|e| decode(e.to_string()))?;
	Ok(value)
}

pub(crate) fn write_json(path: &Path, value: &Value) -> Result<(), FetchError> {
	let text = serde_json::to_string_pretty(value).map_err(|e| FetchError::Persist {
		path: path.to_path_buf(),
		source: e.into(),
	})?;
	write_text(path, &text)
}

pub(crate) fn write_text(path: &Path, text: &str) -> Result<(), FetchError> {
	let persist = |source| FetchError::Persist {
		path: path.to_path_buf(),
		source,
	};
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).map_err(persist)?;
	}
	std::fs::write(path, text).map_err(persist)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn showtimes_document_decodes() {
		let body = r#"{"showtimes": [{"id": "1"}], "relatedData": {"films": [], "screens": [], "attributes": []}}"#;
		let value = decode_showtimes("u", body).unwrap();
		assert_eq!(value["showtimes"][0]["id"], "1");
	}

	#[test]
	fn html_body_is_a_decode_failure() {
		let err = decode_showtimes("u", "<html>blocked</html>").unwrap_err();
		assert!(matches!(err, FetchError::Decode { .. }));
	}

	#[test]
	fn wrong_shape_is_a_decode_failure() {
		assert!(matches!(decode_showtimes("u", "[1, 2]"), Err(FetchError::Decode { .. })));
		assert!(matches!(decode_showtimes("u", r#"{"showtimes": 5}"#), Err(FetchError::Decode { .. })));
	}

	#[test]
	fn request_display_names_site_and_date() {
		let request = ShowtimeRequest::new("1014", NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
		assert_eq!(request.to_string(), "site 1014 on 2026-01-02");
	}
}
