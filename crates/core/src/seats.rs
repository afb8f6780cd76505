//! Seat availability for the shows of a stored showtimes document.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde_json::Value;
use showtimes_protocol::ShowRef;
use tracing::{debug, info, warn};

use crate::api::{ApiEndpoints, AuthorizedClient};
use crate::credential::Credential;
use crate::error::FetchError;
use crate::partition::PartitionLayout;
use crate::showtimes::{write_json, write_text};

/// Shows listed in the stored document for `site_id` on `date`.
///
/// A missing or unreadable document yields no shows.
pub fn stored_show_refs(layout: &PartitionLayout, site_id: &str, date: NaiveDate) -> Vec<ShowRef> {
	let Some(path) = layout.find_showtimes(site_id, date) else {
		debug!(target = "showtimes.seats", site_id, %date, "no stored showtimes");
		return Vec::new();
	};
	let document = match std::fs::read_to_string(&path).map(|text| serde_json::from_str::<Value>(&text)) {
		Ok(Ok(document)) => document,
		Ok(Err(err)) => {
			warn!(target = "showtimes.seats", path = %path.display(), error = %err, "stored showtimes are not JSON");
			return Vec::new();
		}
		Err(err) => {
			warn!(target = "showtimes.seats", path = %path.display(), error = %err, "failed to read stored showtimes");
			return Vec::new();
		}
	};
	show_refs(&document)
}

/// Extracts show references from a showtimes document.
pub fn show_refs(document: &Value) -> Vec<ShowRef> {
	document
		.get("showtimes")
		.and_then(Value::as_array)
		.map(|entries| entries.iter().filter_map(ShowRef::from_showtime).collect())
		.unwrap_or_default()
}

#[derive(Debug)]
pub struct SeatFetchOutcome {
	pub path: PathBuf,
	/// `false` when the body was not JSON and was stored verbatim.
	pub json: bool,
}

pub struct SeatAvailabilityClient {
	api: AuthorizedClient,
	endpoints: ApiEndpoints,
	layout: PartitionLayout,
}

impl SeatAvailabilityClient {
	pub fn new(api: AuthorizedClient, endpoints: ApiEndpoints, layout: PartitionLayout) -> Self {
		Self { api, endpoints, layout }
	}

	/// Fetches one show's seat map into `<week>/seat_availability/`.
	///
	/// Files are stamped with the local scrape time (`HHMMSS`) so repeated
	/// runs build a history.
	pub async fn fetch_seat_availability(&self, credential: &mut Credential, show_id: &str, date: NaiveDate) -> Result<SeatFetchOutcome, FetchError> {
		let url = self.endpoints.seat_availability(show_id);
		let response = self.api.get(&url, credential).await?;

		if !response.status.is_success() {
			return Err(FetchError::Status {
				url,
				status: response.status,
			});
		}

		let stamp = Local::now().format("%H%M%S");
		let path = self
			.layout
			.seat_availability_dir(date)
			.join(format!("seat_availability_{show_id}_{stamp}.json"));

		let json = match serde_json::from_str::<Value>(&response.body) {
			Ok(document) => {
				write_json(&path, &document)?;
				true
			}
			Err(_) => {
				write_text(&path, &response.body)?;
				false
			}
		};
		info!(target = "showtimes.seats", show_id, json, path = %path.display(), "seat availability saved");

		Ok(SeatFetchOutcome {
			path,
			json,
		})
	}
}
