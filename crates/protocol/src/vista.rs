//! Response shapes of the Vista digital API.
//!
//! Only the envelope is typed. Documents are persisted verbatim, so unknown
//! fields are kept as raw JSON rather than modelled.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /showtimes/by-business-date/{date}?siteIds={site}` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowtimesPayload {
	#[serde(default)]
	pub showtimes: Vec<Value>,
	#[serde(default)]
	pub related_data: RelatedData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelatedData {
	#[serde(default)]
	pub films: Vec<Value>,
	#[serde(default)]
	pub screens: Vec<Value>,
	#[serde(default)]
	pub attributes: Vec<Value>,
}

/// A show reference pulled out of a stored showtimes document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRef {
	pub id: String,
	pub starts_at: Option<String>,
}

impl ShowRef {
	/// Reads a show entry, accepting the id spellings seen across API versions.
	pub fn from_showtime(entry: &Value) -> Option<Self> {
		let id = ["id", "showId", "show_id"]
			.iter()
			.find_map(|key| entry.get(*key))
			.and_then(|value| match value {
				Value::String(s) if !s.is_empty() => Some(s.clone()),
				Value::Number(n) => Some(n.to_string()),
				_ => None,
			})?;
		let starts_at = entry
			.get("schedule")
			.and_then(|schedule| schedule.get("startsAt"))
			.and_then(Value::as_str)
			.map(str::to_string);
		Some(Self { id, starts_at })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn payload_tolerates_missing_related_data() {
		let payload: ShowtimesPayload = serde_json::from_value(json!({"showtimes": [{"id": "1"}]})).unwrap();
		assert_eq!(payload.showtimes.len(), 1);
		assert!(payload.related_data.films.is_empty());
	}

	#[test]
	fn show_ref_accepts_alternate_id_keys() {
		let show = ShowRef::from_showtime(&json!({"showId": "A-1", "schedule": {"startsAt": "2026-01-02T18:00:00+02:00"}})).unwrap();
		assert_eq!(show.id, "A-1");
		assert_eq!(show.starts_at.as_deref(), Some("2026-01-02T18:00:00+02:00"));

		let numeric = ShowRef::from_showtime(&json!({"show_id": 42})).unwrap();
		assert_eq!(numeric.id, "42");
		assert_eq!(numeric.starts_at, None);
	}

	#[test]
	fn show_ref_skips_entries_without_id() {
		assert!(ShowRef::from_showtime(&json!({"schedule": {}})).is_none());
		assert!(ShowRef::from_showtime(&json!({"id": ""})).is_none());
	}
}
