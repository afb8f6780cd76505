//! Bearer credentials and their expiry.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CredentialDecodeError;

/// base64url that accepts payloads with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&URL_SAFE,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// An `Authorization` header value as captured from live traffic.
///
/// The value is sent back verbatim. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The compact token with any auth scheme prefix removed.
	fn token(&self) -> &str {
		let value = self.0.trim();
		match value.split_once(' ') {
			Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
			_ => value,
		}
	}

	/// Reads the `exp` claim, in seconds since the epoch.
	pub fn expires_at(&self) -> Result<i64, CredentialDecodeError> {
		let segments: Vec<&str> = self.token().split('.').collect();
		if segments.len() != 3 {
			return Err(CredentialDecodeError::SegmentCount(segments.len()));
		}

		let bytes = PAYLOAD_ENGINE
			.decode(segments[1])
			.map_err(|_| CredentialDecodeError::Base64)?;
		let payload: Value = serde_json::from_slice(&bytes).map_err(|_| CredentialDecodeError::Json)?;
		let exp = payload
			.as_object()
			.ok_or(CredentialDecodeError::Json)?
			.get("exp")
			.ok_or(CredentialDecodeError::MissingExpiry)?;

		exp.as_i64()
			.or_else(|| exp.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
			.ok_or(CredentialDecodeError::MissingExpiry)
	}

	/// Classifies the credential against `now` (seconds since the epoch).
	pub fn validity_at(&self, now: i64) -> Validity {
		match self.expires_at() {
			Ok(exp) if exp > now => Validity::Valid { expires_at: exp },
			Ok(exp) => Validity::Expired { expired_at: exp },
			Err(err) => Validity::Unparseable(err),
		}
	}

	/// Classifies the credential against the wall clock.
	pub fn validity(&self) -> Validity {
		self.validity_at(unix_now())
	}

	/// A short fingerprint safe to log.
	pub fn redacted(&self) -> String {
		let token = self.token();
		let tail: String = token.chars().rev().take(6).collect::<Vec<_>>().into_iter().rev().collect();
		format!("…{tail} ({} chars)", token.len())
	}
}

impl fmt::Debug for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Credential").field(&self.redacted()).finish()
	}
}

impl From<String> for Credential {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<&str> for Credential {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

/// Outcome of checking a credential's expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
	Valid { expires_at: i64 },
	Expired { expired_at: i64 },
	Unparseable(CredentialDecodeError),
}

impl Validity {
	pub fn is_valid(&self) -> bool {
		matches!(self, Validity::Valid { .. })
	}
}

pub(crate) fn unix_now() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs() as i64)
		.unwrap_or_default()
}
