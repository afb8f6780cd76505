//! Error types.
//!
//! Token decoding problems are ordinary steady-state conditions and only ever
//! show up inside [`Validity::Unparseable`](crate::credential::Validity).
//! Everything else propagates with `?`.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Why a token could not be read as a signed, expiring credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialDecodeError {
	#[error("expected 3 dot-separated segments, found {0}")]
	SegmentCount(usize),
	#[error("payload is not base64url")]
	Base64,
	#[error("payload is not a JSON object")]
	Json,
	#[error("payload has no numeric `exp` claim")]
	MissingExpiry,
}

/// No fresh credential could be acquired and nothing was cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unable to obtain a bearer credential: acquisition failed and no cached credential exists")]
pub struct CredentialUnavailable;

/// Terminal failure of one (site, date) fetch.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("unauthorized after {attempts} attempts with a refreshed credential")]
	AuthFailure { attempts: u8 },

	#[error("request to {url} failed: {source}")]
	Transport {
		url: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("response from {url} is not a showtimes document: {reason}")]
	Decode { url: String, reason: String },

	#[error("unexpected status {status} from {url}")]
	Status { url: String, status: StatusCode },

	#[error(transparent)]
	Credential(#[from] CredentialUnavailable),

	#[error("failed to write {path}: {source}")]
	Persist {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid config {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("invalid URL `{value}` for {field}: {source}")]
	Url {
		field: &'static str,
		value: String,
		#[source]
		source: url::ParseError,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date `{0}`: expected YYYY-MM-DD or D.M.YYYY")]
pub struct InvalidDate(pub String);
