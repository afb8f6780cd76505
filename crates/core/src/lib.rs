//! Showtime collection for Vista-backed cinema sites.
//!
//! The digital API only answers requests carrying a short-lived bearer
//! credential that the public site's own scripts obtain. This crate keeps
//! such a credential around ([`CredentialStore`]), obtains a new one by
//! watching a real browser load the site ([`CredentialAcquirer`]), decides
//! which of the two to use ([`CredentialManager`]) and performs
//! authenticated fetches that retry once on `401` ([`ShowtimeFetchClient`],
//! [`SeatAvailabilityClient`]).
//!
//! Fetched documents land in an ISO-week partitioned tree described by
//! [`PartitionLayout`].

pub mod acquirer;
pub mod api;
pub mod config;
pub mod credential;
pub mod date;
pub mod error;
pub mod manager;
pub mod partition;
pub mod seats;
pub mod showtimes;
pub mod store;

pub use acquirer::{AcquireRequest, CredentialAcquire, CredentialAcquirer, DEFAULT_GRACE, HostMatcher};
pub use api::{ApiEndpoints, AuthorizedClient, AuthorizedResponse};
pub use config::Config;
pub use credential::{Credential, Validity};
pub use date::{date_range, next_or_current_friday, parse_business_date};
pub use error::{ConfigError, CredentialDecodeError, CredentialUnavailable, FetchError, InvalidDate};
pub use manager::{CredentialManager, CredentialSource};
pub use partition::{PartitionLayout, format_date};
pub use seats::{SeatAvailabilityClient, SeatFetchOutcome, show_refs, stored_show_refs};
pub use showtimes::{ShowtimeFetchClient, ShowtimeFetchOutcome, ShowtimeRequest};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, TokenRecord};
