//! Wire types for the showtime scraper.
//!
//! This crate contains the serde-serializable shapes exchanged with the two
//! remote parties the scraper talks to:
//!
//! * the browser, over the Chrome DevTools Protocol ([`cdp`])
//! * the Vista digital API that serves showtimes ([`vista`])
//!
//! Types in this crate are pure data. Behaviour lives in `showtimes-runtime`
//! and `showtimes-core`.

pub mod cdp;
pub mod vista;

pub use cdp::*;
pub use vista::*;
