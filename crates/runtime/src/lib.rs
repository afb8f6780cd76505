//! Browser capability used to capture API credentials from live traffic.
//!
//! [`BrowserDriver`] and [`BrowserSession`] describe the only thing the
//! credential layer needs from a browser: open an isolated page, navigate it,
//! and report the requests it makes. [`ChromeDriver`] implements that over the
//! Chrome DevTools Protocol against a locally launched Chromium.

pub mod chrome;
pub mod connection;
pub mod driver;
pub mod error;
pub mod process;

pub use chrome::{ChromeDriver, ChromeSession};
pub use connection::CdpConnection;
pub use driver::{BrowserDriver, BrowserSession, LaunchProfile, MASK_WEBDRIVER_SCRIPT, ObservedRequest, PageEvent, Viewport};
pub use error::{Result, RuntimeError};
