use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
	#[error("could not find a Chrome/Chromium executable; install one or set CHROME_PATH")]
	BrowserNotFound,

	#[error("failed to launch browser at {path}: {source}")]
	Launch {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("browser exited before its debugging endpoint became available (status: {0})")]
	EarlyExit(String),

	#[error("debugging endpoint not available on port {port}: {last_error}")]
	EndpointUnavailable { port: u16, last_error: String },

	#[error("CDP probe failed: {0}")]
	Probe(String),

	#[error("websocket error: {0}")]
	WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

	#[error("CDP command {method} failed: {message}")]
	Protocol { method: String, message: String },

	#[error("CDP command {0} timed out")]
	CommandTimeout(String),

	#[error("CDP connection closed")]
	ConnectionClosed,

	#[error("navigation to {url} failed: {reason}")]
	Navigation { url: String, reason: String },

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}
