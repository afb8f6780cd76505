//! CDP request/response correlation over a websocket.
//!
//! Commands get sequential ids and a oneshot channel each. A background task
//! reads the socket, completes pending commands by id and forwards everything
//! without an id as an event.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use showtimes_protocol::{CdpCommand, CdpErrorPayload, CdpEvent, CdpMessage};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use crate::error::{Result, RuntimeError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Pending = Arc<Mutex<HashMap<u32, oneshot::Sender<std::result::Result<Value, CdpErrorPayload>>>>>;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

pub struct CdpConnection {
	writer: tokio::sync::Mutex<SplitSink<WsStream, Message>>,
	pending: Pending,
	next_id: AtomicU32,
	reader: JoinHandle<()>,
}

impl CdpConnection {
	/// Connects to a browser or page websocket endpoint.
	pub async fn connect(url: &str) -> Result<(Self, mpsc::UnboundedReceiver<CdpEvent>)> {
		let (stream, _) = tokio_tungstenite::connect_async(url).await?;
		let (writer, reader) = stream.split();
		let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
		let (event_tx, event_rx) = mpsc::unbounded_channel();
		let reader = tokio::spawn(read_loop(reader, Arc::clone(&pending), event_tx));

		debug!(target = "showtimes.browser", %url, "cdp connected");

		Ok((
			Self {
				writer: tokio::sync::Mutex::new(writer),
				pending,
				next_id: AtomicU32::new(1),
				reader,
			},
			event_rx,
		))
	}

	/// Sends `method` and waits for its reply.
	pub async fn send(&self, method: &str, params: Value, session_id: Option<&str>) -> Result<Value> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let (tx, rx) = oneshot::channel();
		self.pending.lock().insert(id, tx);

		let command = CdpCommand {
			id,
			method: method.to_string(),
			params,
			session_id: session_id.map(str::to_string),
		};
		let text = serde_json::to_string(&command)?;
		trace!(target = "showtimes.browser", id, %method, "cdp send");

		if let Err(err) = self.writer.lock().await.send(Message::Text(text.into())).await {
			self.pending.lock().remove(&id);
			return Err(err.into());
		}

		match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
			Ok(Ok(Ok(value))) => Ok(value),
			Ok(Ok(Err(payload))) => Err(RuntimeError::Protocol {
				method: method.to_string(),
				message: payload.message,
			}),
			Ok(Err(_)) => Err(RuntimeError::ConnectionClosed),
			Err(_) => {
				self.pending.lock().remove(&id);
				Err(RuntimeError::CommandTimeout(method.to_string()))
			}
		}
	}
}

impl Drop for CdpConnection {
	fn drop(&mut self) {
		self.reader.abort();
	}
}

async fn read_loop(mut reader: SplitStream<WsStream>, pending: Pending, events: mpsc::UnboundedSender<CdpEvent>) {
	while let Some(frame) = reader.next().await {
		let text = match frame {
			Ok(Message::Text(text)) => text,
			Ok(Message::Close(_)) => break,
			Ok(_) => continue,
			Err(err) => {
				debug!(target = "showtimes.browser", error = %err, "cdp socket error");
				break;
			}
		};

		match serde_json::from_str::<CdpMessage>(&text) {
			Ok(CdpMessage::Response(response)) => {
				let Some(tx) = pending.lock().remove(&response.id) else {
					continue;
				};
				let outcome = match response.error {
					Some(error) => Err(error),
					None => Ok(response.result.unwrap_or(Value::Null)),
				};
				let _ = tx.send(outcome);
			}
			Ok(CdpMessage::Event(event)) => {
				if events.send(event).is_err() {
					trace!(target = "showtimes.browser", "event receiver dropped");
				}
			}
			Err(err) => trace!(target = "showtimes.browser", error = %err, "unrecognised cdp frame"),
		}
	}

	// Dropping the senders fails every waiter with ConnectionClosed.
	pending.lock().clear();
}
