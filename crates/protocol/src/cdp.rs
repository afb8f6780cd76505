//! Chrome DevTools Protocol envelopes and the few event payloads we consume.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `/json/version` response subset.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpVersionInfo {
	#[serde(rename = "webSocketDebuggerUrl")]
	pub web_socket_debugger_url: String,
	#[serde(rename = "Browser")]
	pub browser: Option<String>,
	#[serde(rename = "User-Agent", default)]
	pub user_agent: Option<String>,
}

/// Command sent to the browser endpoint.
///
/// ```json
/// { "id": 7, "method": "Page.navigate", "params": { "url": "..." }, "sessionId": "..." }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CdpCommand {
	pub id: u32,
	pub method: String,
	pub params: Value,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

/// Reply correlated to a [`CdpCommand`] by `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponse {
	pub id: u32,
	#[serde(default)]
	pub result: Option<Value>,
	#[serde(default)]
	pub error: Option<CdpErrorPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CdpErrorPayload {
	pub code: i64,
	pub message: String,
}

/// Unsolicited notification. Events carry no `id`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdpEvent {
	pub method: String,
	#[serde(default)]
	pub params: Value,
	#[serde(default)]
	pub session_id: Option<String>,
}

/// Either side of the inbound stream, discriminated by presence of `id`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CdpMessage {
	Response(CdpResponse),
	Event(CdpEvent),
}

/// `Network.requestWillBeSent` parameters (subset).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWillBeSent {
	pub request_id: String,
	pub request: NetworkRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkRequest {
	pub url: String,
	#[serde(default)]
	pub method: Option<String>,
	#[serde(default)]
	pub headers: HashMap<String, String>,
}

/// `Network.requestWillBeSentExtraInfo` parameters (subset).
///
/// Carries the headers actually put on the wire, which can include
/// `Authorization` values that the renderer-side event omits.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWillBeSentExtraInfo {
	pub request_id: String,
	#[serde(default)]
	pub headers: HashMap<String, String>,
}

/// `Page.lifecycleEvent` parameters (subset).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
	pub frame_id: String,
	#[serde(default)]
	pub loader_id: Option<String>,
	pub name: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn message_with_id_is_a_response() {
		let msg: CdpMessage = serde_json::from_str(r#"{"id": 3, "result": {"frameId": "F"}}"#).unwrap();
		match msg {
			CdpMessage::Response(resp) => {
				assert_eq!(resp.id, 3);
				assert_eq!(resp.result.unwrap()["frameId"], "F");
			}
			CdpMessage::Event(_) => panic!("expected response"),
		}
	}

	#[test]
	fn message_without_id_is_an_event() {
		let msg: CdpMessage = serde_json::from_str(
			r#"{"method": "Page.lifecycleEvent", "params": {"frameId": "F", "name": "networkIdle", "loaderId": "L", "timestamp": 1.0}, "sessionId": "S"}"#,
		)
		.unwrap();
		let CdpMessage::Event(event) = msg else {
			panic!("expected event");
		};
		assert_eq!(event.session_id.as_deref(), Some("S"));
		let lifecycle: LifecycleEvent = serde_json::from_value(event.params).unwrap();
		assert_eq!(lifecycle.name, "networkIdle");
		assert_eq!(lifecycle.loader_id.as_deref(), Some("L"));
	}

	#[test]
	fn error_response_keeps_message() {
		let msg: CdpMessage = serde_json::from_str(r#"{"id": 9, "error": {"code": -32000, "message": "No target"}}"#).unwrap();
		let CdpMessage::Response(resp) = msg else {
			panic!("expected response");
		};
		assert_eq!(resp.error.unwrap().message, "No target");
	}

	#[test]
	fn command_omits_missing_session() {
		let cmd = CdpCommand {
			id: 1,
			method: "Target.createBrowserContext".into(),
			params: serde_json::json!({}),
			session_id: None,
		};
		let text = serde_json::to_string(&cmd).unwrap();
		assert!(!text.contains("sessionId"));
	}
}
