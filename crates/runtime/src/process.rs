//! Port helpers for launching a browser with a private debugging endpoint.

use std::net::TcpListener;

/// Asks the OS for an unused localhost port.
///
/// The listener is released before returning, so another process may still
/// take the port. Launch then fails with [`RuntimeError::EndpointUnavailable`]
/// or [`RuntimeError::EarlyExit`], which the acquirer treats as no credential.
///
/// [`RuntimeError::EndpointUnavailable`]: crate::RuntimeError::EndpointUnavailable
/// [`RuntimeError::EarlyExit`]: crate::RuntimeError::EarlyExit
pub fn free_local_port() -> std::io::Result<u16> {
	let listener = TcpListener::bind(("127.0.0.1", 0))?;
	Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn free_port_is_bindable() {
		let port = free_local_port().unwrap();
		assert_ne!(port, 0);
		assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
	}
}
