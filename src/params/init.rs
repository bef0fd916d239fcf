use libc::c_int;

use super::SocketOption;
use crate::socket::{AssocId, Scope};
use crate::sys::{Fields, FieldsMut, SCTP_INITMSG};

/// Parameters for new associations (`struct sctp_initmsg`).
///
/// Applies to associations opened after it is set. Zero in any field keeps
/// the kernel default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InitParams {
	/// Outbound streams to request.
	pub num_ostreams: u16,
	/// Most inbound streams to accept.
	pub max_instreams: u16,
	/// INIT retransmissions before giving up.
	pub max_attempts: u16,
	/// Upper bound of the INIT retransmission timer, in milliseconds.
	pub max_init_timeo: u16,
}

impl InitParams {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn streams(mut self, outbound: u16, max_inbound: u16) -> Self {
		self.num_ostreams = outbound;
		self.max_instreams = max_inbound;
		self
	}

	pub fn attempts(mut self, attempts: u16) -> Self {
		self.max_attempts = attempts;
		self
	}

	pub fn init_timeout(mut self, millis: u16) -> Self {
		self.max_init_timeo = millis;
		self
	}
}

impl SocketOption for InitParams {
	const NAME: c_int = SCTP_INITMSG;
	const LABEL: &'static str = "SCTP_INITMSG";
	const SCOPE: Scope = Scope::Endpoint;

	fn assoc_id(&self) -> AssocId {
		AssocId::NONE
	}

	fn encode(&self) -> Vec<u8> {
		let mut raw = vec![0u8; 8];
		let mut w = FieldsMut(&mut raw);
		w.put_u16(0, self.num_ostreams);
		w.put_u16(2, self.max_instreams);
		w.put_u16(4, self.max_attempts);
		w.put_u16(6, self.max_init_timeo);
		raw
	}

	fn decode(raw: &[u8]) -> Self {
		let f = Fields(raw);
		Self {
			num_ostreams: f.u16(0).unwrap_or(0),
			max_instreams: f.u16(2).unwrap_or(0),
			max_attempts: f.u16(4).unwrap_or(0),
			max_init_timeo: f.u16(6).unwrap_or(0),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_fills_initmsg() {
		let init = InitParams::new().streams(10, 10).attempts(4).init_timeout(3000);
		let raw = init.encode();
		assert_eq!(raw.len(), 8);
		assert_eq!(InitParams::decode(&raw), init);
	}
}
