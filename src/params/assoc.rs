use libc::c_int;

use super::SocketOption;
use crate::socket::{AssocId, Scope};
use crate::sys::{Fields, FieldsMut, SCTP_ASSOCINFO, SCTP_RTOINFO};

/// Retransmission timeout bounds (`struct sctp_rtoinfo`), in milliseconds.
///
/// Zero in `initial`, `max` or `min` leaves that value unchanged. On a
/// multi-association socket, id 0 addresses the endpoint defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtoInfo {
	pub assoc_id: AssocId,
	pub initial: u32,
	pub max: u32,
	pub min: u32,
}

impl RtoInfo {
	pub fn query(assoc_id: AssocId) -> Self {
		Self { assoc_id, ..Self::default() }
	}
}

impl SocketOption for RtoInfo {
	const NAME: c_int = SCTP_RTOINFO;
	const LABEL: &'static str = "SCTP_RTOINFO";
	const SCOPE: Scope = Scope::Endpoint;

	fn assoc_id(&self) -> AssocId {
		self.assoc_id
	}

	fn encode(&self) -> Vec<u8> {
		let mut raw = vec![0u8; 16];
		let mut w = FieldsMut(&mut raw);
		w.put_i32(0, self.assoc_id.0);
		w.put_u32(4, self.initial);
		w.put_u32(8, self.max);
		w.put_u32(12, self.min);
		raw
	}

	fn decode(raw: &[u8]) -> Self {
		let f = Fields(raw);
		Self {
			assoc_id: AssocId(f.i32(0).unwrap_or(0)),
			initial: f.u32(4).unwrap_or(0),
			max: f.u32(8).unwrap_or(0),
			min: f.u32(12).unwrap_or(0),
		}
	}
}

/// Association-wide parameters (`struct sctp_assocparams`).
///
/// | field                 | access | zero means |
/// |-----------------------|--------|------------|
/// | `max_retransmissions` | rw     | unchanged  |
/// | `peer_destinations`   | ro     |            |
/// | `peer_rwnd`           | ro     |            |
/// | `local_rwnd`          | ro     |            |
/// | `cookie_life`         | rw     | unchanged  |
///
/// Writes to read-only fields are ignored by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssocParams {
	pub assoc_id: AssocId,
	pub max_retransmissions: u16,
	pub peer_destinations: u16,
	pub peer_rwnd: u32,
	pub local_rwnd: u32,
	/// Milliseconds.
	pub cookie_life: u32,
}

impl AssocParams {
	pub fn query(assoc_id: AssocId) -> Self {
		Self { assoc_id, ..Self::default() }
	}
}

impl SocketOption for AssocParams {
	const NAME: c_int = SCTP_ASSOCINFO;
	const LABEL: &'static str = "SCTP_ASSOCINFO";
	const SCOPE: Scope = Scope::Endpoint;

	fn assoc_id(&self) -> AssocId {
		self.assoc_id
	}

	fn encode(&self) -> Vec<u8> {
		let mut raw = vec![0u8; 20];
		let mut w = FieldsMut(&mut raw);
		w.put_i32(0, self.assoc_id.0);
		w.put_u16(4, self.max_retransmissions);
		w.put_u16(6, self.peer_destinations);
		w.put_u32(8, self.peer_rwnd);
		w.put_u32(12, self.local_rwnd);
		w.put_u32(16, self.cookie_life);
		raw
	}

	fn decode(raw: &[u8]) -> Self {
		let f = Fields(raw);
		Self {
			assoc_id: AssocId(f.i32(0).unwrap_or(0)),
			max_retransmissions: f.u16(4).unwrap_or(0),
			peer_destinations: f.u16(6).unwrap_or(0),
			peer_rwnd: f.u32(8).unwrap_or(0),
			local_rwnd: f.u32(12).unwrap_or(0),
			cookie_life: f.u32(16).unwrap_or(0),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn assocparams_layout() {
		let p = AssocParams {
			assoc_id: AssocId(3),
			max_retransmissions: 8,
			peer_destinations: 2,
			peer_rwnd: 65535,
			local_rwnd: 4096,
			cookie_life: 60_000,
		};
		let raw = p.encode();
		assert_eq!(raw.len(), 20);
		assert_eq!(u32::from_ne_bytes([raw[16], raw[17], raw[18], raw[19]]), 60_000);
		assert_eq!(AssocParams::decode(&raw), p);
	}

	#[test]
	fn short_reply_reads_as_zero() {
		let rto = RtoInfo::decode(&[0u8; 4]);
		assert_eq!(rto, RtoInfo::default());
	}
}
