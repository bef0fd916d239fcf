use libc::c_int;

use super::{PeerAddressInfo, SocketOption};
use crate::socket::{AssocId, Scope};
use crate::sys::{Fields, FieldsMut, SCTP_STATUS};

named_codes! {
	/// Protocol state of an association (`sstat_state`).
	AssocState: i32 {
		Empty = 0 => "EMPTY",
		Closed = 1 => "CLOSED",
		CookieWait = 2 => "COOKIE_WAIT",
		CookieEchoed = 3 => "COOKIE_ECHOED",
		Established = 4 => "ESTABLISHED",
		ShutdownPending = 5 => "SHUTDOWN_PENDING",
		ShutdownSent = 6 => "SHUTDOWN_SENT",
		ShutdownReceived = 7 => "SHUTDOWN_RECEIVED",
		ShutdownAckSent = 8 => "SHUTDOWN_ACK_SENT",
	}
}

const STATUS_LEN: usize = 24 + 152;

/// Snapshot of one association (`struct sctp_status`). Read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
	pub assoc_id: AssocId,
	pub state: Option<AssocState>,
	/// Peer's receive window.
	pub rwnd: u32,
	pub unacked_data: u16,
	pub pending_data: u16,
	pub inbound_streams: u16,
	pub outbound_streams: u16,
	pub fragmentation_point: u32,
	/// The current primary path.
	pub primary: PeerAddressInfo,
}

impl Status {
	pub fn query(assoc_id: AssocId) -> Self {
		Self { assoc_id, ..Self::default() }
	}

	pub fn is_established(&self) -> bool {
		self.state == Some(AssocState::Established)
	}
}

impl SocketOption for Status {
	const NAME: c_int = SCTP_STATUS;
	const LABEL: &'static str = "SCTP_STATUS";
	const SCOPE: Scope = Scope::Association;

	fn assoc_id(&self) -> AssocId {
		self.assoc_id
	}

	fn encode(&self) -> Vec<u8> {
		let mut raw = vec![0u8; STATUS_LEN];
		raw[24..].copy_from_slice(&self.primary.encode());
		let mut w = FieldsMut(&mut raw);
		w.put_i32(0, self.assoc_id.0);
		w.put_i32(4, self.state.map_or(0, AssocState::raw));
		w.put_u32(8, self.rwnd);
		w.put_u16(12, self.unacked_data);
		w.put_u16(14, self.pending_data);
		w.put_u16(16, self.inbound_streams);
		w.put_u16(18, self.outbound_streams);
		w.put_u32(20, self.fragmentation_point);
		raw
	}

	fn decode(raw: &[u8]) -> Self {
		let f = Fields(raw);
		Self {
			assoc_id: AssocId(f.i32(0).unwrap_or(0)),
			state: f.i32(4).map(AssocState::from_raw),
			rwnd: f.u32(8).unwrap_or(0),
			unacked_data: f.u16(12).unwrap_or(0),
			pending_data: f.u16(14).unwrap_or(0),
			inbound_streams: f.u16(16).unwrap_or(0),
			outbound_streams: f.u16(18).unwrap_or(0),
			fragmentation_point: f.u32(20).unwrap_or(0),
			primary: PeerAddressInfo::decode(f.tail(24)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::addr::SctpAddr;
	use crate::params::PathState;

	#[test]
	fn status_embeds_primary_paddrinfo() {
		let status = Status {
			assoc_id: AssocId(11),
			state: Some(AssocState::Established),
			rwnd: 106_496,
			unacked_data: 1,
			pending_data: 0,
			inbound_streams: 10,
			outbound_streams: 5,
			fragmentation_point: 1452,
			primary: PeerAddressInfo {
				assoc_id: AssocId(11),
				addr: Some(SctpAddr::parse("127.0.0.1", 5000).unwrap()),
				state: Some(PathState::Active),
				cwnd: 4380,
				srtt: 1,
				rto: 3000,
				mtu: 1500,
			},
		};
		let raw = status.encode();
		assert_eq!(raw.len(), 176);
		let back = Status::decode(&raw);
		assert_eq!(back, status);
		assert!(back.is_established());
	}
}
