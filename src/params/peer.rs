use bitflags::bitflags;
use libc::c_int;

use super::SocketOption;
use crate::addr::{SctpAddr, decode_storage, encode_storage};
use crate::socket::{AssocId, Scope};
use crate::sys::{Fields, FieldsMut, SCTP_GET_PEER_ADDR_INFO, SCTP_PEER_ADDR_PARAMS, SOCKADDR_STORAGE_LEN};

bitflags! {
	/// `spp_flags` of [`PeerAddressParams`].
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct SppFlags: u32 {
		const HB_ENABLE = 1 << 0;
		const HB_DISABLE = 1 << 1;
		/// Send one heartbeat right away.
		const HB_DEMAND = 1 << 2;
		const PMTUD_ENABLE = 1 << 3;
		const PMTUD_DISABLE = 1 << 4;
		const SACKDELAY_ENABLE = 1 << 5;
		const SACKDELAY_DISABLE = 1 << 6;
		/// `hb_interval` of 0 means "no delay" instead of "unchanged".
		const HB_TIME_IS_ZERO = 1 << 7;
		const IPV6_FLOWLABEL = 1 << 8;
		const DSCP = 1 << 9;
	}
}

impl Default for SppFlags {
	fn default() -> Self {
		Self::empty()
	}
}

named_codes! {
	/// Reachability of one peer address (`spinfo_state`).
	PathState: i32 {
		Inactive = 0 => "INACTIVE",
		PotentiallyFailed = 1 => "PF",
		Active = 2 => "ACTIVE",
		Unconfirmed = 3 => "UNCONFIRMED",
		Unknown = 0xffff => "UNKNOWN",
	}
}

/*
struct sctp_paddrparams is packed, aligned(4):
  ┌────────┬──────────────────────┬──────────┐
  │ offset │ field                │ type     │
  ├────────┼──────────────────────┼──────────┤
  │ 0      │ spp_assoc_id         │ i32      │
  │ 4      │ spp_address          │ 128 B    │
  │ 132    │ spp_hbinterval       │ u32      │
  │ 136    │ spp_pathmaxrxt       │ u16      │
  │ 138    │ spp_pathmtu          │ u32      │
  │ 142    │ spp_sackdelay        │ u32      │
  │ 146    │ spp_flags            │ u32      │
  │ 150    │ spp_ipv6_flowlabel   │ u32      │
  │ 154    │ spp_dscp             │ u8       │
  └────────┴──────────────────────┴──────────┘
  156 bytes with tail padding.
*/
const PADDRPARAMS_LEN: usize = 156;
const PADDRINFO_LEN: usize = 152;

/// Per-path tuning (`struct sctp_paddrparams`).
///
/// With `addr` unset the values apply to every path of the association.
/// `hb_interval`, `path_max_retransmissions`, `path_mtu` and `sack_delay`
/// treat 0 as unchanged; the `flags` select which toggles apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeerAddressParams {
	pub assoc_id: AssocId,
	pub addr: Option<SctpAddr>,
	/// Heartbeat interval in milliseconds.
	pub hb_interval: u32,
	pub path_max_retransmissions: u16,
	/// Only honoured with `PMTUD_DISABLE`.
	pub path_mtu: u32,
	/// Milliseconds; only honoured with `SACKDELAY_ENABLE`.
	pub sack_delay: u32,
	pub flags: SppFlags,
	pub ipv6_flowlabel: u32,
	pub dscp: u8,
}

impl PeerAddressParams {
	pub fn query(assoc_id: AssocId, addr: Option<SctpAddr>) -> Self {
		Self { assoc_id, addr, ..Self::default() }
	}
}

impl SocketOption for PeerAddressParams {
	const NAME: c_int = SCTP_PEER_ADDR_PARAMS;
	const LABEL: &'static str = "SCTP_PEER_ADDR_PARAMS";
	const SCOPE: Scope = Scope::Association;

	fn assoc_id(&self) -> AssocId {
		self.assoc_id
	}

	fn encode(&self) -> Vec<u8> {
		let mut raw = vec![0u8; PADDRPARAMS_LEN];
		encode_storage(self.addr.as_ref(), &mut raw[4..4 + SOCKADDR_STORAGE_LEN]);
		let mut w = FieldsMut(&mut raw);
		w.put_i32(0, self.assoc_id.0);
		w.put_u32(132, self.hb_interval);
		w.put_u16(136, self.path_max_retransmissions);
		w.put_u32(138, self.path_mtu);
		w.put_u32(142, self.sack_delay);
		w.put_u32(146, self.flags.bits());
		w.put_u32(150, self.ipv6_flowlabel);
		w.put_u8(154, self.dscp);
		raw
	}

	fn decode(raw: &[u8]) -> Self {
		let f = Fields(raw);
		Self {
			assoc_id: AssocId(f.i32(0).unwrap_or(0)),
			addr: f.bytes(4, SOCKADDR_STORAGE_LEN).and_then(decode_storage),
			hb_interval: f.u32(132).unwrap_or(0),
			path_max_retransmissions: f.u16(136).unwrap_or(0),
			path_mtu: f.u32(138).unwrap_or(0),
			sack_delay: f.u32(142).unwrap_or(0),
			flags: SppFlags::from_bits_retain(f.u32(146).unwrap_or(0)),
			ipv6_flowlabel: f.u32(150).unwrap_or(0),
			dscp: f.u8(154).unwrap_or(0),
		}
	}
}

/// Read-only state of one peer address (`struct sctp_paddrinfo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeerAddressInfo {
	pub assoc_id: AssocId,
	pub addr: Option<SctpAddr>,
	/// `None` only when the kernel reply stopped short of the state field.
	pub state: Option<PathState>,
	/// Congestion window in bytes.
	pub cwnd: u32,
	/// Smoothed round-trip time, milliseconds.
	pub srtt: u32,
	/// Current retransmission timeout, milliseconds.
	pub rto: u32,
	pub mtu: u32,
}

impl PeerAddressInfo {
	pub fn query(assoc_id: AssocId, addr: SctpAddr) -> Self {
		Self { assoc_id, addr: Some(addr), ..Self::default() }
	}
}

impl SocketOption for PeerAddressInfo {
	const NAME: c_int = SCTP_GET_PEER_ADDR_INFO;
	const LABEL: &'static str = "SCTP_GET_PEER_ADDR_INFO";
	const SCOPE: Scope = Scope::Association;

	fn assoc_id(&self) -> AssocId {
		self.assoc_id
	}

	fn encode(&self) -> Vec<u8> {
		let mut raw = vec![0u8; PADDRINFO_LEN];
		encode_storage(self.addr.as_ref(), &mut raw[4..4 + SOCKADDR_STORAGE_LEN]);
		let mut w = FieldsMut(&mut raw);
		w.put_i32(0, self.assoc_id.0);
		w.put_i32(132, self.state.map_or(0, PathState::raw));
		w.put_u32(136, self.cwnd);
		w.put_u32(140, self.srtt);
		w.put_u32(144, self.rto);
		w.put_u32(148, self.mtu);
		raw
	}

	fn decode(raw: &[u8]) -> Self {
		let f = Fields(raw);
		Self {
			assoc_id: AssocId(f.i32(0).unwrap_or(0)),
			addr: f.bytes(4, SOCKADDR_STORAGE_LEN).and_then(decode_storage),
			state: f.i32(132).map(PathState::from_raw),
			cwnd: f.u32(136).unwrap_or(0),
			srtt: f.u32(140).unwrap_or(0),
			rto: f.u32(144).unwrap_or(0),
			mtu: f.u32(148).unwrap_or(0),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn paddrparams_packed_offsets() {
		let p = PeerAddressParams {
			assoc_id: AssocId(2),
			addr: Some(SctpAddr::parse("10.1.1.1", 36412).unwrap()),
			hb_interval: 5000,
			path_max_retransmissions: 3,
			path_mtu: 1400,
			sack_delay: 40,
			flags: SppFlags::HB_ENABLE | SppFlags::PMTUD_DISABLE,
			ipv6_flowlabel: 0,
			dscp: 46,
		};
		let raw = p.encode();
		assert_eq!(raw.len(), PADDRPARAMS_LEN);
		assert_eq!(u16::from_ne_bytes([raw[136], raw[137]]), 3);
		assert_eq!(u32::from_ne_bytes([raw[138], raw[139], raw[140], raw[141]]), 1400);
		assert_eq!(raw[154], 46);
		assert_eq!(PeerAddressParams::decode(&raw), p);
	}

	#[test]
	fn paddrinfo_reads_state() {
		let mut raw = PeerAddressInfo::query(AssocId(1), SctpAddr::parse("::1", 9).unwrap()).encode();
		FieldsMut(&mut raw).put_i32(132, 2);
		FieldsMut(&mut raw).put_u32(148, 1500);
		let info = PeerAddressInfo::decode(&raw);
		assert_eq!(info.state, Some(PathState::Active));
		assert_eq!(info.mtu, 1500);
	}
}
