//! Linux SCTP ABI: option names, flag values, and record layouts.
//!
//! Every structure the kernel exchanges with us is encoded by hand at fixed
//! offsets in native byte order (see `include/uapi/linux/sctp.h`). Structures
//! the kernel declares `packed, aligned(4)` have no padding after the
//! embedded `sockaddr_storage`.

use libc::c_int;

/// Option level for all SCTP socket options.
pub const SOL_SCTP: c_int = libc::IPPROTO_SCTP;
pub const IPPROTO_SCTP: c_int = libc::IPPROTO_SCTP;

pub const SCTP_RTOINFO: c_int = 0;
pub const SCTP_ASSOCINFO: c_int = 1;
pub const SCTP_INITMSG: c_int = 2;
pub const SCTP_NODELAY: c_int = 3;
pub const SCTP_AUTOCLOSE: c_int = 4;
pub const SCTP_SET_PEER_PRIMARY_ADDR: c_int = 5;
pub const SCTP_PRIMARY_ADDR: c_int = 6;
pub const SCTP_ADAPTATION_LAYER: c_int = 7;
pub const SCTP_DISABLE_FRAGMENTS: c_int = 8;
pub const SCTP_PEER_ADDR_PARAMS: c_int = 9;
pub const SCTP_EVENTS: c_int = 11;
pub const SCTP_I_WANT_MAPPED_V4_ADDR: c_int = 12;
pub const SCTP_MAXSEG: c_int = 13;
pub const SCTP_STATUS: c_int = 14;
pub const SCTP_GET_PEER_ADDR_INFO: c_int = 15;
pub const SCTP_AUTO_ASCONF: c_int = 30;
pub const SCTP_SOCKOPT_BINDX_ADD: c_int = 100;
pub const SCTP_SOCKOPT_BINDX_REM: c_int = 101;
pub const SCTP_SOCKOPT_PEELOFF: c_int = 102;
pub const SCTP_GET_PEER_ADDRS: c_int = 108;
pub const SCTP_GET_LOCAL_ADDRS: c_int = 109;
pub const SCTP_SOCKOPT_CONNECTX: c_int = 110;
pub const SCTP_PR_SUPPORTED: c_int = 113;

/// Control message type carrying `sctp_sndrcvinfo`.
pub const SCTP_SNDRCV: c_int = 1;

/// `msg_flags` bit set when the payload is a notification record.
pub const MSG_NOTIFICATION: c_int = 0x8000;

/*
Notification type tags. The kernel numbers them from SCTP_SN_TYPE_BASE:
  ┌─────────────────────────────┬────────┐
  │ SCTP_ASSOC_CHANGE           │ 0x8001 │
  │ SCTP_PEER_ADDR_CHANGE       │ 0x8002 │
  │ SCTP_SEND_FAILED            │ 0x8003 │
  │ SCTP_REMOTE_ERROR           │ 0x8004 │
  │ SCTP_SHUTDOWN_EVENT         │ 0x8005 │
  │ SCTP_PARTIAL_DELIVERY_EVENT │ 0x8006 │
  │ SCTP_ADAPTATION_INDICATION  │ 0x8007 │
  └─────────────────────────────┴────────┘
Anything else decodes as Unknown.
*/
pub const SCTP_SN_TYPE_BASE: u16 = 0x8000;
pub const SCTP_ASSOC_CHANGE: u16 = SCTP_SN_TYPE_BASE + 1;
pub const SCTP_PEER_ADDR_CHANGE: u16 = SCTP_SN_TYPE_BASE + 2;
pub const SCTP_SEND_FAILED: u16 = SCTP_SN_TYPE_BASE + 3;
pub const SCTP_REMOTE_ERROR: u16 = SCTP_SN_TYPE_BASE + 4;
pub const SCTP_SHUTDOWN_EVENT: u16 = SCTP_SN_TYPE_BASE + 5;
pub const SCTP_PARTIAL_DELIVERY_EVENT: u16 = SCTP_SN_TYPE_BASE + 6;
pub const SCTP_ADAPTATION_INDICATION: u16 = SCTP_SN_TYPE_BASE + 7;

/// Size of `struct sockaddr_storage` as embedded in SCTP structures.
pub const SOCKADDR_STORAGE_LEN: usize = 128;
/// Size of `struct sctp_sndrcvinfo`.
pub const SNDRCVINFO_LEN: usize = 32;
/// Size of the notification header (`type`, `flags`, `length`).
pub const NOTIFICATION_HEADER_LEN: usize = 8;
/// Bytes of `struct sctp_event_subscribe` this crate reads and writes.
pub const EVENT_SUBSCRIBE_LEN: usize = 8;
/// Size of `struct sctp_prim` and `struct sctp_setpeerprim`.
pub const PRIM_LEN: usize = 4 + SOCKADDR_STORAGE_LEN;
/// Header of `struct sctp_getaddrs` (assoc id, address count).
pub const GETADDRS_HEADER_LEN: usize = 8;
/// Buffer handed to the kernel for address list queries.
pub const GETADDRS_BUF_LEN: usize = 64 * 1024;

/// Read-only view over a native record with bounds-checked field access.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fields<'a>(pub &'a [u8]);

impl<'a> Fields<'a> {
	pub fn bytes(&self, at: usize, len: usize) -> Option<&'a [u8]> {
		self.0.get(at..at.checked_add(len)?)
	}

	/// Everything from `at` to the end of the record (empty when past it).
	pub fn tail(&self, at: usize) -> &'a [u8] {
		self.0.get(at..).unwrap_or(&[])
	}

	pub fn u8(&self, at: usize) -> Option<u8> {
		self.0.get(at).copied()
	}

	pub fn u16(&self, at: usize) -> Option<u16> {
		let b = self.bytes(at, 2)?;
		Some(u16::from_ne_bytes([b[0], b[1]]))
	}

	pub fn u32(&self, at: usize) -> Option<u32> {
		let b = self.bytes(at, 4)?;
		Some(u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
	}

	pub fn i32(&self, at: usize) -> Option<i32> {
		self.u32(at).map(|v| v as i32)
	}
}

/// Write view over a buffer sized for the record being encoded.
///
/// Callers allocate the full structure up front, so writes never run past
/// the end of the buffer.
pub(crate) struct FieldsMut<'a>(pub &'a mut [u8]);

impl FieldsMut<'_> {
	pub fn put_bytes(&mut self, at: usize, src: &[u8]) {
		self.0[at..at + src.len()].copy_from_slice(src);
	}

	pub fn put_u8(&mut self, at: usize, v: u8) {
		self.0[at] = v;
	}

	pub fn put_u16(&mut self, at: usize, v: u16) {
		self.put_bytes(at, &v.to_ne_bytes());
	}

	pub fn put_u32(&mut self, at: usize, v: u32) {
		self.put_bytes(at, &v.to_ne_bytes());
	}

	pub fn put_i32(&mut self, at: usize, v: i32) {
		self.put_bytes(at, &v.to_ne_bytes());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fields_are_bounds_checked() {
		let raw = [1u8, 0, 2, 0, 0, 0];
		let f = Fields(&raw);
		assert_eq!(f.u16(0), Some(u16::from_ne_bytes([1, 0])));
		assert_eq!(f.u32(2), Some(u32::from_ne_bytes([2, 0, 0, 0])));
		assert_eq!(f.u32(4), None);
		assert!(f.tail(10).is_empty());
	}

	#[test]
	fn writes_land_at_offsets() {
		let mut raw = [0u8; 8];
		let mut w = FieldsMut(&mut raw);
		w.put_u16(2, 0xabcd);
		w.put_i32(4, -1);
		let f = Fields(&raw);
		assert_eq!(f.u16(2), Some(0xabcd));
		assert_eq!(f.i32(4), Some(-1));
	}
}
