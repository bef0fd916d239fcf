use crate::socket::AssocId;
use crate::sys::{Fields, FieldsMut, SNDRCVINFO_LEN};

/// Per-message metadata (`struct sctp_sndrcvinfo`).
///
/// Accompanies every received data message. Fields are only meaningful
/// when the `data_io` event is subscribed; otherwise they are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageMetadata {
	pub stream: u16,
	/// Stream sequence number.
	pub ssn: u16,
	pub flags: u16,
	/// Payload protocol identifier.
	pub ppid: u32,
	/// Opaque value echoed back in send-failure notifications.
	pub context: u32,
	/// Milliseconds; 0 means no limit.
	pub time_to_live: u32,
	pub tsn: u32,
	pub cumulative_tsn: u32,
	pub assoc_id: AssocId,
}

/*
struct sctp_sndrcvinfo (32 bytes):
  ┌────────┬──────────────────┬──────┐
  │ offset │ field            │ type │
  ├────────┼──────────────────┼──────┤
  │ 0      │ sinfo_stream     │ u16  │
  │ 2      │ sinfo_ssn        │ u16  │
  │ 4      │ sinfo_flags      │ u16  │
  │ 6      │ (padding)        │      │
  │ 8      │ sinfo_ppid       │ u32  │
  │ 12     │ sinfo_context    │ u32  │
  │ 16     │ sinfo_timetolive │ u32  │
  │ 20     │ sinfo_tsn        │ u32  │
  │ 24     │ sinfo_cumtsn     │ u32  │
  │ 28     │ sinfo_assoc_id   │ i32  │
  └────────┴──────────────────┴──────┘
*/

impl MessageMetadata {
	pub(crate) fn encode(&self) -> [u8; SNDRCVINFO_LEN] {
		let mut raw = [0u8; SNDRCVINFO_LEN];
		let mut w = FieldsMut(&mut raw);
		w.put_u16(0, self.stream);
		w.put_u16(2, self.ssn);
		w.put_u16(4, self.flags);
		w.put_u32(8, self.ppid);
		w.put_u32(12, self.context);
		w.put_u32(16, self.time_to_live);
		w.put_u32(20, self.tsn);
		w.put_u32(24, self.cumulative_tsn);
		w.put_i32(28, self.assoc_id.0);
		raw
	}

	/// Decodes a `sctp_sndrcvinfo`; `None` when fewer than 32 bytes remain.
	pub(crate) fn decode(raw: &[u8]) -> Option<Self> {
		let f = Fields(raw);
		Some(Self {
			stream: f.u16(0)?,
			ssn: f.u16(2)?,
			flags: f.u16(4)?,
			ppid: f.u32(8)?,
			context: f.u32(12)?,
			time_to_live: f.u32(16)?,
			tsn: f.u32(20)?,
			cumulative_tsn: f.u32(24)?,
			assoc_id: AssocId(f.i32(28)?),
		})
	}
}
