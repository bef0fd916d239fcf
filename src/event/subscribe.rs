use crate::sys::{EVENT_SUBSCRIBE_LEN, Fields};

/// Which notifications the kernel delivers (`struct sctp_event_subscribe`).
///
/// Data messages always arrive. `data_io` only controls whether their
/// [`MessageMetadata`](crate::MessageMetadata) is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventSubscription {
	pub data_io: bool,
	pub association: bool,
	pub address: bool,
	pub send_failure: bool,
	pub peer_error: bool,
	pub shutdown: bool,
	pub partial_delivery: bool,
	pub adaptation_layer: bool,
}

impl EventSubscription {
	/// Turns every notification off but keeps `data_io` on, so message
	/// boundaries stay observable.
	pub fn clear(&mut self) {
		*self = Self { data_io: true, ..Self::default() };
	}

	/// A subscription with every event enabled.
	pub fn all() -> Self {
		Self {
			data_io: true,
			association: true,
			address: true,
			send_failure: true,
			peer_error: true,
			shutdown: true,
			partial_delivery: true,
			adaptation_layer: true,
		}
	}

	/*
	The kernel struct keeps growing (authentication, sender dry, stream reset ...).
	Only the first eight one-byte flags are read or written, so newer events
	are left as the kernel has them.
	*/
	pub(crate) fn encode(&self) -> [u8; EVENT_SUBSCRIBE_LEN] {
		[
			self.data_io as u8,
			self.association as u8,
			self.address as u8,
			self.send_failure as u8,
			self.peer_error as u8,
			self.shutdown as u8,
			self.partial_delivery as u8,
			self.adaptation_layer as u8,
		]
	}

	pub(crate) fn decode(raw: &[u8]) -> Option<Self> {
		let f = Fields(raw);
		let flag = |at| f.u8(at).map(|v| v != 0);
		Some(Self {
			data_io: flag(0)?,
			association: flag(1)?,
			address: flag(2)?,
			send_failure: flag(3)?,
			peer_error: flag(4)?,
			shutdown: flag(5)?,
			partial_delivery: flag(6)?,
			adaptation_layer: flag(7)?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn flag_order_matches_kernel() {
		let sub = EventSubscription { shutdown: true, ..Default::default() };
		assert_eq!(sub.encode(), [0, 0, 0, 0, 0, 1, 0, 0]);
		assert_eq!(EventSubscription::decode(&[0, 0, 0, 0, 0, 1, 0, 0, 1, 1]), Some(sub));
	}

	#[test]
	fn short_buffer_does_not_decode() {
		assert_eq!(EventSubscription::decode(&[1; 7]), None);
	}

	proptest! {
		#[test]
		fn clear_keeps_only_data_io(raw in proptest::array::uniform8(0u8..=1)) {
			let mut sub = EventSubscription::decode(&raw).unwrap();
			sub.clear();
			prop_assert_eq!(sub.encode(), [1, 0, 0, 0, 0, 0, 0, 0]);
		}
	}
}
