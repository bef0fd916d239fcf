use tracing::warn;

use crate::addr::{SctpAddr, decode_storage};
use crate::error::{Result, SctpError};
use crate::event::MessageMetadata;
use crate::socket::AssocId;
use crate::sys::{
	Fields, NOTIFICATION_HEADER_LEN, SCTP_ADAPTATION_INDICATION, SCTP_ASSOC_CHANGE,
	SCTP_PARTIAL_DELIVERY_EVENT, SCTP_PEER_ADDR_CHANGE, SCTP_REMOTE_ERROR, SCTP_SEND_FAILED,
	SCTP_SHUTDOWN_EVENT, SNDRCVINFO_LEN, SOCKADDR_STORAGE_LEN,
};

named_codes! {
	/// Wire tag of a notification record.
	NotificationKind: u16 {
		AssociationChange = SCTP_ASSOC_CHANGE => "SCTP_ASSOC_CHANGE",
		PeerAddressChange = SCTP_PEER_ADDR_CHANGE => "SCTP_PEER_ADDR_CHANGE",
		SendFailed = SCTP_SEND_FAILED => "SCTP_SEND_FAILED",
		RemoteError = SCTP_REMOTE_ERROR => "SCTP_REMOTE_ERROR",
		Shutdown = SCTP_SHUTDOWN_EVENT => "SCTP_SHUTDOWN_EVENT",
		PartialDelivery = SCTP_PARTIAL_DELIVERY_EVENT => "SCTP_PARTIAL_DELIVERY_EVENT",
		Adaptation = SCTP_ADAPTATION_INDICATION => "SCTP_ADAPTATION_INDICATION",
	}
}

named_codes! {
	/// `sac_state` of an association change.
	AssocChangeState: u16 {
		CommUp = 0 => "COMM_UP",
		CommLost = 1 => "COMM_LOST",
		Restart = 2 => "RESTART",
		ShutdownComplete = 3 => "SHUTDOWN_COMP",
		CantStartAssociation = 4 => "CANT_STR_ASSOC",
	}
}

named_codes! {
	/// `spc_state` of a peer address change.
	PeerAddressState: i32 {
		Available = 0 => "ADDR_AVAILABLE",
		Unreachable = 1 => "ADDR_UNREACHABLE",
		Removed = 2 => "ADDR_REMOVED",
		Added = 3 => "ADDR_ADDED",
		MadePrimary = 4 => "ADDR_MADE_PRIM",
		Confirmed = 5 => "ADDR_CONFIRMED",
		PotentiallyFailed = 6 => "ADDR_POTENTIALLY_FAILED",
	}
}

named_codes! {
	/// Error detail reported with association and address changes.
	ErrorCause: u32 {
		FailedThreshold = 0x4 => "FAILED_THRESHOLD",
		HeartbeatSuccess = 0x8 => "HEARTBEAT_SUCCESS",
		ResponseToUserRequest = 0xf => "RESPONSE_TO_USER_REQ",
		InternalError = 0x10 => "INTERNAL_ERROR",
		ShutdownGuardExpires = 0x20 => "SHUTDOWN_GUARD_EXPIRES",
		ReceivedSack = 0x40 => "RECEIVED_SACK",
		PeerFaulty = 0x80 => "PEER_FAULTY",
	}
}

named_codes! {
	/// Flags of a send-failure notification.
	SendFailedFlag: u16 {
		DataUnsent = 0 => "DATA_UNSENT",
		DataSent = 1 => "DATA_SENT",
	}
}

named_codes! {
	/// `pdapi_indication` of a partial delivery event.
	PartialDeliveryIndication: u32 {
		Aborted = 0 => "PARTIAL_DELIVERY_ABORTED",
	}
}

/// An association came up, went down, or restarted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationChange {
	pub flags: u16,
	pub state: AssocChangeState,
	pub error: u16,
	pub outbound_streams: u16,
	pub inbound_streams: u16,
	pub assoc_id: AssocId,
	/// Trailing `sac_info` (ABORT cause or supported features), possibly empty.
	pub info: Vec<u8>,
}

impl AssociationChange {
	pub fn cause(&self) -> ErrorCause {
		ErrorCause::from_raw(self.error as u32)
	}
}

/// A path to the peer changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddressChange {
	pub flags: u16,
	pub addr: Option<SctpAddr>,
	pub state: PeerAddressState,
	pub error: i32,
	pub assoc_id: AssocId,
}

impl PeerAddressChange {
	pub fn cause(&self) -> ErrorCause {
		ErrorCause::from_raw(self.error as u32)
	}
}

/// A message could not be delivered; carries the undelivered payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendFailed {
	pub flags: SendFailedFlag,
	pub error: u32,
	/// Metadata the message was sent with, including its `context`.
	pub info: MessageMetadata,
	pub assoc_id: AssocId,
	pub data: Vec<u8>,
}

/// The peer sent an operational ERROR chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
	pub flags: u16,
	/// Cause code exactly as found in the record.
	pub error: u16,
	pub assoc_id: AssocId,
	/// Raw error-cause TLVs.
	pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownEvent {
	pub flags: u16,
	pub assoc_id: AssocId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialDeliveryEvent {
	pub flags: u16,
	pub indication: PartialDeliveryIndication,
	pub assoc_id: AssocId,
}

/// The peer announced its adaptation layer indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptationEvent {
	pub flags: u16,
	pub indication: u32,
	pub assoc_id: AssocId,
}

/// A decoded notification record. Exactly one variant per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
	AssociationChange(AssociationChange),
	PeerAddressChange(PeerAddressChange),
	SendFailed(SendFailed),
	RemoteError(RemoteError),
	Shutdown(ShutdownEvent),
	PartialDelivery(PartialDeliveryEvent),
	Adaptation(AdaptationEvent),
	/// A tag this crate has no decoder for.
	Unknown { kind: u16, flags: u16 },
}

impl Notification {
	pub fn kind(&self) -> NotificationKind {
		match self {
			Notification::AssociationChange(_) => NotificationKind::AssociationChange,
			Notification::PeerAddressChange(_) => NotificationKind::PeerAddressChange,
			Notification::SendFailed(_) => NotificationKind::SendFailed,
			Notification::RemoteError(_) => NotificationKind::RemoteError,
			Notification::Shutdown(_) => NotificationKind::Shutdown,
			Notification::PartialDelivery(_) => NotificationKind::PartialDelivery,
			Notification::Adaptation(_) => NotificationKind::Adaptation,
			Notification::Unknown { kind, .. } => NotificationKind::from_raw(*kind),
		}
	}

	/// The association the record is about; `None` for unknown records.
	pub fn assoc_id(&self) -> Option<AssocId> {
		match self {
			Notification::AssociationChange(n) => Some(n.assoc_id),
			Notification::PeerAddressChange(n) => Some(n.assoc_id),
			Notification::SendFailed(n) => Some(n.assoc_id),
			Notification::RemoteError(n) => Some(n.assoc_id),
			Notification::Shutdown(n) => Some(n.assoc_id),
			Notification::PartialDelivery(n) => Some(n.assoc_id),
			Notification::Adaptation(n) => Some(n.assoc_id),
			Notification::Unknown { .. } => None,
		}
	}
}

/// Turns raw notification records into [`Notification`]s.
///
/// Unknown tags decode to `Notification::Unknown` with a warning, or fail
/// with `UnrecognizedEvent` when `raise_on_unknown` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
	pub raise_on_unknown: bool,
}

impl Decoder {
	pub fn new(raise_on_unknown: bool) -> Self {
		Self { raise_on_unknown }
	}

	pub fn decode(&self, raw: &[u8]) -> Result<Notification> {
		let f = Fields(raw);
		let kind = f.u16(0).unwrap_or(0);
		let truncated = || SctpError::MalformedRecord { kind, len: raw.len() };

		if raw.len() < NOTIFICATION_HEADER_LEN {
			return Err(truncated());
		}
		let flags = f.u16(2).ok_or_else(truncated)?;
		// The header length bounds the trailing data, never the fixed fields.
		let end = f.u32(4).map_or(raw.len(), |len| (len as usize).min(raw.len()));
		let trailing = |at: usize| raw.get(at..end).unwrap_or(&[]).to_vec();

		let n = match NotificationKind::from_raw(kind) {
			NotificationKind::AssociationChange => Notification::AssociationChange(AssociationChange {
				flags,
				state: AssocChangeState::from_raw(f.u16(8).ok_or_else(truncated)?),
				error: f.u16(10).ok_or_else(truncated)?,
				outbound_streams: f.u16(12).ok_or_else(truncated)?,
				inbound_streams: f.u16(14).ok_or_else(truncated)?,
				assoc_id: AssocId(f.i32(16).ok_or_else(truncated)?),
				info: trailing(20),
			}),
			NotificationKind::PeerAddressChange => {
				let slot = f.bytes(8, SOCKADDR_STORAGE_LEN).ok_or_else(truncated)?;
				Notification::PeerAddressChange(PeerAddressChange {
					flags,
					addr: decode_storage(slot),
					state: PeerAddressState::from_raw(f.i32(136).ok_or_else(truncated)?),
					error: f.i32(140).ok_or_else(truncated)?,
					assoc_id: AssocId(f.i32(144).ok_or_else(truncated)?),
				})
			}
			NotificationKind::SendFailed => {
				let info = f.bytes(12, SNDRCVINFO_LEN).ok_or_else(truncated)?;
				Notification::SendFailed(SendFailed {
					flags: SendFailedFlag::from_raw(flags),
					error: f.u32(8).ok_or_else(truncated)?,
					info: MessageMetadata::decode(info).ok_or_else(truncated)?,
					assoc_id: AssocId(f.i32(44).ok_or_else(truncated)?),
					data: trailing(48),
				})
			}
			NotificationKind::RemoteError => Notification::RemoteError(RemoteError {
				flags,
				error: f.u16(8).ok_or_else(truncated)?,
				assoc_id: AssocId(f.i32(12).ok_or_else(truncated)?),
				data: trailing(16),
			}),
			NotificationKind::Shutdown => Notification::Shutdown(ShutdownEvent {
				flags,
				assoc_id: AssocId(f.i32(8).ok_or_else(truncated)?),
			}),
			NotificationKind::PartialDelivery => Notification::PartialDelivery(PartialDeliveryEvent {
				flags,
				indication: PartialDeliveryIndication::from_raw(f.u32(8).ok_or_else(truncated)?),
				assoc_id: AssocId(f.i32(12).ok_or_else(truncated)?),
			}),
			NotificationKind::Adaptation => Notification::Adaptation(AdaptationEvent {
				flags,
				indication: f.u32(8).ok_or_else(truncated)?,
				assoc_id: AssocId(f.i32(12).ok_or_else(truncated)?),
			}),
			NotificationKind::Other(kind) => {
				if self.raise_on_unknown {
					return Err(SctpError::UnrecognizedEvent { kind, flags });
				}
				warn!(kind, flags, "unrecognized SCTP notification type {:#06x}", kind);
				Notification::Unknown { kind, flags }
			}
		};
		Ok(n)
	}
}

/// Decodes with the default (lenient) policy.
pub fn decode(raw: &[u8]) -> Result<Notification> {
	Decoder::default().decode(raw)
}
