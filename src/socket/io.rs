//! Message send and receive.
//!
//! Every send carries an `sctp_sndrcvinfo` built from [`SendOptions`] and the
//! socket defaults. Every receive reports exactly one [`Event`]: decoded
//! notification or data metadata.

use bitflags::bitflags;
use tracing::trace;

use super::SctpSocket;
use super::style::{AssocId, Operation, Scope};
use crate::addr::SctpAddr;
use crate::error::{Result, SctpError};
use crate::event::{MessageMetadata, Notification};
use crate::sys::MSG_NOTIFICATION;
use crate::transport::Transport;

bitflags! {
	/// `sinfo_flags` of an outgoing message.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct SendFlags: u16 {
		/// Deliver without regard to stream order.
		const UNORDERED = 1 << 0;
		/// Send to the given address instead of the primary path.
		const ADDR_OVER = 1 << 1;
		/// Abort the association.
		const ABORT = 1 << 2;
		const SACK_IMMEDIATELY = 1 << 3;
		/// Send to every association of the socket.
		const SENDALL = 1 << 6;
		/// Gracefully shut down the association (`MSG_FIN`).
		const EOF = 0x200;
	}
}

impl Default for SendFlags {
	fn default() -> Self {
		Self::empty()
	}
}

bitflags! {
	/// `msg_flags` of a received message.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct RecvFlags: i32 {
		/// The message is complete, or ends here.
		const EOR = libc::MSG_EOR;
		/// The payload is a notification record.
		const NOTIFICATION = MSG_NOTIFICATION;
	}
}

/// Where a message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
	/// The peer of a connected socket, or of the only association.
	Connected,
	/// A peer address; a new association is opened on multi-association
	/// sockets when none exists yet.
	Address(SctpAddr),
	/// An existing association of a multi-association socket.
	Association(AssocId),
}

impl From<SctpAddr> for Destination {
	fn from(addr: SctpAddr) -> Self {
		Destination::Address(addr)
	}
}

impl From<AssocId> for Destination {
	fn from(id: AssocId) -> Self {
		Destination::Association(id)
	}
}

/// Per-message send parameters. Unset fields take the socket defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendOptions {
	/// Payload protocol id; defaults to the socket's adaptation indication.
	pub ppid: Option<u32>,
	pub flags: SendFlags,
	/// Defaults to [`SctpSocket::stream_id`].
	pub stream: Option<u16>,
	/// Milliseconds, 0 meaning forever; defaults to [`SctpSocket::ttl`].
	pub ttl: Option<u32>,
	/// Opaque value echoed back in `SendFailed` notifications.
	pub context: u32,
}

impl SendOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn ppid(mut self, ppid: u32) -> Self {
		self.ppid = Some(ppid);
		self
	}

	pub fn flags(mut self, flags: SendFlags) -> Self {
		self.flags = flags;
		self
	}

	pub fn stream(mut self, stream: u16) -> Self {
		self.stream = Some(stream);
		self
	}

	pub fn ttl(mut self, millis: u32) -> Self {
		self.ttl = Some(millis);
		self
	}

	pub fn context(mut self, context: u32) -> Self {
		self.context = context;
		self
	}
}

/// What a receive produced besides the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
	/// Data, or association teardown when the payload is empty. Metadata is
	/// all zero unless `data_io` is subscribed.
	Data(MessageMetadata),
	Notification(Notification),
}

/// One received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
	pub from: Option<SctpAddr>,
	pub flags: RecvFlags,
	/// Always empty for notifications.
	pub payload: Vec<u8>,
	pub event: Event,
}

impl Received {
	pub fn is_notification(&self) -> bool {
		self.flags.contains(RecvFlags::NOTIFICATION)
	}

	/// An empty data message: the peer closed the association.
	pub fn is_teardown(&self) -> bool {
		!self.is_notification() && self.payload.is_empty()
	}

	/// False for a fragment; the caller appends the next receive to it.
	pub fn is_complete(&self) -> bool {
		self.flags.contains(RecvFlags::EOR)
	}

	pub fn notification(&self) -> Option<&Notification> {
		match &self.event {
			Event::Notification(n) => Some(n),
			Event::Data(_) => None,
		}
	}

	pub fn metadata(&self) -> Option<&MessageMetadata> {
		match &self.event {
			Event::Data(info) => Some(info),
			Event::Notification(_) => None,
		}
	}
}

impl<T: Transport> SctpSocket<T> {
	/// Sends one message and returns the bytes the transport accepted.
	///
	/// An empty payload is only legal with `EOF` or `ABORT`; on a
	/// multi-association socket that closes just the named association.
	pub fn send(&self, payload: &[u8], to: Destination, options: &SendOptions) -> Result<usize> {
		if payload.is_empty() && !options.flags.intersects(SendFlags::EOF | SendFlags::ABORT) {
			return Err(SctpError::EmptyMessage);
		}

		let (addr, assoc_id) = match to {
			Destination::Connected => (None, AssocId::NONE),
			Destination::Address(addr) => (Some(addr), AssocId::NONE),
			Destination::Association(id) => {
				self.style().require(Operation::SendToAssociation)?;
				self.style().check_assoc_id(id, Scope::Association)?;
				if !self.features().send_to_association {
					return Err(SctpError::UnsupportedOperation {
						op: Operation::SendToAssociation.name(),
						reason: "transport addresses messages by peer address only",
					});
				}
				(None, id)
			}
		};

		let ppid = match options.ppid {
			Some(ppid) => ppid,
			// the adaptation read is part of this send
			None => self.adaptation().map_err(|e| match e.errno() {
				Some(errno) => SctpError::Transmission { errno },
				None => e,
			})?,
		};
		let info = MessageMetadata {
			stream: options.stream.unwrap_or(self.stream_id()),
			flags: options.flags.bits(),
			ppid,
			context: options.context,
			time_to_live: options.ttl.unwrap_or(self.ttl()),
			assoc_id,
			..MessageMetadata::default()
		};

		let sent = self
			.transport()
			.send(self.fd(), payload, addr.as_ref(), &info)
			.map_err(|errno| SctpError::Transmission { errno })?;
		trace!(fd = self.fd(), bytes = sent, stream = info.stream, ppid, assoc = %assoc_id, "sent message");
		Ok(sent)
	}

	/// Receives at most `max_len` bytes of one message.
	///
	/// A notification is decoded and its payload dropped. An empty data
	/// message means teardown. Anything else is data with its metadata.
	pub fn receive(&self, max_len: usize) -> Result<Received> {
		let raw = self
			.transport()
			.recv(self.fd(), max_len)
			.map_err(|errno| SctpError::Receive { errno })?;
		let flags = RecvFlags::from_bits_retain(raw.flags);

		if flags.contains(RecvFlags::NOTIFICATION) {
			let notification = self.decoder().decode(&raw.data)?;
			trace!(fd = self.fd(), kind = %notification.kind(), "received notification");
			return Ok(Received {
				from: raw.from,
				flags,
				payload: Vec::new(),
				event: Event::Notification(notification),
			});
		}

		// teardown carries no metadata, whatever ancillary data came along
		let info = match raw.info {
			Some(info) if !raw.data.is_empty() => info,
			_ => MessageMetadata::default(),
		};
		trace!(
			fd = self.fd(),
			bytes = raw.data.len(),
			eor = flags.contains(RecvFlags::EOR),
			stream = info.stream,
			"received message"
		);
		Ok(Received { from: raw.from, flags, payload: raw.data, event: Event::Data(info) })
	}
}
