//! The native transport boundary.
//!
//! [`Transport`] is the complete set of native operations the socket layer
//! uses. Socket options travel as opaque byte buffers keyed by level and
//! name; the caller encodes them in kernel layout. Every failure is the raw
//! OS errno, unmodified.

mod kernel;

pub use self::kernel::Kernel;

use std::os::fd::RawFd;

use libc::c_int;

use crate::addr::{Family, SctpAddr};
use crate::error::Errno;
use crate::event::MessageMetadata;
use crate::socket::Style;

/// Which optional SCTP extensions the native stack offers.
///
/// Produced once by the transport's probe; sockets consult it before
/// attempting the matching operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Features {
	/// The stack lives in the kernel.
	pub kernel: bool,
	/// Multi-address connect (`sctp_connectx`).
	pub connectx: bool,
	pub peeloff: bool,
	/// Requesting the peer's primary path (`SCTP_SET_PEER_PRIMARY_ADDR`).
	pub set_primary: bool,
	/// Partial reliability (RFC 3758).
	pub prsctp: bool,
	/// Dynamic address reconfiguration (RFC 5061).
	pub addip: bool,
	/// Sends may name an association id instead of an address.
	pub send_to_association: bool,
}

/// How to shut down one or both halves of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
	Read,   // SHUT_RD
	Write,  // SHUT_WR
	ReadWrite,   // SHUT_RDWR
}

/// One message as the native receive call reports it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawMessage {
	pub from: Option<SctpAddr>,
	/// `msg_flags` of the receive call.
	pub flags: c_int,
	pub data: Vec<u8>,
	/// Ancillary `sctp_sndrcvinfo`, absent when `data_io` is off.
	pub info: Option<MessageMetadata>,
}

/// Native SCTP socket operations.
///
/// Implementations are cheap handles (`Clone`), shared by every socket
/// created from them, including peeled-off and accepted sockets.
pub trait Transport: Clone {
	fn features(&self) -> Features;

	fn open(&self, family: Family, style: Style) -> Result<RawFd, Errno>;
	fn close(&self, fd: RawFd) -> Result<(), Errno>;
	fn set_nonblocking(&self, fd: RawFd, nonblocking: bool) -> Result<(), Errno>;

	/// `getsockopt`: `buf` holds the request on entry and the reply on
	/// return. Returns the reply length.
	fn get_option(&self, fd: RawFd, level: c_int, name: c_int, buf: &mut [u8]) -> Result<usize, Errno>;
	/// `setsockopt`. Returns the call's non-negative result, which some
	/// options (multi-address connect) use to hand back an id.
	fn set_option(&self, fd: RawFd, level: c_int, name: c_int, buf: &[u8]) -> Result<c_int, Errno>;

	fn bind(&self, fd: RawFd, addr: &SctpAddr) -> Result<(), Errno>;
	fn connect(&self, fd: RawFd, addr: &SctpAddr) -> Result<(), Errno>;
	fn listen(&self, fd: RawFd, backlog: i32) -> Result<(), Errno>;
	/// Returns the new descriptor and the peer address, when it could be read.
	fn accept(&self, fd: RawFd) -> Result<(RawFd, Option<SctpAddr>), Errno>;
	fn shutdown(&self, fd: RawFd, how: Shutdown) -> Result<(), Errno>;

	/// Sends one message. `to` of `None` uses the connected peer or the
	/// association named in `info`.
	fn send(&self, fd: RawFd, payload: &[u8], to: Option<&SctpAddr>, info: &MessageMetadata) -> Result<usize, Errno>;
	/// Receives at most `max_len` bytes of one message.
	fn recv(&self, fd: RawFd, max_len: usize) -> Result<RawMessage, Errno>;
}
