//! Typed SCTP sockets for Linux.
//!
//! [`SctpSocket`] wraps one kernel SCTP socket of either style, checks
//! association ids and style rules before touching the kernel, and turns
//! option structures, ancillary data and notification records into plain
//! Rust values. Native calls go through the [`Transport`] trait; [`Kernel`]
//! is the `libc` implementation.
//!
//! ```no_run
//! use sctplane::{Destination, Family, SctpSocket, SendOptions, Style};
//!
//! # fn main() -> sctplane::Result<()> {
//! let socket = SctpSocket::new(Family::Inet, Style::SingleAssociation)?;
//! socket.connect(("127.0.0.1", 36412u16))?;
//! socket.send(b"hello", Destination::Connected, &SendOptions::new().stream(1))?;
//! let reply = socket.receive(4096)?;
//! println!("{} bytes, complete: {}", reply.payload.len(), reply.is_complete());
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod macros;

pub mod addr;
pub mod event;
pub mod params;
pub mod socket;
pub mod sys;
pub mod transport;
mod error;

pub use self::error::{Errno, Result, SctpError, errno};
pub use self::addr::{Family, SctpAddr, SocketAddrV4, SocketAddrV6, ToSctpAddr};
pub use self::event::{Decoder, EventSubscription, MessageMetadata, Notification};
pub use self::params::{
	AssocParams, AutoCommit, InitParams, PeerAddressInfo, PeerAddressParams, RtoInfo, SppFlags,
	Status,
};
pub use self::socket::{
	AssocId, Association, BindAction, BufferConfig, Destination, Event, Received, RecvFlags,
	ReuseConfig, SctpSocket, SendFlags, SendOptions, SocketBuilder, Style,
};
pub use self::transport::{Features, Kernel, RawMessage, Shutdown, Transport};

/// Looks up the display name of a raw code in a `(code, name)` table.
///
/// Shared by every named code enumeration in the crate.
pub fn describe<R: PartialEq + Copy>(table: &[(R, &'static str)], raw: R) -> Option<&'static str> {
	table.iter().find(|(code, _)| *code == raw).map(|&(_, name)| name)
}
