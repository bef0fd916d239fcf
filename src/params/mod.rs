//! Typed views over SCTP association and peer-address socket options.
//!
//! Every object is a plain value: read it with the socket's getter, change
//! what you need, and write the whole object back. Several fields treat 0 as
//! "leave unchanged", so building a value from scratch and writing it can
//! be a no-op for those fields but will clobber the ones without that rule.

mod assoc;
mod auto;
mod init;
mod peer;
mod status;

pub use self::assoc::{AssocParams, RtoInfo};
pub use self::auto::{AutoCommit, Committable};
pub use self::init::InitParams;
pub use self::peer::{PathState, PeerAddressInfo, PeerAddressParams, SppFlags};
pub use self::status::{AssocState, Status};

use libc::c_int;

use crate::socket::{AssocId, Scope};

/// A socket option at `SOL_SCTP` with a fixed kernel layout.
///
/// `encode` produces the full structure, which doubles as the query for
/// `getsockopt` (the kernel reads the association id and address from it).
/// `decode` reads missing trailing fields as zero.
pub trait SocketOption: Sized {
	const NAME: c_int;
	/// Name used in error messages.
	const LABEL: &'static str;
	/// How the association id in this option is validated.
	const SCOPE: Scope;

	fn assoc_id(&self) -> AssocId;
	fn encode(&self) -> Vec<u8>;
	fn decode(raw: &[u8]) -> Self;
}
