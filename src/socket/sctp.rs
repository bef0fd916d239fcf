use std::os::fd::{AsRawFd, IntoRawFd, RawFd};

use libc::c_int;
use tracing::debug;

use super::options::{get_int, set_int};
use super::style::{AssocId, Operation, Scope, Style};
use crate::addr::{Family, SctpAddr, ToSctpAddr};
use crate::error::{Errno, Result, SctpError};
use crate::event::{Decoder, EventSubscription};
use crate::params::{
	AssocParams, AutoCommit, InitParams, PeerAddressInfo, PeerAddressParams, RtoInfo,
	SocketOption, Status,
};
use crate::sys::{
	Fields, FieldsMut, SCTP_ADAPTATION_LAYER, SCTP_AUTOCLOSE, SCTP_DISABLE_FRAGMENTS,
	SCTP_EVENTS, SCTP_I_WANT_MAPPED_V4_ADDR, SCTP_MAXSEG, SCTP_NODELAY,
	SCTP_SOCKOPT_PEELOFF, SOL_SCTP,
};
use crate::transport::{Features, Kernel, Shutdown, Transport};

/// An SCTP endpoint: one native socket of a fixed [`Style`].
///
/// The socket owns its descriptor and closes it exactly once, either through
/// [`close`](Self::close) or on drop. Style and association-id legality is
/// checked before anything reaches the transport.
///
/// `ttl` and `stream_id` are per-socket send defaults kept locally; every
/// other option is read from and written to the transport on each call.
#[derive(Debug)]
pub struct SctpSocket<T: Transport = Kernel> {
	fd: Option<RawFd>,
	family: Family,
	style: Style,
	transport: T,
	ttl: u32,
	stream_id: u16,
	decoder: Decoder,
}

/// Snapshot of one association, assembled from several queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
	pub id: AssocId,
	pub status: Status,
	/// Primary remote path.
	pub primary: Option<SctpAddr>,
	pub local: Vec<SctpAddr>,
	pub remote: Vec<SctpAddr>,
	pub inbound_streams: u16,
	pub outbound_streams: u16,
}

impl<T: Transport> SctpSocket<T> {
	/// Creates a new socket through `transport`.
	pub fn open(transport: T, family: Family, style: Style) -> Result<Self> {
		let fd = transport.open(family, style).map_err(|e| e.during("socket"))?;
		debug!(fd, %style, ?family, "opened SCTP socket");
		Ok(Self::wrap(transport, fd, family, style))
	}

	/// Wraps an already-open SCTP descriptor.
	///
	/// # Safety
	/// `fd` must be an open SCTP socket of the given family and style that
	/// nothing else will close.
	pub unsafe fn from_raw_fd(transport: T, fd: RawFd, family: Family, style: Style) -> Self {
		Self::wrap(transport, fd, family, style)
	}

	fn wrap(transport: T, fd: RawFd, family: Family, style: Style) -> Self {
		Self {
			fd: Some(fd),
			family,
			style,
			transport,
			ttl: 0,
			stream_id: 0,
			decoder: Decoder::default(),
		}
	}

	/// A single-association socket for a descriptor produced by this one
	/// (accept or peel-off). Send defaults and decoder policy carry over.
	fn derive(&self, fd: RawFd) -> Self {
		Self {
			fd: Some(fd),
			family: self.family,
			style: Style::SingleAssociation,
			transport: self.transport.clone(),
			ttl: self.ttl,
			stream_id: self.stream_id,
			decoder: self.decoder,
		}
	}

	/// Releases the descriptor, reporting the close error if any.
	pub fn close(mut self) -> Result<()> {
		if let Some(fd) = self.fd.take() {
			self.transport.close(fd).map_err(|e| e.during("close"))?;
			debug!(fd, "closed SCTP socket");
		}
		Ok(())
	}

	#[inline]
	pub(crate) fn fd(&self) -> RawFd {
		self.fd.unwrap_or(-1)
	}

	#[inline]
	pub(crate) fn transport(&self) -> &T {
		&self.transport
	}

	#[inline]
	pub fn style(&self) -> Style {
		self.style
	}

	#[inline]
	pub fn family(&self) -> Family {
		self.family
	}

	/// Extensions the underlying transport offers.
	pub fn features(&self) -> Features {
		self.transport.features()
	}

	/// Maps the transport's "unknown id" answers to `NoSuchAssociation`.
	///
	/// Only a real id on a multi-association socket can be unknown; every
	/// other failure keeps its errno.
	pub(crate) fn lookup_error(&self, id: AssocId, errno: Errno, op: &'static str) -> SctpError {
		let unknown = errno.0 == libc::EINVAL || errno.0 == libc::ENOENT;
		if unknown && self.style == Style::MultiAssociation && !id.is_none() {
			SctpError::NoSuchAssociation { id }
		} else {
			errno.during(op)
		}
	}

	// ------------------------------------------------------------------
	// Connection lifecycle
	// ------------------------------------------------------------------

	pub fn bind<A: ToSctpAddr>(&self, addr: A) -> Result<()> {
		let addr = addr.to_sctp_addr()?;
		self.transport.bind(self.fd(), &addr).map_err(|e| e.during("bind"))?;
		debug!(fd = self.fd(), %addr, "bound");
		Ok(())
	}

	pub fn connect<A: ToSctpAddr>(&self, addr: A) -> Result<()> {
		let addr = addr.to_sctp_addr()?;
		self.transport.connect(self.fd(), &addr).map_err(|e| e.during("connect"))?;
		debug!(fd = self.fd(), %addr, "connected");
		Ok(())
	}

	/// Starts accepting associations. Legal on both styles.
	pub fn listen(&self, backlog: i32) -> Result<()> {
		self.transport.listen(self.fd(), backlog).map_err(|e| e.during("listen"))
	}

	/// Accepts one association as a new single-association socket.
	pub fn accept(&self) -> Result<(SctpSocket<T>, SctpAddr)> {
		self.style.require(Operation::Accept)?;
		let (fd, peer) = self.transport.accept(self.fd()).map_err(|e| e.during("accept"))?;
		let Some(peer) = peer else {
			let _ = self.transport.close(fd);
			return Err(SctpError::InvalidAddress { reason: "peer address unreadable" });
		};
		debug!(fd, %peer, "accepted association");
		Ok((self.derive(fd), peer))
	}

	/// Detaches association `id` into its own single-association socket.
	///
	/// On success this socket no longer carries the association. On failure
	/// nothing changes.
	pub fn peeloff(&self, id: AssocId) -> Result<SctpSocket<T>> {
		self.style.require(Operation::Peeloff)?;
		self.style.check_assoc_id(id, Scope::Association)?;
		if !self.features().peeloff {
			return Err(SctpError::UnsupportedOperation {
				op: "peeloff",
				reason: "transport cannot detach associations",
			});
		}

		// struct sctp_peeloff_arg_t { sctp_assoc_t associd; int sd; }
		let mut arg = [0u8; 8];
		FieldsMut(&mut arg).put_i32(0, id.0);
		self.transport
			.get_option(self.fd(), SOL_SCTP, SCTP_SOCKOPT_PEELOFF, &mut arg)
			.map_err(|e| self.lookup_error(id, e, "sctp_peeloff"))?;

		let fd = Fields(&arg).i32(4).unwrap_or(-1);
		debug!(fd, assoc = %id, "peeled off association");
		Ok(self.derive(fd))
	}

	pub fn shutdown(&self, how: Shutdown) -> Result<()> {
		self.transport.shutdown(self.fd(), how).map_err(|e| e.during("shutdown"))
	}

	pub fn set_nonblocking(&self, nonblocking: bool) -> Result<()> {
		self.transport
			.set_nonblocking(self.fd(), nonblocking)
			.map_err(|e| e.during("fcntl"))
	}

	// ------------------------------------------------------------------
	// Scalar options
	// ------------------------------------------------------------------

	pub fn nodelay(&self) -> Result<bool> {
		Ok(get_int(self, SOL_SCTP, SCTP_NODELAY, "SCTP_NODELAY")? != 0)
	}

	pub fn set_nodelay(&self, enable: bool) -> Result<()> {
		set_int(self, SOL_SCTP, SCTP_NODELAY, "SCTP_NODELAY", enable as c_int)
	}

	/// Adaptation layer indication sent in INIT; also the default payload
	/// protocol id of [`send`](Self::send).
	pub fn adaptation(&self) -> Result<u32> {
		Ok(get_int(self, SOL_SCTP, SCTP_ADAPTATION_LAYER, "SCTP_ADAPTATION_LAYER")? as u32)
	}

	pub fn set_adaptation(&self, indication: u32) -> Result<()> {
		set_int(self, SOL_SCTP, SCTP_ADAPTATION_LAYER, "SCTP_ADAPTATION_LAYER", indication as c_int)
	}

	/// Whether IPv4 peers of an IPv6 socket appear as v4-mapped addresses.
	pub fn mapped_v4(&self) -> Result<bool> {
		Ok(get_int(self, SOL_SCTP, SCTP_I_WANT_MAPPED_V4_ADDR, "SCTP_I_WANT_MAPPED_V4_ADDR")? != 0)
	}

	pub fn set_mapped_v4(&self, enable: bool) -> Result<()> {
		set_int(self, SOL_SCTP, SCTP_I_WANT_MAPPED_V4_ADDR, "SCTP_I_WANT_MAPPED_V4_ADDR", enable as c_int)
	}

	pub fn max_segment_size(&self) -> Result<u32> {
		Ok(get_int(self, SOL_SCTP, SCTP_MAXSEG, "SCTP_MAXSEG")? as u32)
	}

	pub fn set_max_segment_size(&self, size: u32) -> Result<()> {
		set_int(self, SOL_SCTP, SCTP_MAXSEG, "SCTP_MAXSEG", size as c_int)
	}

	pub fn disable_fragments(&self) -> Result<bool> {
		Ok(get_int(self, SOL_SCTP, SCTP_DISABLE_FRAGMENTS, "SCTP_DISABLE_FRAGMENTS")? != 0)
	}

	pub fn set_disable_fragments(&self, disable: bool) -> Result<()> {
		set_int(self, SOL_SCTP, SCTP_DISABLE_FRAGMENTS, "SCTP_DISABLE_FRAGMENTS", disable as c_int)
	}

	/// Idle seconds before the kernel closes an association; 0 disables.
	pub fn autoclose(&self) -> Result<u32> {
		self.style.require(Operation::Autoclose)?;
		Ok(get_int(self, SOL_SCTP, SCTP_AUTOCLOSE, "SCTP_AUTOCLOSE")? as u32)
	}

	pub fn set_autoclose(&self, seconds: u32) -> Result<()> {
		self.style.require(Operation::Autoclose)?;
		set_int(self, SOL_SCTP, SCTP_AUTOCLOSE, "SCTP_AUTOCLOSE", seconds as c_int)
	}

	pub fn send_buffer_size(&self) -> Result<usize> {
		Ok(get_int(self, libc::SOL_SOCKET, libc::SO_SNDBUF, "SO_SNDBUF")? as usize)
	}

	pub fn recv_buffer_size(&self) -> Result<usize> {
		Ok(get_int(self, libc::SOL_SOCKET, libc::SO_RCVBUF, "SO_RCVBUF")? as usize)
	}

	/// Default time-to-live of sent messages, milliseconds (0 = forever).
	pub fn ttl(&self) -> u32 {
		self.ttl
	}

	pub fn set_ttl(&mut self, millis: u32) {
		self.ttl = millis;
	}

	/// Default outbound stream of sent messages.
	pub fn stream_id(&self) -> u16 {
		self.stream_id
	}

	pub fn set_stream_id(&mut self, stream: u16) {
		self.stream_id = stream;
	}

	pub fn raise_on_unknown(&self) -> bool {
		self.decoder.raise_on_unknown
	}

	/// Makes [`receive`](Self::receive) fail on unrecognized notifications
	/// instead of returning `Notification::Unknown`.
	pub fn set_raise_on_unknown(&mut self, raise: bool) {
		self.decoder.raise_on_unknown = raise;
	}

	pub(crate) fn decoder(&self) -> &Decoder {
		&self.decoder
	}

	// ------------------------------------------------------------------
	// Event subscription and init parameters
	// ------------------------------------------------------------------

	/// Reads the whole subscription record.
	pub fn events(&self) -> Result<EventSubscription> {
		let mut raw = EventSubscription::default().encode();
		self.transport
			.get_option(self.fd(), SOL_SCTP, SCTP_EVENTS, &mut raw)
			.map_err(|e| e.during("SCTP_EVENTS"))?;
		Ok(EventSubscription::decode(&raw).unwrap_or_default())
	}

	/// Writes the whole subscription record.
	pub fn set_events(&self, events: &EventSubscription) -> Result<()> {
		self.transport
			.set_option(self.fd(), SOL_SCTP, SCTP_EVENTS, &events.encode())
			.map_err(|e| e.during("SCTP_EVENTS"))?;
		debug!(fd = self.fd(), ?events, "updated event subscription");
		Ok(())
	}

	/// The subscription as an auto-committing handle.
	pub fn subscriptions(&self) -> Result<AutoCommit<'_, T, EventSubscription>> {
		AutoCommit::load(self)
	}

	pub fn init_params(&self) -> Result<InitParams> {
		self.get_param(InitParams::default())
	}

	pub fn set_init_params(&self, init: &InitParams) -> Result<()> {
		self.set_param(init)
	}

	/// Init parameters as an auto-committing handle.
	pub fn init(&self) -> Result<AutoCommit<'_, T, InitParams>> {
		AutoCommit::load(self)
	}

	// ------------------------------------------------------------------
	// Parameter objects
	// ------------------------------------------------------------------

	/// Reads an option, using `query` as the request.
	///
	/// Unknown association ids on association-scoped options come back as
	/// `NoSuchAssociation`.
	pub fn get_param<O: SocketOption>(&self, query: O) -> Result<O> {
		let id = query.assoc_id();
		self.style.check_assoc_id(id, O::SCOPE)?;

		let mut raw = query.encode();
		let len = self
			.transport
			.get_option(self.fd(), SOL_SCTP, O::NAME, &mut raw)
			.map_err(|e| match O::SCOPE {
				Scope::Association => self.lookup_error(id, e, O::LABEL),
				Scope::Endpoint => e.during(O::LABEL),
			})?;
		raw.truncate(len);
		Ok(O::decode(&raw))
	}

	/// Writes the whole option. Unknown ids map as in [`get_param`](Self::get_param).
	pub fn set_param<O: SocketOption>(&self, value: &O) -> Result<()> {
		let id = value.assoc_id();
		self.style.check_assoc_id(id, O::SCOPE)?;
		self.transport
			.set_option(self.fd(), SOL_SCTP, O::NAME, &value.encode())
			.map_err(|e| match O::SCOPE {
				Scope::Association => self.lookup_error(id, e, O::LABEL),
				Scope::Endpoint => e.during(O::LABEL),
			})?;
		debug!(fd = self.fd(), option = O::LABEL, assoc = %value.assoc_id(), "set option");
		Ok(())
	}

	/// Association tuning; id 0 on a multi-association socket reads the
	/// endpoint defaults.
	pub fn assoc_params(&self, id: AssocId) -> Result<AssocParams> {
		self.get_param(AssocParams::query(id))
	}

	pub fn set_assoc_params(&self, params: &AssocParams) -> Result<()> {
		self.set_param(params)
	}

	pub fn rto_info(&self, id: AssocId) -> Result<RtoInfo> {
		self.get_param(RtoInfo::query(id))
	}

	pub fn set_rto_info(&self, info: &RtoInfo) -> Result<()> {
		self.set_param(info)
	}

	/// Path tuning for `addr`, or for every path when `addr` is `None`.
	pub fn peer_address_params(&self, id: AssocId, addr: Option<SctpAddr>) -> Result<PeerAddressParams> {
		self.get_param(PeerAddressParams::query(id, addr))
	}

	pub fn set_peer_address_params(&self, params: &PeerAddressParams) -> Result<()> {
		self.set_param(params)
	}

	pub fn peer_address_info<A: ToSctpAddr>(&self, id: AssocId, addr: A) -> Result<PeerAddressInfo> {
		let addr = addr.to_sctp_addr()?;
		self.get_param(PeerAddressInfo::query(id, addr))
	}

	pub fn status(&self, id: AssocId) -> Result<Status> {
		self.get_param(Status::query(id))
	}

	/// Status, primary path, and both address sets of one association.
	pub fn association(&self, id: AssocId) -> Result<Association> {
		let status = self.status(id)?;
		let local = self.local_addresses(id)?;
		let remote = self.remote_addresses(id)?;
		Ok(Association {
			id: if status.assoc_id.is_none() { id } else { status.assoc_id },
			primary: status.primary.addr,
			local,
			remote,
			inbound_streams: status.inbound_streams,
			outbound_streams: status.outbound_streams,
			status,
		})
	}
}

impl<T: Transport> Drop for SctpSocket<T> {
	fn drop(&mut self) {
		if let Some(fd) = self.fd.take() {
			let _ = self.transport.close(fd);
		}
	}
}

impl<T: Transport> AsRawFd for SctpSocket<T> {
	fn as_raw_fd(&self) -> RawFd {
		self.fd()
	}
}

impl<T: Transport> IntoRawFd for SctpSocket<T> {
	fn into_raw_fd(mut self) -> RawFd {
		self.fd.take().unwrap_or(-1)
	}
}

impl SctpSocket<Kernel> {
	/// Probes the kernel and opens a socket on it.
	pub fn new(family: Family, style: Style) -> Result<Self> {
		Self::open(Kernel::probe()?, family, style)
	}
}
