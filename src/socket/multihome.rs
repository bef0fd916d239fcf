use tracing::debug;

use super::SctpSocket;
use super::style::{AssocId, Scope};
use crate::addr::{SctpAddr, ToSctpAddr, encode_storage, pack, resolve_set, unpack};
use crate::error::{Result, SctpError};
use crate::sys::{
	Fields, FieldsMut, GETADDRS_BUF_LEN, GETADDRS_HEADER_LEN, PRIM_LEN, SCTP_GET_LOCAL_ADDRS,
	SCTP_GET_PEER_ADDRS, SCTP_PRIMARY_ADDR, SCTP_SET_PEER_PRIMARY_ADDR,
	SCTP_SOCKOPT_BINDX_ADD, SCTP_SOCKOPT_BINDX_REM, SCTP_SOCKOPT_CONNECTX, SOL_SCTP,
};
use crate::transport::Transport;

/// Whether [`SctpSocket::bind_many`] adds or removes local addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindAction {
	Add,    // SCTP_BINDX_ADD_ADDR
	Remove, // SCTP_BINDX_REM_ADDR
}

/*
Address lists travel as packed sockaddr records:

  bindx / connectx (setsockopt payload)
  ┌──────────────┬───────────────┬──────────────┬─────┐
  │ sockaddr_in  │ sockaddr_in6  │ sockaddr_in  │ ... │
  └──────────────┴───────────────┴──────────────┴─────┘
  (this crate never mixes families in one list)

  getpaddrs / getladdrs (getsockopt reply, struct sctp_getaddrs)
  ┌──────────┬──────────┬──────────────────────────────┐
  │ assoc_id │ addr_num │ packed records ...           │
  │ i32      │ u32      │                              │
  └──────────┴──────────┴──────────────────────────────┘
*/

impl<T: Transport> SctpSocket<T> {
	/// Adds or removes a set of local addresses in one native call.
	///
	/// The kernel applies the set all-or-nothing; a failure is passed on
	/// without retrying any part of it.
	pub fn bind_many<A: ToSctpAddr>(&self, addrs: &[A], action: BindAction) -> Result<()> {
		let addrs = resolve_set(addrs)?;
		let (name, label) = match action {
			BindAction::Add => (SCTP_SOCKOPT_BINDX_ADD, "sctp_bindx(add)"),
			BindAction::Remove => (SCTP_SOCKOPT_BINDX_REM, "sctp_bindx(remove)"),
		};
		self.transport()
			.set_option(self.fd(), SOL_SCTP, name, &pack(&addrs))
			.map_err(|e| e.during(label))?;
		debug!(fd = self.fd(), count = addrs.len(), ?action, "bindx");
		Ok(())
	}

	/// Opens one association over several peer addresses; the first is the
	/// primary path.
	pub fn connect_many<A: ToSctpAddr>(&self, addrs: &[A]) -> Result<AssocId> {
		let addrs = resolve_set(addrs)?;
		if !self.features().connectx {
			return Err(SctpError::UnsupportedOperation {
				op: "connect_many",
				reason: "transport lacks multi-address connect",
			});
		}
		let id = self
			.transport()
			.set_option(self.fd(), SOL_SCTP, SCTP_SOCKOPT_CONNECTX, &pack(&addrs))
			.map_err(|e| e.during("sctp_connectx"))?;
		let id = AssocId(id);
		debug!(fd = self.fd(), count = addrs.len(), assoc = %id, "connectx");
		Ok(id)
	}

	/// Local addresses of association `id`, or of the endpoint for id 0.
	pub fn local_addresses(&self, id: AssocId) -> Result<Vec<SctpAddr>> {
		self.style().check_assoc_id(id, Scope::Endpoint)?;
		self.get_addrs(id, SCTP_GET_LOCAL_ADDRS, "sctp_getladdrs")
	}

	/// Peer addresses of association `id`.
	pub fn remote_addresses(&self, id: AssocId) -> Result<Vec<SctpAddr>> {
		self.style().check_assoc_id(id, Scope::Association)?;
		self.get_addrs(id, SCTP_GET_PEER_ADDRS, "sctp_getpaddrs")
	}

	fn get_addrs(&self, id: AssocId, name: libc::c_int, label: &'static str) -> Result<Vec<SctpAddr>> {
		let mut buf = vec![0u8; GETADDRS_BUF_LEN];
		FieldsMut(&mut buf).put_i32(0, id.0);
		let len = self
			.transport()
			.get_option(self.fd(), SOL_SCTP, name, &mut buf)
			.map_err(|e| self.lookup_error(id, e, label))?;
		buf.truncate(len);

		let count = Fields(&buf).u32(4).unwrap_or(0) as usize;
		let records = Fields(&buf).tail(GETADDRS_HEADER_LEN);
		unpack(records, count)
	}

	/// Makes `addr` the primary path this end sends to.
	pub fn set_primary_remote<A: ToSctpAddr>(&self, id: AssocId, addr: A) -> Result<()> {
		self.style().check_assoc_id(id, Scope::Association)?;
		let addr = addr.to_sctp_addr()?;
		self.set_prim(id, &addr, SCTP_PRIMARY_ADDR, "SCTP_PRIMARY_ADDR")
	}

	/// Asks the peer to use local address `addr` as its primary path.
	pub fn set_primary_local<A: ToSctpAddr>(&self, id: AssocId, addr: A) -> Result<()> {
		self.style().check_assoc_id(id, Scope::Association)?;
		let addr = addr.to_sctp_addr()?;
		if !self.features().set_primary {
			return Err(SctpError::UnsupportedOperation {
				op: "set_primary_local",
				reason: "transport cannot request a peer primary path",
			});
		}
		self.set_prim(id, &addr, SCTP_SET_PEER_PRIMARY_ADDR, "SCTP_SET_PEER_PRIMARY_ADDR")
	}

	// struct sctp_prim and struct sctp_setpeerprim share one layout.
	fn set_prim(&self, id: AssocId, addr: &SctpAddr, name: libc::c_int, label: &'static str) -> Result<()> {
		let mut raw = [0u8; PRIM_LEN];
		FieldsMut(&mut raw).put_i32(0, id.0);
		encode_storage(Some(addr), &mut raw[4..]);
		self.transport()
			.set_option(self.fd(), SOL_SCTP, name, &raw)
			.map_err(|e| self.lookup_error(id, e, label))?;
		debug!(fd = self.fd(), assoc = %id, %addr, option = label, "primary path requested");
		Ok(())
	}
}
