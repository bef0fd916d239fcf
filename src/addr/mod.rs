//! Address families and SCTP address sets.
//!
//! SCTP endpoints are multihomed, so most calls take a *set* of addresses.
//! A set must share one family; the kernel packs sets as consecutive
//! `sockaddr_in` / `sockaddr_in6` records with no padding between them.

mod ipv4;
mod ipv6;
pub use self::ipv4::SocketAddrV4;
pub use self::ipv6::SocketAddrV6;

use crate::error::{Result, SctpError};
use crate::sys::{Fields, SOCKADDR_STORAGE_LEN};

/// Address family of an SCTP socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
	/// IPv4 (`AF_INET`).
	Inet,
	/// IPv6 (`AF_INET6`). Also carries IPv4 peers as mapped addresses.
	Inet6,
}

impl Family {
	/// Returns the libc constant for this address family.
	#[inline]
	pub fn raw(self) -> libc::c_int {
		match self {
			Family::Inet => libc::AF_INET,
			Family::Inet6 => libc::AF_INET6,
		}
	}
}

/*
  ┌────────┬──────────┬───────────────┬────────────────────┐
  │ Family │ Constant │ Value (Linux) │ Packed record size │
  ├────────┼──────────┼───────────────┼────────────────────┤
  │ Inet   │ AF_INET  │ 2             │ 16                 │
  ├────────┼──────────┼───────────────┼────────────────────┤
  │ Inet6  │ AF_INET6 │ 10            │ 28                 │
  └────────┴──────────┴───────────────┴────────────────────┘
 */

/// Trait for address types that can be converted to raw sockaddr for syscalls.
pub trait ToSockAddr {
	/// Calls the provided closure with a pointer to the raw sockaddr and its size.
	/// Returns None if the address cannot be represented.
	fn with_raw<F, R>(&self, f: F) -> Option<R>
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R;
}
/*
The closure pattern keeps the stack-allocated sockaddr_in / sockaddr_in6
alive for exactly as long as the syscall needs the pointer.
 */

/// Trait for address types that can be created from raw sockaddr.
pub trait FromSockAddr: Sized {
	/// Creates address from raw sockaddr storage.
	///
	/// # Safety
	/// `addr` must point to at least `len` readable bytes.
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self>;
}

impl FromSockAddr for SocketAddrV4 {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if len < std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t {
			return None;
		}
		let raw = unsafe { std::ptr::read_unaligned(addr as *const libc::sockaddr_in) };
		Some(Self::from_raw(&raw))
	}
}

impl FromSockAddr for SocketAddrV6 {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if len < std::mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t {
			return None;
		}
		let raw = unsafe { std::ptr::read_unaligned(addr as *const libc::sockaddr_in6) };
		Some(Self::from_raw(&raw))
	}
}

/// One SCTP transport address of either family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SctpAddr {
	V4(SocketAddrV4),
	V6(SocketAddrV6),
}

impl SctpAddr {
	/// Parses a host literal and port.
	///
	/// `""` is the IPv4 wildcard and `"<broadcast>"` the IPv4 broadcast
	/// address. Otherwise the literal is tried as IPv6, then IPv4. Host
	/// names are not resolved.
	pub fn parse(host: &str, port: u16) -> Result<Self> {
		match host {
			"" => return Ok(SctpAddr::V4(SocketAddrV4::unspecified(port))),
			"<broadcast>" => return Ok(SctpAddr::V4(SocketAddrV4::new([255; 4], port))),
			_ => {}
		}
		if let Ok(ip) = host.parse::<std::net::Ipv6Addr>() {
			return Ok(SctpAddr::V6(SocketAddrV6::new(ip.octets(), port)));
		}
		if let Ok(ip) = host.parse::<std::net::Ipv4Addr>() {
			return Ok(SctpAddr::V4(SocketAddrV4::new(ip.octets(), port)));
		}
		Err(SctpError::InvalidAddress { reason: "not an IPv4 or IPv6 literal" })
	}

	pub fn family(&self) -> Family {
		match self {
			SctpAddr::V4(_) => Family::Inet,
			SctpAddr::V6(_) => Family::Inet6,
		}
	}

	pub fn port(&self) -> u16 {
		match self {
			SctpAddr::V4(a) => a.port(),
			SctpAddr::V6(a) => a.port(),
		}
	}

	/// The IPv4 form of a v4-mapped IPv6 address; anything else unchanged.
	///
	/// Peers reported by an `Inet6` socket with
	/// [`set_mapped_v4`](crate::SctpSocket::set_mapped_v4) on compare
	/// equal to their IPv4 literals only after this.
	pub fn unmapped(self) -> Self {
		match self {
			SctpAddr::V6(a) => match a.to_ipv4_mapped() {
				Some(ip) => SctpAddr::V4(SocketAddrV4::new(ip, a.port())),
				None => self,
			},
			v4 => v4,
		}
	}

	/// Raw `sockaddr_in` / `sockaddr_in6` bytes, as packed in address lists.
	pub(crate) fn to_bytes(&self) -> Vec<u8> {
		self.with_raw(|ptr, len| unsafe {
			std::slice::from_raw_parts(ptr as *const u8, len as usize).to_vec()
		})
		.unwrap_or_default()
	}

	/// Reads one address from raw sockaddr bytes; `None` for an unknown or
	/// empty family.
	pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let len = bytes.len().min(std::mem::size_of::<libc::sockaddr_storage>());
		unsafe {
			std::ptr::copy_nonoverlapping(
				bytes.as_ptr(),
				&mut storage as *mut _ as *mut u8,
				len,
			);
			SctpAddr::from_sockaddr(&storage as *const _ as *const libc::sockaddr, len as libc::socklen_t)
		}
	}

	/// Length of one packed record of the given family.
	fn packed_len(family: libc::c_int) -> Option<usize> {
		match family {
			libc::AF_INET => Some(std::mem::size_of::<libc::sockaddr_in>()),
			libc::AF_INET6 => Some(std::mem::size_of::<libc::sockaddr_in6>()),
			_ => None,
		}
	}
}

impl ToSockAddr for SctpAddr {
	fn with_raw<F, R>(&self, f: F) -> Option<R>
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
	{
		match self {
			SctpAddr::V4(a) => a.with_raw(f),
			SctpAddr::V6(a) => a.with_raw(f),
		}
	}
}

impl FromSockAddr for SctpAddr {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if len < std::mem::size_of::<libc::sa_family_t>() as libc::socklen_t {
			return None;
		}
		let family = unsafe { std::ptr::read_unaligned(addr as *const libc::sa_family_t) };
		match family as libc::c_int {
			libc::AF_INET => unsafe { SocketAddrV4::from_sockaddr(addr, len) }.map(SctpAddr::V4),
			libc::AF_INET6 => unsafe { SocketAddrV6::from_sockaddr(addr, len) }.map(SctpAddr::V6),
			_ => None,
		}
	}
}

impl From<std::net::SocketAddr> for SctpAddr {
	fn from(addr: std::net::SocketAddr) -> Self {
		match addr {
			std::net::SocketAddr::V4(a) => SctpAddr::V4(a.into()),
			std::net::SocketAddr::V6(a) => SctpAddr::V6(a.into()),
		}
	}
}

impl From<SctpAddr> for std::net::SocketAddr {
	fn from(addr: SctpAddr) -> Self {
		match addr {
			SctpAddr::V4(a) => std::net::SocketAddr::V4(a.into()),
			SctpAddr::V6(a) => std::net::SocketAddr::V6(a.into()),
		}
	}
}

impl std::fmt::Display for SctpAddr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Display::fmt(&std::net::SocketAddr::from(*self), f)
	}
}

/// Anything that names one SCTP address.
pub trait ToSctpAddr {
	fn to_sctp_addr(&self) -> Result<SctpAddr>;
}

impl ToSctpAddr for SctpAddr {
	fn to_sctp_addr(&self) -> Result<SctpAddr> {
		Ok(*self)
	}
}

impl ToSctpAddr for std::net::SocketAddr {
	fn to_sctp_addr(&self) -> Result<SctpAddr> {
		Ok((*self).into())
	}
}

impl ToSctpAddr for (&str, u16) {
	fn to_sctp_addr(&self) -> Result<SctpAddr> {
		SctpAddr::parse(self.0, self.1)
	}
}

impl ToSctpAddr for (String, u16) {
	fn to_sctp_addr(&self) -> Result<SctpAddr> {
		SctpAddr::parse(&self.0, self.1)
	}
}

/// Resolves a multihomed address set, rejecting it before any native call
/// when it cannot be handed to the kernel as one packed list.
///
/// - empty set: `InvalidAddress`
/// - two well-formed addresses of different families: `MixedAddressFamily`
/// - a malformed literal next to a well-formed one: `MixedAddressFamily`
/// - only malformed literals: the first literal's `InvalidAddress`
pub(crate) fn resolve_set<A: ToSctpAddr>(addrs: &[A]) -> Result<Vec<SctpAddr>> {
	if addrs.is_empty() {
		return Err(SctpError::InvalidAddress { reason: "empty address set" });
	}

	let mut family = None;
	let mut malformed = None;
	let mut resolved = Vec::with_capacity(addrs.len());

	for addr in addrs {
		match addr.to_sctp_addr() {
			Ok(a) => {
				match family {
					None => family = Some(a.family()),
					Some(f) if f != a.family() => return Err(SctpError::MixedAddressFamily),
					Some(_) => {}
				}
				resolved.push(a);
			}
			Err(e) => {
				malformed.get_or_insert(e);
			}
		}
	}

	match malformed {
		None => Ok(resolved),
		Some(e) if resolved.is_empty() => Err(e),
		Some(_) => Err(SctpError::MixedAddressFamily),
	}
}

/// Packs addresses back to back, the layout `sctp_bindx` and
/// `sctp_connectx` expect.
pub(crate) fn pack(addrs: &[SctpAddr]) -> Vec<u8> {
	addrs.iter().flat_map(|a| a.to_bytes()).collect()
}

/// Reads up to `count` packed addresses.
pub(crate) fn unpack(buf: &[u8], count: usize) -> Result<Vec<SctpAddr>> {
	let mut out = Vec::with_capacity(count.min(64));
	let mut at = 0;
	while out.len() < count && at < buf.len() {
		let family = Fields(buf)
			.u16(at)
			.ok_or(SctpError::InvalidAddress { reason: "truncated address list" })?;
		let len = SctpAddr::packed_len(family as libc::c_int)
			.ok_or(SctpError::InvalidAddress { reason: "unknown family in address list" })?;
		let record = Fields(buf)
			.bytes(at, len)
			.ok_or(SctpError::InvalidAddress { reason: "truncated address list" })?;
		let addr = SctpAddr::from_bytes(record)
			.ok_or(SctpError::InvalidAddress { reason: "unknown family in address list" })?;
		out.push(addr);
		at += len;
	}
	Ok(out)
}

/// Writes an optional address into an embedded `sockaddr_storage` slot.
/// `None` leaves the slot zeroed (family `AF_UNSPEC`).
pub(crate) fn encode_storage(addr: Option<&SctpAddr>, slot: &mut [u8]) {
	slot[..SOCKADDR_STORAGE_LEN].fill(0);
	if let Some(addr) = addr {
		let bytes = addr.to_bytes();
		slot[..bytes.len()].copy_from_slice(&bytes);
	}
}

/// Reads an embedded `sockaddr_storage` slot.
pub(crate) fn decode_storage(slot: &[u8]) -> Option<SctpAddr> {
	SctpAddr::from_bytes(slot)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn literals_follow_v6_then_v4_order() {
		assert_eq!(SctpAddr::parse("::1", 7).map(|a| a.family()).ok(), Some(Family::Inet6));
		assert_eq!(SctpAddr::parse("10.0.0.1", 7).map(|a| a.family()).ok(), Some(Family::Inet));
		assert_eq!(
			SctpAddr::parse("", 9).ok(),
			Some(SctpAddr::V4(SocketAddrV4::new([0, 0, 0, 0], 9)))
		);
		assert_eq!(
			SctpAddr::parse("<broadcast>", 9).ok(),
			Some(SctpAddr::V4(SocketAddrV4::new([255, 255, 255, 255], 9)))
		);
		assert!(matches!(
			SctpAddr::parse("localhost", 1),
			Err(SctpError::InvalidAddress { .. })
		));
	}

	#[test]
	fn set_with_malformed_literal_is_mixed() {
		let set: [(&str, u16); 2] = [("127.0.0.1", 9999), ("127.0.0.300", 9999)];
		assert!(matches!(resolve_set(&set), Err(SctpError::MixedAddressFamily)));
	}

	#[test]
	fn set_of_two_families_is_mixed() {
		let set: [(&str, u16); 2] = [("127.0.0.1", 1), ("::1", 1)];
		assert!(matches!(resolve_set(&set), Err(SctpError::MixedAddressFamily)));
	}

	#[test]
	fn empty_or_all_malformed_is_invalid() {
		let empty: [(&str, u16); 0] = [];
		assert!(matches!(resolve_set(&empty), Err(SctpError::InvalidAddress { .. })));
		assert!(matches!(
			resolve_set(&[("nope", 1u16), ("also nope", 2u16)]),
			Err(SctpError::InvalidAddress { .. })
		));
	}

	#[test]
	fn packed_lists_read_back() {
		let addrs = vec![
			SctpAddr::parse("192.0.2.1", 5000).unwrap(),
			SctpAddr::parse("192.0.2.2", 5000).unwrap(),
		];
		let packed = pack(&addrs);
		assert_eq!(packed.len(), 32);
		assert_eq!(unpack(&packed, 2).unwrap(), addrs);
		assert_eq!(unpack(&packed, 1).unwrap(), addrs[..1].to_vec());
	}

	#[test]
	fn storage_slot_holds_v6() {
		let addr = SctpAddr::parse("2001:db8::5", 80).unwrap();
		let mut slot = [0xffu8; SOCKADDR_STORAGE_LEN];
		encode_storage(Some(&addr), &mut slot);
		assert_eq!(decode_storage(&slot), Some(addr));
		encode_storage(None, &mut slot);
		assert_eq!(decode_storage(&slot), None);
	}

	#[test]
	fn mapped_peers_unmap_to_ipv4() {
		let mapped = SctpAddr::parse("::ffff:192.0.2.9", 2905).unwrap();
		assert_eq!(mapped.family(), Family::Inet6);
		assert_eq!(mapped.unmapped(), SctpAddr::parse("192.0.2.9", 2905).unwrap());

		let native = SctpAddr::parse("2001:db8::9", 2905).unwrap();
		assert_eq!(native.unmapped(), native);
	}

	#[test]
	fn display_matches_std() {
		let addr = SctpAddr::parse("::1", 443).unwrap();
		assert_eq!(addr.to_string(), "[::1]:443");
	}
}
