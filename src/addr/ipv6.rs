use crate::addr::ToSockAddr;

/// An IPv6 SCTP transport address.
///
/// On an `Inet6` socket with mapped addresses enabled, IPv4 peers show up
/// here as `::ffff:a.b.c.d`; [`to_ipv4_mapped`](Self::to_ipv4_mapped)
/// recovers the IPv4 form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketAddrV6 {
	ip: [u8; 16],
	port: u16,
	scope_id: u32, // interface index, link-local only
}

impl SocketAddrV6 {
	pub fn new(ip: [u8; 16], port: u16) -> Self {
		Self { ip, port, scope_id: 0 }
	}

	/// Link-local (`fe80::/10`) addresses need the interface index.
	pub fn with_scope(ip: [u8; 16], port: u16, scope_id: u32) -> Self {
		Self { ip, port, scope_id }
	}

	pub fn ip(&self) -> [u8; 16] {
		self.ip
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	pub fn scope_id(&self) -> u32 {
		self.scope_id
	}

	/// The embedded IPv4 octets of a v4-mapped address.
	pub fn to_ipv4_mapped(&self) -> Option<[u8; 4]> {
		match self.ip {
			[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, a, b, c, d] => Some([a, b, c, d]),
			_ => None,
		}
	}

	pub(crate) fn to_raw(&self) -> libc::sockaddr_in6 {
		libc::sockaddr_in6 {
			sin6_family: libc::AF_INET6 as libc::sa_family_t,
			sin6_port: self.port.to_be(),
			sin6_flowinfo: 0,
			sin6_addr: libc::in6_addr { s6_addr: self.ip },
			sin6_scope_id: self.scope_id,
		}
	}

	pub(crate) fn from_raw(raw: &libc::sockaddr_in6) -> Self {
		Self::with_scope(raw.sin6_addr.s6_addr, u16::from_be(raw.sin6_port), raw.sin6_scope_id)
	}
}

impl From<std::net::SocketAddrV6> for SocketAddrV6 {
	fn from(addr: std::net::SocketAddrV6) -> Self {
		Self::with_scope(addr.ip().octets(), addr.port(), addr.scope_id())
	}
}

impl From<SocketAddrV6> for std::net::SocketAddrV6 {
	fn from(addr: SocketAddrV6) -> Self {
		// flowinfo is never carried in SCTP address lists
		std::net::SocketAddrV6::new(addr.ip.into(), addr.port, 0, addr.scope_id)
	}
}

impl ToSockAddr for SocketAddrV6 {
	fn with_raw<F, R>(&self, f: F) -> Option<R>
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
	{
		let raw = self.to_raw();
		Some(f(
			&raw as *const libc::sockaddr_in6 as *const libc::sockaddr,
			std::mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t,
		))
	}
}

/*
sockaddr_in6 in SCTP address lists (28 bytes):
  - sin6_family: AF_INET6, native order
  - sin6_port: network byte order
  - sin6_flowinfo: always 0 here
  - sin6_addr: 16 octets, network order
  - sin6_scope_id: native order
 */
