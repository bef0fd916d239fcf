use crate::addr::ToSockAddr;

/// An IPv4 SCTP transport address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketAddrV4 {
	ip: [u8; 4],
	port: u16,
}

impl SocketAddrV4 {
	pub fn new(ip: [u8; 4], port: u16) -> Self {
		Self { ip, port }
	}

	/// `0.0.0.0:port`. Bound on a multihomed host this takes every local
	/// address into the association.
	pub fn unspecified(port: u16) -> Self {
		Self::new([0; 4], port)
	}

	pub fn ip(&self) -> [u8; 4] {
		self.ip
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	pub(crate) fn from_raw(raw: &libc::sockaddr_in) -> Self {
		Self::new(raw.sin_addr.s_addr.to_ne_bytes(), u16::from_be(raw.sin_port))
	}

	pub(crate) fn to_raw(&self) -> libc::sockaddr_in {
		libc::sockaddr_in {
			sin_family: libc::AF_INET as libc::sa_family_t,
			sin_port: self.port.to_be(),
			sin_addr: libc::in_addr { s_addr: u32::from_ne_bytes(self.ip) },
			sin_zero: [0; 8],
		}
	}
}

impl From<std::net::SocketAddrV4> for SocketAddrV4 {
	fn from(addr: std::net::SocketAddrV4) -> Self {
		Self::new(addr.ip().octets(), addr.port())
	}
}

impl From<SocketAddrV4> for std::net::SocketAddrV4 {
	fn from(addr: SocketAddrV4) -> Self {
		std::net::SocketAddrV4::new(addr.ip.into(), addr.port)
	}
}

impl ToSockAddr for SocketAddrV4 {
	fn with_raw<F, R>(&self, f: F) -> Option<R>
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
	{
		let raw = self.to_raw(); // must outlive f
		Some(f(
			&raw as *const libc::sockaddr_in as *const libc::sockaddr,
			std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
		))
	}
}

/*
sockaddr_in as the kernel packs it into SCTP address lists (16 bytes):
  - sin_family: AF_INET, native order
  - sin_port: network byte order
  - sin_addr: already network byte order, so the octets are copied as-is
  - sin_zero: padding
 */
