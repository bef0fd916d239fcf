use std::os::fd::RawFd;

use libc::c_int;
use tracing::debug;

use super::{Features, RawMessage, Shutdown, Transport};
use crate::addr::{Family, FromSockAddr, SctpAddr, ToSockAddr};
use crate::error::{Errno, Result, SctpError};
use crate::event::MessageMetadata;
use crate::socket::Style;
use crate::sys::{
	IPPROTO_SCTP, SCTP_AUTO_ASCONF, SCTP_PR_SUPPORTED, SCTP_SNDRCV, SNDRCVINFO_LEN, SOL_SCTP,
};

/// The Linux kernel SCTP stack, reached through `libc`.
///
/// Create it once with [`Kernel::probe`] and hand clones to every socket.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
	features: Features,
}

impl Kernel {
	/// Checks that the kernel speaks SCTP and records which extensions it
	/// offers.
	///
	/// Fails with `UnsupportedOperation` when the SCTP module is missing.
	pub fn probe() -> Result<Self> {
		let fd = unsafe {
			libc::socket(libc::AF_INET, libc::SOCK_SEQPACKET | libc::SOCK_CLOEXEC, IPPROTO_SCTP)
		};
		if fd == -1 {
			let e = Errno::last();
			if e.0 == libc::EPROTONOSUPPORT || e.0 == libc::ESOCKTNOSUPPORT {
				return Err(SctpError::UnsupportedOperation {
					op: "sctp",
					reason: "kernel has no SCTP support",
				});
			}
			return Err(e.during("socket"));
		}

		let bare = Kernel { features: Features::default() };
		let supported = |name: c_int, len: usize| {
			let mut buf = vec![0u8; len];
			bare.get_option(fd, SOL_SCTP, name, &mut buf).is_ok()
		};
		let features = Features {
			kernel: true,
			connectx: true,
			peeloff: true,
			set_primary: true,
			prsctp: supported(SCTP_PR_SUPPORTED, 8),
			addip: supported(SCTP_AUTO_ASCONF, 4),
			send_to_association: true,
		};
		unsafe { libc::close(fd) };

		debug!(?features, "probed kernel SCTP support");
		Ok(Kernel { features })
	}

	/// A kernel transport that reports only the given features.
	///
	/// Operations outside `features` fail with `UnsupportedOperation`
	/// before reaching the kernel.
	pub fn with_features(features: Features) -> Self {
		Kernel { features }
	}
}

impl Transport for Kernel {
	fn features(&self) -> Features {
		self.features
	}

	fn open(&self, family: Family, style: Style) -> std::result::Result<RawFd, Errno> {
		let fd = unsafe {
			libc::socket(family.raw(), style.raw() | libc::SOCK_CLOEXEC, IPPROTO_SCTP)
		};
		if fd == -1 {
			return Err(Errno::last());
		}
		Ok(fd)
	}

	fn close(&self, fd: RawFd) -> std::result::Result<(), Errno> {
		if unsafe { libc::close(fd) } == -1 {
			return Err(Errno::last());
		}
		Ok(())
	}

	fn set_nonblocking(&self, fd: RawFd, nonblocking: bool) -> std::result::Result<(), Errno> {
		let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
		if flags == -1 {
			return Err(Errno::last());
		}

		let new_flags = if nonblocking {
			flags | libc::O_NONBLOCK
		} else {
			flags & !libc::O_NONBLOCK
		};

		if unsafe { libc::fcntl(fd, libc::F_SETFL, new_flags) } == -1 {
			return Err(Errno::last());
		}
		Ok(())
	}

	fn get_option(&self, fd: RawFd, level: c_int, name: c_int, buf: &mut [u8]) -> std::result::Result<usize, Errno> {
		let mut len = buf.len() as libc::socklen_t;
		let result = unsafe {
			libc::getsockopt(fd, level, name, buf.as_mut_ptr() as *mut libc::c_void, &mut len)
		};
		if result == -1 {
			return Err(Errno::last());
		}
		Ok(len as usize)
	}

	fn set_option(&self, fd: RawFd, level: c_int, name: c_int, buf: &[u8]) -> std::result::Result<c_int, Errno> {
		let result = unsafe {
			libc::setsockopt(
				fd,
				level,
				name,
				buf.as_ptr() as *const libc::c_void,
				buf.len() as libc::socklen_t,
			)
		};
		if result == -1 {
			return Err(Errno::last());
		}
		Ok(result)
	}

	fn bind(&self, fd: RawFd, addr: &SctpAddr) -> std::result::Result<(), Errno> {
		let result = addr.with_raw(|ptr, len| unsafe { libc::bind(fd, ptr, len) });
		match result {
			Some(-1) => Err(Errno::last()),
			Some(_) => Ok(()),
			None => Err(Errno(libc::EINVAL)),
		}
	}

	fn connect(&self, fd: RawFd, addr: &SctpAddr) -> std::result::Result<(), Errno> {
		let result = addr.with_raw(|ptr, len| unsafe { libc::connect(fd, ptr, len) });
		match result {
			Some(-1) => Err(Errno::last()),
			Some(_) => Ok(()),
			None => Err(Errno(libc::EINVAL)),
		}
	}

	fn listen(&self, fd: RawFd, backlog: i32) -> std::result::Result<(), Errno> {
		if unsafe { libc::listen(fd, backlog) } == -1 {
			return Err(Errno::last());
		}
		Ok(())
	}

	fn accept(&self, fd: RawFd) -> std::result::Result<(RawFd, Option<SctpAddr>), Errno> {
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

		let new_fd = unsafe {
			libc::accept4(
				fd,
				&mut storage as *mut _ as *mut libc::sockaddr,
				&mut len,
				libc::SOCK_CLOEXEC,
			)
		};
		if new_fd == -1 {
			return Err(Errno::last());
		}

		let peer = unsafe {
			SctpAddr::from_sockaddr(&storage as *const _ as *const libc::sockaddr, len)
		};
		Ok((new_fd, peer))
	}

	fn shutdown(&self, fd: RawFd, how: Shutdown) -> std::result::Result<(), Errno> {
		let how = match how {
			Shutdown::Read => libc::SHUT_RD,
			Shutdown::Write => libc::SHUT_WR,
			Shutdown::ReadWrite => libc::SHUT_RDWR,
		};
		if unsafe { libc::shutdown(fd, how) } == -1 {
			return Err(Errno::last());
		}
		Ok(())
	}

	fn send(&self, fd: RawFd, payload: &[u8], to: Option<&SctpAddr>, info: &MessageMetadata) -> std::result::Result<usize, Errno> {
		let info = info.encode();
		let n = match to {
			Some(addr) => addr
				.with_raw(|ptr, len| sendmsg(fd, payload, ptr, len, &info))
				.unwrap_or(-1),
			None => sendmsg(fd, payload, std::ptr::null(), 0, &info),
		};
		if n < 0 {
			return Err(Errno::last());
		}
		Ok(n as usize)
	}

	fn recv(&self, fd: RawFd, max_len: usize) -> std::result::Result<RawMessage, Errno> {
		let mut data = vec![0u8; max_len];
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };

		// u64 backing keeps the control buffer aligned for cmsghdr.
		let space = unsafe { libc::CMSG_SPACE(SNDRCVINFO_LEN as u32) } as usize;
		let mut control = vec![0u64; space.div_ceil(8)];

		let mut iov = libc::iovec {
			iov_base: data.as_mut_ptr() as *mut libc::c_void,
			iov_len: max_len,
		};

		let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
		msg.msg_name = &mut storage as *mut _ as *mut libc::c_void;
		msg.msg_namelen = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
		msg.msg_iov = &mut iov;
		msg.msg_iovlen = 1;
		msg.msg_control = control.as_mut_ptr() as *mut libc::c_void;
		msg.msg_controllen = space as _;

		let n = unsafe { libc::recvmsg(fd, &mut msg, 0) };
		if n == -1 {
			return Err(Errno::last());
		}
		data.truncate(n as usize);

		let from = unsafe {
			SctpAddr::from_sockaddr(&storage as *const _ as *const libc::sockaddr, msg.msg_namelen)
		};

		let mut info = None;
		let mut cmsg = unsafe { libc::CMSG_FIRSTHDR(&msg) };
		while !cmsg.is_null() {
			let hdr = unsafe { &*cmsg };
			if hdr.cmsg_level == SOL_SCTP && hdr.cmsg_type == SCTP_SNDRCV {
				let header = unsafe { libc::CMSG_LEN(0) } as usize;
				let len = (hdr.cmsg_len as usize).saturating_sub(header);
				let raw = unsafe { std::slice::from_raw_parts(libc::CMSG_DATA(cmsg), len) };
				info = MessageMetadata::decode(raw);
			}
			cmsg = unsafe { libc::CMSG_NXTHDR(&msg, cmsg) };
		}

		Ok(RawMessage { from, flags: msg.msg_flags, data, info })
	}
}

/// `sendmsg` with one `SCTP_SNDRCV` control message.
fn sendmsg(
	fd: RawFd,
	payload: &[u8],
	name: *const libc::sockaddr,
	namelen: libc::socklen_t,
	info: &[u8; SNDRCVINFO_LEN],
) -> isize {
	let space = unsafe { libc::CMSG_SPACE(SNDRCVINFO_LEN as u32) } as usize;
	let mut control = vec![0u64; space.div_ceil(8)];

	let mut iov = libc::iovec {
		iov_base: payload.as_ptr() as *mut libc::c_void,
		iov_len: payload.len(),
	};

	let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
	msg.msg_name = name as *mut libc::c_void;
	msg.msg_namelen = namelen;
	msg.msg_iov = &mut iov;
	msg.msg_iovlen = 1;
	msg.msg_control = control.as_mut_ptr() as *mut libc::c_void;
	msg.msg_controllen = space as _;

	unsafe {
		let cmsg = libc::CMSG_FIRSTHDR(&msg);
		(*cmsg).cmsg_level = SOL_SCTP;
		(*cmsg).cmsg_type = SCTP_SNDRCV;
		(*cmsg).cmsg_len = libc::CMSG_LEN(SNDRCVINFO_LEN as u32) as _;
		std::ptr::copy_nonoverlapping(info.as_ptr(), libc::CMSG_DATA(cmsg), SNDRCVINFO_LEN);
		libc::sendmsg(fd, &msg, 0)
	}
}
