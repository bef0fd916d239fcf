use libc::c_int;

use super::SctpSocket;
use crate::error::Result;
use crate::transport::Transport;

/// Reads an `int`-sized option.
pub(crate) fn get_int<T: Transport>(socket: &SctpSocket<T>, level: c_int, name: c_int, label: &'static str) -> Result<c_int> {
	let mut raw = [0u8; std::mem::size_of::<c_int>()];
	socket
		.transport()
		.get_option(socket.fd(), level, name, &mut raw)
		.map_err(|e| e.during(label))?;
	Ok(c_int::from_ne_bytes(raw))
}

/// Writes an `int`-sized option.
pub(crate) fn set_int<T: Transport>(socket: &SctpSocket<T>, level: c_int, name: c_int, label: &'static str, val: c_int) -> Result<()> {
	socket
		.transport()
		.set_option(socket.fd(), level, name, &val.to_ne_bytes())
		.map_err(|e| e.during(label))?;
	Ok(())
}

/// Sets SO_REUSEADDR on a socket.
///
/// Allows binding to an address that's in TIME_WAIT state.
/// Essential for server restarts.
pub fn set_reuse_addr<T: Transport>(socket: &SctpSocket<T>, enable: bool) -> Result<()> {
	set_int(socket, libc::SOL_SOCKET, libc::SO_REUSEADDR, "SO_REUSEADDR", enable as c_int)
}

/// Sets SO_REUSEPORT on a socket.
///
/// Allows multiple sockets to bind the same port.
pub fn set_reuse_port<T: Transport>(socket: &SctpSocket<T>, enable: bool) -> Result<()> {
	set_int(socket, libc::SOL_SOCKET, libc::SO_REUSEPORT, "SO_REUSEPORT", enable as c_int)
}

/// Sets receive buffer size (SO_RCVBUF).
///
/// The kernel doubles the value it is given, so half of `size` is passed
/// down and `recv_buffer_size()` reads back `size`.
pub fn set_recv_buffer_size<T: Transport>(socket: &SctpSocket<T>, size: usize) -> Result<()> {
	set_int(socket, libc::SOL_SOCKET, libc::SO_RCVBUF, "SO_RCVBUF", (size / 2) as c_int)
}

/// Sets send buffer size (SO_SNDBUF). Halved like the receive buffer.
pub fn set_send_buffer_size<T: Transport>(socket: &SctpSocket<T>, size: usize) -> Result<()> {
	set_int(socket, libc::SOL_SOCKET, libc::SO_SNDBUF, "SO_SNDBUF", (size / 2) as c_int)
}
