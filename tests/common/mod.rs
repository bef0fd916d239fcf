#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::os::fd::RawFd;
use std::rc::Rc;

use libc::c_int;
use sctplane::sys::{SCTP_SOCKOPT_CONNECTX, SCTP_SOCKOPT_PEELOFF};
use sctplane::{
	Errno, Family, Features, MessageMetadata, RawMessage, SctpAddr, SctpSocket, Shutdown, Style,
	Transport,
};

/// One native call as the mock saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
	Open(Family, Style),
	Close(RawFd),
	SetNonblocking(RawFd, bool),
	GetOption { level: c_int, name: c_int },
	SetOption { level: c_int, name: c_int, value: Vec<u8> },
	Bind(SctpAddr),
	Connect(SctpAddr),
	Listen(i32),
	Accept,
	Shutdown(Shutdown),
	Send { payload: Vec<u8>, to: Option<SctpAddr>, info: MessageMetadata },
	Recv(usize),
}

#[derive(Debug, Default)]
pub struct State {
	pub calls: Vec<Call>,
	pub options: HashMap<(c_int, c_int), Vec<u8>>,
	pub inbox: VecDeque<RawMessage>,
	/// Errno to fail with, keyed by "open", "bind", "send", "get:<name>" ...
	pub failures: HashMap<String, i32>,
	pub features: Features,
	pub next_fd: RawFd,
	pub closed: Vec<RawFd>,
	pub accept_peer: Option<SctpAddr>,
	pub connectx_id: c_int,
	pub peeloff_fd: RawFd,
}

/// In-memory transport: records every call, stores options by
/// `(level, name)`, and replays queued messages on receive.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
	pub state: Rc<RefCell<State>>,
}

impl MockTransport {
	pub fn new() -> Self {
		let mock = Self::default();
		{
			let mut s = mock.state.borrow_mut();
			s.features = Features {
				kernel: false,
				connectx: true,
				peeloff: true,
				set_primary: true,
				prsctp: false,
				addip: false,
				send_to_association: true,
			};
			s.next_fd = 10;
			s.peeloff_fd = 99;
		}
		mock
	}

	pub fn with_features(features: Features) -> Self {
		let mock = Self::new();
		mock.state.borrow_mut().features = features;
		mock
	}

	pub fn calls(&self) -> Vec<Call> {
		self.state.borrow().calls.clone()
	}

	pub fn clear_calls(&self) {
		self.state.borrow_mut().calls.clear();
	}

	pub fn fail(&self, key: &str, errno: i32) {
		self.state.borrow_mut().failures.insert(key.to_string(), errno);
	}

	pub fn put_option(&self, level: c_int, name: c_int, value: Vec<u8>) {
		self.state.borrow_mut().options.insert((level, name), value);
	}

	pub fn option(&self, level: c_int, name: c_int) -> Option<Vec<u8>> {
		self.state.borrow().options.get(&(level, name)).cloned()
	}

	pub fn push_message(&self, msg: RawMessage) {
		self.state.borrow_mut().inbox.push_back(msg);
	}

	pub fn closed(&self) -> Vec<RawFd> {
		self.state.borrow().closed.clone()
	}

	/// Every `SetOption` call for `name`, oldest first.
	pub fn writes(&self, name: c_int) -> Vec<Vec<u8>> {
		self.calls()
			.into_iter()
			.filter_map(|c| match c {
				Call::SetOption { name: n, value, .. } if n == name => Some(value),
				_ => None,
			})
			.collect()
	}

	pub fn sent(&self) -> Vec<(Vec<u8>, Option<SctpAddr>, MessageMetadata)> {
		self.calls()
			.into_iter()
			.filter_map(|c| match c {
				Call::Send { payload, to, info } => Some((payload, to, info)),
				_ => None,
			})
			.collect()
	}

	fn enter(&self, call: Call, key: &str) -> Result<(), Errno> {
		let mut s = self.state.borrow_mut();
		s.calls.push(call);
		match s.failures.get(key) {
			Some(&errno) => Err(Errno(errno)),
			None => Ok(()),
		}
	}
}

impl Transport for MockTransport {
	fn features(&self) -> Features {
		self.state.borrow().features
	}

	fn open(&self, family: Family, style: Style) -> Result<RawFd, Errno> {
		self.enter(Call::Open(family, style), "open")?;
		let mut s = self.state.borrow_mut();
		s.next_fd += 1;
		Ok(s.next_fd)
	}

	fn close(&self, fd: RawFd) -> Result<(), Errno> {
		self.enter(Call::Close(fd), "close")?;
		self.state.borrow_mut().closed.push(fd);
		Ok(())
	}

	fn set_nonblocking(&self, fd: RawFd, nonblocking: bool) -> Result<(), Errno> {
		self.enter(Call::SetNonblocking(fd, nonblocking), "fcntl")
	}

	fn get_option(&self, _fd: RawFd, level: c_int, name: c_int, buf: &mut [u8]) -> Result<usize, Errno> {
		self.enter(Call::GetOption { level, name }, &format!("get:{name}"))?;
		let s = self.state.borrow();
		if name == SCTP_SOCKOPT_PEELOFF {
			buf[4..8].copy_from_slice(&s.peeloff_fd.to_ne_bytes());
			return Ok(8);
		}
		match s.options.get(&(level, name)) {
			Some(stored) => {
				let n = stored.len().min(buf.len());
				buf[..n].copy_from_slice(&stored[..n]);
				Ok(n)
			}
			None => Ok(buf.len()),
		}
	}

	fn set_option(&self, _fd: RawFd, level: c_int, name: c_int, buf: &[u8]) -> Result<c_int, Errno> {
		self.enter(Call::SetOption { level, name, value: buf.to_vec() }, &format!("set:{name}"))?;
		let mut s = self.state.borrow_mut();
		s.options.insert((level, name), buf.to_vec());
		if name == SCTP_SOCKOPT_CONNECTX {
			return Ok(s.connectx_id);
		}
		Ok(0)
	}

	fn bind(&self, _fd: RawFd, addr: &SctpAddr) -> Result<(), Errno> {
		self.enter(Call::Bind(*addr), "bind")
	}

	fn connect(&self, _fd: RawFd, addr: &SctpAddr) -> Result<(), Errno> {
		self.enter(Call::Connect(*addr), "connect")
	}

	fn listen(&self, _fd: RawFd, backlog: i32) -> Result<(), Errno> {
		self.enter(Call::Listen(backlog), "listen")
	}

	fn accept(&self, _fd: RawFd) -> Result<(RawFd, Option<SctpAddr>), Errno> {
		self.enter(Call::Accept, "accept")?;
		let mut s = self.state.borrow_mut();
		s.next_fd += 1;
		Ok((s.next_fd, s.accept_peer))
	}

	fn shutdown(&self, _fd: RawFd, how: Shutdown) -> Result<(), Errno> {
		self.enter(Call::Shutdown(how), "shutdown")
	}

	fn send(&self, _fd: RawFd, payload: &[u8], to: Option<&SctpAddr>, info: &MessageMetadata) -> Result<usize, Errno> {
		let call = Call::Send { payload: payload.to_vec(), to: to.copied(), info: *info };
		self.enter(call, "send")?;
		Ok(payload.len())
	}

	fn recv(&self, _fd: RawFd, max_len: usize) -> Result<RawMessage, Errno> {
		self.enter(Call::Recv(max_len), "recv")?;
		let mut s = self.state.borrow_mut();
		let Some(mut msg) = s.inbox.pop_front() else {
			return Err(Errno(libc::EAGAIN));
		};
		if msg.data.len() > max_len {
			let rest = msg.data.split_off(max_len);
			s.inbox.push_front(RawMessage { data: rest, ..msg.clone() });
			msg.flags &= !libc::MSG_EOR;
		}
		Ok(msg)
	}
}

pub fn open(style: Style) -> (MockTransport, SctpSocket<MockTransport>) {
	let mock = MockTransport::new();
	let socket = SctpSocket::open(mock.clone(), Family::Inet, style).unwrap();
	mock.clear_calls();
	(mock, socket)
}

pub fn addr(host: &str, port: u16) -> SctpAddr {
	SctpAddr::parse(host, port).unwrap()
}

/// Raw `sockaddr_in` as the kernel packs it in address lists.
pub fn sockaddr_in(ip: [u8; 4], port: u16) -> Vec<u8> {
	let mut raw = vec![0u8; 16];
	raw[0..2].copy_from_slice(&(libc::AF_INET as u16).to_ne_bytes());
	raw[2..4].copy_from_slice(&port.to_be_bytes());
	raw[4..8].copy_from_slice(&ip);
	raw
}

/// Notification header followed by `body`.
pub fn notification(kind: u16, flags: u16, body: &[u8]) -> Vec<u8> {
	let mut raw = Vec::with_capacity(8 + body.len());
	raw.extend_from_slice(&kind.to_ne_bytes());
	raw.extend_from_slice(&flags.to_ne_bytes());
	raw.extend_from_slice(&((8 + body.len()) as u32).to_ne_bytes());
	raw.extend_from_slice(body);
	raw
}
