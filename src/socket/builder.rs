use super::{BindAction, SctpSocket, Style, set_recv_buffer_size, set_reuse_addr, set_reuse_port, set_send_buffer_size};
use crate::addr::{Family, ToSctpAddr, resolve_set};
use crate::error::Result;
use crate::event::EventSubscription;
use crate::params::InitParams;
use crate::transport::Transport;

// ============================================================================
// Shared Configuration Structs
// ============================================================================

/// Socket buffer sizes, as the caller means them.
///
/// The kernel doubles what it is given, so the setters pass half.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferConfig {
	pub recv: Option<usize>,
	pub send: Option<usize>,
}

impl BufferConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn recv(mut self, size: usize) -> Self {
		self.recv = Some(size);
		self
	}

	pub fn send(mut self, size: usize) -> Self {
		self.send = Some(size);
		self
	}

	pub fn both(mut self, size: usize) -> Self {
		self.recv = Some(size);
		self.send = Some(size);
		self
	}

	fn apply<T: Transport>(&self, socket: &SctpSocket<T>) -> Result<()> {
		if let Some(size) = self.recv {
			set_recv_buffer_size(socket, size)?;
		}
		if let Some(size) = self.send {
			set_send_buffer_size(socket, size)?;
		}
		Ok(())
	}
}

/// `SO_REUSEADDR` / `SO_REUSEPORT`.
#[derive(Debug, Clone, Copy)]
pub struct ReuseConfig {
	pub addr: bool,
	pub port: bool,
}

impl Default for ReuseConfig {
	fn default() -> Self {
		Self {
			addr: true, // restarted servers rebind while old associations drain
			port: false,
		}
	}
}

impl ReuseConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn addr(mut self, enable: bool) -> Self {
		self.addr = enable;
		self
	}

	pub fn port(mut self, enable: bool) -> Self {
		self.port = enable;
		self
	}

	/// Several processes share one SCTP port.
	pub fn both(mut self) -> Self {
		self.addr = true;
		self.port = true;
		self
	}

	fn apply<T: Transport>(&self, socket: &SctpSocket<T>) -> Result<()> {
		if self.addr {
			set_reuse_addr(socket, true)?;
		}
		if self.port {
			set_reuse_port(socket, true)?;
		}
		Ok(())
	}
}

// ============================================================================
// Socket Builder
// ============================================================================

/// Builder for configured SCTP sockets.
///
/// Options are applied in a fixed order right after the socket is created:
/// reuse, buffers, nodelay, init parameters, event subscription, autoclose,
/// blocking mode.
///
/// # Example
/// ```no_run
/// use sctplane::{Family, InitParams, Kernel, ReuseConfig, SocketBuilder, Style};
///
/// # fn main() -> sctplane::Result<()> {
/// let server = SocketBuilder::new(Kernel::probe()?, Family::Inet, Style::MultiAssociation)
///     .reuse(ReuseConfig::new().addr(true))
///     .init(InitParams::new().streams(10, 10))
///     .autoclose(30)
///     .listen(&[("10.0.0.1", 36412u16), ("10.0.1.1", 36412u16)])?;
/// # drop(server);
/// # Ok(())
/// # }
/// ```
pub struct SocketBuilder<T: Transport> {
	transport: T,
	family: Family,
	style: Style,
	reuse: ReuseConfig,
	buffers: BufferConfig,
	init: Option<InitParams>,
	events: Option<EventSubscription>,
	nodelay: bool,
	autoclose: Option<u32>,
	nonblocking: bool,
	backlog: i32,
}

impl<T: Transport> SocketBuilder<T> {
	pub fn new(transport: T, family: Family, style: Style) -> Self {
		Self {
			transport,
			family,
			style,
			reuse: ReuseConfig::default(),
			buffers: BufferConfig::default(),
			init: None,
			events: None,
			nodelay: true,  // Low latency by default
			autoclose: None,
			nonblocking: false,
			backlog: 128,
		}
	}

	/// Set address reuse options.
	pub fn reuse(mut self, config: ReuseConfig) -> Self {
		self.reuse = config;
		self
	}

	/// Set buffer sizes.
	pub fn buffers(mut self, config: BufferConfig) -> Self {
		self.buffers = config;
		self
	}

	/// Parameters for associations this socket opens.
	pub fn init(mut self, params: InitParams) -> Self {
		self.init = Some(params);
		self
	}

	pub fn events(mut self, events: EventSubscription) -> Self {
		self.events = Some(events);
		self
	}

	pub fn nodelay(mut self, enable: bool) -> Self {
		self.nodelay = enable;
		self
	}

	/// Idle timeout in seconds. Multi-association sockets only; `open`
	/// fails with `UnsupportedOperation` otherwise.
	pub fn autoclose(mut self, seconds: u32) -> Self {
		self.autoclose = Some(seconds);
		self
	}

	/// Set non-blocking mode.
	pub fn nonblocking(mut self, enable: bool) -> Self {
		self.nonblocking = enable;
		self
	}

	/// Set listen backlog. Default: 128.
	pub fn backlog(mut self, backlog: i32) -> Self {
		self.backlog = backlog;
		self
	}

	/// Creates and configures the socket without binding it.
	pub fn open(self) -> Result<SctpSocket<T>> {
		let socket = SctpSocket::open(self.transport, self.family, self.style)?;

		self.reuse.apply(&socket)?;
		self.buffers.apply(&socket)?;
		if self.nodelay {
			socket.set_nodelay(true)?;
		}
		if let Some(init) = self.init {
			socket.set_init_params(&init)?;
		}
		if let Some(events) = self.events {
			socket.set_events(&events)?;
		}
		if let Some(seconds) = self.autoclose {
			socket.set_autoclose(seconds)?;
		}
		if self.nonblocking {
			socket.set_nonblocking(true)?;
		}
		Ok(socket)
	}

	/// Binds every address in `addrs` and starts listening.
	pub fn listen<A: ToSctpAddr>(self, addrs: &[A]) -> Result<SctpSocket<T>> {
		let addrs = resolve_set(addrs)?;
		let backlog = self.backlog;
		let socket = self.open()?;

		let (first, rest) = addrs.split_at(1);
		socket.bind(first[0])?;
		if !rest.is_empty() {
			socket.bind_many(rest, BindAction::Add)?;
		}
		socket.listen(backlog)?;
		Ok(socket)
	}

	/// Connects to `addrs`, the first being the primary path.
	pub fn connect<A: ToSctpAddr>(self, addrs: &[A]) -> Result<SctpSocket<T>> {
		let addrs = resolve_set(addrs)?;
		let socket = self.open()?;

		if addrs.len() == 1 {
			socket.connect(addrs[0])?;
		} else {
			socket.connect_many(&addrs)?;
		}
		Ok(socket)
	}
}
