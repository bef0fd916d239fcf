use std::ops::Deref;

use super::InitParams;
use crate::error::Result;
use crate::event::EventSubscription;
use crate::socket::SctpSocket;
use crate::transport::Transport;

/// A whole-record option that can be read from and written back to a socket.
pub trait Committable: Copy {
	fn fetch<T: Transport>(socket: &SctpSocket<T>) -> Result<Self>;
	fn commit<T: Transport>(&self, socket: &SctpSocket<T>) -> Result<()>;
}

impl Committable for InitParams {
	fn fetch<T: Transport>(socket: &SctpSocket<T>) -> Result<Self> {
		socket.init_params()
	}

	fn commit<T: Transport>(&self, socket: &SctpSocket<T>) -> Result<()> {
		socket.set_init_params(self)
	}
}

impl Committable for EventSubscription {
	fn fetch<T: Transport>(socket: &SctpSocket<T>) -> Result<Self> {
		socket.events()
	}

	fn commit<T: Transport>(&self, socket: &SctpSocket<T>) -> Result<()> {
		socket.set_events(self)
	}
}

/// A local copy of a socket option that writes itself back on change.
///
/// With `autoflush` on (the default) every [`update`](Self::update) writes
/// the entire record. With it off, updates accumulate until
/// [`flush`](Self::flush).
///
/// ```no_run
/// # fn demo(socket: &sctplane::SctpSocket) -> sctplane::Result<()> {
/// let mut events = socket.subscriptions()?;
/// events.set_autoflush(false);
/// events.update(|e| e.association = true)?;
/// events.update(|e| e.shutdown = true)?;
/// events.flush()?;
/// # Ok(())
/// # }
/// ```
pub struct AutoCommit<'a, T: Transport, V: Committable> {
	socket: &'a SctpSocket<T>,
	value: V,
	autoflush: bool,
	dirty: bool,
}

impl<'a, T: Transport, V: Committable> AutoCommit<'a, T, V> {
	/// Reads the current value from the socket.
	pub fn load(socket: &'a SctpSocket<T>) -> Result<Self> {
		let value = V::fetch(socket)?;
		Ok(Self { socket, value, autoflush: true, dirty: false })
	}

	pub fn get(&self) -> V {
		self.value
	}

	pub fn autoflush(&self) -> bool {
		self.autoflush
	}

	pub fn set_autoflush(&mut self, enable: bool) {
		self.autoflush = enable;
	}

	/// True when local changes have not been written yet.
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	pub fn update<F: FnOnce(&mut V)>(&mut self, change: F) -> Result<()> {
		change(&mut self.value);
		self.dirty = true;
		if self.autoflush {
			self.flush()?;
		}
		Ok(())
	}

	/// Writes the entire record, dirty or not.
	pub fn flush(&mut self) -> Result<()> {
		self.value.commit(self.socket)?;
		self.dirty = false;
		Ok(())
	}

	/// Discards local changes and rereads the socket.
	pub fn refresh(&mut self) -> Result<()> {
		self.value = V::fetch(self.socket)?;
		self.dirty = false;
		Ok(())
	}
}

impl<T: Transport> AutoCommit<'_, T, EventSubscription> {
	/// [`EventSubscription::clear`], then flush if autoflush is on.
	pub fn clear(&mut self) -> Result<()> {
		self.update(EventSubscription::clear)
	}
}

impl<T: Transport, V: Committable> Deref for AutoCommit<'_, T, V> {
	type Target = V;

	fn deref(&self) -> &V {
		&self.value
	}
}
