use crate::error::{Result, SctpError};

/// Association identifier (`sctp_assoc_t`).
///
/// Only meaningful on multi-association sockets. [`AssocId::NONE`] is "the
/// one association" on single-association sockets and "endpoint defaults"
/// on multi-association sockets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct AssocId(pub i32);

impl AssocId {
	pub const NONE: AssocId = AssocId(0);

	#[inline]
	pub fn is_none(self) -> bool {
		self.0 == 0
	}
}

impl std::fmt::Display for AssocId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Socket personality, fixed when the socket is created.
///
/// - `SingleAssociation`: one association per socket, opened by
///   `connect` or `accept` (`SOCK_STREAM`, "TCP style")
/// - `MultiAssociation`: many associations per socket, opened implicitly
///   by sending to a new peer (`SOCK_SEQPACKET`, "UDP style")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
	SingleAssociation,
	MultiAssociation,
}

/*
  ┌───────────────────┬────────────────┬───────────────┐
  │ Style             │ Constant       │ Value (Linux) │
  ├───────────────────┼────────────────┼───────────────┤
  │ SingleAssociation │ SOCK_STREAM    │ 1             │
  ├───────────────────┼────────────────┼───────────────┤
  │ MultiAssociation  │ SOCK_SEQPACKET │ 5             │
  └───────────────────┴────────────────┴───────────────┘
*/

/// How an operation interprets its association id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
	/// Needs a real association; id 0 is rejected on multi-association sockets.
	Association,
	/// Id 0 on a multi-association socket means endpoint defaults.
	Endpoint,
}

/// Operations whose legality depends on the socket style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	Accept,
	Peeloff,
	Autoclose,
	SendToAssociation,
}

impl Operation {
	pub fn name(self) -> &'static str {
		match self {
			Operation::Accept => "accept",
			Operation::Peeloff => "peeloff",
			Operation::Autoclose => "autoclose",
			Operation::SendToAssociation => "send to association id",
		}
	}
}

impl Style {
	/// Returns the libc socket type for this style.
	#[inline]
	pub fn raw(self) -> libc::c_int {
		match self {
			Style::SingleAssociation => libc::SOCK_STREAM,
			Style::MultiAssociation => libc::SOCK_SEQPACKET,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Style::SingleAssociation => "single-association",
			Style::MultiAssociation => "multi-association",
		}
	}

	/// Validates an association id for this style.
	///
	/// Single-association sockets take only id 0. Multi-association sockets
	/// need a real id unless the operation accepts endpoint defaults.
	pub fn check_assoc_id(self, id: AssocId, scope: Scope) -> Result<()> {
		let legal = match (self, scope) {
			(Style::SingleAssociation, _) => id.is_none(),
			(Style::MultiAssociation, Scope::Association) => !id.is_none(),
			(Style::MultiAssociation, Scope::Endpoint) => true,
		};
		if legal {
			Ok(())
		} else {
			Err(SctpError::InvalidAssociation { id, style: self.name() })
		}
	}

	/// Fails with `UnsupportedOperation` when `op` is not legal on this style.
	pub fn require(self, op: Operation) -> Result<()> {
		let legal = match op {
			Operation::Accept => self == Style::SingleAssociation,
			Operation::Peeloff | Operation::Autoclose | Operation::SendToAssociation => {
				self == Style::MultiAssociation
			}
		};
		if legal {
			Ok(())
		} else {
			Err(SctpError::UnsupportedOperation {
				op: op.name(),
				reason: match self {
					Style::SingleAssociation => "not available on single-association sockets",
					Style::MultiAssociation => "not available on multi-association sockets",
				},
			})
		}
	}
}

impl std::fmt::Display for Style {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_association_takes_only_zero() {
		let s = Style::SingleAssociation;
		assert!(s.check_assoc_id(AssocId::NONE, Scope::Association).is_ok());
		assert!(s.check_assoc_id(AssocId::NONE, Scope::Endpoint).is_ok());
		assert!(matches!(
			s.check_assoc_id(AssocId(4), Scope::Endpoint),
			Err(SctpError::InvalidAssociation { id: AssocId(4), .. })
		));
	}

	#[test]
	fn multi_association_zero_means_endpoint() {
		let s = Style::MultiAssociation;
		assert!(s.check_assoc_id(AssocId::NONE, Scope::Endpoint).is_ok());
		assert!(s.check_assoc_id(AssocId(9), Scope::Association).is_ok());
		assert!(s.check_assoc_id(AssocId::NONE, Scope::Association).is_err());
	}

	#[test]
	fn operations_by_style() {
		assert!(Style::SingleAssociation.require(Operation::Accept).is_ok());
		assert!(Style::MultiAssociation.require(Operation::Accept).is_err());
		for op in [Operation::Peeloff, Operation::Autoclose, Operation::SendToAssociation] {
			assert!(matches!(
				Style::SingleAssociation.require(op),
				Err(SctpError::UnsupportedOperation { .. })
			));
			assert!(Style::MultiAssociation.require(op).is_ok());
		}
	}
}
