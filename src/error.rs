use crate::socket::AssocId;

/// Errors produced by the SCTP socket layer.
///
/// Legality checks (association id, socket style, address family) fail
/// before any native call is made. Native failures keep the raw errno.
#[derive(Debug, thiserror::Error)]
pub enum SctpError {
    #[error("association id {id} is not valid on a {style} socket")]
    InvalidAssociation { id: AssocId, style: &'static str },

    #[error("{op} is not supported: {reason}")]
    UnsupportedOperation { op: &'static str, reason: &'static str },

    #[error("association {id} does not correspond to any open association")]
    NoSuchAssociation { id: AssocId },

    #[error("address set mixes address families")]
    MixedAddressFamily,

    #[error("invalid address: {reason}")]
    InvalidAddress { reason: &'static str },

    #[error("unrecognized notification type {kind:#06x} (flags {flags:#06x})")]
    UnrecognizedEvent { kind: u16, flags: u16 },

    #[error("notification record of type {kind:#06x} truncated at {len} bytes")]
    MalformedRecord { kind: u16, len: usize },

    #[error("empty message requires the EOF or ABORT flag")]
    EmptyMessage,

    #[error("send failed: {errno}")]
    Transmission { errno: Errno },

    #[error("receive failed: {errno}")]
    Receive { errno: Errno },

    #[error("{op} failed: {errno}")]
    Native { op: &'static str, errno: Errno },
}

pub type Result<T> = std::result::Result<T, SctpError>;

/// Raw OS error number as reported by the native transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Errno(pub i32);

impl Errno {
    /// Captures the calling thread's current errno.
    #[inline]
    pub fn last() -> Self {
        Errno(errno())
    }

    /// Wraps this errno as the failure of a named native operation.
    pub(crate) fn during(self, op: &'static str) -> SctpError {
        SctpError::Native { op, errno: self }
    }
}

impl std::fmt::Display for Errno {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&errno_to_str(self.0))
    }
}

impl SctpError {
    /// Returns the native errno carried by this error, if any.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            SctpError::Transmission { errno }
            | SctpError::Receive { errno }
            | SctpError::Native { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}

/// Returns current errno value.
#[inline]
pub fn errno() -> i32 {
    unsafe { *libc::__errno_location() }
}

/// Converts errno to human-readable string.
fn errno_to_str(errno: i32) -> String {
    match errno {
        libc::EACCES => "permission denied".into(),
        libc::EADDRINUSE => "address already in use".into(),
        libc::EADDRNOTAVAIL => "address not available".into(),
        libc::EAFNOSUPPORT => "address family not supported".into(),
        libc::EAGAIN => "resource temporarily unavailable".into(),
        libc::EBADF => "bad file descriptor".into(),
        libc::ECONNREFUSED => "connection refused".into(),
        libc::ECONNRESET => "connection reset by peer".into(),
        libc::EINPROGRESS => "operation in progress".into(),
        libc::EINTR => "interrupted by signal".into(),
        libc::EINVAL => "invalid argument".into(),
        libc::EMFILE => "too many open files".into(),
        libc::EMSGSIZE => "message too long".into(),
        libc::ENETUNREACH => "network unreachable".into(),
        libc::ENOBUFS => "no buffer space available".into(),
        libc::ENOENT => "no such association".into(),
        libc::ENOPROTOOPT => "protocol option not available".into(),
        libc::ENOTCONN => "not connected".into(),
        libc::EOPNOTSUPP => "operation not supported".into(),
        libc::EPIPE => "broken pipe".into(),
        libc::EPROTONOSUPPORT => "protocol not supported".into(),
        libc::ETIMEDOUT => "connection timed out".into(),
        _ => format!("errno {}", errno),
    }
}

/// Maps errno to std::io::ErrorKind.
fn errno_to_kind(errno: i32) -> std::io::ErrorKind {
    match errno {
        libc::EACCES | libc::EPERM => std::io::ErrorKind::PermissionDenied,
        libc::EADDRINUSE => std::io::ErrorKind::AddrInUse,
        libc::EADDRNOTAVAIL => std::io::ErrorKind::AddrNotAvailable,
        libc::EAGAIN => std::io::ErrorKind::WouldBlock,
        libc::ECONNREFUSED => std::io::ErrorKind::ConnectionRefused,
        libc::ECONNRESET => std::io::ErrorKind::ConnectionReset,
        libc::EINTR => std::io::ErrorKind::Interrupted,
        libc::EINVAL => std::io::ErrorKind::InvalidInput,
        libc::ENOTCONN => std::io::ErrorKind::NotConnected,
        libc::EPIPE => std::io::ErrorKind::BrokenPipe,
        libc::ETIMEDOUT => std::io::ErrorKind::TimedOut,
        libc::EOPNOTSUPP | libc::EPROTONOSUPPORT => std::io::ErrorKind::Unsupported,
        _ => std::io::ErrorKind::Other,
    }
}

impl From<SctpError> for std::io::Error {
    fn from(err: SctpError) -> Self {
        let kind = match &err {
            SctpError::Transmission { errno }
            | SctpError::Receive { errno }
            | SctpError::Native { errno, .. } => errno_to_kind(errno.0),
            SctpError::UnsupportedOperation { .. } => std::io::ErrorKind::Unsupported,
            SctpError::NoSuchAssociation { .. } => std::io::ErrorKind::NotFound,
            SctpError::UnrecognizedEvent { .. } | SctpError::MalformedRecord { .. } => {
                std::io::ErrorKind::InvalidData
            }
            SctpError::InvalidAssociation { .. }
            | SctpError::MixedAddressFamily
            | SctpError::InvalidAddress { .. }
            | SctpError::EmptyMessage => std::io::ErrorKind::InvalidInput,
        };
        std::io::Error::new(kind, err)
    }
}
