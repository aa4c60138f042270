/// Socket setup errors (create/bind/listen/connect/accept).
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("socket path too long: {len} bytes (max {})", crate::addr::MAX_PATH_LEN)]
    PathTooLong { len: usize },

    #[error("socket() failed: {}", errno_to_str(*.errno))]
    Create { errno: i32 },

    #[error("bind({path}) failed: {}", errno_to_str(*.errno))]
    Bind { errno: i32, path: String },

    #[error("listen(backlog={backlog}) failed: {}", errno_to_str(*.errno))]
    Listen { errno: i32, backlog: i32 },

    #[error("connect({path}) failed: {}", errno_to_str(*.errno))]
    Connect { errno: i32, path: String },

    #[error("accept() failed: {}", errno_to_str(*.errno))]
    Accept { errno: i32 },

    #[error("{call}() failed: {}", errno_to_str(*.errno))]
    AddrLookup { errno: i32, call: &'static str },

    #[error("setsockopt({option}) failed: {}", errno_to_str(*.errno))]
    SetOption { errno: i32, option: &'static str },
}

/// I/O and teardown errors on an established socket.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("read() failed: {}", errno_to_str(*.errno))]
    Read { errno: i32 },

    #[error("write() failed: {}", errno_to_str(*.errno))]
    Write { errno: i32 },

    #[error("shutdown() failed: {}", errno_to_str(*.errno))]
    Shutdown { errno: i32 },

    #[error("close() failed: {}", errno_to_str(*.errno))]
    Close { errno: i32 },
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
        libc::EAGAIN => "resource temporarily unavailable".into(),
        libc::EBADF => "bad file descriptor".into(),
        libc::ECONNREFUSED => "connection refused".into(),
        libc::ECONNRESET => "connection reset by peer".into(),
        libc::EINTR => "interrupted by signal".into(),
        libc::EINVAL => "invalid argument".into(),
        libc::EMFILE => "too many open files".into(),
        libc::ENOENT => "no such file or directory".into(),
        libc::ENOTCONN => "not connected".into(),
        libc::EPIPE => "broken pipe".into(),
        libc::EPROTOTYPE => "wrong socket type for protocol".into(),
        _ => format!("errno {}", errno),
    }
}

/// Maps errno to std::io::ErrorKind.
fn errno_to_kind(errno: i32) -> std::io::ErrorKind {
    match errno {
        libc::EACCES | libc::EPERM => std::io::ErrorKind::PermissionDenied,
        libc::EADDRINUSE => std::io::ErrorKind::AddrInUse,
        libc::EAGAIN => std::io::ErrorKind::WouldBlock,
        libc::ECONNREFUSED => std::io::ErrorKind::ConnectionRefused,
        libc::ECONNRESET => std::io::ErrorKind::ConnectionReset,
        libc::EINTR => std::io::ErrorKind::Interrupted,
        libc::EINVAL => std::io::ErrorKind::InvalidInput,
        libc::ENOENT => std::io::ErrorKind::NotFound,
        libc::ENOTCONN => std::io::ErrorKind::NotConnected,
        libc::EPIPE => std::io::ErrorKind::BrokenPipe,
        _ => std::io::ErrorKind::Other,
    }
}

impl From<SocketError> for std::io::Error {
    fn from(err: SocketError) -> Self {
        let kind = match &err {
            SocketError::PathTooLong { .. } => std::io::ErrorKind::InvalidInput,
            SocketError::Create { errno } => errno_to_kind(*errno),
            SocketError::Bind { errno, .. } => errno_to_kind(*errno),
            SocketError::Listen { errno, .. } => errno_to_kind(*errno),
            SocketError::Connect { errno, .. } => errno_to_kind(*errno),
            SocketError::Accept { errno } => errno_to_kind(*errno),
            SocketError::AddrLookup { errno, .. } => errno_to_kind(*errno),
            SocketError::SetOption { errno, .. } => errno_to_kind(*errno),
        };
        std::io::Error::new(kind, err)
    }
}

impl From<IoError> for std::io::Error {
    fn from(err: IoError) -> Self {
        let errno = match &err {
            IoError::Read { errno } => *errno,
            IoError::Write { errno } => *errno,
            IoError::Shutdown { errno } => *errno,
            IoError::Close { errno } => *errno,
        };
        std::io::Error::new(errno_to_kind(errno), err)
    }
}
