use std::os::fd::OwnedFd;

use crate::addr::SocketPath;
use crate::error::{SocketError, errno};
use crate::socket::{Stream, bound::BoundSocket};

use super::raw::RawSocket;
use super::stream::ConnectedStream;

/// A listening stream socket ready to accept connections.
///
/// Only exists for stream sockets — datagram sockets have no connection
/// queue, so there is nothing to accept; `BoundDatagram` receives directly.
#[derive(Debug)]
pub struct Listener {
    fd: OwnedFd,
}

impl Listener {
    /// Creates a Listener from an OwnedFd.
    ///
    /// Internal use only — called by BoundSocket::listen()
    pub(crate) fn from_fd(fd: OwnedFd) -> Self {
        Self { fd }
    }

    /// Creates a listening socket bound to `path` in one step.
    ///
    /// The path is validated before any syscall: a too-long path fails with
    /// `PathTooLong` and creates nothing on disk. Otherwise this performs
    /// socket + bind + listen, leaving a socket node at `path` that the
    /// caller unlinks when done.
    pub fn bind<P: AsRef<[u8]>>(path: P, backlog: i32) -> std::io::Result<Self> {
        let addr = SocketPath::new(path)?;
        RawSocket::<Stream>::new()?.bind(&addr)?.listen(backlog)
    }

    /// Returns the raw file descriptor.
    #[inline]
    pub fn as_raw_fd(&self) -> libc::c_int {
        use std::os::fd::AsRawFd;
        self.fd.as_raw_fd()
    }

    /// Accepts an incoming connection, blocking until a peer connects.
    ///
    /// Returns a new, independently owned `ConnectedStream` for that peer;
    /// the listener itself stays open for further accepts. The wait is a
    /// direct blocking syscall — interruption follows OS signal semantics,
    /// there is no cancellation hook here.
    pub fn accept(&self) -> std::io::Result<ConnectedStream> {
        use std::os::fd::FromRawFd;
        let fd = unsafe {
            libc::accept4(
                self.as_raw_fd(),
                std::ptr::null_mut(),    // Peer address not needed
                std::ptr::null_mut(),
                libc::SOCK_CLOEXEC,
            )
        };

        if fd == -1 {
            return Err(SocketError::Accept { errno: errno() }.into());
        }

        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(ConnectedStream::from_fd(fd))
    }

    /// Returns the filesystem path this listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketPath> {
        local_addr_of(self.as_raw_fd())
    }

    /// Sets or clears `O_NONBLOCK` on the listener socket.
    ///
    /// Affects whether `accept()` blocks or returns `WouldBlock`.
    pub fn set_nonblocking(&self, nonblocking: bool) -> std::io::Result<()> {
        let flags = unsafe { libc::fcntl(self.as_raw_fd(), libc::F_GETFL) };
        if flags == -1 {
            return Err(SocketError::SetOption { errno: errno(), option: "F_GETFL" }.into());
        }
        let new_flags = if nonblocking {
            flags | libc::O_NONBLOCK
        } else {
            flags & !libc::O_NONBLOCK
        };
        let result = unsafe { libc::fcntl(self.as_raw_fd(), libc::F_SETFL, new_flags) };
        if result == -1 {
            return Err(SocketError::SetOption { errno: errno(), option: "O_NONBLOCK" }.into());
        }
        Ok(())
    }
}

/// Shared getsockname wrapper for the bound socket types.
pub(crate) fn local_addr_of(fd: libc::c_int) -> std::io::Result<SocketPath> {
    let mut raw: libc::sockaddr_un = unsafe { std::mem::zeroed() };
    let mut len = std::mem::size_of::<libc::sockaddr_un>() as libc::socklen_t;

    let result = unsafe {
        libc::getsockname(
            fd,
            &mut raw as *mut _ as *mut libc::sockaddr,
            &mut len,
        )
    };

    if result == -1 {
        return Err(SocketError::AddrLookup { errno: errno(), call: "getsockname" }.into());
    }

    Ok(SocketPath::from_raw(&raw))
}

impl std::os::fd::AsRawFd for Listener {
    fn as_raw_fd(&self) -> std::os::fd::RawFd {
        self.fd.as_raw_fd()
    }
}

impl std::os::fd::AsFd for Listener {
    fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl std::os::fd::FromRawFd for Listener {
    unsafe fn from_raw_fd(fd: std::os::fd::RawFd) -> Self {
        unsafe { Self::from_fd(OwnedFd::from_raw_fd(fd)) }
    }
}

impl std::os::fd::IntoRawFd for Listener {
    fn into_raw_fd(self) -> std::os::fd::RawFd {
        self.fd.into_raw_fd()
    }
}

impl BoundSocket {
    /// Transitions to a listening socket.
    ///
    /// `backlog` — maximum pending not-yet-accepted connections queued.
    ///
    /// Consumes self — you cannot use BoundSocket after this.
    /// Returns Listener ready for accept().
    pub fn listen(self, backlog: i32) -> std::io::Result<Listener> {
        let result = unsafe {
            libc::listen(self.as_raw_fd(), backlog)
        };

        if result == -1 {
            return Err(SocketError::Listen { errno: errno(), backlog }.into());
        }

        Ok(Listener::from_fd(self.into_fd()))
    }
}
