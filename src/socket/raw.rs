use std::marker::PhantomData;
use std::os::fd::{FromRawFd, OwnedFd};

use crate::addr::SocketPath;
use crate::error::{SocketError, errno};
use crate::socket::datagram::{BoundDatagram, ConnectedDatagram};
use crate::socket::stream::ConnectedStream;
use crate::socket::{Datagram, SockType, Stream};

use super::bound::BoundSocket;

/// A local socket that has been created but not yet bound or connected.
///
/// This is the starting point for both modes.
/// Use `.bind()` to become a listener or datagram socket.
/// Use `.connect()` to become a connected peer.
pub struct RawSocket<T: SockType> {
	fd: OwnedFd,
	_marker: PhantomData<T>,
}

impl<T: SockType> RawSocket<T> {
	/// Creates a new raw socket.
	///
	/// Calls the `socket()` syscall with `AF_UNIX` and the type's constant.
	/// The socket is created with `SOCK_CLOEXEC` (close on exec).
	pub fn new() -> std::io::Result<Self> {
		let fd = unsafe {
			libc::socket(libc::AF_UNIX, T::raw() | libc::SOCK_CLOEXEC, 0)
		};
		if fd == -1 {
			return Err(SocketError::Create { errno: errno() }.into());
		}
		let fd = unsafe { OwnedFd::from_raw_fd(fd) };

		Ok(Self {
			fd,
			_marker: PhantomData,
		})
	}

	/// Returns the raw file descriptor.
	///
	/// Used internally for syscalls. Does not transfer ownership.
	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		use std::os::fd::AsRawFd;
		self.fd.as_raw_fd()
	}

	/// Sets the socket to non-blocking mode.
	///
	/// The core contract is blocking; readiness-based callers toggle this
	/// before handing the descriptor to poll/epoll.
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

	fn bind_raw(&self, path: &SocketPath) -> std::io::Result<()> {
		let result = path.with_raw(|ptr, len| unsafe {
			libc::bind(self.as_raw_fd(), ptr, len)
		});

		if result == -1 {
			return Err(SocketError::Bind {
				errno: errno(),
				path: path.to_string(),
			}.into());
		}
		Ok(())
	}

	fn connect_raw(&self, path: &SocketPath) -> std::io::Result<()> {
		let result = path.with_raw(|ptr, len| unsafe {
			libc::connect(self.as_raw_fd(), ptr, len)
		});

		if result == -1 {
			return Err(SocketError::Connect {
				errno: errno(),
				path: path.to_string(),
			}.into());
		}
		Ok(())
	}

	pub(crate) fn into_fd(self) -> OwnedFd {
		self.fd
	}
}

impl RawSocket<Stream> {
	/// Binds the socket to a filesystem path.
	///
	/// Consumes self, returns BoundSocket ready for `.listen()`.
	/// Side effect: creates a socket node at `path`; unlinking it on
	/// shutdown is the caller's concern.
	pub fn bind(self, path: &SocketPath) -> std::io::Result<BoundSocket> {
		self.bind_raw(path)?;
		Ok(BoundSocket::from_fd(self.into_fd()))
	}

	/// Connects to a listening socket at `path`.
	///
	/// For clients. Consumes self, returns a connected stream.
	pub fn connect(self, path: &SocketPath) -> std::io::Result<ConnectedStream> {
		self.connect_raw(path)?;
		Ok(ConnectedStream::from_fd(self.into_fd()))
	}
}

impl RawSocket<Datagram> {
	/// Binds the socket to a filesystem path.
	///
	/// A bound datagram socket is immediately usable for receive — there is
	/// no listen/accept step in this mode.
	pub fn bind(self, path: &SocketPath) -> std::io::Result<BoundDatagram> {
		self.bind_raw(path)?;
		Ok(BoundDatagram::from_fd(self.into_fd()))
	}

	/// Connects the socket to a bound datagram socket at `path`.
	///
	/// Fixes the destination so plain `send()`/`recv()` work.
	pub fn connect(self, path: &SocketPath) -> std::io::Result<ConnectedDatagram> {
		self.connect_raw(path)?;
		Ok(ConnectedDatagram::from_fd(self.into_fd()))
	}
}

impl<T: SockType> std::os::fd::AsRawFd for RawSocket<T> {
	fn as_raw_fd(&self) -> std::os::fd::RawFd {
		self.fd.as_raw_fd()
	}
}

impl<T: SockType> std::os::fd::AsFd for RawSocket<T> {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}

impl<T: SockType> std::os::fd::FromRawFd for RawSocket<T> {
	unsafe fn from_raw_fd(fd: std::os::fd::RawFd) -> Self {
		unsafe { Self { fd: OwnedFd::from_raw_fd(fd), _marker: PhantomData } }
	}
}

impl<T: SockType> std::os::fd::IntoRawFd for RawSocket<T> {
	fn into_raw_fd(self) -> std::os::fd::RawFd {
		self.fd.into_raw_fd()
	}
}
