use std::os::fd::{FromRawFd, IntoRawFd, OwnedFd, RawFd};

use crate::addr::SocketPath;
use crate::error::{IoError, SocketError, errno};
use crate::socket::Stream;

use super::listener::local_addr_of;
use super::raw::RawSocket;

/// Which direction(s) of a connection to shut down.
///
/// Half-close leaves the descriptor open: after `Read` the peer can still be
/// written to, after `Write` already-buffered data can still be read.
pub enum Shutdown {
	Read,       // SHUT_RD
	Write,      // SHUT_WR
	Both,       // SHUT_RDWR
}

/// A connected stream socket.
///
/// Represents an established connection — ready for read/write.
/// Created by Listener::accept() (server) or connect() (client).
#[derive(Debug)]
pub struct ConnectedStream {
	fd: OwnedFd,
}

impl ConnectedStream {
	/// Creates from an OwnedFd.
	pub(crate) fn from_fd(fd: OwnedFd) -> Self {
		Self { fd }
	}

	/// Connects to a listening socket at `path` in one step.
	///
	/// Path length is validated before the socket is created.
	pub fn connect<P: AsRef<[u8]>>(path: P) -> std::io::Result<Self> {
		let addr = SocketPath::new(path)?;
		RawSocket::<Stream>::new()?.connect(&addr)
	}

	/// Returns the raw file descriptor.
	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		use std::os::fd::AsRawFd;
		self.fd.as_raw_fd()
	}

	/// Reads up to `buf.len()` bytes, blocking until data arrives.
	///
	/// Returns 0 for end-of-stream (peer closed its write side), otherwise
	/// the number of bytes read — possibly fewer than requested. One raw
	/// syscall: no retry on EINTR, no short-read compensation. Callers
	/// wanting full-length delivery loop themselves.
	pub fn read(&self, buf: &mut [u8]) -> std::io::Result<usize> {
		let n = unsafe {
			libc::read(
				self.as_raw_fd(),
				buf.as_mut_ptr() as *mut libc::c_void,
				buf.len(),
			)
		};

		if n == -1 {
			Err(IoError::Read { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Writes up to `buf.len()` bytes.
	///
	/// Returns the number of bytes actually written — short writes are
	/// possible and not retried here.
	pub fn write(&self, buf: &[u8]) -> std::io::Result<usize> {
		let n = unsafe {
			libc::write(
				self.as_raw_fd(),
				buf.as_ptr() as *const libc::c_void,
				buf.len(),
			)
		};

		if n == -1 {
			Err(IoError::Write { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Shuts down one or both directions without releasing the descriptor.
	///
	/// `Shutdown::Read` stops further receives (subsequent reads return 0),
	/// `Shutdown::Write` signals EOF to the peer; the other direction keeps
	/// working either way.
	pub fn shutdown(&self, how: Shutdown) -> std::io::Result<()> {
		let how = match how {
			Shutdown::Read => libc::SHUT_RD,
			Shutdown::Write => libc::SHUT_WR,
			Shutdown::Both => libc::SHUT_RDWR,
		};

		let result = unsafe { libc::shutdown(self.as_raw_fd(), how) };

		if result == -1 {
			Err(IoError::Shutdown { errno: errno() }.into())
		} else {
			Ok(())
		}
	}

	/// Shuts down both directions and releases the descriptor.
	///
	/// The shutdown step is best-effort and its error ignored; only the
	/// close result is surfaced. Consuming self means a closed stream cannot
	/// be read, written, or closed again.
	pub fn close(self) -> std::io::Result<()> {
		close_fd(self.fd)
	}

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

	/// Returns the path of the peer's socket, if it is bound to one.
	pub fn peer_addr(&self) -> std::io::Result<SocketPath> {
		let mut raw: libc::sockaddr_un = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_un>() as libc::socklen_t;

		let result = unsafe {
			libc::getpeername(
				self.as_raw_fd(),
				&mut raw as *mut _ as *mut libc::sockaddr,
				&mut len,
			)
		};

		if result == -1 {
			return Err(SocketError::AddrLookup { errno: errno(), call: "getpeername" }.into());
		}

		Ok(SocketPath::from_raw(&raw))
	}

	/// Returns the local path of this connection, if bound.
	pub fn local_addr(&self) -> std::io::Result<SocketPath> {
		local_addr_of(self.as_raw_fd())
	}
}

/// Best-effort full shutdown, then close. Shared by the connected types.
pub(crate) fn close_fd(fd: OwnedFd) -> std::io::Result<()> {
	let fd = fd.into_raw_fd();
	let _ = unsafe { libc::shutdown(fd, libc::SHUT_RDWR) };
	let result = unsafe { libc::close(fd) };
	if result == -1 {
		Err(IoError::Close { errno: errno() }.into())
	} else {
		Ok(())
	}
}

impl std::os::fd::AsRawFd for ConnectedStream {
	fn as_raw_fd(&self) -> std::os::fd::RawFd {
		self.fd.as_raw_fd()
	}
}

impl std::os::fd::AsFd for ConnectedStream {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}

impl std::io::Read for ConnectedStream {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		ConnectedStream::read(self, buf)
	}
}

impl std::io::Write for ConnectedStream {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		ConnectedStream::write(self, buf)
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())  // No userspace buffering at this level
	}
}

impl FromRawFd for ConnectedStream {
	unsafe fn from_raw_fd(fd: RawFd) -> Self {
		unsafe { Self::from_fd(OwnedFd::from_raw_fd(fd)) }
	}
}

impl IntoRawFd for ConnectedStream {
	fn into_raw_fd(self) -> RawFd {
		self.fd.into_raw_fd()
	}
}
