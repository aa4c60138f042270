use std::os::fd::OwnedFd;

use crate::addr::SocketPath;
use crate::error::{IoError, errno};
use crate::socket::Datagram;

use super::listener::local_addr_of;
use super::raw::RawSocket;
use super::stream::{Shutdown, close_fd};

/// A bound datagram socket.
///
/// Immediately usable for receive after bind — datagram mode has no
/// connection queue and no accept step. Each send names a destination,
/// each message keeps its boundaries.
#[derive(Debug)]
pub struct BoundDatagram {
	fd: OwnedFd,
}

impl BoundDatagram {
	pub(crate) fn from_fd(fd: OwnedFd) -> Self {
		Self { fd }
	}

	/// Creates a datagram socket bound to `path` in one step.
	///
	/// Path length is validated before the socket is created. Leaves a
	/// socket node at `path` for the caller to unlink when done.
	pub fn bind<P: AsRef<[u8]>>(path: P) -> std::io::Result<Self> {
		let addr = SocketPath::new(path)?;
		RawSocket::<Datagram>::new()?.bind(&addr)
	}

	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		use std::os::fd::AsRawFd;
		self.fd.as_raw_fd()
	}

	/// Receives one datagram, blocking until one arrives.
	///
	/// Returns bytes read; a datagram longer than `buf` is truncated.
	pub fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
		let n = unsafe {
			libc::recvfrom(
				self.as_raw_fd(),
				buf.as_mut_ptr() as *mut libc::c_void,
				buf.len(),
				0,
				std::ptr::null_mut(),
				std::ptr::null_mut(),
			)
		};

		if n == -1 {
			Err(IoError::Read { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Receives one datagram along with the sender's address.
	///
	/// The sender path is empty if the peer socket is unbound.
	pub fn recv_from(&self, buf: &mut [u8]) -> std::io::Result<(usize, SocketPath)> {
		let mut raw: libc::sockaddr_un = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_un>() as libc::socklen_t;

		let n = unsafe {
			libc::recvfrom(
				self.as_raw_fd(),
				buf.as_mut_ptr() as *mut libc::c_void,
				buf.len(),
				0,
				&mut raw as *mut _ as *mut libc::sockaddr,
				&mut len,
			)
		};

		if n == -1 {
			Err(IoError::Read { errno: errno() }.into())
		} else {
			Ok((n as usize, SocketPath::from_raw(&raw)))
		}
	}

	/// Sends one datagram to the socket bound at `addr`.
	pub fn send_to(&self, buf: &[u8], addr: &SocketPath) -> std::io::Result<usize> {
		let n = addr.with_raw(|ptr, len| unsafe {
			libc::sendto(
				self.as_raw_fd(),
				buf.as_ptr() as *const libc::c_void,
				buf.len(),
				0,
				ptr,
				len,
			)
		});

		if n == -1 {
			Err(IoError::Write { errno: errno() }.into())
		} else {
			Ok(n as usize)
		}
	}

	/// Returns the filesystem path this socket is bound to.
	pub fn local_addr(&self) -> std::io::Result<SocketPath> {
		local_addr_of(self.as_raw_fd())
	}

	/// Releases the descriptor (best-effort shutdown first).
	pub fn close(self) -> std::io::Result<()> {
		close_fd(self.fd)
	}
}

/// A datagram socket connected to a fixed destination.
///
/// The original's client open() in datagram mode: connect() pins the peer
/// path so plain send/recv work without naming it each time.
pub struct ConnectedDatagram {
	fd: OwnedFd,
}

impl ConnectedDatagram {
	pub(crate) fn from_fd(fd: OwnedFd) -> Self {
		Self { fd }
	}

	/// Creates a datagram socket connected to the one bound at `path`.
	///
	/// The local end stays unbound, so the peer cannot address replies to
	/// it; bind a `BoundDatagram` instead when replies are needed.
	pub fn connect<P: AsRef<[u8]>>(path: P) -> std::io::Result<Self> {
		let addr = SocketPath::new(path)?;
		RawSocket::<Datagram>::new()?.connect(&addr)
	}

	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		use std::os::fd::AsRawFd;
		self.fd.as_raw_fd()
	}

	/// Sends one datagram to the connected peer.
	pub fn send(&self, buf: &[u8]) -> std::io::Result<usize> {
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

	/// Receives one datagram from the connected peer.
	pub fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
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

	/// Shuts down one or both directions without releasing the descriptor.
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

	/// Releases the descriptor (best-effort shutdown first).
	pub fn close(self) -> std::io::Result<()> {
		close_fd(self.fd)
	}
}

impl std::os::fd::AsRawFd for BoundDatagram {
	fn as_raw_fd(&self) -> std::os::fd::RawFd {
		self.fd.as_raw_fd()
	}
}

impl std::os::fd::AsFd for BoundDatagram {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}

impl std::os::fd::AsRawFd for ConnectedDatagram {
	fn as_raw_fd(&self) -> std::os::fd::RawFd {
		self.fd.as_raw_fd()
	}
}

impl std::os::fd::AsFd for ConnectedDatagram {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}
