use std::os::fd::OwnedFd;

/// A stream socket bound to a path but not yet listening.
///
/// Call `.listen()` to become a Listener. Datagram sockets never pass
/// through this state — binding one yields a usable BoundDatagram directly.
pub struct BoundSocket {
	fd: OwnedFd,
}

impl BoundSocket {
	/// Creates a BoundSocket from an OwnedFd.
	///
	/// Internal use only — called by RawSocket::bind()
	pub(crate) fn from_fd(fd: OwnedFd) -> Self {
		Self { fd }
	}

	/// Returns the raw file descriptor.
	#[inline]
	pub fn as_raw_fd(&self) -> libc::c_int {
		use std::os::fd::AsRawFd;
		self.fd.as_raw_fd()
	}

	/// Extracts the owned file descriptor, consuming self.
	pub(crate) fn into_fd(self) -> OwnedFd {
		self.fd
	}
}

impl std::os::fd::AsRawFd for BoundSocket {
	fn as_raw_fd(&self) -> std::os::fd::RawFd {
		self.fd.as_raw_fd()
	}
}

impl std::os::fd::AsFd for BoundSocket {
	fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
		self.fd.as_fd()
	}
}

impl std::os::fd::FromRawFd for BoundSocket {
	unsafe fn from_raw_fd(fd: std::os::fd::RawFd) -> Self {
		unsafe { Self::from_fd(OwnedFd::from_raw_fd(fd)) }
	}
}

impl std::os::fd::IntoRawFd for BoundSocket {
	fn into_raw_fd(self) -> std::os::fd::RawFd {
		self.fd.into_raw_fd()
	}
}
