//! Filesystem-path addresses for local sockets.

use crate::error::SocketError;

/// Longest usable socket path in bytes.
///
/// The fixed address buffer is 104 bytes on the most restrictive platforms;
/// one byte is reserved for the NUL terminator.
pub const MAX_PATH_LEN: usize = 103;

/// A validated Unix domain socket address (filesystem path).
///
/// Length is checked once at construction, before any syscall, so a
/// `SocketPath` can always be turned into a raw `sockaddr_un`. A path that
/// is too long never reaches the kernel and creates no OS resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketPath {
	path: Vec<u8>,
}

impl SocketPath {
	/// Creates a new address from a filesystem path.
	///
	/// Fails with `PathTooLong` if the path exceeds [`MAX_PATH_LEN`] bytes.
	pub fn new<P: AsRef<[u8]>>(path: P) -> std::io::Result<Self> {
		let path = path.as_ref();
		if path.len() > MAX_PATH_LEN {
			return Err(SocketError::PathTooLong { len: path.len() }.into());
		}
		Ok(Self { path: path.to_vec() })
	}

	/// Returns the path bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.path
	}

	/// Converts to the raw sockaddr_un plus its effective length.
	///
	/// The structure is zero-initialized, the family set, and the path
	/// copied verbatim. The length is the family field plus the path bytes,
	/// not the full structure size. Free of I/O.
	pub(crate) fn to_raw(&self) -> (libc::sockaddr_un, libc::socklen_t) {
		let mut addr: libc::sockaddr_un = unsafe { std::mem::zeroed() };
		addr.sun_family = libc::AF_UNIX as libc::sa_family_t;
		for (i, &byte) in self.path.iter().enumerate() {
			addr.sun_path[i] = byte as libc::c_char;
		}
		let len = std::mem::size_of::<libc::sa_family_t>() + self.path.len();
		(addr, len as libc::socklen_t)
	}

	/// Calls the provided closure with a pointer to the raw sockaddr and its
	/// length, keeping the stack-allocated structure alive for the syscall.
	pub(crate) fn with_raw<F, R>(&self, f: F) -> R
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
	{
		let (raw, len) = self.to_raw();
		let ptr = &raw as *const _ as *const libc::sockaddr;
		f(ptr, len)
	}

	/// Creates from a raw sockaddr_un returned by the kernel.
	pub(crate) fn from_raw(raw: &libc::sockaddr_un) -> Self {
		let len = raw.sun_path
			.iter()
			.position(|&c| c == 0)
			.unwrap_or(raw.sun_path.len());

		let path: Vec<u8> = raw.sun_path[..len]
			.iter()
			.map(|&c| c as u8)
			.collect();

		Self { path }
	}
}

impl std::fmt::Display for SocketPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", String::from_utf8_lossy(&self.path))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_paths_over_limit() {
		let long = vec![b'a'; MAX_PATH_LEN + 1];
		let err = SocketPath::new(&long).unwrap_err();
		assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
	}

	#[test]
	fn accepts_max_length_path() {
		let max = vec![b'a'; MAX_PATH_LEN];
		let addr = SocketPath::new(&max).unwrap();
		assert_eq!(addr.as_bytes().len(), MAX_PATH_LEN);
	}

	#[test]
	fn raw_address_has_family_and_verbatim_path() {
		let addr = SocketPath::new("/tmp/test.sock").unwrap();
		let (raw, len) = addr.to_raw();

		assert_eq!(raw.sun_family, libc::AF_UNIX as libc::sa_family_t);
		let copied: Vec<u8> = raw.sun_path[..14].iter().map(|&c| c as u8).collect();
		assert_eq!(copied, b"/tmp/test.sock");
		assert_eq!(
			len as usize,
			std::mem::size_of::<libc::sa_family_t>() + 14
		);
	}

	#[test]
	fn raw_address_is_zero_padded() {
		let addr = SocketPath::new("/a").unwrap();
		let (raw, _) = addr.to_raw();
		assert!(raw.sun_path[2..].iter().all(|&c| c == 0));
	}

	#[test]
	fn empty_path_is_allowed() {
		let addr = SocketPath::new("").unwrap();
		let (_, len) = addr.to_raw();
		assert_eq!(len as usize, std::mem::size_of::<libc::sa_family_t>());
	}

	#[test]
	fn from_raw_round_trips() {
		let addr = SocketPath::new("/run/app.sock").unwrap();
		let (raw, _) = addr.to_raw();
		assert_eq!(SocketPath::from_raw(&raw), addr);
	}
}
