mod bound;
mod datagram;
mod listener;
mod raw;
mod stream;

pub use self::bound::BoundSocket;
pub use self::datagram::{BoundDatagram, ConnectedDatagram};
pub use self::listener::Listener;
pub use self::raw::RawSocket;
pub use self::stream::{ConnectedStream, Shutdown};

/// Trait for socket type markers.
///
/// Each type implementing this trait represents a socket type
/// that can be passed to the `socket()` syscall.
///
/// - `Stream` — connection-oriented, ordered byte stream
/// - `Datagram` — connectionless, message-oriented
pub trait SockType {
	/// Returns the libc constant for this socket type.
	fn raw() -> libc::c_int;
}

/// Stream socket marker.
///
/// Connection-oriented: a listener queues peers until `accept()`.
/// Bytes arrive in order with no message boundaries.
pub struct Stream;

/// Datagram socket marker.
///
/// Connectionless: a bound socket receives immediately, no accept step.
/// Each send is one message with preserved boundaries.
pub struct Datagram;

impl SockType for Stream {
	#[inline]
	fn raw() -> libc::c_int {
		libc::SOCK_STREAM
	}
}

impl SockType for Datagram {
	#[inline]
	fn raw() -> libc::c_int {
		libc::SOCK_DGRAM
	}
}
