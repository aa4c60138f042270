pub mod socket;
mod addr;
mod error;

pub use self::error::{IoError, SocketError, errno};
pub use self::addr::{MAX_PATH_LEN, SocketPath};
pub use self::socket::{SockType, Stream, Datagram, Shutdown,
					   RawSocket, BoundSocket, Listener, ConnectedStream,
					   BoundDatagram, ConnectedDatagram};
