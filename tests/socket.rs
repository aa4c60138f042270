use std::io::ErrorKind;
use std::thread;

use localsock::{BoundDatagram, ConnectedDatagram, ConnectedStream, Listener,
				MAX_PATH_LEN, Shutdown, SocketPath};

/// Per-test socket path under /tmp, unique per process.
fn sock_path(name: &str) -> String {
	format!("/tmp/localsock-{}-{}.sock", std::process::id(), name)
}

/// Removes the socket node when the test finishes.
struct Unlink(String);

impl Drop for Unlink {
	fn drop(&mut self) {
		let _ = std::fs::remove_file(&self.0);
	}
}

/// Reads until EOF, returning everything received.
fn read_to_end(conn: &ConnectedStream) -> Vec<u8> {
	let mut out = Vec::new();
	let mut buf = [0u8; 4096];
	loop {
		let n = conn.read(&mut buf).unwrap();
		if n == 0 {
			break;
		}
		out.extend_from_slice(&buf[..n]);
	}
	out
}

/// Loops over short writes until the whole payload is delivered.
fn write_all(conn: &ConnectedStream, mut buf: &[u8]) {
	while !buf.is_empty() {
		let n = conn.write(buf).unwrap();
		buf = &buf[n..];
	}
}

#[test]
fn too_long_path_fails_and_creates_nothing() {
	let long: String = std::iter::repeat('a').take(MAX_PATH_LEN + 1).collect();
	let path = format!("/tmp/{}", long);

	let err = Listener::bind(&path, 8).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidInput);

	let err = ConnectedStream::connect(&path).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidInput);

	let err = BoundDatagram::bind(&path).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidInput);

	// The precondition fired before any syscall, so no socket node exists.
	assert!(std::fs::metadata(&path).is_err());
}

#[test]
fn max_length_path_is_usable() {
	let mut path = sock_path("max");
	path.truncate(path.len() - 5);
	while path.len() < MAX_PATH_LEN {
		path.push('x');
	}
	let _cleanup = Unlink(path.clone());

	let listener = Listener::bind(&path, 1).unwrap();
	assert_eq!(listener.local_addr().unwrap().as_bytes(), path.as_bytes());
}

#[test]
fn connect_to_missing_path_fails() {
	let err = ConnectedStream::connect(sock_path("missing")).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn bind_twice_fails_with_addr_in_use() {
	let path = sock_path("twice");
	let _cleanup = Unlink(path.clone());

	let _listener = Listener::bind(&path, 8).unwrap();
	let err = Listener::bind(&path, 8).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::AddrInUse);
}

#[test]
fn stream_round_trip_in_both_directions() {
	let path = sock_path("roundtrip");
	let _cleanup = Unlink(path.clone());

	let listener = Listener::bind(&path, 8).unwrap();

	let client_path = path.clone();
	let client = thread::spawn(move || {
		let conn = ConnectedStream::connect(&client_path).unwrap();
		write_all(&conn, b"hello");
		conn.shutdown(Shutdown::Write).unwrap();

		let reply = read_to_end(&conn);
		assert_eq!(reply, b"world");
		conn.close().unwrap();
	});

	let conn = listener.accept().unwrap();
	assert_eq!(read_to_end(&conn), b"hello");
	write_all(&conn, b"world");
	conn.close().unwrap();

	client.join().unwrap();
}

#[test]
fn eof_only_after_writer_fully_closes() {
	let path = sock_path("eof");
	let _cleanup = Unlink(path.clone());

	let listener = Listener::bind(&path, 8).unwrap();

	let payload: Vec<u8> = (0..65536u32).map(|i| (i % 251) as u8).collect();
	let expected = payload.clone();

	let client_path = path.clone();
	let client = thread::spawn(move || {
		let conn = ConnectedStream::connect(&client_path).unwrap();
		write_all(&conn, &payload);
		conn.close().unwrap();
	});

	let conn = listener.accept().unwrap();
	let received = read_to_end(&conn);

	// Exactly N bytes before the first 0, bit-identical, in order.
	assert_eq!(received.len(), expected.len());
	assert_eq!(received, expected);

	client.join().unwrap();
}

#[test]
fn single_byte_and_empty_writes() {
	let path = sock_path("tiny");
	let _cleanup = Unlink(path.clone());

	let listener = Listener::bind(&path, 1).unwrap();

	let client_path = path.clone();
	let client = thread::spawn(move || {
		let conn = ConnectedStream::connect(&client_path).unwrap();
		assert_eq!(conn.write(&[]).unwrap(), 0);
		assert_eq!(conn.write(&[0x2a]).unwrap(), 1);
		conn.close().unwrap();
	});

	let conn = listener.accept().unwrap();
	assert_eq!(read_to_end(&conn), [0x2a]);

	client.join().unwrap();
}

#[test]
fn write_half_close_leaves_read_open() {
	let path = sock_path("halfwrite");
	let _cleanup = Unlink(path.clone());

	let listener = Listener::bind(&path, 8).unwrap();

	let client_path = path.clone();
	let client = thread::spawn(move || {
		let conn = ConnectedStream::connect(&client_path).unwrap();

		// Close our write side; the peer sees EOF but can still send to us.
		conn.shutdown(Shutdown::Write).unwrap();
		assert_eq!(read_to_end(&conn), b"bye");
	});

	let conn = listener.accept().unwrap();
	let mut buf = [0u8; 16];
	assert_eq!(conn.read(&mut buf).unwrap(), 0);
	write_all(&conn, b"bye");
	conn.close().unwrap();

	client.join().unwrap();
}

#[test]
fn read_half_close_leaves_write_open() {
	let path = sock_path("halfread");
	let _cleanup = Unlink(path.clone());

	let listener = Listener::bind(&path, 8).unwrap();

	let client_path = path.clone();
	let client = thread::spawn(move || {
		let conn = ConnectedStream::connect(&client_path).unwrap();
		assert_eq!(read_to_end(&conn), b"still writable");
	});

	let conn = listener.accept().unwrap();
	conn.shutdown(Shutdown::Read).unwrap();

	// Our read direction is gone...
	let mut buf = [0u8; 16];
	assert_eq!(conn.read(&mut buf).unwrap(), 0);

	// ...but the write direction is untouched.
	write_all(&conn, b"still writable");
	conn.close().unwrap();

	client.join().unwrap();
}

#[test]
fn write_after_own_write_shutdown_fails() {
	let path = sock_path("wrshut");
	let _cleanup = Unlink(path.clone());

	let listener = Listener::bind(&path, 1).unwrap();

	let client_path = path.clone();
	let client = thread::spawn(move || {
		let conn = ConnectedStream::connect(&client_path).unwrap();
		conn.shutdown(Shutdown::Write).unwrap();
		conn.write(b"late").unwrap_err();
	});

	let conn = listener.accept().unwrap();
	let mut buf = [0u8; 16];
	assert_eq!(conn.read(&mut buf).unwrap(), 0);

	client.join().unwrap();
}

#[test]
fn datagram_receives_without_accept() {
	let path = sock_path("dgram");
	let _cleanup = Unlink(path.clone());

	// Bound and immediately usable: no listen, no accept.
	let server = BoundDatagram::bind(&path).unwrap();

	let client = ConnectedDatagram::connect(&path).unwrap();
	assert_eq!(client.send(b"ping").unwrap(), 4);
	assert_eq!(client.send(b"pong!").unwrap(), 5);

	// Message boundaries hold even with a large receive buffer.
	let mut buf = [0u8; 1024];
	assert_eq!(server.recv(&mut buf).unwrap(), 4);
	assert_eq!(&buf[..4], b"ping");
	assert_eq!(server.recv(&mut buf).unwrap(), 5);
	assert_eq!(&buf[..5], b"pong!");

	client.close().unwrap();
	server.close().unwrap();
}

#[test]
fn datagram_recv_from_names_a_bound_sender() {
	let a_path = sock_path("dgram-a");
	let b_path = sock_path("dgram-b");
	let _cleanup_a = Unlink(a_path.clone());
	let _cleanup_b = Unlink(b_path.clone());

	let a = BoundDatagram::bind(&a_path).unwrap();
	let b = BoundDatagram::bind(&b_path).unwrap();

	let dest = SocketPath::new(b_path.as_bytes()).unwrap();
	assert_eq!(a.send_to(b"hi", &dest).unwrap(), 2);

	let mut buf = [0u8; 16];
	let (n, from) = b.recv_from(&mut buf).unwrap();
	assert_eq!(n, 2);
	assert_eq!(from.as_bytes(), a_path.as_bytes());

	// And the named sender is reachable for the reply.
	assert_eq!(b.send_to(b"yo", &from).unwrap(), 2);
	assert_eq!(a.recv(&mut buf).unwrap(), 2);
	assert_eq!(&buf[..2], b"yo");
}

#[test]
fn listener_reports_bound_path() {
	let path = sock_path("addr");
	let _cleanup = Unlink(path.clone());

	let listener = Listener::bind(&path, 4).unwrap();
	assert_eq!(listener.local_addr().unwrap().as_bytes(), path.as_bytes());
}
