//! The UDP association used for one query.

use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket},
    time::Duration,
};

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::{Endpoint, Error, IpFamily};

/// Upper bound of a UDP payload.
pub const MAX_DATAGRAM: usize = 65535;

/// Creates a UDP socket of the endpoint's family and connects it to the
/// endpoint, so the kernel drops datagrams from other sources.
///
/// IPv6 sockets refuse v4-mapped addresses.
pub(crate) fn connect_socket(endpoint: Endpoint, read_timeout: Option<Duration>) -> io::Result<UdpSocket> {
    let bind: SocketAddr = match endpoint.family() {
        IpFamily::V4 => (Ipv4Addr::UNSPECIFIED, 0).into(),
        IpFamily::V6 => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = Socket::new(Domain::for_address(bind), Type::DGRAM, Some(Protocol::UDP))?;
    if endpoint.family() == IpFamily::V6 {
        socket.set_only_v6(true)?;
    }
    socket.bind(&SockAddr::from(bind))?;
    socket.connect(&SockAddr::from(endpoint.addr()))?;
    let socket = UdpSocket::from(socket);
    // std refuses a zero timeout instead of treating it as "block forever"
    socket.set_read_timeout(read_timeout)?;
    Ok(socket)
}

/// Whether a receive error just means nothing arrived in time.
pub(crate) fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// A blocking UDP association with one server.
///
/// The socket is released when the transport is dropped.
#[derive(Debug)]
pub struct Transport {
    socket: UdpSocket,
    endpoint: Endpoint,
}

impl Transport {
    /// Opens a socket associated with `endpoint`, with reads bounded by
    /// `timeout`.
    ///
    /// # Errors
    /// [`Error::TransportSetup`] if the socket cannot be created, bound,
    /// connected or configured.
    pub fn open(endpoint: Endpoint, timeout: Duration) -> Result<Self, Error> {
        let socket = connect_socket(endpoint, Some(timeout)).map_err(Error::TransportSetup)?;
        trace!(%endpoint, ?timeout, "opened transport");
        Ok(Self { socket, endpoint })
    }

    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Sends one datagram to the endpoint.
    ///
    /// # Errors
    /// [`Error::TransportIo`] if the send fails.
    pub fn send(&self, bytes: &[u8]) -> Result<usize, Error> {
        self.socket.send(bytes).map_err(Error::TransportIo)
    }

    /// Waits for one datagram of at most `max_size` bytes.
    ///
    /// A timeout or an empty datagram is `Ok(None)`.
    ///
    /// # Errors
    /// [`Error::TransportIo`] for any other socket error.
    pub fn receive(&self, max_size: usize) -> Result<Option<Vec<u8>>, Error> {
        let mut buf = vec![0; max_size];
        match self.socket.recv(&mut buf) {
            Ok(0) => Ok(None),
            Ok(len) => {
                buf.truncate(len);
                Ok(Some(buf))
            }
            Err(e) if is_timeout(&e) => Ok(None),
            Err(e) => Err(Error::TransportIo(e)),
        }
    }

    /// Releases the socket.
    pub fn close(self) {
        trace!(endpoint = %self.endpoint, "closed transport");
    }
}
