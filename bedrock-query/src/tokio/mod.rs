//! Async queries on top of the tokio runtime.

use std::{
    io,
    net::SocketAddr,
    sync::OnceLock,
    time::Duration,
};

use ::tokio::{net::UdpSocket, time::timeout};
use hickory_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
};

use crate::{
    DiscoveryRequest, Endpoint, Error, IpFamily, MAX_DATAGRAM, Query, StatusRecord,
    endpoint::parse_literal, status_from_datagram, transport::connect_socket,
};

/// The async counterpart of [`crate::Transport`].
///
/// The timeout is applied per receive rather than on the socket.
#[derive(Debug)]
pub struct AsyncTransport {
    socket: UdpSocket,
    endpoint: Endpoint,
    timeout: Duration,
}

impl AsyncTransport {
    /// Opens a socket associated with `endpoint`.
    ///
    /// # Errors
    /// [`Error::TransportSetup`] if the timeout is zero, or the socket cannot
    /// be created or registered with the runtime.
    pub fn open(endpoint: Endpoint, timeout: Duration) -> Result<Self, Error> {
        // same rule the blocking socket's read timeout enforces
        if timeout.is_zero() {
            return Err(Error::TransportSetup(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot set a 0 duration timeout",
            )));
        }
        let socket = connect_socket(endpoint, None)
            .and_then(|socket| {
                socket.set_nonblocking(true)?;
                UdpSocket::from_std(socket)
            })
            .map_err(Error::TransportSetup)?;
        trace!(%endpoint, ?timeout, "opened async transport");
        Ok(Self {
            socket,
            endpoint,
            timeout,
        })
    }

    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Sends one datagram to the endpoint.
    ///
    /// # Errors
    /// [`Error::TransportIo`] if the send fails.
    pub async fn send(&self, bytes: &[u8]) -> Result<usize, Error> {
        self.socket.send(bytes).await.map_err(Error::TransportIo)
    }

    /// Waits up to the timeout for one datagram of at most `max_size` bytes.
    ///
    /// A timeout or an empty datagram is `Ok(None)`.
    ///
    /// # Errors
    /// [`Error::TransportIo`] for any other socket error.
    pub async fn receive(&self, max_size: usize) -> Result<Option<Vec<u8>>, Error> {
        let mut buf = vec![0; max_size];
        match timeout(self.timeout, self.socket.recv(&mut buf)).await {
            Err(_) | Ok(Ok(0)) => Ok(None),
            Ok(Ok(len)) => {
                buf.truncate(len);
                Ok(Some(buf))
            }
            Ok(Err(e)) => Err(Error::TransportIo(e)),
        }
    }

    /// Releases the socket.
    pub fn close(self) {
        trace!(endpoint = %self.endpoint, "closed async transport");
    }
}

impl Query {
    /// Runs the query without blocking the runtime, returning the placeholder
    /// record on any failure.
    pub async fn run_async(&self) -> StatusRecord {
        match self.try_run_async().await {
            Ok(status) => status,
            Err(error) => self.offline(&error),
        }
    }

    /// Runs the query without blocking the runtime, keeping the failure
    /// reason. Hostnames are resolved through [`resolver`].
    ///
    /// # Errors
    /// See [`Query::try_run`].
    pub async fn try_run_async(&self) -> Result<StatusRecord, Error> {
        let endpoint = resolve(&self.address, self.port, self.family).await?;
        let transport = AsyncTransport::open(endpoint, self.timeout)?;

        let request = DiscoveryRequest::random();
        transport.send(&request.encode()).await?;
        let datagram = transport
            .receive(MAX_DATAGRAM)
            .await?
            .ok_or(Error::Timeout)?;
        transport.close();

        Ok(status_from_datagram(&datagram)?)
    }
}

/// Retrieve the status of a Bedrock server.
///
/// # Examples
///
/// ```no_run
/// # async {
/// let status = bedrock_query::tokio::query("play.nethergames.org", 19132).await;
/// println!("{}", status.message_of_the_day());
/// # };
/// ```
pub async fn query(address: &str, port: u16) -> StatusRecord {
    Query::new(address, port).run_async().await
}

async fn resolve(address: &str, port: u16, family: IpFamily) -> Result<Endpoint, Error> {
    if let Some(ip) = parse_literal(address) {
        return Endpoint::from_literal(ip, port, family);
    }
    let lookup = resolver()
        .lookup_ip(address)
        .await
        .map_err(|_| Error::DnsLookupFailed)?;
    let ip = lookup
        .iter()
        .find(|ip| family.matches(ip))
        .ok_or(Error::DnsLookupFailed)?;
    Ok(Endpoint::new(SocketAddr::new(ip, port)))
}

fn new_resolver() -> TokioAsyncResolver {
    let config = ResolverConfig::cloudflare();
    let mut opts = ResolverOpts::default();
    opts.cache_size = 64;
    opts.attempts = 3;
    TokioAsyncResolver::tokio(config, opts)
}

/// The process-wide resolver used for hostnames.
pub fn resolver() -> &'static TokioAsyncResolver {
    static RESOLVER: OnceLock<TokioAsyncResolver> = OnceLock::new();
    RESOLVER.get_or_init(new_resolver)
}
