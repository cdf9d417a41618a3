#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
//! `bedrock-query` asks a Minecraft Bedrock server for its status with a
//! single `RakNet` unconnected ping, and decodes the pong into a
//! [`StatusRecord`]: MOTD, player counts, versions and server software.
//!
//! Queries never fail. An unreachable host, a timeout or a garbled reply all
//! produce [`StatusRecord::placeholder`], so many servers can be polled
//! without handling an error per server. [`Query::try_run`] exposes the
//! underlying [`Error`] for callers that want the reason.
//!
//! The main API surface is [`query`], with an async twin in [`tokio`].

#[macro_use]
extern crate tracing;

pub mod tokio;

mod codec;
mod endpoint;
mod status;
mod transport;

use std::{io, time::Duration};

pub use codec::{
    DecodeError, DiscoveryReply, DiscoveryRequest, OFFLINE_MESSAGE_DATA_ID, UNCONNECTED_PING,
    UNCONNECTED_PONG,
};
pub use endpoint::{Endpoint, IpFamily};
pub use status::{StatusRecord, split_status};
pub use transport::{MAX_DATAGRAM, Transport};

/// The default port of a Bedrock server.
pub const DEFAULT_PORT: u16 = 19132;

/// How long to wait for the pong.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reasons a query produced no status. [`query`] folds all of them into the
/// placeholder record.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to set up the UDP socket: {0}")]
    TransportSetup(#[source] io::Error),
    #[error("an I/O error occurred: {0}")]
    TransportIo(#[source] io::Error),
    #[error("no reply before the timeout")]
    Timeout,
    #[error("invalid pong: {0}")]
    ProtocolDecode(#[from] DecodeError),
    #[error("an invalid address was provided")]
    InvalidAddress,
    #[error("DNS lookup for the host provided failed")]
    DnsLookupFailed,
}

/// Configuration for querying a Bedrock server.
///
/// # Examples
///
/// ```
/// use bedrock_query::{IpFamily, Query};
/// use std::time::Duration;
///
/// let query = Query {
///     address: "play.nethergames.org".to_string(),
///     family: IpFamily::V6,
///     timeout: Duration::from_secs(3),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Query {
    /// The server's IP or hostname, without a port.
    pub address: String,
    pub port: u16,
    /// The family the address is resolved to. Only this family is tried.
    pub family: IpFamily,
    /// The read timeout for the pong.
    pub timeout: Duration,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: DEFAULT_PORT,
            family: IpFamily::V4,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Query {
    /// An IPv4 query with the default timeout.
    #[must_use]
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            ..Default::default()
        }
    }

    /// Runs the query, returning the placeholder record on any failure.
    #[must_use]
    pub fn run(&self) -> StatusRecord {
        self.try_run().unwrap_or_else(|error| self.offline(&error))
    }

    /// Runs the query, keeping the failure reason.
    ///
    /// # Errors
    /// If the address does not resolve, the socket fails, no pong arrives
    /// within the timeout, or the reply is not a valid pong.
    pub fn try_run(&self) -> Result<StatusRecord, Error> {
        let endpoint = Endpoint::resolve(&self.address, self.port, self.family)?;
        let transport = Transport::open(endpoint, self.timeout)?;

        let request = DiscoveryRequest::random();
        transport.send(&request.encode())?;
        let datagram = transport.receive(MAX_DATAGRAM)?.ok_or(Error::Timeout)?;
        transport.close();

        Ok(status_from_datagram(&datagram)?)
    }

    fn offline(&self, error: &Error) -> StatusRecord {
        debug!(address = %self.address, port = self.port, %error, "server is offline");
        StatusRecord::placeholder()
    }
}

fn status_from_datagram(datagram: &[u8]) -> Result<StatusRecord, DecodeError> {
    let reply = DiscoveryReply::decode(datagram)?;
    trace!(
        ping_id = reply.ping_id,
        server_id = reply.server_id,
        payload = %reply.payload,
        "got pong"
    );
    Ok(StatusRecord::parse(&reply.payload))
}

/// Retrieve the status of a Bedrock server, blocking for up to
/// [`DEFAULT_TIMEOUT`].
///
/// # Examples
///
/// ```no_run
/// let status = bedrock_query::query("play.nethergames.org", bedrock_query::DEFAULT_PORT);
/// if status.is_online() {
///     println!("{} players online", status.player_count());
/// }
/// ```
#[must_use]
pub fn query(address: &str, port: u16) -> StatusRecord {
    Query::new(address, port).run()
}
