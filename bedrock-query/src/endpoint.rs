use std::{
    fmt,
    net::{IpAddr, SocketAddr, ToSocketAddrs},
};

use crate::Error;

/// The IP family a query is pinned to.
///
/// The families are never mixed: checking a server on both requires two
/// queries.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum IpFamily {
    #[default]
    V4,
    V6,
}

impl IpFamily {
    /// Whether `ip` belongs to this family.
    #[must_use]
    pub const fn matches(self, ip: &IpAddr) -> bool {
        matches!((self, ip), (Self::V4, IpAddr::V4(_)) | (Self::V6, IpAddr::V6(_)))
    }
}

/// A resolved server address.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Endpoint {
    addr: SocketAddr,
}

impl Endpoint {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Resolves `address` with the system resolver, keeping the first address
    /// of `family`.
    ///
    /// # Errors
    /// [`Error::InvalidAddress`] if `address` is an IP literal of the other
    /// family, [`Error::DnsLookupFailed`] if the host does not resolve to an
    /// address of `family`.
    pub fn resolve(address: &str, port: u16, family: IpFamily) -> Result<Self, Error> {
        if let Some(ip) = parse_literal(address) {
            return Self::from_literal(ip, port, family);
        }

        let addr = (address, port)
            .to_socket_addrs()
            .map_err(|_| Error::DnsLookupFailed)?
            .find(|addr| family.matches(&addr.ip()))
            .ok_or(Error::DnsLookupFailed)?;
        Ok(Self::new(addr))
    }

    pub(crate) fn from_literal(ip: IpAddr, port: u16, family: IpFamily) -> Result<Self, Error> {
        if family.matches(&ip) {
            Ok(Self::new(SocketAddr::new(ip, port)))
        } else {
            Err(Error::InvalidAddress)
        }
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.addr.ip()
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.addr.port()
    }

    #[must_use]
    pub const fn family(&self) -> IpFamily {
        match self.addr {
            SocketAddr::V4(_) => IpFamily::V4,
            SocketAddr::V6(_) => IpFamily::V6,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.addr, f)
    }
}

/// Parses an IP literal, accepting bracketed IPv6 (`[::1]`).
pub(crate) fn parse_literal(address: &str) -> Option<IpAddr> {
    let trimmed = address
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(address);
    trimmed.parse().ok()
}
