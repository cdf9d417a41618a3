use std::time::Duration;

use bedrock_query::{DEFAULT_PORT, Query, StatusRecord};

use crate::{
    Failure,
    structures::{BedrockPingResponse, PingParams},
};

/// How long a request may wait on a server, including DNS.
const DEADLINE: Duration = Duration::from_secs(12);

pub async fn ping_bedrock(
    address: &str,
    params: PingParams,
) -> Result<BedrockPingResponse, Failure> {
    ping_bedrock_within(address, params, DEADLINE).await
}

/// Queries the server, reporting it offline if `deadline` passes first.
async fn ping_bedrock_within(
    address: &str,
    params: PingParams,
    deadline: Duration,
) -> Result<BedrockPingResponse, Failure> {
    let (host, port) = split_address(address)?;
    let query = Query {
        address: host.to_string(),
        port,
        family: params.family.into(),
        ..Default::default()
    };
    let sleep_future = tokio::time::sleep(deadline);
    #[allow(clippy::redundant_pub_crate)]
    let status = tokio::select! {
        status = query.run_async() => status,
        () = sleep_future => {
            debug!(host, port, ?deadline, "deadline passed before the server answered");
            StatusRecord::placeholder()
        }
    };
    debug!(host, port, online = status.is_online(), "pinged bedrock server");
    Ok(BedrockPingResponse {
        address: host.to_string(),
        port,
        status,
    })
}

/// Splits `host[:port]`. Bare IPv6 literals have to be bracketed to carry a
/// port.
pub fn split_address(address: &str) -> Result<(&str, u16), Failure> {
    if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or(Failure::InvalidAddress)?;
        return match tail.strip_prefix(':') {
            Some(port) => Ok((host, port.parse().map_err(|_| Failure::InvalidAddress)?)),
            None if tail.is_empty() => Ok((host, DEFAULT_PORT)),
            None => Err(Failure::InvalidAddress),
        };
    }
    match address.split_once(':') {
        Some((host, port)) if !port.contains(':') => {
            Ok((host, port.parse().map_err(|_| Failure::InvalidAddress)?))
        }
        // no port, or an unbracketed IPv6 literal
        _ => Ok((address, DEFAULT_PORT)),
    }
}
