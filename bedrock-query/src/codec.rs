//! Encoding and decoding of the `RakNet` unconnected ping/pong frames.
//! [Raknet: Unconnected Ping](https://wiki.vg/Raknet_Protocol#Unconnected_Ping)

use thiserror::Error;

/// Packet id of the unconnected ping sent by clients on the server list screen.
pub const UNCONNECTED_PING: u8 = 0x01;

/// Packet id of the unconnected pong the server answers with.
pub const UNCONNECTED_PONG: u8 = 0x1c;

/// Raknets default `OFFLINE_MESSAGE_DATA_ID`.
/// See more: [Raknet: Data Types](https://wiki.vg/Raknet_Protocol#Data_types)
pub const OFFLINE_MESSAGE_DATA_ID: [u8; 16] = [
    0x00, 0xff, 0xff, 0x00, 0xfe, 0xfe, 0xfe, 0xfe, 0xfd, 0xfd, 0xfd, 0xfd, 0x12, 0x34, 0x56, 0x78,
];

/// Size of an encoded unconnected ping.
pub const PING_LEN: usize = 1 + 8 + OFFLINE_MESSAGE_DATA_ID.len() + 8;

// id, ping id, server guid, magic, string length
const PONG_HEADER_LEN: usize = 1 + 8 + 8 + OFFLINE_MESSAGE_DATA_ID.len() + 2;

/// Reasons a datagram is not a usable unconnected pong.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DecodeError {
    #[error("empty datagram")]
    Empty,
    #[error("unexpected packet id {0:#04x}")]
    UnexpectedPacketId(u8),
    #[error("pong truncated: {len} bytes, header needs {}", PONG_HEADER_LEN)]
    Truncated { len: usize },
    #[error("offline message id mismatch")]
    BadMagic,
    #[error("status string claims {claimed} bytes but only {available} remain")]
    PayloadOverrun { claimed: usize, available: usize },
    #[error("status string is not valid UTF-8")]
    InvalidUtf8,
}

/// An outbound unconnected ping.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DiscoveryRequest {
    /// Correlation value, written in the slot servers echo back.
    ///
    /// Replies are not checked against it.
    pub ping_id: u64,
    /// The guid this client claims.
    pub client_guid: u64,
}

impl DiscoveryRequest {
    /// Creates a request with random ping id and client guid.
    #[must_use]
    pub fn random() -> Self {
        Self {
            ping_id: rand::random(),
            client_guid: rand::random(),
        }
    }

    /// Serializes the ping: `id | ping id | magic | client guid`.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PING_LEN);
        buf.push(UNCONNECTED_PING);
        buf.extend_from_slice(&self.ping_id.to_be_bytes());
        buf.extend_from_slice(&OFFLINE_MESSAGE_DATA_ID);
        buf.extend_from_slice(&self.client_guid.to_be_bytes());
        buf
    }
}

/// A decoded unconnected pong.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DiscoveryReply {
    /// The ping id echoed by the server.
    pub ping_id: u64,
    /// The server's random guid.
    pub server_id: u64,
    /// The semicolon-delimited status string.
    pub payload: String,
}

impl DiscoveryReply {
    /// Decodes a received datagram.
    ///
    /// # Errors
    /// Returns a [`DecodeError`] if the datagram is not an unconnected pong or
    /// is cut short.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (&id, rest) = bytes.split_first().ok_or(DecodeError::Empty)?;
        if id != UNCONNECTED_PONG {
            return Err(DecodeError::UnexpectedPacketId(id));
        }
        if bytes.len() < PONG_HEADER_LEN {
            return Err(DecodeError::Truncated { len: bytes.len() });
        }

        let (ping_id, rest) = read_u64(rest);
        let (server_id, rest) = read_u64(rest);
        let (magic, rest) = rest.split_at(OFFLINE_MESSAGE_DATA_ID.len());
        if magic != OFFLINE_MESSAGE_DATA_ID {
            return Err(DecodeError::BadMagic);
        }
        let (len, rest) = rest.split_at(2);
        let claimed = usize::from(u16::from_be_bytes([len[0], len[1]]));
        let payload = rest.get(..claimed).ok_or(DecodeError::PayloadOverrun {
            claimed,
            available: rest.len(),
        })?;
        let payload = std::str::from_utf8(payload)
            .map_err(|_| DecodeError::InvalidUtf8)?
            .to_owned();

        Ok(Self {
            ping_id,
            server_id,
            payload,
        })
    }

    /// Serializes the pong. Only servers send these; used to fake one in tests.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let payload = self.payload.as_bytes();
        let len = u16::try_from(payload.len()).unwrap_or(u16::MAX);
        let mut buf = Vec::with_capacity(PONG_HEADER_LEN + usize::from(len));
        buf.push(UNCONNECTED_PONG);
        buf.extend_from_slice(&self.ping_id.to_be_bytes());
        buf.extend_from_slice(&self.server_id.to_be_bytes());
        buf.extend_from_slice(&OFFLINE_MESSAGE_DATA_ID);
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(&payload[..usize::from(len)]);
        buf
    }
}

// Callers check the length first.
fn read_u64(bytes: &[u8]) -> (u64, &[u8]) {
    let (head, rest) = bytes.split_at(8);
    let mut raw = [0; 8];
    raw.copy_from_slice(head);
    (u64::from_be_bytes(raw), rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pong(payload: &str) -> Vec<u8> {
        DiscoveryReply {
            ping_id: 7,
            server_id: 0xdead_beef,
            payload: payload.to_string(),
        }
        .encode()
    }

    #[test]
    fn ping_layout() {
        let request = DiscoveryRequest {
            ping_id: 0x0102_0304_0506_0708,
            client_guid: 0x1112_1314_1516_1718,
        };
        let bytes = request.encode();
        assert_eq!(bytes.len(), PING_LEN);
        assert_eq!(bytes[0], UNCONNECTED_PING);
        assert_eq!(&bytes[1..9], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[9..25], &OFFLINE_MESSAGE_DATA_ID);
        assert_eq!(&bytes[25..], &[0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18]);
    }

    #[test]
    fn random_requests_differ() {
        assert_ne!(DiscoveryRequest::random(), DiscoveryRequest::random());
    }

    #[test]
    fn decode_pong() {
        let reply = DiscoveryReply::decode(&pong("MCPE;Test")).unwrap();
        assert_eq!(reply.ping_id, 7);
        assert_eq!(reply.server_id, 0xdead_beef);
        assert_eq!(reply.payload, "MCPE;Test");
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let mut bytes = pong("MCPE");
        bytes.extend_from_slice(b"junk");
        assert_eq!(DiscoveryReply::decode(&bytes).unwrap().payload, "MCPE");
    }

    #[test]
    fn reject_wrong_packet_id() {
        let mut bytes = pong("MCPE");
        bytes[0] = UNCONNECTED_PING;
        assert_eq!(
            DiscoveryReply::decode(&bytes),
            Err(DecodeError::UnexpectedPacketId(UNCONNECTED_PING))
        );
    }

    #[test]
    fn reject_empty() {
        assert_eq!(DiscoveryReply::decode(&[]), Err(DecodeError::Empty));
    }

    #[test]
    fn reject_truncated_header() {
        let bytes = pong("MCPE");
        assert_eq!(
            DiscoveryReply::decode(&bytes[..20]),
            Err(DecodeError::Truncated { len: 20 })
        );
        assert_eq!(
            DiscoveryReply::decode(&[UNCONNECTED_PONG]),
            Err(DecodeError::Truncated { len: 1 })
        );
    }

    #[test]
    fn reject_bad_magic() {
        let mut bytes = pong("MCPE");
        bytes[17] ^= 0xff;
        assert_eq!(DiscoveryReply::decode(&bytes), Err(DecodeError::BadMagic));
    }

    #[test]
    fn reject_payload_overrun() {
        let bytes = pong("MCPE;Test");
        assert_eq!(
            DiscoveryReply::decode(&bytes[..bytes.len() - 2]),
            Err(DecodeError::PayloadOverrun {
                claimed: 9,
                available: 7
            })
        );
    }

    #[test]
    fn reject_invalid_utf8() {
        let mut bytes = pong("ab");
        let len = bytes.len();
        bytes[len - 1] = 0xff;
        assert_eq!(DiscoveryReply::decode(&bytes), Err(DecodeError::InvalidUtf8));
    }
}
