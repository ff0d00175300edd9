//! Text encodings of a finished container for the cloud side.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Bytes the server sends per chunk so the device receive buffers are not overrun
pub const CHUNK_SIZE: u32 = 256;

/// Milliseconds between two consecutive chunks
pub const INTER_CHUNK_DELAY_MS: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportPayload {
    /// base64 of the whole container
    pub binary: String,
    pub chunk_size: u32,
    pub delay: u32,
}

impl TransportPayload {
    pub fn new(container: &[u8], chunk_size: u32, delay: u32) -> Self {
        Self {
            binary: to_base64(container),
            chunk_size,
            delay,
        }
    }
}

pub fn to_base64(container: &[u8]) -> String {
    STANDARD.encode(container)
}

pub fn to_json(container: &[u8], chunk_size: u32, delay: u32) -> serde_json::Result<String> {
    serde_json::to_string(&TransportPayload::new(container, chunk_size, delay))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_is_padded_standard_alphabet() {
        assert_eq!(to_base64(&[0xfb, 0xff]), "+/8=");
        assert_eq!(to_base64(&[]), "");
    }

    #[test]
    fn json_layout() {
        let json = to_json(&[0x10, 0x00, 0x00, 0x00], CHUNK_SIZE, INTER_CHUNK_DELAY_MS).unwrap();
        assert_eq!(
            json,
            r#"{"binary":"EAAAAA==","chunk_size":256,"delay":500}"#
        );
    }

    #[test]
    fn json_reads_back() {
        let json = to_json(b"ota", 128, 20).unwrap();
        let payload: TransportPayload = serde_json::from_str(&json).unwrap();

        assert_eq!(payload, TransportPayload::new(b"ota", 128, 20));
        assert_eq!(STANDARD.decode(payload.binary).unwrap(), b"ota");
    }
}
