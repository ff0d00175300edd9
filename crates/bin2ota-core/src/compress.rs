use crate::lzss;

/// Pre-processes a firmware image before it is framed.
///
/// The container encoder never calls this itself, it only records whether a
/// compressor ran through the version flag.
pub trait Compressor {
    fn compress(&self, raw: &[u8]) -> Vec<u8>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Lzss;

impl Compressor for Lzss {
    fn compress(&self, raw: &[u8]) -> Vec<u8> {
        lzss::encode(raw)
    }

    fn name(&self) -> &'static str {
        "lzss"
    }
}

/// Runs `compressor` over `raw` if there is one.
///
/// Returns the payload together with the `compressed` flag to encode it with.
pub fn prepare_payload(raw: Vec<u8>, compressor: Option<&dyn Compressor>) -> (Vec<u8>, bool) {
    match compressor {
        Some(compressor) => (compressor.compress(&raw), true),
        None => (raw, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{boards::UNOR4WIFI, ota};

    #[test]
    fn without_compressor_payload_is_untouched() {
        let (payload, compressed) = prepare_payload(b"raw image".to_vec(), None);
        assert_eq!(payload, b"raw image");
        assert!(!compressed);
    }

    #[test]
    fn compressed_container_sets_flag() {
        let raw = vec![0xff; 1024];
        let (payload, compressed) = prepare_payload(raw.clone(), Some(&Lzss));
        let container = ota::encode_for(&UNOR4WIFI, &payload, compressed).unwrap();

        assert_eq!(container[ota::HEADER_LEN - 1], ota::COMPRESSION_FLAG);
        assert_eq!(lzss::decode(&container[ota::HEADER_LEN..]), raw);
    }
}
