use std::{fs, path::Path};

use bin2ota_core::{
    boards::BoardProfile,
    compress::{prepare_payload, Compressor},
    ota::encode_for,
};
use log::info;

use crate::output::write_output;

/// How the version flag of the container is decided
#[derive(Clone, Copy)]
pub enum Compression<'a> {
    /// The input was already compressed
    Precompressed,
    /// The input is a raw image
    None,
    /// Compress the input before framing it
    With(&'a dyn Compressor),
}

pub fn encode<P1: AsRef<Path>, P2: AsRef<Path>>(
    input_path: &P1,
    output_path: &P2,
    board: &BoardProfile,
    compression: Compression<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = fs::read(input_path.as_ref())?;

    info!("Using board {}", board);

    let (payload, compressed) = match compression {
        Compression::Precompressed => (raw, true),
        Compression::None => prepare_payload(raw, None),
        Compression::With(compressor) => {
            let raw_len = raw.len();
            let (payload, compressed) = prepare_payload(raw, Some(compressor));
            info!(
                "Compressed with {}: {} -> {} bytes",
                compressor.name(),
                raw_len,
                payload.len()
            );
            (payload, compressed)
        }
    };

    let container = encode_for(board, &payload, compressed)?;

    info!("Writing {} byte OTA container", container.len());
    write_output(output_path.as_ref(), &container)
}
