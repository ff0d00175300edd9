use std::io::{Read, Write};

use log::*;
use thiserror::Error;

use crate::boards::BoardProfile;

pub mod boards;
pub mod compress;
pub mod lzss;
pub mod ota;
pub mod transport;

#[derive(Error, Debug)]
pub enum Bin2OtaError {
    #[error("{name} is not a supported board type, expected one of: {supported}")]
    UnknownBoard { name: String, supported: String },
    #[error("Payload of {0} bytes does not fit in an OTA container")]
    PayloadTooLarge(usize),
    #[error("Failed to read input")]
    FailedToRead(std::io::Error),
    #[error("Failed to write to output")]
    FailedToWrite(std::io::Error),
}

/// Builds the OTA container for `payload` targeting the board called `board_name`.
///
/// `compressed` only selects the version flag, the payload is taken as is.
pub fn encode(
    board_name: &str,
    payload: &[u8],
    compressed: bool,
) -> Result<Vec<u8>, Bin2OtaError> {
    let board = boards::lookup(board_name)?;
    ota::encode_for(board, payload, compressed)
}

/// Converts a firmware binary into an OTA container.
pub fn bin2ota(
    mut input: impl Read,
    output: impl Write,
    board: &BoardProfile,
    compressed: bool,
) -> Result<(), Bin2OtaError> {
    let mut payload = Vec::new();
    input
        .read_to_end(&mut payload)
        .map_err(Bin2OtaError::FailedToRead)?;

    debug!("Read {} byte payload for {}", payload.len(), board);

    ota::write_container(output, board, &payload, compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    const BLINK: &[u8] = include_bytes!("../tests/fixtures/blink.bin");

    #[test]
    pub fn blink_esp32() {
        let mut bytes_out = Vec::new();
        bin2ota(io::Cursor::new(BLINK), &mut bytes_out, &boards::ESP32, false).unwrap();

        assert_eq!(
            bytes_out,
            include_bytes!("../tests/fixtures/blink_esp32.ota")
        );
    }

    #[test]
    pub fn blink_nano_33_iot() {
        let bytes_out = encode("NANO_33_IOT", BLINK, true).unwrap();

        assert_eq!(
            bytes_out,
            include_bytes!("../tests/fixtures/blink_nano_33_iot.ota")
        );
    }

    #[test]
    pub fn every_board_frames_payload() {
        for board in boards::BoardIter::new() {
            for compressed in [false, true] {
                let container = encode(board.name, BLINK, compressed).unwrap();
                let length = u32::from_le_bytes(container[0..4].try_into().unwrap()) as usize;

                assert_eq!(length, container.len() - ota::LENGTH_AND_CRC_LEN);

                let body = &container[ota::LENGTH_AND_CRC_LEN..];
                assert_eq!(&body[..4], &board.magic_bytes());
                assert_eq!(&body[4..12], &ota::build_version(compressed));
                assert_eq!(&body[12..], BLINK);
            }
        }
    }

    #[test]
    pub fn unknown_board_produces_nothing() {
        let err = encode("NOT_A_BOARD", b"x", false).unwrap_err();
        assert!(matches!(err, Bin2OtaError::UnknownBoard { .. }));
    }

    #[test]
    pub fn deterministic() {
        assert_eq!(
            encode("OPTA", BLINK, true).unwrap(),
            encode("OPTA", BLINK, true).unwrap()
        );
    }

    #[test]
    pub fn write_error_is_reported() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = bin2ota(io::Cursor::new(BLINK), Broken, &boards::GIGA, true).unwrap_err();
        assert!(matches!(err, Bin2OtaError::FailedToWrite(_)));
    }
}
