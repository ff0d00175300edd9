use std::{io::Write, mem};

use log::debug;
use static_assertions::const_assert;
use zerocopy::{byteorder::little_endian::U32, Immutable, IntoBytes, KnownLayout};

use crate::{boards::BoardProfile, Bin2OtaError};

/// Set in the last version byte when the payload went through the compressor
pub const COMPRESSION_FLAG: u8 = 0x40;

pub const VERSION_LEN: usize = 8;

/// The length and crc fields, which are not covered by either of them
pub const LENGTH_AND_CRC_LEN: usize = 8;

/// magic + version, the part of the body in front of the payload
pub const BODY_PREFIX_LEN: usize = 4 + VERSION_LEN;

pub const HEADER_LEN: usize = LENGTH_AND_CRC_LEN + BODY_PREFIX_LEN;

/// The 8 byte version field. Only the compression flag is ever set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VersionField([u8; VERSION_LEN]);

impl VersionField {
    pub const fn new(compressed: bool) -> Self {
        let mut bytes = [0; VERSION_LEN];
        if compressed {
            bytes[VERSION_LEN - 1] = COMPRESSION_FLAG;
        }
        Self(bytes)
    }

    pub const fn is_compressed(&self) -> bool {
        self.0[VERSION_LEN - 1] & COMPRESSION_FLAG != 0
    }

    pub const fn to_bytes(self) -> [u8; VERSION_LEN] {
        self.0
    }
}

pub const fn build_version(compressed: bool) -> [u8; VERSION_LEN] {
    VersionField::new(compressed).to_bytes()
}

#[repr(C)]
#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout)]
pub struct OtaHeader {
    // length + crc32 of everything after them
    pub length: U32,
    pub crc32: U32,
    pub magic: U32,
    pub version: [u8; VERSION_LEN],
}

const_assert!(mem::size_of::<OtaHeader>() == HEADER_LEN);

impl OtaHeader {
    /// Computes the header for `payload`, which is not copied
    pub fn new(
        board: &BoardProfile,
        version: VersionField,
        payload: &[u8],
    ) -> Result<Self, Bin2OtaError> {
        let length = BODY_PREFIX_LEN
            .checked_add(payload.len())
            .and_then(|len| u32::try_from(len).ok())
            .ok_or(Bin2OtaError::PayloadTooLarge(payload.len()))?;

        let magic = board.magic_bytes();
        let version = version.to_bytes();

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&magic);
        hasher.update(&version);
        hasher.update(payload);
        let crc32 = hasher.finalize();

        debug!(
            "{}: length {} crc32 {:#010x} version {:02x?}",
            board.name, length, crc32, version
        );

        Ok(Self {
            length: U32::new(length),
            crc32: U32::new(crc32),
            magic: U32::new(board.magic),
            version,
        })
    }
}

/// Builds the complete container in memory
pub fn encode_for(
    board: &BoardProfile,
    payload: &[u8],
    compressed: bool,
) -> Result<Vec<u8>, Bin2OtaError> {
    let header = OtaHeader::new(board, VersionField::new(compressed), payload)?;

    let mut container = Vec::with_capacity(HEADER_LEN + payload.len());
    container.extend_from_slice(header.as_bytes());
    container.extend_from_slice(payload);

    Ok(container)
}

/// Streams the container to `output`. Nothing is written if the header can't be built.
pub fn write_container(
    mut output: impl Write,
    board: &BoardProfile,
    payload: &[u8],
    compressed: bool,
) -> Result<(), Bin2OtaError> {
    let header = OtaHeader::new(board, VersionField::new(compressed), payload)?;

    output
        .write_all(header.as_bytes())
        .map_err(Bin2OtaError::FailedToWrite)?;
    output
        .write_all(payload)
        .map_err(Bin2OtaError::FailedToWrite)?;
    output.flush().map_err(Bin2OtaError::FailedToWrite)?;

    Ok(())
}
