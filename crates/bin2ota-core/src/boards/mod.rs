use std::fmt;

use crate::Bin2OtaError;

/// Vendor id of Arduino SA, the high half of every VID/PID derived magic number
pub const ARDUINO_VENDOR_ID: u16 = 0x2341;

/// A board the bootloader accepts OTA containers for.
///
/// The magic number is stored as a plain `u32` and serialized little-endian
/// into the container, so `0x45535033` ends up on the wire as `33 50 53 45`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardProfile {
    pub name: &'static str,
    pub magic: u32,
}

impl BoardProfile {
    pub const fn new(name: &'static str, magic: u32) -> Self {
        Self { name, magic }
    }

    pub const fn magic_bytes(&self) -> [u8; 4] {
        self.magic.to_le_bytes()
    }

    /// The USB vendor and product id the magic number was built from, if any
    pub fn usb_ids(&self) -> Option<(u16, u16)> {
        let vendor_id = (self.magic >> 16) as u16;
        let product_id = (self.magic & 0xffff) as u16;

        if vendor_id == ARDUINO_VENDOR_ID {
            Some((vendor_id, product_id))
        } else {
            None
        }
    }
}

impl fmt::Display for BoardProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#010x})", self.name, self.magic)
    }
}

pub const MKR_WIFI_1010: BoardProfile = BoardProfile::new("MKR_WIFI_1010", 0x23418054);
pub const NANO_33_IOT: BoardProfile = BoardProfile::new("NANO_33_IOT", 0x23418057);
pub const PORTENTA_H7_M7: BoardProfile = BoardProfile::new("PORTENTA_H7_M7", 0x2341025B);
pub const NANO_RP2040_CONNECT: BoardProfile =
    BoardProfile::new("NANO_RP2040_CONNECT", 0x2341005E);
pub const NICLA_VISION: BoardProfile = BoardProfile::new("NICLA_VISION", 0x2341025F);
pub const OPTA: BoardProfile = BoardProfile::new("OPTA", 0x23410064);
pub const GIGA: BoardProfile = BoardProfile::new("GIGA", 0x23410266);
pub const NANO_ESP32: BoardProfile = BoardProfile::new("NANO_ESP32", 0x23410070);
/// Shared by every ESP32 board that has no Arduino VID/PID, reads "ESP3" on the wire
pub const ESP32: BoardProfile = BoardProfile::new("ESP32", 0x45535033);
pub const UNOR4WIFI: BoardProfile = BoardProfile::new("UNOR4WIFI", 0x23411002);
pub const PORTENTA_C33: BoardProfile = BoardProfile::new("PORTENTA_C33", 0x23410068);

/// Every board a container can be built for. New boards only need a row here.
pub const BOARDS: &[BoardProfile] = &[
    MKR_WIFI_1010,
    NANO_33_IOT,
    PORTENTA_H7_M7,
    NANO_RP2040_CONNECT,
    NICLA_VISION,
    OPTA,
    GIGA,
    NANO_ESP32,
    ESP32,
    UNOR4WIFI,
    PORTENTA_C33,
];

/// This is a helper struct, which allows you to iterate over every board defined
pub struct BoardIter {
    inner: std::slice::Iter<'static, BoardProfile>,
}

impl BoardIter {
    /// Creates a new BoardIter
    pub fn new() -> Self {
        Self {
            inner: BOARDS.iter(),
        }
    }

    pub fn find_by_name(name: &str) -> Option<&'static BoardProfile> {
        Self::new().find(|board| board.name.eq_ignore_ascii_case(name))
    }

    /// Comma separated list of every board name, used in error messages
    pub fn supported_names() -> String {
        Self::new()
            .map(|board| board.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for BoardIter {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for BoardIter {
    type Item = &'static BoardProfile;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Resolves a board name to its profile, failing with [`Bin2OtaError::UnknownBoard`]
pub fn lookup(name: &str) -> Result<&'static BoardProfile, Bin2OtaError> {
    BoardIter::find_by_name(name).ok_or_else(|| Bin2OtaError::UnknownBoard {
        name: name.to_string(),
        supported: BoardIter::supported_names(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_magic_numbers() {
        let expected: [(&str, u32); 11] = [
            ("MKR_WIFI_1010", 0x23418054),
            ("NANO_33_IOT", 0x23418057),
            ("PORTENTA_H7_M7", 0x2341025B),
            ("NANO_RP2040_CONNECT", 0x2341005E),
            ("NICLA_VISION", 0x2341025F),
            ("OPTA", 0x23410064),
            ("GIGA", 0x23410266),
            ("NANO_ESP32", 0x23410070),
            ("ESP32", 0x45535033),
            ("UNOR4WIFI", 0x23411002),
            ("PORTENTA_C33", 0x23410068),
        ];

        assert_eq!(BoardIter::new().count(), expected.len());
        for (name, magic) in expected {
            assert_eq!(lookup(name).unwrap().magic, magic, "{}", name);
        }
    }

    #[test]
    fn names_are_unique_ignoring_case() {
        let names: HashSet<String> = BoardIter::new()
            .map(|board| board.name.to_ascii_lowercase())
            .collect();
        assert_eq!(names.len(), BOARDS.len());
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(lookup("nano_esp32").unwrap(), &NANO_ESP32);
    }

    #[test]
    fn unknown_board() {
        match lookup("NOT_A_BOARD") {
            Err(Bin2OtaError::UnknownBoard { name, supported }) => {
                assert_eq!(name, "NOT_A_BOARD");
                assert!(supported.contains("PORTENTA_C33"));
            }
            other => panic!("expected UnknownBoard, got {:?}", other),
        }
    }

    #[test]
    fn esp32_magic_is_little_endian() {
        assert_eq!(ESP32.magic_bytes(), [0x33, 0x50, 0x53, 0x45]);
        assert_eq!(ESP32.usb_ids(), None);
    }

    #[test]
    fn usb_ids_from_magic() {
        assert_eq!(UNOR4WIFI.usb_ids(), Some((0x2341, 0x1002)));
        assert_eq!(MKR_WIFI_1010.usb_ids(), Some((0x2341, 0x8054)));
    }
}
