//! LZSS in the flavour the OTA bootloaders decompress.
//!
//! The bit stream is MSB first. A `1` flag bit is followed by an 8 bit literal,
//! a `0` flag bit by an [`EI`] bit ring position and an [`EJ`] bit match length
//! minus two. The ring starts out filled with spaces and writing starts at
//! `N - F`, so matches against that prefix are valid from the first byte on.

use log::trace;

/// Ring position bits
pub const EI: u32 = 11;
/// Match length bits
pub const EJ: u32 = 4;
/// Matches of this length or shorter are emitted as literals
pub const P: usize = 1;

/// Ring buffer size
pub const N: usize = 1 << EI;
/// Lookahead size, the longest possible match
pub const F: usize = (1 << EJ) + 1;

const FILL: u8 = b' ';

struct BitWriter {
    out: Vec<u8>,
    buffer: u8,
    mask: u8,
}

impl BitWriter {
    fn new(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            buffer: 0,
            mask: 0x80,
        }
    }

    fn put_bit(&mut self, bit: bool) {
        if bit {
            self.buffer |= self.mask;
        }
        self.mask >>= 1;
        if self.mask == 0 {
            self.out.push(self.buffer);
            self.buffer = 0;
            self.mask = 0x80;
        }
    }

    fn put_bits(&mut self, value: usize, count: u32) {
        for shift in (0..count).rev() {
            self.put_bit((value >> shift) & 1 != 0);
        }
    }

    fn literal(&mut self, c: u8) {
        self.put_bit(true);
        self.put_bits(c as usize, 8);
    }

    fn reference(&mut self, position: usize, len: usize) {
        self.put_bit(false);
        self.put_bits(position & (N - 1), EI);
        self.put_bits(len - 2, EJ);
    }

    /// Pads the last byte with zero bits
    fn finish(mut self) -> Vec<u8> {
        if self.mask != 0x80 {
            self.out.push(self.buffer);
        }
        self.out
    }
}

struct BitReader<'a> {
    input: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, bit: 0 }
    }

    /// `None` once fewer than `count` bits are left
    fn get_bits(&mut self, count: u32) -> Option<usize> {
        if self.bit + count as usize > self.input.len() * 8 {
            return None;
        }

        let mut value = 0;
        for _ in 0..count {
            let byte = self.input[self.bit / 8];
            let bit = (byte >> (7 - self.bit % 8)) & 1;
            value = (value << 1) | bit as usize;
            self.bit += 1;
        }
        Some(value)
    }
}

/// Compresses `input`.
pub fn encode(input: &[u8]) -> Vec<u8> {
    // The window is the space filled prefix followed by the whole input, so
    // ring positions are just indices modulo N.
    let mut window = vec![FILL; N - F];
    window.extend_from_slice(input);

    let end = window.len();
    let mut writer = BitWriter::new(input.len());
    let mut r = N - F;

    while r < end {
        let lookahead = F.min(end - r);
        let c = window[r];

        let mut best_pos = 0;
        let mut best_len = 1;

        // Scanning backwards and only accepting longer matches prefers the nearest one
        for i in (r - (N - F)..r).rev() {
            if window[i] != c {
                continue;
            }

            let mut len = 1;
            while len < lookahead && window[i + len] == window[r + len] {
                len += 1;
            }

            if len > best_len {
                best_pos = i;
                best_len = len;
                if len == lookahead {
                    break;
                }
            }
        }

        if best_len <= P {
            writer.literal(c);
            r += 1;
        } else {
            writer.reference(best_pos, best_len);
            r += best_len;
        }
    }

    let out = writer.finish();
    trace!("lzss: {} -> {} bytes", input.len(), out.len());
    out
}

/// Decompresses `input`, stopping at the first token that is cut short.
pub fn decode(input: &[u8]) -> Vec<u8> {
    let mut ring = [FILL; N];
    let mut r = N - F;
    let mut reader = BitReader::new(input);
    let mut out = Vec::with_capacity(input.len() * 2);

    let mut push = |c: u8, out: &mut Vec<u8>, ring: &mut [u8; N]| {
        out.push(c);
        ring[r] = c;
        r = (r + 1) & (N - 1);
    };

    while let Some(flag) = reader.get_bits(1) {
        if flag == 1 {
            let Some(c) = reader.get_bits(8) else { break };
            push(c as u8, &mut out, &mut ring);
        } else {
            let Some(position) = reader.get_bits(EI) else { break };
            let Some(len) = reader.get_bits(EJ) else { break };

            for k in 0..len + 2 {
                let c = ring[(position + k) & (N - 1)];
                push(c, &mut out, &mut ring);
            }
        }
    }

    out
}
