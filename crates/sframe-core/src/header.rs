//! SFrame header codec.
//!
//! The header is a variable-length structure of 1..=17 bytes carrying the
//! key id and frame counter. All multi-byte integers are Big Endian with
//! minimal-length encoding on the wire.
//!
//! Layout of the leading metadata byte:
//!
//! ```text
//! bit  0   1 2 3   4   5 6 7
//!     [R] [LEN  ] [X] [K/KLEN]
//! ```
//!
//! - `R`: reserved, emitted as 0 and ignored on parse
//! - `LEN`: counter byte-length minus 1 (1..=8 bytes)
//! - `X`: 0 = `K` holds a 3-bit key id inline; 1 = `K` holds the key id
//!   byte-length minus 1 and the key id follows the metadata byte
//! - The counter always follows last
//!
//! The header bytes double as AEAD associated data, so a parsed header
//! re-encodes to exactly the bytes consumed - including non-minimal field
//! lengths produced by other implementations.

use bytes::BufMut;

use crate::error::{Result, SframeError};

/// Minimal Big Endian byte length of a value (at least 1).
fn byte_len(value: u64) -> u8 {
    let bits = 64 - value.leading_zeros() as usize;
    (bits.div_ceil(8)).max(1) as u8
}

/// Read an unsigned Big Endian integer of up to 8 bytes.
fn read_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

/// Parsed or generated SFrame header.
///
/// Construction via [`SframeHeader::new`] always uses minimal field
/// encodings; [`SframeHeader::parse`] preserves the wire lengths it saw so
/// that [`SframeHeader::encode`] round-trips byte-exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SframeHeader {
    key_id: u64,
    counter: u64,
    /// Wire bytes used by the key id; 0 when inline in the metadata byte.
    key_id_len: u8,
    /// Wire bytes used by the counter (1..=8).
    counter_len: u8,
}

impl SframeHeader {
    /// Largest key id the header format can carry (2^64 - 1).
    ///
    /// The wire format allows the full 64-bit range and `u64` represents
    /// it losslessly, so no additional cap applies.
    pub const MAX_KEY_ID: u64 = u64::MAX;

    /// Largest possible encoded header size (metadata + 8 + 8 bytes).
    pub const MAX_SIZE: usize = 17;

    /// Build a header for `(key_id, counter)` with minimal field lengths.
    ///
    /// Key ids up to 7 are packed into the metadata byte; larger ids use
    /// the extended form with an explicit Big Endian key id field.
    #[must_use]
    pub fn new(key_id: u64, counter: u64) -> Self {
        let key_id_len = if key_id > 7 { byte_len(key_id) } else { 0 };
        Self { key_id, counter, key_id_len, counter_len: byte_len(counter) }
    }

    /// Parse a header from the start of `bytes`.
    ///
    /// `bytes` may extend past the header (callers hand in the whole
    /// frame); exactly [`Self::encoded_len`] bytes are consumed and
    /// trailing data is never examined.
    ///
    /// # Errors
    ///
    /// - `SframeError::FrameTooShort` if the buffer ends before the header
    ///   does
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Some((&metadata, rest)) = bytes.split_first() else {
            return Err(SframeError::FrameTooShort { expected: 1, actual: bytes.len() });
        };

        let counter_len = ((metadata >> 4) & 0x07) + 1;
        let extended = metadata & 0x08 != 0;
        let k = metadata & 0x07;

        let key_id_len = if extended { k + 1 } else { 0 };
        let expected = 1 + usize::from(key_id_len) + usize::from(counter_len);
        if bytes.len() < expected {
            return Err(SframeError::FrameTooShort { expected, actual: bytes.len() });
        }

        let (key_id_bytes, counter_bytes) = rest.split_at(usize::from(key_id_len));
        let key_id = if extended { read_be(key_id_bytes) } else { u64::from(k) };
        let counter = read_be(&counter_bytes[..usize::from(counter_len)]);

        Ok(Self { key_id, counter, key_id_len, counter_len })
    }

    /// Key id (the sender identity in this library's convention).
    #[must_use]
    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    /// Frame counter.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Encoded size in bytes (1..=17).
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        1 + usize::from(self.key_id_len) + usize::from(self.counter_len)
    }

    /// Serialize the header into `dst`.
    ///
    /// Writes exactly [`Self::encoded_len`] bytes. For parsed headers this
    /// reproduces the consumed wire bytes verbatim.
    pub fn encode(&self, dst: &mut impl BufMut) {
        let extended = self.key_id_len > 0;
        let k = if extended { self.key_id_len - 1 } else { self.key_id as u8 };

        dst.put_u8(((self.counter_len - 1) << 4) | (u8::from(extended) << 3) | (k & 0x07));
        if extended {
            let be = self.key_id.to_be_bytes();
            dst.put_slice(&be[8 - usize::from(self.key_id_len)..]);
        }
        let be = self.counter.to_be_bytes();
        dst.put_slice(&be[8 - usize::from(self.counter_len)..]);
    }

    /// Serialize the header into a fresh buffer.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode(&mut out);
        out
    }
}
