//! Per-frame encryption and decryption.
//!
//! Wire layout produced and consumed here:
//!
//! ```text
//! [skip region, clear] [SFrame header] [AEAD ciphertext] [HMAC tag, nT bytes]
//! ```
//!
//! The per-frame IV is the frame counter XORed into the suite salt. The
//! header bytes are bound to the ciphertext as AEAD associated data, and
//! the whole `[header..ciphertext]` span is covered by an external
//! truncated HMAC-SHA-256 tag. The external tag applies to the GCM suites
//! too; the deployed wire format requires it even though GCM already
//! carries a native tag.
//!
//! # Security
//!
//! - The skip region is excluded from both AEAD input and the HMAC tag
//! - Tag comparison is constant time over the full truncated length
//! - Within one key, distinct counters yield distinct IVs

use aes::Aes128;
use aes_gcm::{
    Aes128Gcm, Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{
    error::{Result, SframeError},
    header::SframeHeader,
    suite::{AeadAlgorithm, CipherSuite, NONCE_SIZE},
};

type HmacSha256 = Hmac<Sha256>;

/// AES-128 counter mode with a 32-bit Big Endian block counter, initial
/// block `nonce || 0x00000000`.
type Aes128Ctr = ctr::Ctr32BE<Aes128>;

/// Construct the per-frame IV: counter right-aligned, XORed into the salt.
pub(crate) fn build_iv(salt: &[u8; NONCE_SIZE], counter: u64) -> [u8; NONCE_SIZE] {
    let mut iv = [0u8; NONCE_SIZE];
    iv[NONCE_SIZE - 8..].copy_from_slice(&counter.to_be_bytes());
    for (byte, salt_byte) in iv.iter_mut().zip(salt) {
        *byte ^= salt_byte;
    }
    iv
}

/// HMAC-SHA-256 over `data`, full 32-byte output.
fn authenticate(auth_key: &[u8], data: &[u8]) -> [u8; 32] {
    let Ok(mut mac) = <HmacSha256 as Mac>::new_from_slice(auth_key) else {
        unreachable!("HMAC-SHA256 accepts any key size");
    };
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Constant-time comparison of a truncated tag against HMAC(`data`).
fn verify_tag(auth_key: &[u8], data: &[u8], tag: &[u8]) -> Result<()> {
    let Ok(mut mac) = <HmacSha256 as Mac>::new_from_slice(auth_key) else {
        unreachable!("HMAC-SHA256 accepts any key size");
    };
    mac.update(data);
    mac.verify_truncated_left(tag).map_err(|_| SframeError::Authentication)
}

fn aead_encrypt(suite: &CipherSuite, iv: &[u8; NONCE_SIZE], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    match suite.variant().aead() {
        AeadAlgorithm::AesCtr128 => {
            // CTR has no associated data; the header is bound to the frame
            // by the external HMAC tag instead.
            let mut block = [0u8; 16];
            block[..NONCE_SIZE].copy_from_slice(iv);
            let Ok(mut cipher) = Aes128Ctr::new_from_slices(suite.encryption_key(), &block) else {
                unreachable!("AES-128-CTR accepts a 16-byte key and a 16-byte initial block");
            };
            let mut out = plaintext.to_vec();
            cipher.apply_keystream(&mut out);
            Ok(out)
        },
        AeadAlgorithm::AesGcm128 => {
            let Ok(cipher) = Aes128Gcm::new_from_slice(suite.encryption_key()) else {
                unreachable!("AES-128-GCM accepts a 16-byte key");
            };
            cipher
                .encrypt(Nonce::from_slice(iv), Payload { msg: plaintext, aad })
                .map_err(|_| SframeError::EncryptionFailure)
        },
        AeadAlgorithm::AesGcm256 => {
            let Ok(cipher) = Aes256Gcm::new_from_slice(suite.encryption_key()) else {
                unreachable!("AES-256-GCM accepts a 32-byte key");
            };
            cipher
                .encrypt(Nonce::from_slice(iv), Payload { msg: plaintext, aad })
                .map_err(|_| SframeError::EncryptionFailure)
        },
    }
}

fn aead_decrypt(suite: &CipherSuite, iv: &[u8; NONCE_SIZE], aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    match suite.variant().aead() {
        AeadAlgorithm::AesCtr128 => {
            let mut block = [0u8; 16];
            block[..NONCE_SIZE].copy_from_slice(iv);
            let Ok(mut cipher) = Aes128Ctr::new_from_slices(suite.encryption_key(), &block) else {
                unreachable!("AES-128-CTR accepts a 16-byte key and a 16-byte initial block");
            };
            let mut out = ciphertext.to_vec();
            cipher.apply_keystream(&mut out);
            Ok(out)
        },
        AeadAlgorithm::AesGcm128 => {
            let Ok(cipher) = Aes128Gcm::new_from_slice(suite.encryption_key()) else {
                unreachable!("AES-128-GCM accepts a 16-byte key");
            };
            cipher
                .decrypt(Nonce::from_slice(iv), Payload { msg: ciphertext, aad })
                .map_err(|_| SframeError::DecryptionFailure)
        },
        AeadAlgorithm::AesGcm256 => {
            let Ok(cipher) = Aes256Gcm::new_from_slice(suite.encryption_key()) else {
                unreachable!("AES-256-GCM accepts a 32-byte key");
            };
            cipher
                .decrypt(Nonce::from_slice(iv), Payload { msg: ciphertext, aad })
                .map_err(|_| SframeError::DecryptionFailure)
        },
    }
}

/// Encrypt one frame.
///
/// Bytes `[0..skip)` of `plaintext` travel in the clear at the front of
/// the output; everything after them is AEAD-encrypted with the encoded
/// header as associated data and sealed with the truncated HMAC tag.
pub(crate) fn encrypt_frame(
    suite: &CipherSuite,
    header: &SframeHeader,
    plaintext: &[u8],
    skip: usize,
) -> Result<Vec<u8>> {
    if skip > plaintext.len() {
        return Err(SframeError::FrameTooShort { expected: skip, actual: plaintext.len() });
    }

    let iv = build_iv(suite.salt(), header.counter());
    let tag_len = suite.variant().tag_len();

    let mut out = Vec::with_capacity(plaintext.len() + header.encoded_len() + 16 + tag_len);
    out.extend_from_slice(&plaintext[..skip]);
    header.encode(&mut out);

    let ciphertext = aead_encrypt(suite, &iv, &out[skip..], &plaintext[skip..])?;
    out.extend_from_slice(&ciphertext);

    let tag = authenticate(suite.auth_key(), &out[skip..]);
    out.extend_from_slice(&tag[..tag_len]);
    Ok(out)
}

/// Decrypt one frame previously produced by [`encrypt_frame`].
///
/// `header` must be the header parsed from `frame[skip..]`. The tag is
/// verified before the AEAD runs; on success the output carries the clear
/// skip region followed by the recovered plaintext.
///
/// # Errors
///
/// - `SframeError::FrameTooShort` if the frame cannot hold header and tag
/// - `SframeError::Authentication` if the truncated HMAC tag mismatches
/// - `SframeError::DecryptionFailure` if the AEAD rejects the ciphertext
pub(crate) fn decrypt_frame(
    suite: &CipherSuite,
    header: &SframeHeader,
    frame: &[u8],
    skip: usize,
) -> Result<Vec<u8>> {
    let header_len = header.encoded_len();
    let tag_len = suite.variant().tag_len();
    let expected = skip + header_len + tag_len;
    if frame.len() < expected {
        return Err(SframeError::FrameTooShort { expected, actual: frame.len() });
    }

    let tag_start = frame.len() - tag_len;
    verify_tag(suite.auth_key(), &frame[skip..tag_start], &frame[tag_start..])?;

    let iv = build_iv(suite.salt(), header.counter());
    let aad = &frame[skip..skip + header_len];
    let ciphertext = &frame[skip + header_len..tag_start];
    let plaintext = aead_decrypt(suite, &iv, aad, ciphertext)?;

    let mut out = Vec::with_capacity(skip + plaintext.len());
    out.extend_from_slice(&frame[..skip]);
    out.extend_from_slice(&plaintext);
    Ok(out)
}
