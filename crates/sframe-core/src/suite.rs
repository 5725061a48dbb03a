//! Cipher suite variants and the HKDF key schedule.
//!
//! A [`CipherSuite`] is derived once from raw key material and is immutable
//! afterwards. All derivations use HKDF with the hash named by the variant,
//! the fixed salt `"SFrame10"` and a per-purpose info label:
//!
//! ```text
//! Raw key material
//!        │
//!        ▼ HKDF(salt = "SFrame10")
//!   info "key"  → AEAD encryption key (nK bytes)
//!   info "salt" → IV salt (12 bytes)
//!   info "auth" → HMAC-SHA-256 frame authentication key (nK bytes)
//! ```
//!
//! The authentication key is always an HMAC-SHA-256 key regardless of the
//! suite hash; the suite hash only selects the HKDF instantiation.
//!
//! # Security
//!
//! - Derived key material is zeroized on drop
//! - `Debug` never prints key bytes
//! - The domain-separation constants are wire-compatibility critical and
//!   must not change

use hkdf::Hkdf;
use sha2::{Sha256, Sha512};
use zeroize::Zeroize;

use crate::error::{Result, SframeError};

/// HKDF salt shared by every derivation.
const HKDF_SALT: &[u8] = b"SFrame10";

/// HKDF info for the AEAD encryption key.
const INFO_KEY: &[u8] = b"key";

/// HKDF info for the IV salt.
const INFO_SALT: &[u8] = b"salt";

/// HKDF info for the frame authentication key.
const INFO_AUTH: &[u8] = b"auth";

/// Per-frame nonce length shared by all suites (12 bytes).
pub const NONCE_SIZE: usize = 12;

/// AEAD algorithm selected by a cipher suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeadAlgorithm {
    /// AES-128 counter mode. Confidentiality only; authenticity comes from
    /// the external truncated HMAC tag.
    AesCtr128,
    /// AES-128-GCM
    AesGcm128,
    /// AES-256-GCM
    AesGcm256,
}

/// HKDF hash function selected by a cipher suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HkdfHash {
    /// HKDF-SHA-256
    Sha256,
    /// HKDF-SHA-512
    Sha512,
}

/// Supported cipher suite variants.
///
/// The numeric suffix of the CM variants is the truncated auth-tag length
/// in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(non_camel_case_types)]
pub enum CipherSuiteVariant {
    /// AES-CTR-128, HKDF-SHA-256, 4-byte tag
    AesCm128HmacSha256_4,
    /// AES-CTR-128, HKDF-SHA-256, 8-byte tag
    AesCm128HmacSha256_8,
    /// AES-128-GCM, HKDF-SHA-256, 8-byte tag
    AesGcm128Sha256,
    /// AES-256-GCM, HKDF-SHA-512, 16-byte tag
    #[default]
    AesGcm256Sha512,
}

impl CipherSuiteVariant {
    /// AEAD algorithm used for the frame body.
    #[must_use]
    pub fn aead(&self) -> AeadAlgorithm {
        match self {
            Self::AesCm128HmacSha256_4 | Self::AesCm128HmacSha256_8 => AeadAlgorithm::AesCtr128,
            Self::AesGcm128Sha256 => AeadAlgorithm::AesGcm128,
            Self::AesGcm256Sha512 => AeadAlgorithm::AesGcm256,
        }
    }

    /// Hash function for the HKDF key schedule.
    #[must_use]
    pub fn hash(&self) -> HkdfHash {
        match self {
            Self::AesCm128HmacSha256_4 | Self::AesCm128HmacSha256_8 | Self::AesGcm128Sha256 => {
                HkdfHash::Sha256
            },
            Self::AesGcm256Sha512 => HkdfHash::Sha512,
        }
    }

    /// Encryption key length `nK` in bytes.
    #[must_use]
    pub fn key_len(&self) -> usize {
        match self.aead() {
            AeadAlgorithm::AesCtr128 | AeadAlgorithm::AesGcm128 => 16,
            AeadAlgorithm::AesGcm256 => 32,
        }
    }

    /// Nonce length `nN` in bytes (12 for every variant).
    #[must_use]
    pub fn nonce_len(&self) -> usize {
        NONCE_SIZE
    }

    /// Truncated authentication tag length `nT` in bytes.
    #[must_use]
    pub fn tag_len(&self) -> usize {
        match self {
            Self::AesCm128HmacSha256_4 => 4,
            Self::AesCm128HmacSha256_8 | Self::AesGcm128Sha256 => 8,
            Self::AesGcm256Sha512 => 16,
        }
    }
}

/// HKDF-expand `len` bytes for `info` under the variant's hash.
fn expand(variant: CipherSuiteVariant, ikm: &[u8], info: &[u8], len: usize) -> Vec<u8> {
    let mut okm = vec![0u8; len];
    let result = match variant.hash() {
        HkdfHash::Sha256 => Hkdf::<Sha256>::new(Some(HKDF_SALT), ikm).expand(info, &mut okm),
        HkdfHash::Sha512 => Hkdf::<Sha512>::new(Some(HKDF_SALT), ikm).expand(info, &mut okm),
    };
    let Ok(()) = result else {
        panic!("HKDF output length {len} exceeds the 255 * hash-size bound");
    };
    okm
}

/// A cipher suite instance: variant plus derived key material.
///
/// Owned by exactly one sender, or by one slot of a receiver's keyring.
pub struct CipherSuite {
    variant: CipherSuiteVariant,
    /// Retained for the `*_bits` diagnostic re-derivations.
    base_key: Vec<u8>,
    encryption_key: Vec<u8>,
    salt: [u8; NONCE_SIZE],
    auth_key: Vec<u8>,
}

impl CipherSuite {
    /// Derive a suite instance from raw key material.
    ///
    /// # Errors
    ///
    /// - `SframeError::InvalidKeyLength` if the material is shorter than
    ///   the variant's key length (16 bytes for 128-bit suites, 32 for
    ///   256-bit suites)
    pub fn derive(variant: CipherSuiteVariant, key_material: &[u8]) -> Result<Self> {
        if key_material.len() < variant.key_len() {
            return Err(SframeError::InvalidKeyLength {
                expected: variant.key_len(),
                actual: key_material.len(),
            });
        }

        let salt_bytes = expand(variant, key_material, INFO_SALT, NONCE_SIZE);
        let mut salt = [0u8; NONCE_SIZE];
        salt.copy_from_slice(&salt_bytes);

        Ok(Self {
            variant,
            base_key: key_material.to_vec(),
            encryption_key: expand(variant, key_material, INFO_KEY, variant.key_len()),
            salt,
            auth_key: expand(variant, key_material, INFO_AUTH, variant.key_len()),
        })
    }

    /// The variant this instance was derived for.
    #[must_use]
    pub fn variant(&self) -> CipherSuiteVariant {
        self.variant
    }

    /// AEAD encryption key (`nK` bytes).
    pub(crate) fn encryption_key(&self) -> &[u8] {
        &self.encryption_key
    }

    /// IV salt (12 bytes).
    pub(crate) fn salt(&self) -> &[u8; NONCE_SIZE] {
        &self.salt
    }

    /// Frame authentication key for HMAC-SHA-256 (`nK` bytes).
    pub(crate) fn auth_key(&self) -> &[u8] {
        &self.auth_key
    }

    /// Re-derive `len` bytes of the encryption-key expansion.
    ///
    /// Diagnostic surface for test vectors: HKDF output for a shorter
    /// length is a prefix of the output for a longer one, so callers can
    /// compare any prefix width against published vectors.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the HKDF output bound (255 x hash length).
    #[must_use]
    pub fn encryption_key_bits(&self, len: usize) -> Vec<u8> {
        expand(self.variant, &self.base_key, INFO_KEY, len)
    }

    /// Re-derive `len` bytes of the salt expansion.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the HKDF output bound (255 x hash length).
    #[must_use]
    pub fn salt_bits(&self, len: usize) -> Vec<u8> {
        expand(self.variant, &self.base_key, INFO_SALT, len)
    }
}

impl Drop for CipherSuite {
    fn drop(&mut self) {
        self.base_key.zeroize();
        self.encryption_key.zeroize();
        self.salt.zeroize();
        self.auth_key.zeroize();
    }
}

// Manual Debug so key material never reaches logs.
impl std::fmt::Debug for CipherSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherSuite").field("variant", &self.variant).finish_non_exhaustive()
    }
}
