//! SFrame end-to-end media frame encryption core
//!
//! Per-frame cryptographic protection for real-time media between a sender
//! and receivers sharing symmetric key material. A plaintext frame
//! (optionally led by a clear skip region, typically a codec payload
//! header) becomes an authenticated ciphertext carrying a compact SFrame
//! header; the inverse verifies authenticity, enforces a replay window and
//! consults a rolling keyring.
//!
//! ```text
//! Raw key material
//!        │
//!        ▼ HKDF("SFrame10", {"key","salt","auth"})
//! CipherSuite (encryption key, IV salt, auth key)
//!        │
//!        ▼ counter XOR salt → IV
//! AEAD over payload, header bytes as associated data
//!        │
//!        ▼
//! [skip][header][ciphertext][truncated HMAC tag]
//! ```
//!
//! The entry point is [`SframeContext`]:
//!
//! ```
//! use sframe_core::{CipherSuiteVariant, SframeContext};
//!
//! let key = [7u8; 32];
//! let mut sending = SframeContext::new(CipherSuiteVariant::AesGcm256Sha512);
//! sending.set_sender_encryption_key(1, &key).unwrap();
//!
//! let mut receiving = SframeContext::new(CipherSuiteVariant::AesGcm256Sha512);
//! receiving.set_receiver_encryption_key(1, &key).unwrap();
//!
//! let frame = sending.encrypt(b"media payload", 0).unwrap();
//! assert_eq!(receiving.decrypt(&frame, 0).unwrap(), b"media payload");
//! ```
//!
//! # Security
//!
//! - Confidentiality: AES-CTR or AES-GCM keyed per suite variant
//! - Authenticity: an external truncated HMAC-SHA-256 tag over header and
//!   ciphertext, carried even for the GCM suites (wire compatibility with
//!   the deployed format)
//! - Replay: counters more than 128 behind the highest accepted value are
//!   rejected; duplicates inside the window are allowed
//! - Rotation: superseded receiver keys stay usable for one `KEY_TIMEOUT`
//!   after a newer key lands, then retire
//! - Key hygiene: derived key material is zeroized on drop and never
//!   printed
//!
//! Key exchange, media transport and codec payload parsing are the
//! caller's business; this crate only transforms frames.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod context;
mod crypto;
mod error;
mod header;
mod receiver;
mod sender;
mod suite;

pub use context::SframeContext;
pub use error::{Result, SframeError};
pub use header::SframeHeader;
pub use receiver::{KEY_TIMEOUT, REPLAY_WINDOW, Receiver};
pub use sender::Sender;
pub use suite::{AeadAlgorithm, CipherSuite, CipherSuiteVariant, HkdfHash, NONCE_SIZE};
