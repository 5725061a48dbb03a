//! Fuzz target for the context decrypt path
//!
//! Drives a receiving context with arbitrary frames and skip offsets.
//!
//! # Strategy
//!
//! - Random cipher suite variant and keyring depth
//! - Arbitrary frame bytes, including genuine frames with injected faults
//! - Skip offsets beyond the frame length
//!
//! # Invariants
//!
//! - Decryption never panics, only returns errors
//! - A frame that decrypts successfully under an untouched keyring is a
//!   byte-for-byte round trip of a frame this fuzzer itself encrypted

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sframe_core::{CipherSuiteVariant, SframeContext};

#[derive(Debug, Arbitrary)]
struct DecryptScenario {
    variant_seed: u8,
    sender_id: u64,
    key_material: [u8; 32],
    /// Extra keys appended to the receiver keyring before decryption.
    extra_keys: Vec<[u8; 32]>,
    payload: Vec<u8>,
    skip_seed: usize,
    /// Byte position to corrupt in the genuine frame, if any.
    corrupt_at: Option<usize>,
    /// Raw bytes tried directly as a frame.
    raw_frame: Vec<u8>,
}

fn variant(seed: u8) -> CipherSuiteVariant {
    match seed % 4 {
        0 => CipherSuiteVariant::AesCm128HmacSha256_4,
        1 => CipherSuiteVariant::AesCm128HmacSha256_8,
        2 => CipherSuiteVariant::AesGcm128Sha256,
        _ => CipherSuiteVariant::AesGcm256Sha512,
    }
}

fuzz_target!(|scenario: DecryptScenario| {
    let variant = variant(scenario.variant_seed);

    let mut sending = SframeContext::new(variant);
    sending
        .set_sender_encryption_key(scenario.sender_id, &scenario.key_material)
        .expect("32-byte key material fits every variant");

    let mut receiving = SframeContext::new(variant);
    receiving
        .set_receiver_encryption_key(scenario.sender_id, &scenario.key_material)
        .expect("32-byte key material fits every variant");
    for extra in scenario.extra_keys.iter().take(4) {
        receiving
            .set_receiver_encryption_key(scenario.sender_id, extra)
            .expect("32-byte key material fits every variant");
    }

    let skip = scenario.skip_seed % (scenario.payload.len() + 1);
    let frame = sending.encrypt(&scenario.payload, skip).expect("encrypt cannot fail with a key");

    // Genuine frame must round-trip.
    let decrypted = receiving.decrypt(&frame, skip).expect("genuine frame must decrypt");
    assert_eq!(decrypted, scenario.payload);

    // Corrupted frame must never panic; protected bytes must not decrypt.
    if let Some(position) = scenario.corrupt_at {
        let mut corrupted = frame.clone();
        let position = position % corrupted.len();
        corrupted[position] ^= 0x01;
        if position >= skip {
            assert!(receiving.decrypt(&corrupted, skip).is_err());
        } else {
            let _ = receiving.decrypt(&corrupted, skip);
        }
    }

    // Arbitrary bytes with an arbitrary skip must never panic.
    let _ = receiving.decrypt(&scenario.raw_frame, scenario.skip_seed);
    let _ = SframeContext::read_key_id(&scenario.raw_frame, scenario.skip_seed);
});
