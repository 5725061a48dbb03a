//! Property-based tests for the frame transform.
//!
//! These verify the fundamental invariants:
//!
//! 1. **Round-trip**: decrypt(encrypt(p, skip), skip) == p for every
//!    suite, plaintext and valid skip
//! 2. **Clear prefix**: the first `skip` bytes of a ciphertext equal the
//!    plaintext prefix
//! 3. **Monotonicity**: successive encrypts carry strictly increasing
//!    header counters
//! 4. **Integrity**: flipping any protected byte makes decryption fail
//! 5. **IV freshness**: the same plaintext never encrypts to the same
//!    frame body twice under one key

use proptest::prelude::*;
use sframe_core::{CipherSuiteVariant, SframeContext, SframeHeader};

const ALL_VARIANTS: [CipherSuiteVariant; 4] = [
    CipherSuiteVariant::AesCm128HmacSha256_4,
    CipherSuiteVariant::AesCm128HmacSha256_8,
    CipherSuiteVariant::AesGcm128Sha256,
    CipherSuiteVariant::AesGcm256Sha512,
];

fn variant_strategy() -> impl Strategy<Value = CipherSuiteVariant> {
    prop::sample::select(ALL_VARIANTS.as_slice())
}

fn linked_pair(variant: CipherSuiteVariant, sender_id: u64) -> (SframeContext, SframeContext) {
    let key = [0x42u8; 32];
    let mut sending = SframeContext::new(variant);
    sending.set_sender_encryption_key(sender_id, &key).unwrap();

    let mut receiving = SframeContext::new(variant);
    receiving.set_receiver_encryption_key(sender_id, &key).unwrap();

    (sending, receiving)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_encrypt_decrypt_round_trip(
        variant in variant_strategy(),
        sender_id in any::<u64>(),
        plaintext in prop::collection::vec(any::<u8>(), 0..512),
        skip_seed in any::<usize>(),
    ) {
        let skip = skip_seed % (plaintext.len() + 1);
        let (mut sending, mut receiving) = linked_pair(variant, sender_id);

        let frame = sending.encrypt(&plaintext, skip).unwrap();
        prop_assert_eq!(&frame[..skip], &plaintext[..skip]);

        let decrypted = receiving.decrypt(&frame, skip).unwrap();
        prop_assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn prop_counters_strictly_increase(
        variant in variant_strategy(),
        frame_count in 1usize..32,
    ) {
        let (mut sending, _) = linked_pair(variant, 0);

        let mut previous = None;
        for _ in 0..frame_count {
            let frame = sending.encrypt(b"tick", 0).unwrap();
            let counter = SframeHeader::parse(&frame).unwrap().counter();

            if let Some(previous) = previous {
                prop_assert!(counter > previous, "counter {counter} after {previous}");
            }
            previous = Some(counter);
        }
    }

    #[test]
    fn prop_protected_bytes_are_tamper_evident(
        variant in variant_strategy(),
        plaintext in prop::collection::vec(any::<u8>(), 1..256),
        skip_seed in any::<usize>(),
        flip_seed in any::<usize>(),
    ) {
        let skip = skip_seed % plaintext.len();
        let (mut sending, mut receiving) = linked_pair(variant, 0);

        let mut frame = sending.encrypt(&plaintext, skip).unwrap();
        // Corrupt one byte past the clear prefix (header, body or tag).
        let flip = skip + flip_seed % (frame.len() - skip);
        frame[flip] ^= 0x01;

        prop_assert!(receiving.decrypt(&frame, skip).is_err());
    }

    #[test]
    fn prop_same_plaintext_never_repeats_on_the_wire(
        variant in variant_strategy(),
        plaintext in prop::collection::vec(any::<u8>(), 1..128),
    ) {
        let (mut sending, _) = linked_pair(variant, 0);

        let first = sending.encrypt(&plaintext, 0).unwrap();
        let second = sending.encrypt(&plaintext, 0).unwrap();

        // Fresh counter, fresh IV, different frame body.
        prop_assert_ne!(first, second);
    }

    #[test]
    fn prop_read_key_id_matches_the_sender(
        variant in variant_strategy(),
        sender_id in any::<u64>(),
    ) {
        let (mut sending, _) = linked_pair(variant, sender_id);

        let frame = sending.encrypt(b"frame", 0).unwrap();
        prop_assert_eq!(SframeContext::read_key_id(&frame, 0).unwrap(), sender_id);
    }
}
