//! End-to-end tests through the context facade.
//!
//! Covers the interop-critical flows: replay-window enforcement over a
//! long frame sweep, duplicate delivery, key rotation with delayed
//! retirement, and isolation between senders sharing one receiver side.

use std::time::Duration;

use sframe_core::{CipherSuiteVariant, REPLAY_WINDOW, SframeContext, SframeError, SframeHeader};

const KEY_A: [u8; 32] = [0x0A; 32];
const KEY_B: [u8; 32] = [0x0B; 32];

fn linked_pair(variant: CipherSuiteVariant, sender_id: u64, key: &[u8]) -> (SframeContext, SframeContext) {
    let mut sending = SframeContext::new(variant);
    sending.set_sender_encryption_key(sender_id, key).unwrap();

    let mut receiving = SframeContext::new(variant);
    receiving.set_receiver_encryption_key(sender_id, key).unwrap();

    (sending, receiving)
}

#[test]
fn round_trip_across_all_variants() {
    for variant in [
        CipherSuiteVariant::AesCm128HmacSha256_4,
        CipherSuiteVariant::AesCm128HmacSha256_8,
        CipherSuiteVariant::AesGcm128Sha256,
        CipherSuiteVariant::AesGcm256Sha512,
    ] {
        let (mut sending, mut receiving) = linked_pair(variant, 1, &KEY_A);
        let payload = b"VP8Xencrypted video payload";

        let frame = sending.encrypt(payload, 4).unwrap();
        assert_eq!(&frame[..4], &payload[..4], "skip region must stay clear for {variant:?}");
        assert_eq!(receiving.decrypt(&frame, 4).unwrap(), payload, "round trip for {variant:?}");
    }
}

#[test]
fn extended_key_ids_survive_the_wire() {
    let sender_id = 0xbbcc_ddee;
    let (mut sending, mut receiving) = linked_pair(CipherSuiteVariant::default(), sender_id, &KEY_A);

    let frame = sending.encrypt(b"frame", 0).unwrap();
    assert_eq!(SframeContext::read_key_id(&frame, 0).unwrap(), sender_id);
    assert_eq!(receiving.decrypt(&frame, 0).unwrap(), b"frame");
}

#[test]
fn replay_window_over_a_reversed_sweep() {
    let (mut sending, mut receiving) = linked_pair(CipherSuiteVariant::default(), 0, &KEY_A);

    let frames: Vec<_> = (0..200).map(|_| sending.encrypt(b"frame", 0).unwrap()).collect();

    // Deliver newest-first. Counters 199..=72 are inside the window of the
    // maximum (199); everything older is a replay.
    for (index, frame) in frames.iter().enumerate().rev() {
        let counter = index as u64;
        let result = receiving.decrypt(frame, 0);

        if counter + REPLAY_WINDOW > 199 {
            assert_eq!(result.unwrap(), b"frame", "counter {counter} should decrypt");
        } else {
            assert_eq!(
                result,
                Err(SframeError::ReplayAttack { counter, floor: 200 - REPLAY_WINDOW }),
                "counter {counter} should be rejected"
            );
        }
    }
}

#[test]
fn duplicate_delivery_yields_identical_plaintext() {
    let (mut sending, mut receiving) = linked_pair(CipherSuiteVariant::default(), 0, &KEY_A);

    let frame = sending.encrypt(b"once more", 0).unwrap();
    let first = receiving.decrypt(&frame, 0).unwrap();
    let second = receiving.decrypt(&frame, 0).unwrap();

    assert_eq!(first, b"once more");
    assert_eq!(first, second);
}

#[test]
fn rotation_retires_the_old_key_after_the_timeout() {
    let timeout = Duration::from_millis(50);
    let mut sending = SframeContext::with_key_timeout(CipherSuiteVariant::default(), timeout);
    let mut receiving = SframeContext::with_key_timeout(CipherSuiteVariant::default(), timeout);

    sending.set_sender_encryption_key(0, &KEY_A).unwrap();
    receiving.set_receiver_encryption_key(0, &KEY_A).unwrap();
    let frame_a = sending.encrypt(b"under key a", 0).unwrap();

    sending.set_sender_encryption_key(0, &KEY_B).unwrap();
    receiving.set_receiver_encryption_key(0, &KEY_B).unwrap();
    let frame_b = sending.encrypt(b"under key b", 0).unwrap();

    // Both keys are live immediately after the rotation.
    assert_eq!(receiving.decrypt(&frame_a, 0).unwrap(), b"under key a");
    assert_eq!(receiving.decrypt(&frame_b, 0).unwrap(), b"under key b");

    std::thread::sleep(timeout + Duration::from_millis(50));

    // The superseded key is gone; the current one keeps working.
    assert_eq!(receiving.decrypt(&frame_a, 0), Err(SframeError::DecryptionFailure));
    assert_eq!(receiving.decrypt(&frame_b, 0).unwrap(), b"under key b");
}

#[test]
fn senders_are_isolated_by_their_key_bindings() {
    let mut sender_one = SframeContext::default();
    sender_one.set_sender_encryption_key(1, &KEY_A).unwrap();
    let mut sender_two = SframeContext::default();
    sender_two.set_sender_encryption_key(2, &KEY_B).unwrap();

    let frame_one = sender_one.encrypt(b"from one", 0).unwrap();
    let frame_two = sender_two.encrypt(b"from two", 0).unwrap();

    let mut receiving = SframeContext::default();
    receiving.set_receiver_encryption_key(1, &KEY_A).unwrap();
    receiving.set_receiver_encryption_key(2, &KEY_B).unwrap();

    assert_eq!(receiving.decrypt(&frame_one, 0).unwrap(), b"from one");
    assert_eq!(receiving.decrypt(&frame_two, 0).unwrap(), b"from two");

    // Swapped bindings must reject both frames.
    let mut swapped = SframeContext::default();
    swapped.set_receiver_encryption_key(1, &KEY_B).unwrap();
    swapped.set_receiver_encryption_key(2, &KEY_A).unwrap();

    assert_eq!(swapped.decrypt(&frame_one, 0), Err(SframeError::DecryptionFailure));
    assert_eq!(swapped.decrypt(&frame_two, 0), Err(SframeError::DecryptionFailure));
}

#[test]
fn deleted_receiver_stops_decrypting() {
    let (mut sending, mut receiving) = linked_pair(CipherSuiteVariant::default(), 6, &KEY_A);

    let frame = sending.encrypt(b"frame", 0).unwrap();
    assert_eq!(receiving.decrypt(&frame, 0).unwrap(), b"frame");

    assert!(receiving.delete_receiver(6));
    assert_eq!(receiving.decrypt(&frame, 0), Err(SframeError::UnknownKeyId { key_id: 6 }));
}

#[test]
fn headers_count_frames_from_zero() {
    let (mut sending, _) = linked_pair(CipherSuiteVariant::default(), 0, &KEY_A);

    for expected in 0u64..4 {
        let frame = sending.encrypt(b"frame", 0).unwrap();
        assert_eq!(SframeHeader::parse(&frame).unwrap().counter(), expected);
    }
}
