//! Inbound frame verification with a rolling keyring.
//!
//! A receiver holds every key currently usable for one sender identity,
//! oldest first. Installing a new key does not drop the old ones
//! immediately - frames encrypted under the previous key may still be in
//! flight - instead the keys older than the new one are retired after
//! [`KEY_TIMEOUT`].
//!
//! Retirement is expressed as deadline entries swept on the next decrypt
//! rather than as timers. Each entry holds a [`Weak`] reference to the key
//! whose installation created it: when the deadline fires, all keys
//! strictly older than that key are dropped. Re-installing the same key
//! instance never resets its deadline.
//!
//! # Invariants
//!
//! - The newest key sits at the keyring tail and is never retired
//! - `max_received_counter` only moves forward, and only on successful
//!   decryption
//! - A frame more than [`REPLAY_WINDOW`] counters behind the maximum is
//!   rejected before any key is tried

use std::{
    sync::{Arc, Weak},
    time::{Duration, Instant},
};

use crate::{
    crypto,
    error::{Result, SframeError},
    header::SframeHeader,
    suite::CipherSuite,
};

/// Tolerated backwards distance from the highest accepted counter.
pub const REPLAY_WINDOW: u64 = 128;

/// How long superseded keys remain usable after a newer key is installed.
pub const KEY_TIMEOUT: Duration = Duration::from_millis(1000);

/// One pending retirement: when `deadline` passes, every key older than
/// `boundary` is dropped from the keyring.
struct Retirement {
    boundary: Weak<CipherSuite>,
    deadline: Instant,
}

/// Decrypts inbound frames for one sender identity.
pub struct Receiver {
    key_id: u64,
    max_received_counter: Option<u64>,
    keyring: Vec<Arc<CipherSuite>>,
    retirements: Vec<Retirement>,
    key_timeout: Duration,
}

impl Receiver {
    /// Create a receiver with an empty keyring and the default
    /// [`KEY_TIMEOUT`].
    #[must_use]
    pub fn new(key_id: u64) -> Self {
        Self::with_key_timeout(key_id, KEY_TIMEOUT)
    }

    /// Create a receiver with a custom retirement timeout.
    ///
    /// Production code wants the default; tests shorten it so rotation
    /// coverage does not sleep for a full second.
    #[must_use]
    pub fn with_key_timeout(key_id: u64, key_timeout: Duration) -> Self {
        Self {
            key_id,
            max_received_counter: None,
            keyring: Vec::new(),
            retirements: Vec::new(),
            key_timeout,
        }
    }

    /// Key id this receiver is registered under.
    #[must_use]
    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    /// Number of keys currently in the keyring.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keyring.len()
    }

    /// Append a key to the keyring.
    ///
    /// If older keys exist they are scheduled for retirement one
    /// `key_timeout` from now, unless this exact instance already has a
    /// pending retirement (instance identity, not key material).
    pub fn set_encryption_key(&mut self, suite: Arc<CipherSuite>) {
        self.keyring.push(Arc::clone(&suite));

        if self.keyring.len() > 1 && !self.is_scheduled(&suite) {
            self.retirements.push(Retirement {
                boundary: Arc::downgrade(&suite),
                deadline: Instant::now() + self.key_timeout,
            });
            tracing::debug!(
                key_id = self.key_id,
                keys = self.keyring.len(),
                "scheduled retirement of superseded keys"
            );
        }
    }

    fn is_scheduled(&self, suite: &Arc<CipherSuite>) -> bool {
        self.retirements
            .iter()
            .any(|r| r.boundary.upgrade().is_some_and(|k| Arc::ptr_eq(&k, suite)))
    }

    /// Drop keys whose retirement deadline has passed.
    fn sweep(&mut self, now: Instant) {
        let mut index = 0;
        while index < self.retirements.len() {
            if self.retirements[index].deadline > now {
                index += 1;
                continue;
            }

            let fired = self.retirements.remove(index);
            // The boundary key may itself have been retired by a later
            // rotation already; a dangling entry is simply discarded.
            let Some(boundary) = fired.boundary.upgrade() else { continue };
            let Some(position) = self.keyring.iter().position(|k| Arc::ptr_eq(k, &boundary))
            else {
                continue;
            };
            if position > 0 {
                self.keyring.drain(..position);
                tracing::debug!(key_id = self.key_id, retired = position, "retired superseded keys");
            }
        }
    }

    /// Decrypt one frame whose header was parsed from `frame[skip..]`.
    ///
    /// Tries every key in the ring, oldest first; failures of individual
    /// keys are swallowed and only surface as `DecryptionFailure` once the
    /// ring is exhausted. Duplicates inside the replay window are accepted
    /// and decrypted again.
    ///
    /// # Errors
    ///
    /// - `SframeError::ReplayAttack` if the counter is more than
    ///   [`REPLAY_WINDOW`] behind the highest accepted counter
    /// - `SframeError::DecryptionFailure` if no keyring entry accepts the
    ///   frame
    pub fn decrypt(&mut self, header: &SframeHeader, frame: &[u8], skip: usize) -> Result<Vec<u8>> {
        let counter = header.counter();
        if let Some(max) = self.max_received_counter {
            if counter < max && max - counter >= REPLAY_WINDOW {
                return Err(SframeError::ReplayAttack {
                    counter,
                    floor: max - REPLAY_WINDOW + 1,
                });
            }
        }

        self.sweep(Instant::now());

        // The ring is stable for the rest of this call: retirement only
        // runs in the sweep above, so every attempt sees the same keys.
        let mut plaintext = None;
        for suite in &self.keyring {
            match crypto::decrypt_frame(suite, header, frame, skip) {
                Ok(decrypted) => {
                    plaintext = Some(decrypted);
                    break;
                },
                Err(error) => {
                    tracing::trace!(key_id = self.key_id, %error, "keyring entry rejected frame");
                },
            }
        }
        let Some(plaintext) = plaintext else {
            return Err(SframeError::DecryptionFailure);
        };

        self.max_received_counter =
            Some(self.max_received_counter.map_or(counter, |max| max.max(counter)));
        Ok(plaintext)
    }
}
