//! Outbound frame protection with a per-sender monotonic counter.

use crate::{
    crypto,
    error::{Result, SframeError},
    header::SframeHeader,
    suite::CipherSuite,
};

/// Encrypts outbound frames for one sender identity.
///
/// The frame counter starts at zero, increments by one per encrypted
/// frame, and is never reset - not by re-keying and not by changing the
/// sender id. When it reaches the representable maximum the next encrypt
/// fails instead of wrapping.
pub struct Sender {
    sender_id: u64,
    counter: u64,
    key: Option<CipherSuite>,
}

impl Sender {
    /// Create a sender with no key installed.
    #[must_use]
    pub fn new(sender_id: u64) -> Self {
        Self { sender_id, counter: 0, key: None }
    }

    /// Sender identity, carried as the key id in every emitted header.
    #[must_use]
    pub fn sender_id(&self) -> u64 {
        self.sender_id
    }

    /// Replace the sender identity. The counter keeps its value.
    pub fn set_sender_id(&mut self, sender_id: u64) {
        self.sender_id = sender_id;
    }

    /// Install or replace the encryption key.
    pub fn set_encryption_key(&mut self, suite: CipherSuite) {
        self.key = Some(suite);
    }

    /// Whether an encryption key is installed.
    #[must_use]
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Encrypt one frame, leaving the first `skip` bytes in the clear.
    ///
    /// # Errors
    ///
    /// - `SframeError::NoSenderKey` if no key is installed
    /// - `SframeError::CounterExhausted` once the counter hits `u64::MAX`
    /// - `SframeError::FrameTooShort` if `skip` exceeds the plaintext
    pub fn encrypt(&mut self, plaintext: &[u8], skip: usize) -> Result<Vec<u8>> {
        let Some(key) = &self.key else {
            return Err(SframeError::NoSenderKey);
        };
        if self.counter == u64::MAX {
            return Err(SframeError::CounterExhausted { current: self.counter });
        }

        let counter = self.counter;
        self.counter += 1;

        let header = SframeHeader::new(self.sender_id, counter);
        crypto::encrypt_frame(key, &header, plaintext, skip)
    }
}
