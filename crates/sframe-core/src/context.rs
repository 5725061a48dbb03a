//! Context facade: one sender, many receivers.
//!
//! A context covers one peer/direction. Outbound frames go through its
//! single [`Sender`]; inbound frames are routed to the [`Receiver`]
//! registered under the key id parsed from the leading SFrame header.
//! This library deliberately uses the header's key id field to carry the
//! sender identity, so interoperating systems must mirror that convention.

use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::{
    error::{Result, SframeError},
    header::SframeHeader,
    receiver::{KEY_TIMEOUT, Receiver},
    sender::Sender,
    suite::{CipherSuite, CipherSuiteVariant},
};

/// Entry point for SFrame operations.
///
/// All receivers created by the context share its cipher-suite variant
/// and key-retirement timeout.
pub struct SframeContext {
    variant: CipherSuiteVariant,
    key_timeout: Duration,
    sender: Option<Sender>,
    receivers: HashMap<u64, Receiver>,
}

impl SframeContext {
    /// Create a context for the given cipher-suite variant.
    #[must_use]
    pub fn new(variant: CipherSuiteVariant) -> Self {
        Self::with_key_timeout(variant, KEY_TIMEOUT)
    }

    /// Create a context with a custom key-retirement timeout for its
    /// receivers. Intended for tests; production code wants [`Self::new`].
    #[must_use]
    pub fn with_key_timeout(variant: CipherSuiteVariant, key_timeout: Duration) -> Self {
        Self { variant, key_timeout, sender: None, receivers: HashMap::new() }
    }

    /// The cipher-suite variant this context operates with.
    #[must_use]
    pub fn variant(&self) -> CipherSuiteVariant {
        self.variant
    }

    /// Install or replace the sender key, creating the sender on first use.
    ///
    /// `sender_id` is emitted as the key id in every outbound header. The
    /// frame counter survives re-keying.
    ///
    /// # Errors
    ///
    /// - `SframeError::InvalidKeyLength` if `key_material` is too short
    ///   for the variant
    pub fn set_sender_encryption_key(&mut self, sender_id: u64, key_material: &[u8]) -> Result<()> {
        let suite = CipherSuite::derive(self.variant, key_material)?;
        match &mut self.sender {
            Some(sender) => {
                sender.set_sender_id(sender_id);
                sender.set_encryption_key(suite);
            },
            None => {
                let mut sender = Sender::new(sender_id);
                sender.set_encryption_key(suite);
                self.sender = Some(sender);
            },
        }
        tracing::debug!(sender_id, "installed sender encryption key");
        Ok(())
    }

    /// Install a key for inbound frames carrying `key_id`, creating the
    /// receiver if needed and appending to its keyring otherwise.
    ///
    /// # Errors
    ///
    /// - `SframeError::InvalidKeyLength` if `key_material` is too short
    ///   for the variant
    pub fn set_receiver_encryption_key(&mut self, key_id: u64, key_material: &[u8]) -> Result<()> {
        let suite = CipherSuite::derive(self.variant, key_material)?;
        let receiver = self
            .receivers
            .entry(key_id)
            .or_insert_with(|| Receiver::with_key_timeout(key_id, self.key_timeout));
        receiver.set_encryption_key(Arc::new(suite));
        tracing::debug!(key_id, keys = receiver.key_count(), "installed receiver encryption key");
        Ok(())
    }

    /// Remove the receiver registered under `key_id`.
    ///
    /// Returns whether a receiver existed. Frames for that key id fail
    /// with `UnknownKeyId` afterwards.
    pub fn delete_receiver(&mut self, key_id: u64) -> bool {
        let existed = self.receivers.remove(&key_id).is_some();
        if existed {
            tracing::debug!(key_id, "deleted receiver");
        }
        existed
    }

    /// Whether a sender key is installed.
    #[must_use]
    pub fn can_encrypt(&self) -> bool {
        self.sender.as_ref().is_some_and(Sender::has_key)
    }

    /// Whether a receiver is registered under `key_id`.
    #[must_use]
    pub fn can_decrypt(&self, key_id: u64) -> bool {
        self.receivers.contains_key(&key_id)
    }

    /// Encrypt one frame, leaving the first `skip` bytes in the clear.
    ///
    /// # Errors
    ///
    /// - `SframeError::NoSenderKey` if no sender key is installed
    /// - `SframeError::CounterExhausted` once the frame counter is spent
    /// - `SframeError::FrameTooShort` if `skip` exceeds the plaintext
    pub fn encrypt(&mut self, plaintext: &[u8], skip: usize) -> Result<Vec<u8>> {
        let Some(sender) = &mut self.sender else {
            return Err(SframeError::NoSenderKey);
        };
        sender.encrypt(plaintext, skip)
    }

    /// Decrypt one frame whose SFrame header starts at `frame[skip..]`.
    ///
    /// # Errors
    ///
    /// - `SframeError::FrameTooShort` if the frame cannot hold the header
    /// - `SframeError::UnknownKeyId` if no receiver matches the header
    /// - `SframeError::ReplayAttack` / `SframeError::DecryptionFailure`
    ///   from the receiver
    pub fn decrypt(&mut self, frame: &[u8], skip: usize) -> Result<Vec<u8>> {
        let header = Self::parse_header(frame, skip)?;
        let Some(receiver) = self.receivers.get_mut(&header.key_id()) else {
            return Err(SframeError::UnknownKeyId { key_id: header.key_id() });
        };
        receiver.decrypt(&header, frame, skip)
    }

    /// Read the key id from a frame without decrypting it.
    ///
    /// # Errors
    ///
    /// - `SframeError::FrameTooShort` if the frame cannot hold the header
    pub fn read_key_id(frame: &[u8], skip: usize) -> Result<u64> {
        Ok(Self::parse_header(frame, skip)?.key_id())
    }

    fn parse_header(frame: &[u8], skip: usize) -> Result<SframeHeader> {
        if frame.len() < skip {
            return Err(SframeError::FrameTooShort { expected: skip, actual: frame.len() });
        }
        SframeHeader::parse(&frame[skip..])
    }
}

impl Default for SframeContext {
    /// Context with the default variant, `AES_GCM_256_SHA512`.
    fn default() -> Self {
        Self::new(CipherSuiteVariant::default())
    }
}
