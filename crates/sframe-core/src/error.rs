//! Error types for SFrame operations
//!
//! One enum covers the whole pipeline: header parsing, key installation,
//! frame encryption and frame decryption. Errors raised while trying an
//! individual keyring entry are swallowed by the receiver (the next key is
//! tried); everything else propagates to the caller.

use thiserror::Error;

/// A Result with the standard error type for this library.
pub type Result<T> = std::result::Result<T, SframeError>;

/// Errors from SFrame operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SframeError {
    /// Buffer too short to hold a complete header or frame
    #[error("frame too short: need {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Minimum number of bytes required
        expected: usize,
        /// Number of bytes actually available
        actual: usize,
    },

    /// No sender key installed at encrypt time
    #[error("invalid key: no sender encryption key installed")]
    NoSenderKey,

    /// No receiver registered for the key id parsed from an incoming header
    #[error("invalid key: no receiver for key id {key_id}")]
    UnknownKeyId {
        /// Key id carried by the frame header
        key_id: u64,
    },

    /// Key material too short for the selected cipher suite
    #[error("invalid key length: suite needs {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Minimum key material length for the suite
        expected: usize,
        /// Actual key material length
        actual: usize,
    },

    /// Sender frame counter reached the representable maximum
    #[error("sender counter exhausted at {current}")]
    CounterExhausted {
        /// Counter value when exhaustion was detected
        current: u64,
    },

    /// AEAD primitive failure during encryption
    #[error("encryption failure")]
    EncryptionFailure,

    /// Every key in the receiver keyring failed to decrypt the frame
    #[error("decryption failure: no keyring entry accepted the frame")]
    DecryptionFailure,

    /// Truncated HMAC tag did not match the received frame
    #[error("authentication failure: tag mismatch")]
    Authentication,

    /// Header counter fell outside the replay window
    #[error("replay attack: counter {counter} is below window floor {floor}")]
    ReplayAttack {
        /// Counter carried by the rejected frame
        counter: u64,
        /// Smallest counter still accepted
        floor: u64,
    },
}

impl SframeError {
    /// Returns true if this error is fatal (unrecoverable)
    ///
    /// Fatal errors indicate tampering, a broken peer, or an exhausted
    /// resource. Transient errors are expected in normal operation (late
    /// frames, frames arriving before their key is installed) and may
    /// resolve after a rekey or simply by dropping the frame.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Authentication
            | Self::CounterExhausted { .. }
            | Self::EncryptionFailure
            | Self::InvalidKeyLength { .. }
            | Self::NoSenderKey => true,

            // Recoverable - frame may be late or key not yet installed
            Self::DecryptionFailure
            | Self::FrameTooShort { .. }
            | Self::ReplayAttack { .. }
            | Self::UnknownKeyId { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_is_fatal() {
        assert!(SframeError::Authentication.is_fatal());
    }

    #[test]
    fn replay_is_not_fatal() {
        assert!(!SframeError::ReplayAttack { counter: 3, floor: 72 }.is_fatal());
    }

    #[test]
    fn unknown_key_id_is_not_fatal() {
        assert!(!SframeError::UnknownKeyId { key_id: 42 }.is_fatal());
    }

    #[test]
    fn error_display() {
        let err = SframeError::InvalidKeyLength { expected: 32, actual: 16 };
        assert_eq!(err.to_string(), "invalid key length: suite needs 32 bytes, got 16");

        let err = SframeError::UnknownKeyId { key_id: 7 };
        assert_eq!(err.to_string(), "invalid key: no receiver for key id 7");
    }
}
