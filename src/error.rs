//! Error types for the SymmetricMorph library.

use thiserror::Error;

/// Errors produced by the SymmetricMorph library.
///
/// Only two failure modes exist, both raised by [`decrypt`]: a malformed
/// record that is too short to contain a nonce and tag, and an
/// authentication tag mismatch. Neither condition is transient, so no
/// retry is appropriate; both leave the cipher instance fully reusable.
///
/// [`decrypt`]: crate::SymmetricMorph::decrypt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymmetricMorphError {
    /// The ciphertext record is shorter than the 40-byte minimum
    /// (8-byte nonce plus 32-byte tag). Raised before any cryptographic
    /// work is attempted.
    #[error("ciphertext record is {length} bytes, shorter than the 40 byte minimum")]
    TruncatedRecord {
        /// Length of the rejected input.
        length: usize,
    },

    /// The authentication tag does not match the ciphertext. The input
    /// was tampered with, corrupted, or decrypted with the wrong key or
    /// salt. No plaintext is released.
    #[error("authentication tag mismatch")]
    TagMismatch,
}
