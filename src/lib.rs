//! SymmetricMorph bespoke symmetric stream cipher engine.
//!
//! SymmetricMorph transforms an arbitrary byte sequence into a ciphertext
//! record that conceals content and carries an integrity tag, and reverses
//! the transform while rejecting tampered input. Every primitive (the key
//! derivation function, the keystream generator, the diffusion state, and
//! the authentication tag) is built from raw byte arithmetic; no
//! established cryptographic library is involved.
//!
//! # Architecture
//!
//! ```text
//! Keystream       (counter-based byte generator, seeded from key ++ nonce)
//!     ↓ one byte per processed byte
//! DiffusionState  (64-byte table, three-phase feedback-driven update)
//!     ↓ position-dependent masking
//! SymmetricMorph  (orchestrator — KDF + byte transform + accumulator MAC)
//! ```
//!
//! The transform chains every ciphertext byte back into the diffusion
//! state, the feedback scalar, and the MAC accumulator, so the masking
//! position for byte `i + 1` depends on every byte processed before it.
//!
//! # Wire format
//!
//! ```text
//! [ nonce: 8 bytes ][ mac: 32 bytes ][ ciphertext: N bytes ]
//! ```
//!
//! # Examples
//!
//! Encrypt and decrypt with a password-derived key:
//!
//! ```
//! use symmetricmorph::SymmetricMorph;
//!
//! let (cipher, salt) = SymmetricMorph::from_password("my_secret_password");
//!
//! let record = cipher.encrypt(b"attack at dawn");
//! assert_eq!(record.len(), 40 + 14);
//!
//! // Re-derive for decryption: the salt must be retained by the caller.
//! let decrypter = SymmetricMorph::from_password_with_salt("my_secret_password", &salt);
//! assert_eq!(decrypter.decrypt(&record).unwrap(), b"attack at dawn");
//! ```
//!
//! Use a raw key, bypassing derivation:
//!
//! ```
//! use symmetricmorph::SymmetricMorph;
//!
//! let key = SymmetricMorph::generate_key(64);
//! let cipher = SymmetricMorph::from_key(&key);
//!
//! let record = cipher.encrypt(b"payload");
//! assert_eq!(cipher.decrypt(&record).unwrap(), b"payload");
//! ```
//!
//! # Security
//!
//! SymmetricMorph is a bespoke, non-standards-based construction with no
//! published security proof. This crate reproduces the exact bit-level
//! algorithm, including its weaknesses (such as the wall-clock entropy
//! source for salts and nonces), to stay interoperable with ciphertext
//! produced by other implementations of the same design.

#![deny(clippy::all)]

pub mod error;

mod cipher;
pub(crate) mod kdf;
pub(crate) mod random;
pub(crate) mod state;

pub use cipher::{
    SymmetricMorph, DEFAULT_ITERATIONS, DEFAULT_KEY_LENGTH, MAC_LENGTH, MIN_RECORD_LENGTH,
    NONCE_LENGTH, SALT_LENGTH,
};
pub use error::SymmetricMorphError;
