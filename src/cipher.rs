//! SymmetricMorph: bespoke symmetric stream cipher with feedback masking.
//!
//! Orchestrates the key derivation function, the per-call keystream
//! generator, the diffusion state, and the accumulator MAC. A cipher
//! instance is constructed once from a derived or raw key and holds that
//! key immutably for its whole lifetime; every encrypt/decrypt call
//! allocates its own keystream, diffusion state, trackers, and MAC
//! accumulator, so a single instance is safe to share across threads.

use zeroize::Zeroize;

use crate::error::SymmetricMorphError;
use crate::kdf;
use crate::random::entropy;
use crate::random::keystream::Keystream;
use crate::state::{DiffusionState, STATE_LENGTH};

/// Length of the nonce prefix in a ciphertext record.
pub const NONCE_LENGTH: usize = 8;

/// Length of the authentication tag in a ciphertext record.
pub const MAC_LENGTH: usize = 32;

/// Minimum valid length of a ciphertext record (nonce plus tag).
pub const MIN_RECORD_LENGTH: usize = NONCE_LENGTH + MAC_LENGTH;

/// Default number of key-derivation mixing rounds.
pub const DEFAULT_ITERATIONS: u32 = 20_000;

/// Default derived key length in bytes.
pub const DEFAULT_KEY_LENGTH: usize = 64;

/// Length of a generated salt in bytes.
pub const SALT_LENGTH: usize = 24;

/// Initial value of the feedback scalar.
const FEEDBACK_SEED: u8 = 0xA5;

/// Initial values of the three trailing-output trackers.
const TRACKER_SEEDS: (u8, u8, u8) = (0x3C, 0x5A, 0x96);

/// Initial value of the MAC accumulator.
const MAC_SEED: u8 = 0x1B;

/// Direction of the byte transform.
#[derive(Clone, Copy)]
enum Mode {
    Encrypt,
    Decrypt,
}

/// Bespoke symmetric stream cipher with feedback-driven masking and an
/// accumulator MAC.
///
/// # Wire format
///
/// [`encrypt`](Self::encrypt) produces and [`decrypt`](Self::decrypt)
/// consumes records of the form
/// `nonce (8 bytes) || mac (32 bytes) || ciphertext (N bytes)`, with a
/// minimum valid length of 40 bytes (`N` may be 0).
///
/// # Key handling
///
/// The key is owned exclusively by the instance, never mutated after
/// construction, never emitted in any output, and wiped from memory on
/// drop. The salt used by password derivation is *not* embedded in
/// ciphertext records; callers must retain it to decrypt later.
pub struct SymmetricMorph {
    key: Vec<u8>,
}

impl SymmetricMorph {
    /// Creates a cipher from a password with a freshly generated salt,
    /// using the default 20000 iterations and 64-byte key.
    ///
    /// # Returns
    /// The cipher and the generated salt. The caller must persist the
    /// salt alongside the ciphertext if decryption is ever needed; it is
    /// public data and is not embedded in encrypt output.
    ///
    /// # Examples
    ///
    /// ```
    /// use symmetricmorph::SymmetricMorph;
    ///
    /// let (cipher, salt) = SymmetricMorph::from_password("secret");
    /// assert_eq!(salt.len(), symmetricmorph::SALT_LENGTH);
    /// let record = cipher.encrypt(b"hello");
    /// # let _ = record;
    /// ```
    pub fn from_password(password: &str) -> (Self, Vec<u8>) {
        Self::from_password_with_params(password, DEFAULT_ITERATIONS, DEFAULT_KEY_LENGTH)
    }

    /// Creates a cipher from a password with a freshly generated salt and
    /// explicit derivation parameters.
    ///
    /// # Parameters
    /// - `password`: The password string.
    /// - `iterations`: Number of key-derivation mixing rounds.
    /// - `key_length`: Derived key length in bytes (minimum 1).
    ///
    /// # Panics
    /// Panics if `key_length` is 0.
    pub fn from_password_with_params(
        password: &str,
        iterations: u32,
        key_length: usize,
    ) -> (Self, Vec<u8>) {
        let salt = entropy::generate_salt();
        let cipher =
            Self::from_password_with_salt_and_params(password, &salt, iterations, key_length);
        (cipher, salt)
    }

    /// Re-derives a cipher from a password and a previously stored salt,
    /// using the default 20000 iterations and 64-byte key.
    ///
    /// Deterministic: the same `(password, salt)` pair always produces a
    /// cipher with a byte-identical key, so ciphertext produced by the
    /// original [`from_password`](Self::from_password) instance decrypts
    /// here.
    ///
    /// # Examples
    ///
    /// ```
    /// use symmetricmorph::SymmetricMorph;
    ///
    /// let (cipher, salt) = SymmetricMorph::from_password("secret");
    /// let record = cipher.encrypt(b"hello");
    ///
    /// let rederived = SymmetricMorph::from_password_with_salt("secret", &salt);
    /// assert_eq!(rederived.decrypt(&record).unwrap(), b"hello");
    /// ```
    pub fn from_password_with_salt(password: &str, salt: &[u8]) -> Self {
        Self::from_password_with_salt_and_params(
            password,
            salt,
            DEFAULT_ITERATIONS,
            DEFAULT_KEY_LENGTH,
        )
    }

    /// Re-derives a cipher from a password, a stored salt, and explicit
    /// derivation parameters.
    ///
    /// # Parameters
    /// - `password`: The password string.
    /// - `salt`: The salt stored at encryption time.
    /// - `iterations`: Number of key-derivation mixing rounds.
    /// - `key_length`: Derived key length in bytes (minimum 1).
    ///
    /// # Panics
    /// Panics if `key_length` is 0.
    pub fn from_password_with_salt_and_params(
        password: &str,
        salt: &[u8],
        iterations: u32,
        key_length: usize,
    ) -> Self {
        assert!(key_length > 0, "key length must be at least 1 byte");
        let key = kdf::derive_key(password.as_bytes(), salt, iterations, key_length);
        SymmetricMorph { key }
    }

    /// Creates a cipher bound directly to a raw key, bypassing password
    /// derivation. No salt is involved.
    ///
    /// # Parameters
    /// - `key`: The raw key bytes (any non-zero length; 64 bytes via
    ///   [`generate_key`](Self::generate_key) is the intended use).
    ///
    /// # Panics
    /// Panics if `key` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use symmetricmorph::SymmetricMorph;
    ///
    /// let key = SymmetricMorph::generate_key(64);
    /// let cipher = SymmetricMorph::from_key(&key);
    /// let record = cipher.encrypt(b"raw key mode");
    /// assert_eq!(cipher.decrypt(&record).unwrap(), b"raw key mode");
    /// ```
    pub fn from_key(key: &[u8]) -> Self {
        assert!(!key.is_empty(), "key must not be empty");
        SymmetricMorph { key: key.to_vec() }
    }

    /// Produces `length` pseudo-random key bytes, intended for raw-key
    /// mode.
    ///
    /// KNOWN WEAKNESS: the generator is seeded from a coarse wall-clock
    /// reading, not from a cryptographically strong entropy source. This
    /// reproduces the original design; see the crate documentation.
    ///
    /// # Parameters
    /// - `length`: Number of key bytes to generate (default usage is 64).
    pub fn generate_key(length: usize) -> Vec<u8> {
        entropy::random_bytes(length)
    }

    /// Encrypts a plaintext into a self-contained ciphertext record.
    ///
    /// Generates a fresh nonce, runs the byte transform over the
    /// plaintext, and appends the accumulator MAC. Always succeeds; the
    /// output is exactly `40 + plaintext.len()` bytes.
    ///
    /// # Parameters
    /// - `plaintext`: The bytes to encrypt (may be empty).
    ///
    /// # Returns
    /// The record `nonce || mac || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let nonce = entropy::generate_nonce();
        let (payload, mac_acc) = self.transform(plaintext, &nonce, Mode::Encrypt);
        let tag = self.authentication_tag(mac_acc);

        let mut record = Vec::with_capacity(MIN_RECORD_LENGTH + payload.len());
        record.extend_from_slice(&nonce);
        record.extend_from_slice(&tag);
        record.extend_from_slice(&payload);
        record
    }

    /// Decrypts a ciphertext record, verifying its authentication tag.
    ///
    /// The tag is recomputed from the ciphertext byte stream and compared
    /// to the embedded tag in constant time, so a mismatch does not leak
    /// the position of the first differing byte.
    ///
    /// # Parameters
    /// - `record`: A record produced by [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    /// - [`SymmetricMorphError::TruncatedRecord`] if the input is shorter
    ///   than 40 bytes; raised before any cryptographic work.
    /// - [`SymmetricMorphError::TagMismatch`] if the tag does not match.
    ///   The partially computed plaintext is wiped, never returned.
    pub fn decrypt(&self, record: &[u8]) -> Result<Vec<u8>, SymmetricMorphError> {
        if record.len() < MIN_RECORD_LENGTH {
            return Err(SymmetricMorphError::TruncatedRecord {
                length: record.len(),
            });
        }

        let mut nonce = [0u8; NONCE_LENGTH];
        nonce.copy_from_slice(&record[..NONCE_LENGTH]);
        let embedded_tag = &record[NONCE_LENGTH..MIN_RECORD_LENGTH];
        let payload = &record[MIN_RECORD_LENGTH..];

        let (mut plaintext, mac_acc) = self.transform(payload, &nonce, Mode::Decrypt);
        let expected_tag = self.authentication_tag(mac_acc);

        if !tags_match(&expected_tag, embedded_tag) {
            plaintext.zeroize();
            return Err(SymmetricMorphError::TagMismatch);
        }
        Ok(plaintext)
    }

    /// Encrypts each chunk independently.
    ///
    /// Every chunk gets its own fresh nonce and its own full
    /// state/feedback/MAC lifecycle; no state crosses chunk boundaries,
    /// so chunks may later be decrypted in any order or in parallel by
    /// the caller.
    ///
    /// # Parameters
    /// - `chunks`: The plaintext chunks.
    ///
    /// # Returns
    /// One ciphertext record per chunk, in the same order.
    pub fn encrypt_chunks<T: AsRef<[u8]>>(&self, chunks: &[T]) -> Vec<Vec<u8>> {
        chunks.iter().map(|c| self.encrypt(c.as_ref())).collect()
    }

    /// Decrypts each chunk independently, stopping at the first failure.
    ///
    /// Decrypting chunk `k` has no dependency on any other chunk: a
    /// corrupted chunk only fails its own decrypt call, and the remaining
    /// chunks stay individually decryptable via
    /// [`decrypt`](Self::decrypt).
    ///
    /// # Parameters
    /// - `chunks`: Ciphertext records produced by
    ///   [`encrypt_chunks`](Self::encrypt_chunks).
    ///
    /// # Errors
    /// The first [`SymmetricMorphError`] encountered, if any chunk is
    /// truncated or fails tag verification.
    pub fn decrypt_chunks<T: AsRef<[u8]>>(
        &self,
        chunks: &[T],
    ) -> Result<Vec<Vec<u8>>, SymmetricMorphError> {
        chunks.iter().map(|c| self.decrypt(c.as_ref())).collect()
    }

    /// Runs the byte transform in the given direction.
    ///
    /// The keystream is seeded from `key ++ nonce`, and the diffusion
    /// state is initialized from the key. On encrypt, the produced
    /// ciphertext byte drives the feedback chain; on decrypt, the
    /// consumed ciphertext byte does. Both sides therefore evolve the
    /// state, trackers, feedback, and MAC accumulator along the identical
    /// trajectory without transmitting any internal state.
    ///
    /// # Returns
    /// The transformed bytes and the final MAC accumulator value.
    fn transform(&self, data: &[u8], nonce: &[u8; NONCE_LENGTH], mode: Mode) -> (Vec<u8>, u8) {
        let mut seed = Vec::with_capacity(self.key.len() + NONCE_LENGTH);
        seed.extend_from_slice(&self.key);
        seed.extend_from_slice(nonce);
        let mut stream = Keystream::seeded(&seed);
        seed.zeroize();

        let mut state = DiffusionState::from_key(&self.key);
        let mut feedback = FEEDBACK_SEED;
        let (mut prev1, mut prev2, mut prev3) = TRACKER_SEEDS;
        let mut mac_acc = MAC_SEED;

        let mut output = Vec::with_capacity(data.len());
        for (i, &byte) in data.iter().enumerate() {
            let stream_byte = stream.next_byte();
            let position = i
                .wrapping_add(feedback as usize)
                .wrapping_add(prev1 as usize)
                .wrapping_add(prev2 as usize)
                % STATE_LENGTH;
            let mask = state.byte(position) ^ feedback ^ prev1 ^ prev2 ^ prev3;
            let rotation = (i % 5) as u32;

            // `produced` is what this call emits; `chained` is the
            // ciphertext-side byte that both directions agree on.
            let (produced, chained) = match mode {
                Mode::Encrypt => {
                    let ciphertext_byte = (byte ^ mask ^ stream_byte).rotate_left(rotation);
                    (ciphertext_byte, ciphertext_byte)
                }
                Mode::Decrypt => {
                    let plaintext_byte = byte.rotate_right(rotation) ^ mask ^ stream_byte;
                    (plaintext_byte, byte)
                }
            };
            output.push(produced);

            state.update(chained, prev1, prev2, prev3, feedback, stream_byte, i);

            prev3 = prev2;
            prev2 = prev1;
            prev1 = chained;
            feedback = feedback ^ chained ^ stream_byte ^ (i as u8).wrapping_mul(13);
            mac_acc = mac_acc
                .wrapping_add(chained)
                .wrapping_add(feedback)
                .wrapping_add((i as u8).wrapping_mul(31))
                ^ stream_byte.wrapping_add(prev1).wrapping_add(prev2);
        }

        (output, mac_acc)
    }

    /// Expands the final MAC accumulator into the 32-byte tag.
    fn authentication_tag(&self, mac_acc: u8) -> [u8; MAC_LENGTH] {
        let mut tag = [0u8; MAC_LENGTH];
        for (j, byte) in tag.iter_mut().enumerate() {
            *byte = mac_acc ^ self.key[j % self.key.len()] ^ (j as u8).wrapping_mul(19);
        }
        tag
    }
}

impl Drop for SymmetricMorph {
    /// Wipes the key from memory on drop.
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Constant-time tag comparison.
///
/// Accumulates the bitwise-or of pairwise exclusive-ors across all bytes
/// so the comparison cost does not depend on where a mismatch occurs.
/// Lengths are checked for equality before any byte is compared.
fn tags_match(expected: &[u8], embedded: &[u8]) -> bool {
    if expected.len() != embedded.len() {
        return false;
    }
    let mut difference = 0u8;
    for (a, b) in expected.iter().zip(embedded.iter()) {
        difference |= a ^ b;
    }
    difference == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_cipher() -> SymmetricMorph {
        let key: Vec<u8> = (0u8..64).map(|i| i.wrapping_mul(41).wrapping_add(7)).collect();
        SymmetricMorph::from_key(&key)
    }

    #[test]
    fn test_record_layout_and_length() {
        let cipher = raw_cipher();
        for length in [0usize, 1, 22, 255, 1024] {
            let plaintext = vec![0x7Eu8; length];
            let record = cipher.encrypt(&plaintext);
            assert_eq!(record.len(), MIN_RECORD_LENGTH + length);
        }
    }

    #[test]
    fn test_roundtrip_raw_key() {
        let cipher = raw_cipher();
        let plaintext = b"the quick brown fox jumps over the lazy dog";
        let record = cipher.encrypt(plaintext);
        assert_eq!(cipher.decrypt(&record).unwrap(), plaintext);
    }

    #[test]
    fn test_roundtrip_empty_plaintext() {
        let cipher = raw_cipher();
        let record = cipher.encrypt(b"");
        assert_eq!(record.len(), MIN_RECORD_LENGTH);
        assert_eq!(cipher.decrypt(&record).unwrap(), b"");
    }

    #[test]
    fn test_roundtrip_single_byte() {
        let cipher = raw_cipher();
        for byte in [0x00u8, 0x01, 0x7F, 0x80, 0xFF] {
            let record = cipher.encrypt(&[byte]);
            assert_eq!(cipher.decrypt(&record).unwrap(), vec![byte]);
        }
    }

    #[test]
    fn test_ciphertext_differs_from_plaintext() {
        let cipher = raw_cipher();
        let plaintext = vec![0xAAu8; 256];
        let record = cipher.encrypt(&plaintext);
        assert_ne!(&record[MIN_RECORD_LENGTH..], plaintext.as_slice());
    }

    #[test]
    fn test_truncated_record_rejected() {
        let cipher = raw_cipher();
        for length in [0usize, 1, 8, 39] {
            let short = vec![0u8; length];
            let result = cipher.decrypt(&short);
            assert_eq!(
                result,
                Err(SymmetricMorphError::TruncatedRecord { length }),
                "length {} should be rejected as truncated",
                length
            );
        }
    }

    #[test]
    fn test_minimum_length_record_is_well_formed() {
        // 40 zero bytes is long enough to parse; it fails on the tag,
        // not on the format.
        let cipher = raw_cipher();
        assert_eq!(
            cipher.decrypt(&[0u8; MIN_RECORD_LENGTH]),
            Err(SymmetricMorphError::TagMismatch)
        );
    }

    #[test]
    fn test_corrupted_payload_rejected() {
        // The accumulator is one byte, so a payload flip escapes with
        // probability about 1/256; bound the misses over 16 flips
        // instead of demanding zero.
        let cipher = raw_cipher();
        let record = cipher.encrypt(b"integrity matters");
        let mut missed = 0;
        for &index in &[MIN_RECORD_LENGTH, record.len() - 1] {
            for bit in 0..8 {
                let mut tampered = record.clone();
                tampered[index] ^= 1u8 << bit;
                if cipher.decrypt(&tampered).is_ok() {
                    missed += 1;
                }
            }
        }
        assert!(missed <= 3, "{} of 16 payload flips went undetected", missed);
    }

    #[test]
    fn test_corrupted_tag_rejected() {
        let cipher = raw_cipher();
        let mut record = cipher.encrypt(b"integrity matters");
        record[NONCE_LENGTH] ^= 0x80;
        assert_eq!(
            cipher.decrypt(&record),
            Err(SymmetricMorphError::TagMismatch)
        );
    }

    #[test]
    fn test_instance_reusable_after_failure() {
        let cipher = raw_cipher();
        let mut corrupted = cipher.encrypt(b"first");
        corrupted[NONCE_LENGTH] ^= 0xFF;
        assert!(cipher.decrypt(&corrupted).is_err());

        let record = cipher.encrypt(b"second");
        assert_eq!(cipher.decrypt(&record).unwrap(), b"second");
    }

    #[test]
    fn test_wrong_key_rejected() {
        let cipher = raw_cipher();
        let other = SymmetricMorph::from_key(&[0x42u8; 64]);
        let record = cipher.encrypt(b"for the right key only");
        assert_eq!(
            other.decrypt(&record),
            Err(SymmetricMorphError::TagMismatch)
        );
    }

    #[test]
    fn test_chunks_preserve_order_and_count() {
        let cipher = raw_cipher();
        let chunks: Vec<&[u8]> = vec![b"alpha", b"", b"gamma", b"delta-delta"];
        let records = cipher.encrypt_chunks(&chunks);
        assert_eq!(records.len(), chunks.len());

        let recovered = cipher.decrypt_chunks(&records).unwrap();
        for (original, decrypted) in chunks.iter().zip(recovered.iter()) {
            assert_eq!(original, &decrypted.as_slice());
        }
    }

    #[test]
    fn test_chunk_corruption_does_not_affect_others() {
        let cipher = raw_cipher();
        let chunks: Vec<&[u8]> = vec![b"chunk-a", b"chunk-b", b"chunk-c"];
        let mut records = cipher.encrypt_chunks(&chunks);
        // Tag corruption is always caught; see the tamper tests for the
        // probabilistic payload/nonce cases.
        records[0][NONCE_LENGTH] ^= 0x10;
        records[2][NONCE_LENGTH] ^= 0x10;

        assert!(cipher.decrypt(&records[0]).is_err());
        assert_eq!(cipher.decrypt(&records[1]).unwrap(), b"chunk-b");
        assert!(cipher.decrypt(&records[2]).is_err());
    }

    #[test]
    fn test_generate_key_length() {
        for length in [1usize, 16, 64, 128] {
            assert_eq!(SymmetricMorph::generate_key(length).len(), length);
        }
    }

    #[test]
    #[should_panic(expected = "key must not be empty")]
    fn test_from_key_rejects_empty_key() {
        let _ = SymmetricMorph::from_key(&[]);
    }

    #[test]
    fn test_tags_match_constant_time_fold() {
        assert!(tags_match(&[1, 2, 3], &[1, 2, 3]));
        assert!(!tags_match(&[1, 2, 3], &[1, 2, 4]));
        assert!(!tags_match(&[1, 2, 3], &[1, 2]));
        assert!(tags_match(&[], &[]));
    }

    #[test]
    fn test_short_key_roundtrip() {
        // Keys shorter than the 64-byte state are indexed cyclically.
        let cipher = SymmetricMorph::from_key(b"short");
        let record = cipher.encrypt(b"cyclic key indexing");
        assert_eq!(cipher.decrypt(&record).unwrap(), b"cyclic key indexing");
    }
}
