//! Mutable diffusion state for the byte transform.
//!
//! A 64-byte table, re-initialized from the key at the start of every
//! encrypt/decrypt call and updated once per processed byte through a
//! three-phase pass. The update folds the ciphertext byte, the trailing
//! output trackers, the feedback scalar, and the keystream byte into
//! every table position, so the mask position chosen for the next byte
//! depends on the accumulated history of all prior bytes. This cascading
//! feedback is what makes the keystream position-dependent rather than a
//! simple counter.

use zeroize::Zeroize;

/// Size of the diffusion state in bytes.
pub(crate) const STATE_LENGTH: usize = 64;

/// Per-call mutable diffusion state.
///
/// Exists only for the duration of one encrypt/decrypt call; never
/// persisted or shared across calls.
pub(crate) struct DiffusionState {
    bytes: [u8; STATE_LENGTH],
}

impl DiffusionState {
    /// Initializes the state from the key.
    ///
    /// Each position is the cyclically indexed key byte exclusive-ored
    /// with a multiple of the position.
    ///
    /// # Parameters
    /// - `key`: The cipher key (must be non-empty).
    pub(crate) fn from_key(key: &[u8]) -> Self {
        debug_assert!(!key.is_empty(), "diffusion state requires a non-empty key");

        let mut bytes = [0u8; STATE_LENGTH];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = key[i % key.len()] ^ (i as u8).wrapping_mul(37);
        }
        DiffusionState { bytes }
    }

    /// Returns the state byte at `position`.
    pub(crate) fn byte(&self, position: usize) -> u8 {
        self.bytes[position]
    }

    /// Evolves the state after one processed byte.
    ///
    /// Three phases over the full table:
    /// 1. Forward pass: every byte is exclusive-ored with a value built
    ///    from the transform output, the composite of the three trailing
    ///    outputs, the feedback scalar and the keystream byte, and its
    ///    index, then rotated left by `index mod 5`.
    /// 2. On every fourth iteration (`iteration mod 4 == 3`), the whole
    ///    table is permuted from a snapshot: position `index` is
    ///    reassigned from `(index*13 + iteration) mod 64`, exclusive-ored
    ///    with the complement of the transform output.
    /// 3. Reverse pass: a position- and feedback-dependent value is added
    ///    to every byte, then rotated right by `index mod 7`.
    ///
    /// # Parameters
    /// - `output`: The transform output byte (ciphertext side).
    /// - `prev1`, `prev2`, `prev3`: Trailing output trackers, pre-shift.
    /// - `feedback`: The feedback scalar, pre-update.
    /// - `stream_byte`: The keystream byte drawn for this iteration.
    /// - `iteration`: The zero-based byte index within the call.
    pub(crate) fn update(
        &mut self,
        output: u8,
        prev1: u8,
        prev2: u8,
        prev3: u8,
        feedback: u8,
        stream_byte: u8,
        iteration: usize,
    ) {
        let composite = prev1 ^ prev2 ^ prev3 ^ feedback ^ stream_byte;

        // Phase 1: forward masking pass.
        for (index, byte) in self.bytes.iter_mut().enumerate() {
            let value = output ^ composite ^ (index as u8).wrapping_mul(3);
            *byte = (*byte ^ value).rotate_left((index % 5) as u32);
        }

        // Phase 2: full-table permutation every fourth byte.
        if iteration % 4 == 3 {
            let snapshot = self.bytes;
            for (index, byte) in self.bytes.iter_mut().enumerate() {
                let swap = (index * 13 + iteration) % STATE_LENGTH;
                *byte = snapshot[swap] ^ !output;
            }
        }

        // Phase 3: reverse additive pass.
        for index in (0..STATE_LENGTH).rev() {
            let addend = feedback.wrapping_add((index as u8).wrapping_mul(7));
            self.bytes[index] = self.bytes[index]
                .wrapping_add(addend)
                .rotate_right((index % 7) as u32);
        }
    }
}

impl Drop for DiffusionState {
    /// Clears the state table on drop.
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
