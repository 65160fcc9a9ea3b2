//! Counter-based keystream generator.
//!
//! Produces an unbounded, fully deterministic sequence of pseudo-random
//! bytes from a seed, one byte per call, with no backtracking. The cipher
//! seeds one generator per encrypt/decrypt call from `key ++ nonce`; the
//! entropy module seeds it from a coarse wall-clock reading.

use zeroize::Zeroize;

/// Size of the internal mixing table in bytes.
const TABLE_LENGTH: usize = 64;

/// Deterministic pseudo-random byte generator.
///
/// Maintains a 64-byte table and a call counter. Every drawn byte folds
/// back into the table, so the sequence depends on the whole seed and on
/// how many bytes have been consumed, never on external state.
pub(crate) struct Keystream {
    table: [u8; TABLE_LENGTH],
    counter: u64,
}

impl Keystream {
    /// Creates a generator from the given seed bytes.
    ///
    /// Seeding walks `max(64, seed.len())` positions so that a seed
    /// shorter than the table is recycled cyclically and a seed longer
    /// than the table (key ++ nonce) contributes every byte. Each seed
    /// byte is scaled by an odd position-dependent multiplier before
    /// being folded into its table slot.
    ///
    /// # Parameters
    /// - `seed`: The seed bytes (must be non-empty).
    pub(crate) fn seeded(seed: &[u8]) -> Self {
        debug_assert!(!seed.is_empty(), "keystream seed must not be empty");

        let mut table = [0u8; TABLE_LENGTH];
        let span = TABLE_LENGTH.max(seed.len());
        for i in 0..span {
            let seed_byte = seed[i % seed.len()];
            let multiplier = ((i as u8) << 1) | 1;
            let slot = i % TABLE_LENGTH;
            table[slot] = table[slot].wrapping_add(seed_byte.wrapping_mul(multiplier)) ^ (i as u8);
        }

        Keystream { table, counter: 0 }
    }

    /// Draws the next pseudo-random byte.
    ///
    /// Computes three table positions from the counter via fixed linear
    /// formulas modulo 64, combines the table values there with the
    /// counter through addition and exclusive-or, folds the result back
    /// into the first position rotated by `counter mod 7`, and advances
    /// the counter.
    pub(crate) fn next_byte(&mut self) -> u8 {
        let counter = self.counter;
        let i1 = (counter.wrapping_mul(7).wrapping_add(1) % TABLE_LENGTH as u64) as usize;
        let i2 = (counter.wrapping_mul(13).wrapping_add(5) % TABLE_LENGTH as u64) as usize;
        let i3 = (counter.wrapping_mul(29).wrapping_add(11) % TABLE_LENGTH as u64) as usize;

        let mixed = self.table[i1]
            .wrapping_add(self.table[i2])
            .wrapping_add(counter as u8)
            ^ self.table[i3];

        self.table[i1] = mixed.rotate_left((counter % 7) as u32);
        self.counter = counter.wrapping_add(1);
        mixed
    }

    /// Fills a freshly allocated vector with `length` generated bytes.
    pub(crate) fn take_bytes(&mut self, length: usize) -> Vec<u8> {
        (0..length).map(|_| self.next_byte()).collect()
    }
}

impl Drop for Keystream {
    /// Clears the mixing table and counter on drop.
    fn drop(&mut self) {
        self.table.zeroize();
        self.counter = 0;
    }
}
