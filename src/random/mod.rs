//! Random byte generation subsystem for SymmetricMorph.
//!
//! Provides the counter-based keystream generator that drives the byte
//! transform, and the wall-clock-seeded entropy source used for salts,
//! nonces, and raw keys.

pub(crate) mod entropy;
pub(crate) mod keystream;
