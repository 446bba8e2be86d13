//! @acp:module "Random Source"
//! @acp:summary "Injectable randomness for shuffles and category picks"
//! @acp:domain engine
//! @acp:layer utility

/// Generator the engine draws from.
///
/// Every `rand` generator implements it, so callers pass `rand::rng()` in
/// production and a seeded `StdRng` in tests. Shuffles and picks go through
/// `rand::seq::{SliceRandom, IndexedRandom}`.
pub trait RandomSource: rand::Rng {}

impl<R: rand::Rng + ?Sized> RandomSource for R {}
