//! Physical constants and simulation defaults.

/// Default simulation timestep (seconds). 1/60th of a second.
pub const DEFAULT_DT: f64 = 1.0 / 60.0;

/// Default number of impulse-solver iterations per timestep.
pub const DEFAULT_ITERATIONS: u32 = 10;

/// Default allowed overlap (meters) before position correction kicks in.
pub const DEFAULT_COLLISION_SLOP: f64 = 0.1;

/// Default fraction of penetration *remaining* after one second of
/// correction. The per-step coefficient is `1 - bias^dt`.
pub const DEFAULT_COLLISION_BIAS: f64 = 0.0017970074436457143; // (1 - 0.1)^60

/// Default number of generations a non-touching arbiter stays cached.
pub const DEFAULT_COLLISION_PERSISTENCE: u64 = 3;

/// Fraction of a leaf's size (and of its predicted velocity) used to
/// inflate bounding boxes in the spatial index.
pub const BB_INFLATION_FACTOR: f64 = 0.1;

/// Multiplicative hash coefficient for contact feature hashes.
pub const HASH_COEF: u64 = 3344921057;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1.0e-9;

/// Combines two hash values into a symmetric pair hash:
/// `hash_pair(a, b) == hash_pair(b, a)`.
#[inline]
pub fn hash_pair(a: u64, b: u64) -> u64 {
    a.wrapping_mul(HASH_COEF) ^ b.wrapping_mul(HASH_COEF)
}
