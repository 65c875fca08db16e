//! Scalar type alias for the simulation.
//!
//! Tumble uses `f64` throughout: a deterministic rigid-body step is far
//! more sensitive to accumulated rounding than it is to memory bandwidth.

/// The floating-point type used throughout the simulation.
///
/// Set to `f64` for double-precision determinism. The alias exists so a
/// single-precision build can be experimented with by changing one line.
pub type Scalar = f64;
