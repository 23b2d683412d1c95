//! Random SAT instances with spatial locality.
//!
//! Variables sit at uniform random bearings on a circle of circumference 1.
//! Every clause draws its `k` variables from the window of half-width `w`
//! around a random center, so small `w` yields strongly local formulas and
//! `w >= 0.5` degenerates to uniform random k-SAT. Output is DIMACS CNF.
//!
//! Pieces, leaves first: [`stream::RandomStream`] (buffered uniform floats),
//! [`index::CircleIndex`] (circular range queries), [`sampler::ClauseSampler`]
//! (rejection sampling of clauses), [`dimacs::DimacsWriter`] and the
//! [`generate::generate`] driver that ties them together.

pub mod dimacs;
pub mod error;
pub mod generate;
pub mod index;
pub mod sampler;
pub mod stream;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::GeneratorError;
pub use generate::{generate, generate_with_stream, GenerationSummary, GeneratorParams};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::dimacs::{DimacsWriter, Header, GENERATOR_NAME};
    pub use crate::error::GeneratorError;
    pub use crate::generate::{generate, generate_with_stream, GenerationSummary, GeneratorParams};
    pub use crate::index::{CircleIndex, VarId, Window};
    pub use crate::sampler::{ClauseSampler, Literal};
    pub use crate::stream::RandomStream;
}
