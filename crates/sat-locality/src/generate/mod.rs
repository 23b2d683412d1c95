//! Instance driver: place variables, then stream `m` clauses to a sink.
//!
//! Purpose
//! - Validate parameters before touching the sink, then build the index,
//!   write the header and sample/write clauses one by one.
//!
//! Why this shape
//! - One `RandomStream` is owned per run and threaded through placement and
//!   sampling, so a seed reproduces the whole instance and parallel runs do
//!   not share generator state.
//! - Clauses are never collected; only the index and one line buffer live for
//!   the duration of the run.

use crate::dimacs::{DimacsWriter, Header};
use crate::error::GeneratorError;
use crate::index::{CircleIndex, MAX_VARIABLES};
use crate::sampler::ClauseSampler;
use crate::stream::RandomStream;
use std::io::Write;

/// Generation parameters (`n`, `m`, `k`, `w` plus run options).
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorParams {
    pub variables: usize,
    pub clauses: usize,
    pub arity: usize,
    /// Window half-width as a fraction of the full circle.
    pub width: f64,
    pub seed: Option<u64>,
    /// Rejected centers tolerated per clause; `None` retries forever.
    pub max_attempts: Option<u64>,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            variables: 100_000,
            clauses: 100_000,
            arity: 5,
            width: 0.25,
            seed: None,
            max_attempts: None,
        }
    }
}

impl GeneratorParams {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.variables == 0 {
            return Err(GeneratorError::invalid("need at least one variable"));
        }
        if self.variables > MAX_VARIABLES {
            return Err(GeneratorError::invalid(format!(
                "variable count must be <= {MAX_VARIABLES}"
            )));
        }
        if self.arity == 0 {
            return Err(GeneratorError::invalid("clause arity must be > 0"));
        }
        if self.arity > self.variables {
            return Err(GeneratorError::invalid(format!(
                "clause arity {} exceeds variable count {}",
                self.arity, self.variables
            )));
        }
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(GeneratorError::invalid("width must be finite and > 0"));
        }
        if self.max_attempts == Some(0) {
            return Err(GeneratorError::invalid("max_attempts must be > 0 when set"));
        }
        Ok(())
    }

    pub fn header(&self) -> Header {
        Header {
            variables: self.variables,
            clauses: self.clauses,
            arity: self.arity,
            width: self.width,
        }
    }
}

/// What one run produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationSummary {
    pub clauses: usize,
    /// Window centers drawn, including rejected ones.
    pub attempts: u64,
}

/// Generate an instance with a fresh stream seeded from `params.seed`.
pub fn generate<W: Write>(
    params: &GeneratorParams,
    sink: W,
) -> Result<GenerationSummary, GeneratorError> {
    params.validate()?;
    let mut stream = RandomStream::new(params.seed);
    generate_with_stream(params, &mut stream, sink)
}

/// Generate an instance drawing from a caller-owned stream. `params.seed` is
/// ignored here; the stream decides the sequence.
pub fn generate_with_stream<W: Write>(
    params: &GeneratorParams,
    stream: &mut RandomStream,
    sink: W,
) -> Result<GenerationSummary, GeneratorError> {
    params.validate()?;
    let index = CircleIndex::random(params.variables, stream)?;
    let mut sampler = ClauseSampler::new(&index, params.arity, params.width)?
        .with_max_attempts(params.max_attempts);
    let mut out = DimacsWriter::new(sink);
    out.write_header(&params.header())?;

    tracing::debug!(clauses = params.clauses, "writing clauses");
    let mut clause = Vec::with_capacity(params.arity);
    for _ in 0..params.clauses {
        sampler.sample_into(stream, &mut clause)?;
        out.write_clause(&clause)?;
    }
    out.flush()?;

    let summary = GenerationSummary {
        clauses: out.clauses_written(),
        attempts: sampler.attempts(),
    };
    tracing::info!(
        n = params.variables,
        m = summary.clauses,
        k = params.arity,
        w = params.width,
        attempts = summary.attempts,
        "instance written"
    );
    Ok(summary)
}
