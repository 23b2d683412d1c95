//! Error type shared by the index, sampler, writer and driver.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum GeneratorError {
    /// Configuration rejected before any output was produced.
    InvalidParams { reason: String },
    /// The retry cap ran out before a center with at least `k` eligible
    /// variables was found.
    Starved { attempts: u64 },
    /// Writing to the sink failed.
    Io(io::Error),
}

impl GeneratorError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParams { reason } => write!(f, "invalid generator params: {reason}"),
            Self::Starved { attempts } => write!(
                f,
                "clause sampling starved: no center with enough eligible variables after {attempts} attempts"
            ),
            Self::Io(err) => write!(f, "writing instance failed: {err}"),
        }
    }
}

impl std::error::Error for GeneratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GeneratorError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
