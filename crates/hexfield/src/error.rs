//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration (region boundaries, sources, combiner inputs), degenerate fields,
//! non-finite values, and generic errors.
use thiserror::Error;

use crate::tiling::CellId;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid region boundary: {0}")]
    InvalidBoundary(String),

    #[error("tiling at resolution {resolution} produced no cells")]
    EmptyTiling { resolution: u8 },

    #[error("cell sets differ ({left} cells vs {right} cells, {shared} shared)")]
    CellSetMismatch {
        left: usize,
        right: usize,
        shared: usize,
    },

    #[error("raw field is flat (every cell is {value}); min-max normalization is undefined")]
    DegenerateField { value: f64 },

    #[error("non-finite value at cell {cell}")]
    NonFinite { cell: CellId },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns `true` for errors caused by invalid inputs rather than by the data itself.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig(_)
                | Error::InvalidBoundary(_)
                | Error::EmptyTiling { .. }
                | Error::CellSetMismatch { .. }
        )
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        matches!(err, Error::Other(_))
            .then_some(())
            .expect("expected Other variant");
    }

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }

    #[test]
    fn configuration_errors_are_distinguished_from_degenerate_fields() {
        assert!(Error::InvalidBoundary("zero area".into()).is_configuration());
        assert!(Error::CellSetMismatch {
            left: 3,
            right: 4,
            shared: 3
        }
        .is_configuration());
        assert!(Error::EmptyTiling { resolution: 7 }.is_configuration());
        assert!(!Error::DegenerateField { value: 1.0 }.is_configuration());
    }

    #[test]
    fn mismatch_message_reports_both_sizes() {
        let msg = Error::CellSetMismatch {
            left: 3,
            right: 4,
            shared: 2,
        }
        .to_string();
        assert_eq!(msg, "cell sets differ (3 cells vs 4 cells, 2 shared)");
    }
}
