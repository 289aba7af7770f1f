//! Error types for instance loading, evaluation and sampling.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a benchmark instance.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The instance file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No dimension header was found.
    #[error("missing dimension header")]
    MissingHeader,

    /// A token is not an integer.
    #[error("line {line}: `{token}` is not an integer")]
    InvalidNumber { line: usize, token: String },

    /// A negative value where only non-negative values are allowed.
    #[error("line {line}: negative value {value} is not allowed")]
    Negative { line: usize, value: i64 },

    /// A declared dimension is zero.
    #[error("instance dimension must be positive")]
    EmptyDimension,

    /// The file ended before all declared values were read.
    #[error("truncated instance: expected {expected} values, found {found}")]
    Truncated { expected: usize, found: usize },

    /// Values remain after the declared matrices.
    #[error("line {line}: unexpected data after {expected} values")]
    TrailingData { expected: usize, line: usize },

    /// The declared dimensions describe more values than can be addressed.
    #[error("declared dimensions {dimensions:?} are too large")]
    DimensionTooLarge { dimensions: Vec<usize> },

    /// Some permutation cost would not fit in the cost type.
    #[error("matrix values are too large: a cost may exceed {}", i64::MAX)]
    CostOverflow,
}

/// Reasons why a sequence is not a permutation of `[0, n)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermutationDefect {
    #[error("length {found} does not match size {expected}")]
    Length { expected: usize, found: usize },

    #[error("value {value} at position {position} is out of range")]
    OutOfRange { position: usize, value: usize },

    #[error("value {value} at position {position} is repeated")]
    Duplicate { position: usize, value: usize },

    #[error("inversion entry {value} at position {position} exceeds the {remaining} remaining items")]
    InvalidInversion {
        position: usize,
        value: usize,
        remaining: usize,
    },
}

/// Reasons why a Plackett-Luce weight vector is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightDefect {
    #[error("weight vector is empty")]
    Empty,

    #[error("weight {value} at index {index} is not strictly positive")]
    NonPositive { index: usize, value: f64 },

    #[error("weight at index {index} is not finite")]
    NonFinite { index: usize },

    #[error("sum of weights is not finite")]
    NonFiniteTotal,
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("permutation {index} has length {found}, instance size is {expected}")]
    Dimension {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("permutation {index} is invalid: {defect}")]
    InvalidPermutation {
        index: usize,
        defect: PermutationDefect,
    },

    #[error("invalid weights: {0}")]
    InvalidWeight(WeightDefect),
}

impl Error {
    /// Wrap a defect found in the permutation at `index` of a batch.
    pub fn from_defect(index: usize, defect: PermutationDefect) -> Self {
        match defect {
            PermutationDefect::Length { expected, found } => Error::Dimension {
                index,
                expected,
                found,
            },
            defect => Error::InvalidPermutation { index, defect },
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_defect_maps_to_dimension() {
        let err = Error::from_defect(3, PermutationDefect::Length { expected: 5, found: 4 });
        assert!(matches!(err, Error::Dimension { index: 3, expected: 5, found: 4 }));
    }

    #[test]
    fn test_other_defects_map_to_invalid_permutation() {
        let err = Error::from_defect(1, PermutationDefect::Duplicate { position: 2, value: 0 });
        assert!(matches!(err, Error::InvalidPermutation { index: 1, .. }));
        assert_eq!(
            err.to_string(),
            "permutation 1 is invalid: value 0 at position 2 is repeated"
        );
    }
}
