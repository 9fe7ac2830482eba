//! Error types for ndtensor

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using ndtensor's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tensor operations
///
/// Every error is returned before the receiver is modified, so a failed
/// operation never leaves a tensor partially updated.
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch between operands, or between data and a requested shape
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Axis argument outside `[-ndim, ndim)`
    #[error("Invalid dimension {dim} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The invalid dimension
        dim: isize,
        /// Number of dimensions
        ndim: usize,
    },

    /// Index out of bounds along one axis
    #[error("Index {index} out of bounds for dimension {dim} of size {size}")]
    IndexOutOfBounds {
        /// Axis the index applies to
        dim: usize,
        /// The invalid index
        index: usize,
        /// Size of the dimension
        size: usize,
    },

    /// Rank outside the supported range
    #[error("Unsupported rank {rank}: tensors must have between 1 and {max} dimensions")]
    UnsupportedRank {
        /// Requested rank
        rank: usize,
        /// Maximum supported rank
        max: usize,
    },

    /// Element-count mismatch or malformed target shape in view/reshape
    #[error("Invalid reshape of {numel} elements to {shape:?}")]
    InvalidReshape {
        /// Requested shape (may contain one `-1`)
        shape: Vec<isize>,
        /// Number of elements in the source tensor
        numel: usize,
    },

    /// Reduction without an identity element applied to zero elements
    #[error("Operation '{op}' does not have an identity")]
    EmptyReduction {
        /// The reduction name
        op: &'static str,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// DType mismatch between operands
    #[error("DType mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// Left-hand side dtype
        lhs: DType,
        /// Right-hand side dtype
        rhs: DType,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Tensor is not contiguous when contiguous memory is required
    #[error("Operation requires contiguous tensor; call contiguous() first")]
    NotContiguous,

    /// Persisted payload does not describe a valid tensor
    #[error("Serialization error: {reason}")]
    Serialization {
        /// What was wrong with the payload
        reason: String,
    },

    /// JSON encoding or decoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem failure while saving or loading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Create an unsupported rank error against [`crate::MAX_RANK`]
    pub fn unsupported_rank(rank: usize) -> Self {
        Self::UnsupportedRank {
            rank,
            max: crate::MAX_RANK,
        }
    }

    /// Create a serialization error
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }
}
