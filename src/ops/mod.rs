//! Tensor operations
//!
//! Operations are inherent methods on [`Tensor`](crate::tensor::Tensor),
//! grouped by category, plus free functions for the multi-tensor assembly
//! operations in [`shape`].
//!
//! # Operation Categories
//!
//! ## Indexing
//! `get`, `set`, `set_tensor`, `get_at`, `set_at`, `indexed_iter`.
//!
//! ## Views
//! `permute`, `transpose`, `t`, `view`, `reshape`, `flatten`, `narrow`,
//! `squeeze`, `unsqueeze`, `repeat`, `expand`, `expand_as`, `tile`.
//!
//! ## Reductions
//! `sum`, `mean`, `std`, `min`, `max`, `prod`, `median`, each with a
//! `*_dim(dim, keepdim)` per-axis form.
//!
//! ## Assembly
//! [`cat`](shape::cat), [`stack`](shape::stack), [`split`](shape::split),
//! [`chunk`](shape::chunk), `flip`, `flip_dims`.
//!
//! ## Element-wise
//! Binary (`add`, `sub`, `mul`, `div` and in-place forms), scalar
//! (`add_scalar`, ..., `pow_scalar`, `clamp`), unary (`abs`, `exp`, `sin`, ...),
//! `softmax`, and dtype conversion (`to_dtype`, `float`, `double`, `long`).

mod activation;
pub mod binary;
mod dispatch;
pub mod indexing;
pub mod reduce;
pub mod scalar;
pub mod shape;
mod type_conversion;
pub mod unary;
pub mod view;

pub use binary::BinaryOp;
pub use reduce::{ReduceOp, reduce_output_shape};
pub use scalar::ScalarOp;
pub use unary::UnaryOp;
