//! # ndtensor
//!
//! **Strided N-dimensional tensors for pre- and post-processing around neural networks.**
//!
//! ndtensor provides an in-memory tensor of rank 1 to 8 over `f32`, `f64` or
//! `i64` elements, with zero-copy views, reductions, assembly operations,
//! element-wise math and JSON persistence.
//!
//! ## Features
//!
//! - **Views**: permute, transpose, view/reshape, squeeze/unsqueeze share storage
//! - **Copy-on-write**: in-place writes never leak into views or clones
//! - **Reductions**: sum, mean, std, min, max, median, prod (global and per axis)
//! - **Assembly**: cat, stack, split, chunk, flip, repeat, tile
//! - **Element-wise ops**: arithmetic, unary math, softmax, dtype casts
//! - **Persistence**: `{size, dtype, storage}` JSON records
//!
//! ## Quick Start
//!
//! ```
//! use ndtensor::prelude::*;
//!
//! # fn main() -> ndtensor::error::Result<()> {
//! let a = Tensor::new(&[[1.0f32, 2.0], [3.0, 4.0]])?;
//! let b = a.t()?.contiguous();
//! let total = a.add(&b)?.sum()?;
//! assert_eq!(total.item::<f32>()?, 20.0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod error;
pub mod ops;
pub mod serialize;
pub mod tensor;

/// Largest supported tensor rank
pub const MAX_RANK: usize = 8;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{DType, Element};
    pub use crate::error::{Error, Result};
    pub use crate::ops::shape::{cat, chunk, split, stack};
    pub use crate::serialize::{JsonCodec, TensorCodec, load, save};
    pub use crate::tensor::{Layout, PrintOptions, Tensor};
}
