//! Tensor types and operations
//!
//! This module provides the core `Tensor` type, which represents an n-dimensional
//! strided array over a reference-counted host buffer.

mod core;
mod display;
mod iter;
mod layout;
mod nested;
mod storage;

pub use core::Tensor;
pub(crate) use core::check_rank;
pub use display::{PrintOptions, TensorDisplay};
pub use iter::{IndexedOffsets, Offsets};
pub use layout::{
    Index, Layout, Shape, Strides, axis_to_front, contiguous_strides, inverse_permutation,
};
pub use nested::NestedData;
pub use storage::{Storage, StorageData};
