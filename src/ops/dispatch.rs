//! DType dispatch utilities
//!
//! Kernels are written once, generic over [`Element`](crate::dtype::Element),
//! and instantiated per dtype by one of two macros:
//!
//! - `dispatch_dtype!` binds `T` to the Rust type of a `DType` value.
//! - `dispatch_storage!` matches a [`StorageData`](crate::tensor::StorageData)
//!   (by reference or mutable reference) and binds both the typed buffer and `T`.
//!
//! # Usage
//!
//! ```
//! use ndtensor::{dispatch_dtype, dispatch_storage};
//! use ndtensor::dtype::{DType, Element};
//! use ndtensor::tensor::StorageData;
//!
//! let width = dispatch_dtype!(DType::F32, T => { std::mem::size_of::<T>() });
//! assert_eq!(width, 4);
//!
//! let data = StorageData::I64(vec![1, 2, 3]);
//! let total = dispatch_storage!(&data, v, T => {
//!     v.iter().fold(T::zero(), |acc, &x| acc.add_elem(x)).to_f64()
//! });
//! assert_eq!(total, 6.0);
//! ```

/// Macro for runtime dtype dispatch to typed operations.
///
/// Executes `$body` with `$T` bound to the Rust type matching `$dtype`.
#[macro_export]
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block) => {
        match $dtype {
            $crate::dtype::DType::F64 => {
                #[allow(dead_code)]
                type $T = f64;
                $body
            }
            $crate::dtype::DType::F32 => {
                #[allow(dead_code)]
                type $T = f32;
                $body
            }
            $crate::dtype::DType::I64 => {
                #[allow(dead_code)]
                type $T = i64;
                $body
            }
        }
    };
}

/// Macro for dispatch over tagged storage.
///
/// Matches `$data` (a `&StorageData` or `&mut StorageData`), binding the
/// typed buffer to `$v` and its element type to `$T` inside `$body`.
#[macro_export]
macro_rules! dispatch_storage {
    ($data:expr, $v:ident, $T:ident => $body:block) => {
        match $data {
            $crate::tensor::StorageData::F64($v) => {
                #[allow(dead_code)]
                type $T = f64;
                $body
            }
            $crate::tensor::StorageData::F32($v) => {
                #[allow(dead_code)]
                type $T = f32;
                $body
            }
            $crate::tensor::StorageData::I64($v) => {
                #[allow(dead_code)]
                type $T = i64;
                $body
            }
        }
    };
}
