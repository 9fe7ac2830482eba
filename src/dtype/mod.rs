//! Data type system for ndtensor tensors
//!
//! This module provides the `DType` enum representing the supported element
//! types, the `Element` trait linking them to Rust primitives, and the
//! promotion rule used by mixed-dtype binary operations.

mod element;
mod promotion;

pub use element::Element;
pub use promotion::promote;

use std::fmt;

/// Data types supported by ndtensor tensors
///
/// This enum is the runtime element tag of a tensor. It is selected once per
/// tensor, when its storage is created, and every kernel dispatches on it
/// exactly once per operation (see [`crate::dispatch_dtype`]).
///
/// # Discriminant Values (Serialization Stability)
///
/// The discriminant values are **stable**:
/// - Floats: 0-9 (F64=0, F32=1)
/// - Signed ints: 10-19 (I64=10)
///
/// Existing values are never changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point (most common)
    F32 = 1,
    /// 64-bit signed integer
    I64 = 10,
}

impl DType {
    /// Every supported dtype, floats first
    pub const ALL: [DType; 3] = [DType::F32, DType::F64, DType::I64];

    /// Returns true if this is a floating point type
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F64 | Self::F32)
    }

    /// Returns true if this is an integer type
    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(self, Self::I64)
    }

    /// Short name for display (e.g., "f32", "i64")
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::I64 => "i64",
        }
    }

    /// Tensor type tag used by the persisted JSON format
    pub const fn tensor_type_name(self) -> &'static str {
        match self {
            Self::F32 => "FloatTensor",
            Self::F64 => "DoubleTensor",
            Self::I64 => "LongTensor",
        }
    }

    /// Parse a tensor type tag of the persisted JSON format
    pub fn from_tensor_type_name(name: &str) -> Option<Self> {
        match name {
            "FloatTensor" => Some(Self::F32),
            "DoubleTensor" => Some(Self::F64),
            "LongTensor" => Some(Self::I64),
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_short_name() {
        assert_eq!(DType::F32.to_string(), "f32");
        assert_eq!(DType::I64.to_string(), "i64");
    }

    #[test]
    fn test_dtype_categories() {
        assert!(DType::F32.is_float());
        assert!(DType::F64.is_float());
        assert!(!DType::I64.is_float());
        assert!(DType::I64.is_int());
    }

    #[test]
    fn test_tensor_type_names_round_trip() {
        for dtype in DType::ALL {
            let name = dtype.tensor_type_name();
            assert_eq!(DType::from_tensor_type_name(name), Some(dtype));
        }
        assert_eq!(DType::from_tensor_type_name("ByteTensor"), None);
    }

    #[test]
    fn test_stable_discriminants() {
        assert_eq!(DType::F64 as u8, 0);
        assert_eq!(DType::F32 as u8, 1);
        assert_eq!(DType::I64 as u8, 10);
    }
}
