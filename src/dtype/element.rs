//! Element trait for mapping Rust types to DType

use super::DType;
use crate::tensor::StorageData;
use bytemuck::{Pod, Zeroable};
use num_traits::AsPrimitive;
use std::cmp::Ordering;
use std::fmt;

/// Trait for types that can be elements of a tensor
///
/// This trait connects Rust's type system to ndtensor's runtime dtype system.
/// It is implemented for `f32`, `f64` and `i64`, one per [`DType`] variant.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - Basic trait requirements
/// - `Pod + Zeroable` - Plain-old-data buffers (bytemuck)
/// - `AsPrimitive<_>` - `as`-style casts to every other element type
/// - `PartialOrd` - Comparison for min/max/median
///
/// Arithmetic goes through the `*_elem` methods rather than `std::ops` so that
/// integer overflow wraps and integer division by zero is reported instead of
/// panicking.
pub trait Element:
    Copy
    + Send
    + Sync
    + Pod
    + Zeroable
    + 'static
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + AsPrimitive<f32>
    + AsPrimitive<f64>
    + AsPrimitive<i64>
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for generic numeric operations
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type (integers truncate toward zero)
    fn from_f64(v: f64) -> Self;

    /// Convert from f64 only when the value is representable without rounding
    fn from_f64_exact(v: f64) -> Option<Self>;

    /// Convert from another element type with `as`-cast semantics
    fn from_elem<S: Element>(x: S) -> Self;

    /// Zero value
    fn zero() -> Self;

    /// Wrap a typed buffer into tagged storage
    fn into_storage(data: Vec<Self>) -> StorageData;

    /// Borrow tagged storage as a typed slice, if the tag matches
    fn slice(data: &StorageData) -> Option<&[Self]>;

    /// Addition (wrapping for integers)
    fn add_elem(self, rhs: Self) -> Self;

    /// Subtraction (wrapping for integers)
    fn sub_elem(self, rhs: Self) -> Self;

    /// Multiplication (wrapping for integers)
    fn mul_elem(self, rhs: Self) -> Self;

    /// Division; `None` for integer division by zero
    fn div_elem(self, rhs: Self) -> Option<Self>;

    /// Raise to a real power (integers wrap for small whole exponents)
    fn pow_elem(self, exp: f64) -> Self;

    /// Negation (wrapping for integers)
    fn neg_elem(self) -> Self;

    /// Absolute value (wrapping for integers, so `MIN` maps to itself)
    fn abs_elem(self) -> Self;

    /// Smaller of two values, propagating NaN
    fn min_elem(self, rhs: Self) -> Self;

    /// Larger of two values, propagating NaN
    fn max_elem(self, rhs: Self) -> Self;

    /// Total order used for sorting (NaN sorts last for floats)
    fn total_order(&self, other: &Self) -> Ordering;
}

macro_rules! impl_float_element {
    ($t:ty, $dtype:expr, $variant:ident) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn from_f64_exact(v: f64) -> Option<Self> {
                let x = v as $t;
                (x as f64 == v || v.is_nan()).then_some(x)
            }

            #[inline]
            fn from_elem<S: Element>(x: S) -> Self {
                AsPrimitive::<$t>::as_(x)
            }

            #[inline]
            fn zero() -> Self {
                0.0
            }

            fn into_storage(data: Vec<Self>) -> StorageData {
                StorageData::$variant(data)
            }

            fn slice(data: &StorageData) -> Option<&[Self]> {
                match data {
                    StorageData::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn add_elem(self, rhs: Self) -> Self {
                self + rhs
            }

            #[inline]
            fn sub_elem(self, rhs: Self) -> Self {
                self - rhs
            }

            #[inline]
            fn mul_elem(self, rhs: Self) -> Self {
                self * rhs
            }

            #[inline]
            fn div_elem(self, rhs: Self) -> Option<Self> {
                Some(self / rhs)
            }

            #[inline]
            fn pow_elem(self, exp: f64) -> Self {
                (self as f64).powf(exp) as $t
            }

            #[inline]
            fn neg_elem(self) -> Self {
                -self
            }

            #[inline]
            fn abs_elem(self) -> Self {
                self.abs()
            }

            #[inline]
            fn min_elem(self, rhs: Self) -> Self {
                if self.is_nan() || rhs.is_nan() {
                    <$t>::NAN
                } else if rhs < self {
                    rhs
                } else {
                    self
                }
            }

            #[inline]
            fn max_elem(self, rhs: Self) -> Self {
                if self.is_nan() || rhs.is_nan() {
                    <$t>::NAN
                } else if rhs > self {
                    rhs
                } else {
                    self
                }
            }

            fn total_order(&self, other: &Self) -> Ordering {
                match (self.is_nan(), other.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => self.partial_cmp(other).unwrap_or(Ordering::Equal),
                }
            }
        }
    };
}

impl_float_element!(f64, DType::F64, F64);
impl_float_element!(f32, DType::F32, F32);

impl Element for i64 {
    const DTYPE: DType = DType::I64;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as i64
    }

    #[inline]
    fn from_f64_exact(v: f64) -> Option<Self> {
        // i64::MIN is -2^63 exactly; 2^63 is out of range
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        (v.fract() == 0.0 && v >= -LIMIT && v < LIMIT).then_some(v as i64)
    }

    #[inline]
    fn from_elem<S: Element>(x: S) -> Self {
        AsPrimitive::<i64>::as_(x)
    }

    #[inline]
    fn zero() -> Self {
        0
    }

    fn into_storage(data: Vec<Self>) -> StorageData {
        StorageData::I64(data)
    }

    fn slice(data: &StorageData) -> Option<&[Self]> {
        match data {
            StorageData::I64(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    fn add_elem(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    #[inline]
    fn sub_elem(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }

    #[inline]
    fn mul_elem(self, rhs: Self) -> Self {
        self.wrapping_mul(rhs)
    }

    #[inline]
    fn div_elem(self, rhs: Self) -> Option<Self> {
        if rhs == 0 {
            None
        } else {
            Some(self.wrapping_div(rhs))
        }
    }

    #[inline]
    fn pow_elem(self, exp: f64) -> Self {
        if exp.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&exp) {
            self.wrapping_pow(exp as u32)
        } else {
            Self::from_f64((self as f64).powf(exp))
        }
    }

    #[inline]
    fn neg_elem(self) -> Self {
        self.wrapping_neg()
    }

    #[inline]
    fn abs_elem(self) -> Self {
        self.wrapping_abs()
    }

    #[inline]
    fn min_elem(self, rhs: Self) -> Self {
        self.min(rhs)
    }

    #[inline]
    fn max_elem(self, rhs: Self) -> Self {
        self.max(rhs)
    }

    fn total_order(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}
