//! Tensor-scalar arithmetic
//!
//! The scalar is an `f64`. When it converts to the tensor's element type
//! without rounding, the operation runs on the element type directly, so
//! integer tensors keep every bit (and wrap on overflow). Otherwise each
//! element is combined with the scalar in `f64` and the result is cast back
//! to the tensor's dtype (integer results truncate).

use crate::dispatch_storage;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::tensor::{Layout, Storage, StorageData, Tensor};

/// Scalar operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScalarOp {
    /// a + s
    Add,
    /// a - s
    Sub,
    /// a * s
    Mul,
    /// a / s
    Div,
    /// a ^ s
    Pow,
}

impl ScalarOp {
    /// Evaluate on one element with a scalar of the same type
    ///
    /// `None` on integer division by zero.
    #[inline]
    pub fn apply_elem<T: Element>(self, a: T, s: T) -> Option<T> {
        match self {
            Self::Add => Some(a.add_elem(s)),
            Self::Sub => Some(a.sub_elem(s)),
            Self::Mul => Some(a.mul_elem(s)),
            Self::Div => a.div_elem(s),
            Self::Pow => Some(a.pow_elem(s.to_f64())),
        }
    }

    /// Evaluate on one element in `f64`
    #[inline]
    pub fn apply(self, a: f64, s: f64) -> f64 {
        match self {
            Self::Add => a + s,
            Self::Sub => a - s,
            Self::Mul => a * s,
            Self::Div => a / s,
            Self::Pow => a.powf(s),
        }
    }
}

fn combine<T: Element>(op: ScalarOp, src: &[T], scalar: f64) -> Result<Vec<T>> {
    if op == ScalarOp::Pow {
        return Ok(src.iter().map(|&a| a.pow_elem(scalar)).collect());
    }
    match T::from_f64_exact(scalar) {
        Some(s) => src
            .iter()
            .map(|&a| {
                op.apply_elem(a, s)
                    .ok_or_else(|| Error::invalid_argument("scalar", "integer division by zero"))
            })
            .collect(),
        None => Ok(src
            .iter()
            .map(|&a| T::from_f64(op.apply(a.to_f64(), scalar)))
            .collect()),
    }
}

impl Tensor {
    /// Combine every element with a scalar
    ///
    /// The result keeps the dtype of `self`. Integer division by zero fails
    /// with `InvalidArgument`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndtensor::ops::ScalarOp;
    /// use ndtensor::tensor::Tensor;
    /// let t = Tensor::new(&[9_007_199_254_740_993i64, 5]).unwrap();
    /// let s = t.scalar_op(ScalarOp::Add, 1.0).unwrap();
    /// assert_eq!(s.to_vec::<i64>(), vec![9_007_199_254_740_994, 6]);
    /// // a fractional scalar is applied in f64 and truncated
    /// assert_eq!(t.scalar_op(ScalarOp::Mul, 0.5).unwrap().to_vec::<i64>()[1], 2);
    /// ```
    pub fn scalar_op(&self, op: ScalarOp, scalar: f64) -> Result<Tensor> {
        let data = self.to_storage_data();
        let out = dispatch_storage!(&data, src, T => { T::into_storage(combine(op, src, scalar)?) });
        Ok(Tensor::from_parts(Storage::new(out), Layout::contiguous(self.shape())))
    }

    /// `self + scalar`
    pub fn add_scalar(&self, scalar: f64) -> Result<Tensor> {
        self.scalar_op(ScalarOp::Add, scalar)
    }

    /// `self - scalar`
    pub fn sub_scalar(&self, scalar: f64) -> Result<Tensor> {
        self.scalar_op(ScalarOp::Sub, scalar)
    }

    /// `self * scalar`
    pub fn mul_scalar(&self, scalar: f64) -> Result<Tensor> {
        self.scalar_op(ScalarOp::Mul, scalar)
    }

    /// `self / scalar`
    pub fn div_scalar(&self, scalar: f64) -> Result<Tensor> {
        self.scalar_op(ScalarOp::Div, scalar)
    }

    /// `self ^ exponent`
    pub fn pow_scalar(&self, exponent: f64) -> Result<Tensor> {
        self.scalar_op(ScalarOp::Pow, exponent)
    }

    /// Clamp every element into `[min, max]`
    ///
    /// NaN elements stay NaN. Integer tensors clamp to the whole numbers
    /// inside the bounds without leaving `i64`.
    pub fn clamp(&self, min: f64, max: f64) -> Result<Tensor> {
        if min > max || min.is_nan() || max.is_nan() {
            return Err(Error::invalid_argument(
                "min",
                format!("clamp bounds [{min}, {max}] are not ordered"),
            ));
        }
        let out = match self.to_storage_data() {
            StorageData::I64(v) => {
                // saturating casts
                let (lo, hi) = (min.ceil() as i64, max.floor() as i64);
                StorageData::I64(v.into_iter().map(|a| a.max(lo).min(hi)).collect())
            }
            _ => return Ok(self.map_f64(|a| if a.is_nan() { a } else { a.max(min).min(max) })),
        };
        Ok(Tensor::from_parts(Storage::new(out), Layout::contiguous(self.shape())))
    }
}
