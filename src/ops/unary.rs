//! Element-wise unary math
//!
//! `neg` and `abs` run on the element type directly (wrapping for integers).
//! The remaining functions are evaluated in `f64` and cast back to the
//! tensor's dtype, so integer tensors see truncated results.

use crate::dispatch_storage;
use crate::dtype::Element;
use crate::tensor::{Layout, Storage, Tensor};

/// Unary operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation: -a
    Neg,
    /// Absolute value: |a|
    Abs,
    /// Square root: sqrt(a)
    Sqrt,
    /// Exponential: e^a
    Exp,
    /// Natural log: ln(a)
    Log,
    /// Sine: sin(a)
    Sin,
    /// Cosine: cos(a)
    Cos,
    /// Tangent: tan(a)
    Tan,
    /// Logistic sigmoid: 1 / (1 + e^-a)
    Sigmoid,
    /// Reciprocal: 1 / a
    Reciprocal,
}

impl UnaryOp {
    /// Evaluate on one element of any dtype
    #[inline]
    pub fn apply_elem<T: Element>(self, x: T) -> T {
        match self {
            Self::Neg => x.neg_elem(),
            Self::Abs => x.abs_elem(),
            _ => T::from_f64(self.apply(x.to_f64())),
        }
    }

    /// Evaluate on one value in `f64`
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Neg => -x,
            Self::Abs => x.abs(),
            Self::Sqrt => x.sqrt(),
            Self::Exp => x.exp(),
            Self::Log => x.ln(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Reciprocal => 1.0 / x,
        }
    }
}

impl Tensor {
    /// Map every element through `f` in `f64`, casting back to the dtype
    ///
    /// The result is contiguous and owns its storage.
    pub fn map_f64(&self, f: impl Fn(f64) -> f64) -> Tensor {
        let data = self.to_storage_data();
        let out = dispatch_storage!(&data, src, T => {
            T::into_storage(src.iter().map(|&x| T::from_f64(f(x.to_f64()))).collect())
        });
        Tensor::from_parts(Storage::new(out), Layout::contiguous(self.shape()))
    }

    /// Apply a unary operation element-wise
    ///
    /// The result keeps the dtype of `self`, is contiguous and owns its
    /// storage. On `i64` tensors `Neg` and `Abs` are exact and wrap at
    /// `i64::MIN`; every other operation truncates toward zero.
    ///
    /// # Example
    ///
    /// ```
    /// use ndtensor::ops::UnaryOp;
    /// use ndtensor::tensor::Tensor;
    /// let t = Tensor::new(&[-9_007_199_254_740_993i64, 4]).unwrap();
    /// let a = t.unary_op(UnaryOp::Abs);
    /// assert_eq!(a.to_vec::<i64>(), vec![9_007_199_254_740_993, 4]);
    /// assert_eq!(t.unary_op(UnaryOp::Sqrt).to_vec::<i64>()[1], 2);
    /// ```
    pub fn unary_op(&self, op: UnaryOp) -> Tensor {
        let data = self.to_storage_data();
        let out = dispatch_storage!(&data, src, T => {
            T::into_storage(src.iter().map(|&x| op.apply_elem(x)).collect())
        });
        Tensor::from_parts(Storage::new(out), Layout::contiguous(self.shape()))
    }

    /// Element-wise negation
    pub fn neg(&self) -> Tensor {
        self.unary_op(UnaryOp::Neg)
    }

    /// Element-wise absolute value
    pub fn abs(&self) -> Tensor {
        self.unary_op(UnaryOp::Abs)
    }

    /// Element-wise square root
    pub fn sqrt(&self) -> Tensor {
        self.unary_op(UnaryOp::Sqrt)
    }

    /// Element-wise exponential
    pub fn exp(&self) -> Tensor {
        self.unary_op(UnaryOp::Exp)
    }

    /// Element-wise natural logarithm
    pub fn log(&self) -> Tensor {
        self.unary_op(UnaryOp::Log)
    }

    /// Element-wise sine
    pub fn sin(&self) -> Tensor {
        self.unary_op(UnaryOp::Sin)
    }

    /// Element-wise cosine
    pub fn cos(&self) -> Tensor {
        self.unary_op(UnaryOp::Cos)
    }

    /// Element-wise tangent
    pub fn tan(&self) -> Tensor {
        self.unary_op(UnaryOp::Tan)
    }

    /// Element-wise logistic sigmoid
    pub fn sigmoid(&self) -> Tensor {
        self.unary_op(UnaryOp::Sigmoid)
    }

    /// Element-wise `1 / x`
    pub fn reciprocal(&self) -> Tensor {
        self.unary_op(UnaryOp::Reciprocal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;

    #[test]
    fn test_float_unary() {
        let t = Tensor::from_slice(&[0.0f64, -1.0, 4.0], &[3]).unwrap();
        assert_eq!(t.abs().to_vec::<f64>(), vec![0.0, 1.0, 4.0]);
        assert_eq!(t.neg().to_vec::<f64>(), vec![-0.0, 1.0, -4.0]);
        assert_eq!(t.exp().to_vec::<f64>()[0], 1.0);
        assert_eq!(t.sigmoid().to_vec::<f64>()[0], 0.5);
        assert_eq!(t.sqrt().to_vec::<f64>()[2], 2.0);
        assert!(t.sqrt().to_vec::<f64>()[1].is_nan());
    }

    #[test]
    fn test_trig() {
        let t = Tensor::from_slice(&[0.0f32], &[1]).unwrap();
        assert_eq!(t.sin().item::<f32>().unwrap(), 0.0);
        assert_eq!(t.cos().item::<f32>().unwrap(), 1.0);
        assert_eq!(t.tan().item::<f32>().unwrap(), 0.0);
    }

    #[test]
    fn test_integer_results_truncate() {
        let t = Tensor::from_slice(&[2i64, -3, 4], &[3]).unwrap();
        let r = t.reciprocal();
        assert_eq!(r.dtype(), DType::I64);
        assert_eq!(r.to_vec::<i64>(), vec![0, 0, 0]);
        assert_eq!(t.abs().to_vec::<i64>(), vec![2, 3, 4]);
        assert_eq!(t.exp().to_vec::<i64>(), vec![7, 0, 54]);
    }

    #[test]
    fn test_integer_neg_abs_are_exact() {
        let big = (1i64 << 53) + 1;
        let t = Tensor::from_slice(&[big, -(i64::MAX - 1), i64::MIN], &[3]).unwrap();
        assert_eq!(t.abs().to_vec::<i64>(), vec![big, i64::MAX - 1, i64::MIN]);
        assert_eq!(t.neg().to_vec::<i64>(), vec![-big, i64::MAX - 1, i64::MIN]);
    }

    #[test]
    fn test_unary_on_view_is_row_major() {
        let t = Tensor::from_slice(&[1.0f64, -2.0, 3.0, -4.0], &[2, 2])
            .unwrap()
            .transpose(0, 1)
            .unwrap();
        let a = t.abs();
        assert!(a.is_contiguous());
        assert_eq!(a.to_vec::<f64>(), vec![1.0, 3.0, 2.0, 4.0]);
    }
}
