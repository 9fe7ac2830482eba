//! Softmax
//!
//! Unlike most numerical libraries, the exponentials are taken without
//! subtracting the maximum first, so very large inputs overflow to NaN.

use crate::error::{Error, Result};
use crate::tensor::{Tensor, axis_to_front, inverse_permutation};
use log::trace;

impl Tensor {
    fn check_float(&self, op: &'static str) -> Result<()> {
        if !self.dtype().is_float() {
            return Err(Error::unsupported_dtype(self.dtype(), op));
        }
        Ok(())
    }

    /// Softmax over all elements: `exp(x) / sum(exp(x))`
    ///
    /// Float dtypes only. The result has the input's shape.
    pub fn softmax(&self) -> Result<Tensor> {
        self.check_float("softmax")?;
        if self.numel() == 0 {
            return Err(Error::EmptyReduction { op: "softmax" });
        }
        let exps = self.exp();
        let total = exps.sum()?.item::<f64>()?;
        Ok(exps.map_f64(|x| x / total))
    }

    /// Softmax along one axis
    ///
    /// The axis is rotated to the front, exponentiated, summed into a
    /// singleton, repeated back to full size for the division, and rotated
    /// back.
    ///
    /// ```
    /// use ndtensor::tensor::Tensor;
    /// let t = Tensor::new(&[[1.0f64, 2.0, 3.0], [0.0, 0.0, 0.0]]).unwrap();
    /// let s = t.softmax_dim(1).unwrap().sum_dim(1, false).unwrap();
    /// for v in s.to_vec::<f64>() {
    ///     assert!((v - 1.0).abs() < 1e-12);
    /// }
    /// ```
    pub fn softmax_dim(&self, dim: isize) -> Result<Tensor> {
        self.check_float("softmax")?;
        let d = self.normalize_dim(dim)?;
        let n = self.shape()[d];
        let order = axis_to_front(d, self.ndim());
        trace!("softmax along axis {} of {:?}", d, self.shape());

        let exps = self.permute_unchecked(&order).contiguous().exp();
        let sums = exps.sum_dim(0, true)?;
        let mut reps = vec![1; exps.ndim()];
        reps[0] = n;
        let denom = sums.repeat(&reps)?;
        let out = exps.div(&denom)?;
        Ok(out.permute_unchecked(&inverse_permutation(&order)).contiguous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;

    #[test]
    fn test_global_softmax() {
        let t = Tensor::from_slice(&[0.0f64, 0.0, 0.0, 0.0], &[2, 2]).unwrap();
        let s = t.softmax().unwrap();
        assert_eq!(s.shape(), &[2, 2]);
        assert_eq!(s.to_vec::<f64>(), vec![0.25; 4]);
    }

    #[test]
    fn test_softmax_dim0() {
        let t = Tensor::from_slice(&[1.0f32, 5.0, 1.0, 7.0], &[2, 2]).unwrap();
        let s = t.softmax_dim(0).unwrap();
        assert_eq!(s.shape(), &[2, 2]);
        let v = s.to_vec::<f32>();
        assert!((v[0] - 0.5).abs() < 1e-6);
        assert!((v[2] - 0.5).abs() < 1e-6);
        assert!((v[1] + v[3] - 1.0).abs() < 1e-6);
        assert!(v[3] > v[1]);
    }

    #[test]
    fn test_softmax_rejects_integers() {
        let t = Tensor::zeros(&[3], DType::I64).unwrap();
        assert!(matches!(
            t.softmax(),
            Err(Error::UnsupportedDType { op: "softmax", .. })
        ));
        assert!(t.softmax_dim(0).is_err());
    }

    #[test]
    fn test_no_max_shift() {
        let t = Tensor::from_slice(&[1000.0f64, 0.0], &[2]).unwrap();
        assert!(t.softmax().unwrap().to_vec::<f64>()[0].is_nan());
    }
}
