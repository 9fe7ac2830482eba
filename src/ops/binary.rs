//! Element-wise binary operations between tensors of identical shape
//!
//! There is no implicit broadcasting: use [`Tensor::expand_as`] or
//! [`Tensor::repeat`] first. Mixed dtypes are promoted with
//! [`promote`](crate::dtype::promote).

use crate::dispatch_storage;
use crate::dtype::{Element, promote};
use crate::error::{Error, Result};
use crate::tensor::{StorageData, Tensor};

/// Binary operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition: a + b
    Add,
    /// Subtraction: a - b
    Sub,
    /// Multiplication: a * b
    Mul,
    /// Division: a / b
    Div,
}

impl BinaryOp {
    /// Apply to one pair of elements; `None` on integer division by zero
    #[inline]
    pub fn apply<T: Element>(self, a: T, b: T) -> Option<T> {
        match self {
            Self::Add => Some(a.add_elem(b)),
            Self::Sub => Some(a.sub_elem(b)),
            Self::Mul => Some(a.mul_elem(b)),
            Self::Div => a.div_elem(b),
        }
    }
}

fn zip_apply<T: Element>(op: BinaryOp, lhs: &[T], rhs: &[T]) -> Result<Vec<T>> {
    lhs.iter()
        .zip(rhs)
        .map(|(&a, &b)| {
            op.apply(a, b)
                .ok_or_else(|| Error::invalid_argument("other", "integer division by zero"))
        })
        .collect()
}

impl Tensor {
    fn check_same_shape(&self, other: &Tensor) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::shape_mismatch(self.shape(), other.shape()));
        }
        Ok(())
    }

    /// Apply a binary operation element-wise, returning a new tensor
    pub fn binary_op(&self, other: &Tensor, op: BinaryOp) -> Result<Tensor> {
        self.check_same_shape(other)?;
        let dtype = promote(self.dtype(), other.dtype());
        let lhs = self.to_storage_data().cast(dtype);
        let rhs = other.to_storage_data().cast(dtype);

        let out = dispatch_storage!(&lhs, a, T => {
            let b = T::slice(&rhs).ok_or(Error::DTypeMismatch {
                lhs: dtype,
                rhs: rhs.dtype(),
            })?;
            T::into_storage(zip_apply(op, a, b)?)
        });
        Tensor::from_storage_data(out, self.shape())
    }

    /// Apply a binary operation in place, keeping the receiver's dtype
    ///
    /// `other` is cast to the receiver's dtype first. On error the receiver
    /// is unchanged.
    pub fn binary_op_(&mut self, other: &Tensor, op: BinaryOp) -> Result<()> {
        self.check_same_shape(other)?;
        let positions: Vec<usize> = self.layout().offsets().collect();
        let current = self.to_storage_data();
        let rhs = other.to_storage_data().cast(self.dtype());

        let updated = dispatch_storage!(&current, a, T => {
            let b = T::slice(&rhs).ok_or(Error::DTypeMismatch {
                lhs: current.dtype(),
                rhs: rhs.dtype(),
            })?;
            T::into_storage(zip_apply(op, a, b)?)
        });

        self.write_positions(&positions, &updated)
    }

    /// Write `values` (row-major) to the given storage positions
    ///
    /// `values` must already have the receiver's dtype.
    fn write_positions(&mut self, positions: &[usize], values: &StorageData) -> Result<()> {
        let dtype = self.dtype();
        dispatch_storage!(self.storage_mut(), dst, T => {
            let values = T::slice(values).ok_or(Error::DTypeMismatch {
                lhs: dtype,
                rhs: values.dtype(),
            })?;
            for (&pos, &v) in positions.iter().zip(values) {
                dst[pos] = v;
            }
        });
        Ok(())
    }

    /// Element-wise `self + other`
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        self.binary_op(other, BinaryOp::Add)
    }

    /// Element-wise `self - other`
    pub fn sub(&self, other: &Tensor) -> Result<Tensor> {
        self.binary_op(other, BinaryOp::Sub)
    }

    /// Element-wise `self * other`
    pub fn mul(&self, other: &Tensor) -> Result<Tensor> {
        self.binary_op(other, BinaryOp::Mul)
    }

    /// Element-wise `self / other`
    ///
    /// Integer division truncates toward zero; dividing an integer by zero
    /// fails with `InvalidArgument`.
    pub fn div(&self, other: &Tensor) -> Result<Tensor> {
        self.binary_op(other, BinaryOp::Div)
    }

    /// In-place `self += other`
    pub fn add_(&mut self, other: &Tensor) -> Result<()> {
        self.binary_op_(other, BinaryOp::Add)
    }

    /// In-place `self -= other`
    pub fn sub_(&mut self, other: &Tensor) -> Result<()> {
        self.binary_op_(other, BinaryOp::Sub)
    }

    /// In-place `self *= other`
    pub fn mul_(&mut self, other: &Tensor) -> Result<()> {
        self.binary_op_(other, BinaryOp::Mul)
    }

    /// In-place `self /= other`
    pub fn div_(&mut self, other: &Tensor) -> Result<()> {
        self.binary_op_(other, BinaryOp::Div)
    }

    /// True when dtype, shape and every element are equal
    pub fn equal(&self, other: &Tensor) -> bool {
        self.dtype() == other.dtype()
            && self.shape() == other.shape()
            && self.to_storage_data() == other.to_storage_data()
    }

    /// True when shapes match and `|a - b| <= atol + rtol * |b|` element-wise
    ///
    /// Values are compared as `f64`, so tensors of different dtypes can be
    /// compared. NaN is never close to anything.
    pub fn allclose(&self, other: &Tensor, rtol: f64, atol: f64) -> bool {
        self.shape() == other.shape()
            && self
                .to_vec::<f64>()
                .iter()
                .zip(other.to_vec::<f64>())
                .all(|(&a, b)| (a - b).abs() <= atol + rtol * b.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;

    #[test]
    fn test_add_sub_mul_div() {
        let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let b = Tensor::from_slice(&[4.0f32, 3.0, 2.0, 1.0], &[2, 2]).unwrap();
        assert_eq!(a.add(&b).unwrap().to_vec::<f32>(), vec![5.0; 4]);
        assert_eq!(a.sub(&b).unwrap().to_vec::<f32>(), vec![-3.0, -1.0, 1.0, 3.0]);
        assert_eq!(a.mul(&b).unwrap().to_vec::<f32>(), vec![4.0, 6.0, 6.0, 4.0]);
        assert_eq!(a.div(&b).unwrap().to_vec::<f32>(), vec![0.25, 2.0 / 3.0, 1.5, 4.0]);
    }

    #[test]
    fn test_shape_mismatch_names_both_shapes() {
        let a = Tensor::zeros(&[2, 3], DType::F32).unwrap();
        let b = Tensor::zeros(&[3, 2], DType::F32).unwrap();
        match a.add(&b).unwrap_err() {
            Error::ShapeMismatch { expected, got } => {
                assert_eq!(expected, vec![2, 3]);
                assert_eq!(got, vec![3, 2]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_mixed_dtypes_promote() {
        let a = Tensor::from_slice(&[1i64, 2], &[2]).unwrap();
        let b = Tensor::from_slice(&[0.5f32, 0.5], &[2]).unwrap();
        let c = a.add(&b).unwrap();
        assert_eq!(c.dtype(), DType::F32);
        assert_eq!(c.to_vec::<f32>(), vec![1.5, 2.5]);
    }

    #[test]
    fn test_strided_operands() {
        let a = Tensor::from_slice(&[1i64, 2, 3, 4], &[2, 2]).unwrap();
        let t = a.transpose(0, 1).unwrap();
        assert_eq!(a.add(&t).unwrap().to_vec::<i64>(), vec![2, 5, 5, 8]);
    }

    #[test]
    fn test_integer_division() {
        let a = Tensor::from_slice(&[7i64, -7], &[2]).unwrap();
        let b = Tensor::from_slice(&[2i64, 2], &[2]).unwrap();
        assert_eq!(a.div(&b).unwrap().to_vec::<i64>(), vec![3, -3]);
        let zero = Tensor::zeros(&[2], DType::I64).unwrap();
        assert!(matches!(a.div(&zero), Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_in_place_keeps_dtype_and_copies_on_write() {
        let mut a = Tensor::from_slice(&[1i64, 2, 3], &[3]).unwrap();
        let alias = a.clone();
        let b = Tensor::from_slice(&[0.9f64, 0.9, 0.9], &[3]).unwrap();
        a.add_(&b).unwrap();
        assert_eq!(a.dtype(), DType::I64);
        assert_eq!(a.to_vec::<i64>(), vec![1, 2, 3]);
        a.mul_(&Tensor::from_slice(&[2i64, 2, 2], &[3]).unwrap()).unwrap();
        assert_eq!(a.to_vec::<i64>(), vec![2, 4, 6]);
        assert_eq!(alias.to_vec::<i64>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_failed_in_place_leaves_receiver() {
        let mut a = Tensor::from_slice(&[4i64, 6], &[2]).unwrap();
        let b = Tensor::from_slice(&[2i64, 0], &[2]).unwrap();
        assert!(a.div_(&b).is_err());
        assert_eq!(a.to_vec::<i64>(), vec![4, 6]);
    }

    #[test]
    fn test_write_positions_rejects_foreign_dtype() {
        let mut a = Tensor::from_slice(&[1i64, 2], &[2]).unwrap();
        let err = a
            .write_positions(&[0, 1], &StorageData::F64(vec![5.0, 6.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DTypeMismatch {
                lhs: DType::I64,
                rhs: DType::F64
            }
        ));
        assert_eq!(a.to_vec::<i64>(), vec![1, 2]);
        a.write_positions(&[1], &StorageData::I64(vec![9])).unwrap();
        assert_eq!(a.to_vec::<i64>(), vec![1, 9]);
    }

    #[test]
    fn test_in_place_through_view() {
        let base = Tensor::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let mut t = base.transpose(0, 1).unwrap();
        t.sub_(&Tensor::ones(&[2, 2], DType::F64).unwrap()).unwrap();
        assert_eq!(t.to_vec::<f64>(), vec![0.0, 2.0, 1.0, 3.0]);
        assert_eq!(base.to_vec::<f64>(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_equal_and_allclose() {
        let a = Tensor::from_slice(&[1.0f64, 2.0], &[2]).unwrap();
        let b = Tensor::from_slice(&[1.0f64, 2.0 + 1e-9], &[2]).unwrap();
        assert!(a.equal(&a.clone()));
        assert!(!a.equal(&b));
        assert!(a.allclose(&b, 1e-6, 1e-8));
        let c = Tensor::from_slice(&[1.0f32, 2.0], &[2]).unwrap();
        assert!(!a.equal(&c));
        assert!(a.allclose(&c, 0.0, 0.0));
    }
}
