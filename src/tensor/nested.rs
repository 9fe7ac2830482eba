//! Shape inference for nested array literals

use crate::dtype::Element;
use crate::error::{Error, Result};

/// Nested sequences of elements accepted by [`Tensor::new`](super::Tensor::new)
///
/// Implemented for `f32`, `f64` and `i64` leaves, and for slices, arrays and
/// `Vec`s of any `NestedData`. The nesting depth is the tensor rank.
pub trait NestedData {
    /// Leaf element type
    type Elem: Element;

    /// Append the length of this level and of every first-child level below it
    fn collect_shape(&self, shape: &mut Vec<usize>);

    /// Append the leaves in row-major order, checking every level against `shape`
    fn flatten_into(&self, shape: &[usize], out: &mut Vec<Self::Elem>) -> Result<()>;
}

macro_rules! impl_nested_leaf {
    ($($t:ty),*) => {
        $(
            impl NestedData for $t {
                type Elem = $t;

                fn collect_shape(&self, _shape: &mut Vec<usize>) {}

                fn flatten_into(&self, _shape: &[usize], out: &mut Vec<$t>) -> Result<()> {
                    out.push(*self);
                    Ok(())
                }
            }
        )*
    };
}

impl_nested_leaf!(f32, f64, i64);

impl<U: NestedData> NestedData for [U] {
    type Elem = U::Elem;

    fn collect_shape(&self, shape: &mut Vec<usize>) {
        shape.push(self.len());
        if let Some(first) = self.first() {
            first.collect_shape(shape);
        }
    }

    fn flatten_into(&self, shape: &[usize], out: &mut Vec<Self::Elem>) -> Result<()> {
        let Some((&expected, rest)) = shape.split_first() else {
            return Err(Error::shape_mismatch(&[], &[self.len()]));
        };
        if self.len() != expected {
            let mut got = shape.to_vec();
            got[0] = self.len();
            return Err(Error::shape_mismatch(shape, &got));
        }
        for child in self {
            child.flatten_into(rest, out)?;
        }
        Ok(())
    }
}

impl<U: NestedData, const N: usize> NestedData for [U; N] {
    type Elem = U::Elem;

    fn collect_shape(&self, shape: &mut Vec<usize>) {
        self.as_slice().collect_shape(shape)
    }

    fn flatten_into(&self, shape: &[usize], out: &mut Vec<Self::Elem>) -> Result<()> {
        self.as_slice().flatten_into(shape, out)
    }
}

impl<U: NestedData> NestedData for Vec<U> {
    type Elem = U::Elem;

    fn collect_shape(&self, shape: &mut Vec<usize>) {
        self.as_slice().collect_shape(shape)
    }

    fn flatten_into(&self, shape: &[usize], out: &mut Vec<Self::Elem>) -> Result<()> {
        self.as_slice().flatten_into(shape, out)
    }
}
