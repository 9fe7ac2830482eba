//! Multi-index access: partial and full get/set, scalar access, enumeration
//!
//! A multi-index `[i0, ..., im-1]` with `m <= ndim` addresses either one
//! element (`m == ndim`) or the sub-block spanned by the trailing axes.

use crate::dispatch_storage;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::tensor::{Index, IndexedOffsets, Layout, StorageData, Tensor};
use smallvec::smallvec;
use std::marker::PhantomData;

impl Tensor {
    /// Check a leading multi-index against the shape
    fn check_prefix(&self, indices: &[usize]) -> Result<()> {
        if indices.len() > crate::MAX_RANK {
            return Err(Error::unsupported_rank(indices.len()));
        }
        if indices.is_empty() || indices.len() > self.ndim() {
            return Err(Error::invalid_argument(
                "indices",
                format!(
                    "expected between 1 and {} indices, got {}",
                    self.ndim(),
                    indices.len()
                ),
            ));
        }
        for (dim, (&index, &size)) in indices.iter().zip(self.shape()).enumerate() {
            if index >= size {
                return Err(Error::IndexOutOfBounds { dim, index, size });
            }
        }
        Ok(())
    }

    /// Storage positions covered by a validated leading multi-index
    fn block_positions(&self, indices: &[usize]) -> Vec<usize> {
        self.layout().sub_block(indices).offsets().collect()
    }

    /// Read an element or a sub-block
    ///
    /// With a full multi-index the result is a one-element `[1]` tensor.
    /// With `m < ndim` indices the result has the trailing `ndim - m` axes
    /// and owns a fresh copy of the addressed block.
    ///
    /// # Example
    ///
    /// ```
    /// use ndtensor::tensor::Tensor;
    /// let t = Tensor::new(&[[1i64, 2, 3], [4, 5, 6]]).unwrap();
    /// assert_eq!(t.get(&[1]).unwrap().to_vec::<i64>(), vec![4, 5, 6]);
    /// assert_eq!(t.get(&[0, 2]).unwrap().shape(), &[1]);
    /// ```
    pub fn get(&self, indices: &[usize]) -> Result<Tensor> {
        self.check_prefix(indices)?;
        let layout = if indices.len() == self.ndim() {
            let pos = self.layout().position(indices);
            Layout::new(smallvec![1], smallvec![1], pos)
        } else {
            self.layout().sub_block(indices)
        };
        Ok(self.with_layout(layout).materialize())
    }

    /// Overwrite an element, or broadcast a scalar over a sub-block
    ///
    /// The value is cast to the tensor's dtype with `as` semantics; a value
    /// of the tensor's own element type is stored unchanged.
    pub fn set<V: Element>(&mut self, indices: &[usize], value: V) -> Result<()> {
        self.check_prefix(indices)?;
        let positions = self.block_positions(indices);
        dispatch_storage!(self.storage_mut(), dst, T => {
            let v = T::from_elem(value);
            for pos in positions {
                dst[pos] = v;
            }
        });
        Ok(())
    }

    /// Copy `other` into the sub-block addressed by `indices`
    ///
    /// `other.shape()` must equal the trailing shape `self.shape()[m..]`
    /// (`[1]` for a full multi-index). Elements are cast to the receiver's
    /// dtype. On error the receiver is unchanged.
    pub fn set_tensor(&mut self, indices: &[usize], other: &Tensor) -> Result<()> {
        self.check_prefix(indices)?;
        let m = indices.len();
        let expected: &[usize] = if m == self.ndim() {
            &[1]
        } else {
            &self.shape()[m..]
        };
        if other.shape() != expected {
            return Err(Error::shape_mismatch(expected, other.shape()));
        }

        let positions = self.block_positions(indices);
        dispatch_storage!(self.storage_mut(), dst, T => {
            for (pos, v) in positions.into_iter().zip(other.to_vec::<T>()) {
                dst[pos] = v;
            }
        });
        Ok(())
    }

    /// Read one element through a full multi-index, cast to `V`
    ///
    /// Reading with the tensor's own element type is exact.
    pub fn get_at<V: Element>(&self, index: &[usize]) -> Result<V> {
        let pos = self.full_position(index)?;
        Ok(dispatch_storage!(self.storage().data(), src, T => { V::from_elem(src[pos]) }))
    }

    /// Write one element through a full multi-index, casting to the dtype
    pub fn set_at<V: Element>(&mut self, index: &[usize], value: V) -> Result<()> {
        let pos = self.full_position(index)?;
        dispatch_storage!(self.storage_mut(), dst, T => {
            dst[pos] = T::from_elem(value);
        });
        Ok(())
    }

    fn full_position(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.ndim() {
            return Err(Error::invalid_argument(
                "index",
                format!("expected {} indices, got {}", self.ndim(), index.len()),
            ));
        }
        self.check_prefix(index)?;
        Ok(self.layout().position(index))
    }

    /// Enumerate every element with its multi-index, in row-major order
    ///
    /// Values are cast to `V`.
    ///
    /// ```
    /// use ndtensor::tensor::Tensor;
    /// let t = Tensor::new(&[[1.0f32, 2.0], [3.0, 4.0]]).unwrap();
    /// let last = t.indexed_iter::<f32>().last().unwrap();
    /// assert_eq!(last.0.as_slice(), &[1, 1]);
    /// assert_eq!(last.1, 4.0);
    /// ```
    pub fn indexed_iter<V: Element>(&self) -> IndexedIter<'_, V> {
        IndexedIter {
            data: self.storage().data(),
            offsets: self.layout().indexed_offsets(),
            _marker: PhantomData,
        }
    }
}

/// Iterator over `(multi-index, value)` pairs
///
/// Created by [`Tensor::indexed_iter`].
pub struct IndexedIter<'a, V> {
    data: &'a StorageData,
    offsets: IndexedOffsets<'a>,
    _marker: PhantomData<V>,
}

impl<V: Element> Iterator for IndexedIter<'_, V> {
    type Item = (Index, V);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, pos) = self.offsets.next()?;
        let value = dispatch_storage!(self.data, src, T => { V::from_elem(src[pos]) });
        Some((index, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

impl<V: Element> ExactSizeIterator for IndexedIter<'_, V> {}
