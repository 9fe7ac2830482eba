//! View and layout operations
//!
//! `permute`, `transpose`, `t`, `view`, `squeeze` and `unsqueeze` only rewrite
//! the layout and share storage with their input. `narrow`, `repeat`,
//! `expand`/`expand_as` and `tile` produce tensors that own fresh storage.

use crate::dispatch_storage;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::tensor::{Index, Layout, Tensor, check_rank};
use log::trace;

/// Resolve a view shape that may contain one `-1` against an element count
///
/// Returns `None` for any other negative entry, a second `-1`, or an element
/// count mismatch.
pub fn infer_shape(shape: &[isize], numel: usize) -> Option<Vec<usize>> {
    let mut inferred = None;
    let mut known = 1usize;
    for (i, &s) in shape.iter().enumerate() {
        match s {
            -1 if inferred.is_none() => inferred = Some(i),
            s if s >= 0 => known = known.checked_mul(s as usize)?,
            _ => return None,
        }
    }

    let mut out: Vec<usize> = shape.iter().map(|&s| s.max(0) as usize).collect();
    match inferred {
        Some(i) => {
            if known == 0 || numel % known != 0 {
                return None;
            }
            out[i] = numel / known;
        }
        None if known != numel => return None,
        None => {}
    }
    Some(out)
}

impl Tensor {
    /// Permute dimensions (zero-copy)
    ///
    /// Reorders the dimensions of the tensor according to the given permutation.
    /// Negative entries count from the last axis.
    ///
    /// # Example
    ///
    /// ```
    /// use ndtensor::tensor::Tensor;
    /// let t = Tensor::zeros(&[2, 3, 4], ndtensor::dtype::DType::F32).unwrap();
    /// let p = t.permute(&[2, 0, 1]).unwrap(); // Shape becomes [4, 2, 3]
    /// assert_eq!(p.shape(), &[4, 2, 3]);
    /// ```
    pub fn permute(&self, order: &[isize]) -> Result<Tensor> {
        let ndim = self.ndim();
        if order.len() != ndim {
            return Err(Error::invalid_argument(
                "order",
                format!("expected {ndim} axes, got {}", order.len()),
            ));
        }

        let mut seen = [false; crate::MAX_RANK];
        let mut dims = Vec::with_capacity(ndim);
        for &d in order {
            let idx = self.normalize_dim(d)?;
            if seen[idx] {
                return Err(Error::invalid_argument(
                    "order",
                    format!("axis {idx} appears more than once"),
                ));
            }
            seen[idx] = true;
            dims.push(idx);
        }

        Ok(self.with_layout(self.layout().permute(&dims)))
    }

    /// Permute by an already-validated axis order
    pub(crate) fn permute_unchecked(&self, order: &[usize]) -> Tensor {
        self.with_layout(self.layout().permute(order))
    }

    /// Transpose two dimensions (zero-copy)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Tensor> {
        let d0 = self.normalize_dim(dim0)?;
        let d1 = self.normalize_dim(dim1)?;
        let mut order: Vec<usize> = (0..self.ndim()).collect();
        order.swap(d0, d1);
        Ok(self.permute_unchecked(&order))
    }

    /// Matrix transpose
    ///
    /// Rank-1 tensors are returned unchanged; rank-2 tensors swap their axes.
    pub fn t(&self) -> Result<Tensor> {
        match self.ndim() {
            1 => Ok(self.clone()),
            2 => self.transpose(0, 1),
            n => Err(Error::invalid_argument(
                "self",
                format!("t() expects a tensor with at most 2 dimensions, got {n}"),
            )),
        }
    }

    /// View tensor with a different shape (zero-copy)
    ///
    /// At most one entry may be `-1`; it is inferred from the element count.
    /// Fails with `NotContiguous` on strided input; call
    /// [`contiguous`](Tensor::contiguous) first or use [`reshape`](Tensor::reshape).
    pub fn view(&self, shape: &[isize]) -> Result<Tensor> {
        let numel = self.numel();
        let new_shape = infer_shape(shape, numel).ok_or_else(|| Error::InvalidReshape {
            shape: shape.to_vec(),
            numel,
        })?;
        check_rank(new_shape.len())?;

        let layout = self
            .layout()
            .reshape(&new_shape)
            .ok_or(Error::NotContiguous)?;
        Ok(self.with_layout(layout))
    }

    /// Reshape, copying first if the tensor is not contiguous
    pub fn reshape(&self, shape: &[isize]) -> Result<Tensor> {
        self.contiguous().view(shape)
    }

    /// Flatten to 1-D
    pub fn flatten(&self) -> Result<Tensor> {
        self.reshape(&[-1])
    }

    /// Copy the half-open range `[start, start + length)` along `dim`
    ///
    /// The result always owns fresh storage.
    pub fn narrow(&self, dim: isize, start: usize, length: usize) -> Result<Tensor> {
        let d = self.normalize_dim(dim)?;
        let size = self.shape()[d];
        let layout = self.layout().narrow(d, start, length).ok_or_else(|| {
            Error::invalid_argument(
                "length",
                format!("start {start} + length {length} exceeds dimension {d} of size {size}"),
            )
        })?;
        Ok(self.with_layout(layout).materialize())
    }

    /// Remove size-1 dimensions (zero-copy)
    ///
    /// With `Some(dim)`, removes that axis if its size is 1 and is a no-op
    /// otherwise. With `None`, removes every size-1 axis. The last remaining
    /// axis is never removed.
    pub fn squeeze(&self, dim: Option<isize>) -> Result<Tensor> {
        let dim = dim.map(|d| self.normalize_dim(d)).transpose()?;
        Ok(self.with_layout(self.layout().squeeze(dim)))
    }

    /// Insert a size-1 dimension at `dim` (zero-copy)
    ///
    /// `dim` ranges over `[-(ndim + 1), ndim]`.
    pub fn unsqueeze(&self, dim: isize) -> Result<Tensor> {
        if self.ndim() + 1 > crate::MAX_RANK {
            return Err(Error::unsupported_rank(self.ndim() + 1));
        }
        let layout = self
            .layout()
            .normalize_insert_dim(dim)
            .and_then(|idx| self.layout().unsqueeze(idx))
            .ok_or(Error::InvalidDimension {
                dim,
                ndim: self.ndim() + 1,
            })?;
        Ok(self.with_layout(layout))
    }

    /// Tile the tensor `reps[d]` times along each axis
    ///
    /// `reps` must have at least `ndim` entries; the tensor is treated as
    /// left-padded with size-1 axes up to `reps.len()`.
    ///
    /// ```
    /// use ndtensor::tensor::Tensor;
    /// let t = Tensor::new(&[1i64, 2]).unwrap();
    /// let r = t.repeat(&[2, 2]).unwrap();
    /// assert_eq!(r.shape(), &[2, 4]);
    /// assert_eq!(r.to_vec::<i64>(), vec![1, 2, 1, 2, 1, 2, 1, 2]);
    /// ```
    pub fn repeat(&self, reps: &[usize]) -> Result<Tensor> {
        if reps.len() > crate::MAX_RANK {
            return Err(Error::unsupported_rank(reps.len()));
        }
        if reps.len() < self.ndim() {
            return Err(Error::invalid_argument(
                "reps",
                format!(
                    "expected at least {} repetitions, got {}",
                    self.ndim(),
                    reps.len()
                ),
            ));
        }

        let mut src = self.layout().clone();
        while src.ndim() < reps.len() {
            src = src.unsqueeze(0).ok_or(Error::unsupported_rank(src.ndim() + 1))?;
        }
        let out_shape: Vec<usize> = src
            .shape()
            .iter()
            .zip(reps)
            .map(|(&s, &r)| s * r)
            .collect();
        trace!("repeat {:?} x {:?} -> {:?}", self.shape(), reps, out_shape);

        let out_layout = Layout::contiguous(&out_shape);
        let positions: Vec<usize> = out_layout
            .indexed_offsets()
            .map(|(idx, _)| {
                let wrapped: Index = idx
                    .iter()
                    .zip(src.shape())
                    .map(|(&i, &s)| i % s)
                    .collect();
                src.position(&wrapped)
            })
            .collect();

        let data = dispatch_storage!(self.storage().data(), v, T => {
            let out: Vec<T> = positions.iter().map(|&p| v[p]).collect();
            T::into_storage(out)
        });
        Tensor::from_storage_data(data, &out_shape)
    }

    /// Expand size-1 axes to `shape` by repetition
    ///
    /// The tensor is left-padded with size-1 axes when its rank is lower.
    /// Every aligned axis must either match `shape` or have size 1.
    pub fn expand(&self, shape: &[usize]) -> Result<Tensor> {
        let ndim = self.ndim();
        if shape.len() < ndim {
            return Err(Error::shape_mismatch(shape, self.shape()));
        }

        let pad = shape.len() - ndim;
        let mut reps = Vec::with_capacity(shape.len());
        for (d, &target) in shape.iter().enumerate() {
            let size = if d < pad { 1 } else { self.shape()[d - pad] };
            if size == target {
                reps.push(1);
            } else if size == 1 {
                reps.push(target);
            } else {
                return Err(Error::shape_mismatch(shape, self.shape()));
            }
        }
        self.repeat(&reps)
    }

    /// Expand to the shape of `other`
    pub fn expand_as(&self, other: &Tensor) -> Result<Tensor> {
        self.expand(other.shape())
    }

    /// Repeat with `reps` left-padded by 1s up to the tensor's rank
    pub fn tile(&self, reps: &[usize]) -> Result<Tensor> {
        if reps.len() >= self.ndim() {
            return self.repeat(reps);
        }
        let mut padded = vec![1; self.ndim() - reps.len()];
        padded.extend_from_slice(reps);
        self.repeat(&padded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;

    fn arange(shape: &[usize]) -> Tensor {
        let n: usize = shape.iter().product();
        Tensor::from_vec((0..n as i64).collect::<Vec<_>>(), shape).unwrap()
    }

    #[test]
    fn test_infer_shape() {
        assert_eq!(infer_shape(&[2, -1], 6), Some(vec![2, 3]));
        assert_eq!(infer_shape(&[-1], 6), Some(vec![6]));
        assert_eq!(infer_shape(&[4, -1], 6), None);
        assert_eq!(infer_shape(&[-1, -1], 6), None);
        assert_eq!(infer_shape(&[-2, 3], 6), None);
        assert_eq!(infer_shape(&[2, 2], 6), None);
    }

    #[test]
    fn test_permute_shares_storage() {
        let t = arange(&[2, 3, 4]);
        let p = t.permute(&[2, 0, 1]).unwrap();
        assert_eq!(p.shape(), &[4, 2, 3]);
        assert_eq!(p.strides(), &[1, 12, 4]);
        assert!(p.shares_storage(&t));
        assert_eq!(p.get_at::<i64>(&[3, 1, 2]).unwrap(), t.get_at::<i64>(&[1, 2, 3]).unwrap());
    }

    #[test]
    fn test_permute_validation() {
        let t = arange(&[2, 3]);
        assert!(matches!(t.permute(&[0]), Err(Error::InvalidArgument { .. })));
        assert!(matches!(t.permute(&[0, 0]), Err(Error::InvalidArgument { .. })));
        assert!(matches!(
            t.permute(&[0, 2]),
            Err(Error::InvalidDimension { dim: 2, ndim: 2 })
        ));
        assert_eq!(t.permute(&[-1, 0]).unwrap().shape(), &[3, 2]);
    }

    #[test]
    fn test_t() {
        let v = arange(&[3]);
        assert_eq!(v.t().unwrap().shape(), &[3]);
        assert_eq!(arange(&[2, 3]).t().unwrap().shape(), &[3, 2]);
        assert!(arange(&[2, 3, 4]).t().is_err());
    }

    #[test]
    fn test_view_requires_contiguous() {
        let t = arange(&[2, 3]);
        assert_eq!(t.view(&[3, -1]).unwrap().shape(), &[3, 2]);
        let tt = t.transpose(0, 1).unwrap();
        assert!(matches!(tt.view(&[6]), Err(Error::NotContiguous)));
        assert_eq!(
            tt.reshape(&[6]).unwrap().to_vec::<i64>(),
            vec![0, 3, 1, 4, 2, 5]
        );
    }

    #[test]
    fn test_view_errors() {
        let t = arange(&[2, 3]);
        assert!(matches!(t.view(&[4, 2]), Err(Error::InvalidReshape { numel: 6, .. })));
        assert!(matches!(t.view(&[-1, -1]), Err(Error::InvalidReshape { .. })));
        assert!(matches!(
            t.view(&[1, 1, 1, 1, 1, 1, 1, 2, 3]),
            Err(Error::UnsupportedRank { rank: 9, .. })
        ));
    }

    #[test]
    fn test_narrow_copies() {
        let t = arange(&[4, 2]);
        let n = t.narrow(0, 1, 2).unwrap();
        assert_eq!(n.shape(), &[2, 2]);
        assert_eq!(n.to_vec::<i64>(), vec![2, 3, 4, 5]);
        assert!(!n.shares_storage(&t));
        assert!(matches!(t.narrow(0, 3, 2), Err(Error::InvalidArgument { .. })));
        assert_eq!(t.narrow(1, 2, 0).unwrap().shape(), &[4, 0]);
    }

    #[test]
    fn test_squeeze_unsqueeze() {
        let t = arange(&[1, 3, 1]);
        assert_eq!(t.squeeze(None).unwrap().shape(), &[3]);
        assert_eq!(t.squeeze(Some(-1)).unwrap().shape(), &[1, 3]);
        assert_eq!(t.squeeze(Some(1)).unwrap().shape(), &[1, 3, 1]);
        assert!(t.squeeze(Some(3)).is_err());

        let u = arange(&[2, 3]).unsqueeze(-1).unwrap();
        assert_eq!(u.shape(), &[2, 3, 1]);
        assert_eq!(u.strides(), &[3, 1, 1]);
        assert_eq!(arange(&[2, 3]).unsqueeze(1).unwrap().shape(), &[2, 1, 3]);
        assert!(arange(&[2, 3]).unsqueeze(4).is_err());
        assert!(matches!(
            Tensor::zeros(&[1; 8], DType::F32).unwrap().unsqueeze(0),
            Err(Error::UnsupportedRank { rank: 9, .. })
        ));
    }

    #[test]
    fn test_repeat_pads_rank() {
        let t = arange(&[2]);
        let r = t.repeat(&[3, 2]).unwrap();
        assert_eq!(r.shape(), &[3, 4]);
        assert_eq!(r.get(&[2]).unwrap().to_vec::<i64>(), vec![0, 1, 0, 1]);
        assert!(matches!(arange(&[2, 2]).repeat(&[2]), Err(Error::InvalidArgument { .. })));
        assert!(matches!(t.repeat(&[1; 9]), Err(Error::UnsupportedRank { .. })));
    }

    #[test]
    fn test_repeat_of_strided_view() {
        let t = arange(&[2, 2]).transpose(0, 1).unwrap();
        let r = t.repeat(&[1, 2]).unwrap();
        assert_eq!(r.to_vec::<i64>(), vec![0, 2, 0, 2, 1, 3, 1, 3]);
    }

    #[test]
    fn test_expand_as() {
        let col = arange(&[3, 1]);
        let target = Tensor::zeros(&[3, 4], DType::F32).unwrap();
        let e = col.expand_as(&target).unwrap();
        assert_eq!(e.shape(), &[3, 4]);
        assert_eq!(e.get(&[2]).unwrap().to_vec::<i64>(), vec![2, 2, 2, 2]);

        let row = arange(&[4]);
        assert_eq!(row.expand(&[2, 4]).unwrap().shape(), &[2, 4]);
        assert!(matches!(arange(&[3]).expand(&[2, 4]), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_tile_pads_reps() {
        let t = arange(&[2, 2]);
        assert_eq!(t.tile(&[3]).unwrap().shape(), &[2, 6]);
        assert_eq!(t.tile(&[2, 1, 1]).unwrap().shape(), &[2, 2, 2]);
    }
}
