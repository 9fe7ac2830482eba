//! Assembly operations: cat, stack, split, chunk, flip
//!
//! `cat` and `flip` work on the rotated form of their inputs: the target axis
//! is permuted to the front and made contiguous, so that the buffer is a
//! sequence of axis-0 slices. The result is rotated back afterwards.
//! `split` and `chunk` are built on [`Tensor::narrow`].

use crate::dispatch_dtype;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::tensor::{Tensor, axis_to_front, inverse_permutation};
use log::trace;

// ============================================================================
// Validation
// ============================================================================

/// Parameters for cat operation after validation.
#[derive(Debug, Clone)]
pub struct CatParams {
    /// Normalized dimension index
    pub dim_idx: usize,
    /// Data type of all tensors
    pub dtype: DType,
    /// Output shape
    pub out_shape: Vec<usize>,
}

/// Validate inputs for cat operation and compute output parameters.
pub fn validate_cat(tensors: &[&Tensor], dim: isize) -> Result<CatParams> {
    let Some(&first) = tensors.first() else {
        return Err(Error::invalid_argument(
            "tensors",
            "cat requires at least one tensor",
        ));
    };
    let dtype = first.dtype();
    let ndim = first.ndim();
    let dim_idx = first.normalize_dim(dim)?;

    let mut cat_dim_total = first.shape()[dim_idx];
    for &tensor in &tensors[1..] {
        if tensor.dtype() != dtype {
            return Err(Error::DTypeMismatch {
                lhs: dtype,
                rhs: tensor.dtype(),
            });
        }
        let compatible = tensor.ndim() == ndim
            && first
                .shape()
                .iter()
                .zip(tensor.shape())
                .enumerate()
                .all(|(i, (&a, &b))| i == dim_idx || a == b);
        if !compatible {
            return Err(Error::shape_mismatch(first.shape(), tensor.shape()));
        }
        cat_dim_total += tensor.shape()[dim_idx];
    }

    let mut out_shape = first.shape().to_vec();
    out_shape[dim_idx] = cat_dim_total;

    Ok(CatParams {
        dim_idx,
        dtype,
        out_shape,
    })
}

/// Validate inputs for stack operation.
///
/// Returns the normalized position of the new dimension.
pub fn validate_stack(tensors: &[&Tensor], dim: isize) -> Result<usize> {
    let Some(&first) = tensors.first() else {
        return Err(Error::invalid_argument(
            "tensors",
            "stack requires at least one tensor",
        ));
    };

    for &tensor in &tensors[1..] {
        if tensor.dtype() != first.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: first.dtype(),
                rhs: tensor.dtype(),
            });
        }
        if tensor.shape() != first.shape() {
            return Err(Error::shape_mismatch(first.shape(), tensor.shape()));
        }
    }

    first
        .layout()
        .normalize_insert_dim(dim)
        .ok_or(Error::InvalidDimension {
            dim,
            ndim: first.ndim() + 1,
        })
}

// ============================================================================
// Cat / Stack
// ============================================================================

/// Concatenate tensors along an existing dimension
///
/// All inputs must share dtype and rank, and agree on every axis but `dim`.
///
/// ```
/// use ndtensor::prelude::*;
/// let a = Tensor::new(&[[1i64, 2]]).unwrap();
/// let b = Tensor::new(&[[3i64, 4], [5, 6]]).unwrap();
/// let c = cat(&[&a, &b], 0).unwrap();
/// assert_eq!(c.shape(), &[3, 2]);
/// ```
pub fn cat(tensors: &[&Tensor], dim: isize) -> Result<Tensor> {
    let params = validate_cat(tensors, dim)?;
    let ndim = params.out_shape.len();
    let order = axis_to_front(params.dim_idx, ndim);
    trace!(
        "cat {} tensors along axis {} -> {:?}",
        tensors.len(),
        params.dim_idx,
        params.out_shape
    );

    let rotated_shape: Vec<usize> = order.iter().map(|&d| params.out_shape[d]).collect();
    let data = dispatch_dtype!(params.dtype, T => {
        let total: usize = params.out_shape.iter().product();
        let mut out: Vec<T> = Vec::with_capacity(total);
        for &tensor in tensors {
            let rotated = tensor.permute_unchecked(&order).contiguous();
            let src = rotated
                .storage()
                .as_slice::<T>()
                .ok_or(Error::DTypeMismatch { lhs: params.dtype, rhs: rotated.dtype() })?;
            let start = rotated.offset();
            out.extend_from_slice(&src[start..start + rotated.numel()]);
        }
        T::into_storage(out)
    });

    let joined = Tensor::from_storage_data(data, &rotated_shape)?;
    Ok(joined
        .permute_unchecked(&inverse_permutation(&order))
        .contiguous())
}

/// Stack equally-shaped tensors along a new dimension
///
/// `dim` ranges over `[-(ndim + 1), ndim]`.
pub fn stack(tensors: &[&Tensor], dim: isize) -> Result<Tensor> {
    let dim_idx = validate_stack(tensors, dim)?;
    let expanded = tensors
        .iter()
        .map(|t| t.unsqueeze(dim_idx as isize))
        .collect::<Result<Vec<_>>>()?;
    let refs: Vec<&Tensor> = expanded.iter().collect();
    cat(&refs, dim_idx as isize)
}

// ============================================================================
// Split / Chunk
// ============================================================================

/// Split a tensor into pieces of `split_size` along a dimension.
///
/// The last piece is shorter when the axis length is not a multiple of
/// `split_size`. Every piece owns its storage.
pub fn split(tensor: &Tensor, split_size: usize, dim: isize) -> Result<Vec<Tensor>> {
    if split_size == 0 {
        return Err(Error::invalid_argument(
            "split_size",
            "split_size must be greater than zero",
        ));
    }

    let dim_idx = tensor.normalize_dim(dim)?;
    let dim_size = tensor.shape()[dim_idx];

    let mut result = Vec::new();
    let mut start = 0;

    while start < dim_size {
        let length = (dim_size - start).min(split_size);
        result.push(tensor.narrow(dim, start, length)?);
        start += length;
    }

    Ok(result)
}

/// Split a tensor into `chunks` pieces of `ceil(len / chunks)` along a dimension.
///
/// Fewer than `chunks` pieces are returned when the axis is too short.
pub fn chunk(tensor: &Tensor, chunks: usize, dim: isize) -> Result<Vec<Tensor>> {
    if chunks == 0 {
        return Err(Error::invalid_argument(
            "chunks",
            "chunks must be greater than zero",
        ));
    }

    let dim_idx = tensor.normalize_dim(dim)?;
    let dim_size = tensor.shape()[dim_idx];
    let split_size = dim_size.div_ceil(chunks).max(1);
    split(tensor, split_size, dim)
}

impl Tensor {
    /// Split into pieces of `split_size` along `dim`
    pub fn split(&self, split_size: usize, dim: isize) -> Result<Vec<Tensor>> {
        split(self, split_size, dim)
    }

    /// Split into `chunks` pieces along `dim`
    pub fn chunk(&self, chunks: usize, dim: isize) -> Result<Vec<Tensor>> {
        chunk(self, chunks, dim)
    }

    /// Reverse the order of elements along `dim`
    pub fn flip(&self, dim: isize) -> Result<Tensor> {
        let d = self.normalize_dim(dim)?;
        let order = axis_to_front(d, self.ndim());
        let rotated = self.permute_unchecked(&order).contiguous();
        let n = rotated.shape()[0];
        let inner = if n == 0 { 0 } else { rotated.numel() / n };

        let data = dispatch_dtype!(self.dtype(), T => {
            let src = rotated
                .storage()
                .as_slice::<T>()
                .ok_or(Error::DTypeMismatch { lhs: self.dtype(), rhs: rotated.dtype() })?;
            let start = rotated.offset();
            let src = &src[start..start + rotated.numel()];
            let mut out: Vec<T> = Vec::with_capacity(src.len());
            for k in (0..n).rev() {
                out.extend_from_slice(&src[k * inner..(k + 1) * inner]);
            }
            T::into_storage(out)
        });

        let flipped = Tensor::from_storage_data(data, rotated.shape())?;
        Ok(flipped
            .permute_unchecked(&inverse_permutation(&order))
            .contiguous())
    }

    /// Reverse the order of elements along each of `dims`
    pub fn flip_dims(&self, dims: &[isize]) -> Result<Tensor> {
        let mut seen = [false; crate::MAX_RANK];
        for &dim in dims {
            let d = self.normalize_dim(dim)?;
            if seen[d] {
                return Err(Error::invalid_argument(
                    "dims",
                    format!("axis {d} appears more than once"),
                ));
            }
            seen[d] = true;
        }

        let mut out = self.contiguous();
        for &dim in dims {
            out = out.flip(dim)?;
        }
        Ok(out)
    }
}
