//! Reduction operations
//!
//! Every reduction folds a contiguous buffer laid out as `n` consecutive
//! slices of `inner` elements. Global reductions use the row-major element
//! sequence with `inner == 1`. Per-axis reductions first rotate the reduced
//! axis to the front (`permute` + `contiguous`) so that slice `k` holds every
//! element with index `k` along that axis, then rotate the result back.

use crate::dispatch_storage;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::tensor::{Tensor, axis_to_front, inverse_permutation};
use log::trace;

/// Reduction operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReduceOp {
    /// Sum of elements
    Sum,
    /// Mean of elements
    Mean,
    /// Unbiased standard deviation (divides by `n - 1`)
    Std,
    /// Maximum element
    Max,
    /// Minimum element
    Min,
    /// Product of elements
    Prod,
    /// Lower median (index `(n - 1) / 2` of the sorted values)
    Median,
}

impl ReduceOp {
    /// Operation name used in errors and logs
    pub fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Std => "std",
            Self::Max => "max",
            Self::Min => "min",
            Self::Prod => "prod",
            Self::Median => "median",
        }
    }

    /// True for reductions defined only on floating point data
    pub fn requires_float(self) -> bool {
        matches!(self, Self::Mean | Self::Std)
    }
}

/// Compute output shape for a single-axis reduction
///
/// # Arguments
/// * `input_shape` - Shape of input tensor
/// * `dim` - Dimension to reduce over
/// * `keepdim` - If true, keep the reduced dimension as size 1
///
/// A rank-1 input reduced without `keepdim` yields `[1]`.
pub fn reduce_output_shape(input_shape: &[usize], dim: usize, keepdim: bool) -> Vec<usize> {
    if keepdim {
        input_shape
            .iter()
            .enumerate()
            .map(|(i, &s)| if i == dim { 1 } else { s })
            .collect()
    } else {
        let shape: Vec<usize> = input_shape
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != dim)
            .map(|(_, &s)| s)
            .collect();
        if shape.is_empty() { vec![1] } else { shape }
    }
}

fn fold_slices<T: Element>(src: &[T], n: usize, inner: usize, combine: fn(T, T) -> T) -> Vec<T> {
    let mut acc = src[..inner].to_vec();
    for slice in src.chunks_exact(inner.max(1)).take(n).skip(1) {
        for (a, &x) in acc.iter_mut().zip(slice) {
            *a = combine(*a, x);
        }
    }
    acc
}

fn mean_slices(src: &[f64], n: usize, inner: usize) -> Vec<f64> {
    let mut acc = vec![0.0; inner];
    for slice in src.chunks_exact(inner.max(1)).take(n) {
        for (a, &x) in acc.iter_mut().zip(slice) {
            *a += x;
        }
    }
    acc.iter().map(|&s| s / n as f64).collect()
}

fn std_slices(src: &[f64], n: usize, inner: usize) -> Vec<f64> {
    let mean = mean_slices(src, n, inner);
    let mut acc = vec![0.0; inner];
    for slice in src.chunks_exact(inner.max(1)).take(n) {
        for ((a, &x), &m) in acc.iter_mut().zip(slice).zip(&mean) {
            *a += (x - m) * (x - m);
        }
    }
    acc.iter().map(|&s| (s / (n as f64 - 1.0)).sqrt()).collect()
}

fn median_slices<T: Element>(src: &[T], n: usize, inner: usize) -> Vec<T> {
    let mut column = Vec::with_capacity(n);
    (0..inner)
        .map(|j| {
            column.clear();
            column.extend((0..n).map(|k| src[k * inner + j]));
            column.sort_by(|a, b| a.total_order(b));
            column[(n - 1) / 2]
        })
        .collect()
}

/// Reduce `n` slices of `inner` elements down to one slice
fn reduce_kernel<T: Element>(op: ReduceOp, src: &[T], n: usize, inner: usize) -> Vec<T> {
    match op {
        ReduceOp::Sum => fold_slices(src, n, inner, T::add_elem),
        ReduceOp::Prod => fold_slices(src, n, inner, T::mul_elem),
        ReduceOp::Min => fold_slices(src, n, inner, T::min_elem),
        ReduceOp::Max => fold_slices(src, n, inner, T::max_elem),
        ReduceOp::Median => median_slices(src, n, inner),
        ReduceOp::Mean | ReduceOp::Std => {
            let wide: Vec<f64> = src.iter().map(|x| x.to_f64()).collect();
            let out = if op == ReduceOp::Mean {
                mean_slices(&wide, n, inner)
            } else {
                std_slices(&wide, n, inner)
            };
            out.into_iter().map(T::from_f64).collect()
        }
    }
}

impl Tensor {
    fn check_reduction(&self, op: ReduceOp) -> Result<()> {
        if op.requires_float() && !self.dtype().is_float() {
            return Err(Error::unsupported_dtype(self.dtype(), op.name()));
        }
        Ok(())
    }

    /// Reduce every element to a one-element `[1]` tensor
    pub fn reduce_all(&self, op: ReduceOp) -> Result<Tensor> {
        self.check_reduction(op)?;
        let n = self.numel();
        if n == 0 {
            return Err(Error::EmptyReduction { op: op.name() });
        }
        trace!("{} over {} elements", op.name(), n);

        let data = self.to_storage_data();
        let out = dispatch_storage!(&data, src, T => {
            T::into_storage(reduce_kernel(op, src, n, 1))
        });
        Tensor::from_storage_data(out, &[1])
    }

    /// Reduce along one axis
    ///
    /// With `keepdim` the result keeps every axis, with size 1 at `dim`;
    /// otherwise `dim` is removed (a rank-1 input yields `[1]`).
    pub fn reduce_dim(&self, op: ReduceOp, dim: isize, keepdim: bool) -> Result<Tensor> {
        self.check_reduction(op)?;
        let d = self.normalize_dim(dim)?;
        let n = self.shape()[d];
        if n == 0 {
            return Err(Error::EmptyReduction { op: op.name() });
        }

        let ndim = self.ndim();
        let order = axis_to_front(d, ndim);
        let rotated = self.permute_unchecked(&order).contiguous();
        let inner = self.numel() / n;
        trace!(
            "{} along axis {} of {:?}: {} slices of {}",
            op.name(),
            d,
            self.shape(),
            n,
            inner
        );

        let start = rotated.offset();
        let end = start + rotated.numel();
        let out = dispatch_storage!(rotated.storage().data(), src, T => {
            T::into_storage(reduce_kernel(op, &src[start..end], n, inner))
        });

        let rest: Vec<usize> = rotated.shape()[1..].to_vec();
        if rest.is_empty() {
            return Tensor::from_storage_data(out, &[1]);
        }
        let folded = Tensor::from_storage_data(out, &rest)?;
        if !keepdim {
            return Ok(folded);
        }
        Ok(folded
            .unsqueeze(0)?
            .permute_unchecked(&inverse_permutation(&order))
            .contiguous())
    }

    /// Sum of all elements
    pub fn sum(&self) -> Result<Tensor> {
        self.reduce_all(ReduceOp::Sum)
    }

    /// Mean of all elements (float dtypes only)
    pub fn mean(&self) -> Result<Tensor> {
        self.reduce_all(ReduceOp::Mean)
    }

    /// Unbiased standard deviation of all elements (float dtypes only)
    ///
    /// ```
    /// use ndtensor::tensor::Tensor;
    /// let t = Tensor::new(&[2.0f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
    /// let s = t.std().unwrap().item::<f64>().unwrap();
    /// assert!((s - 2.13809).abs() < 1e-5);
    /// ```
    pub fn std(&self) -> Result<Tensor> {
        self.reduce_all(ReduceOp::Std)
    }

    /// Smallest element
    pub fn min(&self) -> Result<Tensor> {
        self.reduce_all(ReduceOp::Min)
    }

    /// Largest element
    pub fn max(&self) -> Result<Tensor> {
        self.reduce_all(ReduceOp::Max)
    }

    /// Product of all elements
    pub fn prod(&self) -> Result<Tensor> {
        self.reduce_all(ReduceOp::Prod)
    }

    /// Lower median of all elements
    ///
    /// For an even count this is the element at sorted index `n/2 - 1`;
    /// the two middle values are never averaged.
    pub fn median(&self) -> Result<Tensor> {
        self.reduce_all(ReduceOp::Median)
    }

    /// Sum along `dim`
    pub fn sum_dim(&self, dim: isize, keepdim: bool) -> Result<Tensor> {
        self.reduce_dim(ReduceOp::Sum, dim, keepdim)
    }

    /// Mean along `dim` (float dtypes only)
    pub fn mean_dim(&self, dim: isize, keepdim: bool) -> Result<Tensor> {
        self.reduce_dim(ReduceOp::Mean, dim, keepdim)
    }

    /// Unbiased standard deviation along `dim` (float dtypes only)
    pub fn std_dim(&self, dim: isize, keepdim: bool) -> Result<Tensor> {
        self.reduce_dim(ReduceOp::Std, dim, keepdim)
    }

    /// Minimum along `dim`
    pub fn min_dim(&self, dim: isize, keepdim: bool) -> Result<Tensor> {
        self.reduce_dim(ReduceOp::Min, dim, keepdim)
    }

    /// Maximum along `dim`
    pub fn max_dim(&self, dim: isize, keepdim: bool) -> Result<Tensor> {
        self.reduce_dim(ReduceOp::Max, dim, keepdim)
    }

    /// Product along `dim`
    pub fn prod_dim(&self, dim: isize, keepdim: bool) -> Result<Tensor> {
        self.reduce_dim(ReduceOp::Prod, dim, keepdim)
    }

    /// Lower median along `dim`
    pub fn median_dim(&self, dim: isize, keepdim: bool) -> Result<Tensor> {
        self.reduce_dim(ReduceOp::Median, dim, keepdim)
    }
}
