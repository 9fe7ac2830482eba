//! Core Tensor type

use super::nested::NestedData;
use super::{Layout, Storage, StorageData};
use crate::dispatch_storage;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use log::debug;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use std::fmt;

/// N-dimensional strided array over a host buffer
///
/// `Tensor` is the fundamental data structure in ndtensor. It consists of:
/// - **Storage**: Reference-counted, copy-on-write element buffer
/// - **Layout**: Shape, strides, and offset defining the view into storage
/// - **DType**: Element type (carried by the storage, chosen at runtime)
///
/// # Zero-Copy Views
///
/// Operations like `transpose`, `permute`, and `view` create new tensors
/// that share the same underlying storage. Writes (`set`, `add_`, ...) take
/// `&mut self` and duplicate a shared buffer first, so a view never observes
/// a mutation made through another tensor.
///
/// # Example
///
/// ```
/// use ndtensor::prelude::*;
///
/// let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
/// let b = a.transpose(0, 1).unwrap(); // Zero-copy, shares storage with a
/// assert!(a.shares_storage(&b));
/// ```
#[derive(Clone)]
pub struct Tensor {
    /// Element buffer
    storage: Storage,
    /// Shape, strides, offset
    layout: Layout,
}

/// Reject ranks outside `1..=MAX_RANK`
pub(crate) fn check_rank(rank: usize) -> Result<()> {
    if rank == 0 || rank > crate::MAX_RANK {
        return Err(Error::unsupported_rank(rank));
    }
    Ok(())
}

impl Tensor {
    /// Create a tensor from storage and layout
    ///
    /// The caller guarantees that every position addressed by `layout` lies
    /// inside `storage`.
    pub fn from_parts(storage: Storage, layout: Layout) -> Self {
        Self { storage, layout }
    }

    /// Create a contiguous tensor over a tagged buffer
    pub fn from_storage_data(data: StorageData, shape: &[usize]) -> Result<Self> {
        check_rank(shape.len())?;
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        Ok(Self {
            storage: Storage::new(data),
            layout: Layout::contiguous(shape),
        })
    }

    /// Create a tensor from a slice of data
    ///
    /// Returns an error if `data.len()` does not equal the product of the
    /// `shape` dimensions, or if the rank is outside `1..=8`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndtensor::tensor::Tensor;
    /// let tensor = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    /// assert_eq!(tensor.shape(), &[2, 2]);
    /// ```
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize]) -> Result<Self> {
        Self::from_vec(data.to_vec(), shape)
    }

    /// Create a tensor taking ownership of a flat buffer
    pub fn from_vec<T: Element>(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        Self::from_storage_data(T::into_storage(data), shape)
    }

    /// Create a tensor from nested arrays or `Vec`s
    ///
    /// The shape is inferred from the nesting; ragged input fails with
    /// `ShapeMismatch`. A bare scalar becomes a one-element `[1]` tensor.
    ///
    /// ```
    /// use ndtensor::tensor::Tensor;
    /// let t = Tensor::new(&[[1i64, 2, 3], [4, 5, 6]]).unwrap();
    /// assert_eq!(t.shape(), &[2, 3]);
    /// let ragged = Tensor::new(&vec![vec![1.0f64, 2.0], vec![3.0]]);
    /// assert!(ragged.is_err());
    /// ```
    pub fn new<N: NestedData + ?Sized>(data: &N) -> Result<Self> {
        let mut shape = Vec::new();
        data.collect_shape(&mut shape);
        if shape.len() > crate::MAX_RANK {
            return Err(Error::unsupported_rank(shape.len()));
        }
        if shape.contains(&0) {
            return Err(Error::invalid_argument(
                "data",
                "nested input must not contain empty sequences",
            ));
        }

        let mut flat = Vec::with_capacity(shape.iter().product());
        data.flatten_into(&shape, &mut flat)?;

        if shape.is_empty() {
            shape.push(1);
        }
        Self::from_vec(flat, &shape)
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], dtype: DType) -> Result<Self> {
        Self::full(shape, dtype, 0.0)
    }

    /// Create a tensor filled with ones
    pub fn ones(shape: &[usize], dtype: DType) -> Result<Self> {
        Self::full(shape, dtype, 1.0)
    }

    /// Create a tensor filled with a scalar value, cast to `dtype`
    pub fn full(shape: &[usize], dtype: DType, value: f64) -> Result<Self> {
        check_rank(shape.len())?;
        let len: usize = shape.iter().product();
        let data = crate::dispatch_dtype!(dtype, T => { T::into_storage(vec![T::from_f64(value); len]) });
        Self::from_storage_data(data, shape)
    }

    /// Create a zero tensor with the shape and dtype of `other`
    pub fn zeros_like(other: &Tensor) -> Result<Self> {
        Self::zeros(other.shape(), other.dtype())
    }

    /// Create a tensor of ones with the shape and dtype of `other`
    pub fn ones_like(other: &Tensor) -> Result<Self> {
        Self::ones(other.shape(), other.dtype())
    }

    /// Create a 1-D tensor of values in `[start, stop)` spaced by `step`
    pub fn arange(start: f64, stop: f64, step: f64, dtype: DType) -> Result<Self> {
        if step == 0.0 || !step.is_finite() {
            return Err(Error::invalid_argument("step", "must be finite and non-zero"));
        }
        let count = ((stop - start) / step).ceil();
        if count.is_nan() || count < 1.0 {
            return Err(Error::invalid_argument(
                "stop",
                format!("range [{start}, {stop}) with step {step} is empty"),
            ));
        }
        let count = count as usize;
        let data = crate::dispatch_dtype!(dtype, T => {
            T::into_storage((0..count).map(|i| T::from_f64(start + i as f64 * step)).collect())
        });
        Self::from_storage_data(data, &[count])
    }

    /// Create a tensor of uniform random values in `[0, 1)`
    ///
    /// Only floating point dtypes are supported.
    pub fn rand(shape: &[usize], dtype: DType) -> Result<Self> {
        Self::rand_with(shape, dtype, &mut rand::rng())
    }

    /// Create a tensor of standard normal random values (mean 0, std 1)
    pub fn randn(shape: &[usize], dtype: DType) -> Result<Self> {
        Self::randn_with(shape, dtype, &mut rand::rng())
    }

    /// [`Tensor::rand`] drawing from a caller-supplied generator
    pub fn rand_with<R: Rng>(shape: &[usize], dtype: DType, rng: &mut R) -> Result<Self> {
        Self::random_fill(shape, dtype, "rand", || rng.random::<f64>())
    }

    /// [`Tensor::randn`] drawing from a caller-supplied generator
    pub fn randn_with<R: Rng>(shape: &[usize], dtype: DType, rng: &mut R) -> Result<Self> {
        let normal = StandardNormal;
        Self::random_fill(shape, dtype, "randn", || normal.sample(&mut *rng))
    }

    fn random_fill(
        shape: &[usize],
        dtype: DType,
        op: &'static str,
        mut sample: impl FnMut() -> f64,
    ) -> Result<Self> {
        if !dtype.is_float() {
            return Err(Error::unsupported_dtype(dtype, op));
        }
        check_rank(shape.len())?;
        let len: usize = shape.iter().product();
        let data = crate::dispatch_dtype!(dtype, T => {
            T::into_storage((0..len).map(|_| T::from_f64(sample())).collect())
        });
        Self::from_storage_data(data, shape)
    }

    // ===== Accessors =====

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Get the storage offset of the first element
    #[inline]
    pub fn offset(&self) -> usize {
        self.layout.offset()
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Check if the tensor is contiguous in memory
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Get size along a dimension (supports negative indexing)
    pub fn size(&self, dim: isize) -> Option<usize> {
        self.layout.dim(dim)
    }

    /// Check if two tensors read from the same buffer
    pub fn shares_storage(&self, other: &Tensor) -> bool {
        self.storage.shares_with(&other.storage)
    }

    /// Normalize a dimension argument, failing with `InvalidDimension`
    pub(crate) fn normalize_dim(&self, dim: isize) -> Result<usize> {
        self.layout
            .normalize_dim(dim)
            .ok_or(Error::InvalidDimension {
                dim,
                ndim: self.ndim(),
            })
    }

    /// Same storage, different layout
    pub(crate) fn with_layout(&self, layout: Layout) -> Self {
        Self {
            storage: self.storage.clone(),
            layout,
        }
    }

    /// Mutable access to the buffer (copy-on-write)
    pub(crate) fn storage_mut(&mut self) -> &mut StorageData {
        self.storage.make_mut()
    }

    // ===== Materialization =====

    /// Return a row-major copy, or `self` shared if already contiguous
    ///
    /// Non-contiguous tensors are walked in row-major order under their current
    /// strides and gathered into a fresh buffer.
    pub fn contiguous(&self) -> Self {
        if self.is_contiguous() {
            self.clone()
        } else {
            debug!(
                "materializing non-contiguous {} tensor {:?} with strides {:?}",
                self.dtype(),
                self.shape(),
                self.strides()
            );
            self.materialize()
        }
    }

    /// Row-major copy into a buffer owned by the result alone
    pub(crate) fn materialize(&self) -> Self {
        let layout = &self.layout;
        let data = dispatch_storage!(self.storage.data(), src, T => {
            let out: Vec<T> = layout.offsets().map(|pos| src[pos]).collect();
            T::into_storage(out)
        });
        Self {
            storage: Storage::new(data),
            layout: Layout::contiguous(self.shape()),
        }
    }

    /// Elements in row-major order as a tagged buffer
    pub fn to_storage_data(&self) -> StorageData {
        if self.is_contiguous() {
            let start = self.offset();
            let end = start + self.numel();
            dispatch_storage!(self.storage.data(), src, T => {
                T::into_storage(src[start..end].to_vec())
            })
        } else {
            let data = self.materialize();
            data.storage.data().clone()
        }
    }

    // ===== Data Access =====

    /// Copy the elements in row-major order, converting them to `T`
    ///
    /// Conversion uses `as`-cast semantics (floats truncate toward zero when
    /// read as `i64`).
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        let layout = &self.layout;
        dispatch_storage!(self.storage.data(), src, S => {
            layout.offsets().map(|pos| T::from_elem(src[pos])).collect()
        })
    }

    /// Extract the scalar value from a single-element tensor
    ///
    /// # Example
    ///
    /// ```
    /// use ndtensor::tensor::Tensor;
    /// let t = Tensor::from_slice(&[4.5f64], &[1, 1]).unwrap();
    /// assert_eq!(t.item::<f64>().unwrap(), 4.5);
    /// ```
    pub fn item<T: Element>(&self) -> Result<T> {
        if self.numel() != 1 {
            return Err(Error::ShapeMismatch {
                expected: vec![1],
                got: self.shape().to_vec(),
            });
        }
        let pos = self.offset();
        Ok(dispatch_storage!(self.storage.data(), src, S => { T::from_elem(src[pos]) }))
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("offset", &self.offset())
            .field("dtype", &self.dtype())
            .field("contiguous", &self.is_contiguous())
            .finish()
    }
}
