//! Storage: typed host buffers with Arc-based sharing and copy-on-write

use crate::dtype::{DType, Element};
use log::debug;
use std::sync::Arc;

/// Flat element buffer tagged with its dtype
///
/// The tag is the single source of truth for a tensor's element type.
#[derive(Clone, Debug, PartialEq)]
pub enum StorageData {
    /// 32-bit floating point elements
    F32(Vec<f32>),
    /// 64-bit floating point elements
    F64(Vec<f64>),
    /// 64-bit signed integer elements
    I64(Vec<i64>),
}

impl StorageData {
    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::I64(v) => v.len(),
        }
    }

    /// Check if the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type of the buffer
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::F64(_) => DType::F64,
            Self::I64(_) => DType::I64,
        }
    }

    /// A zero-filled buffer of `len` elements
    pub fn zeros(len: usize, dtype: DType) -> Self {
        match dtype {
            DType::F32 => Self::F32(vec![0.0; len]),
            DType::F64 => Self::F64(vec![0.0; len]),
            DType::I64 => Self::I64(vec![0; len]),
        }
    }

    /// Convert every element to `dtype` with `as`-cast semantics
    pub fn cast(&self, dtype: DType) -> Self {
        if self.dtype() == dtype {
            return self.clone();
        }
        match self {
            Self::F32(v) => cast_vec(v, dtype),
            Self::F64(v) => cast_vec(v, dtype),
            Self::I64(v) => cast_vec(v, dtype),
        }
    }
}

fn cast_vec<T: Element>(src: &[T], dtype: DType) -> StorageData {
    match dtype {
        DType::F32 => StorageData::F32(src.iter().map(|&x| f32::from_elem(x)).collect()),
        DType::F64 => StorageData::F64(src.iter().map(|&x| f64::from_elem(x)).collect()),
        DType::I64 => StorageData::I64(src.iter().map(|&x| i64::from_elem(x)).collect()),
    }
}

/// Storage for tensor data
///
/// Storage wraps a host buffer with reference counting, enabling zero-copy
/// views (transpose, permute, etc.) that share the underlying buffer.
/// Writers go through [`Storage::make_mut`], which duplicates the buffer
/// first when any other tensor still holds a reference.
#[derive(Clone, Debug)]
pub struct Storage {
    inner: Arc<StorageData>,
}

impl Storage {
    /// Wrap a tagged buffer
    pub fn new(data: StorageData) -> Self {
        Self {
            inner: Arc::new(data),
        }
    }

    /// Create storage from a typed vector; the dtype is inferred from `T`
    pub fn from_vec<T: Element>(data: Vec<T>) -> Self {
        Self::new(T::into_storage(data))
    }

    /// Create storage by copying a typed slice
    pub fn from_slice<T: Element>(data: &[T]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype()
    }

    /// Borrow the tagged buffer
    #[inline]
    pub fn data(&self) -> &StorageData {
        &self.inner
    }

    /// Borrow the buffer as a typed slice, if `T` matches the dtype
    #[inline]
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::slice(&self.inner)
    }

    /// Mutable access to the buffer, duplicating it if it is shared
    pub fn make_mut(&mut self) -> &mut StorageData {
        if Arc::strong_count(&self.inner) > 1 {
            debug!(
                "copy-on-write: duplicating shared {} buffer of {} elements",
                self.dtype(),
                self.len()
            );
        }
        Arc::make_mut(&mut self.inner)
    }

    /// Get the reference count
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Check if this is the only reference
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }

    /// Check if two storages share the same buffer
    pub fn shares_with(&self, other: &Storage) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_follows_tag() {
        let s = Storage::from_slice(&[1.0f32, 2.0]);
        assert_eq!(s.dtype(), DType::F32);
        assert_eq!(s.len(), 2);
        assert_eq!(Storage::from_vec(vec![1i64]).dtype(), DType::I64);
    }

    #[test]
    fn test_clone_shares_buffer() {
        let a = Storage::from_slice(&[1.0f64, 2.0, 3.0]);
        let b = a.clone();
        assert!(a.shares_with(&b));
        assert_eq!(a.ref_count(), 2);
    }

    #[test]
    fn test_make_mut_copies_shared_buffer() {
        let a = Storage::from_slice(&[1.0f64, 2.0, 3.0]);
        let mut b = a.clone();
        if let StorageData::F64(v) = b.make_mut() {
            v[0] = 10.0;
        }
        assert!(!a.shares_with(&b));
        assert!(a.is_unique());
        assert_eq!(a.as_slice::<f64>(), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(b.as_slice::<f64>(), Some(&[10.0, 2.0, 3.0][..]));
    }

    #[test]
    fn test_cast_truncates_to_int() {
        let data = StorageData::F64(vec![1.9, -2.7, 3.0]);
        assert_eq!(data.cast(DType::I64), StorageData::I64(vec![1, -2, 3]));
        let back = StorageData::I64(vec![4, 5]).cast(DType::F32);
        assert_eq!(back, StorageData::F32(vec![4.0, 5.0]));
    }

    #[test]
    fn test_typed_slice_requires_matching_dtype() {
        let s = Storage::from_slice(&[1i64, 2]);
        assert!(s.as_slice::<f32>().is_none());
        assert_eq!(s.as_slice::<i64>(), Some(&[1i64, 2][..]));
    }
}
