//! Layout: shape, strides, and offset for tensor memory layout

use super::iter::{IndexedOffsets, Offsets};
use smallvec::SmallVec;
use std::fmt;

/// Stack allocation threshold for dimensions
/// Most tensors have 4 or fewer dimensions, so we stack-allocate up to 4
pub(crate) const STACK_DIMS: usize = 4;

/// Shape type: dimensions of a tensor
pub type Shape = SmallVec<[usize; STACK_DIMS]>;

/// Strides type: element offsets between consecutive elements along each dimension
/// NOTE: Strides are in ELEMENTS, not bytes
pub type Strides = SmallVec<[isize; STACK_DIMS]>;

/// Multi-index into a tensor, one entry per axis
pub type Index = SmallVec<[usize; STACK_DIMS]>;

/// Compute contiguous strides for a given shape (row-major order)
///
/// `stride[d]` is the product of `shape[d+1..]`; the last stride is 1.
///
/// # Example
/// ```
/// use ndtensor::tensor::contiguous_strides;
/// assert_eq!(contiguous_strides(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
/// ```
pub fn contiguous_strides(shape: &[usize]) -> Strides {
    let mut strides: Strides = SmallVec::with_capacity(shape.len());
    let mut stride = 1isize;

    for &dim in shape.iter().rev() {
        strides.push(stride);
        stride *= dim as isize;
    }

    strides.reverse();
    strides
}

/// Layout describes the memory layout of a tensor
///
/// A tensor's elements are stored in a flat buffer, but not necessarily
/// in row-major order. The layout specifies how to compute the storage
/// position of any element given its indices.
///
/// Address of element at indices [i0, i1, ..., in]:
///   offset + i0 * strides[0] + i1 * strides[1] + ... + in * strides[n]
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Shape,
    strides: Strides,
    offset: usize,
}

impl Layout {
    /// Create a new contiguous (row-major/C-order) layout from a shape
    ///
    /// # Example
    /// ```
    /// use ndtensor::tensor::Layout;
    /// let layout = Layout::contiguous(&[2, 3, 4]);
    /// assert_eq!(layout.shape(), &[2, 3, 4]);
    /// assert_eq!(layout.strides(), &[12, 4, 1]);
    /// ```
    pub fn contiguous(shape: &[usize]) -> Self {
        Self {
            shape: shape.iter().copied().collect(),
            strides: contiguous_strides(shape),
            offset: 0,
        }
    }

    /// Create a layout with explicit shape, strides, and offset
    pub fn new(shape: Shape, strides: Strides, offset: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            shape,
            strides,
            offset,
        }
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Get the offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Check if memory is contiguous (row-major order)
    ///
    /// Size-1 axes are ignored: their stride never contributes to an address.
    pub fn is_contiguous(&self) -> bool {
        if self.elem_count() == 0 {
            return true;
        }

        let mut expected = 1isize;
        for (&size, &stride) in self.shape.iter().zip(self.strides.iter()).rev() {
            if size == 1 {
                continue;
            }
            if stride != expected {
                return false;
            }
            expected *= size as isize;
        }
        true
    }

    /// Get size along a specific dimension
    ///
    /// Supports negative indexing: -1 is the last dimension
    pub fn dim(&self, d: isize) -> Option<usize> {
        let idx = self.normalize_dim(d)?;
        Some(self.shape[idx])
    }

    /// Normalize a dimension index (handle negative indices)
    pub fn normalize_dim(&self, d: isize) -> Option<usize> {
        let ndim = self.ndim() as isize;
        let idx = if d < 0 { ndim + d } else { d };
        if idx >= 0 && idx < ndim {
            Some(idx as usize)
        } else {
            None
        }
    }

    /// Normalize an insertion position, valid range `[-(ndim+1), ndim]`
    pub fn normalize_insert_dim(&self, d: isize) -> Option<usize> {
        let slots = self.ndim() as isize + 1;
        let idx = if d < 0 { slots + d } else { d };
        if idx >= 0 && idx < slots {
            Some(idx as usize)
        } else {
            None
        }
    }

    /// Compute the storage position for a full multi-index
    ///
    /// Returns `None` on rank mismatch or when any index is out of bounds.
    pub fn index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.ndim() {
            return None;
        }
        if indices.iter().zip(self.shape.iter()).any(|(&i, &s)| i >= s) {
            return None;
        }
        Some(self.position(indices))
    }

    /// Storage position of an in-bounds prefix of indices (remaining axes at 0)
    pub(crate) fn position(&self, indices: &[usize]) -> usize {
        let linear = indices
            .iter()
            .zip(self.strides.iter())
            .fold(self.offset as isize, |acc, (&i, &s)| acc + i as isize * s);
        linear as usize
    }

    /// Layout of the sub-block addressed by a prefix of in-bounds indices
    ///
    /// The result covers the trailing `ndim - prefix.len()` axes and shares the
    /// original strides.
    pub(crate) fn sub_block(&self, prefix: &[usize]) -> Self {
        let m = prefix.len();
        Self {
            shape: self.shape[m..].iter().copied().collect(),
            strides: self.strides[m..].iter().copied().collect(),
            offset: self.position(prefix),
        }
    }

    /// Reorder axes; `order` must already be a validated permutation
    pub(crate) fn permute(&self, order: &[usize]) -> Self {
        Self {
            shape: order.iter().map(|&d| self.shape[d]).collect(),
            strides: order.iter().map(|&d| self.strides[d]).collect(),
            offset: self.offset,
        }
    }

    /// Create a transposed layout (swap two dimensions)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Option<Self> {
        let d0 = self.normalize_dim(dim0)?;
        let d1 = self.normalize_dim(dim1)?;

        let mut new_shape = self.shape.clone();
        let mut new_strides = self.strides.clone();

        new_shape.swap(d0, d1);
        new_strides.swap(d0, d1);

        Some(Self {
            shape: new_shape,
            strides: new_strides,
            offset: self.offset,
        })
    }

    /// Create a reshaped layout (if contiguous)
    ///
    /// Returns None if the tensor is not contiguous or element counts differ
    pub fn reshape(&self, new_shape: &[usize]) -> Option<Self> {
        if !self.is_contiguous() {
            return None;
        }

        let new_count: usize = new_shape.iter().product();
        if new_count != self.elem_count() {
            return None;
        }

        Some(Self {
            shape: new_shape.iter().copied().collect(),
            strides: contiguous_strides(new_shape),
            offset: self.offset,
        })
    }

    /// Create a squeezed layout (remove dimensions of size 1)
    ///
    /// A squeeze never removes the last remaining axis.
    pub fn squeeze(&self, dim: Option<usize>) -> Self {
        match dim {
            Some(idx) => {
                if self.shape[idx] == 1 && self.ndim() > 1 {
                    let mut new_shape = self.shape.clone();
                    let mut new_strides = self.strides.clone();
                    new_shape.remove(idx);
                    new_strides.remove(idx);
                    return Self::new(new_shape, new_strides, self.offset);
                }
                self.clone()
            }
            None => {
                let mut new_shape = Shape::new();
                let mut new_strides = Strides::new();
                for (&s, &st) in self.shape.iter().zip(self.strides.iter()) {
                    if s != 1 {
                        new_shape.push(s);
                        new_strides.push(st);
                    }
                }
                if new_shape.is_empty() {
                    new_shape.push(1);
                    new_strides.push(1);
                }
                Self::new(new_shape, new_strides, self.offset)
            }
        }
    }

    /// Create an unsqueezed layout (add dimension of size 1 at `idx`)
    ///
    /// The inserted stride is 1 at the end, otherwise the stride of the
    /// axis it displaces.
    pub fn unsqueeze(&self, idx: usize) -> Option<Self> {
        let ndim = self.ndim();
        if idx > ndim {
            return None;
        }

        let new_stride = if idx < ndim { self.strides[idx] } else { 1 };

        let mut new_shape = self.shape.clone();
        let mut new_strides = self.strides.clone();
        new_shape.insert(idx, 1);
        new_strides.insert(idx, new_stride);

        Some(Self::new(new_shape, new_strides, self.offset))
    }

    /// Restrict one axis to `[start, start + length)`
    pub fn narrow(&self, dim: usize, start: usize, length: usize) -> Option<Self> {
        if dim >= self.ndim() || start.checked_add(length)? > self.shape[dim] {
            return None;
        }

        let mut new_shape = self.shape.clone();
        new_shape[dim] = length;
        let offset = if length == 0 {
            self.offset
        } else {
            (self.offset as isize + start as isize * self.strides[dim]) as usize
        };

        Some(Self::new(new_shape, self.strides.clone(), offset))
    }

    /// Storage positions of every element in row-major order
    pub fn offsets(&self) -> Offsets<'_> {
        Offsets::new(self)
    }

    /// Multi-indices paired with storage positions, in row-major order
    pub fn indexed_offsets(&self) -> IndexedOffsets<'_> {
        IndexedOffsets::new(self)
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout {{ shape: {:?}, strides: {:?}, offset: {} }}",
            self.shape.as_slice(),
            self.strides.as_slice(),
            self.offset
        )
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.shape.as_slice())
    }
}

/// Inverse of a permutation: `inverse[order[i]] = i`
pub fn inverse_permutation(order: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; order.len()];
    for (i, &d) in order.iter().enumerate() {
        inverse[d] = i;
    }
    inverse
}

/// Permutation that moves axis `dim` to the front, keeping the others in order
pub fn axis_to_front(dim: usize, ndim: usize) -> Vec<usize> {
    std::iter::once(dim)
        .chain((0..ndim).filter(|&d| d != dim))
        .collect()
}
