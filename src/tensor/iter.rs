//! Row-major enumeration of strided layouts

use super::layout::{Index, Layout};

/// Odometer over the multi-indices of a layout, tracking the storage position
struct Cursor<'a> {
    shape: &'a [usize],
    strides: &'a [isize],
    index: Index,
    position: isize,
    remaining: usize,
}

impl<'a> Cursor<'a> {
    fn new(layout: &'a Layout) -> Self {
        Self {
            shape: layout.shape(),
            strides: layout.strides(),
            index: layout.shape().iter().map(|_| 0).collect(),
            position: layout.offset() as isize,
            remaining: layout.elem_count(),
        }
    }

    /// Step to the next multi-index, last axis fastest
    fn advance(&mut self) {
        self.remaining -= 1;
        if self.remaining == 0 {
            return;
        }
        for d in (0..self.shape.len()).rev() {
            self.index[d] += 1;
            self.position += self.strides[d];
            if self.index[d] < self.shape[d] {
                return;
            }
            self.position -= self.strides[d] * self.shape[d] as isize;
            self.index[d] = 0;
        }
    }
}

/// Iterator over the storage positions of a layout in row-major order
///
/// Created by [`Layout::offsets`].
pub struct Offsets<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Offsets<'a> {
    pub(crate) fn new(layout: &'a Layout) -> Self {
        Self {
            cursor: Cursor::new(layout),
        }
    }
}

impl Iterator for Offsets<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cursor.remaining == 0 {
            return None;
        }
        let position = self.cursor.position as usize;
        self.cursor.advance();
        Some(position)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl ExactSizeIterator for Offsets<'_> {}

/// Iterator over `(multi-index, storage position)` pairs in row-major order
///
/// Created by [`Layout::indexed_offsets`].
pub struct IndexedOffsets<'a> {
    cursor: Cursor<'a>,
}

impl<'a> IndexedOffsets<'a> {
    pub(crate) fn new(layout: &'a Layout) -> Self {
        Self {
            cursor: Cursor::new(layout),
        }
    }
}

impl Iterator for IndexedOffsets<'_> {
    type Item = (Index, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.remaining == 0 {
            return None;
        }
        let item = (self.cursor.index.clone(), self.cursor.position as usize);
        self.cursor.advance();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl ExactSizeIterator for IndexedOffsets<'_> {}
