//! DType conversion

use crate::dtype::DType;
use crate::tensor::{Layout, Storage, Tensor};

impl Tensor {
    /// Convert every element to `dtype`
    ///
    /// Float to integer conversion truncates toward zero and saturates at the
    /// integer range; NaN becomes 0. Converting to the current dtype returns
    /// a tensor sharing storage with `self`.
    ///
    /// ```
    /// use ndtensor::dtype::DType;
    /// use ndtensor::tensor::Tensor;
    /// let t = Tensor::new(&[1.7f32, -1.7]).unwrap();
    /// assert_eq!(t.to_dtype(DType::I64).to_vec::<i64>(), vec![1, -1]);
    /// ```
    pub fn to_dtype(&self, dtype: DType) -> Tensor {
        if self.dtype() == dtype {
            return self.clone();
        }
        let data = self.to_storage_data().cast(dtype);
        Tensor::from_parts(Storage::new(data), Layout::contiguous(self.shape()))
    }

    /// Convert to 32-bit floats
    pub fn float(&self) -> Tensor {
        self.to_dtype(DType::F32)
    }

    /// Convert to 64-bit floats
    pub fn double(&self) -> Tensor {
        self.to_dtype(DType::F64)
    }

    /// Convert to 64-bit integers
    pub fn long(&self) -> Tensor {
        self.to_dtype(DType::I64)
    }
}
