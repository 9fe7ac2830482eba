//! Deterministic text rendering of tensors

use super::Tensor;
use crate::dispatch_storage;
use crate::dtype::Element;
use std::fmt;

const PREFIX: &str = "tensor(";

/// Formatting options for [`Tensor::display_with`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrintOptions {
    /// Digits after the decimal point for floating point elements
    pub precision: usize,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self { precision: 4 }
    }
}

/// Display adapter returned by [`Tensor::display_with`]
pub struct TensorDisplay<'a> {
    tensor: &'a Tensor,
    options: PrintOptions,
}

impl Tensor {
    /// Render with explicit print options
    ///
    /// ```
    /// use ndtensor::tensor::{PrintOptions, Tensor};
    /// let t = Tensor::from_slice(&[1.0f64, 2.5], &[2]).unwrap();
    /// let text = t.display_with(PrintOptions { precision: 1 }).to_string();
    /// assert_eq!(text, "tensor([1.0, 2.5], dtype=f64)");
    /// ```
    pub fn display_with(&self, options: PrintOptions) -> TensorDisplay<'_> {
        TensorDisplay {
            tensor: self,
            options,
        }
    }
}

fn format_elements<T: Element>(values: &[T], options: PrintOptions) -> Vec<String> {
    if T::DTYPE.is_float() {
        let precision = options.precision;
        values
            .iter()
            .map(|v| format!("{:.*}", precision, v.to_f64()))
            .collect()
    } else {
        values.iter().map(|v| v.to_string()).collect()
    }
}

fn write_block(
    f: &mut fmt::Formatter<'_>,
    cells: &[String],
    shape: &[usize],
    width: usize,
    depth: usize,
) -> fmt::Result {
    f.write_str("[")?;
    if shape.len() == 1 {
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{cell:>width$}")?;
        }
    } else {
        let block = cells.len() / shape[0].max(1);
        // rank-3+ blocks get a blank line between them
        let gap = if shape.len() > 2 { "\n" } else { "" };
        for i in 0..shape[0] {
            if i > 0 {
                write!(f, ",\n{gap}{:indent$}", "", indent = PREFIX.len() + depth + 1)?;
            }
            let chunk = &cells[i * block..(i + 1) * block];
            write_block(f, chunk, &shape[1..], width, depth + 1)?;
        }
    }
    f.write_str("]")
}

impl fmt::Display for TensorDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tensor = self.tensor;
        let data = tensor.to_storage_data();
        let cells = dispatch_storage!(&data, values, T => {
            format_elements::<T>(values, self.options)
        });
        let width = cells.iter().map(String::len).max().unwrap_or(0);

        f.write_str(PREFIX)?;
        write_block(f, &cells, tensor.shape(), width, 0)?;
        write!(f, ", dtype={})", tensor.dtype())
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.display_with(PrintOptions::default()), f)
    }
}
