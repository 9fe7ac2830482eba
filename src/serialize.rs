//! JSON persistence
//!
//! A tensor is stored as one JSON object:
//!
//! ```json
//! {"size": [2, 2], "dtype": "FloatTensor", "storage": [1.0, 2.0, 3.0, 4.0]}
//! ```
//!
//! `storage` holds the elements in row-major order regardless of the
//! tensor's strides. JSON has no encoding for NaN or infinities; they are
//! written as `null` and read back as NaN.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::tensor::{StorageData, Tensor};

#[derive(Serialize)]
struct TensorRecordRef<'a> {
    size: &'a [usize],
    dtype: &'static str,
    storage: StorageRef<'a>,
}

// serde_json writes non-finite floats as `null`.
#[derive(Serialize)]
#[serde(untagged)]
enum StorageRef<'a> {
    F32(&'a [f32]),
    F64(&'a [f64]),
    I64(&'a [i64]),
}

impl<'a> From<&'a StorageData> for StorageRef<'a> {
    fn from(data: &'a StorageData) -> Self {
        match data {
            StorageData::F32(v) => Self::F32(v),
            StorageData::F64(v) => Self::F64(v),
            StorageData::I64(v) => Self::I64(v),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TensorRecord {
    size: Vec<usize>,
    dtype: String,
    storage: Vec<Value>,
}

impl TensorRecord {
    fn into_tensor(self) -> Result<Tensor> {
        let dtype = DType::from_tensor_type_name(&self.dtype)
            .ok_or_else(|| Error::serialization(format!("unknown dtype tag '{}'", self.dtype)))?;
        if self.size.is_empty() || self.size.len() > crate::MAX_RANK {
            return Err(Error::serialization(format!(
                "size has {} entries, expected 1 to {}",
                self.size.len(),
                crate::MAX_RANK
            )));
        }
        let numel: usize = self.size.iter().product();
        if numel != self.storage.len() {
            return Err(Error::serialization(format!(
                "size {:?} describes {} elements but storage holds {}",
                self.size,
                numel,
                self.storage.len()
            )));
        }

        let mut nulls = 0usize;
        let data = match dtype {
            DType::F32 => StorageData::F32(
                self.storage
                    .iter()
                    .map(|v| float_value(v, &mut nulls).map(|x| x as f32))
                    .collect::<Result<_>>()?,
            ),
            DType::F64 => StorageData::F64(
                self.storage
                    .iter()
                    .map(|v| float_value(v, &mut nulls))
                    .collect::<Result<_>>()?,
            ),
            DType::I64 => StorageData::I64(self.storage.iter().map(int_value).collect::<Result<_>>()?),
        };
        if nulls > 0 {
            warn!("{} null storage entries read back as NaN", nulls);
        }
        Tensor::from_storage_data(data, &self.size)
    }
}

fn float_value(value: &Value, nulls: &mut usize) -> Result<f64> {
    match value {
        Value::Null => {
            *nulls += 1;
            Ok(f64::NAN)
        }
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::serialization(format!("storage entry {n} is not a float"))),
        other => Err(Error::serialization(format!(
            "storage entry {other} is not a number"
        ))),
    }
}

// Integers are read exactly; other numbers are cast, truncating toward zero.
fn int_value(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(i64::from_f64))
            .ok_or_else(|| Error::serialization(format!("storage entry {n} is not a number"))),
        other => Err(Error::serialization(format!(
            "storage entry {other} is not an integer"
        ))),
    }
}

/// Byte-level tensor codec
pub trait TensorCodec {
    /// Encode a tensor into bytes
    fn encode(&self, tensor: &Tensor) -> Result<Vec<u8>>;

    /// Decode a tensor from bytes produced by [`TensorCodec::encode`]
    fn decode(&self, bytes: &[u8]) -> Result<Tensor>;
}

/// The `{size, dtype, storage}` JSON format
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    /// Indent the output
    pub pretty: bool,
}

impl JsonCodec {
    /// Codec that writes indented JSON
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl TensorCodec for JsonCodec {
    fn encode(&self, tensor: &Tensor) -> Result<Vec<u8>> {
        let data = tensor.to_storage_data();
        let record = TensorRecordRef {
            size: tensor.shape(),
            dtype: tensor.dtype().tensor_type_name(),
            storage: StorageRef::from(&data),
        };
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&record)?
        } else {
            serde_json::to_vec(&record)?
        };
        debug!(
            "encoded {} tensor {:?} into {} bytes",
            record.dtype,
            record.size,
            bytes.len()
        );
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Tensor> {
        let record: TensorRecord = serde_json::from_slice(bytes)?;
        let tensor = record.into_tensor()?;
        debug!(
            "decoded {:?} tensor {:?} from {} bytes",
            tensor.dtype(),
            tensor.shape(),
            bytes.len()
        );
        Ok(tensor)
    }
}

/// Encode a tensor as compact JSON
pub fn encode(tensor: &Tensor) -> Result<Vec<u8>> {
    JsonCodec::default().encode(tensor)
}

/// Decode a tensor from JSON bytes
pub fn decode(bytes: &[u8]) -> Result<Tensor> {
    JsonCodec::default().decode(bytes)
}

/// Write a tensor to `path` as JSON, replacing any existing file
///
/// ```
/// use ndtensor::prelude::*;
/// # fn main() -> ndtensor::error::Result<()> {
/// let dir = std::env::temp_dir().join("ndtensor-doc-save");
/// std::fs::create_dir_all(&dir)?;
/// let path = dir.join("t.json");
/// let t = Tensor::new(&[[1i64, 2], [3, 4]])?;
/// save(&t, &path)?;
/// assert!(load(&path)?.equal(&t));
/// # Ok(())
/// # }
/// ```
pub fn save(tensor: &Tensor, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode(tensor)?;
    fs::write(path, &bytes)?;
    info!("saved {:?} tensor {:?} to {}", tensor.dtype(), tensor.shape(), path.display());
    Ok(())
}

/// Read a tensor written by [`save`]
pub fn load(path: impl AsRef<Path>) -> Result<Tensor> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let tensor = decode(&bytes)?;
    info!("loaded {:?} tensor {:?} from {}", tensor.dtype(), tensor.shape(), path.display());
    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_format() {
        let t = Tensor::from_slice(&[1i64, 2, 3, 4], &[2, 2]).unwrap();
        let json: Value = serde_json::from_slice(&encode(&t).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"size": [2, 2], "dtype": "LongTensor", "storage": [1, 2, 3, 4]})
        );
    }

    #[test]
    fn test_encode_strided_view_is_row_major() {
        let t = Tensor::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2])
            .unwrap()
            .t()
            .unwrap();
        let json: Value = serde_json::from_slice(&encode(&t).unwrap()).unwrap();
        assert_eq!(json["storage"], serde_json::json!([1.0, 3.0, 2.0, 4.0]));
        assert_eq!(json["dtype"], "DoubleTensor");
    }

    #[test]
    fn test_round_trip_f32_exact() {
        let t = Tensor::from_slice(&[0.1f32, -3.75, 1e-7, 123456.79], &[4]).unwrap();
        let back = decode(&encode(&t).unwrap()).unwrap();
        assert_eq!(back.dtype(), DType::F32);
        assert_eq!(back.to_vec::<f32>(), t.to_vec::<f32>());
    }

    #[test]
    fn test_non_finite_written_as_null() {
        let t = Tensor::from_slice(&[f64::NAN, f64::INFINITY, 1.0], &[3]).unwrap();
        let bytes = encode(&t).unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["storage"], serde_json::json!([null, null, 1.0]));
        let back = decode(&bytes).unwrap().to_vec::<f64>();
        assert!(back[0].is_nan() && back[1].is_nan());
        assert_eq!(back[2], 1.0);
    }

    #[test]
    fn test_decode_casts_storage_to_tagged_dtype() {
        let t = decode(br#"{"size": [3], "dtype": "LongTensor", "storage": [1.0, 2.9, -2.9]}"#)
            .unwrap();
        assert_eq!(t.dtype(), DType::I64);
        assert_eq!(t.to_vec::<i64>(), vec![1, 2, -2]);

        let big = (1i64 << 53) + 1;
        let json = format!(r#"{{"size": [1], "dtype": "LongTensor", "storage": [{big}]}}"#);
        let t = decode(json.as_bytes()).unwrap();
        assert_eq!(t.item::<i64>().unwrap(), big);

        let t = decode(br#"{"size": [2], "dtype": "DoubleTensor", "storage": [1, -3]}"#).unwrap();
        assert_eq!(t.to_vec::<f64>(), vec![1.0, -3.0]);
    }

    #[test]
    fn test_decode_rejects_bad_records() {
        let cases: [&[u8]; 6] = [
            br#"{"size": [3], "dtype": "FloatTensor", "storage": [1, 2]}"#,
            br#"{"size": [1], "dtype": "HalfTensor", "storage": [1]}"#,
            br#"{"size": [], "dtype": "FloatTensor", "storage": []}"#,
            br#"{"size": [1], "dtype": "LongTensor", "storage": [null]}"#,
            br#"{"size": [1], "dtype": "FloatTensor", "storage": ["a"]}"#,
            br#"{"size": [1], "dtype": "FloatTensor", "storage": [1], "extra": 0}"#,
        ];
        for bytes in cases {
            assert!(decode(bytes).is_err(), "{}", String::from_utf8_lossy(bytes));
        }
    }

    #[test]
    fn test_pretty_codec_decodes() {
        let codec = JsonCodec::pretty();
        let t = Tensor::from_slice(&[1.0f64, 2.0], &[2, 1]).unwrap();
        let bytes = codec.encode(&t).unwrap();
        assert!(bytes.contains(&b'\n'));
        assert!(codec.decode(&bytes).unwrap().equal(&t));
    }
}
