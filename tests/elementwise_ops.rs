//! Integration tests for element-wise operations
//!
//! Tests verify:
//! - Binary arithmetic with dtype promotion and in-place forms
//! - Scalar arithmetic and clamping
//! - Unary math, softmax and dtype conversion

mod common;

use common::{assert_allclose_f32, assert_allclose_f64, iota_f32, iota_i64};
use ndtensor::dtype::DType;
use ndtensor::error::Error;
use ndtensor::tensor::Tensor;

// ============================================================================
// Binary
// ============================================================================

#[test]
fn test_binary_promotes() {
    let a = iota_i64(&[3]);
    let b = Tensor::new(&[0.5f32, 0.5, 0.5]).unwrap();
    let c = a.add(&b).unwrap();
    assert_eq!(c.dtype(), DType::F32);
    assert_eq!(c.to_vec::<f32>(), vec![0.5, 1.5, 2.5]);

    let d = Tensor::new(&[1.0f64, 1.0, 1.0]).unwrap();
    assert_eq!(b.mul(&d).unwrap().dtype(), DType::F64);
}

#[test]
fn test_binary_shape_mismatch() {
    let a = iota_i64(&[2, 3]);
    let b = iota_i64(&[3, 2]);
    assert!(matches!(a.add(&b), Err(Error::ShapeMismatch { .. })));
}

#[test]
fn test_binary_on_views() {
    let a = iota_f32(&[2, 3]);
    let b = iota_f32(&[3, 2]).t().unwrap();
    // b = [[0, 2, 4], [1, 3, 5]]
    assert_eq!(
        a.sub(&b).unwrap().to_vec::<f32>(),
        vec![0.0, -1.0, -2.0, 2.0, 1.0, 0.0]
    );
}

#[test]
fn test_integer_division() {
    let a = Tensor::new(&[7i64, -7]).unwrap();
    let b = Tensor::new(&[2i64, 2]).unwrap();
    assert_eq!(a.div(&b).unwrap().to_vec::<i64>(), vec![3, -3]);

    let zero = Tensor::zeros(&[2], DType::I64).unwrap();
    assert!(matches!(a.div(&zero), Err(Error::InvalidArgument { .. })));
}

#[test]
fn test_in_place_keeps_receiver_dtype() {
    let mut a = iota_i64(&[3]);
    let b = Tensor::new(&[1.5f64, 1.5, 1.5]).unwrap();
    a.add_(&b).unwrap();
    assert_eq!(a.dtype(), DType::I64);
    assert_eq!(a.to_vec::<i64>(), vec![1, 2, 3]);
}

#[test]
fn test_in_place_on_view_is_isolated() {
    let base = iota_f32(&[2, 2]);
    let mut view = base.t().unwrap();
    view.mul_(&Tensor::full(&[2, 2], DType::F32, 2.0).unwrap()).unwrap();
    assert_eq!(view.to_vec::<f32>(), vec![0.0, 4.0, 2.0, 6.0]);
    assert_eq!(base.to_vec::<f32>(), vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_in_place_failure_leaves_receiver() {
    let mut a = Tensor::new(&[4i64, 6]).unwrap();
    let b = Tensor::new(&[2i64, 0]).unwrap();
    assert!(a.div_(&b).is_err());
    assert_eq!(a.to_vec::<i64>(), vec![4, 6]);
    let mut c = iota_i64(&[2]);
    assert!(c.sub_(&iota_i64(&[3])).is_err());
    assert_eq!(c.to_vec::<i64>(), vec![0, 1]);
}

#[test]
fn test_allclose() {
    let a = Tensor::new(&[1.0f64, 2.0]).unwrap();
    let b = Tensor::new(&[1.0f32, 2.000001]).unwrap();
    assert!(a.allclose(&b, 1e-5, 1e-8));
    assert!(!a.allclose(&b.add_scalar(1.0).unwrap(), 1e-5, 1e-8));
    assert!(!a.equal(&b));
}

// ============================================================================
// Scalar
// ============================================================================

#[test]
fn test_scalar_chain() {
    let t = iota_f32(&[4]);
    let r = t
        .mul_scalar(2.0)
        .unwrap()
        .add_scalar(1.0)
        .unwrap()
        .pow_scalar(2.0)
        .unwrap();
    assert_eq!(r.to_vec::<f32>(), vec![1.0, 9.0, 25.0, 49.0]);
}

#[test]
fn test_clamp_integers() {
    let t = Tensor::new(&[-5i64, 0, 5]).unwrap();
    assert_eq!(t.clamp(-1.0, 1.0).unwrap().to_vec::<i64>(), vec![-1, 0, 1]);
}

#[test]
fn test_integer_div_scalar_zero() {
    let t = iota_i64(&[2]);
    assert!(matches!(t.div_scalar(0.0), Err(Error::InvalidArgument { .. })));
}

// ============================================================================
// Integers beyond f64 precision
// ============================================================================

const BIG: i64 = (1 << 53) + 1;

fn big_ints() -> Tensor {
    Tensor::new(&[BIG, i64::MAX - 1, -BIG]).unwrap()
}

#[test]
fn test_identity_scalar_ops_keep_large_integers() {
    let t = big_ints();
    let expected = t.to_vec::<i64>();
    assert_eq!(t.add_scalar(0.0).unwrap().to_vec::<i64>(), expected);
    assert_eq!(t.sub_scalar(0.0).unwrap().to_vec::<i64>(), expected);
    assert_eq!(t.mul_scalar(1.0).unwrap().to_vec::<i64>(), expected);
    assert_eq!(t.div_scalar(1.0).unwrap().to_vec::<i64>(), expected);
    assert_eq!(t.pow_scalar(1.0).unwrap().to_vec::<i64>(), expected);
    assert_eq!(t.clamp(f64::MIN, f64::MAX).unwrap().to_vec::<i64>(), expected);
}

#[test]
fn test_scalar_ops_on_large_integers_are_exact() {
    let t = big_ints();
    assert_eq!(
        t.add_scalar(1.0).unwrap().to_vec::<i64>(),
        vec![BIG + 1, i64::MAX, 1 - BIG]
    );
    assert_eq!(
        t.mul_scalar(-1.0).unwrap().to_vec::<i64>(),
        vec![-BIG, 1 - i64::MAX, BIG]
    );
    assert_eq!(
        t.div_scalar(2.0).unwrap().to_vec::<i64>(),
        vec![BIG / 2, (i64::MAX - 1) / 2, -BIG / 2]
    );
}

#[test]
fn test_neg_abs_on_large_integers() {
    let t = big_ints();
    assert_eq!(t.abs().to_vec::<i64>(), vec![BIG, i64::MAX - 1, BIG]);
    assert_eq!(t.neg().to_vec::<i64>(), vec![-BIG, 1 - i64::MAX, BIG]);
    assert_eq!(t.neg().neg().to_vec::<i64>(), t.to_vec::<i64>());
}

#[test]
fn test_binary_ops_on_large_integers() {
    let t = big_ints();
    let one = Tensor::ones(&[3], DType::I64).unwrap();
    assert_eq!(
        t.add(&one).unwrap().to_vec::<i64>(),
        vec![BIG + 1, i64::MAX, 1 - BIG]
    );
    let mut u = t.clone();
    u.sub_(&one).unwrap();
    assert_eq!(u.to_vec::<i64>(), vec![BIG - 1, i64::MAX - 2, -BIG - 1]);
}

// ============================================================================
// Unary / Softmax / Conversion
// ============================================================================

#[test]
fn test_unary_math() {
    let t = Tensor::new(&[1.0f64, 4.0]).unwrap();
    assert_allclose_f64(
        &t.log().to_vec::<f64>(),
        &[0.0, 4.0f64.ln()],
        1e-12,
        0.0,
        "log",
    );
}

#[test]
fn test_softmax_dim_sums_to_one() {
    let t = Tensor::new(&[[[0.5f32, 1.0], [2.0, -1.0]], [[0.0, 0.0], [3.0, 1.0]]]).unwrap();
    for dim in 0..3isize {
        let s = t.softmax_dim(dim).unwrap();
        assert_eq!(s.shape(), t.shape());
        let sums = s.sum_dim(dim, false).unwrap().to_vec::<f32>();
        assert_allclose_f32(&sums, &vec![1.0; sums.len()], 1e-6, 1e-6, "softmax sums");
    }
}

#[test]
fn test_softmax_global() {
    let t = Tensor::new(&[1.0f64, 2.0, 3.0]).unwrap();
    let s = t.softmax().unwrap().to_vec::<f64>();
    let denom = 1f64.exp() + 2f64.exp() + 3f64.exp();
    assert_allclose_f64(
        &s,
        &[1f64.exp() / denom, 2f64.exp() / denom, 3f64.exp() / denom],
        1e-12,
        0.0,
        "softmax",
    );
}

#[test]
fn test_to_dtype() {
    let t = Tensor::new(&[1.5f64, -2.5]).unwrap();
    assert_eq!(t.to_dtype(DType::I64).to_vec::<i64>(), vec![1, -2]);
    assert_eq!(t.float().dtype(), DType::F32);
    assert_eq!(iota_i64(&[2]).double().to_vec::<f64>(), vec![0.0, 1.0]);
}
