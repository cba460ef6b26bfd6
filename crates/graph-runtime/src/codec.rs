// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Conversion between wire tensors and engine tensor slots.
//!
//! Decoding accepts exactly these pairings, using the rules in
//! [`tensor_core::narrow`]:
//!
//! ```text
//! float64 → f32
//! int64   → i32 | i64 | bool
//! uint8   → u8
//! ```
//!
//! Encoding goes the other way: `f32 → float64`, `i32 | i64 → int64`,
//! `bool → int64 (0/1)`, `u8 → uint8`. String slots are rejected in both
//! directions.

use graph_engine::EngineTensor;
use tensor_core::{narrow, DType, ElementType, Shape, Tensor, TensorData, TensorError, ValueList};

/// Why a wire tensor and an engine slot could not be converted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    /// The engine slot holds strings, which the engine does not support.
    #[error("string tensors are not supported by the engine")]
    StringSlot,

    /// The wire element type cannot feed this slot.
    #[error("{actual} values cannot feed a {expected} tensor")]
    Incompatible { expected: DType, actual: ElementType },

    /// The wire shape differs from the slot shape.
    #[error("shape {actual:?} does not match {expected}")]
    ShapeMismatch { expected: Shape, actual: Vec<i64> },

    /// The wire tensor's shape and value count disagree.
    #[error("shape {shape:?} does not describe {values} values")]
    InvalidFormat { shape: Vec<i64>, values: usize },

    /// The slot cannot be returned to a caller.
    #[error("cannot encode {dtype} tensor '{name}' with shape {shape}")]
    Unencodable { name: String, dtype: DType, shape: Shape },

    #[error(transparent)]
    Tensor(#[from] TensorError),
}

/// Returns `true` if the tensor's shape is non-negative and describes
/// exactly as many elements as it carries values.
pub fn valid_format(tensor: &Tensor) -> bool {
    tensor.is_valid_format()
}

/// Returns `true` if `element` values may be decoded into a `slot` tensor.
pub fn is_compatible(element: ElementType, slot: DType) -> bool {
    matches!(
        (element, slot),
        (ElementType::Float64, DType::F32)
            | (ElementType::Int64, DType::I32 | DType::I64 | DType::Bool)
            | (ElementType::Uint8, DType::U8)
    )
}

/// Checks that `wire` can be decoded into `slot`.
///
/// Checks run in a fixed order and the first failure is returned: string
/// slot, element type, shape, then value count.
pub fn check(wire: &Tensor, slot: &EngineTensor) -> Result<(), CodecError> {
    if slot.dtype() == DType::Str {
        return Err(CodecError::StringSlot);
    }
    if !is_compatible(wire.element_type(), slot.dtype()) {
        return Err(CodecError::Incompatible {
            expected: slot.dtype(),
            actual: wire.element_type(),
        });
    }
    if !slot.shape().matches_wire(&wire.shape) {
        return Err(CodecError::ShapeMismatch {
            expected: slot.shape().clone(),
            actual: wire.shape.clone(),
        });
    }
    if !valid_format(wire) {
        return Err(CodecError::InvalidFormat {
            shape: wire.shape.clone(),
            values: wire.values.len(),
        });
    }
    Ok(())
}

/// Writes `wire` into `slot`, narrowing where the pairing requires it.
///
/// On error the slot is left untouched.
pub fn decode(wire: &Tensor, slot: &mut EngineTensor) -> Result<(), CodecError> {
    check(wire, slot)?;

    let data = match (&wire.values, slot.dtype()) {
        (ValueList::Float64(v), DType::F32) => {
            TensorData::F32(v.iter().map(|&x| narrow::f64_to_f32(x)).collect())
        }
        (ValueList::Int64(v), DType::I64) => TensorData::I64(v.clone()),
        (ValueList::Int64(v), DType::I32) => {
            TensorData::I32(v.iter().map(|&x| narrow::i64_to_i32(x)).collect())
        }
        (ValueList::Int64(v), DType::Bool) => {
            TensorData::Bool(v.iter().map(|&x| narrow::i64_to_bool(x)).collect())
        }
        (ValueList::Uint8(v), DType::U8) => TensorData::U8(v.clone()),
        (values, dtype) => {
            return Err(CodecError::Incompatible {
                expected: dtype,
                actual: values.element_type(),
            })
        }
    };

    slot.data_mut().overwrite(data)?;
    Ok(())
}

/// Reads `slot` into a new wire tensor.
///
/// # Errors
/// [`CodecError::Unencodable`] for string slots and for slots that hold no
/// elements or have rank 0.
pub fn encode(slot: &EngineTensor) -> Result<Tensor, CodecError> {
    let shape = slot.shape();
    if slot.dtype() == DType::Str || shape.rank() == 0 || slot.num_elements() == 0 {
        return Err(CodecError::Unencodable {
            name: slot.name().to_string(),
            dtype: slot.dtype(),
            shape: shape.clone(),
        });
    }

    let values = match slot.data() {
        TensorData::F32(v) => ValueList::Float64(v.iter().map(|&x| narrow::f32_to_f64(x)).collect()),
        TensorData::I32(v) => ValueList::Int64(v.iter().map(|&x| narrow::i32_to_i64(x)).collect()),
        TensorData::I64(v) => ValueList::Int64(v.clone()),
        TensorData::Bool(v) => ValueList::Int64(v.iter().map(|&x| narrow::bool_to_i64(x)).collect()),
        // u8 stays uint8 on the wire rather than widening to int64.
        TensorData::U8(v) => ValueList::Uint8(v.clone()),
        TensorData::Str(_) => {
            return Err(CodecError::Unencodable {
                name: slot.name().to_string(),
                dtype: DType::Str,
                shape: shape.clone(),
            })
        }
    };
    Ok(Tensor::new(shape.to_wire(), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_engine::TensorDef;

    fn slot(dtype: DType, dims: Vec<usize>) -> EngineTensor {
        EngineTensor::zeros(&TensorDef::new("t", dtype, dims)).unwrap()
    }

    #[test]
    fn test_compatibility_table() {
        assert!(is_compatible(ElementType::Float64, DType::F32));
        assert!(is_compatible(ElementType::Int64, DType::I32));
        assert!(is_compatible(ElementType::Int64, DType::I64));
        assert!(is_compatible(ElementType::Int64, DType::Bool));
        assert!(is_compatible(ElementType::Uint8, DType::U8));

        assert!(!is_compatible(ElementType::Int64, DType::F32));
        assert!(!is_compatible(ElementType::Float64, DType::I64));
        assert!(!is_compatible(ElementType::Uint8, DType::I32));
        assert!(!is_compatible(ElementType::String, DType::Str));
    }

    #[test]
    fn test_decode_float_narrows() {
        let mut s = slot(DType::F32, vec![2]);
        decode(&Tensor::float64(vec![2], vec![0.5, 0.1]), &mut s).unwrap();
        assert_eq!(s.data(), &TensorData::F32(vec![0.5, 0.1f32]));
    }

    #[test]
    fn test_decode_int64_to_bool() {
        let mut s = slot(DType::Bool, vec![3]);
        decode(&Tensor::int64(vec![3], vec![1, 0, 7]), &mut s).unwrap();
        assert_eq!(s.data(), &TensorData::Bool(vec![true, false, true]));
    }

    #[test]
    fn test_decode_int64_to_i32_truncates() {
        let mut s = slot(DType::I32, vec![1]);
        decode(&Tensor::int64(vec![1], vec![(1 << 32) + 5]), &mut s).unwrap();
        assert_eq!(s.data(), &TensorData::I32(vec![5]));
    }

    #[test]
    fn test_check_order() {
        // String slot is reported before anything else.
        let strings = slot(DType::Str, vec![1]);
        assert_eq!(
            check(&Tensor::int64(vec![], vec![]), &strings),
            Err(CodecError::StringSlot)
        );

        let s = slot(DType::F32, vec![1]);
        // Type beats shape and format.
        assert!(matches!(
            check(&Tensor::int64(vec![1, 1], vec![]), &s),
            Err(CodecError::Incompatible { .. })
        ));
        // Shape beats format.
        assert!(matches!(
            check(&Tensor::float64(vec![1, 1], vec![]), &s),
            Err(CodecError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            check(&Tensor::float64(vec![1], vec![0.5, 0.5]), &s),
            Err(CodecError::InvalidFormat { values: 2, .. })
        ));
    }

    #[test]
    fn test_decode_failure_leaves_slot() {
        let mut s = slot(DType::U8, vec![2]);
        decode(&Tensor::uint8(vec![2], vec![3, 4]), &mut s).unwrap();
        assert!(decode(&Tensor::uint8(vec![2], vec![9]), &mut s).is_err());
        assert_eq!(s.data(), &TensorData::U8(vec![3, 4]));
    }

    #[test]
    fn test_encode_widens() {
        let mut s = slot(DType::Bool, vec![2]);
        s.data_mut().overwrite(TensorData::Bool(vec![true, false])).unwrap();
        assert_eq!(encode(&s).unwrap(), Tensor::int64(vec![2], vec![1, 0]));

        let mut f = slot(DType::F32, vec![1, 1]);
        f.data_mut().overwrite(TensorData::F32(vec![0.75])).unwrap();
        assert_eq!(encode(&f).unwrap(), Tensor::float64(vec![1, 1], vec![0.75]));

        let u = slot(DType::U8, vec![1]);
        assert_eq!(encode(&u).unwrap(), Tensor::uint8(vec![1], vec![0]));
    }

    #[test]
    fn test_encode_rejects() {
        assert!(matches!(encode(&slot(DType::Str, vec![1])), Err(CodecError::Unencodable { .. })));
        assert!(encode(&slot(DType::F32, vec![])).is_err());
        assert!(encode(&slot(DType::F32, vec![0])).is_err());
    }

    #[test]
    fn test_valid_format() {
        assert!(valid_format(&Tensor::float64(vec![2, 2], vec![0.0; 4])));
        assert!(!valid_format(&Tensor::float64(vec![1], vec![])));
    }
}
