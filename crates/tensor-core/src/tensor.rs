// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Wire tensors: the named, typed, shape-annotated values exchanged with
//! callers.
//!
//! A wire tensor is deliberately loose: its shape is signed and its value
//! count is not tied to the shape at construction time. Callers can send
//! malformed tensors, and [`Tensor::is_valid_format`] is how the runtime
//! detects them.
//!
//! Serialized form:
//! ```json
//! { "shape": [1, 2], "element_type": "float64", "values": [0.5, 0.25] }
//! ```

/// The element type tag carried by a wire tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Double-precision floats.
    Float64,
    /// Signed 64-bit integers. Booleans travel as 0/1 in this type.
    Int64,
    /// Unsigned bytes.
    Uint8,
    /// Strings. Representable on the wire but not accepted by any engine slot.
    String,
}

impl ElementType {
    /// Returns a human-readable label for this element type.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Float64 => "float64",
            ElementType::Int64 => "int64",
            ElementType::Uint8 => "uint8",
            ElementType::String => "string",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The flat value buffer of a wire tensor, tagged with its element type.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "element_type", content = "values", rename_all = "lowercase")]
pub enum ValueList {
    Float64(Vec<f64>),
    Int64(Vec<i64>),
    Uint8(Vec<u8>),
    String(Vec<String>),
}

impl ValueList {
    /// Returns the element type tag.
    pub fn element_type(&self) -> ElementType {
        match self {
            ValueList::Float64(_) => ElementType::Float64,
            ValueList::Int64(_) => ElementType::Int64,
            ValueList::Uint8(_) => ElementType::Uint8,
            ValueList::String(_) => ElementType::String,
        }
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        match self {
            ValueList::Float64(v) => v.len(),
            ValueList::Int64(v) => v.len(),
            ValueList::Uint8(v) => v.len(),
            ValueList::String(v) => v.len(),
        }
    }

    /// Returns `true` if there are no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A wire tensor: signed shape plus a flat, typed value list.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tensor {
    /// Dimensions, outermost first. Empty for a scalar.
    pub shape: Vec<i64>,
    /// Row-major values.
    #[serde(flatten)]
    pub values: ValueList,
}

impl Tensor {
    /// Creates a tensor from a shape and value list without validating them.
    pub fn new(shape: Vec<i64>, values: ValueList) -> Self {
        Self { shape, values }
    }

    /// Creates a `float64` tensor.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{ElementType, Tensor};
    /// let t = Tensor::float64(vec![1], vec![0.5]);
    /// assert_eq!(t.element_type(), ElementType::Float64);
    /// assert!(t.is_valid_format());
    /// ```
    pub fn float64(shape: Vec<i64>, values: Vec<f64>) -> Self {
        Self::new(shape, ValueList::Float64(values))
    }

    /// Creates an `int64` tensor.
    pub fn int64(shape: Vec<i64>, values: Vec<i64>) -> Self {
        Self::new(shape, ValueList::Int64(values))
    }

    /// Creates a `uint8` tensor.
    pub fn uint8(shape: Vec<i64>, values: Vec<u8>) -> Self {
        Self::new(shape, ValueList::Uint8(values))
    }

    /// Creates a `string` tensor.
    pub fn string(shape: Vec<i64>, values: Vec<String>) -> Self {
        Self::new(shape, ValueList::String(values))
    }

    /// Returns the element type tag.
    pub fn element_type(&self) -> ElementType {
        self.values.element_type()
    }

    /// Returns the number of elements the shape declares, or `None` if any
    /// dimension is negative or the product overflows.
    pub fn declared_elements(&self) -> Option<usize> {
        self.shape.iter().try_fold(1usize, |acc, &d| {
            let d = usize::try_from(d).ok()?;
            acc.checked_mul(d)
        })
    }

    /// Returns `true` if every dimension is non-negative and the product of
    /// the shape equals the number of values.
    ///
    /// A rank-0 shape declares exactly one value.
    pub fn is_valid_format(&self) -> bool {
        self.declared_elements() == Some(self.values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_format() {
        assert!(Tensor::float64(vec![2, 3], vec![0.0; 6]).is_valid_format());
        assert!(Tensor::int64(vec![], vec![7]).is_valid_format());
        assert!(Tensor::uint8(vec![0, 4], vec![]).is_valid_format());
    }

    #[test]
    fn test_invalid_format() {
        // Scalar shape but two values.
        assert!(!Tensor::float64(vec![1], vec![0.5, 0.5]).is_valid_format());
        // Empty shape is a scalar and needs one value.
        assert!(!Tensor::float64(vec![], vec![]).is_valid_format());
        // Negative dimensions are never valid.
        assert!(!Tensor::int64(vec![-1, -1], vec![1]).is_valid_format());
    }

    #[test]
    fn test_declared_elements_overflow() {
        let t = Tensor::uint8(vec![i64::MAX, i64::MAX], vec![]);
        assert_eq!(t.declared_elements(), None);
    }

    #[test]
    fn test_element_type() {
        assert_eq!(Tensor::int64(vec![1], vec![1]).element_type(), ElementType::Int64);
        assert_eq!(
            Tensor::string(vec![1], vec!["a".into()]).element_type(),
            ElementType::String
        );
        assert_eq!(format!("{}", ElementType::Uint8), "uint8");
    }

    #[test]
    fn test_wire_json() {
        let json = r#"{ "shape": [2], "element_type": "int64", "values": [1, 0] }"#;
        let t: Tensor = serde_json::from_str(json).unwrap();
        assert_eq!(t, Tensor::int64(vec![2], vec![1, 0]));

        let out = serde_json::to_value(&Tensor::float64(vec![1], vec![0.5])).unwrap();
        assert_eq!(out["element_type"], "float64");
        assert_eq!(out["values"][0], 0.5);
    }
}
