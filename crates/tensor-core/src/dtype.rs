// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine-native tensor element data types.

/// Enumerates the element types an engine tensor slot can hold.
///
/// The interpreter uses `DType` to size buffers at allocation time, and the
/// runtime's codec uses it to pick which wire element type a slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 32-bit IEEE 754 floating point.
    F32,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// Boolean, one byte per element.
    Bool,
    /// 8-bit unsigned integer.
    U8,
    /// Variable-length strings. Graphs may declare these, but no wire
    /// conversion exists for them.
    Str,
}

impl DType {
    /// Returns the size of a single element in bytes.
    ///
    /// String elements are accounted at the size of their handle; their
    /// contents live outside the interpreter's budget.
    pub fn size_bytes(self) -> usize {
        match self {
            DType::F32 => 4,
            DType::I32 => 4,
            DType::I64 => 8,
            DType::Bool => 1,
            DType::U8 => 1,
            DType::Str => std::mem::size_of::<String>(),
        }
    }

    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::F32 => "f32",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::Bool => "bool",
            DType::U8 => "u8",
            DType::Str => "str",
        }
    }

    /// Parses a dtype label, accepting a few common aliases.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "f32" | "float32" => Some(DType::F32),
            "i32" | "int32" => Some(DType::I32),
            "i64" | "int64" => Some(DType::I64),
            "bool" | "boolean" => Some(DType::Bool),
            "u8" | "uint8" => Some(DType::U8),
            "str" | "string" => Some(DType::Str),
            _ => None,
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_bytes() {
        assert_eq!(DType::F32.size_bytes(), 4);
        assert_eq!(DType::I64.size_bytes(), 8);
        assert_eq!(DType::Bool.size_bytes(), 1);
        assert_eq!(DType::U8.size_bytes(), 1);
    }

    #[test]
    fn test_from_str_loose() {
        assert_eq!(DType::from_str_loose("float32"), Some(DType::F32));
        assert_eq!(DType::from_str_loose("BOOL"), Some(DType::Bool));
        assert_eq!(DType::from_str_loose("string"), Some(DType::Str));
        assert_eq!(DType::from_str_loose("f16"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&DType::U8).unwrap();
        assert_eq!(json, "\"u8\"");
        let back: DType = serde_json::from_str("\"bool\"").unwrap();
        assert_eq!(back, DType::Bool);
    }
}
