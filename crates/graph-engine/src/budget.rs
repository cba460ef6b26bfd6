// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory budget for interpreter buffer allocation.
//!
//! A [`MemoryBudget`] caps how many bytes one interpreter may allocate for
//! its tensor table. It supports human-readable string parsing so it can be
//! set from configuration files.

use std::fmt;

const KB: usize = 1024;
const MB: usize = 1024 * KB;
const GB: usize = 1024 * MB;

/// Recognised suffixes, longest first so `"MB"` wins over `"B"`.
const SUFFIXES: &[(&str, usize)] = &[
    ("GB", GB),
    ("MB", MB),
    ("KB", KB),
    ("G", GB),
    ("M", MB),
    ("K", KB),
    ("B", 1),
];

/// Errors produced when parsing a budget string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BudgetError {
    #[error("empty budget string")]
    Empty,

    #[error("invalid budget '{0}': expected a number followed by an optional suffix (K, M, G)")]
    Invalid(String),

    #[error("budget '{0}' overflows usize")]
    Overflow(String),

    #[error("budget must be greater than zero")]
    Zero,
}

/// A hard ceiling on the bytes an interpreter may allocate.
///
/// # Parsing
/// - `"64M"` or `"64MB"` → 64 × 1024² bytes
/// - `"1G"` or `"1GB"` → 1024³ bytes
/// - `"512K"` or `"512KB"` → 512 × 1024 bytes
/// - `"4096"` → raw byte count
///
/// # Examples
/// ```
/// use graph_engine::MemoryBudget;
///
/// let b = MemoryBudget::parse("64M").unwrap();
/// assert_eq!(b.as_bytes(), 64 * 1024 * 1024);
/// assert!(b.fits(1024));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemoryBudget {
    bytes: usize,
}

impl MemoryBudget {
    /// Creates a budget from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a budget from megabytes. Saturates at [`unlimited`](Self::unlimited).
    pub fn from_mb(mb: usize) -> Self {
        Self {
            bytes: mb.saturating_mul(MB),
        }
    }

    /// A budget that never rejects an allocation.
    pub fn unlimited() -> Self {
        Self { bytes: usize::MAX }
    }

    /// Returns the budget in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns `true` if an allocation of `bytes` stays within the budget.
    pub fn fits(&self, bytes: usize) -> bool {
        bytes <= self.bytes
    }

    /// Parses a human-readable budget string. Case-insensitive; surrounding
    /// whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, BudgetError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BudgetError::Empty);
        }

        let upper = trimmed.to_uppercase();
        let (digits, multiplier) = SUFFIXES
            .iter()
            .find_map(|&(suffix, mult)| {
                upper
                    .strip_suffix(suffix)
                    .map(|rest| (rest.trim().to_string(), mult))
            })
            .unwrap_or((upper.clone(), 1));

        let value: usize = digits
            .parse()
            .map_err(|_| BudgetError::Invalid(trimmed.to_string()))?;
        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| BudgetError::Overflow(trimmed.to_string()))?;

        if bytes == 0 {
            return Err(BudgetError::Zero);
        }
        Ok(Self { bytes })
    }
}

impl fmt::Display for MemoryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes == usize::MAX {
            return write!(f, "unlimited");
        }
        match self.bytes {
            b if b >= GB && b % GB == 0 => write!(f, "{} GB", b / GB),
            b if b >= MB && b % MB == 0 => write!(f, "{} MB", b / MB),
            b if b >= KB && b % KB == 0 => write!(f, "{} KB", b / KB),
            b => write!(f, "{b} B"),
        }
    }
}
