//! Error types for BCD store operations.
//!
//! This module provides error handling for both codec layers: hive parsing
//! and serialization failures, and semantic-layer failures such as capacity
//! ceilings and missing objects.

use std::io;
use thiserror::Error;

/// Result type alias for BCD store operations.
pub type Result<T> = std::result::Result<T, BcdError>;

/// Errors that can occur while reading, editing, or writing a BCD store.
#[derive(Error, Debug)]
pub enum BcdError {
    /// I/O error occurred while reading or writing a store file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic signature in the hive header or a cell.
    #[error("Invalid signature: expected {expected:?}, found {found:?}")]
    InvalidSignature {
        expected: Vec<u8>,
        found: Vec<u8>,
    },

    /// Hive buffer is too small to contain a base block.
    #[error("Hive too small: {size} bytes (minimum: {minimum} bytes)")]
    HiveTooSmall {
        size: usize,
        minimum: usize,
    },

    /// Data truncated or incomplete.
    #[error("Truncated data at offset {offset:#x}: expected {expected} bytes, got {actual} bytes")]
    TruncatedData {
        offset: u32,
        expected: usize,
        actual: usize,
    },

    /// Malformed hive structure.
    #[error("Invalid hive format: {0}")]
    InvalidFormat(String),

    /// Malformed object identifier text.
    #[error("Invalid object identifier: {0:?}")]
    InvalidGuid(String),

    /// Object or element not found in the store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bounded container is full.
    #[error("Capacity exceeded: {what} (limit: {limit})")]
    CapacityExceeded {
        what: &'static str,
        limit: usize,
    },
}

impl BcdError {
    /// Creates an invalid signature error with context.
    pub fn invalid_signature(expected: &[u8], found: &[u8]) -> Self {
        Self::InvalidSignature {
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }

    /// Creates a not found error with context about what was being searched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bcd_store::error::BcdError;
    /// let err = BcdError::not_found("object", "{9dea862c-5cdd-4e70-acc1-f32b344d4795}");
    /// ```
    pub fn not_found(item_type: &str, name: &str) -> Self {
        Self::NotFound(format!("{} '{}'", item_type, name))
    }

    /// Creates a capacity error for a bounded container.
    pub fn capacity(what: &'static str, limit: usize) -> Self {
        Self::CapacityExceeded { what, limit }
    }
}
