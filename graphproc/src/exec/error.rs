// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Procedure-level failure taxonomy

use thiserror::Error;

use crate::storage::StoreError;

pub type ProcedureResult<T> = Result<T, ProcedureError>;

/// Failure raised by a procedure surface.
///
/// Store failures pass through transparently unless a procedure attaches
/// context of its own (the batch runner wraps fatal statement failures with
/// the offending statement text). Input-contract violations are deterministic
/// and never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcedureError {
    /// A dynamic argument violated the procedure's input contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A value had the wrong type for the requested transform.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An array position outside the accepted bounds.
    #[error("position {position} is out of range for array of length {length}")]
    PositionOutOfRange { position: i64, length: usize },

    /// A batch statement failed fatally; carries the offending statement.
    #[error("failed to execute inner statement: {statement}")]
    StatementFailed {
        statement: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProcedureError {
    /// Whether this failure is a conflict the atomic retry loop may consume
    /// budget on. Only plain store conflicts qualify; wrapped statement
    /// failures and input violations are deterministic.
    pub fn is_retryable_conflict(&self) -> bool {
        matches!(self, ProcedureError::Store(source) if source.is_conflict())
    }
}
