// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! The transactional graph store contract consumed by the procedures
//!
//! This module defines the narrow seam between the procedure surfaces and
//! whatever engine hosts them:
//! - `GraphStore` - statement execution, locking, property access, termination
//! - `RowVisitor` - per-row callback driven while a statement executes
//! - `Row` / `QueryStatistics` - what a statement execution produces
//! - `AccessMode` - the privilege granted to one execution
//! - `StoreError` - failures raised by the store, with conflict classification

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{EntityRef, Params};
use super::value::Value;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure raised by the graph store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The granted access mode does not permit the statement.
    #[error("authorization violation: {0}")]
    AuthorizationViolation(String),

    /// An entity or property no longer exists.
    #[error("not found: {0}")]
    NotFound(String),

    /// A transient engine failure (lock contention, leader switch, ...).
    #[error("transient failure: {0}")]
    Transient(String),

    /// An internal consistency check tripped.
    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    /// The enclosing operation was asked to stop.
    #[error("the operation has been terminated")]
    Terminated,

    /// Any other statement execution failure.
    #[error("statement execution failed: {0}")]
    ExecutionFailed(String),
}

impl StoreError {
    /// Conflict-class failures are those a caller may retry after re-reading:
    /// transient engine trouble, entities deleted under a concurrent writer,
    /// and tripped internal assertions. Authorization and plain execution
    /// failures are deterministic and excluded.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::Transient(_) | StoreError::NotFound(_) | StoreError::AssertionFailed(_)
        )
    }
}

/// The privilege granted to a single statement execution.
///
/// Modes are ordered: `Read < Write < Schema`. A store must reject a
/// statement that needs more than the granted mode with
/// [`StoreError::AuthorizationViolation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    Read,
    Write,
    Schema,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "read",
            AccessMode::Write => "write",
            AccessMode::Schema => "schema",
        }
    }
}

/// One result record with named, ordered columns.
///
/// Column order is exactly the order the statement produced; all rows of one
/// statement share one column set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    /// An empty column mapping.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(name: impl Into<String>, value: Value) -> Self {
        let mut row = Self::new();
        row.push(name, value);
        row
    }

    pub fn from_pairs(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }

    /// Appends a column; order of insertion is the column order.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.entries.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(column, _)| column.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mutation counters for one statement's transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryStatistics {
    pub nodes_created: u64,
    pub nodes_deleted: u64,
    pub labels_added: u64,
    pub labels_removed: u64,
    pub relationships_created: u64,
    pub relationships_deleted: u64,
    pub properties_set: u64,
    pub constraints_added: u64,
    pub constraints_removed: u64,
    pub indexes_added: u64,
    pub indexes_removed: u64,
}

/// Per-row callback driven by the store while a statement executes.
pub trait RowVisitor {
    /// Called once per result row, in order. Return `Ok(true)` to keep
    /// consuming rows, `Ok(false)` to stop early.
    fn visit(&mut self, row: &Row) -> StoreResult<bool>;
}

/// The external collaborator every procedure runs against.
///
/// Implementations take `&self`; interior mutability (or a connection handle)
/// is the implementor's concern. Callers never hold two open transactions
/// concurrently: `execute_transactionally` runs statements strictly one after
/// another.
pub trait GraphStore {
    /// Executes one statement in a fresh transaction, committing on success.
    /// The visitor sees every result row in order; the statistics snapshot
    /// covers exactly this statement's transaction.
    fn execute_transactionally(
        &self,
        statement: &str,
        params: &Params,
        mode: AccessMode,
        visitor: &mut dyn RowVisitor,
    ) -> StoreResult<QueryStatistics>;

    /// Executes one statement inside the current transaction.
    fn execute(
        &self,
        statement: &str,
        params: &Params,
        mode: AccessMode,
        visitor: &mut dyn RowVisitor,
    ) -> StoreResult<QueryStatistics>;

    /// Blocks until the exclusive write lock on `entity` is held. The lock is
    /// scoped to the current transaction and released with it.
    fn acquire_write_lock(&self, entity: EntityRef) -> StoreResult<()>;

    /// Reads a property value. Fails with [`StoreError::NotFound`] when the
    /// entity or the property does not exist (a missing property is
    /// indistinguishable from a concurrent removal).
    fn get_property(&self, entity: EntityRef, name: &str) -> StoreResult<Value>;

    /// Writes a property value. Fails with [`StoreError::NotFound`] when the
    /// entity no longer exists.
    fn set_property(&self, entity: EntityRef, name: &str, value: Value) -> StoreResult<()>;

    /// Cooperative cancellation check. Fails with [`StoreError::Terminated`]
    /// once the enclosing operation has been asked to stop.
    fn check_termination(&self) -> StoreResult<()> {
        Ok(())
    }
}
