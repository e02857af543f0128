// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! GraphProc - extension procedures for transactional graph stores
//!
//! A library of stored procedures a hosting graph engine wires in through
//! one narrow trait:
//! - Batch script execution with per-statement transactions, buffered rows
//!   and optional statistics reporting (`cypher.run_many` family)
//! - Single-statement execution under read, write or schema access
//! - Conditional query dispatch (`when` / `case`)
//! - Atomic property mutations with exclusive locking and bounded
//!   optimistic retry (`atomic.*` family)
//!
//! The engine side of the seam is the [`storage::GraphStore`] trait; an
//! in-memory reference implementation backs the test suite.

pub mod exec;
pub mod procedures;
pub mod storage;

pub use exec::{BatchRows, ProcedureError, ProcedureResult, RowResult, STATISTICS_ROW_INDEX};
pub use procedures::{
    AtomicProcedures, AtomicResult, CypherProcedures, RunManyConfig, DEFAULT_RETRY_BUDGET,
};
pub use storage::{
    AccessMode, ArrayValue, CannedStatement, EntityRef, GraphStore, MemoryGraph, Params,
    QueryStatistics, Row, RowVisitor, StoreError, StoreResult, Value,
};
