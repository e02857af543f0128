// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Value model and graph store contract
//!
//! This module provides everything the procedures know about the hosting
//! engine:
//! - Property values and homogeneous arrays (`value`)
//! - Entity references and parameter maps (`types`)
//! - The `GraphStore` trait with rows, statistics and failure taxonomy
//!   (`graph_store`)
//! - An in-memory reference store for tests (`memory`)

pub mod graph_store;
pub mod memory;
pub mod types;
pub mod value;

pub use graph_store::{
    AccessMode, GraphStore, QueryStatistics, Row, RowVisitor, StoreError, StoreResult,
};
pub use memory::{CannedStatement, MemoryGraph};
pub use types::{EntityRef, NotAnEntity, Params};
pub use value::{ArrayValue, MismatchedElement, Value};
