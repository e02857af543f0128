// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Batch execution row records
//!
//! Every buffered row carries the 0-based position it had within its own
//! statement's result stream. The synthetic statistics row appended after a
//! statement (when enabled) always carries index -1 so consumers can tell it
//! apart without inspecting columns.

use serde::{Deserialize, Serialize};

use crate::storage::{QueryStatistics, Row, Value};

/// Index carried by the synthetic statistics row.
pub const STATISTICS_ROW_INDEX: i64 = -1;

/// One row of a batch execution: per-statement index plus named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowResult {
    pub index: i64,
    pub columns: Row,
}

impl RowResult {
    pub fn new(index: i64, columns: Row) -> Self {
        Self { index, columns }
    }

    pub fn is_statistics(&self) -> bool {
        self.index == STATISTICS_ROW_INDEX
    }
}

/// Builds the statistics row for one statement: buffered row count, elapsed
/// wall-clock milliseconds, then the mutation counters in the store's
/// reporting order.
pub(crate) fn statistics_row(
    row_count: u64,
    elapsed_ms: u64,
    statistics: &QueryStatistics,
) -> RowResult {
    let mut columns = Row::new();
    columns.push("rows", Value::Integer(row_count as i64));
    columns.push("time", Value::Integer(elapsed_ms as i64));
    columns.push("nodesCreated", Value::Integer(statistics.nodes_created as i64));
    columns.push("nodesDeleted", Value::Integer(statistics.nodes_deleted as i64));
    columns.push("labelsAdded", Value::Integer(statistics.labels_added as i64));
    columns.push("labelsRemoved", Value::Integer(statistics.labels_removed as i64));
    columns.push(
        "relationshipsCreated",
        Value::Integer(statistics.relationships_created as i64),
    );
    columns.push(
        "relationshipsDeleted",
        Value::Integer(statistics.relationships_deleted as i64),
    );
    columns.push("propertiesSet", Value::Integer(statistics.properties_set as i64));
    columns.push(
        "constraintsAdded",
        Value::Integer(statistics.constraints_added as i64),
    );
    columns.push(
        "constraintsRemoved",
        Value::Integer(statistics.constraints_removed as i64),
    );
    columns.push("indexesAdded", Value::Integer(statistics.indexes_added as i64));
    columns.push("indexesRemoved", Value::Integer(statistics.indexes_removed as i64));
    RowResult::new(STATISTICS_ROW_INDEX, columns)
}
