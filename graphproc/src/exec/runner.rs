// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Batch statement runner
//!
//! Executes a split script one statement at a time, each in its own fresh
//! transaction, and exposes the buffered rows as one lazy sequence:
//! - Statement k+1 only executes once the consumer has drained statement k
//! - A cooperative termination check runs between statements, never inside
//! - Authorization violations contribute zero rows and the batch continues
//! - Any other failure ends the batch, wrapped with the statement text
//!
//! Rows already yielded stay with the consumer regardless of how the batch
//! ends; committed statements are never rolled back by a later failure.

use std::collections::VecDeque;
use std::time::Instant;

use log::{debug, warn};

use crate::storage::{
    AccessMode, GraphStore, Params, Row, RowVisitor, StoreError, StoreResult,
};

use super::error::{ProcedureError, ProcedureResult};
use super::result::{statistics_row, RowResult};
use super::script::split_statements;

/// Lazy, non-restartable sequence of batch rows.
///
/// Fuses after the first fatal error or after the last statement drains.
pub struct BatchRows<'a> {
    store: &'a dyn GraphStore,
    params: &'a Params,
    mode: AccessMode,
    include_statistics: bool,
    statements: std::vec::IntoIter<String>,
    buffered: VecDeque<RowResult>,
    finished: bool,
}

impl<'a> BatchRows<'a> {
    pub(crate) fn new(
        store: &'a dyn GraphStore,
        script: &str,
        params: &'a Params,
        mode: AccessMode,
        include_statistics: bool,
    ) -> Self {
        let statements = split_statements(script);
        debug!(
            "batch script split into {} statement(s), {} access",
            statements.len(),
            mode.as_str()
        );
        Self {
            store,
            params,
            mode,
            include_statistics,
            statements: statements.into_iter(),
            buffered: VecDeque::new(),
            finished: false,
        }
    }

    /// Runs one statement and refills the buffer with its rows (and the
    /// statistics row when enabled). A swallowed authorization violation
    /// leaves the buffer empty so the loop moves on to the next statement.
    fn run_statement(&mut self, statement: &str) -> ProcedureResult<()> {
        self.store.check_termination()?;
        debug!("executing batch statement: {}", statement);

        let mut visitor = BufferingVisitor::default();
        let started = Instant::now();
        match self.store.execute_transactionally(
            statement,
            self.params,
            self.mode,
            &mut visitor,
        ) {
            Ok(statistics) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                let row_count = visitor.count;
                self.buffered = visitor.rows.into();
                if self.include_statistics {
                    self.buffered
                        .push_back(statistics_row(row_count, elapsed_ms, &statistics));
                }
                Ok(())
            }
            Err(StoreError::AuthorizationViolation(reason)) => {
                warn!(
                    "skipping statement after authorization violation ({}): {}",
                    reason, statement
                );
                Ok(())
            }
            Err(source) => Err(ProcedureError::StatementFailed {
                statement: statement.to_string(),
                source,
            }),
        }
    }
}

impl Iterator for BatchRows<'_> {
    type Item = ProcedureResult<RowResult>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            if let Some(row) = self.buffered.pop_front() {
                return Some(Ok(row));
            }
            let statement = match self.statements.next() {
                Some(statement) => statement,
                None => {
                    self.finished = true;
                    return None;
                }
            };
            if let Err(err) = self.run_statement(&statement) {
                self.finished = true;
                return Some(Err(err));
            }
        }
    }
}

/// Buffers rows with their 0-based per-statement index.
#[derive(Default)]
struct BufferingVisitor {
    rows: Vec<RowResult>,
    count: u64,
}

impl RowVisitor for BufferingVisitor {
    fn visit(&mut self, row: &Row) -> StoreResult<bool> {
        self.rows.push(RowResult::new(self.count as i64, row.clone()));
        self.count += 1;
        Ok(true)
    }
}
