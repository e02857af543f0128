// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Atomic property mutations with bounded optimistic retry
//!
//! The `atomic.*` procedure family mutates one property of one entity under
//! the store's exclusive write lock: read the old value, compute the
//! transform, write the new value. Conflict-class store failures restart the
//! whole attempt, consuming one unit of the retry budget; deterministic
//! input errors fail immediately. A result is only reported after the write
//! succeeded, carrying the old and new values together.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::exec::error::{ProcedureError, ProcedureResult};
use crate::storage::{
    AccessMode, ArrayValue, EntityRef, GraphStore, Params, Row, RowVisitor, StoreResult, Value,
};

/// Retry budget callers use unless they have a reason not to: a mutation
/// makes at most `times + 1` attempts.
pub const DEFAULT_RETRY_BUDGET: u64 = 5;

/// Outcome of a committed atomic mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicResult {
    pub entity: EntityRef,
    pub property: String,
    pub old_value: Value,
    pub new_value: Value,
}

/// Atomic mutation procedures over a graph store.
pub struct AtomicProcedures<'a> {
    store: &'a dyn GraphStore,
}

impl<'a> AtomicProcedures<'a> {
    pub fn new(store: &'a dyn GraphStore) -> Self {
        Self { store }
    }

    /// Adds a number to a numeric property. Two integers stay integral; any
    /// float operand promotes the result to a float.
    pub fn add(
        &self,
        container: &Value,
        property: &str,
        number: &Value,
        times: u64,
    ) -> ProcedureResult<AtomicResult> {
        let entity = entity_argument(container)?;
        self.locked_mutation(entity, property, times, |old| {
            let new = old.numeric_add(number).ok_or_else(|| {
                ProcedureError::TypeMismatch(format!(
                    "cannot add {} to {}",
                    number.type_name(),
                    old.type_name()
                ))
            })?;
            Ok((old.clone(), new))
        })
    }

    /// Subtracts a number from a numeric property, with the same promotion
    /// rules as [`AtomicProcedures::add`].
    pub fn subtract(
        &self,
        container: &Value,
        property: &str,
        number: &Value,
        times: u64,
    ) -> ProcedureResult<AtomicResult> {
        let entity = entity_argument(container)?;
        self.locked_mutation(entity, property, times, |old| {
            let new = old.numeric_subtract(number).ok_or_else(|| {
                ProcedureError::TypeMismatch(format!(
                    "cannot subtract {} from {}",
                    number.type_name(),
                    old.type_name()
                ))
            })?;
            Ok((old.clone(), new))
        })
    }

    /// Appends a suffix to the property's display rendering; the old value
    /// is reported as the rendered string.
    pub fn concat(
        &self,
        container: &Value,
        property: &str,
        suffix: &str,
        times: u64,
    ) -> ProcedureResult<AtomicResult> {
        let entity = entity_argument(container)?;
        self.locked_mutation(entity, property, times, |old| {
            let rendered = old.to_string();
            let new = Value::String(format!("{}{}", rendered, suffix));
            Ok((Value::String(rendered), new))
        })
    }

    /// Inserts a value into an array property at the given position. A
    /// scalar property is first wrapped as a one-element array; a position
    /// beyond the current length appends at the end. The inserted value must
    /// match the array's element type.
    pub fn insert(
        &self,
        container: &Value,
        property: &str,
        position: i64,
        value: &Value,
        times: u64,
    ) -> ProcedureResult<AtomicResult> {
        let entity = entity_argument(container)?;
        self.locked_mutation(entity, property, times, |old| {
            let base = match old {
                Value::Array(array) => array.clone(),
                scalar => ArrayValue::from_scalar(scalar).map_err(|err| {
                    ProcedureError::TypeMismatch(format!(
                        "cannot build an array from a {} property",
                        err.found
                    ))
                })?,
            };
            if position < 0 {
                return Err(ProcedureError::PositionOutOfRange {
                    position,
                    length: base.len(),
                });
            }
            let index = (position as usize).min(base.len());
            let updated = base.insert_value(index, value).map_err(|err| {
                ProcedureError::TypeMismatch(format!(
                    "array value has element type {}, value to insert has type {}",
                    err.expected, err.found
                ))
            })?;
            Ok((old.clone(), Value::Array(updated)))
        })
    }

    /// Removes the element at the given position from an array property.
    /// Positions in `0..length` remove; `position == length` is accepted and
    /// rewrites the array unchanged; anything else is out of range and
    /// leaves the property untouched.
    pub fn remove(
        &self,
        container: &Value,
        property: &str,
        position: i64,
        times: u64,
    ) -> ProcedureResult<AtomicResult> {
        let entity = entity_argument(container)?;
        self.locked_mutation(entity, property, times, |old| {
            let array = match old {
                Value::Array(array) => array,
                other => {
                    return Err(ProcedureError::TypeMismatch(format!(
                        "property must hold an array to remove from, found {}",
                        other.type_name()
                    )))
                }
            };
            let length = array.len();
            if position < 0 || position as usize > length {
                return Err(ProcedureError::PositionOutOfRange { position, length });
            }
            let updated = if (position as usize) < length {
                array.remove_at(position as usize)
            } else {
                array.clone()
            };
            Ok((old.clone(), Value::Array(updated)))
        })
    }

    /// Rewrites the property by executing a synthesized assignment statement
    /// in the current transaction, with the entity bound as `$entity`; the
    /// new value is read back after the statement runs.
    pub fn update(
        &self,
        container: &Value,
        property: &str,
        operation: &str,
        times: u64,
    ) -> ProcedureResult<AtomicResult> {
        let entity = entity_argument(container)?;
        let statement = format!("WITH $entity AS n SET n.{} = {}", property, operation);
        let (old_value, new_value) = self.with_retry(times, || {
            self.store.acquire_write_lock(entity)?;
            let old = self.store.get_property(entity, property)?;
            let mut params = Params::new();
            params.insert("entity".to_string(), Value::from(entity));
            self.store
                .execute(&statement, &params, AccessMode::Write, &mut DiscardRows)?;
            let new = self.store.get_property(entity, property)?;
            Ok((old, new))
        })?;
        Ok(AtomicResult {
            entity,
            property: property.to_string(),
            old_value,
            new_value,
        })
    }

    // ===== INTERNALS =====

    /// Lock, read, transform, write, under the retry budget. The transform
    /// returns the (reported old, new) pair; the new value is what gets
    /// written.
    fn locked_mutation<F>(
        &self,
        entity: EntityRef,
        property: &str,
        times: u64,
        transform: F,
    ) -> ProcedureResult<AtomicResult>
    where
        F: Fn(&Value) -> ProcedureResult<(Value, Value)>,
    {
        let (old_value, new_value) = self.with_retry(times, || {
            self.store.acquire_write_lock(entity)?;
            let stored = self.store.get_property(entity, property)?;
            let (reported_old, new_value) = transform(&stored)?;
            self.store
                .set_property(entity, property, new_value.clone())?;
            Ok((reported_old, new_value))
        })?;
        Ok(AtomicResult {
            entity,
            property: property.to_string(),
            old_value,
            new_value,
        })
    }

    /// Drives attempts until one succeeds, a non-conflict failure surfaces,
    /// or the budget runs out; the exhausted budget surfaces the last
    /// conflict unmodified.
    fn with_retry<T>(
        &self,
        times: u64,
        mut attempt: impl FnMut() -> ProcedureResult<T>,
    ) -> ProcedureResult<T> {
        let mut remaining = times;
        loop {
            match attempt() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable_conflict() && remaining > 0 => {
                    remaining -= 1;
                    debug!(
                        "retrying atomic mutation after conflict, {} attempt(s) left: {}",
                        remaining, err
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn entity_argument(container: &Value) -> ProcedureResult<EntityRef> {
    EntityRef::try_from(container).map_err(|err| {
        ProcedureError::InvalidArgument(format!(
            "the container must be a node or relationship reference, found {}",
            err.found
        ))
    })
}

/// The synthesized assignment produces no rows worth keeping.
struct DiscardRows;

impl RowVisitor for DiscardRows {
    fn visit(&mut self, _row: &Row) -> StoreResult<bool> {
        Ok(true)
    }
}
