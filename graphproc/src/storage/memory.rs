// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory reference implementation of the graph store contract
//!
//! This store backs the test suite and doubles as executable documentation of
//! the `GraphStore` contract:
//! - Node/relationship property maps behind `parking_lot` locks
//! - Canned statement outcomes (rows, statistics, failures) keyed by text
//! - Built-in interpretation of literal `RETURN` projections and of the
//!   property-assignment shape the atomic `update` mutation synthesizes
//! - Fault-injection queues for lock acquisitions and property writes
//! - A termination countdown and an executed-statement log for assertions
//!
//! It is a contract reference, not an engine: anything beyond the shapes
//! above fails with `ExecutionFailed`.

use std::collections::{HashMap, VecDeque};

use lazy_static::lazy_static;
use log::debug;
use parking_lot::{Mutex, RwLock};
use regex::Regex;

use super::graph_store::{
    AccessMode, GraphStore, QueryStatistics, Row, RowVisitor, StoreError, StoreResult,
};
use super::types::{EntityRef, Params};
use super::value::Value;

lazy_static! {
    static ref RETURN_SHAPE: Regex =
        Regex::new(r"(?is)^RETURN\s+(.+)$").expect("valid projection pattern");
    static ref AS_SPLIT: Regex = Regex::new(r"(?i)\s+AS\s+").expect("valid alias pattern");
    static ref SET_SHAPE: Regex = Regex::new(
        r"(?i)^WITH\s+\$(?P<param>\w+)\s+AS\s+(?P<binding>\w+)\s+SET\s+(?P<target>\w+)\.(?P<property>\w+)\s*=\s*(?P<literal>.+)$"
    )
    .expect("valid assignment pattern");
}

/// Scripted outcome for one registered statement.
#[derive(Debug, Clone)]
pub struct CannedStatement {
    required_mode: AccessMode,
    rows: Vec<Row>,
    statistics: QueryStatistics,
    failure: Option<StoreError>,
}

impl CannedStatement {
    /// A read statement producing the given rows.
    pub fn returning(rows: Vec<Row>) -> Self {
        Self {
            required_mode: AccessMode::Read,
            rows,
            statistics: QueryStatistics::default(),
            failure: None,
        }
    }

    /// A statement that fails with the given error once dispatched.
    pub fn failing(error: StoreError) -> Self {
        Self {
            required_mode: AccessMode::Read,
            rows: Vec::new(),
            statistics: QueryStatistics::default(),
            failure: Some(error),
        }
    }

    /// Attaches the statistics snapshot reported on success.
    pub fn with_statistics(mut self, statistics: QueryStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    /// Raises the access mode the statement needs.
    pub fn requiring(mut self, mode: AccessMode) -> Self {
        self.required_mode = mode;
        self
    }
}

/// In-memory graph store with scripted statements and fault injection.
#[derive(Default)]
pub struct MemoryGraph {
    nodes: RwLock<HashMap<u64, HashMap<String, Value>>>,
    relationships: RwLock<HashMap<u64, HashMap<String, Value>>>,
    next_id: Mutex<u64>,
    canned: RwLock<HashMap<String, CannedStatement>>,
    lock_failures: Mutex<VecDeque<StoreError>>,
    write_failures: Mutex<VecDeque<StoreError>>,
    termination_budget: Mutex<Option<u64>>,
    executed: Mutex<Vec<String>>,
    locks_taken: Mutex<Vec<EntityRef>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== GRAPH POPULATION =====

    pub fn add_node(&self, properties: Vec<(&str, Value)>) -> EntityRef {
        EntityRef::Node(self.insert_entity(&self.nodes, properties))
    }

    pub fn add_relationship(&self, properties: Vec<(&str, Value)>) -> EntityRef {
        EntityRef::Relationship(self.insert_entity(&self.relationships, properties))
    }

    /// Deletes an entity, releasing nothing else; returns whether it existed.
    pub fn remove_entity(&self, entity: EntityRef) -> bool {
        self.entity_table(entity).write().remove(&entity.id()).is_some()
    }

    /// Direct property peek for assertions, bypassing the store contract.
    pub fn property(&self, entity: EntityRef, name: &str) -> Option<Value> {
        self.entity_table(entity)
            .read()
            .get(&entity.id())
            .and_then(|props| props.get(name).cloned())
    }

    // ===== STATEMENT SCRIPTING =====

    /// Registers a canned outcome, keyed by the normalized statement text.
    pub fn register(&self, statement: &str, canned: CannedStatement) {
        self.canned
            .write()
            .insert(normalize_statement(statement), canned);
    }

    // ===== FAULT INJECTION =====

    /// Queues failures returned by upcoming lock acquisitions, in order.
    pub fn fail_next_locks(&self, errors: Vec<StoreError>) {
        self.lock_failures.lock().extend(errors);
    }

    /// Queues failures returned by upcoming property writes, in order.
    pub fn fail_next_writes(&self, errors: Vec<StoreError>) {
        self.write_failures.lock().extend(errors);
    }

    /// Arms the termination signal: the given number of checks still succeed,
    /// every later check fails with [`StoreError::Terminated`].
    pub fn terminate_after(&self, successful_checks: u64) {
        *self.termination_budget.lock() = Some(successful_checks);
    }

    // ===== OBSERVATION =====

    /// Every statement the store was asked to execute, in order, normalized.
    pub fn executed_statements(&self) -> Vec<String> {
        self.executed.lock().clone()
    }

    /// Every write lock successfully acquired, in order.
    pub fn write_locks_taken(&self) -> Vec<EntityRef> {
        self.locks_taken.lock().clone()
    }

    // ===== INTERNALS =====

    fn insert_entity(
        &self,
        table: &RwLock<HashMap<u64, HashMap<String, Value>>>,
        properties: Vec<(&str, Value)>,
    ) -> u64 {
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            *next
        };
        let props = properties
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        table.write().insert(id, props);
        id
    }

    fn entity_table(&self, entity: EntityRef) -> &RwLock<HashMap<u64, HashMap<String, Value>>> {
        match entity {
            EntityRef::Node(_) => &self.nodes,
            EntityRef::Relationship(_) => &self.relationships,
        }
    }

    fn contains(&self, entity: EntityRef) -> bool {
        self.entity_table(entity).read().contains_key(&entity.id())
    }

    fn write_property(&self, entity: EntityRef, name: &str, value: Value) -> StoreResult<()> {
        let mut table = self.entity_table(entity).write();
        let props = table
            .get_mut(&entity.id())
            .ok_or_else(|| StoreError::NotFound(format!("{} no longer exists", entity)))?;
        props.insert(name.to_string(), value);
        Ok(())
    }

    fn exec_statement(
        &self,
        statement: &str,
        params: &Params,
        mode: AccessMode,
        visitor: &mut dyn RowVisitor,
    ) -> StoreResult<QueryStatistics> {
        let normalized = normalize_statement(statement);
        debug!("executing in {} mode: {}", mode.as_str(), normalized);
        self.executed.lock().push(normalized.clone());

        let canned = self.canned.read().get(&normalized).cloned();
        if let Some(canned) = canned {
            return self.run_canned(&canned, mode, visitor);
        }
        if let Some(captures) = RETURN_SHAPE.captures(&normalized) {
            let projection = captures
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            return self.run_return(&projection, visitor);
        }
        if let Some(captures) = SET_SHAPE.captures(&normalized) {
            if captures["binding"] == captures["target"] {
                return self.run_set(&captures, params, mode);
            }
        }
        Err(StoreError::ExecutionFailed(format!(
            "statement not understood by this store: {}",
            normalized
        )))
    }

    fn run_canned(
        &self,
        canned: &CannedStatement,
        mode: AccessMode,
        visitor: &mut dyn RowVisitor,
    ) -> StoreResult<QueryStatistics> {
        if canned.required_mode > mode {
            return Err(StoreError::AuthorizationViolation(format!(
                "{} access required, {} granted",
                canned.required_mode.as_str(),
                mode.as_str()
            )));
        }
        if let Some(error) = &canned.failure {
            return Err(error.clone());
        }
        for row in &canned.rows {
            if !visitor.visit(row)? {
                break;
            }
        }
        Ok(canned.statistics)
    }

    /// Evaluates a literal projection, emitting exactly one row.
    fn run_return(
        &self,
        projection: &str,
        visitor: &mut dyn RowVisitor,
    ) -> StoreResult<QueryStatistics> {
        let mut row = Row::new();
        for item in projection.split(',') {
            let item = item.trim();
            let mut parts = AS_SPLIT.splitn(item, 2);
            let expression = parts.next().unwrap_or(item).trim();
            let alias = parts.next().map(str::trim);
            let value = parse_literal(expression).ok_or_else(|| {
                StoreError::ExecutionFailed(format!(
                    "unsupported expression in this store: {}",
                    expression
                ))
            })?;
            row.push(alias.unwrap_or(expression), value);
        }
        visitor.visit(&row)?;
        Ok(QueryStatistics::default())
    }

    /// Applies the `WITH $p AS n SET n.prop = <literal>` shape.
    fn run_set(
        &self,
        captures: &regex::Captures<'_>,
        params: &Params,
        mode: AccessMode,
    ) -> StoreResult<QueryStatistics> {
        if mode < AccessMode::Write {
            return Err(StoreError::AuthorizationViolation(format!(
                "write access required, {} granted",
                mode.as_str()
            )));
        }
        let param = &captures["param"];
        let bound = params.get(param).ok_or_else(|| {
            StoreError::ExecutionFailed(format!("parameter ${} is not bound", param))
        })?;
        let entity = EntityRef::try_from(bound).map_err(|err| {
            StoreError::ExecutionFailed(format!(
                "parameter ${} must be an entity, found {}",
                param, err.found
            ))
        })?;
        let literal = captures["literal"].trim();
        let value = parse_literal(literal).ok_or_else(|| {
            StoreError::ExecutionFailed(format!(
                "unsupported expression in this store: {}",
                literal
            ))
        })?;
        self.write_property(entity, &captures["property"], value)?;
        Ok(QueryStatistics {
            properties_set: 1,
            ..QueryStatistics::default()
        })
    }
}

impl GraphStore for MemoryGraph {
    // Statements apply immediately and each call stands alone, which
    // satisfies the fresh-transaction contract for a single-process store.
    fn execute_transactionally(
        &self,
        statement: &str,
        params: &Params,
        mode: AccessMode,
        visitor: &mut dyn RowVisitor,
    ) -> StoreResult<QueryStatistics> {
        self.exec_statement(statement, params, mode, visitor)
    }

    fn execute(
        &self,
        statement: &str,
        params: &Params,
        mode: AccessMode,
        visitor: &mut dyn RowVisitor,
    ) -> StoreResult<QueryStatistics> {
        self.exec_statement(statement, params, mode, visitor)
    }

    fn acquire_write_lock(&self, entity: EntityRef) -> StoreResult<()> {
        if let Some(error) = self.lock_failures.lock().pop_front() {
            return Err(error);
        }
        if !self.contains(entity) {
            return Err(StoreError::NotFound(format!("{} no longer exists", entity)));
        }
        self.locks_taken.lock().push(entity);
        Ok(())
    }

    fn get_property(&self, entity: EntityRef, name: &str) -> StoreResult<Value> {
        let table = self.entity_table(entity).read();
        let props = table
            .get(&entity.id())
            .ok_or_else(|| StoreError::NotFound(format!("{} no longer exists", entity)))?;
        props
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("property '{}' on {}", name, entity)))
    }

    fn set_property(&self, entity: EntityRef, name: &str, value: Value) -> StoreResult<()> {
        if let Some(error) = self.write_failures.lock().pop_front() {
            return Err(error);
        }
        self.write_property(entity, name, value)
    }

    fn check_termination(&self) -> StoreResult<()> {
        let mut budget = self.termination_budget.lock();
        match budget.as_mut() {
            None => Ok(()),
            Some(0) => Err(StoreError::Terminated),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
        }
    }
}

fn normalize_statement(statement: &str) -> String {
    let trimmed = statement.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed);
    trimmed.trim_end().to_string()
}

fn parse_literal(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("null") {
        return Some(Value::Null);
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Some(Value::Boolean(true));
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Some(Value::Boolean(false));
    }
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        return Some(Value::String(trimmed[1..trimmed.len() - 1].to_string()));
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::Integer(i));
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Some(Value::Float(f));
    }
    None
}
