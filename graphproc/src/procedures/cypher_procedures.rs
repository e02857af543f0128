// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dynamic statement execution procedures
//!
//! The `cypher.*` procedure family: single statements in the current
//! transaction (`run`, `do_it`, `run_write`, `run_schema`), whole scripts
//! with one fresh transaction per statement (`run_many`,
//! `run_many_read_only`), and conditional dispatch (`when` / `case` with
//! their write-mode `do_*` variants).
//!
//! Read-only enforcement is the store's: the read variants grant
//! `AccessMode::Read` and rely on the store to refuse anything stronger.

use crate::exec::error::{ProcedureError, ProcedureResult};
use crate::exec::runner::BatchRows;
use crate::storage::{AccessMode, GraphStore, Params, Row, RowVisitor, StoreResult, Value};

/// Options for batch script execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunManyConfig {
    /// Append a synthetic statistics row after each statement's rows.
    pub statistics: bool,
}

impl Default for RunManyConfig {
    fn default() -> Self {
        Self { statistics: true }
    }
}

impl RunManyConfig {
    /// Reads options from a dynamic configuration map, coercing the
    /// `statistics` entry leniently; absent means enabled.
    pub fn from_map(config: &Params) -> Self {
        let statistics = config.get("statistics").map(truthy).unwrap_or(true);
        Self { statistics }
    }

    pub fn without_statistics() -> Self {
        Self { statistics: false }
    }
}

/// Lenient truthiness for dynamic configuration values: `null` and the
/// strings `""`, `"false"`, `"no"` and `"0"` are false, zero numbers are
/// false, everything else coerces to true.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => {
            !(s.is_empty()
                || s.eq_ignore_ascii_case("false")
                || s.eq_ignore_ascii_case("no")
                || s == "0")
        }
        Value::Array(array) => !array.is_empty(),
        Value::Node(_) | Value::Relationship(_) => true,
    }
}

/// Statement execution procedures over a graph store.
pub struct CypherProcedures<'a> {
    store: &'a dyn GraphStore,
}

impl<'a> CypherProcedures<'a> {
    pub fn new(store: &'a dyn GraphStore) -> Self {
        Self { store }
    }

    // ===== SINGLE STATEMENTS =====

    /// Runs one read-only statement in the current transaction.
    pub fn run(&self, statement: &str, params: &Params) -> ProcedureResult<Vec<Row>> {
        run_single(self.store, statement, params, AccessMode::Read)
    }

    /// Runs one read/write statement in the current transaction.
    pub fn do_it(&self, statement: &str, params: &Params) -> ProcedureResult<Vec<Row>> {
        run_single(self.store, statement, params, AccessMode::Write)
    }

    /// Alias of [`CypherProcedures::do_it`].
    pub fn run_write(&self, statement: &str, params: &Params) -> ProcedureResult<Vec<Row>> {
        self.do_it(statement, params)
    }

    /// Runs one schema statement in the current transaction.
    pub fn run_schema(&self, statement: &str, params: &Params) -> ProcedureResult<Vec<Row>> {
        run_single(self.store, statement, params, AccessMode::Schema)
    }

    // ===== BATCH SCRIPTS =====

    /// Runs every statement of a script, each in its own fresh transaction,
    /// with write access. The parameter map applies identically to every
    /// statement; rows surface lazily as the returned iterator is pulled.
    pub fn run_many(
        &self,
        script: &str,
        params: &'a Params,
        config: RunManyConfig,
    ) -> BatchRows<'a> {
        BatchRows::new(self.store, script, params, AccessMode::Write, config.statistics)
    }

    /// [`CypherProcedures::run_many`] restricted to read access; statements
    /// the store refuses under that mode contribute zero rows.
    pub fn run_many_read_only(
        &self,
        script: &str,
        params: &'a Params,
        config: RunManyConfig,
    ) -> BatchRows<'a> {
        BatchRows::new(self.store, script, params, AccessMode::Read, config.statistics)
    }

    // ===== CONDITIONAL DISPATCH =====

    /// Runs `if_query` when the condition holds, `else_query` otherwise,
    /// read-only. An empty selected query yields one row with an empty
    /// column mapping.
    pub fn when(
        &self,
        condition: bool,
        if_query: &str,
        else_query: &str,
        params: &Params,
    ) -> ProcedureResult<Vec<Row>> {
        self.dispatch_when(condition, if_query, else_query, params, AccessMode::Read)
    }

    /// Write-mode variant of [`CypherProcedures::when`].
    pub fn do_when(
        &self,
        condition: bool,
        if_query: &str,
        else_query: &str,
        params: &Params,
    ) -> ProcedureResult<Vec<Row>> {
        self.dispatch_when(condition, if_query, else_query, params, AccessMode::Write)
    }

    /// Scans (condition, query) pairs and runs the first query whose
    /// condition is true, read-only; with none true, the else-query runs.
    /// The pair list is validated before anything executes.
    pub fn case(
        &self,
        conditionals: &[Value],
        else_query: &str,
        params: &Params,
    ) -> ProcedureResult<Vec<Row>> {
        self.dispatch_case(conditionals, else_query, params, AccessMode::Read)
    }

    /// Write-mode variant of [`CypherProcedures::case`].
    pub fn do_case(
        &self,
        conditionals: &[Value],
        else_query: &str,
        params: &Params,
    ) -> ProcedureResult<Vec<Row>> {
        self.dispatch_case(conditionals, else_query, params, AccessMode::Write)
    }

    // ===== INTERNALS =====

    fn dispatch_when(
        &self,
        condition: bool,
        if_query: &str,
        else_query: &str,
        params: &Params,
        mode: AccessMode,
    ) -> ProcedureResult<Vec<Row>> {
        let target = if condition { if_query } else { else_query };
        self.run_selected(target, params, mode)
    }

    fn dispatch_case(
        &self,
        conditionals: &[Value],
        else_query: &str,
        params: &Params,
        mode: AccessMode,
    ) -> ProcedureResult<Vec<Row>> {
        let branches = pair_conditionals(conditionals)?;
        let target = branches
            .iter()
            .find(|(condition, _)| *condition)
            .map(|(_, query)| query.as_str())
            .unwrap_or(else_query);
        self.run_selected(target, params, mode)
    }

    fn run_selected(
        &self,
        query: &str,
        params: &Params,
        mode: AccessMode,
    ) -> ProcedureResult<Vec<Row>> {
        if query.trim().is_empty() {
            return Ok(vec![Row::new()]);
        }
        run_single(self.store, query, params, mode)
    }
}

/// Validates and pairs a dynamic conditionals list into (condition, query)
/// branches. Rejected shapes fail before any query executes.
fn pair_conditionals(conditionals: &[Value]) -> ProcedureResult<Vec<(bool, String)>> {
    if conditionals.len() % 2 != 0 {
        return Err(ProcedureError::InvalidArgument(
            "conditionals must be an even-sized collection of boolean, query entries".to_string(),
        ));
    }
    conditionals
        .chunks_exact(2)
        .map(|pair| match (&pair[0], &pair[1]) {
            (Value::Boolean(condition), Value::String(query)) => Ok((*condition, query.clone())),
            (condition, query) => Err(ProcedureError::InvalidArgument(format!(
                "conditionals must alternate boolean conditions and query strings, found {} followed by {}",
                condition.type_name(),
                query.type_name()
            ))),
        })
        .collect()
}

fn run_single(
    store: &dyn GraphStore,
    statement: &str,
    params: &Params,
    mode: AccessMode,
) -> ProcedureResult<Vec<Row>> {
    let mut visitor = CollectingVisitor::default();
    store.execute(statement, params, mode, &mut visitor)?;
    Ok(visitor.rows)
}

#[derive(Default)]
struct CollectingVisitor {
    rows: Vec<Row>,
}

impl RowVisitor for CollectingVisitor {
    fn visit(&mut self, row: &Row) -> StoreResult<bool> {
        self.rows.push(row.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ArrayValue, CannedStatement, MemoryGraph, StoreError};

    #[test]
    fn test_truthy_coercion() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&Value::Boolean(false)));
        assert!(!truthy(&Value::Integer(0)));
        assert!(!truthy(&Value::Float(0.0)));
        assert!(!truthy(&Value::String("false".to_string())));
        assert!(!truthy(&Value::String("NO".to_string())));
        assert!(!truthy(&Value::String("0".to_string())));
        assert!(!truthy(&Value::String(String::new())));
        assert!(!truthy(&Value::Array(ArrayValue::Integer(vec![]))));

        assert!(truthy(&Value::Boolean(true)));
        assert!(truthy(&Value::Integer(7)));
        assert!(truthy(&Value::Float(0.5)));
        assert!(truthy(&Value::String("yes".to_string())));
        assert!(truthy(&Value::Array(ArrayValue::Integer(vec![1]))));
    }

    #[test]
    fn test_config_defaults_to_statistics() {
        assert!(RunManyConfig::default().statistics);
        assert!(RunManyConfig::from_map(&Params::new()).statistics);

        let mut config = Params::new();
        config.insert("statistics".to_string(), Value::Boolean(false));
        assert!(!RunManyConfig::from_map(&config).statistics);

        config.insert("statistics".to_string(), Value::String("no".to_string()));
        assert!(!RunManyConfig::from_map(&config).statistics);
    }

    #[test]
    fn test_run_is_read_only() {
        let graph = MemoryGraph::new();
        graph.register(
            "CREATE (n)",
            CannedStatement::returning(vec![]).requiring(AccessMode::Write),
        );
        let procedures = CypherProcedures::new(&graph);

        let err = procedures.run("CREATE (n)", &Params::new()).unwrap_err();
        assert!(matches!(
            err,
            ProcedureError::Store(StoreError::AuthorizationViolation(_))
        ));
        assert!(procedures.do_it("CREATE (n)", &Params::new()).is_ok());
        assert!(procedures.run_write("CREATE (n)", &Params::new()).is_ok());
    }

    #[test]
    fn test_run_schema_grants_schema_mode() {
        let graph = MemoryGraph::new();
        graph.register(
            "CREATE INDEX idx",
            CannedStatement::returning(vec![]).requiring(AccessMode::Schema),
        );
        let procedures = CypherProcedures::new(&graph);

        assert!(procedures.do_it("CREATE INDEX idx", &Params::new()).is_err());
        assert!(procedures.run_schema("CREATE INDEX idx", &Params::new()).is_ok());
    }

    #[test]
    fn test_run_buffers_rows_in_order() {
        let graph = MemoryGraph::new();
        let procedures = CypherProcedures::new(&graph);
        let rows = procedures
            .run("RETURN 1 AS a, 2 AS b", &Params::new())
            .unwrap();
        assert_eq!(rows.len(), 1);
        let columns: Vec<&str> = rows[0].columns().collect();
        assert_eq!(columns, vec!["a", "b"]);
    }

    #[test]
    fn test_when_routes_on_condition() {
        let graph = MemoryGraph::new();
        let procedures = CypherProcedures::new(&graph);

        let rows = procedures
            .when(true, "RETURN 'if' AS branch", "RETURN 'else' AS branch", &Params::new())
            .unwrap();
        assert_eq!(rows[0].get("branch"), Some(&Value::String("if".to_string())));

        let rows = procedures
            .when(false, "RETURN 'if' AS branch", "RETURN 'else' AS branch", &Params::new())
            .unwrap();
        assert_eq!(rows[0].get("branch"), Some(&Value::String("else".to_string())));
    }

    #[test]
    fn test_when_empty_target_yields_one_empty_row() {
        let graph = MemoryGraph::new();
        let procedures = CypherProcedures::new(&graph);

        let rows = procedures
            .when(false, "RETURN 1", "", &Params::new())
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_empty());
        assert!(graph.executed_statements().is_empty());
    }

    #[test]
    fn test_do_when_grants_write_mode() {
        let graph = MemoryGraph::new();
        graph.register(
            "CREATE (n)",
            CannedStatement::returning(vec![]).requiring(AccessMode::Write),
        );
        let procedures = CypherProcedures::new(&graph);

        assert!(procedures
            .when(true, "CREATE (n)", "", &Params::new())
            .is_err());
        assert!(procedures
            .do_when(true, "CREATE (n)", "", &Params::new())
            .is_ok());
    }

    #[test]
    fn test_case_runs_first_true_branch() {
        let graph = MemoryGraph::new();
        let procedures = CypherProcedures::new(&graph);
        let conditionals = vec![
            Value::Boolean(false),
            Value::String("RETURN 'first' AS q".to_string()),
            Value::Boolean(true),
            Value::String("RETURN 'second' AS q".to_string()),
            Value::Boolean(true),
            Value::String("RETURN 'third' AS q".to_string()),
        ];

        let rows = procedures
            .case(&conditionals, "RETURN 'else' AS q", &Params::new())
            .unwrap();
        assert_eq!(rows[0].get("q"), Some(&Value::String("second".to_string())));
        assert_eq!(
            graph.executed_statements(),
            vec!["RETURN 'second' AS q".to_string()]
        );
    }

    #[test]
    fn test_case_falls_back_to_else() {
        let graph = MemoryGraph::new();
        let procedures = CypherProcedures::new(&graph);
        let conditionals = vec![
            Value::Boolean(false),
            Value::String("RETURN 'first' AS q".to_string()),
        ];

        let rows = procedures
            .case(&conditionals, "RETURN 'else' AS q", &Params::new())
            .unwrap();
        assert_eq!(rows[0].get("q"), Some(&Value::String("else".to_string())));

        let rows = procedures.case(&conditionals, "", &Params::new()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_empty());
    }

    #[test]
    fn test_case_rejects_odd_length_before_executing() {
        let graph = MemoryGraph::new();
        let procedures = CypherProcedures::new(&graph);
        let conditionals = vec![
            Value::Boolean(true),
            Value::String("RETURN 1".to_string()),
            Value::Boolean(false),
        ];

        let err = procedures
            .case(&conditionals, "RETURN 2", &Params::new())
            .unwrap_err();
        assert!(matches!(err, ProcedureError::InvalidArgument(_)));
        assert!(graph.executed_statements().is_empty());
    }

    #[test]
    fn test_case_rejects_malformed_pairs() {
        let graph = MemoryGraph::new();
        let procedures = CypherProcedures::new(&graph);
        let conditionals = vec![Value::Integer(1), Value::String("RETURN 1".to_string())];

        let err = procedures
            .case(&conditionals, "", &Params::new())
            .unwrap_err();
        match err {
            ProcedureError::InvalidArgument(message) => {
                assert!(message.contains("INTEGER"));
            }
            other => panic!("expected invalid argument, got {}", other),
        }
    }
}
