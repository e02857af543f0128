// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Integration tests for conditional query dispatch
//!
//! Covers branch selection for `when` and `case`, the empty-query row
//! contract, pair validation ahead of execution, and the access modes the
//! `do_*` variants grant.

use graphproc::{
    AccessMode, CannedStatement, CypherProcedures, MemoryGraph, Params, ProcedureError, Row,
    StoreError, Value,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_when_selects_if_branch() {
    init_logging();
    let graph = MemoryGraph::new();
    let procedures = CypherProcedures::new(&graph);

    let rows = procedures
        .when(
            true,
            "RETURN 'if' AS branch",
            "RETURN 'else' AS branch",
            &Params::new(),
        )
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("branch"), Some(&Value::String("if".to_string())));
}

#[test]
fn test_when_false_with_empty_else_yields_empty_row() {
    init_logging();
    let graph = MemoryGraph::new();
    let procedures = CypherProcedures::new(&graph);

    let rows = procedures
        .when(false, "RETURN 'if' AS branch", "", &Params::new())
        .unwrap();

    assert_eq!(rows, vec![Row::new()]);
    assert!(graph.executed_statements().is_empty());
}

#[test]
fn test_when_false_runs_else_query() {
    init_logging();
    let graph = MemoryGraph::new();
    graph.register(
        "MATCH fallback",
        CannedStatement::returning(vec![
            Row::single("n", Value::Integer(1)),
            Row::single("n", Value::Integer(2)),
        ]),
    );
    let procedures = CypherProcedures::new(&graph);

    let rows = procedures
        .when(false, "RETURN 'if' AS branch", "MATCH fallback", &Params::new())
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("n"), Some(&Value::Integer(2)));
}

#[test]
fn test_when_read_mode_refuses_write_branch() {
    init_logging();
    let graph = MemoryGraph::new();
    graph.register(
        "CREATE (n)",
        CannedStatement::returning(vec![]).requiring(AccessMode::Write),
    );
    let procedures = CypherProcedures::new(&graph);

    let err = procedures
        .when(true, "CREATE (n)", "", &Params::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ProcedureError::Store(StoreError::AuthorizationViolation(_))
    ));

    assert!(procedures
        .do_when(true, "CREATE (n)", "", &Params::new())
        .is_ok());
}

#[test]
fn test_case_runs_first_true_condition() {
    init_logging();
    let graph = MemoryGraph::new();
    let procedures = CypherProcedures::new(&graph);
    let conditionals = vec![
        Value::Boolean(false),
        Value::String("RETURN 'skipped' AS q".to_string()),
        Value::Boolean(true),
        Value::String("RETURN 'chosen' AS q".to_string()),
    ];

    let rows = procedures
        .case(&conditionals, "RETURN 'else' AS q", &Params::new())
        .unwrap();

    assert_eq!(rows[0].get("q"), Some(&Value::String("chosen".to_string())));
    assert_eq!(
        graph.executed_statements(),
        vec!["RETURN 'chosen' AS q".to_string()]
    );
}

#[test]
fn test_case_without_true_condition_runs_else() {
    init_logging();
    let graph = MemoryGraph::new();
    let procedures = CypherProcedures::new(&graph);
    let conditionals = vec![
        Value::Boolean(false),
        Value::String("RETURN 'skipped' AS q".to_string()),
    ];

    let rows = procedures
        .case(&conditionals, "RETURN 'else' AS q", &Params::new())
        .unwrap();
    assert_eq!(rows[0].get("q"), Some(&Value::String("else".to_string())));

    let rows = procedures.case(&conditionals, "", &Params::new()).unwrap();
    assert_eq!(rows, vec![Row::new()]);
}

#[test]
fn test_case_rejects_odd_sized_conditionals_before_running() {
    init_logging();
    let graph = MemoryGraph::new();
    let procedures = CypherProcedures::new(&graph);
    let conditionals = vec![
        Value::Boolean(true),
        Value::String("RETURN 1".to_string()),
        Value::Boolean(true),
    ];

    let err = procedures
        .case(&conditionals, "RETURN 2", &Params::new())
        .unwrap_err();

    match err {
        ProcedureError::InvalidArgument(message) => {
            assert!(message.contains("even-sized"));
        }
        other => panic!("expected invalid argument, got {}", other),
    }
    assert!(graph.executed_statements().is_empty());
}

#[test]
fn test_do_case_grants_write_access() {
    init_logging();
    let graph = MemoryGraph::new();
    graph.register(
        "CREATE (n)",
        CannedStatement::returning(vec![Row::single("done", Value::Boolean(true))])
            .requiring(AccessMode::Write),
    );
    let procedures = CypherProcedures::new(&graph);
    let conditionals = vec![
        Value::Boolean(true),
        Value::String("CREATE (n)".to_string()),
    ];

    let err = procedures
        .case(&conditionals, "", &Params::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ProcedureError::Store(StoreError::AuthorizationViolation(_))
    ));

    let rows = procedures
        .do_case(&conditionals, "", &Params::new())
        .unwrap();
    assert_eq!(rows[0].get("done"), Some(&Value::Boolean(true)));
}
