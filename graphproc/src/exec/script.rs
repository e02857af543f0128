// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Multi-statement script splitting
//!
//! Scripts split on a semicolon immediately followed by an end-of-line. The
//! boundary is newline-anchored, not syntax-aware: statements may freely
//! contain other semicolons. Leading shell-control markers emitted by
//! script-producing tools (`begin` / `commit` / `rollback`, with or without
//! the client-shell colon prefix) are meaningless to single-statement
//! execution and get stripped before dispatch.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref STATEMENT_BOUNDARY: Regex = Regex::new(r";\r?\n").expect("valid boundary pattern");
    static ref SHELL_CONTROL: Regex =
        Regex::new(r"(?i)^:?\b(?:begin|commit|rollback)\b").expect("valid marker pattern");
}

/// Markers stack (":begin\n:begin\n..."), and each pass removes one, so the
/// fixed-point loop needs a cap to stay bounded on pathological inputs.
const SHELL_STRIP_LIMIT: usize = 32;

/// Splits a script into executable statements: split on the statement
/// boundary, strip leading shell-control markers, discard blanks. A trailing
/// statement without a final newline keeps its semicolon; stores tolerate it.
pub fn split_statements(script: &str) -> Vec<String> {
    STATEMENT_BOUNDARY
        .split(script)
        .map(strip_shell_control)
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Trims a statement and removes leading shell-control markers until none
/// remain (bounded by [`SHELL_STRIP_LIMIT`]). Markers only match at the very
/// start, word-bounded, so identifiers like `beginning` and markers embedded
/// mid-statement survive untouched.
pub fn strip_shell_control(statement: &str) -> String {
    let mut current = statement.trim().to_string();
    let mut passes = 0;
    while passes < SHELL_STRIP_LIMIT && SHELL_CONTROL.is_match(&current) {
        current = SHELL_CONTROL.replace(&current, "").trim().to_string();
        passes += 1;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_semicolon_newline() {
        let statements = split_statements("RETURN 1;\nRETURN 2;\n");
        assert_eq!(statements, vec!["RETURN 1", "RETURN 2"]);
    }

    #[test]
    fn test_split_handles_crlf() {
        let statements = split_statements("RETURN 1;\r\nRETURN 2;\r\n");
        assert_eq!(statements, vec!["RETURN 1", "RETURN 2"]);
    }

    #[test]
    fn test_semicolon_without_newline_is_not_a_boundary() {
        let statements = split_statements("RETURN ';'; RETURN 2;\n");
        assert_eq!(statements, vec!["RETURN ';'; RETURN 2"]);
    }

    #[test]
    fn test_trailing_statement_keeps_semicolon() {
        let statements = split_statements("RETURN 1;\nRETURN 2;");
        assert_eq!(statements, vec!["RETURN 1", "RETURN 2;"]);
    }

    #[test]
    fn test_blank_script_yields_nothing() {
        assert!(split_statements("").is_empty());
        assert!(split_statements("   \n\t").is_empty());
        assert!(split_statements(";\n;\n;\n").is_empty());
    }

    #[test]
    fn test_strip_single_marker() {
        assert_eq!(strip_shell_control("begin MATCH (n) RETURN n"), "MATCH (n) RETURN n");
        assert_eq!(strip_shell_control(":commit"), "");
        assert_eq!(strip_shell_control("ROLLBACK"), "");
    }

    #[test]
    fn test_strip_stacked_markers() {
        assert_eq!(strip_shell_control(":begin\n:begin\nRETURN 1"), "RETURN 1");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let once = strip_shell_control(":begin\ncommit\nRETURN 1");
        let twice = strip_shell_control(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "RETURN 1");
    }

    #[test]
    fn test_marker_only_script_becomes_empty() {
        assert!(split_statements(":begin\n:commit").is_empty());
    }

    #[test]
    fn test_word_boundary_protects_identifiers() {
        assert_eq!(strip_shell_control("beginning RETURN 1"), "beginning RETURN 1");
        assert_eq!(strip_shell_control("committed"), "committed");
    }

    #[test]
    fn test_embedded_marker_survives() {
        assert_eq!(
            strip_shell_control("RETURN 'begin' AS word"),
            "RETURN 'begin' AS word"
        );
    }

    #[test]
    fn test_strip_limit_bounds_pathological_input() {
        let stacked = ":begin\n".repeat(100) + "RETURN 1";
        let stripped = strip_shell_control(&stacked);
        // The cap leaves the remainder for the store to reject.
        assert!(stripped.contains(":begin"));
    }
}
