// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Script execution pipeline
//!
//! This module provides the machinery behind the statement-execution
//! procedures:
//! - Script splitting and shell-control stripping (`script`)
//! - Row records and the synthetic statistics row (`result`)
//! - The lazy batch runner (`runner`)
//! - The procedure failure taxonomy (`error`)

pub mod error;
pub mod result;
pub mod runner;
pub mod script;

pub use error::{ProcedureError, ProcedureResult};
pub use result::{RowResult, STATISTICS_ROW_INDEX};
pub use runner::BatchRows;
pub use script::{split_statements, strip_shell_control};
