// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Procedure surfaces exposed to hosting engines
//!
//! One module per procedure family, mirroring the namespaces callers know:
//! - `cypher_procedures` - dynamic statement execution and conditional
//!   dispatch
//! - `atomic_procedures` - lock-and-retry property mutations

pub mod atomic_procedures;
pub mod cypher_procedures;

pub use atomic_procedures::{AtomicProcedures, AtomicResult, DEFAULT_RETRY_BUDGET};
pub use cypher_procedures::{CypherProcedures, RunManyConfig};
