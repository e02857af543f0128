// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Entity references and shared parameter types

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::Value;

/// Parameter map handed to the store with every statement execution.
pub type Params = HashMap<String, Value>;

/// Reference to an addressable graph entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Node(u64),
    Relationship(u64),
}

impl EntityRef {
    pub fn id(&self) -> u64 {
        match self {
            EntityRef::Node(id) | EntityRef::Relationship(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EntityRef::Node(_) => "node",
            EntityRef::Relationship(_) => "relationship",
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.id())
    }
}

/// Error from converting a dynamic value into an entity reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotAnEntity {
    /// Type name of the rejected value.
    pub found: &'static str,
}

impl TryFrom<&Value> for EntityRef {
    type Error = NotAnEntity;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Node(id) => Ok(EntityRef::Node(*id)),
            Value::Relationship(id) => Ok(EntityRef::Relationship(*id)),
            other => Err(NotAnEntity {
                found: other.type_name(),
            }),
        }
    }
}

impl From<EntityRef> for Value {
    fn from(entity: EntityRef) -> Self {
        match entity {
            EntityRef::Node(id) => Value::Node(id),
            EntityRef::Relationship(id) => Value::Relationship(id),
        }
    }
}
