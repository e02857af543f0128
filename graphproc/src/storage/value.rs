// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Property value model shared by the procedure surfaces and the store contract
//!
//! This module provides the value types moving between procedures and the
//! graph store:
//! - `Value` - closed union of storable values plus entity references
//! - `ArrayValue` - homogeneous typed arrays with per-element validation
//! - Numeric tower helpers used by the arithmetic mutations

use std::fmt;

use serde::{Deserialize, Serialize};

/// A property value as accepted and produced by the graph store.
///
/// Entity references (`Node`, `Relationship`) are not storable as property
/// values; they exist so dynamic procedure arguments and parameter maps can
/// carry entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(ArrayValue),
    /// Reference to a stored node, by id.
    Node(u64),
    /// Reference to a stored relationship, by id.
    Relationship(u64),
}

impl Value {
    /// Type name used in error messages, matching the store's type system.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Array(_) => "LIST",
            Value::Node(_) => "NODE",
            Value::Relationship(_) => "RELATIONSHIP",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Numeric sum with tower promotion: two integers stay integral (64-bit
    /// wrapping, matching the store's integer arithmetic), any float operand
    /// promotes the result to a float. `None` when either side is non-numeric.
    pub fn numeric_add(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(Value::Integer(a.wrapping_add(*b))),
            _ => Some(Value::Float(self.as_f64()? + other.as_f64()?)),
        }
    }

    /// Numeric difference with the same promotion rules as [`Value::numeric_add`].
    pub fn numeric_subtract(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(Value::Integer(a.wrapping_sub(*b))),
            _ => Some(Value::Float(self.as_f64()? - other.as_f64()?)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            // Keeps a trailing ".0" on integral floats so the rendering
            // round-trips as a FLOAT.
            Value::Float(v) => write!(f, "{:?}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(array) => write!(f, "{}", array),
            Value::Node(id) => write!(f, "node({})", id),
            Value::Relationship(id) => write!(f, "relationship({})", id),
        }
    }
}

/// A homogeneous typed array property value.
///
/// The store only persists arrays whose elements share one scalar type;
/// rebuilding an array from loose values validates every element against the
/// array's element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrayValue {
    Boolean(Vec<bool>),
    Integer(Vec<i64>),
    Float(Vec<f64>),
    String(Vec<String>),
}

/// Raised when a loose value cannot join a homogeneous array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchedElement {
    /// Element type of the array being built.
    pub expected: &'static str,
    /// Type name of the rejected value.
    pub found: &'static str,
}

impl ArrayValue {
    pub fn len(&self) -> usize {
        match self {
            ArrayValue::Boolean(v) => v.len(),
            ArrayValue::Integer(v) => v.len(),
            ArrayValue::Float(v) => v.len(),
            ArrayValue::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type_name(&self) -> &'static str {
        match self {
            ArrayValue::Boolean(_) => "BOOLEAN",
            ArrayValue::Integer(_) => "INTEGER",
            ArrayValue::Float(_) => "FLOAT",
            ArrayValue::String(_) => "STRING",
        }
    }

    /// Wraps a single scalar as a one-element array, picking the element type
    /// from the scalar. Entity references, nulls and nested arrays are not
    /// storable as array elements.
    pub fn from_scalar(value: &Value) -> Result<ArrayValue, MismatchedElement> {
        match value {
            Value::Boolean(b) => Ok(ArrayValue::Boolean(vec![*b])),
            Value::Integer(i) => Ok(ArrayValue::Integer(vec![*i])),
            Value::Float(f) => Ok(ArrayValue::Float(vec![*f])),
            Value::String(s) => Ok(ArrayValue::String(vec![s.clone()])),
            other => Err(MismatchedElement {
                expected: "BOOLEAN, INTEGER, FLOAT or STRING",
                found: other.type_name(),
            }),
        }
    }

    /// Returns a copy with `value` inserted at `index`. The caller is
    /// responsible for clamping `index` to `0..=len`. The inserted value must
    /// match this array's element type exactly; integers do not coerce into
    /// float arrays or vice versa.
    pub fn insert_value(&self, index: usize, value: &Value) -> Result<ArrayValue, MismatchedElement> {
        let mismatch = |found: &Value| MismatchedElement {
            expected: self.element_type_name(),
            found: found.type_name(),
        };
        match (self, value) {
            (ArrayValue::Boolean(v), Value::Boolean(b)) => {
                let mut v = v.clone();
                v.insert(index, *b);
                Ok(ArrayValue::Boolean(v))
            }
            (ArrayValue::Integer(v), Value::Integer(i)) => {
                let mut v = v.clone();
                v.insert(index, *i);
                Ok(ArrayValue::Integer(v))
            }
            (ArrayValue::Float(v), Value::Float(f)) => {
                let mut v = v.clone();
                v.insert(index, *f);
                Ok(ArrayValue::Float(v))
            }
            (ArrayValue::String(v), Value::String(s)) => {
                let mut v = v.clone();
                v.insert(index, s.clone());
                Ok(ArrayValue::String(v))
            }
            (_, other) => Err(mismatch(other)),
        }
    }

    /// Returns a copy with the element at `index` removed. The caller is
    /// responsible for bounds-checking `index < len`; the element type is
    /// preserved even when the result is empty.
    pub fn remove_at(&self, index: usize) -> ArrayValue {
        match self {
            ArrayValue::Boolean(v) => {
                let mut v = v.clone();
                v.remove(index);
                ArrayValue::Boolean(v)
            }
            ArrayValue::Integer(v) => {
                let mut v = v.clone();
                v.remove(index);
                ArrayValue::Integer(v)
            }
            ArrayValue::Float(v) => {
                let mut v = v.clone();
                v.remove(index);
                ArrayValue::Float(v)
            }
            ArrayValue::String(v) => {
                let mut v = v.clone();
                v.remove(index);
                ArrayValue::String(v)
            }
        }
    }

    /// Materializes the elements as loose values.
    pub fn values(&self) -> Vec<Value> {
        match self {
            ArrayValue::Boolean(v) => v.iter().map(|b| Value::Boolean(*b)).collect(),
            ArrayValue::Integer(v) => v.iter().map(|i| Value::Integer(*i)).collect(),
            ArrayValue::Float(v) => v.iter().map(|f| Value::Float(*f)).collect(),
            ArrayValue::String(v) => v.iter().map(|s| Value::String(s.clone())).collect(),
        }
    }
}

impl fmt::Display for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_addition_stays_integral() {
        let sum = Value::Integer(5).numeric_add(&Value::Integer(3));
        assert_eq!(sum, Some(Value::Integer(8)));
    }

    #[test]
    fn test_float_operand_promotes_sum() {
        let sum = Value::Integer(5).numeric_add(&Value::Float(0.5));
        assert_eq!(sum, Some(Value::Float(5.5)));

        let sum = Value::Float(1.5).numeric_add(&Value::Integer(2));
        assert_eq!(sum, Some(Value::Float(3.5)));
    }

    #[test]
    fn test_non_numeric_operand_rejected() {
        assert_eq!(Value::String("a".to_string()).numeric_add(&Value::Integer(1)), None);
        assert_eq!(Value::Integer(1).numeric_subtract(&Value::Null), None);
    }

    #[test]
    fn test_subtraction_promotion() {
        assert_eq!(
            Value::Integer(10).numeric_subtract(&Value::Integer(4)),
            Some(Value::Integer(6))
        );
        assert_eq!(
            Value::Integer(10).numeric_subtract(&Value::Float(0.5)),
            Some(Value::Float(9.5))
        );
    }

    #[test]
    fn test_display_rendering() {
        assert_eq!(Value::Integer(5).to_string(), "5");
        assert_eq!(Value::Float(5.0).to_string(), "5.0");
        assert_eq!(Value::String("graph".to_string()).to_string(), "graph");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(
            Value::Array(ArrayValue::Integer(vec![1, 2])).to_string(),
            "[1, 2]"
        );
    }

    #[test]
    fn test_scalar_wrap_picks_element_type() {
        let array = ArrayValue::from_scalar(&Value::Integer(7)).unwrap();
        assert_eq!(array, ArrayValue::Integer(vec![7]));
        assert_eq!(array.element_type_name(), "INTEGER");
    }

    #[test]
    fn test_scalar_wrap_rejects_unstorable_values() {
        assert!(ArrayValue::from_scalar(&Value::Null).is_err());
        assert!(ArrayValue::from_scalar(&Value::Node(1)).is_err());
        assert!(ArrayValue::from_scalar(&Value::Array(ArrayValue::Integer(vec![]))).is_err());
    }

    #[test]
    fn test_insert_preserves_homogeneity() {
        let array = ArrayValue::Integer(vec![1, 2]);
        let inserted = array.insert_value(1, &Value::Integer(9)).unwrap();
        assert_eq!(inserted, ArrayValue::Integer(vec![1, 9, 2]));

        let err = array.insert_value(0, &Value::String("x".to_string())).unwrap_err();
        assert_eq!(err.expected, "INTEGER");
        assert_eq!(err.found, "STRING");
    }

    #[test]
    fn test_integers_do_not_coerce_into_float_arrays() {
        let array = ArrayValue::Float(vec![1.0]);
        assert!(array.insert_value(0, &Value::Integer(2)).is_err());
    }

    #[test]
    fn test_remove_keeps_element_type_when_emptied() {
        let array = ArrayValue::String(vec!["only".to_string()]);
        let removed = array.remove_at(0);
        assert_eq!(removed, ArrayValue::String(vec![]));
        assert_eq!(removed.element_type_name(), "STRING");
    }

    #[test]
    fn test_serde_round_trip() {
        let value = Value::Array(ArrayValue::Float(vec![1.5, 2.5]));
        let encoded = serde_json::to_string(&value).unwrap();
        let decoded: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, value);
    }
}
