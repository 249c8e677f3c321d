// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{BridgeError, Result};
use crate::observability::messages::interface::{MetadataPairSkipped, MetadataValueSkipped};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// A single metadata value. The variant is chosen by the JSON value's type.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<f64>),
}

impl MetaValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(MetaValue::String(s.clone())),
            Value::Bool(b) => Some(MetaValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(MetaValue::Integer(i)),
                None => n.as_f64().map(MetaValue::Float),
            },
            Value::Array(items) => items
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<f64>>>()
                .map(MetaValue::Array),
            Value::Null | Value::Object(_) => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            MetaValue::String(s) => Value::String(s.clone()),
            MetaValue::Integer(i) => Value::from(*i),
            MetaValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            MetaValue::Bool(b) => Value::Bool(*b),
            MetaValue::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|f| Number::from_f64(*f).map_or(Value::Null, Value::Number))
                    .collect(),
            ),
        }
    }
}

/// String-keyed side-channel metadata attached to an image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaDataDictionary {
    entries: BTreeMap<String, MetaValue>,
}

impl MetaDataDictionary {
    /// Convert a descriptor's `metadata` section.
    ///
    /// Accepts either a JSON object or an array of `[key, value]` pairs.
    /// Entries whose value has no dictionary representation are skipped.
    pub fn from_json(metadata: &Value) -> Result<Self> {
        let mut dictionary = Self::default();
        match metadata {
            Value::Object(map) => {
                for (key, value) in map {
                    dictionary.insert_json(key, value);
                }
            }
            Value::Array(pairs) => {
                for pair in pairs {
                    match pair.as_array().map(Vec::as_slice) {
                        Some([Value::String(key), value]) => dictionary.insert_json(key, value),
                        _ => tracing::warn!("{}", MetadataPairSkipped { entry: pair }),
                    }
                }
            }
            other => {
                return Err(BridgeError::malformed(format!(
                    "metadata must be an object or an array of pairs, found {}",
                    other
                )))
            }
        }
        Ok(dictionary)
    }

    fn insert_json(&mut self, key: &str, value: &Value) {
        match MetaValue::from_json(value) {
            Some(meta) => {
                self.entries.insert(key.to_string(), meta);
            }
            None => tracing::warn!("{}", MetadataValueSkipped { key, value }),
        }
    }

    /// Serialise as an array of `[key, value]` pairs.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|(key, value)| Value::Array(vec![Value::String(key.clone()), value.to_json()]))
                .collect(),
        )
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.entries.iter()
    }
}
