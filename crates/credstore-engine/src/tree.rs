// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The decrypted credentials document.
//!
//! A [`ConfigTree`] is a TOML table. Insertion order is preserved so a
//! document that is loaded, edited, and saved keeps its layout.

use std::fmt::Write as _;

use credstore_core::{CredentialsError, KeyPath, Result};
use toml::{Table, Value};

use crate::redact::mask_secret;

/// A nested map of string keys to scalars, arrays, or sub-tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    root: Table,
}

impl ConfigTree {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text. Empty text is an empty document.
    pub fn parse(text: &str) -> Result<Self> {
        let root = text
            .parse::<Table>()
            .map_err(|e| CredentialsError::Parse(e.message().to_string()))?;
        Ok(Self { root })
    }

    /// Parse a decrypted payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| CredentialsError::Parse("payload is not valid UTF-8".to_string()))?;
        Self::parse(text)
    }

    /// Serialize to TOML text. Parsing the result yields an equal tree with
    /// the same key order at every level.
    ///
    /// Every leaf is written as one dotted-key assignment (`db.password = "x"`)
    /// in document order, with no section headers. Empty tables are written as
    /// `key = {}`.
    pub fn to_toml(&self) -> Result<String> {
        let mut out = String::new();
        write_entries(&self.root, &mut Vec::new(), &mut out)
            .map_err(|e| CredentialsError::Parse(e.to_string()))?;
        Ok(out)
    }

    /// The underlying table.
    pub fn as_table(&self) -> &Table {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// The value at `path`, if every segment resolves.
    pub fn get(&self, path: &KeyPath) -> Option<&Value> {
        let mut table = &self.root;
        for segment in path.parents() {
            table = table.get(segment)?.as_table()?;
        }
        table.get(path.leaf())
    }

    pub fn contains(&self, path: &KeyPath) -> bool {
        self.get(path).is_some()
    }

    /// The scalar at `path` rendered as a string.
    ///
    /// Strings come back verbatim; integers, floats, booleans, and datetimes
    /// are converted with their TOML spelling. Tables and arrays are
    /// [`CredentialsError::NotAString`].
    pub fn get_string(&self, path: &KeyPath) -> Result<String> {
        let value = self.get(path).ok_or_else(|| CredentialsError::KeyNotFound {
            key: path.to_string(),
        })?;
        scalar_to_string(value).ok_or_else(|| CredentialsError::NotAString {
            key: path.to_string(),
            found: value.type_str(),
        })
    }

    /// Set `path` to `value`, creating intermediate tables as needed.
    ///
    /// An intermediate segment that currently holds a non-table value, a
    /// scalar or an array, is replaced by a table. Returns the previous value
    /// at the leaf.
    pub fn set(&mut self, path: &KeyPath, value: impl Into<Value>) -> Option<Value> {
        let mut table = &mut self.root;
        for segment in path.parents() {
            let slot = table
                .entry(segment.clone())
                .or_insert(Value::Table(Table::new()));
            if !slot.is_table() {
                *slot = Value::Table(Table::new());
            }
            table = match slot {
                Value::Table(next) => next,
                _ => unreachable!("slot was just made a table"),
            };
        }
        table.insert(path.leaf().to_string(), value.into())
    }

    /// Remove the value at `path`. Parent tables are left in place, even
    /// when they become empty. Returns the removed value.
    pub fn remove(&mut self, path: &KeyPath) -> Option<Value> {
        let mut table = &mut self.root;
        for segment in path.parents() {
            table = table.get_mut(segment)?.as_table_mut()?;
        }
        if !table.contains_key(path.leaf()) {
            return None;
        }

        // Rebuild rather than remove in place so sibling order is kept.
        let mut removed = None;
        for (key, value) in std::mem::take(table) {
            if key == path.leaf() {
                removed = Some(value);
            } else {
                table.insert(key, value);
            }
        }
        removed
    }

    /// Dotted paths of every leaf value, in document order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_leaves(&self.root, &mut Vec::new(), &mut out);
        out
    }

    /// A copy with every scalar replaced by a masked string.
    pub fn redacted(&self) -> ConfigTree {
        ConfigTree {
            root: redact_table(&self.root),
        }
    }
}

impl From<Table> for ConfigTree {
    fn from(root: Table) -> Self {
        Self { root }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(dt) => Some(dt.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

fn collect_leaves(table: &Table, prefix: &mut Vec<String>, out: &mut Vec<String>) {
    for (key, value) in table {
        prefix.push(key.clone());
        match value {
            Value::Table(child) => collect_leaves(child, prefix, out),
            _ => {
                let display = prefix
                    .iter()
                    .map(|segment| {
                        if segment.contains('.') {
                            format!("\"{segment}\"")
                        } else {
                            segment.clone()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                out.push(display);
            }
        }
        prefix.pop();
    }
}

fn write_entries(
    table: &Table,
    prefix: &mut Vec<String>,
    out: &mut String,
) -> std::fmt::Result {
    for (key, value) in table {
        prefix.push(key.clone());
        match value {
            Value::Table(child) if !child.is_empty() => write_entries(child, prefix, out)?,
            _ => writeln!(out, "{} = {value}", dotted_key(prefix))?,
        }
        prefix.pop();
    }
    Ok(())
}

/// Join segments into a TOML dotted key, quoting any that are not bare keys.
fn dotted_key(segments: &[String]) -> String {
    segments
        .iter()
        .map(|segment| {
            let bare = !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if bare {
                segment.clone()
            } else {
                Value::String(segment.clone()).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn redact_table(table: &Table) -> Table {
    table
        .iter()
        .map(|(key, value)| (key.clone(), redact_value(value)))
        .collect()
}

fn redact_value(value: &Value) -> Value {
    match value {
        Value::Table(child) => Value::Table(redact_table(child)),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        scalar => Value::String(mask_secret(&scalar_to_string(scalar).unwrap_or_default())),
    }
}
