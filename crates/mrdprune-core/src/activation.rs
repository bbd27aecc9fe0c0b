//! Activation policies and the activation index
//!
//! A ManagedResourceActivationPolicy (MRAP) lists the MRDs Crossplane has
//! activated in `status.activated`. The [`ActivationIndex`] is the union of
//! those lists across every policy in the cluster. An MRD in the index is
//! kept even when nothing uses it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{CoreError, Result};
use crate::record::ResourceRecord;

const KIND: &str = "ManagedResourceActivationPolicy";

/// A decoded ManagedResourceActivationPolicy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManagedResourceActivationPolicy {
    pub name: String,
    /// `spec.activate`: name patterns requested by the operator
    pub activate: Vec<String>,
    /// `status.activated`: MRD names actually activated
    pub activated: Vec<String>,
}

impl ManagedResourceActivationPolicy {
    /// Decode a generic record into a typed policy
    ///
    /// A policy that has not reconciled yet (no status, or no
    /// `status.activated`) activates nothing. A field that is present but has
    /// the wrong shape is an error.
    pub fn decode(record: &ResourceRecord) -> Result<Self> {
        let name = record.name.as_str();
        if name.is_empty() {
            return Err(CoreError::missing(KIND, "<unnamed>", "metadata.name"));
        }

        let activate = string_list(record, name, "spec", "activate")?;
        let activated = string_list(record, name, "status", "activated")?;

        Ok(Self {
            name: name.to_string(),
            activate,
            activated,
        })
    }
}

fn string_list(
    record: &ResourceRecord,
    name: &str,
    section: &str,
    key: &str,
) -> Result<Vec<String>> {
    let value = match record.field(section) {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(serde_json::Value::Object(map)) => map.get(key),
        Some(other) => {
            return Err(CoreError::conversion(
                KIND,
                name,
                format!("{} must be an object, got {}", section, type_name(other)),
            ));
        }
    };

    match value {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
            CoreError::conversion(KIND, name, format!("{}.{}: {}", section, key, e))
        }),
    }
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Set of MRD names kept alive by activation policies
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivationIndex {
    names: BTreeSet<String>,
}

impl ActivationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union the activated lists of all policies
    pub fn from_policies<'a>(
        policies: impl IntoIterator<Item = &'a ManagedResourceActivationPolicy>,
    ) -> Self {
        let names = policies
            .into_iter()
            .flat_map(|p| p.activated.iter().cloned())
            .collect();
        Self { names }
    }

    pub fn is_activated(&self, mrd_name: &str) -> bool {
        self.names.contains(mrd_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Activated names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ActivationIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
