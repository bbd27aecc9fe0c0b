//! Generic untyped resource records
//!
//! A [`ResourceRecord`] is what the cluster backend hands back for any
//! resource kind: the identity fields every object carries plus the rest of
//! the body as JSON. Typed entities (MRDs, activation policies) are decoded
//! from records once, at ingestion.

use serde::{Deserialize, Serialize};

/// Reference from an object to one of its owners
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    pub uid: String,
}

/// Generic resource record returned by list calls
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// `metadata.name`
    pub name: String,
    /// `metadata.uid`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// `metadata.ownerReferences`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
    /// Everything outside `metadata` (`spec`, `status`, ...)
    #[serde(default)]
    pub body: serde_json::Value,
}

impl ResourceRecord {
    /// Create a record with a name and UID and an empty body
    pub fn new(name: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: Some(uid.into()),
            owner_references: Vec::new(),
            body: serde_json::Value::Null,
        }
    }

    /// Replace the body
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = body;
        self
    }

    /// Add an owner reference
    pub fn with_owner(mut self, owner: OwnerReference) -> Self {
        self.owner_references.push(owner);
        self
    }

    /// Look up a top-level body field (`spec`, `status`, ...)
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.body.get(key)
    }

    /// Whether any owner reference carries the given UID
    ///
    /// An empty UID never matches.
    pub fn is_owned_by(&self, uid: &str) -> bool {
        !uid.is_empty() && self.owner_references.iter().any(|o| o.uid == uid)
    }
}
