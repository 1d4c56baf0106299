//! Core identifier types for things in the remote graph.
//!
//! Every resource, literal, predicate and statement the store creates is
//! identified by a [`ThingId`]. Statements point at their object through an
//! [`ObjectRef`], which carries the `_class` tag the graph API expects.

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque, non-empty identifier assigned by the graph store.
///
/// The remote API is free to hand out numeric or string ids; both are kept
/// verbatim as text so callers never depend on the store's numbering scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ThingId(String);

impl ThingId {
    /// Create a `ThingId` from raw text.
    ///
    /// Returns `None` if `raw` is empty.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    /// The identifier as the store reported it.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ThingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        let raw = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        ThingId::new(raw).ok_or_else(|| serde::de::Error::custom("empty thing id"))
    }
}

/// Kind of node a statement object refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClass {
    /// A scalar leaf value.
    Literal,
    /// A labeled, non-literal node.
    Resource,
}

impl std::fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectClass::Literal => write!(f, "literal"),
            ObjectClass::Resource => write!(f, "resource"),
        }
    }
}

/// The object side of a statement, as sent to `POST /statements/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: ThingId,
    #[serde(rename = "_class")]
    pub class: ObjectClass,
}

impl ObjectRef {
    /// Reference a literal node.
    pub fn literal(id: ThingId) -> Self {
        Self {
            id,
            class: ObjectClass::Literal,
        }
    }

    /// Reference a resource node.
    pub fn resource(id: ThingId) -> Self {
        Self {
            id,
            class: ObjectClass::Resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_none() {
        assert!(ThingId::new("").is_none());
        assert_eq!(ThingId::new("R1").unwrap().as_str(), "R1");
    }

    #[test]
    fn deserializes_numeric_and_string_ids() {
        let n: ThingId = serde_json::from_str("42").unwrap();
        assert_eq!(n.as_str(), "42");

        let s: ThingId = serde_json::from_str("\"R42\"").unwrap();
        assert_eq!(s.as_str(), "R42");

        assert!(serde_json::from_str::<ThingId>("\"\"").is_err());
    }

    #[test]
    fn object_ref_wire_shape() {
        let obj = ObjectRef::literal(ThingId::new("L7").unwrap());
        let json = serde_json::to_value(&obj).unwrap();
        assert_eq!(json, serde_json::json!({"id": "L7", "_class": "literal"}));

        let obj = ObjectRef::resource(ThingId::new("R3").unwrap());
        assert_eq!(serde_json::to_value(&obj).unwrap()["_class"], "resource");
    }

    #[test]
    fn object_class_display() {
        assert_eq!(ObjectClass::Literal.to_string(), "literal");
        assert_eq!(ObjectClass::Resource.to_string(), "resource");
    }
}
