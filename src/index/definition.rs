//! Compound index definitions
//!
//! An index definition is a name plus an ordered list of unique
//! `(field, direction)` keys. Definitions are immutable after
//! construction and serialize as `{"name": ..., "key": {"a": 1, "b": -1}}`.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{DefinitionError, DefinitionResult};
use crate::field::{Direction, FieldRef};

/// CRC32 of the canonical key pattern, used to deduplicate definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionHash(u32);

impl DefinitionHash {
    /// Hashes the canonical form `field:1,field:-1`
    pub fn of(fields: &[FieldRef]) -> Self {
        let mut hasher = crc32fast::Hasher::new();
        for (i, key) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(b",");
            }
            hasher.update(key.to_string().as_bytes());
        }
        Self(hasher.finalize())
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DefinitionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crc32:{:08x}", self.0)
    }
}

/// Immutable compound index definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DefinitionRepr", into = "DefinitionRepr")]
pub struct IndexDefinition {
    name: String,
    fields: Vec<FieldRef>,
    hash: DefinitionHash,
}

impl IndexDefinition {
    /// Builds a definition, rejecting empty names and duplicate fields.
    ///
    /// A definition with no fields is valid here; the catalog refuses to
    /// register one.
    pub fn new(name: impl Into<String>, fields: Vec<FieldRef>) -> DefinitionResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for key in &fields {
            if key.field.is_empty() {
                return Err(DefinitionError::EmptyFieldName { index: name });
            }
            if !seen.insert(key.field.as_str()) {
                return Err(DefinitionError::DuplicateField {
                    index: name,
                    field: key.field.clone(),
                });
            }
        }

        let hash = DefinitionHash::of(&fields);
        Ok(Self { name, fields, hash })
    }

    /// Builds a definition named after its key, e.g. `a_1_b_-1`
    pub fn with_generated_name(fields: Vec<FieldRef>) -> DefinitionResult<Self> {
        let name = generated_name(&fields);
        Self::new(name, fields)
    }

    /// Parses a key-pattern object such as `{"a": 1, "b": -1}`.
    ///
    /// Key order is taken from the document.
    pub fn from_key_pattern(name: impl Into<String>, pattern: &Value) -> DefinitionResult<Self> {
        let doc = pattern.as_object().ok_or_else(|| {
            DefinitionError::InvalidKeyPattern("key pattern must be an object".into())
        })?;
        Self::new(name, parse_key_pattern(doc)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldRef] {
        &self.fields
    }

    pub fn hash(&self) -> DefinitionHash {
        self.hash
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True if both definitions index the same field sequence, regardless of name
    pub fn same_key(&self, other: &IndexDefinition) -> bool {
        self.hash == other.hash && self.fields == other.fields
    }

    /// Renders the key as a key-pattern object
    pub fn key_pattern(&self) -> Value {
        let mut doc = Map::with_capacity(self.fields.len());
        for key in &self.fields {
            doc.insert(key.field.clone(), Value::from(key.direction.key_value()));
        }
        Value::Object(doc)
    }
}

impl fmt::Display for IndexDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.key_pattern())
    }
}

/// Default index name: `field_dir` pairs joined by `_`
pub fn generated_name(fields: &[FieldRef]) -> String {
    fields
        .iter()
        .map(|k| format!("{}_{}", k.field, k.direction.key_value()))
        .collect::<Vec<_>>()
        .join("_")
}

fn parse_key_pattern(doc: &Map<String, Value>) -> DefinitionResult<Vec<FieldRef>> {
    doc.iter()
        .map(|(field, value)| {
            value
                .as_i64()
                .and_then(Direction::from_key_value)
                .map(|direction| FieldRef::new(field.clone(), direction))
                .ok_or_else(|| {
                    DefinitionError::InvalidKeyPattern(format!(
                        "direction for '{}' must be 1 or -1",
                        field
                    ))
                })
        })
        .collect()
}

/// Wire form of a definition
#[derive(Serialize, Deserialize)]
struct DefinitionRepr {
    name: String,
    key: Map<String, Value>,
}

impl TryFrom<DefinitionRepr> for IndexDefinition {
    type Error = DefinitionError;

    fn try_from(repr: DefinitionRepr) -> DefinitionResult<Self> {
        let fields = parse_key_pattern(&repr.key)?;
        IndexDefinition::new(repr.name, fields)
    }
}

impl From<IndexDefinition> for DefinitionRepr {
    fn from(def: IndexDefinition) -> Self {
        let key = match def.key_pattern() {
            Value::Object(doc) => doc,
            _ => Map::new(),
        };
        DefinitionRepr {
            name: def.name,
            key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario_b() -> IndexDefinition {
        IndexDefinition::new(
            "esr",
            vec![
                FieldRef::asc("transaction_type"),
                FieldRef::asc("transaction_date"),
                FieldRef::asc("amount"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = IndexDefinition::new("bad", vec![FieldRef::asc("a"), FieldRef::desc("a")])
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateField {
                index: "bad".into(),
                field: "a".into()
            }
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(
            IndexDefinition::new("", vec![FieldRef::asc("a")]).unwrap_err(),
            DefinitionError::EmptyName
        );
    }

    #[test]
    fn test_empty_definition_allowed() {
        let def = IndexDefinition::new("none", Vec::new()).unwrap();
        assert!(def.is_empty());
        assert_eq!(def.key_pattern(), json!({}));
    }

    #[test]
    fn test_generated_name() {
        let def =
            IndexDefinition::with_generated_name(vec![FieldRef::asc("a.b"), FieldRef::desc("c")])
                .unwrap();
        assert_eq!(def.name(), "a.b_1_c_-1");
    }

    #[test]
    fn test_hash_depends_on_order_and_direction() {
        let a = IndexDefinition::new("x", vec![FieldRef::asc("a"), FieldRef::asc("b")]).unwrap();
        let b = IndexDefinition::new("y", vec![FieldRef::asc("b"), FieldRef::asc("a")]).unwrap();
        let c = IndexDefinition::new("z", vec![FieldRef::asc("a"), FieldRef::desc("b")]).unwrap();
        let d = IndexDefinition::new("w", vec![FieldRef::asc("a"), FieldRef::asc("b")]).unwrap();

        assert_ne!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
        assert_eq!(a.hash(), d.hash());
        assert!(a.same_key(&d));
        assert!(!a.same_key(&b));
        assert!(a.hash().to_string().starts_with("crc32:"));
    }

    #[test]
    fn test_key_pattern_preserves_order() {
        let def = IndexDefinition::from_key_pattern(
            "p",
            &json!({"transaction_type": 1, "transaction_date": -1, "amount": 1}),
        )
        .unwrap();
        assert_eq!(
            def.fields(),
            &[
                FieldRef::asc("transaction_type"),
                FieldRef::desc("transaction_date"),
                FieldRef::asc("amount"),
            ]
        );
    }

    #[test]
    fn test_key_pattern_rejects_bad_direction() {
        let err = IndexDefinition::from_key_pattern("p", &json!({"a": "text"})).unwrap_err();
        assert_eq!(err.code(), "ESR_INVALID_KEY_PATTERN");

        let err = IndexDefinition::from_key_pattern("p", &json!([1])).unwrap_err();
        assert_eq!(err.code(), "ESR_INVALID_KEY_PATTERN");
    }

    #[test]
    fn test_serde_wire_form() {
        let def = scenario_b();
        let encoded = serde_json::to_value(&def).unwrap();
        assert_eq!(
            encoded,
            json!({
                "name": "esr",
                "key": {"transaction_type": 1, "transaction_date": 1, "amount": 1}
            })
        );

        let decoded: IndexDefinition = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, def);
    }

    #[test]
    fn test_deserialize_validates() {
        let result: Result<IndexDefinition, _> =
            serde_json::from_str(r#"{"name": "", "key": {"a": 1}}"#);
        assert!(result.is_err());
    }
}
