//! Rule document model for the compact schema.
//!
//! A document is `{ "rules": [...], "testing": [...] }`. Conditions are
//! shape-polymorphic JSON, so `Condition` carries a hand-written
//! deserializer that recognizes each shape explicitly instead of relying
//! on untagged fallthrough.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use shared_types::{AlarmType, Place, TestingAction};

/// Parsed contents of one jurisdiction's configuration. Immutable once
/// loaded; the loader hands out an owned value, never a shared cache entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleDocument {
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub testing: Vec<TestingAction>,
}

/// One rule: an optional gate condition, a priority, and what it
/// recommends when it applies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub when: Option<Condition>,
    #[serde(default)]
    pub recommend: Vec<RecommendationSpec>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// A single alarm placement recommendation inside a rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecommendationSpec {
    #[serde(rename = "type")]
    pub alarm: AlarmType,
    pub place: Place,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub citation: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// The condition DSL. Leaf forms are `always` and the field→value maps;
/// `all`/`any`/`not` combine sub-conditions.
///
/// `Opaque` is the permissive fallback: a condition object whose shape is
/// not recognized. It always matches, preserving compatibility with
/// existing rule documents, and is logged at decode time so authoring
/// typos do not go completely silent.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Always(bool),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
    /// Every listed field must equal the listed value exactly.
    Eq(BTreeMap<String, Value>),
    Gt(BTreeMap<String, f64>),
    Gte(BTreeMap<String, f64>),
    Lt(BTreeMap<String, f64>),
    Lte(BTreeMap<String, f64>),
    Opaque,
}

impl Condition {
    /// Decode a condition from its JSON shape. A bare boolean is accepted
    /// as shorthand for `{"always": ...}`.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(Condition::Always(*b)),
            Value::Object(map) => {
                if let Some(flag) = map.get("always") {
                    return match flag.as_bool() {
                        Some(b) => Ok(Condition::Always(b)),
                        None => Err(format!("\"always\" expects a boolean, got {flag}")),
                    };
                }
                if let Some(subs) = map.get("all") {
                    return Ok(Condition::All(Self::sub_conditions("all", subs)?));
                }
                if let Some(subs) = map.get("any") {
                    return Ok(Condition::Any(Self::sub_conditions("any", subs)?));
                }
                if let Some(sub) = map.get("not") {
                    return Ok(Condition::Not(Box::new(Self::from_value(sub)?)));
                }
                if let Some(fields) = map.get("eq") {
                    return Ok(Condition::Eq(Self::eq_fields(fields)?));
                }
                type CmpCtor = fn(BTreeMap<String, f64>) -> Condition;
                for (key, build) in [
                    ("gt", Condition::Gt as CmpCtor),
                    ("gte", Condition::Gte as CmpCtor),
                    ("lt", Condition::Lt as CmpCtor),
                    ("lte", Condition::Lte as CmpCtor),
                ] {
                    if let Some(fields) = map.get(key) {
                        return Ok(build(Self::numeric_fields(key, fields)?));
                    }
                }
                tracing::warn!(
                    shape = %value,
                    "condition shape not recognized; treating as always-true"
                );
                Ok(Condition::Opaque)
            }
            other => Err(format!("condition must be an object or boolean, got {other}")),
        }
    }

    fn sub_conditions(key: &str, value: &Value) -> Result<Vec<Condition>, String> {
        let list = value
            .as_array()
            .ok_or_else(|| format!("\"{key}\" expects an array of conditions"))?;
        list.iter().map(Self::from_value).collect()
    }

    fn eq_fields(value: &Value) -> Result<BTreeMap<String, Value>, String> {
        let map = value
            .as_object()
            .ok_or_else(|| "\"eq\" expects a field→value map".to_string())?;
        Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn numeric_fields(key: &str, value: &Value) -> Result<BTreeMap<String, f64>, String> {
        let map = value
            .as_object()
            .ok_or_else(|| format!("\"{key}\" expects a field→number map"))?;
        map.iter()
            .map(|(field, bound)| {
                bound
                    .as_f64()
                    .map(|n| (field.clone(), n))
                    .ok_or_else(|| format!("\"{key}\".{field} expects a number, got {bound}"))
            })
            .collect()
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Condition::from_value(&value).map_err(serde::de::Error::custom)
    }
}
