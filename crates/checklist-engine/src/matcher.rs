//! Condition evaluation against a fact map.
//!
//! Evaluation is total: every well-formed `Condition` yields a boolean,
//! never an error. Missing facts compare unequal to any non-null value
//! and fail every ordered comparison.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::document::{Condition, Rule};

/// Flat field→value view of a property profile.
pub type FactMap = BTreeMap<String, Value>;

/// Evaluate a condition against the facts. Pure function of its inputs.
pub fn matches(condition: &Condition, facts: &FactMap) -> bool {
    match condition {
        Condition::Always(b) => *b,
        Condition::All(subs) => subs.iter().all(|c| matches(c, facts)),
        Condition::Any(subs) => subs.iter().any(|c| matches(c, facts)),
        Condition::Not(sub) => !matches(sub, facts),
        Condition::Eq(fields) => fields
            .iter()
            .all(|(field, expected)| facts.get(field).unwrap_or(&Value::Null) == expected),
        Condition::Gt(fields) => cmp_all(fields, facts, |fact, bound| fact > bound),
        Condition::Gte(fields) => cmp_all(fields, facts, |fact, bound| fact >= bound),
        Condition::Lt(fields) => cmp_all(fields, facts, |fact, bound| fact < bound),
        Condition::Lte(fields) => cmp_all(fields, facts, |fact, bound| fact <= bound),
        Condition::Opaque => true,
    }
}

/// A rule with no `when` clause applies unconditionally.
pub fn rule_applies(rule: &Rule, facts: &FactMap) -> bool {
    match &rule.when {
        Some(condition) => matches(condition, facts),
        None => true,
    }
}

fn cmp_all(fields: &BTreeMap<String, f64>, facts: &FactMap, op: fn(f64, f64) -> bool) -> bool {
    fields
        .iter()
        .all(|(field, bound)| numeric_fact(facts, field).is_some_and(|fact| op(fact, *bound)))
}

/// A fact participates in ordered comparisons only when present and
/// numeric; absence makes the comparison false.
pub(crate) fn numeric_fact(facts: &FactMap, field: &str) -> Option<f64> {
    facts.get(field).and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn facts() -> FactMap {
        FactMap::from([
            ("bedrooms".to_string(), json!(2)),
            ("floors".to_string(), json!(1)),
            ("has_fuel_appliance".to_string(), json!(true)),
            ("property_type".to_string(), json!("single_family")),
            ("year_bucket".to_string(), Value::Null),
        ])
    }

    fn cond(value: serde_json::Value) -> Condition {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_always() {
        assert!(matches(&cond(json!({"always": true})), &facts()));
        assert!(!matches(&cond(json!({"always": false})), &facts()));
    }

    #[test]
    fn test_eq_is_type_sensitive() {
        assert!(matches(
            &cond(json!({"eq": {"property_type": "single_family"}})),
            &facts()
        ));
        assert!(!matches(&cond(json!({"eq": {"bedrooms": "2"}})), &facts()));
        assert!(matches(
            &cond(json!({"eq": {"bedrooms": 2, "floors": 1}})),
            &facts()
        ));
        assert!(!matches(
            &cond(json!({"eq": {"bedrooms": 2, "floors": 2}})),
            &facts()
        ));
    }

    #[test]
    fn test_eq_missing_fact() {
        // Missing fact is unequal to any non-null value, equal to null.
        assert!(!matches(&cond(json!({"eq": {"zip": "33101"}})), &facts()));
        assert!(matches(&cond(json!({"eq": {"zip": null}})), &facts()));
        assert!(matches(
            &cond(json!({"eq": {"year_bucket": null}})),
            &facts()
        ));
    }

    #[test]
    fn test_ordered_comparisons() {
        assert!(matches(&cond(json!({"gte": {"bedrooms": 2}})), &facts()));
        assert!(!matches(&cond(json!({"gt": {"bedrooms": 2}})), &facts()));
        assert!(matches(&cond(json!({"lt": {"floors": 2}})), &facts()));
        assert!(matches(&cond(json!({"lte": {"floors": 1}})), &facts()));
        // All listed fields must satisfy the comparison.
        assert!(!matches(
            &cond(json!({"gte": {"bedrooms": 2, "floors": 2}})),
            &facts()
        ));
    }

    #[test]
    fn test_ordered_comparison_absent_fact_is_false() {
        assert!(!matches(&cond(json!({"gte": {"sq_ft": 1}})), &facts()));
        // Null fact behaves the same as absent.
        assert!(!matches(&cond(json!({"gt": {"year_bucket": 0}})), &facts()));
    }

    #[test]
    fn test_combinators() {
        let c = cond(json!({
            "all": [
                {"eq": {"has_fuel_appliance": true}},
                {"any": [
                    {"gte": {"floors": 2}},
                    {"eq": {"bedrooms": 2}}
                ]}
            ]
        }));
        assert!(matches(&c, &facts()));
        assert!(!matches(&cond(json!({"not": {"always": true}})), &facts()));
        // Empty combinators follow all()/any() semantics.
        assert!(matches(&cond(json!({"all": []})), &facts()));
        assert!(!matches(&cond(json!({"any": []})), &facts()));
    }

    #[test]
    fn test_opaque_matches_everything() {
        assert!(matches(&cond(json!({"betwen": {"floors": 2}})), &facts()));
    }

    #[test]
    fn test_rule_without_when_applies() {
        let rule: Rule = serde_json::from_value(json!({"notes": ["n"]})).unwrap();
        assert!(rule_applies(&rule, &facts()));
    }
}
