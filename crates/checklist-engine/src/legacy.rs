//! Legacy flat evaluation surface.
//!
//! Older callers consume a rendered `ChecklistText` instead of a
//! structured plan. That surface evaluates a single deep-merged document
//! (baseline plus overlay) rather than a jurisdiction chain, so it has no
//! conflict resolution. Two document generations are handled:
//! - the compact schema, rendered through the same document model and
//!   condition matcher the plan surface uses;
//! - the original sectioned format (`smoke`/`co`/`devices`/... lists of
//!   `{when, text}`), whose leaf conditions name a `field` and an
//!   operator: `eq`, `ne`, `in`, `nin`, `gt`, `gte`, `lt`, `lte`.

use serde_json::{Map, Value};

use shared_types::{AlarmType, ChecklistText, PropertyProfile};

use crate::document::RuleDocument;
use crate::error::EngineError;
use crate::jurisdiction::{normalize_region, JurisdictionId};
use crate::matcher::{self, FactMap};
use crate::resolver::push_unique;
use crate::source::RuleRepository;

/// Evaluate the legacy surface: deep-merge the documents for the
/// profile's region, then render whichever schema generation the merged
/// document uses.
pub fn evaluate_text(
    repository: &RuleRepository,
    profile: &PropertyProfile,
) -> Result<ChecklistText, EngineError> {
    let merged = merged_document(repository, &profile.state)?;
    let facts = profile.fact_map();
    if merged.get("rules").is_some() {
        render_compact(&merged, &facts)
    } else {
        Ok(evaluate_sections(&merged, &facts))
    }
}

fn merged_document(repository: &RuleRepository, state: &str) -> Result<Value, EngineError> {
    let baseline = JurisdictionId::baseline();
    let mut merged = repository
        .load_raw(&baseline)?
        .ok_or_else(|| EngineError::BaselineMissing(baseline.id()))?;
    if let Some(region) = normalize_region(state) {
        let overlay_id = JurisdictionId::overlay(&region);
        if let Some(overlay) = repository.load_raw(&overlay_id)? {
            merged = deep_merge(merged, overlay);
        }
    }
    Ok(merged)
}

/// Recursive merge: maps merge key by key, lists concatenate, scalars are
/// overridden by the overlay.
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.remove(&key) {
                    Some(base_value) => {
                        base_map.insert(key, deep_merge(base_value, overlay_value));
                    }
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
            Value::Object(base_map)
        }
        (Value::Array(mut base_list), Value::Array(overlay_list)) => {
            base_list.extend(overlay_list);
            Value::Array(base_list)
        }
        (_, overlay) => overlay,
    }
}

fn render_compact(merged: &Value, facts: &FactMap) -> Result<ChecklistText, EngineError> {
    // The merged value no longer belongs to a single jurisdiction; decode
    // failures are attributed to the baseline, which anchors the merge.
    let doc: RuleDocument =
        serde_json::from_value(merged.clone()).map_err(|source| EngineError::Malformed {
            jurisdiction: JurisdictionId::baseline().id(),
            source,
        })?;

    let mut text = ChecklistText::default();
    let mut citations: Vec<String> = Vec::new();

    let mut rules: Vec<_> = doc.rules.iter().collect();
    // Descending priority, document order preserved among ties.
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));

    for rule in rules {
        if !matcher::rule_applies(rule, facts) {
            continue;
        }
        for spec in &rule.recommend {
            if let Some(citation) = &spec.citation {
                push_unique(&mut citations, citation);
            }
            let mut line = match spec.alarm {
                AlarmType::Smoke => format!("Install smoke alarm {}", spec.place.phrase()),
                AlarmType::Co => format!("Install CO alarm {}", spec.place.phrase()),
            };
            if let Some(note) = &spec.note {
                line = format!("{line} {note}");
            }
            let bucket = match spec.alarm {
                AlarmType::Smoke => &mut text.smoke,
                AlarmType::Co => &mut text.co,
            };
            push_unique(bucket, &line);
        }
        for note in &rule.notes {
            push_unique(&mut text.notes, note);
        }
    }

    for entry in &doc.testing {
        let mut line = format!("{} {}.", entry.action.phrase(), entry.frequency.phrase());
        if let Some(note) = &entry.note {
            line = format!("{line} {note}");
        }
        push_unique(&mut text.testing, &line);
    }

    citations.sort();
    text.citations = citations;
    Ok(text)
}

fn evaluate_sections(merged: &Value, facts: &FactMap) -> ChecklistText {
    ChecklistText {
        smoke: section_lines(merged, "smoke", facts),
        co: section_lines(merged, "co", facts),
        devices: section_lines(merged, "devices", facts),
        testing: section_lines(merged, "testing", facts),
        notes: section_lines(merged, "notes", facts),
        citations: section_lines(merged, "citations", facts),
    }
}

fn section_lines(doc: &Value, section: &str, facts: &FactMap) -> Vec<String> {
    let Some(rules) = doc.get(section).and_then(Value::as_array) else {
        return Vec::new();
    };
    rules
        .iter()
        .filter_map(|rule| {
            if !legacy_condition_matches(rule.get("when"), facts) {
                return None;
            }
            rule.get("text").and_then(Value::as_str).map(str::to_string)
        })
        .collect()
}

fn legacy_condition_matches(condition: Option<&Value>, facts: &FactMap) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    match condition {
        Value::Object(map) => {
            if let Some(subs) = map.get("all").and_then(Value::as_array) {
                return subs.iter().all(|c| legacy_condition_matches(Some(c), facts));
            }
            if let Some(subs) = map.get("any").and_then(Value::as_array) {
                return subs.iter().any(|c| legacy_condition_matches(Some(c), facts));
            }
            if let Some(sub) = map.get("not") {
                return !legacy_condition_matches(Some(sub), facts);
            }
            legacy_leaf_matches(map, facts)
        }
        // Null and any non-object shape keep the legacy permissive default.
        _ => true,
    }
}

fn legacy_leaf_matches(leaf: &Map<String, Value>, facts: &FactMap) -> bool {
    let Some(field) = leaf.get("field").and_then(Value::as_str) else {
        return true;
    };
    let fact = facts.get(field).cloned().unwrap_or(Value::Null);

    if let Some(expected) = leaf.get("eq") {
        return &fact == expected;
    }
    if let Some(expected) = leaf.get("ne") {
        return &fact != expected;
    }
    if let Some(options) = leaf.get("in").and_then(Value::as_array) {
        return options.contains(&fact);
    }
    if let Some(options) = leaf.get("nin").and_then(Value::as_array) {
        return !options.contains(&fact);
    }
    let ordered: [(&str, fn(f64, f64) -> bool); 4] = [
        ("gt", |a, b| a > b),
        ("gte", |a, b| a >= b),
        ("lt", |a, b| a < b),
        ("lte", |a, b| a <= b),
    ];
    for (key, op) in ordered {
        if let Some(bound) = leaf.get(key) {
            // Absent or non-numeric fact fails the comparison outright.
            return match (fact.as_f64(), bound.as_f64()) {
                (Some(a), Some(b)) => op(a, b),
                _ => false,
            };
        }
    }
    true
}
