//! Cross-jurisdiction conflict resolution.
//!
//! Recommendations merge by (alarm type, place): higher rule priority wins
//! the authoritative fields, jurisdiction specificity (position in the
//! chain) breaks ties, and notes/citations from every jurisdiction are
//! unioned regardless of who wins. Testing cadences merge the other way
//! around: the most specific jurisdiction's wording wins outright and
//! less specific duplicates are discarded whole.

use std::collections::{HashMap, HashSet};

use shared_types::{AlarmType, Place, ResolvedRecommendation, TestingAction};

use crate::document::{Rule, RuleDocument};
use crate::jurisdiction::JurisdictionId;

/// Recommendation merge key.
pub type MergeKey = (AlarmType, Place);

struct Slot {
    rec: ResolvedRecommendation,
    /// Chain index of the jurisdiction that supplied the winning fields.
    chain_index: usize,
}

/// Accumulates matched rules across the jurisdiction chain.
///
/// Entries live in an arena in first-insertion order; the index maps a
/// merge key to its arena slot. Output order is therefore the order in
/// which keys were first produced, which keeps resolution deterministic.
#[derive(Default)]
pub struct ConflictResolver {
    arena: Vec<Slot>,
    index: HashMap<MergeKey, usize>,
    notes: Vec<String>,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one matched rule. Rules must arrive jurisdiction by
    /// jurisdiction in ascending specificity, already sorted by
    /// descending priority with document order preserved among ties.
    pub fn absorb_rule(&mut self, chain_index: usize, jurisdiction: &JurisdictionId, rule: &Rule) {
        for spec in &rule.recommend {
            let key = (spec.alarm, spec.place);
            match self.index.get(&key).copied() {
                None => {
                    let slot = Slot {
                        rec: ResolvedRecommendation {
                            alarm: spec.alarm,
                            place: spec.place,
                            notes: spec.note.iter().cloned().collect(),
                            citations: spec.citation.iter().cloned().collect(),
                            source: Some(
                                spec.source.clone().unwrap_or_else(|| jurisdiction.id()),
                            ),
                            confidence: spec.confidence,
                            priority: rule.priority,
                            jurisdiction: jurisdiction.id(),
                        },
                        chain_index,
                    };
                    self.index.insert(key, self.arena.len());
                    self.arena.push(slot);
                }
                Some(slot_index) => {
                    let slot = &mut self.arena[slot_index];
                    let candidate_wins = rule.priority > slot.rec.priority
                        || (rule.priority == slot.rec.priority && chain_index > slot.chain_index);
                    if candidate_wins {
                        slot.rec.source =
                            Some(spec.source.clone().unwrap_or_else(|| jurisdiction.id()));
                        slot.rec.confidence = spec.confidence;
                        slot.rec.priority = rule.priority;
                        slot.rec.jurisdiction = jurisdiction.id();
                        slot.chain_index = chain_index;
                    }
                    // Win or lose, notes and citations are never dropped.
                    if let Some(note) = &spec.note {
                        push_unique(&mut slot.rec.notes, note);
                    }
                    if let Some(citation) = &spec.citation {
                        push_unique(&mut slot.rec.citations, citation);
                    }
                }
            }
        }
        for note in &rule.notes {
            push_unique(&mut self.notes, note);
        }
    }

    /// Consume the resolver, yielding recommendations in first-insertion
    /// order and the deduplicated plan-level notes.
    pub fn finish(self) -> (Vec<ResolvedRecommendation>, Vec<String>) {
        (
            self.arena.into_iter().map(|slot| slot.rec).collect(),
            self.notes,
        )
    }
}

/// Merge testing cadences across the chain, most specific jurisdiction
/// first. The first occurrence of an (action, frequency) key wins; later
/// duplicates are discarded entirely, notes included.
pub fn merge_testing<'a>(docs_desc: impl Iterator<Item = &'a RuleDocument>) -> Vec<TestingAction> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for doc in docs_desc {
        for entry in &doc.testing {
            if seen.insert((entry.action, entry.frequency)) {
                merged.push(entry.clone());
            }
        }
    }
    merged
}

pub(crate) fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}
