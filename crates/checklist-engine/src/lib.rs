//! Jurisdiction-aware smoke/CO alarm compliance checklists.
//!
//! The engine resolves a caller's property profile against layered
//! jurisdiction rule documents:
//! - Country baseline (`US/common`): model-code requirements for everyone.
//! - State overlay (`US/CA/common`, ...): stricter or differently-worded
//!   state requirements, applied after the baseline.
//!
//! Resolution loads each jurisdiction's document, filters rules through
//! the condition matcher, and merges recommendations by (alarm type,
//! placement) with priority-then-specificity conflict resolution.

pub mod calendar;
pub mod document;
pub mod error;
pub mod jurisdiction;
pub mod legacy;
pub mod matcher;
pub mod resolver;
pub mod source;

use shared_types::{ChecklistPlan, ChecklistText, PropertyProfile};

use crate::document::RuleDocument;
use crate::jurisdiction::{normalize_region, JurisdictionId};
use crate::resolver::ConflictResolver;

pub use crate::calendar::ReminderCalendar;
pub use crate::document::{Condition, RecommendationSpec, Rule};
pub use crate::error::EngineError;
pub use crate::matcher::FactMap;
pub use crate::source::{EmbeddedRuleSource, FileRuleSource, MemoryRuleSource, RuleRepository, RuleSource};

/// ChecklistEngine entry point.
///
/// Stateless across calls: every resolution re-reads the source and
/// produces an independent plan, so one engine can serve concurrent
/// resolutions without coordination.
pub struct ChecklistEngine {
    repository: RuleRepository,
}

impl ChecklistEngine {
    pub fn new(source: Box<dyn RuleSource>) -> Self {
        Self {
            repository: RuleRepository::new(source),
        }
    }

    /// Engine over the rule documents shipped with the crate.
    pub fn embedded() -> Self {
        Self::new(Box::new(EmbeddedRuleSource))
    }

    /// Resolve a property profile into a checklist plan.
    ///
    /// The only failure modes are the repository's: a missing baseline
    /// document or a document that fails to decode. An unrecognized
    /// region silently falls back to the baseline-only chain.
    pub fn resolve(&self, profile: &PropertyProfile) -> Result<ChecklistPlan, EngineError> {
        let facts = profile.fact_map();
        let (chain, docs) = self.load_chain(&profile.state)?;
        tracing::debug!(
            chain = ?chain.iter().map(JurisdictionId::id).collect::<Vec<_>>(),
            "resolved jurisdiction chain"
        );

        let mut resolver = ConflictResolver::new();
        for (chain_index, (jurisdiction, doc)) in chain.iter().zip(&docs).enumerate() {
            let mut matched: Vec<&Rule> = doc
                .rules
                .iter()
                .filter(|rule| matcher::rule_applies(rule, &facts))
                .collect();
            // Descending priority; the stable sort preserves document
            // order among equal priorities, which the merge relies on.
            matched.sort_by(|a, b| b.priority.cmp(&a.priority));
            for rule in matched {
                resolver.absorb_rule(chain_index, jurisdiction, rule);
            }
        }
        let (recommendations, notes) = resolver.finish();

        // Testing cadences merge most-specific-first.
        let testing = resolver::merge_testing(docs.iter().rev());

        Ok(ChecklistPlan {
            recommendations,
            testing,
            notes,
            jurisdiction_chain: chain.iter().map(JurisdictionId::id).collect(),
        })
    }

    /// Legacy rendered-checklist surface; see [`legacy`].
    pub fn resolve_text(&self, profile: &PropertyProfile) -> Result<ChecklistText, EngineError> {
        legacy::evaluate_text(&self.repository, profile)
    }

    /// The jurisdiction chain the given region input would resolve to.
    pub fn jurisdiction_chain(&self, state: &str) -> Result<Vec<JurisdictionId>, EngineError> {
        let (chain, _) = self.load_chain(state)?;
        Ok(chain)
    }

    fn load_chain(
        &self,
        state: &str,
    ) -> Result<(Vec<JurisdictionId>, Vec<RuleDocument>), EngineError> {
        let baseline = JurisdictionId::baseline();
        let baseline_doc = self.repository.load_baseline(&baseline)?;
        let mut chain = vec![baseline];
        let mut docs = vec![baseline_doc];

        match normalize_region(state) {
            Some(region) => {
                let overlay = JurisdictionId::overlay(&region);
                if let Some(doc) = self.repository.load_overlay(&overlay)? {
                    chain.push(overlay);
                    docs.push(doc);
                } else {
                    tracing::debug!(region = %region, "no overlay document; baseline-only chain");
                }
            }
            None => {
                tracing::warn!(state = %state, "unrecognized region input; baseline-only chain");
            }
        }
        Ok((chain, docs))
    }
}

impl Default for ChecklistEngine {
    fn default() -> Self {
        Self::embedded()
    }
}
