//! Jurisdiction identifiers and region-code normalization.
//!
//! Rule documents live in a two-level hierarchy:
//! - Country baseline: `US/common` — always present, always first.
//! - State overlay: `US/CA/common` — optional, appended only when the
//!   configured source actually has a document for the region.
//!
//! A chain is ordered least → most specific; position in the chain is
//! what "specificity" means during conflict resolution.

use serde::{Deserialize, Serialize};

/// Accepted full state names for regions that ship overlays today.
/// Everything else must arrive as a two-letter code.
const REGION_NAMES: &[(&str, &str)] = &[
    ("california", "CA"),
    ("new york", "NY"),
    ("texas", "TX"),
    ("florida", "FL"),
];

/// Collapse caller region input to a canonical two-letter code.
///
/// Accepts a bare two-letter code ("CA"), a compound code ("US-CA"),
/// or a known state name ("California"). Anything else yields `None`,
/// which keeps the jurisdiction chain baseline-only.
pub fn normalize_region(input: &str) -> Option<String> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    // "US-CA" → "CA"
    if s.contains('-') {
        let tail = s.rsplit('-').next()?;
        if tail.len() == 2 && tail.chars().all(|c| c.is_ascii_alphabetic()) {
            return Some(tail.to_ascii_uppercase());
        }
        return None;
    }
    let key = s.to_ascii_lowercase();
    for (name, code) in REGION_NAMES {
        if key == *name {
            return Some((*code).to_string());
        }
    }
    if s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(s.to_ascii_uppercase());
    }
    None
}

/// Locates one rule document in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JurisdictionId {
    pub country: String,
    pub region: Option<String>,
}

impl JurisdictionId {
    /// The country-level baseline every chain starts with.
    pub fn baseline() -> Self {
        Self {
            country: "US".to_string(),
            region: None,
        }
    }

    /// A state overlay under the US baseline.
    pub fn overlay(region: &str) -> Self {
        Self {
            country: "US".to_string(),
            region: Some(region.to_ascii_uppercase()),
        }
    }

    pub fn is_baseline(&self) -> bool {
        self.region.is_none()
    }

    /// Hierarchical identifier, e.g. "US/common" or "US/CA/common".
    pub fn id(&self) -> String {
        match &self.region {
            Some(region) => format!("{}/{}/common", self.country, region),
            None => format!("{}/common", self.country),
        }
    }

    /// Relative document path under a source root.
    pub fn relative_path(&self) -> String {
        match &self.region {
            Some(region) => format!("{}/{}/common.json", self.country, region),
            None => format!("{}/common.json", self.country),
        }
    }
}

impl std::fmt::Display for JurisdictionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}
