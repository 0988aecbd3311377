//! Configuration sources and the rule repository.
//!
//! The engine never touches storage directly; a `RuleSource` hands it
//! document text by jurisdiction. File-backed and embedded sources both
//! satisfy the trait, and tests use an in-memory map.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::document::RuleDocument;
use crate::error::EngineError;
use crate::jurisdiction::JurisdictionId;

/// Read-only access to rule document text. `Ok(None)` means no document
/// exists for that jurisdiction, which is an error only for the baseline.
pub trait RuleSource: Send + Sync {
    fn read(&self, jurisdiction: &JurisdictionId) -> Result<Option<String>, EngineError>;
}

/// Documents under a root directory, laid out as
/// `<root>/US/common.json`, `<root>/US/CA/common.json`, ...
pub struct FileRuleSource {
    root: PathBuf,
}

impl FileRuleSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl RuleSource for FileRuleSource {
    fn read(&self, jurisdiction: &JurisdictionId) -> Result<Option<String>, EngineError> {
        let path = self.root.join(jurisdiction.relative_path());
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| EngineError::Source {
                jurisdiction: jurisdiction.id(),
                source,
            })
    }
}

/// The rule documents shipped with the crate, compiled in. Default source
/// for callers that do not configure their own rules directory.
pub struct EmbeddedRuleSource;

const US_COMMON: &str = include_str!("../rules/US/common.json");
const US_CA_COMMON: &str = include_str!("../rules/US/CA/common.json");

impl RuleSource for EmbeddedRuleSource {
    fn read(&self, jurisdiction: &JurisdictionId) -> Result<Option<String>, EngineError> {
        Ok(match jurisdiction.id().as_str() {
            "US/common" => Some(US_COMMON.to_string()),
            "US/CA/common" => Some(US_CA_COMMON.to_string()),
            _ => None,
        })
    }
}

/// In-memory source keyed by jurisdiction id. Used by tests and by
/// callers that assemble rule sets programmatically.
#[derive(Default)]
pub struct MemoryRuleSource {
    docs: HashMap<String, String>,
}

impl MemoryRuleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, jurisdiction_id: &str, document: impl Into<String>) {
        self.docs.insert(jurisdiction_id.to_string(), document.into());
    }
}

impl RuleSource for MemoryRuleSource {
    fn read(&self, jurisdiction: &JurisdictionId) -> Result<Option<String>, EngineError> {
        Ok(self.docs.get(&jurisdiction.id()).cloned())
    }
}

/// Loads and decodes rule documents. Stateless: every load re-reads the
/// source, and each call returns an independently owned document.
pub struct RuleRepository {
    source: Box<dyn RuleSource>,
}

impl RuleRepository {
    pub fn new(source: Box<dyn RuleSource>) -> Self {
        Self { source }
    }

    /// Load the country baseline. Its absence is fatal.
    pub fn load_baseline(&self, jurisdiction: &JurisdictionId) -> Result<RuleDocument, EngineError> {
        match self.source.read(jurisdiction)? {
            Some(text) => self.decode(jurisdiction, &text),
            None => Err(EngineError::BaselineMissing(jurisdiction.id())),
        }
    }

    /// Load an overlay. Absence just means the chain stays shorter.
    pub fn load_overlay(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Option<RuleDocument>, EngineError> {
        match self.source.read(jurisdiction)? {
            Some(text) => self.decode(jurisdiction, &text).map(Some),
            None => Ok(None),
        }
    }

    /// Load a document as raw JSON, for the legacy surface's deep merge.
    pub fn load_raw(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Option<serde_json::Value>, EngineError> {
        match self.source.read(jurisdiction)? {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| EngineError::Malformed {
                    jurisdiction: jurisdiction.id(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn decode(
        &self,
        jurisdiction: &JurisdictionId,
        text: &str,
    ) -> Result<RuleDocument, EngineError> {
        serde_json::from_str(text).map_err(|source| EngineError::Malformed {
            jurisdiction: jurisdiction.id(),
            source,
        })
    }
}
