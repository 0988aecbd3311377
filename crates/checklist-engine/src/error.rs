use thiserror::Error;

/// Failures the engine can produce. All of them are static-configuration
/// defects; none are retryable. An unrecognized region is not an error and
/// never reaches this type.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The country-level baseline document is absent. Without it no
    /// checklist can be produced at all.
    #[error("baseline rule document not found for {0}")]
    BaselineMissing(String),

    /// A rule document exists but does not decode into the rule model.
    #[error("rule document for {jurisdiction} is malformed")]
    Malformed {
        jurisdiction: String,
        #[source]
        source: serde_json::Error,
    },

    /// A file-backed source failed while reading a document.
    #[error("failed to read rule document for {jurisdiction}")]
    Source {
        jurisdiction: String,
        #[source]
        source: std::io::Error,
    },
}
