// ⚠️ Error Taxonomy
// Retrieval errors come from the holiday source; aggregation errors from the engine.
// An absent result (source answered, no data) is NOT an error and never appears here.

use thiserror::Error;

// ============================================================================
// SOURCE ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Upstream could not be reached (DNS, connect, timeout)
    #[error("holiday API unreachable for {country_code}/{year}: {message}")]
    Unreachable {
        country_code: String,
        year: i32,
        message: String,
    },

    /// Upstream refused the request (4xx)
    #[error("holiday API rejected request for {country_code}/{year} with status {status}")]
    Rejected {
        country_code: String,
        year: i32,
        status: u16,
    },

    /// Upstream failed on its side (5xx)
    #[error("holiday API unavailable for {country_code}/{year} (status {status})")]
    Unavailable {
        country_code: String,
        year: i32,
        status: u16,
    },

    #[error("holiday API returned an unreadable body for {country_code}/{year}: {message}")]
    Decode {
        country_code: String,
        year: i32,
        message: String,
    },

    /// The fetch task died before producing a result
    #[error("holiday fetch interrupted: {0}")]
    Interrupted(String),
}

impl SourceError {
    /// Upstream-side trouble, as opposed to a bad request or bad payload
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            SourceError::Unreachable { .. }
                | SourceError::Unavailable { .. }
                | SourceError::Interrupted(_)
        )
    }
}

// ============================================================================
// ENGINE ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum EngineError {
    /// One of the two concurrent fetches failed; which one is deliberately not named
    #[error("failed to fetch holidays for comparison")]
    ComparisonFetch {
        #[source]
        source: SourceError,
    },
}

impl EngineError {
    pub fn source_error(&self) -> &SourceError {
        match self {
            EngineError::ComparisonFetch { source } => source,
        }
    }
}

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
