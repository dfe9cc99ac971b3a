//! Boundary error types.
//!
//! Grading itself never fails: blank input, unparseable numbers and
//! malformed rules all become structured results. These errors only exist
//! where the crate talks to something outside itself.

use thiserror::Error;

/// Failure of an external AI judge or appeal adjudicator.
///
/// Every variant means "no AI opinion"; callers fall back to the local or
/// prior result instead of surfacing the error to the student.
#[derive(Debug, Error)]
pub enum AdjudicatorError {
    /// The service could not be reached or refused the request.
    #[error("adjudicator unavailable: {0}")]
    Unavailable(String),

    /// The call did not finish in time.
    #[error("adjudicator timed out after {0}s")]
    Timeout(u64),

    /// The reply could not be read as a verdict.
    #[error("malformed adjudicator response: {0}")]
    MalformedResponse(String),

    /// The reply carried an explicit error marker.
    #[error("adjudicator reported an error: {0}")]
    Reported(String),

    /// The reply had no `score` field.
    #[error("adjudicator response is missing a score")]
    MissingScore,
}

