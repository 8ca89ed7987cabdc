//! Shared result types for patent-risk analysis.

use serde::{Deserialize, Serialize};

/// Error taxonomy shared across the client and the orchestrator.
///
/// Serialized snake_case (`api_error`, `response_format`, ...), the wire
/// discriminants consumed for user-facing messaging and retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    Authentication,
    ApiError,
    ResponseFormat,
    Throttled,
    Processing,
    Unexpected,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::ApiError => "api_error",
            ErrorKind::ResponseFormat => "response_format",
            ErrorKind::Throttled => "throttled",
            ErrorKind::Processing => "processing",
            ErrorKind::Unexpected => "unexpected",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One patent in the canonical shape produced by response normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatentRecord {
    pub patent_number: String,
    pub title: String,
    pub applicant: String,
    /// ISO 8601 date string as reported upstream.
    pub publication_date: String,
    /// Relevance in `[0, 1]`.
    pub relevance_score: f64,
}

/// The query a result answers, echoed back on success and failure alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    pub title: String,
    pub summary: String,
    pub reference: String,
}

/// Outcome of one `analyze` call.
///
/// Always well-formed: failures are expressed through `success == false`
/// plus `error`/`error_type`, never as a raised error. Only successful
/// results are ever cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub patents: Vec<PatentRecord>,
    pub patent_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_info: Option<QueryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
    /// Seconds until a throttled query may be retried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(default)]
    pub from_cache: bool,
    #[serde(default)]
    pub throttled: bool,
}

impl AnalysisResult {
    /// A successful result over the given normalized patents.
    pub fn ok(component_name: &str, patents: Vec<PatentRecord>) -> Self {
        Self {
            success: true,
            patent_count: patents.len(),
            patents,
            component_name: Some(component_name.to_string()),
            query_info: None,
            error: None,
            error_type: None,
            retry_after: None,
            from_cache: false,
            throttled: false,
        }
    }

    /// A failure of the given kind, with no patents and nothing cacheable.
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            patents: Vec::new(),
            patent_count: 0,
            component_name: None,
            query_info: None,
            error: Some(message.into()),
            error_type: Some(kind),
            retry_after: None,
            from_cache: false,
            throttled: false,
        }
    }

    /// A locally rate-limited result carrying the retry window in seconds.
    pub fn throttled(retry_after_secs: u64) -> Self {
        let mut result = Self::failure(
            ErrorKind::Throttled,
            format!(
                "query throttled, retry in {retry_after_secs} seconds",
            ),
        );
        result.throttled = true;
        result.retry_after = Some(retry_after_secs);
        result
    }

    pub fn with_query_info(mut self, title: &str, summary: &str, reference: &str) -> Self {
        self.query_info = Some(QueryInfo {
            title: title.to_string(),
            summary: summary.to_string(),
            reference: reference.to_string(),
        });
        self
    }
}
