use reqwest::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy for the live-data path.
///
/// The transport classification (`UpstreamRejected` / `UpstreamUnreachable` /
/// `LocalFault`) is assigned exactly once, at the provider-call boundary, and
/// carried structurally from there on. It is never re-derived downstream by
/// inspecting messages.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The requested source name is not part of the closed source enum for
    /// the domain. Rejected before any I/O happens.
    #[error("unknown {domain} source '{value}'. Supported sources: {supported}")]
    UnknownSource {
        domain: &'static str,
        value: String,
        supported: &'static str,
    },

    /// A query parameter was supplied but could not be parsed.
    #[error("invalid value for parameter '{name}': '{value}'")]
    InvalidParam { name: &'static str, value: String },

    /// No API key is configured for a provider that requires one.
    #[error("no API key configured for provider '{provider}'")]
    MissingApiKey { provider: &'static str },

    /// The source is recognized but its integration is a placeholder.
    /// Distinct from both an unknown source and an empty success.
    #[error("source '{provider}' is not implemented")]
    NotImplemented { provider: &'static str },

    /// A response was received but carried an error status.
    #[error("{provider} API error: {status} - {message}")]
    UpstreamRejected {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The request was sent but no response arrived (timeout, DNS failure,
    /// connection reset).
    #[error("no response from {provider}")]
    UpstreamUnreachable { provider: &'static str },

    /// Failure before or outside the network call: request construction,
    /// or a 2xx payload that does not decode into the provider schema.
    #[error("error in {provider} provider: {message}")]
    LocalFault {
        provider: &'static str,
        message: String,
    },
}

impl FetchError {
    /// Build an `UpstreamRejected` from a non-2xx response body.
    ///
    /// Providers that return structured errors use either a top-level
    /// `{"message": ...}` (OpenWeatherMap, USGS) or a nested
    /// `{"error": {"message": ...}}` (WeatherAPI); anything else falls back
    /// to the HTTP status text.
    pub(crate) fn rejected(provider: &'static str, status: StatusCode, body: &str) -> Self {
        let message = extract_error_message(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        FetchError::UpstreamRejected {
            provider,
            status: status.as_u16(),
            message,
        }
    }

    /// Classify a `reqwest` failure that prevented a response from arriving.
    pub(crate) fn from_send_error(provider: &'static str, err: &reqwest::Error) -> Self {
        if err.is_builder() {
            FetchError::LocalFault {
                provider,
                message: err.to_string(),
            }
        } else {
            FetchError::UpstreamUnreachable { provider }
        }
    }

    /// A well-formed transport exchange whose payload violates the provider
    /// contract (missing required fields, wrong shapes).
    pub(crate) fn decode(provider: &'static str, err: impl std::fmt::Display) -> Self {
        FetchError::LocalFault {
            provider,
            message: format!("failed to decode payload: {err}"),
        }
    }

    /// HTTP-equivalent status for the uniform mapping used by callers:
    /// caller errors → 400, placeholder source → 501, upstream rejection →
    /// 502, unreachable upstream → 504, local faults → 500.
    pub fn status_code(&self) -> u16 {
        match self {
            FetchError::UnknownSource { .. } | FetchError::InvalidParam { .. } => 400,
            FetchError::NotImplemented { .. } => 501,
            FetchError::UpstreamRejected { .. } => 502,
            FetchError::UpstreamUnreachable { .. } => 504,
            FetchError::MissingApiKey { .. } | FetchError::LocalFault { .. } => 500,
        }
    }

    /// Message safe to put in an external response. Local fault detail is
    /// logged but redacted here.
    pub fn public_message(&self) -> String {
        match self {
            FetchError::LocalFault { provider, .. } => {
                format!("internal error in {provider} provider")
            }
            other => other.to_string(),
        }
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    value
        .get("message")
        .or_else(|| value.get("error").and_then(|e| e.get("message")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// Failure taxonomy for the persisted-report path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A recognized query parameter was supplied but could not be parsed.
    #[error("invalid value for parameter '{name}': '{value}'")]
    InvalidParam { name: &'static str, value: String },

    /// Update or delete referenced a report that does not exist. Never
    /// conflated with a successful no-op.
    #[error("report '{0}' not found")]
    NotFound(Uuid),
}

impl ReportError {
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::InvalidParam { .. } => 400,
            ReportError::NotFound(_) => 404,
        }
    }
}
