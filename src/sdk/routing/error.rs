use serde::Deserialize;
use thiserror::Error;

// Helper structs to parse the JSON error body the provider sends on non-2xx
#[derive(Deserialize, Debug)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorPayload {
    pub detailed_error: Option<ApiErrorDetail>,
    pub error_text: Option<String>,
}

/// Why a remote call could not produce a usable answer.
#[derive(Error, Debug)]
pub enum ServiceFault {
    // Structured error returned by the provider
    #[error("API Error (Code {code}): {message}")]
    Api { code: String, message: String },

    // A fallback for when the error body isn't in the expected JSON format
    #[error("Unstructured API Error (HTTP {status}): {body}")]
    RawApi { status: u16, body: String },

    #[error("Underlying request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    Endpoint(String),
}

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Location permission was denied")]
    PermissionDenied,

    #[error("Current position is unavailable")]
    PositionUnavailable,

    #[error("No place matches \"{0}\"")]
    NoMatch(String),

    #[error("No route found between origin and destination")]
    NoRouteFound,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(#[from] ServiceFault),
}

impl From<reqwest::Error> for RoutingError {
    fn from(e: reqwest::Error) -> Self {
        RoutingError::ServiceUnavailable(ServiceFault::Request(e))
    }
}

impl From<serde_json::Error> for RoutingError {
    fn from(e: serde_json::Error) -> Self {
        RoutingError::ServiceUnavailable(ServiceFault::Parse(e))
    }
}

/// The failure class shown to the user, without the underlying detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PermissionDenied,
    PositionUnavailable,
    NoMatch,
    NoRouteFound,
    ServiceUnavailable,
}

impl RoutingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoutingError::PermissionDenied => ErrorKind::PermissionDenied,
            RoutingError::PositionUnavailable => ErrorKind::PositionUnavailable,
            RoutingError::NoMatch(_) => ErrorKind::NoMatch,
            RoutingError::NoRouteFound => ErrorKind::NoRouteFound,
            RoutingError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
        }
    }
}

impl ErrorKind {
    /// Short headline for an alert.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "Location permission denied",
            ErrorKind::PositionUnavailable => "Position unavailable",
            ErrorKind::NoMatch => "No results",
            ErrorKind::NoRouteFound => "No route",
            ErrorKind::ServiceUnavailable => "Service unavailable",
        }
    }
}
