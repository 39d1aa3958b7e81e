use reqwest::StatusCode;
use thiserror::Error;

/// Closed set of failure categories for the remote optimization call.
///
/// Per-item failures are never fatal to a run: the engine logs the category
/// and leaves the item's fate to the quarantine decision.
#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("account limit exceeded or credentials rejected: {0}")]
    AccountLimitExceeded(String),

    #[error("source image or request rejected: {0}")]
    InvalidInputOrRequest(String),

    #[error("remote optimization service unavailable: {0}")]
    RemoteServiceUnavailable(String),

    #[error("network connection failed: {0}")]
    ConnectivityFailure(String),

    #[error("unexpected optimization failure: {0}")]
    Unknown(String),
}

impl OptimizeError {
    pub fn category(&self) -> &'static str {
        match self {
            OptimizeError::AccountLimitExceeded(_) => "AccountLimitExceeded",
            OptimizeError::InvalidInputOrRequest(_) => "InvalidInputOrRequest",
            OptimizeError::RemoteServiceUnavailable(_) => "RemoteServiceUnavailable",
            OptimizeError::ConnectivityFailure(_) => "ConnectivityFailure",
            OptimizeError::Unknown(_) => "Unknown",
        }
    }
}

/// Maps an HTTP status from the optimization service into the taxonomy.
///
/// 401 and 429 are account problems (bad key, monthly quota), other 4xx
/// means the request or source image was rejected, and 5xx is a temporary
/// service-side issue.
pub fn classify_status(status: StatusCode, detail: &str) -> OptimizeError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::TOO_MANY_REQUESTS => {
            OptimizeError::AccountLimitExceeded(format!("{status}: {detail}"))
        }
        s if s.is_client_error() => {
            OptimizeError::InvalidInputOrRequest(format!("{status}: {detail}"))
        }
        s if s.is_server_error() => {
            OptimizeError::RemoteServiceUnavailable(format!("{status}: {detail}"))
        }
        s => OptimizeError::Unknown(format!("unexpected status {s}: {detail}")),
    }
}

/// Maps a transport-level failure (no HTTP status available) into the
/// taxonomy.
pub fn classify_transport(err: reqwest::Error) -> OptimizeError {
    if err.is_connect() || err.is_timeout() {
        OptimizeError::ConnectivityFailure(err.to_string())
    } else {
        OptimizeError::Unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_an_account_problem() {
        let err = classify_status(StatusCode::UNAUTHORIZED, "bad key");
        assert!(matches!(err, OptimizeError::AccountLimitExceeded(_)));
        assert_eq!(err.category(), "AccountLimitExceeded");
    }

    #[test]
    fn quota_exhaustion_is_an_account_problem() {
        let err = classify_status(StatusCode::TOO_MANY_REQUESTS, "monthly limit");
        assert!(matches!(err, OptimizeError::AccountLimitExceeded(_)));
    }

    #[test]
    fn other_client_errors_blame_the_request() {
        let err = classify_status(StatusCode::UNSUPPORTED_MEDIA_TYPE, "not an image");
        assert!(matches!(err, OptimizeError::InvalidInputOrRequest(_)));
        assert_eq!(err.category(), "InvalidInputOrRequest");
    }

    #[test]
    fn server_errors_are_service_unavailability() {
        let err = classify_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, OptimizeError::RemoteServiceUnavailable(_)));
    }

    #[test]
    fn redirects_fall_through_to_unknown() {
        let err = classify_status(StatusCode::FOUND, "moved");
        assert!(matches!(err, OptimizeError::Unknown(_)));
    }
}
