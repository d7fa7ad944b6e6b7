// Metrics module for Prometheus observability

mod registry;

pub use registry::{gather_metrics, ATTEMPTS_TOTAL, REQUEST_DURATION, RETRIES_TOTAL};

use crate::error::{ApiError, CODE_INVALID_REQUEST, CODE_INVALID_RESPONSE, CODE_NETWORK_ERROR};

/// Outcome label for a failed attempt or request.
pub fn outcome_label(error: &ApiError) -> &'static str {
    if error.is_timeout() {
        "timeout"
    } else if error.code == CODE_NETWORK_ERROR {
        "network_error"
    } else if error.code == CODE_INVALID_RESPONSE {
        "invalid_response"
    } else if error.code == CODE_INVALID_REQUEST {
        "invalid_request"
    } else if error.is_client_error() {
        "client_error"
    } else {
        "server_error"
    }
}

/// Helper to record one physical attempt
pub fn record_attempt(method: &str, outcome: &str) {
    ATTEMPTS_TOTAL.with_label_values(&[method, outcome]).inc();
}

/// Helper to record a retry after backoff
pub fn record_retry(method: &str) {
    RETRIES_TOTAL.with_label_values(&[method]).inc();
}

/// Helper to record the end of a logical request
pub fn record_request(method: &str, outcome: &str, duration_secs: f64) {
    REQUEST_DURATION
        .with_label_values(&[method, outcome])
        .observe(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(&ApiError::timeout()), "timeout");
        assert_eq!(outcome_label(&ApiError::network("refused")), "network_error");
        assert_eq!(outcome_label(&ApiError::invalid_response(200, "bad")), "invalid_response");
        assert_eq!(outcome_label(&ApiError::invalid_request("bad")), "invalid_request");
        assert_eq!(outcome_label(&ApiError::new(404, "NOT_FOUND", "missing")), "client_error");
        assert_eq!(outcome_label(&ApiError::new(502, "HTTP_ERROR", "HTTP 502")), "server_error");
    }
}
