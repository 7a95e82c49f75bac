//! Agent execution error types.
//!
//! Only model-side failures are errors for the loop: tool failures are turned into
//! tool result text by [`ActNode`](crate::ActNode) and never reach this type.

use std::time::Duration;

use thiserror::Error;

/// Fatal error for one loop run.
///
/// Returned by [`ThinkNode`](crate::ThinkNode) and propagated unchanged by
/// [`ToolLoop`](crate::ToolLoop); no retry is attempted.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model call failed (network, auth, rate limit, malformed response, request build).
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// The model call did not complete within the configured timeout.
    #[error("model invocation timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of ModelInvocation contains the prefix and the message.
    #[test]
    fn agent_error_display_model_invocation() {
        let err = AgentError::ModelInvocation("401 unauthorized".to_string());
        let s = err.to_string();
        assert!(s.contains("model invocation failed"), "{}", s);
        assert!(s.contains("401 unauthorized"), "{}", s);
    }

    /// **Scenario**: Display of Timeout names the duration.
    #[test]
    fn agent_error_display_timeout() {
        let err = AgentError::Timeout(Duration::from_secs(3));
        let s = err.to_string();
        assert!(s.contains("timed out"), "{}", s);
        assert!(s.contains("3s"), "{}", s);
    }
}
