//! Error types for the overlay engine.

use thiserror::Error;

/// Result type alias using OverlayError.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Primary error type for grid engine operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    // === Input errors ===
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    // === Fetch errors ===
    #[error("Point fetch failed: {0}")]
    Fetch(String),

    #[error("Request timeout")]
    Timeout,

    // === Lifecycle errors ===
    #[error("A grid computation is already in progress")]
    RequestInProgress,

    #[error("Map host is no longer available")]
    HostGone,

    // === Rendering errors ===
    #[error("Rendering failed: {0}")]
    Render(String),
}

impl OverlayError {
    /// Whether the condition is transient and the caller may simply retry on
    /// the next viewport settle.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OverlayError::Fetch(_) | OverlayError::Timeout | OverlayError::RequestInProgress
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(OverlayError::Timeout.is_transient());
        assert!(OverlayError::RequestInProgress.is_transient());
        assert!(!OverlayError::HostGone.is_transient());
        assert!(!OverlayError::InvalidViewport("x".into()).is_transient());
    }
}
