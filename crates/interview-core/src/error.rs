use thiserror::Error;

/// Failures surfaced directly to the caller of
/// [`SessionController::start`](crate::controller::SessionController::start).
///
/// Everything that can go wrong after a session is live (mid-session
/// transport errors, generation failures) is converted into observable
/// session state instead of being returned as an error.
#[derive(Debug, Error)]
pub enum StartError {
    /// No agent identifier was configured. Nothing was attempted; the
    /// user has to fix their configuration before retrying.
    #[error("missing interview agent identifier")]
    MissingAgentId,

    /// Audio acquisition or the transport open failed. The session is
    /// still idle and the user may simply retry.
    #[error("connection failed: {0}")]
    Connection(anyhow::Error),
}
