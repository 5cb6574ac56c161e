use thiserror::Error;

/// Failures that can escape far enough to abort a pipeline run.
///
/// Everything else — a selector that matches nothing, a banner that refuses
/// to close, a field that will not parse — is absorbed where it happens and
/// never reaches this type.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The browser binary could not be resolved or the process failed to
    /// start. Fatal to the request; never retried at this layer.
    #[error("browser launch failed: {0}")]
    Launch(anyhow::Error),

    /// Navigation to the target page itself failed (not the best-effort
    /// section hops, which are swallowed in the conditioner).
    #[error("navigation failed: {0}")]
    Navigation(anyhow::Error),
}
