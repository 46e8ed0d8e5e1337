use thiserror::Error;

/// Infrastructure-level errors of the gating model.
///
/// Business-logic denials are not errors; they are
/// [`DenialReason`](crate::enforcement::DenialReason) values. Callers that
/// receive a source-error variant should deny the gated action (fail closed)
/// rather than allowing it.
#[derive(Debug, Error)]
pub enum GatingError {
    #[error("Invalid plan catalog: {0}")]
    InvalidCatalog(String),

    #[error("Catalog parse error: {0}")]
    CatalogParse(#[from] serde_json::Error),

    #[error("Subscription source error: {0}")]
    SubscriptionSource(#[source] anyhow::Error),

    #[error("Usage source error: {0}")]
    UsageSource(#[source] anyhow::Error),
}
