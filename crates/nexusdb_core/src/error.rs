use thiserror::Error;

/// Taxonomy of error kinds from spec §7.
///
/// This is the internal error type used by drivers, the pool, the query
/// builder and the coordinator. Per spec §7's propagation policy, driver
/// operations never surface `DbError` to their immediate caller — they
/// report a safe default (`false` / `0` / empty `QueryResult`) and log the
/// message — but the type itself is shared so every layer reasons about
/// failures the same way internally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DbError {
    #[error("configuration invalid: {0}")]
    ConfigurationInvalid(String),

    #[error("connect failed: {0}")]
    ConnectFailed(String),

    #[error("not connected")]
    NotConnected,

    #[error("query rejected: {0}")]
    QueryRejected(String),

    #[error("query shape invalid: {0}")]
    QueryShapeInvalid(String),

    #[error("pool exhausted")]
    PoolExhausted,

    #[error("pool shutdown")]
    PoolShutdown,

    #[error("task rejected: executor is stopped")]
    TaskRejected,

    #[error("transaction timed out")]
    TransactionTimeout,

    #[error("participant voted no: {0}")]
    ParticipantDisagreement(String),

    #[error("handler failed: {0}")]
    HandlerFailure(String),
}

impl DbError {
    /// Whether a second attempt against the same backend might succeed
    /// (used by callers deciding whether to discard a pooled connection
    /// versus retry immediately).
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            DbError::ConnectFailed(_) | DbError::PoolExhausted | DbError::TransactionTimeout
        )
    }
}
