use crate::utils::error::{BookingError, StoreError, StoreResult};
use std::future::Future;
use std::time::Duration;

/// Run one record store call under `timeout`, leaving its own result intact.
pub async fn with_timeout<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> Result<StoreResult<T>, BookingError>
where
    F: Future<Output = StoreResult<T>>,
{
    tokio::time::timeout(timeout, call).await.map_err(|_| {
        tracing::warn!(operation, ?timeout, "record store call timed out");
        BookingError::StorageTimeout { operation, timeout }
    })
}

/// Like [`with_timeout`], with store failures folded into `BookingError`.
pub async fn store_call<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, BookingError>
where
    F: Future<Output = StoreResult<T>>,
{
    with_timeout(operation, timeout, call)
        .await?
        .map_err(|e| {
            tracing::warn!(operation, error = %e, "record store call failed");
            BookingError::from(e)
        })
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } => {
                BookingError::validation(constraint, "value already exists")
            }
            StoreError::Unavailable { message } => BookingError::StorageUnavailable { message },
        }
    }
}
