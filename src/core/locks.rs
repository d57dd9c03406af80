use crate::domain::model::DoctorId;
use crate::utils::error::BookingError;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One exclusive lock per doctor. Holding the guard makes the
/// check-then-insert sequence atomic for that doctor only.
#[derive(Debug, Default)]
pub struct DoctorLocks {
    locks: DashMap<DoctorId, Arc<Mutex<()>>>,
}

impl DoctorLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(
        &self,
        doctor_id: DoctorId,
        max_wait: Duration,
    ) -> Result<OwnedMutexGuard<()>, BookingError> {
        // Clone the handle out so no map shard stays locked across the await.
        let mutex = {
            let entry = self.locks.entry(doctor_id).or_default();
            Arc::clone(entry.value())
        };

        match tokio::time::timeout(max_wait, mutex.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                tracing::warn!(doctor_id, ?max_wait, "timed out waiting for doctor schedule lock");
                Err(BookingError::StorageTimeout {
                    operation: "doctor_schedule_lock",
                    timeout: max_wait,
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
