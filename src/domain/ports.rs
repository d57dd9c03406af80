use crate::domain::model::{
    Appointment, Doctor, DoctorId, NewAppointment, NewDoctor, NewPatient, Patient, PatientId,
    TimeRange,
};
use crate::utils::error::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence operations the booking core needs.
///
/// Implementations own id assignment. `insert_appointment` must be
/// all-or-nothing: either the appointment is stored and returned, or nothing
/// is written.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_patient(&self, id: PatientId) -> StoreResult<Option<Patient>>;
    async fn find_doctor(&self, id: DoctorId) -> StoreResult<Option<Doctor>>;
    /// Fails with `UniqueViolation` when the email is already registered.
    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient>;
    async fn insert_doctor(&self, doctor: NewDoctor) -> StoreResult<Doctor>;
    /// Appointments whose start lies in `range` (all when `None`), optionally
    /// restricted to one doctor, ordered by start time.
    async fn list_appointments(
        &self,
        doctor_id: Option<DoctorId>,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<Appointment>>;
    /// May fail with `UniqueViolation` if the store enforces its own
    /// per-doctor exclusion.
    async fn insert_appointment(&self, appointment: NewAppointment) -> StoreResult<Appointment>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
