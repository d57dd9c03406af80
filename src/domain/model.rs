use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub type PatientId = i64;
pub type DoctorId = i64;
pub type AppointmentId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub full_name: String,
    pub specialty: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDoctor {
    pub full_name: String,
    pub specialty: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// A committed booking. `start_time` is always stored in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub reason: Option<String>,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl Appointment {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// A validated appointment awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub reason: Option<String>,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl NewAppointment {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn into_appointment(self, id: AppointmentId) -> Appointment {
        Appointment {
            id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            reason: self.reason,
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
        }
    }
}

/// Inbound booking request as the gateway hands it over.
///
/// `start_time` is kept as RFC 3339 text; the coordinator parses it so that a
/// missing offset surfaces as a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    #[serde(default)]
    pub reason: Option<String>,
    pub start_time: String,
    #[serde(alias = "duration")]
    pub duration_minutes: i64,
}

/// Half-open `[start, end)` window used for range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && self.end.map_or(true, |end| instant < end)
    }
}
