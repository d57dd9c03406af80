use crate::core::interval::Interval;
use crate::domain::model::{
    Appointment, AppointmentId, Doctor, DoctorId, NewAppointment, NewDoctor, NewPatient, Patient,
    PatientId, TimeRange,
};
use crate::domain::ports::RecordStore;
use crate::utils::error::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

pub const APPOINTMENT_OVERLAP_CONSTRAINT: &str = "appointment_doctor_overlap";
pub const PATIENT_EMAIL_CONSTRAINT: &str = "patient_email";

#[derive(Debug, Default)]
struct Tables {
    patients: BTreeMap<PatientId, Patient>,
    doctors: BTreeMap<DoctorId, Doctor>,
    appointments: BTreeMap<AppointmentId, Appointment>,
    next_patient_id: PatientId,
    next_doctor_id: DoctorId,
    next_appointment_id: AppointmentId,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Process-local record store.
///
/// Every write happens under one write lock, so each insert is atomic. By
/// default it also refuses an appointment that overlaps another booking of
/// the same doctor, acting like an exclusion constraint.
#[derive(Debug)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    enforce_doctor_exclusion: bool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            enforce_doctor_exclusion: true,
        }
    }

    /// A store that accepts any insert; overlap protection is then entirely
    /// up to the caller.
    pub fn without_exclusion() -> Self {
        Self {
            enforce_doctor_exclusion: false,
            ..Self::new()
        }
    }

    pub fn appointment_count(&self) -> usize {
        self.tables.read().appointments.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn find_patient(&self, id: PatientId) -> StoreResult<Option<Patient>> {
        Ok(self.tables.read().patients.get(&id).cloned())
    }

    async fn find_doctor(&self, id: DoctorId) -> StoreResult<Option<Doctor>> {
        Ok(self.tables.read().doctors.get(&id).cloned())
    }

    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        let mut tables = self.tables.write();
        let taken = tables
            .patients
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&patient.email));
        if taken {
            return Err(StoreError::UniqueViolation {
                constraint: PATIENT_EMAIL_CONSTRAINT.to_string(),
            });
        }

        let now = Utc::now();
        let id = next_id(&mut tables.next_patient_id);
        let record = Patient {
            id,
            first_name: patient.first_name,
            last_name: patient.last_name,
            email: patient.email,
            phone: patient.phone,
            age: patient.age,
            created_at: now,
            updated_at: now,
        };
        tables.patients.insert(id, record.clone());
        Ok(record)
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> StoreResult<Doctor> {
        let mut tables = self.tables.write();
        let id = next_id(&mut tables.next_doctor_id);
        let record = Doctor {
            id,
            full_name: doctor.full_name,
            specialty: doctor.specialty,
            active: doctor.active,
            created_at: Utc::now(),
        };
        tables.doctors.insert(id, record.clone());
        Ok(record)
    }

    async fn list_appointments(
        &self,
        doctor_id: Option<DoctorId>,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<Appointment>> {
        let tables = self.tables.read();
        let mut found: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| doctor_id.map_or(true, |id| a.doctor_id == id))
            .filter(|a| range.map_or(true, |r| r.contains(a.start_time)))
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.start_time, a.id));
        Ok(found)
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> StoreResult<Appointment> {
        let mut tables = self.tables.write();

        if self.enforce_doctor_exclusion {
            let requested = Interval::new(appointment.start_time, appointment.end_time());
            let clash = tables
                .appointments
                .values()
                .filter(|a| a.doctor_id == appointment.doctor_id)
                .any(|a| requested.overlaps(&Interval::from(a)));
            if clash {
                return Err(StoreError::UniqueViolation {
                    constraint: APPOINTMENT_OVERLAP_CONSTRAINT.to_string(),
                });
            }
        }

        let id = next_id(&mut tables.next_appointment_id);
        let record = appointment.into_appointment(id);
        tables.appointments.insert(id, record.clone());
        Ok(record)
    }
}
