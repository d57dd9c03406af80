use crate::core::bounded::{store_call, with_timeout};
use crate::domain::model::{Doctor, DoctorId, NewDoctor, NewPatient, Patient, PatientId};
use crate::domain::ports::RecordStore;
use crate::utils::error::{BookingError, Result, StoreError};
use crate::utils::validation::is_well_formed_email;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

const MIN_DOCTOR_FIELD_LEN: usize = 2;

/// Registration and lookup of patients and doctors.
pub struct Directory<S: RecordStore> {
    store: Arc<S>,
    store_timeout: Duration,
}

impl<S: RecordStore> Directory<S> {
    pub fn new(store: Arc<S>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    #[instrument(name = "directory.register_patient", skip(self, patient), fields(email = %patient.email))]
    pub async fn register_patient(&self, patient: NewPatient) -> Result<Patient> {
        let patient = NewPatient {
            first_name: patient.first_name.trim().to_string(),
            last_name: patient.last_name.trim().to_string(),
            email: patient.email.trim().to_string(),
            phone: patient
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            age: patient.age,
        };

        if patient.first_name.is_empty() {
            return Err(BookingError::validation("first_name", "cannot be empty"));
        }
        if patient.last_name.is_empty() {
            return Err(BookingError::validation("last_name", "cannot be empty"));
        }
        if !is_well_formed_email(&patient.email) {
            return Err(BookingError::validation(
                "email",
                format!("'{}' is not a valid email address", patient.email),
            ));
        }

        let inserted = with_timeout(
            "insert_patient",
            self.store_timeout,
            self.store.insert_patient(patient),
        )
        .await?;

        match inserted {
            Ok(patient) => {
                info!(patient_id = patient.id, "patient registered");
                Ok(patient)
            }
            Err(StoreError::UniqueViolation { .. }) => Err(BookingError::validation(
                "email",
                "a patient with this email already exists",
            )),
            Err(other) => Err(other.into()),
        }
    }

    #[instrument(name = "directory.register_doctor", skip(self, doctor))]
    pub async fn register_doctor(&self, doctor: NewDoctor) -> Result<Doctor> {
        let doctor = NewDoctor {
            full_name: doctor.full_name.trim().to_string(),
            specialty: doctor.specialty.trim().to_string(),
            active: doctor.active,
        };

        if doctor.full_name.chars().count() < MIN_DOCTOR_FIELD_LEN {
            return Err(BookingError::validation(
                "full_name",
                format!("must be at least {} characters", MIN_DOCTOR_FIELD_LEN),
            ));
        }
        if doctor.specialty.chars().count() < MIN_DOCTOR_FIELD_LEN {
            return Err(BookingError::validation(
                "specialty",
                format!("must be at least {} characters", MIN_DOCTOR_FIELD_LEN),
            ));
        }

        let doctor = store_call("insert_doctor", self.store_timeout, self.store.insert_doctor(doctor)).await?;
        info!(doctor_id = doctor.id, "doctor registered");
        Ok(doctor)
    }

    pub async fn patient(&self, id: PatientId) -> Result<Patient> {
        debug!(patient_id = id, "looking up patient");
        store_call("find_patient", self.store_timeout, self.store.find_patient(id))
            .await?
            .ok_or_else(|| BookingError::patient_not_found(id))
    }

    pub async fn doctor(&self, id: DoctorId) -> Result<Doctor> {
        debug!(doctor_id = id, "looking up doctor");
        store_call("find_doctor", self.store_timeout, self.store.find_doctor(id))
            .await?
            .ok_or_else(|| BookingError::doctor_not_found(id))
    }
}
