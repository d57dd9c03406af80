use crate::core::booking::BookingCoordinator;
use crate::core::directory::Directory;
use crate::domain::model::{Appointment, AppointmentRequest, Doctor, NewDoctor, NewPatient, Patient};
use crate::domain::ports::{Clock, RecordStore};
use crate::utils::error::{BookingError, ErrorClass};
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;

/// Batch document accepted by the CLI gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub patients: Vec<NewPatient>,
    #[serde(default)]
    pub doctors: Vec<NewDoctor>,
    #[serde(default)]
    pub appointments: Vec<AppointmentRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub class: ErrorClass,
    pub message: String,
}

impl From<&BookingError> for ErrorBody {
    fn from(err: &BookingError) -> Self {
        Self {
            kind: err.kind(),
            class: err.class(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayResponse<T> {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> GatewayResponse<T> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub fn respond<T>(result: Result<T, BookingError>, success_status: u16) -> GatewayResponse<T> {
    match result {
        Ok(body) => GatewayResponse {
            status: success_status,
            body: Some(body),
            error: None,
        },
        Err(err) => GatewayResponse {
            status: err.class().status_code(),
            body: None,
            error: Some(ErrorBody::from(&err)),
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub patients: Vec<GatewayResponse<Patient>>,
    pub doctors: Vec<GatewayResponse<Doctor>>,
    pub appointments: Vec<GatewayResponse<Appointment>>,
}

impl BatchReport {
    pub fn booked(&self) -> usize {
        self.appointments.iter().filter(|r| r.is_success()).count()
    }
}

pub fn parse_batch(json: &str) -> anyhow::Result<BatchRequest> {
    serde_json::from_str(json).context("batch document is not valid JSON")
}

/// Translates batch documents into core calls and core errors into
/// status-coded responses.
pub struct JsonGateway<S: RecordStore + 'static, C: Clock + 'static> {
    coordinator: Arc<BookingCoordinator<S, C>>,
    directory: Directory<S>,
}

impl<S: RecordStore + 'static, C: Clock + 'static> JsonGateway<S, C> {
    pub fn new(coordinator: Arc<BookingCoordinator<S, C>>, directory: Directory<S>) -> Self {
        Self {
            coordinator,
            directory,
        }
    }

    /// Registers directory entries in order, then submits every appointment
    /// request concurrently. Responses keep input order.
    pub async fn run_batch(&self, batch: BatchRequest) -> anyhow::Result<BatchReport> {
        let mut patients = Vec::with_capacity(batch.patients.len());
        for patient in batch.patients {
            patients.push(respond(self.directory.register_patient(patient).await, CREATED));
        }

        let mut doctors = Vec::with_capacity(batch.doctors.len());
        for doctor in batch.doctors {
            doctors.push(respond(self.directory.register_doctor(doctor).await, CREATED));
        }

        let handles: Vec<_> = batch
            .appointments
            .into_iter()
            .map(|request| {
                let coordinator = Arc::clone(&self.coordinator);
                tokio::spawn(async move { coordinator.book(request).await })
            })
            .collect();

        let mut appointments = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = handle.await.context("booking task failed")?;
            appointments.push(respond(outcome, CREATED));
        }

        Ok(BatchReport {
            patients,
            doctors,
            appointments,
        })
    }

    pub async fn list_for_date(
        &self,
        date: NaiveDate,
        doctor_id: Option<i64>,
    ) -> GatewayResponse<Vec<Appointment>> {
        respond(
            self.coordinator.list_appointments_for_date(date, doctor_id).await,
            OK,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respond_maps_conflict_to_409() {
        let response: GatewayResponse<Appointment> =
            respond(Err(BookingError::conflict(2, Some(5))), CREATED);
        assert_eq!(response.status, 409);
        let error = response.error.unwrap();
        assert_eq!(error.kind, "conflict_error");
        assert_eq!(error.class, ErrorClass::Conflict);
    }

    #[test]
    fn test_success_serialises_without_error_field() {
        let response = respond(Ok(7_u32), CREATED);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"status": 201, "body": 7}));
    }

    #[test]
    fn test_parse_batch_defaults_missing_sections() {
        let batch =
            parse_batch(r#"{"doctors": [{"full_name": "Dr. Strange", "specialty": "Magic"}]}"#)
                .unwrap();
        assert!(batch.patients.is_empty());
        assert!(batch.doctors[0].active);
        assert!(batch.appointments.is_empty());
    }
}
