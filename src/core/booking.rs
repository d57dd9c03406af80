use crate::config::{BookingConfig, OverlapScope};
use crate::core::bounded::{store_call, with_timeout};
use crate::core::interval::{day_bounds_utc, find_conflict, to_utc, Interval};
use crate::core::locks::DoctorLocks;
use crate::domain::model::{
    Appointment, AppointmentRequest, DoctorId, NewAppointment, TimeRange,
};
use crate::domain::ports::{Clock, RecordStore, SystemClock};
use crate::utils::error::{BookingError, Result, StoreError};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Validates booking requests and commits them so that no doctor is ever
/// double-booked.
///
/// The overlap check and the insert run while holding the doctor's lock, so
/// two requests for the same doctor are serialised while different doctors
/// proceed in parallel.
pub struct BookingCoordinator<S: RecordStore, C: Clock = SystemClock> {
    store: Arc<S>,
    clock: C,
    locks: DoctorLocks,
    config: BookingConfig,
}

impl<S: RecordStore> BookingCoordinator<S, SystemClock> {
    pub fn new(store: Arc<S>, config: BookingConfig) -> Self {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S: RecordStore, C: Clock> BookingCoordinator<S, C> {
    pub fn with_clock(store: Arc<S>, clock: C, config: BookingConfig) -> Self {
        Self {
            store,
            clock,
            locks: DoctorLocks::new(),
            config,
        }
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    #[instrument(
        name = "booking.book",
        skip(self, request),
        fields(patient_id = request.patient_id, doctor_id = request.doctor_id)
    )]
    pub async fn book(&self, request: AppointmentRequest) -> Result<Appointment> {
        // One reading of the clock for the whole attempt.
        let now = self.clock.now();

        let candidate = self.validate(&request, now).inspect_err(|e| {
            info!(error = %e, "booking rejected during validation");
        })?;
        self.ensure_referents(&candidate).await?;
        debug!(start = %candidate.start_time, "request validated");

        let _guard = self
            .locks
            .acquire(candidate.doctor_id, self.config.lock_timeout())
            .await?;

        let mut retried = false;
        loop {
            self.ensure_slot_free(&candidate, now).await?;

            let inserted = with_timeout(
                "insert_appointment",
                self.config.store_timeout(),
                self.store.insert_appointment(candidate.clone()),
            )
            .await?;

            match inserted {
                Ok(appointment) => {
                    info!(appointment_id = appointment.id, "appointment committed");
                    return Ok(appointment);
                }
                Err(StoreError::UniqueViolation { constraint }) if !retried => {
                    warn!(%constraint, "store rejected insert, re-checking overlap once");
                    retried = true;
                }
                Err(StoreError::UniqueViolation { constraint }) => {
                    warn!(%constraint, "store rejected insert after re-check");
                    return Err(BookingError::conflict(candidate.doctor_id, None));
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    /// Structural and temporal checks. Nothing is read from the store here.
    pub fn validate(&self, request: &AppointmentRequest, now: DateTime<Utc>) -> Result<NewAppointment> {
        let min = i64::from(self.config.min_duration_minutes);
        let max = i64::from(self.config.max_duration_minutes);
        if request.duration_minutes < min || request.duration_minutes > max {
            return Err(BookingError::validation(
                "duration_minutes",
                format!("must be between {} and {} minutes", min, max),
            ));
        }
        let duration_minutes = u32::try_from(request.duration_minutes).map_err(|_| {
            BookingError::validation("duration_minutes", "out of range")
        })?;

        if request.patient_id <= 0 {
            return Err(BookingError::validation("patient_id", "must be a positive integer"));
        }
        if request.doctor_id <= 0 {
            return Err(BookingError::validation("doctor_id", "must be a positive integer"));
        }

        let start_time = parse_start_time(&request.start_time)?;

        let reason = match request.reason.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) if text.chars().count() > self.config.max_reason_length => {
                return Err(BookingError::validation(
                    "reason",
                    format!("must be at most {} characters", self.config.max_reason_length),
                ));
            }
            Some(text) => Some(text.to_string()),
        };

        if start_time <= now {
            return Err(BookingError::validation(
                "start_time",
                "appointment must be scheduled in the future",
            ));
        }

        Ok(NewAppointment {
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            reason,
            start_time,
            duration_minutes,
        })
    }

    async fn ensure_referents(&self, candidate: &NewAppointment) -> Result<()> {
        let timeout = self.config.store_timeout();

        store_call("find_patient", timeout, self.store.find_patient(candidate.patient_id))
            .await?
            .ok_or_else(|| BookingError::patient_not_found(candidate.patient_id))?;

        store_call("find_doctor", timeout, self.store.find_doctor(candidate.doctor_id))
            .await?
            .ok_or_else(|| BookingError::doctor_not_found(candidate.doctor_id))?;

        Ok(())
    }

    async fn ensure_slot_free(&self, candidate: &NewAppointment, now: DateTime<Utc>) -> Result<()> {
        let window = match self.config.overlap_scope {
            OverlapScope::All => None,
            OverlapScope::Upcoming => Some(TimeRange::starting_at(
                now - Duration::minutes(i64::from(self.config.max_duration_minutes)),
            )),
        };

        let existing = store_call(
            "list_appointments",
            self.config.store_timeout(),
            self.store.list_appointments(Some(candidate.doctor_id), window),
        )
        .await?;

        let requested = Interval::new(candidate.start_time, candidate.end_time());
        if let Some(clash) = find_conflict(&requested, &existing) {
            info!(existing_id = clash.id, "slot already taken");
            return Err(BookingError::conflict(candidate.doctor_id, Some(clash.id)));
        }
        debug!(checked = existing.len(), "no overlapping appointment");
        Ok(())
    }

    /// Appointments starting within the UTC day of `date`.
    #[instrument(name = "booking.list_for_date", skip(self))]
    pub async fn list_appointments_for_date(
        &self,
        date: NaiveDate,
        doctor_id: Option<DoctorId>,
    ) -> Result<Vec<Appointment>> {
        if let Some(id) = doctor_id {
            if id <= 0 {
                return Err(BookingError::validation("doctor_id", "must be a positive integer"));
            }
        }

        store_call(
            "list_appointments",
            self.config.store_timeout(),
            self.store.list_appointments(doctor_id, Some(day_bounds_utc(date))),
        )
        .await
    }

    pub async fn appointments_for_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Appointment>> {
        store_call(
            "list_appointments",
            self.config.store_timeout(),
            self.store.list_appointments(Some(doctor_id), None),
        )
        .await
    }
}

/// Parse an RFC 3339 start time and normalise it to UTC.
pub fn parse_start_time(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(to_utc(&parsed));
    }

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(raw, format).is_ok());
    if naive {
        return Err(BookingError::validation(
            "start_time",
            "start_time must include timezone information",
        ));
    }

    Err(BookingError::validation(
        "start_time",
        "start_time must be an RFC 3339 timestamp",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use chrono::TimeZone;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn coordinator() -> BookingCoordinator<InMemoryStore, FixedClock> {
        let now = Utc.with_ymd_and_hms(2030, 5, 1, 8, 0, 0).unwrap();
        BookingCoordinator::with_clock(
            Arc::new(InMemoryStore::new()),
            FixedClock(now),
            BookingConfig::default(),
        )
    }

    fn request(start: &str, minutes: i64) -> AppointmentRequest {
        AppointmentRequest {
            patient_id: 1,
            doctor_id: 1,
            reason: Some("  Checkup ".to_string()),
            start_time: start.to_string(),
            duration_minutes: minutes,
        }
    }

    fn now(coordinator: &BookingCoordinator<InMemoryStore, FixedClock>) -> DateTime<Utc> {
        coordinator.clock.now()
    }

    #[test]
    fn test_validate_normalises_offset_and_trims_reason() {
        let c = coordinator();
        let validated = c
            .validate(&request("2030-05-01T12:00:00+02:00", 30), now(&c))
            .unwrap();
        assert_eq!(
            validated.start_time,
            Utc.with_ymd_and_hms(2030, 5, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(validated.reason.as_deref(), Some("Checkup"));
        assert_eq!(validated.duration_minutes, 30);
    }

    #[test]
    fn test_duration_bounds_are_inclusive() {
        let c = coordinator();
        let at = "2030-05-01T10:00:00Z";
        assert!(c.validate(&request(at, 15), now(&c)).is_ok());
        assert!(c.validate(&request(at, 180), now(&c)).is_ok());
        assert!(c.validate(&request(at, 14), now(&c)).is_err());
        assert!(c.validate(&request(at, 181), now(&c)).is_err());
        assert!(c.validate(&request(at, -30), now(&c)).is_err());
    }

    #[test]
    fn test_non_positive_ids_are_rejected() {
        let c = coordinator();
        let mut bad = request("2030-05-01T10:00:00Z", 30);
        bad.doctor_id = 0;
        assert!(matches!(
            c.validate(&bad, now(&c)),
            Err(BookingError::Validation { ref field, .. }) if field == "doctor_id"
        ));
    }

    #[test]
    fn test_start_equal_to_now_is_not_future() {
        let c = coordinator();
        let result = c.validate(&request("2030-05-01T08:00:00Z", 30), now(&c));
        assert!(matches!(
            result,
            Err(BookingError::Validation { ref field, .. }) if field == "start_time"
        ));
    }

    #[test]
    fn test_blank_reason_is_absent_and_long_reason_rejected() {
        let c = coordinator();
        let mut blank = request("2030-05-01T10:00:00Z", 30);
        blank.reason = Some("   ".to_string());
        assert_eq!(c.validate(&blank, now(&c)).unwrap().reason, None);

        let mut long = request("2030-05-01T10:00:00Z", 30);
        long.reason = Some("x".repeat(201));
        assert!(c.validate(&long, now(&c)).is_err());
    }

    #[test]
    fn test_parse_start_time_requires_offset() {
        let missing = parse_start_time("2030-05-01T10:00:00").unwrap_err();
        assert_eq!(
            missing,
            BookingError::validation("start_time", "start_time must include timezone information")
        );

        let garbage = parse_start_time("next tuesday").unwrap_err();
        assert!(garbage.to_string().contains("RFC 3339"));

        assert!(parse_start_time("2030-05-01T10:00:00.250-05:00").is_ok());
    }
}
