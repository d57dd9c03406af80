//! Half-open interval arithmetic for doctor schedules.
//!
//! All intervals are compared in UTC. Two intervals `[s1, e1)` and `[s2, e2)`
//! overlap iff `s1 < e2 && s2 < e1`, so a booking that ends exactly when the
//! next one starts does not conflict.

use crate::domain::model::{Appointment, TimeRange};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn from_duration(start: DateTime<Utc>, minutes: u32) -> Self {
        Self {
            start,
            end: start + Duration::minutes(i64::from(minutes)),
        }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl From<&Appointment> for Interval {
    fn from(appointment: &Appointment) -> Self {
        Interval::from_duration(appointment.start_time, appointment.duration_minutes)
    }
}

/// Normalise an offset-carrying instant to UTC.
pub fn to_utc<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Utc> {
    instant.with_timezone(&Utc)
}

/// Values read back without offset information are taken to be UTC already.
pub fn naive_as_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    naive.and_utc()
}

pub fn conflicts<I>(candidate: &Interval, existing: I) -> bool
where
    I: IntoIterator<Item = Interval>,
{
    existing.into_iter().any(|interval| candidate.overlaps(&interval))
}

/// First booking in `existing` that overlaps `candidate`.
pub fn find_conflict<'a>(
    candidate: &Interval,
    existing: &'a [Appointment],
) -> Option<&'a Appointment> {
    existing.iter().find(|appointment| {
        let booked = Interval::from(*appointment);
        let hit = candidate.overlaps(&booked);
        tracing::trace!(
            appointment_id = appointment.id,
            existing_start = %booked.start,
            existing_end = %booked.end,
            new_start = %candidate.start,
            new_end = %candidate.end,
            overlap = hit,
            "overlap check"
        );
        hit
    })
}

/// `[date 00:00 UTC, date+1 00:00 UTC)`.
pub fn day_bounds_utc(date: NaiveDate) -> TimeRange {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    TimeRange::new(start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 4, hour, minute, 0).unwrap()
    }

    fn appointment(id: i64, start: DateTime<Utc>, minutes: u32) -> Appointment {
        Appointment {
            id,
            patient_id: 1,
            doctor_id: 1,
            reason: None,
            start_time: start,
            duration_minutes: minutes,
        }
    }

    #[test]
    fn test_empty_schedule_never_conflicts() {
        let candidate = Interval::new(at(10, 0), at(11, 0));
        assert!(!conflicts(&candidate, Vec::new()));
    }

    #[test]
    fn test_interval_conflicts_with_itself() {
        let candidate = Interval::new(at(10, 0), at(11, 0));
        assert!(conflicts(&candidate, [candidate]));
    }

    #[test]
    fn test_touching_boundaries_do_not_conflict() {
        let morning = Interval::new(at(9, 0), at(10, 0));
        let next = Interval::new(at(10, 0), at(10, 30));
        assert!(!morning.overlaps(&next));
        assert!(!next.overlaps(&morning));
    }

    #[test]
    fn test_partial_and_containing_overlaps() {
        let booked = Interval::new(at(10, 0), at(11, 0));
        assert!(Interval::new(at(10, 30), at(11, 30)).overlaps(&booked));
        assert!(Interval::new(at(9, 30), at(10, 1)).overlaps(&booked));
        assert!(Interval::new(at(10, 15), at(10, 45)).overlaps(&booked));
        assert!(Interval::new(at(9, 0), at(12, 0)).overlaps(&booked));
        assert!(!Interval::new(at(11, 0), at(11, 30)).overlaps(&booked));
    }

    #[test]
    fn test_find_conflict_reports_first_hit() {
        let schedule = vec![
            appointment(1, at(8, 0), 60),
            appointment(2, at(10, 0), 60),
            appointment(3, at(10, 30), 30),
        ];
        let candidate = Interval::from_duration(at(10, 15), 30);
        assert_eq!(find_conflict(&candidate, &schedule).map(|a| a.id), Some(2));

        let free = Interval::from_duration(at(9, 0), 60);
        assert!(find_conflict(&free, &schedule).is_none());
    }

    #[test]
    fn test_offsets_normalise_before_comparison() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = plus_two.with_ymd_and_hms(2030, 3, 4, 12, 30, 0).unwrap();
        let candidate = Interval::from_duration(to_utc(&local), 30);
        let booked = Interval::new(at(10, 0), at(11, 0));
        assert_eq!(candidate.start, at(10, 30));
        assert!(candidate.overlaps(&booked));
    }

    #[test]
    fn test_naive_values_are_read_as_utc() {
        let naive = NaiveDate::from_ymd_opt(2030, 3, 4)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(naive_as_utc(naive), at(10, 0));
    }

    #[test]
    fn test_day_bounds_cover_one_utc_day() {
        let bounds = day_bounds_utc(NaiveDate::from_ymd_opt(2030, 3, 4).unwrap());
        assert_eq!(bounds.start, at(0, 0));
        assert_eq!(bounds.end, Some(at(0, 0) + Duration::days(1)));
    }
}
