pub mod booking;
pub mod bounded;
pub mod directory;
pub mod interval;
pub mod locks;

pub use crate::domain::model::{Appointment, AppointmentRequest, Doctor, Patient, TimeRange};
pub use crate::domain::ports::{Clock, RecordStore, SystemClock};
pub use crate::utils::error::Result;
