pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliArgs;

pub use crate::adapters::{gateway::JsonGateway, memory::InMemoryStore};
pub use crate::config::{AppConfig, BookingConfig, OverlapScope};
pub use crate::core::{booking::BookingCoordinator, directory::Directory};
pub use crate::utils::error::{BookingError, ErrorClass, Result};
