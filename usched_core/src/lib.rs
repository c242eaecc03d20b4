#![forbid(unsafe_code)]

//! Core domain model and allocation logic for USched homebase assignment.
//!
//! This crate provides:
//! - Domain types (sections, rooms, assignments)
//! - Section and room catalogs
//! - The greedy allocation engine
//! - The assignment store and the service wrapping it
//! - Presentation formatting and CSV export

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod engine;
pub mod store;
pub mod format;
pub mod export;
pub mod service;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use engine::{allocate, Eligibility};
pub use store::AssignmentStore;
pub use format::{DisplayRecord, SectionOverview};
pub use service::{AllocationResponse, AllocationService, ResetResponse, StatusResponse};
