//! SKIRNIR core: pressure-ulcer risk assessment scoring and the
//! delegated-credential upload workflow against the storage backend.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
