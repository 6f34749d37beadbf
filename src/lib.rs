//! Core library for the tutoring-marketplace vetting service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
