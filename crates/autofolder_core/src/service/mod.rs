//! Save-hook use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into the date-folder placement use case.
//! - Keep the hook decoupled from storage details via `ResourceStore`.

pub mod autofolder_service;
pub mod date_field;
pub mod materializer;
