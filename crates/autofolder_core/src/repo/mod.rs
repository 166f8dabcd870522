//! Content-store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the narrow store capability set the save hook depends on.
//! - Isolate SQLite query details from hook orchestration.
//!
//! # Invariants
//! - Store APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod resource_repo;
