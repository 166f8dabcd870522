//! Content-store domain model.
//!
//! # Responsibility
//! - Define the resource record shared by content items and folders.
//!
//! # Invariants
//! - Every resource is identified by a stable `ResourceId`.
//! - Folder-ness is a flag on the same record, not a separate type.

pub mod resource;
