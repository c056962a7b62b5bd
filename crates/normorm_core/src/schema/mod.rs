//! Schema registration, annotation and association resolution.
//!
//! # Responsibility
//! - Hold the declarative entity/association graph supplied by the host.
//! - Resolve association attributes to target entities once, at build time.
//!
//! # Invariants
//! - Everything produced here is immutable after construction.
//! - Resolution degrades to opaque associations; it never aborts generation.

pub mod annotate;
pub mod definition;
pub mod description;
pub mod node;
pub mod resolve;
