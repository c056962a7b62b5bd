//! Generated entity classes and their per-read holders.

pub mod class;
pub mod extension;
pub mod holder;
