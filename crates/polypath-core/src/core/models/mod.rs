//! # Core Models Module
//!
//! Data structures describing a generated path and the space it lives in.
//!
//! - [`chain`] - Ordered coordinates plus consecutive bond pairs
//! - [`periodic_box`] - Orthorhombic box lengths with per-axis periodicity
//! - [`volume`] - Optional confining volumes for random walks

pub mod chain;
pub mod periodic_box;
pub mod volume;
