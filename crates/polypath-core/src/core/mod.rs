//! # Core Module
//!
//! Stateless building blocks shared by every path generation strategy.
//!
//! - **Models** ([`models`]) - The generated [`models::chain::Chain`], the simulation
//!   [`models::periodic_box::PeriodicBox`], and optional volume confinements
//! - **Spatial Index** ([`spatial`]) - A k-d tree and its periodic wrapper answering
//!   nearest-neighbor and radius queries across orthorhombic periodic boundaries
//! - **Utilities** ([`utils`]) - Small geometric helpers (norms, wrapping, angles)

pub mod models;
pub mod spatial;
pub mod utils;
