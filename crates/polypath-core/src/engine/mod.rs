//! # Engine Module
//!
//! The stateful machinery that turns a validated configuration into a finished
//! [`Chain`](crate::core::models::chain::Chain).
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Walk and template parameters, builders and validation
//! - **Error Handling** ([`error`]) - The engine error taxonomy
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Sampling** ([`sampler`]) - Candidate positions under bond length and angle constraints
//! - **Growth** ([`growth`]) - The rejection loop driving a self-avoiding walk
//! - **Templates** ([`lamellae`]) - Deterministic lamellar layouts
//!
//! ## Determinism
//!
//! Every walk owns its random stream, seeded from its configuration. Two walks with
//! identical parameters produce identical coordinates, and independent walks may run
//! concurrently without sharing any state.

pub mod config;
pub mod error;
pub(crate) mod growth;
pub(crate) mod lamellae;
pub mod progress;
pub(crate) mod sampler;
