//! # polypath Core Library
//!
//! Builds three-dimensional particle chains ("paths") used as scaffolds for
//! coarse-grained molecular structures: ordered points joined by fixed-length bonds,
//! grown either by a self-avoiding random walk or laid out by a deterministic template.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Chain`, `PeriodicBox`,
//!   `Confinement`), geometry helpers, and the periodic-boundary-aware spatial index.
//!
//! - **[`engine`]: The Logic Core.** Validated configuration, the error taxonomy,
//!   progress reporting, the candidate direction sampler, and the rejection-loop
//!   growth controller that drives a walk to completion or to a structured failure.
//!
//! - **[`workflows`]: The Public API.** Entry points that tie the layers together:
//!   [`workflows::generate::generate_chain`], the [`workflows::generate::PathStrategy`]
//!   variants, and [`workflows::generate::build_periodic_index`].

pub mod core;
pub mod engine;
pub mod workflows;
