//! # Workflows Module
//!
//! High-level entry points that tie configuration, generation and progress reporting
//! together.
//!
//! - **Generation** ([`generate`]) - [`generate::generate_chain`] for the random
//!   self-avoiding walk, [`generate::PathStrategy`] to pick between the walk and the
//!   lamellae template, and [`generate::build_periodic_index`] for callers that need
//!   periodic neighbor queries over their own points.

pub mod generate;
