//! # Spatial Index Module
//!
//! Nearest-neighbor search over point sets, with or without periodic boundaries.
//!
//! - [`kdtree`] - A conventional k-d tree with Minkowski p-norm queries
//! - [`periodic`] - A periodic wrapper that reduces queries across orthorhombic
//!   boundaries to ordinary queries over a minimal set of mirror images
//! - [`error`] - Construction, validation and unsupported-operation errors

pub mod error;
pub mod kdtree;
pub mod periodic;
