use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error(
        "Periodic neighbor search is only implemented for orthorhombic cells, got angles {angles:?}"
    )]
    NonOrthorhombic { angles: [f64; 3] },

    #[error("Expected {expected}-dimensional points but found a {found}-dimensional one")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Only p-norms with 1 <= p <= infinity are permitted, got p = {0}")]
    InvalidNorm(f64),

    #[error("Query radius or distance bound must be a number, got {0}")]
    InvalidRadius(f64),

    #[error("Requested {0} nearest neighbors; k must be at least 1")]
    InvalidNeighborCount(usize),

    #[error("Box bounds must be finite numbers, got {0:?}")]
    InvalidBounds(Vec<f64>),

    #[error("Bond {bond:?} references a point outside a chain of {points} points")]
    InvalidBond { bond: (usize, usize), points: usize },

    #[error("'{operation}' has no established periodic semantics and is not supported")]
    NotSupported { operation: &'static str },
}

impl SpatialError {
    /// True for invalid geometry input, as opposed to an unsupported operation.
    pub fn is_configuration(&self) -> bool {
        !self.is_not_supported()
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, SpatialError::NotSupported { .. })
    }
}
