use crate::core::models::volume::Confinement;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;
pub const DEFAULT_SEED: u64 = 24;
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("A chain needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("Bond length must be positive, got {0}")]
    NonPositiveBondLength(f64),

    #[error("Minimum separation must be non-negative, got {0}")]
    NegativeSeparation(f64),

    #[error("Overlap tolerance must be non-negative, got {0}")]
    NegativeTolerance(f64),

    #[error(
        "Bond angles must satisfy 0 <= min_angle <= max_angle <= pi (radians), got [{min_angle}, {max_angle}]"
    )]
    InvalidAngleRange { min_angle: f64, max_angle: f64 },

    #[error("The walk starts at the origin, which lies outside the confining volume")]
    OriginOutsideConfinement,

    #[error("Invalid lamellae parameters: {0}")]
    InvalidLamellae(String),
}

/// Parameters of a hard-sphere self-avoiding random walk.
///
/// Angles are in radians and bound the angle between consecutive bond vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WalkConfig {
    pub n: usize,
    pub bond_length: f64,
    pub min_separation: f64,
    pub min_angle: f64,
    pub max_angle: f64,
    pub max_attempts: usize,
    pub seed: u64,
    pub tolerance: f64,
    #[serde(default)]
    pub confinement: Option<Confinement>,
}

impl WalkConfig {
    /// Radius of the buffer keeping accepted points away from a confining wall.
    pub fn confinement_buffer(&self) -> f64 {
        self.min_separation / 2.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n < 2 {
            return Err(ConfigError::TooFewPoints(self.n));
        }
        if !(self.bond_length > 0.0 && self.bond_length.is_finite()) {
            return Err(ConfigError::NonPositiveBondLength(self.bond_length));
        }
        if !(self.min_separation >= 0.0 && self.min_separation.is_finite()) {
            return Err(ConfigError::NegativeSeparation(self.min_separation));
        }
        if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            return Err(ConfigError::NegativeTolerance(self.tolerance));
        }
        let angles_ok =
            0.0 <= self.min_angle && self.min_angle <= self.max_angle && self.max_angle <= PI;
        if !angles_ok {
            return Err(ConfigError::InvalidAngleRange {
                min_angle: self.min_angle,
                max_angle: self.max_angle,
            });
        }
        if let Some(confinement) = &self.confinement {
            if !confinement.contains(&Point3::origin(), self.confinement_buffer()) {
                return Err(ConfigError::OriginOutsideConfinement);
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct WalkConfigBuilder {
    n: Option<usize>,
    bond_length: Option<f64>,
    min_separation: Option<f64>,
    min_angle: Option<f64>,
    max_angle: Option<f64>,
    max_attempts: Option<usize>,
    seed: Option<u64>,
    tolerance: Option<f64>,
    confinement: Option<Confinement>,
}

impl WalkConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n(mut self, n: usize) -> Self {
        self.n = Some(n);
        self
    }
    pub fn bond_length(mut self, length: f64) -> Self {
        self.bond_length = Some(length);
        self
    }
    pub fn min_separation(mut self, separation: f64) -> Self {
        self.min_separation = Some(separation);
        self
    }
    pub fn min_angle(mut self, radians: f64) -> Self {
        self.min_angle = Some(radians);
        self
    }
    pub fn max_angle(mut self, radians: f64) -> Self {
        self.max_angle = Some(radians);
        self
    }
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
    pub fn confinement(mut self, confinement: Option<Confinement>) -> Self {
        self.confinement = confinement;
        self
    }

    pub fn build(self) -> Result<WalkConfig, ConfigError> {
        let config = WalkConfig {
            n: self.n.ok_or(ConfigError::MissingParameter("n"))?,
            bond_length: self
                .bond_length
                .ok_or(ConfigError::MissingParameter("bond_length"))?,
            min_separation: self
                .min_separation
                .ok_or(ConfigError::MissingParameter("min_separation"))?,
            min_angle: self
                .min_angle
                .ok_or(ConfigError::MissingParameter("min_angle"))?,
            max_angle: self
                .max_angle
                .ok_or(ConfigError::MissingParameter("max_angle"))?,
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            tolerance: self.tolerance.unwrap_or(DEFAULT_TOLERANCE),
            confinement: self.confinement,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Parameters of a lamellar (folded, layer-by-layer) template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LamellaeConfig {
    pub num_layers: usize,
    pub layer_separation: f64,
    pub layer_length: f64,
    pub bond_length: f64,
}

impl LamellaeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_layers == 0 {
            return Err(ConfigError::InvalidLamellae(
                "at least one layer is required".to_string(),
            ));
        }
        if !(self.bond_length > 0.0 && self.bond_length.is_finite()) {
            return Err(ConfigError::NonPositiveBondLength(self.bond_length));
        }
        if !(self.layer_separation > 0.0 && self.layer_separation.is_finite()) {
            return Err(ConfigError::InvalidLamellae(format!(
                "layer separation must be positive, got {}",
                self.layer_separation
            )));
        }
        if !(self.layer_length > 0.0 && self.layer_length.is_finite()) {
            return Err(ConfigError::InvalidLamellae(format!(
                "layer length must be positive, got {}",
                self.layer_length
            )));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct LamellaeConfigBuilder {
    num_layers: Option<usize>,
    layer_separation: Option<f64>,
    layer_length: Option<f64>,
    bond_length: Option<f64>,
}

impl LamellaeConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_layers(mut self, layers: usize) -> Self {
        self.num_layers = Some(layers);
        self
    }
    pub fn layer_separation(mut self, separation: f64) -> Self {
        self.layer_separation = Some(separation);
        self
    }
    pub fn layer_length(mut self, length: f64) -> Self {
        self.layer_length = Some(length);
        self
    }
    pub fn bond_length(mut self, length: f64) -> Self {
        self.bond_length = Some(length);
        self
    }

    pub fn build(self) -> Result<LamellaeConfig, ConfigError> {
        let config = LamellaeConfig {
            num_layers: self
                .num_layers
                .ok_or(ConfigError::MissingParameter("num_layers"))?,
            layer_separation: self
                .layer_separation
                .ok_or(ConfigError::MissingParameter("layer_separation"))?,
            layer_length: self
                .layer_length
                .ok_or(ConfigError::MissingParameter("layer_length"))?,
            bond_length: self
                .bond_length
                .ok_or(ConfigError::MissingParameter("bond_length"))?,
        };
        config.validate()?;
        Ok(config)
    }
}
