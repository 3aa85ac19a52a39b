use super::config::LamellaeConfig;
use super::error::EngineError;
use crate::core::models::chain::Chain;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;
use tracing::{debug, instrument};

/// Lays out a folded chain: straight layers along y joined by semicircular arcs.
///
/// Even layers run towards +y, odd layers back towards -y, and layer `i` sits at
/// `x = i * layer_separation`. Every point is bonded to the next.
#[instrument(skip_all, name = "lamellae_template", fields(layers = config.num_layers))]
pub(crate) fn generate(config: &LamellaeConfig) -> Result<Chain, EngineError> {
    config.validate()?;

    let steps = (config.layer_length / config.bond_length).ceil() as usize;
    let layer_offsets: Vec<f64> = (0..steps).map(|k| k as f64 * config.bond_length).collect();

    let r = config.layer_separation / 2.0;
    let arc_points = (r * PI / config.bond_length).floor() as usize;
    let arc_step = PI / (arc_points + 1) as f64;

    let mut coordinates = Vec::new();
    for layer in 0..config.num_layers {
        let x = config.layer_separation * layer as f64;
        let ascending = layer % 2 == 0;
        let mut points: Vec<Point3<f64>> = layer_offsets
            .iter()
            .map(|&y| Point3::new(x, y, 0.0))
            .collect();
        if !ascending {
            points.reverse();
        }

        let is_last = layer + 1 == config.num_layers;
        let Some(&turn_start) = points.last() else {
            continue;
        };
        coordinates.extend(points);
        if is_last {
            continue;
        }

        // Arc centre lies halfway to the next layer.
        let centre = turn_start + Vector3::new(r, 0.0, 0.0);
        let y_sign = if ascending { 1.0 } else { -1.0 };
        coordinates.extend((1..=arc_points).map(|k| {
            let theta = k as f64 * arc_step;
            centre + Vector3::new(-theta.cos(), y_sign * theta.sin(), 0.0) * r
        }));
    }

    debug!(points = coordinates.len(), "Lamellae template built.");
    Ok(Chain::linear(coordinates))
}
