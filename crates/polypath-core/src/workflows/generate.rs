use crate::core::models::chain::Chain;
use crate::core::spatial::error::SpatialError;
use crate::core::spatial::periodic::PeriodicKdTree;
use crate::engine::config::{LamellaeConfig, WalkConfig, WalkConfigBuilder};
use crate::engine::error::EngineError;
use crate::engine::growth::GrowthController;
use crate::engine::lamellae;
use crate::engine::progress::{Progress, ProgressReporter};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// How the coordinates of a chain are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum PathStrategy {
    RandomWalk(WalkConfig),
    Lamellae(LamellaeConfig),
}

impl PathStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            PathStrategy::RandomWalk(_) => "Random walk",
            PathStrategy::Lamellae(_) => "Lamellae",
        }
    }

    #[instrument(skip_all, name = "generate_workflow", fields(strategy = self.name()))]
    pub fn generate(&self, reporter: &ProgressReporter) -> Result<Chain, EngineError> {
        reporter.report(Progress::PhaseStart { name: self.name() });
        let chain = match self {
            PathStrategy::RandomWalk(config) => GrowthController::new(config)?.run(reporter),
            PathStrategy::Lamellae(config) => lamellae::generate(config),
        }?;
        reporter.report(Progress::PhaseFinish);
        info!(points = chain.len(), "Chain generation complete.");
        Ok(chain)
    }
}

/// Grows a self-avoiding random walk of `n` points starting at the origin.
///
/// Consecutive points are `bond_length` apart, every bend angle lies within
/// `[min_angle, max_angle]` (radians), and no two non-adjacent points come closer
/// than `min_separation`. The walk is fully determined by `seed`.
///
/// # Errors
///
/// Returns [`EngineError::Configuration`] for invalid parameters and
/// [`EngineError::GenerationExhausted`] when `max_attempts` proposals are spent
/// before the chain is complete.
pub fn generate_chain(
    n: usize,
    bond_length: f64,
    min_separation: f64,
    min_angle: f64,
    max_angle: f64,
    max_attempts: usize,
    seed: u64,
) -> Result<Chain, EngineError> {
    let config = WalkConfigBuilder::new()
        .n(n)
        .bond_length(bond_length)
        .min_separation(min_separation)
        .min_angle(min_angle)
        .max_angle(max_angle)
        .max_attempts(max_attempts)
        .seed(seed)
        .build()?;
    PathStrategy::RandomWalk(config).generate(&ProgressReporter::new())
}

/// Builds a periodic spatial index over `points`.
///
/// `box_lengths` and `periodic_flags` give one entry per axis; an axis that is not
/// periodic, or whose length is not positive, is searched without images.
pub fn build_periodic_index<P: AsRef<[f64]>>(
    points: &[P],
    box_lengths: &[f64],
    periodic_flags: &[bool],
) -> Result<PeriodicKdTree, SpatialError> {
    PeriodicKdTree::with_periodicity(points, box_lengths, periodic_flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{ConfigError, LamellaeConfigBuilder};
    use std::sync::Mutex;

    const TOLERANCE: f64 = 1e-5;

    fn scenario(seed: u64) -> Result<Chain, EngineError> {
        generate_chain(5, 1.0, 0.9, 1.0, 2.0, 1000, seed)
    }

    fn assert_walk_invariants(chain: &Chain, config: &WalkConfig) {
        let bonded = chain.coordinates().len() - 1;
        assert_eq!(chain.bonds().len(), bonded);
        for length in chain.bond_lengths() {
            assert!(
                (length - config.bond_length).abs() < TOLERANCE,
                "bond length {length}"
            );
        }
        let angles = config.min_angle - TOLERANCE..=config.max_angle + TOLERANCE;
        for angle in chain.bond_angles() {
            assert!(angles.contains(&angle), "bend angle {angle}");
        }
        let closest = chain.min_nonbonded_distance(None).unwrap();
        assert!(
            closest >= config.min_separation - config.tolerance,
            "non-bonded distance {closest}"
        );
    }

    fn walk_config(
        n: usize,
        min_angle: f64,
        max_angle: f64,
        attempts: usize,
        seed: u64,
    ) -> WalkConfig {
        WalkConfigBuilder::new()
            .n(n)
            .bond_length(1.0)
            .min_separation(0.9)
            .min_angle(min_angle)
            .max_angle(max_angle)
            .max_attempts(attempts)
            .seed(seed)
            .build()
            .unwrap()
    }

    #[test]
    fn reference_walk_satisfies_all_invariants() {
        let chain = scenario(24).unwrap();
        assert_eq!(chain.len(), 5);
        assert_eq!(chain.bonds(), &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        assert_walk_invariants(&chain, &walk_config(5, 1.0, 2.0, 1000, 24));
    }

    #[test]
    fn long_walks_satisfy_all_invariants_across_seeds() {
        for seed in 0..20 {
            let config = walk_config(80, 1.0, 2.0, 10_000, seed);
            let chain = PathStrategy::RandomWalk(config.clone())
                .generate(&ProgressReporter::new())
                .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
            assert_eq!(chain.len(), 80);
            assert_walk_invariants(&chain, &config);
        }
    }

    #[test]
    fn walks_with_frequent_reversals_stay_self_avoiding() {
        for seed in 0..5 {
            let rejections = Mutex::new(0usize);
            let reporter = ProgressReporter::with_callback(Box::new(|event| {
                if let Progress::Rejected { .. } = event {
                    *rejections.lock().unwrap() += 1;
                }
            }));
            // Bends up to 3 rad fold the chain back onto itself.
            let config = walk_config(40, 0.0, 3.0, 100_000, seed);
            let chain = PathStrategy::RandomWalk(config.clone())
                .generate(&reporter)
                .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
            drop(reporter);

            assert!(rejections.into_inner().unwrap() > 0, "seed {seed} never rejected");
            assert_eq!(chain.len(), 40);
            assert_walk_invariants(&chain, &config);
        }
    }

    #[test]
    fn same_seed_reproduces_the_walk_exactly() {
        let first = scenario(24).unwrap();
        let second = scenario(24).unwrap();
        let bits = |chain: &Chain| -> Vec<u64> {
            chain
                .coordinates()
                .iter()
                .flat_map(|p| p.coords.iter().map(|c| c.to_bits()).collect::<Vec<_>>())
                .collect()
        };
        assert_eq!(bits(&first), bits(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_produce_different_walks() {
        assert_ne!(scenario(24).unwrap(), scenario(25).unwrap());
    }

    #[test]
    fn exhausted_budget_reports_partial_progress() {
        let err = generate_chain(5, 1.0, 0.9, 1.0, 2.0, 0, 24).unwrap_err();
        assert_eq!(
            err,
            EngineError::GenerationExhausted {
                count: 1,
                max_attempts: 0
            }
        );
        assert_eq!(err.partial_count(), Some(1));
    }

    #[test]
    fn invalid_parameters_are_configuration_errors() {
        let err = generate_chain(1, 1.0, 0.9, 1.0, 2.0, 1000, 24).unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(
            err,
            EngineError::Configuration(ConfigError::TooFewPoints(1))
        ));

        let err = generate_chain(5, 1.0, 0.9, 2.0, 1.0, 1000, 24).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn strategy_reports_phase_boundaries() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if matches!(event, Progress::PhaseStart { .. } | Progress::PhaseFinish) {
                events.lock().unwrap().push(event);
            }
        }));
        let config = LamellaeConfigBuilder::new()
            .num_layers(2)
            .layer_separation(2.0)
            .layer_length(3.0)
            .bond_length(1.0)
            .build()
            .unwrap();
        let chain = PathStrategy::Lamellae(config).generate(&reporter).unwrap();
        drop(reporter);

        assert_eq!(chain.len(), 9);
        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                Progress::PhaseStart { name: "Lamellae" },
                Progress::PhaseFinish
            ]
        );
    }

    #[test]
    fn strategy_round_trips_through_toml() {
        let config = LamellaeConfigBuilder::new()
            .num_layers(3)
            .layer_separation(1.5)
            .layer_length(4.0)
            .bond_length(0.5)
            .build()
            .unwrap();
        let strategy = PathStrategy::Lamellae(config);
        let text = toml::to_string(&strategy).unwrap();
        assert!(text.contains("strategy = \"lamellae\""));
        let parsed: PathStrategy = toml::from_str(&text).unwrap();
        assert_eq!(parsed, strategy);
    }

    #[test]
    fn periodic_index_finds_neighbors_across_the_boundary() {
        let points = vec![[0.1, 5.0, 5.0], [9.9, 5.0, 5.0], [5.0, 5.0, 5.0]];
        let index = build_periodic_index(&points, &[10.0, 10.0, 10.0], &[true, true, true])
            .unwrap();

        let found = index.within_radius(&[0.1, 5.0, 5.0], 0.5, 2.0).unwrap();
        assert_eq!(found, vec![0, 1]);

        let result = index.nearest(&[0.1, 5.0, 5.0], 2, 2.0, f64::INFINITY).unwrap();
        assert_eq!(result.indices, vec![0, 1]);
        assert!((result.distances[1] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn non_periodic_index_ignores_images() {
        let points = vec![[0.1, 5.0, 5.0], [9.9, 5.0, 5.0]];
        let index = build_periodic_index(&points, &[10.0, 10.0, 10.0], &[false, false, false])
            .unwrap();
        let found = index.within_radius(&[0.1, 5.0, 5.0], 0.5, 2.0).unwrap();
        assert_eq!(found, vec![0]);
    }

    #[test]
    fn mismatched_flags_are_rejected() {
        let points = vec![[0.0, 0.0, 0.0]];
        let err = build_periodic_index(&points, &[10.0, 10.0, 10.0], &[true, true]).unwrap_err();
        assert!(err.is_configuration());
    }
}
