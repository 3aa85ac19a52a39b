use super::config::WalkConfig;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter, RejectionReason};
use super::sampler::DirectionSampler;
use crate::core::models::chain::{Bond, Chain};
use crate::core::models::periodic_box::PeriodicBox;
use crate::core::spatial::periodic::PeriodicKdTree;
use nalgebra::Point3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, instrument, trace};

/// Growth-box side per accepted move, in units of the minimum separation. Must stay
/// above 2 so unrelated points are never wrapped into collision range.
const BOX_GROWTH_FACTOR: f64 = 2.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Accept,
    Reject(RejectionReason),
}

/// Drives a self-avoiding walk from the origin to `n` accepted coordinates.
///
/// `count` is the index of the growth frontier and `count + 1` the slot holding the
/// trial candidate. Slots beyond the frontier stay at the origin until accepted, and a
/// rejected trial is reset to the origin before the next proposal.
pub(crate) struct GrowthController<'c> {
    config: &'c WalkConfig,
    sampler: DirectionSampler,
    rng: StdRng,
    coordinates: Vec<Point3<f64>>,
    bonds: Vec<Bond>,
    count: usize,
    attempts: usize,
}

impl<'c> GrowthController<'c> {
    pub fn new(config: &'c WalkConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            sampler: DirectionSampler::new(config.bond_length, config.min_angle, config.max_angle),
            rng: StdRng::seed_from_u64(config.seed),
            coordinates: vec![Point3::origin(); config.n],
            bonds: Vec::with_capacity(config.n - 1),
            count: 0,
            attempts: 0,
        })
    }

    #[instrument(skip_all, name = "random_walk", fields(n = self.config.n, seed = self.config.seed))]
    pub fn run(mut self, reporter: &ProgressReporter) -> Result<Chain, EngineError> {
        let n = self.config.n;
        info!(
            bond_length = self.config.bond_length,
            min_separation = self.config.min_separation,
            max_attempts = self.config.max_attempts,
            "Starting self-avoiding random walk."
        );
        reporter.report(Progress::TaskStart {
            total_steps: (n - 1) as u64,
        });

        // A single bond cannot overlap anything.
        self.coordinates[1] = self
            .sampler
            .first_step(&self.coordinates[0], &mut self.rng);
        self.bonds.push((0, 1));
        self.count = 1;
        reporter.report(Progress::TaskIncrement);

        while self.count < n - 1 {
            if self.attempts >= self.config.max_attempts {
                info!(
                    count = self.count,
                    attempts = self.attempts,
                    "Attempt budget exhausted."
                );
                reporter.report(Progress::Message(format!(
                    "Gave up after {} attempts with {} of {} points placed",
                    self.attempts,
                    self.count + 1,
                    n
                )));
                return Err(EngineError::GenerationExhausted {
                    count: self.count,
                    max_attempts: self.config.max_attempts,
                });
            }

            let trial = self.count + 1;
            self.coordinates[trial] = self.sampler.next_step(
                &self.coordinates[self.count],
                &self.coordinates[self.count - 1],
                &mut self.rng,
            );
            self.attempts += 1;

            match self.check_trial()? {
                Verdict::Accept => {
                    self.bonds.push((self.count, trial));
                    self.count = trial;
                    reporter.report(Progress::TaskIncrement);
                }
                Verdict::Reject(reason) => {
                    trace!(
                        count = self.count,
                        attempts = self.attempts,
                        ?reason,
                        "Rejected trial move."
                    );
                    self.coordinates[trial] = Point3::origin();
                    reporter.report(Progress::Rejected {
                        attempts: self.attempts,
                        reason,
                    });
                }
            }
        }

        reporter.report(Progress::TaskFinish);
        info!(attempts = self.attempts, "Random walk complete.");
        Ok(Chain::new(self.coordinates, self.bonds))
    }

    /// Cubic periodic box that grows with the number of accepted moves.
    fn growth_box(&self) -> PeriodicBox {
        PeriodicBox::cubic(self.count as f64 * self.config.min_separation * BOX_GROWTH_FACTOR)
    }

    fn check_trial(&self) -> Result<Verdict, EngineError> {
        let trial = self.count + 1;
        let candidate = self.coordinates[trial];

        if let Some(confinement) = &self.config.confinement {
            if !confinement.contains(&candidate, self.config.confinement_buffer()) {
                return Ok(Verdict::Reject(RejectionReason::OutsideConfinement));
            }
        }

        let index =
            PeriodicKdTree::from_positions(&self.coordinates[..=trial], &self.growth_box())?;
        let radius = self.config.min_separation - self.config.tolerance;
        let neighbors =
            index.within_radius(&[candidate.x, candidate.y, candidate.z], radius, 2.0)?;

        // The bonded predecessor sits at one bond length by construction.
        let overlaps = neighbors.iter().any(|&j| j != trial && j != self.count);
        if overlaps {
            Ok(Verdict::Reject(RejectionReason::Overlap))
        } else {
            Ok(Verdict::Accept)
        }
    }
}
