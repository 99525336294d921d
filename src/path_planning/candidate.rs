//! Candidate extension evaluation under a planning-cycle budget
//!
//! One evaluation is the inner step of the external tree search:
//! sample a target, simulate a connection toward it, reject it when it runs
//! off course, and score it. The budget is checked between evaluations only;
//! the primitives themselves never block.

use log::{debug, trace};
use ordered_float::OrderedFloat;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::common::{KinematicState, PlanningError, PlanningResult, Pose2D};
use crate::mapping::MapHandler;
use crate::path_planning::Trajectory;
use crate::vehicle::VehicleModel;

/// Deadline and cancellation flag of one planning cycle
///
/// Clones share the cancellation flag, so a clone handed to another thread
/// can abort the cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleBudget {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CycleBudget {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// Ok while the cycle may continue
    pub fn check(&self) -> PlanningResult<()> {
        if self.is_cancelled() {
            Err(PlanningError::Cancelled)
        } else if self.is_expired() {
            Err(PlanningError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}

/// An accepted, scored extension
#[derive(Debug, Clone)]
pub struct Candidate {
    pub target: Pose2D,
    pub trajectory: Trajectory<KinematicState>,
    pub cost: f64,
}

/// Result of a batch of evaluations
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub candidates: Vec<Candidate>,
    /// Connections rejected as off course or empty
    pub rejected: usize,
    /// Why the batch stopped early, if it did
    pub interrupted: Option<PlanningError>,
}

impl BatchOutcome {
    /// Lowest-cost candidate
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.iter().min_by_key(|c| OrderedFloat(c.cost))
    }
}

/// Runs sample -> simulate -> off-course -> cost against one map and vehicle
pub struct CandidateEvaluator<'a> {
    map: &'a mut MapHandler,
    vehicle: &'a VehicleModel,
}

impl<'a> CandidateEvaluator<'a> {
    pub fn new(map: &'a mut MapHandler, vehicle: &'a VehicleModel) -> Self {
        Self { map, vehicle }
    }

    /// Connect `start` to `target`; `None` when the connection is empty or off course
    pub fn evaluate(&mut self, start: &Pose2D, target: &Pose2D) -> PlanningResult<Option<Candidate>> {
        let trajectory = self.vehicle.simulate(start, target)?;
        if trajectory.is_empty() || self.map.is_off_course(&trajectory) {
            return Ok(None);
        }
        let cost = self.vehicle.cost(&trajectory);
        Ok(Some(Candidate {
            target: *target,
            trajectory,
            cost,
        }))
    }

    /// Evaluate toward a freshly sampled target
    pub fn extend<R: Rng + ?Sized>(
        &mut self,
        start: &Pose2D,
        rng: &mut R,
    ) -> PlanningResult<Option<Candidate>> {
        let target = self.map.sample_state(rng);
        self.evaluate(start, &target)
    }

    /// Up to `count` extensions from `start`
    ///
    /// Stops early, keeping what was gathered, when the budget runs out.
    /// Configuration errors abort the whole batch.
    pub fn evaluate_batch<R: Rng + ?Sized>(
        &mut self,
        start: &Pose2D,
        count: usize,
        budget: &CycleBudget,
        rng: &mut R,
    ) -> PlanningResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for _ in 0..count {
            if let Err(e) = budget.check() {
                debug!(
                    "[CandidateEvaluator] stopping after {} candidates: {}",
                    outcome.candidates.len(),
                    e
                );
                outcome.interrupted = Some(e);
                break;
            }
            match self.extend(start, rng)? {
                Some(candidate) => outcome.candidates.push(candidate),
                None => outcome.rejected += 1,
            }
        }
        trace!(
            "[CandidateEvaluator] batch accepted={} rejected={}",
            outcome.candidates.len(),
            outcome.rejected
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ConeColor, Landmark, PlannerConfig};
    use crate::vehicle::{SimulationType, VehicleParameters};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn track() -> Vec<Landmark> {
        (0..10)
            .flat_map(|i| {
                let x = 4.0 * i as f64;
                vec![
                    Landmark::new(x, 2.0, ConeColor::Blue),
                    Landmark::new(x, -2.0, ConeColor::Yellow),
                ]
            })
            .collect()
    }

    fn setup() -> (MapHandler, VehicleModel) {
        let vehicle = VehicleModel::new(VehicleParameters {
            track_width: 2.0,
            ..Default::default()
        })
        .unwrap();
        let map = MapHandler::for_vehicle(PlannerConfig::default(), &vehicle).unwrap();
        map.update_map(track());
        (map, vehicle)
    }

    #[test]
    fn test_budget_states() {
        let budget = CycleBudget::unbounded();
        assert!(budget.check().is_ok());

        let shared = budget.clone();
        shared.cancel();
        assert!(matches!(budget.check(), Err(PlanningError::Cancelled)));

        let expired = CycleBudget::with_deadline(Instant::now());
        assert!(matches!(expired.check(), Err(PlanningError::DeadlineExceeded)));

        let long = CycleBudget::with_timeout(Duration::from_secs(3600));
        assert!(long.check().is_ok());
    }

    #[test]
    fn test_evaluate_accepts_center_line() {
        let (mut map, vehicle) = setup();
        let mut evaluator = CandidateEvaluator::new(&mut map, &vehicle);

        let candidate = evaluator
            .evaluate(&Pose2D::new(1.0, 0.0, 0.0), &Pose2D::new(20.0, 0.0, 0.0))
            .unwrap()
            .unwrap();
        assert!(!candidate.trajectory.is_empty());
        assert!(candidate.cost > 0.0);
    }

    #[test]
    fn test_evaluate_rejects_boundary_crossing() {
        let (mut map, vehicle) = setup();
        let mut evaluator = CandidateEvaluator::new(&mut map, &vehicle);

        let result = evaluator
            .evaluate(&Pose2D::new(1.0, 0.0, 0.0), &Pose2D::new(2.0, 8.0, 0.0))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_batch_stops_when_cancelled() {
        let (mut map, vehicle) = setup();
        let mut evaluator = CandidateEvaluator::new(&mut map, &vehicle);
        let budget = CycleBudget::unbounded();
        budget.cancel();

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let outcome = evaluator
            .evaluate_batch(&Pose2D::origin(), 100, &budget, &mut rng)
            .unwrap();
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.rejected, 0);
        assert!(matches!(outcome.interrupted, Some(PlanningError::Cancelled)));
    }

    #[test]
    fn test_batch_counts_every_sample() {
        let (mut map, vehicle) = setup();
        let mut evaluator = CandidateEvaluator::new(&mut map, &vehicle);

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let outcome = evaluator
            .evaluate_batch(&Pose2D::new(1.0, 0.0, 0.0), 50, &CycleBudget::unbounded(), &mut rng)
            .unwrap();
        assert_eq!(outcome.candidates.len() + outcome.rejected, 50);
        assert!(outcome.interrupted.is_none());
        if let Some(best) = outcome.best() {
            assert!(outcome.candidates.iter().all(|c| c.cost >= best.cost));
        }
    }

    #[test]
    fn test_batch_fails_on_unsupported_model() {
        let vehicle = VehicleModel::new(VehicleParameters {
            simulation_type: SimulationType::Bicycle,
            ..Default::default()
        })
        .unwrap();
        let mut map = MapHandler::for_vehicle(PlannerConfig::default(), &vehicle).unwrap();
        map.update_map(track());
        let mut evaluator = CandidateEvaluator::new(&mut map, &vehicle);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = evaluator.evaluate_batch(&Pose2D::origin(), 10, &CycleBudget::unbounded(), &mut rng);
        assert!(matches!(result, Err(PlanningError::NotImplemented(_))));
    }
}
