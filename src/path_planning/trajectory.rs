//! Trajectory container produced by one simulation call
//!
//! A trajectory is append-only while the motion model fills it and read-only
//! afterwards. It is generic over the state variant so holonomic poses,
//! kinematic states and simulated states share the same cost functions.

use serde::{Deserialize, Serialize};

use crate::common::VehicleState;
use crate::vehicle::CostType;

/// Cost returned for trajectories with fewer than two states
pub const INSUFFICIENT_TRAJECTORY_COST: f64 = 100.0;

/// Time charged for a segment whose start state is not moving forward
pub const STALLED_SEGMENT_PENALTY: f64 = 100.0;

/// Ordered sequence of vehicle states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory<S> {
    states: Vec<S>,
}

impl<S> Trajectory<S> {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { states: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, state: S) {
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<&S> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&S> {
        self.states.last()
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.states.iter()
    }
}

impl<S: VehicleState> Trajectory<S> {
    /// Cost of the trajectory under the given metric
    pub fn cost(&self, cost_type: CostType) -> f64 {
        match cost_type {
            CostType::Distance => self.distance_cost(),
            CostType::Time => self.time_cost(),
        }
    }

    /// Sum of Euclidean distances between consecutive states
    pub fn distance_cost(&self) -> f64 {
        if self.states.len() < 2 {
            return INSUFFICIENT_TRAJECTORY_COST;
        }
        self.states
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    /// Travel time, each segment driven at the velocity of its first state
    pub fn time_cost(&self) -> f64 {
        if self.states.len() < 2 {
            return INSUFFICIENT_TRAJECTORY_COST;
        }
        self.states
            .windows(2)
            .map(|w| {
                let v = w[0].forward_velocity();
                if v > 0.0 {
                    w[0].distance_to(&w[1]) / v
                } else {
                    STALLED_SEGMENT_PENALTY
                }
            })
            .sum()
    }

    pub fn final_pose(&self) -> Option<crate::common::Pose2D> {
        self.states.last().map(|s| s.pose())
    }
}

impl<S> Default for Trajectory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> From<Vec<S>> for Trajectory<S> {
    fn from(states: Vec<S>) -> Self {
        Self { states }
    }
}

impl<S> FromIterator<S> for Trajectory<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { states: iter.into_iter().collect() }
    }
}

impl<S> Extend<S> for Trajectory<S> {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.states.extend(iter);
    }
}

impl<'a, S> IntoIterator for &'a Trajectory<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{KinematicState, Pose2D};

    fn straight_line(velocity: f64) -> Trajectory<KinematicState> {
        (0..4)
            .map(|i| KinematicState::new(i as f64, 0.0, 0.0, velocity, 0.0))
            .collect()
    }

    #[test]
    fn test_short_trajectory_sentinel() {
        let empty: Trajectory<Pose2D> = Trajectory::new();
        let single: Trajectory<Pose2D> = vec![Pose2D::new(1.0, 1.0, 0.0)].into();

        for t in [&empty, &single] {
            assert_eq!(t.cost(CostType::Distance), INSUFFICIENT_TRAJECTORY_COST);
            assert_eq!(t.cost(CostType::Time), INSUFFICIENT_TRAJECTORY_COST);
        }
    }

    #[test]
    fn test_distance_cost() {
        let t: Trajectory<Pose2D> = vec![
            Pose2D::new(0.0, 0.0, 0.0),
            Pose2D::new(3.0, 4.0, 0.0),
            Pose2D::new(3.0, 5.0, 0.0),
        ]
        .into();
        assert!((t.cost(CostType::Distance) - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_time_cost() {
        let t = straight_line(2.0);
        // three unit segments at 2 m/s
        assert!((t.cost(CostType::Time) - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_time_cost_stalled_segments() {
        let t = straight_line(0.0);
        assert!((t.time_cost() - 3.0 * STALLED_SEGMENT_PENALTY).abs() < 1e-10);

        let reversing = straight_line(-1.0);
        assert!((reversing.time_cost() - 3.0 * STALLED_SEGMENT_PENALTY).abs() < 1e-10);
    }

    #[test]
    fn test_pose_states_have_no_velocity() {
        let t: Trajectory<Pose2D> =
            vec![Pose2D::new(0.0, 0.0, 0.0), Pose2D::new(1.0, 0.0, 0.0)].into();
        assert_eq!(t.time_cost(), STALLED_SEGMENT_PENALTY);
    }

    #[test]
    fn test_append_and_iterate() {
        let mut t = Trajectory::with_capacity(2);
        assert!(t.is_empty());
        t.push(Pose2D::new(0.0, 0.0, 0.0));
        t.extend(vec![Pose2D::new(1.0, 0.0, 0.5)]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.final_pose(), Some(Pose2D::new(1.0, 0.0, 0.5)));
        assert_eq!((&t).into_iter().count(), 2);
    }
}
