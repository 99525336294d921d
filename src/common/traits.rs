//! Common traits defining the seams between map, vehicle and search

use crate::common::types::{KinematicState, Point2D, Pose2D};
use crate::path_planning::Trajectory;
use crate::vehicle::VehicleParameters;

/// Anything the planner can treat as a vehicle state
pub trait VehicleState {
    fn x(&self) -> f64;

    fn y(&self) -> f64;

    fn yaw(&self) -> f64;

    /// Forward velocity, zero for states that do not carry one
    fn forward_velocity(&self) -> f64 {
        0.0
    }

    fn position(&self) -> Point2D {
        Point2D::new(self.x(), self.y())
    }

    fn pose(&self) -> Pose2D {
        Pose2D::new(self.x(), self.y(), self.yaw())
    }

    /// Planar distance between positions, heading ignored
    fn distance_to<S: VehicleState + ?Sized>(&self, other: &S) -> f64
    where
        Self: Sized,
    {
        let dx = self.x() - other.x();
        let dy = self.y() - other.y();
        (dx * dx + dy * dy).sqrt()
    }
}

/// Vehicle motion model producing a connecting path between two states
pub trait MotionSimulator {
    /// Simulate from `start` toward `goal`. The start state is not part of
    /// the returned trajectory.
    fn simulate(
        &self,
        start: &Pose2D,
        goal: &Pose2D,
        params: &VehicleParameters,
    ) -> Trajectory<KinematicState>;
}

/// Distance metric between two states
pub trait DistanceMetric {
    fn distance(&self, start: &Pose2D, goal: &Pose2D) -> f64;
}
