//! Motion models connecting two vehicle states
//!
//! Each supported model is a zero-sized strategy implementing
//! [`MotionSimulator`]; [`SimulationType::simulator`] picks one, and rejects
//! the bicycle variants loudly instead of returning an empty path.

use crate::common::{
    normalize_angle, DistanceMetric, KinematicState, MotionSimulator, PlanningError,
    PlanningResult, Pose2D, VehicleState,
};
use crate::path_planning::Trajectory;
use crate::vehicle::parameters::{
    DistanceType, SimulationType, VehicleParameters, MAX_STATES_PER_CONNECTION,
};

/// Straight-line interpolation toward the goal, final heading taken from the goal
#[derive(Debug, Clone, Copy, Default)]
pub struct HolonomicSimulator;

/// Straight-line motion whose heading may deviate from the start heading by
/// at most `max_steering_angle`
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedHolonomicSimulator;

/// Planar distance on positions
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl MotionSimulator for HolonomicSimulator {
    fn simulate(
        &self,
        start: &Pose2D,
        goal: &Pose2D,
        params: &VehicleParameters,
    ) -> Trajectory<KinematicState> {
        let distance = start.distance_to(goal);
        straight_connection(
            start,
            goal.x - start.x,
            goal.y - start.y,
            distance,
            goal.yaw,
            params,
        )
    }
}

impl MotionSimulator for ConstrainedHolonomicSimulator {
    fn simulate(
        &self,
        start: &Pose2D,
        goal: &Pose2D,
        params: &VehicleParameters,
    ) -> Trajectory<KinematicState> {
        let max_angle = params.max_steering_angle;
        let distance = start.distance_to(goal);
        let diff = angular_difference(start, goal);

        let heading = if diff.abs() < max_angle {
            (goal.y - start.y).atan2(goal.x - start.x)
        } else if diff < 0.0 {
            normalize_angle(start.yaw - max_angle)
        } else {
            normalize_angle(start.yaw + max_angle)
        };

        straight_connection(
            start,
            heading.cos() * distance,
            heading.sin() * distance,
            distance,
            heading,
            params,
        )
    }
}

impl DistanceMetric for EuclideanDistance {
    fn distance(&self, start: &Pose2D, goal: &Pose2D) -> f64 {
        start.distance_to(goal)
    }
}

impl SimulationType {
    /// Strategy implementing this simulation type
    pub fn simulator(&self) -> PlanningResult<&'static dyn MotionSimulator> {
        match self {
            SimulationType::Holonomic => Ok(&HolonomicSimulator),
            SimulationType::HolonomicConstrained => Ok(&ConstrainedHolonomicSimulator),
            SimulationType::BicycleSimple | SimulationType::Bicycle => Err(
                PlanningError::NotImplemented(format!("unsupported simulation type {}", self)),
            ),
        }
    }
}

impl DistanceType {
    /// Strategy implementing this distance type
    pub fn metric(&self) -> PlanningResult<&'static dyn DistanceMetric> {
        match self {
            DistanceType::Euclidean => Ok(&EuclideanDistance),
            DistanceType::Simulated => Err(PlanningError::NotImplemented(format!(
                "unsupported distance type {}",
                self
            ))),
        }
    }
}

/// Bearing from `state` to `target` relative to the state heading, in (-pi, pi]
pub fn angular_difference<S: VehicleState, T: VehicleState>(state: &S, target: &T) -> f64 {
    let bearing = (target.y() - state.y()).atan2(target.x() - state.x());
    normalize_angle(bearing - state.yaw())
}

/// Emit evenly spaced states along the displacement `(dx, dy)` of length
/// `distance`, clipped to what the vehicle covers in one simulation step.
/// Empty when the reachable part is shorter than one resolution step.
fn straight_connection(
    start: &Pose2D,
    dx: f64,
    dy: f64,
    distance: f64,
    yaw: f64,
    params: &VehicleParameters,
) -> Trajectory<KinematicState> {
    if distance <= f64::EPSILON {
        return Trajectory::new();
    }

    let reach = distance.min(params.max_connection_distance());
    let ratio = reach / distance;
    let n_states = (reach / params.resolution)
        .floor()
        .min(MAX_STATES_PER_CONNECTION) as usize;
    let speed = reach / params.simulation_time_step;

    let mut trajectory = Trajectory::with_capacity(n_states);
    for i in 0..n_states {
        let fraction = ratio * (i + 1) as f64 / n_states as f64;
        trajectory.push(KinematicState::new(
            start.x + dx * fraction,
            start.y + dy * fraction,
            yaw,
            speed,
            0.0,
        ));
    }
    trajectory
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn params(max_velocity: f64, dt: f64, resolution: f64) -> VehicleParameters {
        VehicleParameters {
            max_velocity,
            simulation_time_step: dt,
            resolution,
            ..Default::default()
        }
    }

    #[test]
    fn test_holonomic_single_step() {
        let p = params(1.0, 1.0, 1.0);
        let start = Pose2D::origin();
        let goal = Pose2D::new(10.0, 0.0, 0.0);
        let t = HolonomicSimulator.simulate(&start, &goal, &p);

        assert_eq!(t.len(), 1);
        let s = t.states()[0];
        assert!((s.x - 1.0).abs() < 1e-10);
        assert!(s.y.abs() < 1e-10);
        assert_eq!(s.yaw, 0.0);
    }

    #[test]
    fn test_unvalidated_resolution_is_capped() {
        let p = params(10.0, 0.5, 1e-300);
        let t = HolonomicSimulator.simulate(&Pose2D::origin(), &Pose2D::new(10.0, 0.0, 0.0), &p);
        assert_eq!(t.len(), MAX_STATES_PER_CONNECTION as usize);
        assert!((t.states()[t.len() - 1].x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_holonomic_steps_toward_goal() {
        let p = params(2.0, 2.0, 0.5);
        let start = Pose2D::new(1.0, 1.0, 0.0);
        let goal = Pose2D::new(11.0, 1.0, 0.3);
        let t = HolonomicSimulator.simulate(&start, &goal, &p);

        assert_eq!(t.len(), 8);
        let mut prev = start;
        for s in &t {
            let step = prev.distance_to(s);
            assert!(step <= 0.5 + 1e-9);
            assert!(s.x > prev.x);
            assert!((s.y - 1.0).abs() < 1e-10);
            assert_eq!(s.yaw, 0.3);
            prev = s.pose();
        }
        assert!((prev.x - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_holonomic_reaches_close_goal() {
        let p = params(10.0, 1.0, 0.5);
        let goal = Pose2D::new(0.0, 2.0, 1.0);
        let t = HolonomicSimulator.simulate(&Pose2D::origin(), &goal, &p);

        assert_eq!(t.len(), 4);
        let last = t.last().unwrap();
        assert!(last.x.abs() < 1e-10);
        assert!((last.y - 2.0).abs() < 1e-10);
        // connection speed is the distance actually covered per time step
        assert!((last.velocity - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_sub_resolution_goal_is_empty() {
        let p = params(10.0, 1.0, 1.0);
        let goal = Pose2D::new(0.4, 0.0, 0.0);
        assert!(HolonomicSimulator.simulate(&Pose2D::origin(), &goal, &p).is_empty());
        assert!(HolonomicSimulator
            .simulate(&Pose2D::origin(), &Pose2D::origin(), &p)
            .is_empty());
    }

    #[test]
    fn test_constrained_within_limit_uses_bearing() {
        let p = VehicleParameters {
            max_steering_angle: 0.5,
            ..params(1.0, 2.0, 1.0)
        };
        let goal = Pose2D::new(10.0, 1.0, 0.0);
        let t = ConstrainedHolonomicSimulator.simulate(&Pose2D::origin(), &goal, &p);

        let bearing = (1.0f64).atan2(10.0);
        assert_eq!(t.len(), 2);
        for s in &t {
            assert!((s.yaw - bearing).abs() < 1e-10);
            assert!((s.y.atan2(s.x) - bearing).abs() < 1e-10);
        }
    }

    #[test]
    fn test_constrained_saturates_heading() {
        let p = VehicleParameters {
            max_steering_angle: 0.3,
            ..params(1.0, 2.0, 1.0)
        };

        let left = Pose2D::new(0.0, 10.0, 0.0);
        let t = ConstrainedHolonomicSimulator.simulate(&Pose2D::origin(), &left, &p);
        for s in &t {
            assert!((s.yaw - 0.3).abs() < 1e-10);
            assert!((s.y.atan2(s.x) - 0.3).abs() < 1e-10);
        }

        let right = Pose2D::new(0.0, -10.0, 0.0);
        let t = ConstrainedHolonomicSimulator.simulate(&Pose2D::origin(), &right, &p);
        for s in &t {
            assert!((s.yaw + 0.3).abs() < 1e-10);
        }
    }

    #[test]
    fn test_constrained_wraps_heading() {
        let p = VehicleParameters {
            max_steering_angle: 0.3,
            ..params(1.0, 2.0, 1.0)
        };
        let start = Pose2D::new(0.0, 0.0, PI - 0.1);
        let goal = Pose2D::new(0.0, -10.0, 0.0);
        let t = ConstrainedHolonomicSimulator.simulate(&start, &goal, &p);

        assert!(!t.is_empty());
        for s in &t {
            assert!(s.yaw > -PI && s.yaw <= PI);
            assert!((s.yaw - normalize_angle(PI + 0.2)).abs() < 1e-10);
        }
    }

    #[test]
    fn test_angular_difference() {
        let state = Pose2D::new(0.0, 0.0, 0.0);
        assert!((angular_difference(&state, &Pose2D::new(0.0, 1.0, 0.0)) - PI / 2.0).abs() < 1e-10);
        assert!((angular_difference(&state, &Pose2D::new(-1.0, 0.0, 0.0)) - PI).abs() < 1e-10);

        let headings = [-7.0, -PI, -1.0, 0.0, 2.5, PI, 9.0];
        let targets = [(1.0, 0.0), (-1.0, -0.0001), (0.0, -3.0), (-2.0, 2.0)];
        for &yaw in &headings {
            for &(x, y) in &targets {
                let d = angular_difference(&Pose2D::new(0.0, 0.0, yaw), &Pose2D::new(x, y, 0.0));
                assert!(d > -PI && d <= PI);
            }
        }
    }

    #[test]
    fn test_strategy_selection() {
        assert!(SimulationType::Holonomic.simulator().is_ok());
        assert!(SimulationType::HolonomicConstrained.simulator().is_ok());
        assert!(matches!(
            SimulationType::Bicycle.simulator(),
            Err(PlanningError::NotImplemented(_))
        ));
        assert!(matches!(
            SimulationType::BicycleSimple.simulator(),
            Err(PlanningError::NotImplemented(_))
        ));
        assert!(matches!(
            DistanceType::Simulated.metric(),
            Err(PlanningError::NotImplemented(_))
        ));

        let metric = DistanceType::Euclidean.metric().unwrap();
        assert!((metric.distance(&Pose2D::origin(), &Pose2D::new(3.0, 4.0, 2.0)) - 5.0).abs() < 1e-10);
    }
}
