//! Vehicle model: configuration, last known pose, and the simulation,
//! distance and cost strategies selected by that configuration.

use log::{debug, warn};
use nalgebra::{Point3, UnitQuaternion};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::common::{KinematicState, PlanningResult, Pose2D, VehicleState};
use crate::path_planning::Trajectory;
use crate::vehicle::motion_model::angular_difference;
use crate::vehicle::parameters::VehicleParameters;

/// Localization sample as delivered by the pose transport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl PoseSample {
    pub fn new(position: Point3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self { position, orientation }
    }

    /// Planar pose; roll and pitch are discarded
    pub fn to_pose2d(&self) -> Pose2D {
        let (_roll, _pitch, yaw) = self.orientation.euler_angles();
        Pose2D::new(self.position.x, self.position.y, yaw)
    }
}

/// Latest-value pose cell, written by one producer and read by many
#[derive(Debug, Default)]
pub struct LatestPose {
    pose: RwLock<Pose2D>,
}

impl LatestPose {
    pub fn new(pose: Pose2D) -> Self {
        Self { pose: RwLock::new(pose) }
    }

    pub fn store(&self, pose: Pose2D) {
        *self.pose.write() = pose;
    }

    pub fn load(&self) -> Pose2D {
        *self.pose.read()
    }
}

/// Serializable part of a [`VehicleModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleModelState {
    pub parameters: VehicleParameters,
    pub pose: Pose2D,
}

/// Vehicle model used by the search to connect and score states
#[derive(Debug)]
pub struct VehicleModel {
    params: VehicleParameters,
    pose: Arc<LatestPose>,
}

impl VehicleModel {
    /// Build a model from validated parameters
    ///
    /// Unsupported strategies are accepted here so the host can start, but
    /// every call that needs them fails with `NotImplemented`.
    pub fn new(params: VehicleParameters) -> PlanningResult<Self> {
        params.validate()?;
        if let Err(e) = params.simulation_type.simulator() {
            warn!("[VehicleModel] configured simulation is unusable: {}", e);
        }
        if let Err(e) = params.distance_type.metric() {
            warn!("[VehicleModel] configured distance is unusable: {}", e);
        }
        Ok(Self {
            params,
            pose: Arc::new(LatestPose::default()),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            params: VehicleParameters::default(),
            pose: Arc::new(LatestPose::default()),
        }
    }

    pub fn parameters(&self) -> &VehicleParameters {
        &self.params
    }

    pub fn track_width(&self) -> f64 {
        self.params.track_width
    }

    /// Simulate a connecting trajectory from `start` toward `goal`
    ///
    /// The start state is excluded. An empty trajectory means the goal is
    /// effectively reached: the reachable part is shorter than one
    /// resolution step.
    pub fn simulate<S: VehicleState, G: VehicleState>(
        &self,
        start: &S,
        goal: &G,
    ) -> PlanningResult<Trajectory<KinematicState>> {
        let simulator = self.params.simulation_type.simulator()?;
        Ok(simulator.simulate(&start.pose(), &goal.pose(), &self.params))
    }

    /// Distance between two states under the configured metric
    pub fn distance<S: VehicleState, G: VehicleState>(&self, start: &S, goal: &G) -> PlanningResult<f64> {
        let metric = self.params.distance_type.metric()?;
        Ok(metric.distance(&start.pose(), &goal.pose()))
    }

    /// Cost of a trajectory under the configured cost type
    pub fn cost<S: VehicleState>(&self, trajectory: &Trajectory<S>) -> f64 {
        trajectory.cost(self.params.cost_type)
    }

    /// Bearing to `target` relative to the heading of `state`, in (-pi, pi]
    pub fn angular_difference<S: VehicleState, T: VehicleState>(&self, state: &S, target: &T) -> f64 {
        angular_difference(state, target)
    }

    /// Store the latest localization sample; no staleness check
    pub fn update_pose(&self, sample: &PoseSample) {
        let pose = sample.to_pose2d();
        debug!(
            "[VehicleModel] pose update x={:.2} y={:.2} yaw={:.3}",
            pose.x, pose.y, pose.yaw
        );
        self.pose.store(pose);
    }

    pub fn current_pose(&self) -> Pose2D {
        self.pose.load()
    }

    /// Shared handle for the pose transport
    pub fn pose_handle(&self) -> Arc<LatestPose> {
        Arc::clone(&self.pose)
    }

    pub fn checkpoint(&self) -> VehicleModelState {
        VehicleModelState {
            parameters: self.params.clone(),
            pose: self.current_pose(),
        }
    }

    pub fn restore(state: VehicleModelState) -> PlanningResult<Self> {
        let model = Self::new(state.parameters)?;
        model.pose.store(state.pose);
        Ok(model)
    }
}
