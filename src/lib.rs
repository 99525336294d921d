//! track_planner - local motion-planning core for an autonomous racing vehicle
//!
//! This crate provides the primitives a sampling-based tree search calls
//! every control cycle: collision testing against the live cone map, biased
//! state sampling, vehicle motion simulation, and trajectory costs.

// Core modules
pub mod common;
pub mod utils;

// Planner modules
pub mod mapping;
pub mod vehicle;
pub mod path_planning;

// Re-export common types for convenience
pub use common::{KinematicState, Point2D, Pose2D, VehicleState};
pub use common::{DistanceMetric, MotionSimulator};
pub use common::{PlanningError, PlanningResult};
pub use mapping::{ConeColor, Landmark, MapHandler, MapStore, PlannerConfig};
pub use path_planning::{CandidateEvaluator, CycleBudget, PlannerCheckpoint, Trajectory};
pub use vehicle::{CostType, DistanceType, SimulationType, VehicleModel, VehicleParameters};
