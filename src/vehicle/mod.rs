// Vehicle model, motion strategies and simulated state

pub mod parameters;
pub mod motion_model;
pub mod simulated_state;
pub mod integration;
pub mod vehicle_model;

pub use parameters::{
    CostType, DistanceType, SimulationType, VehicleParameters, MAX_STATES_PER_CONNECTION,
};
pub use motion_model::{angular_difference, ConstrainedHolonomicSimulator, EuclideanDistance, HolonomicSimulator};
pub use simulated_state::{Control, SimulatedState, VehicleGeometry};
pub use integration::{euler_step, rk4_step};
pub use vehicle_model::{LatestPose, PoseSample, VehicleModel, VehicleModelState};
