//! Vehicle configuration and strategy selection

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::common::{PlanningError, PlanningResult};
use crate::vehicle::simulated_state::VehicleGeometry;

/// Upper bound on states emitted by one simulated connection
pub const MAX_STATES_PER_CONNECTION: f64 = 10_000.0;

/// Motion model used to connect two states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum SimulationType {
    /// Straight line toward the goal, no heading constraint
    Holonomic,
    /// Straight line with heading change limited by `max_steering_angle`
    HolonomicConstrained,
    /// Kinematic bicycle, not implemented
    BicycleSimple,
    /// Dynamic bicycle, not implemented
    Bicycle,
}

/// Distance metric used by the nearest-neighbour search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum DistanceType {
    Euclidean,
    /// Length of a simulated connection, not implemented
    Simulated,
}

/// Cost metric for ranking trajectories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum CostType {
    /// Path length, also accepted as EUCLIDEAN
    Distance,
    /// Travel time, also accepted as SIMULATED
    Time,
}

impl FromStr for SimulationType {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HOLONOMIC" => Ok(SimulationType::Holonomic),
            "HOLONOMIC_CONSTRAINED" => Ok(SimulationType::HolonomicConstrained),
            "BICYCLE_SIMPLE" => Ok(SimulationType::BicycleSimple),
            "BICYCLE" => Ok(SimulationType::Bicycle),
            other => Err(PlanningError::InvalidConfiguration(format!(
                "Wrong simulation type: {}",
                other
            ))),
        }
    }
}

impl FromStr for DistanceType {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUCLIDEAN" => Ok(DistanceType::Euclidean),
            "SIMULATED" => Ok(DistanceType::Simulated),
            other => Err(PlanningError::InvalidConfiguration(format!(
                "Wrong distance calculation type: {}",
                other
            ))),
        }
    }
}

impl FromStr for CostType {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DISTANCE" | "EUCLIDEAN" => Ok(CostType::Distance),
            "TIME" | "SIMULATED" => Ok(CostType::Time),
            other => Err(PlanningError::InvalidArgument(format!(
                "Wrong cost calculation type: {}",
                other
            ))),
        }
    }
}

// Deserialization goes through `FromStr` so names are matched the same way
// everywhere.
impl TryFrom<String> for SimulationType {
    type Error = PlanningError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl TryFrom<String> for DistanceType {
    type Error = PlanningError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl TryFrom<String> for CostType {
    type Error = PlanningError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl fmt::Display for SimulationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimulationType::Holonomic => "HOLONOMIC",
            SimulationType::HolonomicConstrained => "HOLONOMIC_CONSTRAINED",
            SimulationType::BicycleSimple => "BICYCLE_SIMPLE",
            SimulationType::Bicycle => "BICYCLE",
        };
        f.write_str(name)
    }
}

impl fmt::Display for DistanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceType::Euclidean => f.write_str("EUCLIDEAN"),
            DistanceType::Simulated => f.write_str("SIMULATED"),
        }
    }
}

impl fmt::Display for CostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostType::Distance => f.write_str("DISTANCE"),
            CostType::Time => f.write_str("TIME"),
        }
    }
}

/// Vehicle configuration, immutable once the model is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParameters {
    pub simulation_type: SimulationType,
    pub distance_type: DistanceType,
    pub cost_type: CostType,
    /// Track width [m]; a state closer than half of it to a boundary line is off course
    pub track_width: f64,
    /// Maximum forward velocity [m/s]
    pub max_velocity: f64,
    /// Maximum steering angle [rad], also the heading limit of the constrained model
    pub max_steering_angle: f64,
    /// Wheelbase [m]
    pub wheelbase: f64,
    /// Time horizon of one simulated connection [s]
    pub simulation_time_step: f64,
    /// Spacing of emitted states [m]
    pub resolution: f64,
}

impl Default for VehicleParameters {
    fn default() -> Self {
        Self {
            simulation_type: SimulationType::Holonomic,
            distance_type: DistanceType::Euclidean,
            cost_type: CostType::Distance,
            track_width: 3.0,
            max_velocity: 10.0,
            max_steering_angle: 0.5,
            wheelbase: 1.5,
            simulation_time_step: 0.5,
            resolution: 0.5,
        }
    }
}

impl VehicleParameters {
    /// Reject parameters the motion models cannot work with
    pub fn validate(&self) -> PlanningResult<()> {
        let positive = [
            ("track_width", self.track_width),
            ("max_velocity", self.max_velocity),
            ("max_steering_angle", self.max_steering_angle),
            ("wheelbase", self.wheelbase),
            ("simulation_time_step", self.simulation_time_step),
            ("resolution", self.resolution),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlanningError::InvalidConfiguration(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }

        let states = self.max_connection_distance() / self.resolution;
        if states > MAX_STATES_PER_CONNECTION {
            return Err(PlanningError::InvalidConfiguration(format!(
                "resolution {} yields {} states per connection, limit is {}",
                self.resolution, states, MAX_STATES_PER_CONNECTION
            )));
        }
        Ok(())
    }

    /// Parse and validate parameters from JSON
    ///
    /// Unknown strategy names are configuration errors, not serialization
    /// errors.
    pub fn from_json(json: &str) -> PlanningResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::check_strategy_names(&value)?;
        let params: Self = serde_json::from_value(value)?;
        params.validate()?;
        Ok(params)
    }

    /// Check the strategy fields of a JSON parameter object by name
    pub fn check_strategy_names(value: &Value) -> PlanningResult<()> {
        if let Some(name) = value.get("simulation_type").and_then(Value::as_str) {
            name.parse::<SimulationType>()?;
        }
        if let Some(name) = value.get("distance_type").and_then(Value::as_str) {
            name.parse::<DistanceType>()?;
        }
        if let Some(name) = value.get("cost_type").and_then(Value::as_str) {
            name.parse::<CostType>().map_err(|_| {
                PlanningError::InvalidConfiguration(format!("Wrong cost calculation type: {}", name))
            })?;
        }
        Ok(())
    }

    /// Longest connection one simulation call may produce
    pub fn max_connection_distance(&self) -> f64 {
        self.max_velocity * self.simulation_time_step
    }

    pub fn geometry(&self) -> VehicleGeometry {
        VehicleGeometry::new(self.wheelbase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy_names() {
        assert_eq!("HOLONOMIC".parse::<SimulationType>().unwrap(), SimulationType::Holonomic);
        assert_eq!(
            "holonomic_constrained".parse::<SimulationType>().unwrap(),
            SimulationType::HolonomicConstrained
        );
        assert_eq!("SIMULATED".parse::<DistanceType>().unwrap(), DistanceType::Simulated);
        assert_eq!("EUCLIDEAN".parse::<CostType>().unwrap(), CostType::Distance);
        assert_eq!("TIME".parse::<CostType>().unwrap(), CostType::Time);
    }

    #[test]
    fn test_unknown_names_rejected() {
        assert!(matches!(
            "TELEPORT".parse::<SimulationType>(),
            Err(PlanningError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            "MANHATTAN".parse::<DistanceType>(),
            Err(PlanningError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            "FUEL".parse::<CostType>(),
            Err(PlanningError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for t in [
            SimulationType::Holonomic,
            SimulationType::HolonomicConstrained,
            SimulationType::BicycleSimple,
            SimulationType::Bicycle,
        ] {
            assert_eq!(t.to_string().parse::<SimulationType>().unwrap(), t);
        }
    }

    #[test]
    fn test_validate() {
        assert!(VehicleParameters::default().validate().is_ok());

        let params = VehicleParameters {
            resolution: 0.0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(PlanningError::InvalidConfiguration(_))));

        let params = VehicleParameters {
            max_velocity: f64::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_limits_states_per_connection() {
        let params = VehicleParameters {
            resolution: 1e-300,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(PlanningError::InvalidConfiguration(_))));

        let params = VehicleParameters {
            max_velocity: f64::MAX,
            simulation_time_step: 10.0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(PlanningError::InvalidConfiguration(_))));

        // 5 m connection at 1 mm spacing
        let params = VehicleParameters {
            resolution: 0.001,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_unknown_names_are_configuration_errors() {
        let err = VehicleParameters::from_json(r#"{"simulation_type":"TELEPORT"}"#).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidConfiguration(_)));
        assert!(err.is_fatal_for_cycle());

        let err = VehicleParameters::from_json(r#"{"distance_type":"MANHATTAN"}"#).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidConfiguration(_)));

        let err = VehicleParameters::from_json(r#"{"cost_type":"ENERGY"}"#).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidConfiguration(_)));

        let err = VehicleParameters::from_json(r#"{"resolution":0.0}"#).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidConfiguration(_)));

        // plain serde rejects the name too, through the same parser
        assert!(serde_json::from_str::<VehicleParameters>(r#"{"simulation_type":"TELEPORT"}"#).is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = r#"{"simulation_type":"BICYCLE_SIMPLE","cost_type":"SIMULATED"}"#;
        let params: VehicleParameters = serde_json::from_str(json).unwrap();
        assert_eq!(VehicleParameters::from_json(json).unwrap(), params);
        assert_eq!(params.simulation_type, SimulationType::BicycleSimple);
        assert_eq!(params.cost_type, CostType::Time);
        assert_eq!(params.track_width, VehicleParameters::default().track_width);
    }
}
