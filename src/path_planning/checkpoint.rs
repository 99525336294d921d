//! Checkpoint and restore of planner state
//!
//! Covers planner configuration, goal, map and loop-closure flags, vehicle
//! parameters and pose. The landmark map is not persisted; it arrives again
//! with the next map update.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::common::PlanningResult;
use crate::mapping::{MapHandler, MapHandlerState, MapStore};
use crate::vehicle::{VehicleModel, VehicleModelState, VehicleParameters};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerCheckpoint {
    pub map_handler: MapHandlerState,
    pub vehicle: VehicleModelState,
}

impl PlannerCheckpoint {
    pub fn capture(map: &MapHandler, vehicle: &VehicleModel) -> Self {
        Self {
            map_handler: map.checkpoint(),
            vehicle: vehicle.checkpoint(),
        }
    }

    pub fn restore(self) -> PlanningResult<(MapHandler, VehicleModel)> {
        let vehicle = VehicleModel::restore(self.vehicle)?;
        let map = MapHandler::restore(self.map_handler, vehicle.track_width())?;
        Ok((map, vehicle))
    }

    /// Restore onto a map store the transport already writes to
    pub fn restore_with_store(
        self,
        store: Arc<MapStore>,
    ) -> PlanningResult<(MapHandler, VehicleModel)> {
        let vehicle = VehicleModel::restore(self.vehicle)?;
        let map = MapHandler::restore_with_store(self.map_handler, vehicle.track_width(), store)?;
        Ok((map, vehicle))
    }

    pub fn to_json(&self) -> PlanningResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a checkpoint; unknown strategy names are configuration errors
    pub fn from_json(json: &str) -> PlanningResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        if let Some(params) = value.pointer("/vehicle/parameters") {
            VehicleParameters::check_strategy_names(params)?;
        }
        Ok(serde_json::from_value(value)?)
    }
}
