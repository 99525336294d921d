// Landmark map, shared map store and map-derived planner queries

pub mod landmark;
pub mod map_store;
pub mod map_handler;

pub use landmark::{ConeColor, Landmark, LandmarkMap};
pub use map_store::MapStore;
pub use map_handler::{is_on_track_edge, MapHandler, MapHandlerState, PlannerConfig, VisualizationSnapshot};
