//! Map-derived queries for the sampling-based search
//!
//! [`MapHandler`] answers three kinds of questions against the current
//! landmark generation:
//!
//! - off-course tests: does a trajectory come closer than half the track
//!   width to a line through two same-colored cones near its start,
//! - biased sampling: a random state near a random cone, or the goal,
//! - goal derivation from the cones ahead of the vehicle.

use itertools::Itertools;
use log::debug;
use ordered_float::OrderedFloat;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;

use crate::common::{PlanningError, PlanningResult, Point2D, Pose2D, VehicleState};
use crate::mapping::landmark::{ConeColor, Landmark, LandmarkMap};
use crate::mapping::map_store::MapStore;
use crate::path_planning::Trajectory;
use crate::vehicle::VehicleModel;

/// Cone pairs closer than this are treated as one point and skipped
const COINCIDENT_PAIR_EPS: f64 = 1e-9;

/// Configuration for map queries and sampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Probability of sampling the goal instead of a cone-derived state
    pub goal_bias: f64,
    /// Only cones within this distance of a trajectory's first state are checked
    pub collision_range: f64,
    /// Half side of the square around a cone that random states are drawn from
    pub spawn_range: f64,
    /// Look-ahead distance for goal derivation
    pub goal_horizon: f64,
    /// Goal used until one can be derived from the map
    pub initial_goal: Pose2D,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            goal_bias: 0.2,
            collision_range: 6.0,
            spawn_range: 3.0,
            goal_horizon: 20.0,
            initial_goal: Pose2D::new(75.0, 0.0, 0.0),
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> PlanningResult<()> {
        if !(0.0..=1.0).contains(&self.goal_bias) {
            return Err(PlanningError::InvalidConfiguration(format!(
                "goal_bias must be within [0, 1], got {}",
                self.goal_bias
            )));
        }
        let positive = [
            ("collision_range", self.collision_range),
            ("spawn_range", self.spawn_range),
            ("goal_horizon", self.goal_horizon),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlanningError::InvalidConfiguration(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Read-only projection for external rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationSnapshot {
    pub goal: Pose2D,
    /// Nearest blue and yellow cone to the goal, when present
    pub landmarks: Vec<Landmark>,
}

/// Serializable part of a [`MapHandler`]; landmarks are not persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapHandlerState {
    pub config: PlannerConfig,
    pub goal: Pose2D,
    pub has_map: bool,
    pub loop_closed: bool,
}

/// Candidate cones reused across off-course checks
#[derive(Debug, Default)]
struct CandidateBuffers {
    blue: Vec<Landmark>,
    yellow: Vec<Landmark>,
}

impl CandidateBuffers {
    fn clear(&mut self) {
        self.blue.clear();
        self.yellow.clear();
    }
}

#[derive(Debug)]
pub struct MapHandler {
    config: PlannerConfig,
    track_width: f64,
    store: Arc<MapStore>,
    goal: Pose2D,
    scratch: CandidateBuffers,
}

impl MapHandler {
    pub fn new(config: PlannerConfig, track_width: f64) -> PlanningResult<Self> {
        Self::with_store(config, track_width, Arc::new(MapStore::new()))
    }

    /// Handler reading from a store that may be shared with the map transport
    pub fn with_store(
        config: PlannerConfig,
        track_width: f64,
        store: Arc<MapStore>,
    ) -> PlanningResult<Self> {
        config.validate()?;
        if !track_width.is_finite() || track_width <= 0.0 {
            return Err(PlanningError::InvalidConfiguration(format!(
                "track_width must be positive and finite, got {}",
                track_width
            )));
        }
        Ok(Self {
            goal: config.initial_goal,
            config,
            track_width,
            store,
            scratch: CandidateBuffers::default(),
        })
    }

    pub fn for_vehicle(config: PlannerConfig, vehicle: &VehicleModel) -> PlanningResult<Self> {
        Self::new(config, vehicle.track_width())
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<MapStore> {
        Arc::clone(&self.store)
    }

    pub fn update_map<I>(&self, landmarks: I) -> bool
    where
        I: IntoIterator<Item = Landmark>,
    {
        self.store.update_map(landmarks)
    }

    pub fn set_loop_closed(&self, closed: bool) {
        self.store.set_loop_closed(closed);
    }

    pub fn has_map(&self) -> bool {
        self.store.has_map()
    }

    pub fn is_loop_closed(&self) -> bool {
        self.store.is_loop_closed()
    }

    /// Whether any state of the trajectory is on a track edge
    ///
    /// Candidate cones are selected once, around the first state. An empty
    /// trajectory is never off course.
    pub fn is_off_course<S: VehicleState>(&mut self, trajectory: &Trajectory<S>) -> bool {
        let origin = match trajectory.first() {
            Some(state) => state.position(),
            None => return false,
        };

        let map = self.store.snapshot();
        self.scratch.clear();
        for cone in map.iter() {
            if cone.distance_to(&origin) >= self.config.collision_range {
                continue;
            }
            match cone.color {
                ConeColor::Blue => self.scratch.blue.push(*cone),
                ConeColor::Yellow => self.scratch.yellow.push(*cone),
                _ => {}
            }
        }

        let half_width = self.track_width / 2.0;
        let scratch = &self.scratch;
        trajectory.iter().any(|state| {
            is_on_track_edge(state, &scratch.blue, half_width)
                || is_on_track_edge(state, &scratch.yellow, half_width)
        })
    }

    /// Random state near a random cone, or the goal with probability `goal_bias`
    ///
    /// Always the goal while the map is empty.
    pub fn sample_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Pose2D {
        let map = self.store.snapshot();
        if map.is_empty() || rng.gen::<f64>() < self.config.goal_bias {
            return self.goal;
        }

        let cone = map.landmarks()[rng.gen_range(0..map.len())];
        let spawn = Uniform::new(-self.config.spawn_range, self.config.spawn_range);
        Pose2D::new(
            cone.x + spawn.sample(rng),
            cone.y + spawn.sample(rng),
            rng.gen_range(0.0..2.0 * PI),
        )
    }

    pub fn goal_state(&self) -> Pose2D {
        self.goal
    }

    /// Recompute the goal from the map as seen from `pose`
    ///
    /// With a closed loop and orange cones present the goal is the orange
    /// centroid. Otherwise it is the midpoint between the farthest blue cone
    /// ahead within `goal_horizon` and its nearest yellow cone, facing along
    /// the track. The previous goal is kept when neither can be derived.
    pub fn calculate_goal_state(&mut self, pose: &Pose2D) -> Pose2D {
        let map = self.store.snapshot();

        if self.is_loop_closed() {
            if let Some(goal) = finish_line_goal(&map, pose) {
                debug!("[MapHandler] finish line goal ({:.2}, {:.2})", goal.x, goal.y);
                self.goal = goal;
                return goal;
            }
        }

        if let Some(goal) = track_goal(&map, pose, self.config.goal_horizon) {
            debug!(
                "[MapHandler] track goal ({:.2}, {:.2}) yaw={:.3}",
                goal.x, goal.y, goal.yaw
            );
            self.goal = goal;
        }
        self.goal
    }

    /// Nearest cone of `color` to `reference`
    pub fn nearest_landmark(&self, reference: &Point2D, color: ConeColor) -> Option<Landmark> {
        nearest_in(&self.store.snapshot(), reference, color)
    }

    pub fn visualization(&self) -> VisualizationSnapshot {
        let map = self.store.snapshot();
        let goal = self.goal.position();
        let landmarks = [ConeColor::Blue, ConeColor::Yellow]
            .into_iter()
            .filter_map(|color| nearest_in(&map, &goal, color))
            .collect();
        VisualizationSnapshot { goal: self.goal, landmarks }
    }

    pub fn checkpoint(&self) -> MapHandlerState {
        MapHandlerState {
            config: self.config.clone(),
            goal: self.goal,
            has_map: self.has_map(),
            loop_closed: self.is_loop_closed(),
        }
    }

    /// Rebuild a handler on a fresh, empty store
    ///
    /// A transport holding the previous handler's `store()` must be re-wired
    /// to the new one; use [`MapHandler::restore_with_store`] to keep it.
    pub fn restore(state: MapHandlerState, track_width: f64) -> PlanningResult<Self> {
        Self::restore_with_store(state, track_width, Arc::new(MapStore::new()))
    }

    /// Rebuild a handler on an existing store, keeping its current map
    pub fn restore_with_store(
        state: MapHandlerState,
        track_width: f64,
        store: Arc<MapStore>,
    ) -> PlanningResult<Self> {
        let mut handler = Self::with_store(state.config, track_width, store)?;
        handler.goal = state.goal;
        let has_map = state.has_map || handler.store.has_map();
        handler.store.restore_flags(has_map, state.loop_closed);
        Ok(handler)
    }
}

/// Whether `state` is closer than `half_width` to the line through any two cones
pub fn is_on_track_edge<S: VehicleState>(state: &S, cones: &[Landmark], half_width: f64) -> bool {
    let (sx, sy) = (state.x(), state.y());
    cones.iter().tuple_combinations().any(|(a, b)| {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        let norm = (dx * dx + dy * dy).sqrt();
        if norm < COINCIDENT_PAIR_EPS {
            return false;
        }
        (dx * (b.y - sy) - (b.x - sx) * dy).abs() / norm < half_width
    })
}

fn nearest_in(map: &LandmarkMap, reference: &Point2D, color: ConeColor) -> Option<Landmark> {
    map.by_color(color)
        .min_by_key(|cone| OrderedFloat(cone.distance_to(reference)))
        .copied()
}

fn finish_line_goal(map: &LandmarkMap, pose: &Pose2D) -> Option<Pose2D> {
    let (sum_x, sum_y, n) = map
        .by_color(ConeColor::Orange)
        .fold((0.0, 0.0, 0usize), |(x, y, n), c| (x + c.x, y + c.y, n + 1));
    if n == 0 {
        return None;
    }
    let cx = sum_x / n as f64;
    let cy = sum_y / n as f64;
    Some(Pose2D::new(cx, cy, (cy - pose.y).atan2(cx - pose.x)))
}

fn track_goal(map: &LandmarkMap, pose: &Pose2D, horizon: f64) -> Option<Pose2D> {
    let (cos, sin) = (pose.yaw.cos(), pose.yaw.sin());
    let origin = pose.position();

    let blue = map
        .by_color(ConeColor::Blue)
        .filter(|c| c.distance_to(&origin) <= horizon)
        .map(|c| (c, (c.x - pose.x) * cos + (c.y - pose.y) * sin))
        .filter(|&(_, along)| along > 0.0)
        .max_by_key(|&(_, along)| OrderedFloat(along))
        .map(|(c, _)| *c)?;
    let yellow = nearest_in(map, &blue.position(), ConeColor::Yellow)?;

    let mid = blue.position().midpoint(&yellow.position());
    // track direction is the normal of the blue -> yellow gate, pointing forward
    let (gx, gy) = (yellow.x - blue.x, yellow.y - blue.y);
    let (mut tx, mut ty) = (-gy, gx);
    if tx * cos + ty * sin < 0.0 {
        tx = -tx;
        ty = -ty;
    }
    let yaw = if tx.hypot(ty) < COINCIDENT_PAIR_EPS {
        pose.yaw
    } else {
        ty.atan2(tx)
    };
    Some(Pose2D::new(mid.x, mid.y, yaw))
}
