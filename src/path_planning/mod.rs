// Trajectories, candidate evaluation and planner checkpoints

pub mod trajectory;
pub mod candidate;
pub mod checkpoint;

pub use trajectory::{Trajectory, INSUFFICIENT_TRAJECTORY_COST, STALLED_SEGMENT_PENALTY};
pub use candidate::{BatchOutcome, Candidate, CandidateEvaluator, CycleBudget};
pub use checkpoint::PlannerCheckpoint;
