// Local planning cycle on a synthetic oval track
//
// Feeds a cone map and a pose, derives the goal, evaluates a batch of sampled
// extensions under a cycle deadline and plots the result to ./img.

use log::{info, warn};
use nalgebra::{Point3, UnitQuaternion};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::f64::consts::PI;
use std::time::Duration;

use track_planner::mapping::{ConeColor, Landmark, MapHandler, PlannerConfig};
use track_planner::path_planning::{CandidateEvaluator, CycleBudget};
use track_planner::utils::{colors, PathStyle, Visualizer};
use track_planner::vehicle::{PoseSample, SimulationType, VehicleModel, VehicleParameters};
use track_planner::PlanningResult;

fn oval_track(radius: f64, half_width: f64, n: usize) -> Vec<Landmark> {
    let mut cones = Vec::with_capacity(2 * n + 2);
    for i in 0..n {
        let a = 2.0 * PI * i as f64 / n as f64;
        let (s, c) = a.sin_cos();
        cones.push(Landmark::new((radius + half_width) * c, (radius + half_width) * s, ConeColor::Yellow));
        cones.push(Landmark::new((radius - half_width) * c, (radius - half_width) * s, ConeColor::Blue));
    }
    cones.push(Landmark::new(radius - half_width, -0.5, ConeColor::Orange));
    cones.push(Landmark::new(radius + half_width, -0.5, ConeColor::Orange));
    cones
}

fn run() -> PlanningResult<()> {
    let vehicle = VehicleModel::new(VehicleParameters {
        simulation_type: SimulationType::HolonomicConstrained,
        track_width: 2.0,
        ..Default::default()
    })?;
    let mut map = MapHandler::for_vehicle(PlannerConfig::default(), &vehicle)?;

    let cones = oval_track(20.0, 2.0, 40);
    map.update_map(cones.clone());
    vehicle.update_pose(&PoseSample::new(
        Point3::new(20.0, 0.0, 0.0),
        UnitQuaternion::from_euler_angles(0.0, 0.0, PI / 2.0),
    ));

    let pose = vehicle.current_pose();
    let goal = map.calculate_goal_state(&pose);
    info!("goal ({:.2}, {:.2}) yaw={:.2}", goal.x, goal.y, goal.yaw);

    let budget = CycleBudget::with_timeout(Duration::from_millis(50));
    let mut rng = StdRng::seed_from_u64(2024);
    let outcome = {
        let mut evaluator = CandidateEvaluator::new(&mut map, &vehicle);
        evaluator.evaluate_batch(&pose, 300, &budget, &mut rng)?
    };
    info!(
        "accepted {} candidates, rejected {}",
        outcome.candidates.len(),
        outcome.rejected
    );
    if let Some(reason) = &outcome.interrupted {
        warn!("batch interrupted: {}", reason);
    }

    let mut vis = Visualizer::new();
    vis.set_title("Local planning cycle");
    vis.plot_landmarks(&cones);
    let candidate_style = PathStyle::new(colors::REJECTED, "Candidates").with_line_width(1.0);
    for candidate in &outcome.candidates {
        vis.plot_trajectory(&candidate.trajectory, &candidate_style);
    }
    if let Some(best) = outcome.best() {
        info!("best cost {:.3}", best.cost);
        vis.plot_trajectory(&best.trajectory, &PathStyle::default());
    }
    vis.plot_pose(&pose, colors::VEHICLE, "Vehicle");
    vis.plot_snapshot(&map.visualization());

    let crate_dir = env!("CARGO_MANIFEST_DIR");
    if let Err(e) = vis.save_png(&format!("{}/img/track_planner.png", crate_dir), 800, 800) {
        warn!("could not save plot: {}", e);
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("planning cycle failed: {}", e);
        std::process::exit(1);
    }
}
