//! Visualization of map, goal and candidate trajectories
//!
//! Renders the read-only planner projection with gnuplot. Nothing here feeds
//! back into planning state.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Pose2D, VehicleState};
use crate::mapping::{ConeColor, Landmark, VisualizationSnapshot};
use crate::path_planning::Trajectory;

/// Color palette for consistent styling
pub mod colors {
    pub const BLUE_CONE: &str = "#0000FF";
    pub const YELLOW_CONE: &str = "#E6C200";
    pub const ORANGE_CONE: &str = "#FFA500";
    pub const UNKNOWN_CONE: &str = "#808080";

    pub const GOAL: &str = "#00A000";
    pub const VEHICLE: &str = "#00FFFF";
    pub const TRAJECTORY: &str = "#FF0000";
    pub const REJECTED: &str = "#C0C0C0";
    pub const HIGHLIGHT: &str = "#FF00FF";
}

pub fn cone_color(color: ConeColor) -> &'static str {
    match color {
        ConeColor::Blue => colors::BLUE_CONE,
        ConeColor::Yellow => colors::YELLOW_CONE,
        ConeColor::Orange => colors::ORANGE_CONE,
        ConeColor::Unknown => colors::UNKNOWN_CONE,
    }
}

/// Style for trajectory rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::TRAJECTORY, "Trajectory")
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Points {
        x: Vec<f64>,
        y: Vec<f64>,
        color: String,
        caption: String,
        symbol: char,
        size: f64,
    },
    Lines {
        x: Vec<f64>,
        y: Vec<f64>,
        color: String,
        caption: String,
        width: f64,
    },
}

/// Collects layers and renders them into a single gnuplot axes
pub struct Visualizer {
    title: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    layers: Vec<Layer>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            x_range: None,
            y_range: None,
            layers: Vec::new(),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Plot cones, one layer per color present
    pub fn plot_landmarks(&mut self, landmarks: &[Landmark]) -> &mut Self {
        for color in [ConeColor::Blue, ConeColor::Yellow, ConeColor::Orange, ConeColor::Unknown] {
            let (x, y): (Vec<f64>, Vec<f64>) = landmarks
                .iter()
                .filter(|l| l.color == color)
                .map(|l| (l.x, l.y))
                .unzip();
            if x.is_empty() {
                continue;
            }
            self.layers.push(Layer::Points {
                x,
                y,
                color: cone_color(color).to_string(),
                caption: format!("{:?} cones", color),
                symbol: 'O',
                size: 1.0,
            });
        }
        self
    }

    pub fn plot_trajectory<S: VehicleState>(
        &mut self,
        trajectory: &Trajectory<S>,
        style: &PathStyle,
    ) -> &mut Self {
        if trajectory.is_empty() {
            return self;
        }
        let (x, y): (Vec<f64>, Vec<f64>) = trajectory.iter().map(|s| (s.x(), s.y())).unzip();
        self.layers.push(Layer::Lines {
            x,
            y,
            color: style.color.clone(),
            caption: style.caption.clone(),
            width: style.line_width,
        });
        self
    }

    /// Plot a pose as a point with a short heading line
    pub fn plot_pose(&mut self, pose: &Pose2D, color: &str, caption: &str) -> &mut Self {
        self.layers.push(Layer::Points {
            x: vec![pose.x],
            y: vec![pose.y],
            color: color.to_string(),
            caption: caption.to_string(),
            symbol: 'S',
            size: 1.5,
        });
        self.layers.push(Layer::Lines {
            x: vec![pose.x, pose.x + pose.yaw.cos()],
            y: vec![pose.y, pose.y + pose.yaw.sin()],
            color: color.to_string(),
            caption: String::new(),
            width: 2.0,
        });
        self
    }

    /// Plot the goal and its highlighted landmarks
    pub fn plot_snapshot(&mut self, snapshot: &VisualizationSnapshot) -> &mut Self {
        self.plot_pose(&snapshot.goal, colors::GOAL, "Goal");
        if !snapshot.landmarks.is_empty() {
            let (x, y): (Vec<f64>, Vec<f64>) =
                snapshot.landmarks.iter().map(|l| (l.x, l.y)).unzip();
            self.layers.push(Layer::Points {
                x,
                y,
                color: colors::HIGHLIGHT.to_string(),
                caption: "Goal gate".to_string(),
                symbol: 'x',
                size: 2.0,
            });
        }
        self
    }

    pub fn show(&self) -> Result<(), String> {
        let mut figure = self.render();
        figure.show().map_err(|e| e.to_string()).map(|_| ())
    }

    pub fn save_png(&self, path: &str, width: u32, height: u32) -> Result<(), String> {
        let mut figure = self.render();
        figure.save_to_png(path, width, height).map_err(|e| e.to_string())
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        {
            let axes = figure.axes2d();
            for layer in &self.layers {
                match layer {
                    Layer::Points { x, y, color, caption, symbol, size } => {
                        axes.points(x, y, &[
                            Caption(caption.as_str()),
                            Color(color.as_str()),
                            PointSymbol(*symbol),
                            PointSize(*size),
                        ]);
                    }
                    Layer::Lines { x, y, color, caption, width } => {
                        axes.lines(x, y, &[
                            Caption(caption.as_str()),
                            Color(color.as_str()),
                            LineWidth(*width),
                        ]);
                    }
                }
            }

            if !self.title.is_empty() {
                axes.set_title(&self.title, &[]);
            }
            axes.set_x_label("X [m]", &[]);
            axes.set_y_label("Y [m]", &[]);
            if let Some((min, max)) = self.x_range {
                axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
            }
            if let Some((min, max)) = self.y_range {
                axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
            }
            axes.set_aspect_ratio(AutoOption::Fix(1.0));
        }
        figure
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}
