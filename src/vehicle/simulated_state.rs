//! State type for numerically integrated vehicle simulation
//!
//! Implements the kinematic bicycle model rates:
//!
//! ```text
//! x'     = v * cos(yaw)
//! y'     = v * sin(yaw)
//! yaw'   = v / L * tan(delta)
//! v'     = a
//! delta' = steering_rate
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

use crate::common::VehicleState;

/// Control input driving the simulated state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Control {
    /// Longitudinal acceleration [m/s^2]
    pub acceleration: f64,
    /// Steering angle rate [rad/s]
    pub steering_rate: f64,
}

impl Control {
    pub fn new(acceleration: f64, steering_rate: f64) -> Self {
        Self { acceleration, steering_rate }
    }

    pub fn zero() -> Self {
        Self { acceleration: 0.0, steering_rate: 0.0 }
    }
}

/// Vehicle geometry needed by the bicycle model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleGeometry {
    /// Wheelbase [m]
    pub wheelbase: f64,
}

impl VehicleGeometry {
    pub fn new(wheelbase: f64) -> Self {
        Self { wheelbase }
    }
}

/// Position, heading, velocity and steering angle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulatedState {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub v: f64,
    pub delta: f64,
}

impl SimulatedState {
    pub fn new(x: f64, y: f64, yaw: f64, v: f64, delta: f64) -> Self {
        Self { x, y, yaw, v, delta }
    }

    /// Time derivative of the state under `control`
    pub fn derivative(&self, control: &Control, geometry: &VehicleGeometry) -> SimulatedState {
        SimulatedState {
            x: self.v * self.yaw.cos(),
            y: self.v * self.yaw.sin(),
            yaw: self.v / geometry.wheelbase * self.delta.tan(),
            v: control.acceleration,
            delta: control.steering_rate,
        }
    }
}

impl Add for SimulatedState {
    type Output = SimulatedState;

    fn add(self, other: SimulatedState) -> SimulatedState {
        SimulatedState {
            x: self.x + other.x,
            y: self.y + other.y,
            yaw: self.yaw + other.yaw,
            v: self.v + other.v,
            delta: self.delta + other.delta,
        }
    }
}

impl Sub for SimulatedState {
    type Output = SimulatedState;

    fn sub(self, other: SimulatedState) -> SimulatedState {
        SimulatedState {
            x: self.x - other.x,
            y: self.y - other.y,
            yaw: self.yaw - other.yaw,
            v: self.v - other.v,
            delta: self.delta - other.delta,
        }
    }
}

impl Mul<f64> for SimulatedState {
    type Output = SimulatedState;

    fn mul(self, k: f64) -> SimulatedState {
        SimulatedState {
            x: self.x * k,
            y: self.y * k,
            yaw: self.yaw * k,
            v: self.v * k,
            delta: self.delta * k,
        }
    }
}

impl VehicleState for SimulatedState {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn yaw(&self) -> f64 {
        self.yaw
    }

    fn forward_velocity(&self) -> f64 {
        self.v
    }
}
