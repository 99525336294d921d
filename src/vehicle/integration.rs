//! Fixed-step integrators generic over the state arithmetic
//!
//! Any state supporting componentwise addition and scalar multiplication can
//! be stepped; the rate function supplies the model.

use std::ops::{Add, Mul};

/// One explicit Euler step
pub fn euler_step<S, F>(state: S, dt: f64, mut rate: F) -> S
where
    S: Copy + Add<Output = S> + Mul<f64, Output = S>,
    F: FnMut(&S) -> S,
{
    state + rate(&state) * dt
}

/// One classic fourth-order Runge-Kutta step
pub fn rk4_step<S, F>(state: S, dt: f64, mut rate: F) -> S
where
    S: Copy + Add<Output = S> + Mul<f64, Output = S>,
    F: FnMut(&S) -> S,
{
    let k1 = rate(&state);
    let k2 = rate(&(state + k1 * (dt / 2.0)));
    let k3 = rate(&(state + k2 * (dt / 2.0)));
    let k4 = rate(&(state + k3 * dt));
    state + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}
