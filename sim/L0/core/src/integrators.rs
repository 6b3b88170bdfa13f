//! Explicit Euler integration of rigid body state.
//!
//! Position and orientation advance with the velocities from the start of the
//! step, then the velocities advance with the solved accelerations:
//!
//! ```text
//! x(t+dt) = x(t) + v(t) * dt
//! v(t+dt) = v(t) + a(t) * dt
//! q(t+dt) = normalize(q(t) + 0.5 * (ω(t), 0) ⊗ q(t) * dt)
//! ω(t+dt) = ω(t) + α(t) * dt
//! ```
//!
//! # Example
//!
//! ```
//! use sim_core::integrators::integrate_body;
//! use sim_types::{BodyAcceleration, RigidBody};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut body = RigidBody::from_box(1.0, Vector3::new(1.0, 1.0, 1.0))
//!     .unwrap()
//!     .with_position(Point3::new(0.0, 10.0, 0.0));
//! let gravity = BodyAcceleration::new(Vector3::new(0.0, -9.81, 0.0), Vector3::zeros());
//!
//! integrate_body(&mut body, &gravity, 0.01);
//! integrate_body(&mut body, &gravity, 0.01);
//!
//! assert!(body.position.y < 10.0);
//! assert!(body.linear_velocity.y < 0.0);
//! ```

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use sim_types::{BodyAcceleration, RigidBody};
use tracing::warn;

/// Quaternions shorter than this cannot be renormalized.
const MIN_QUATERNION_NORM: f64 = 1e-12;

/// Advance one body by `dt` under constant accelerations.
pub fn integrate_body(body: &mut RigidBody, accel: &BodyAcceleration, dt: f64) {
    body.position += body.linear_velocity * dt;
    body.linear_velocity += accel.linear * dt;

    integrate_orientation(&mut body.orientation, &body.angular_velocity, dt);
    body.angular_velocity += accel.angular * dt;
}

/// First-order quaternion update for a world-frame angular velocity.
///
/// The quaternion derivative `0.5 * (ω, 0) ⊗ q` is added component-wise and the
/// result renormalized. A finite result too short to renormalize falls back to
/// the identity rotation. Non-finite input is kept as is so the caller's
/// divergence check sees it.
pub fn integrate_orientation(orientation: &mut UnitQuaternion<f64>, omega: &Vector3<f64>, dt: f64) {
    let q = *orientation.quaternion();
    let dq = Quaternion::from_imag(*omega) * q * (0.5 * dt);
    let updated = q + dq;

    if !updated.coords.iter().all(|c| c.is_finite()) {
        *orientation = UnitQuaternion::new_unchecked(updated);
        return;
    }
    match UnitQuaternion::try_new(updated, MIN_QUATERNION_NORM) {
        Some(updated) => *orientation = updated,
        None => {
            warn!(?omega, dt, "degenerate orientation, resetting to identity");
            *orientation = UnitQuaternion::identity();
        }
    }
}
