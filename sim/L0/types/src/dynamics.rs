//! Gravity and external force types.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Standard gravitational acceleration magnitude (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Uniform gravitational field.
///
/// The simulation is Y-up, so earth gravity points along -Y.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gravity {
    /// Acceleration due to gravity (m/s²).
    pub acceleration: Vector3<f64>,
}

impl Default for Gravity {
    fn default() -> Self {
        Self::earth()
    }
}

impl Gravity {
    /// Standard Earth gravity (9.81 m/s² in -Y direction).
    #[must_use]
    pub fn earth() -> Self {
        Self {
            acceleration: Vector3::new(0.0, -STANDARD_GRAVITY, 0.0),
        }
    }

    /// Zero gravity.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            acceleration: Vector3::zeros(),
        }
    }

    /// Custom gravity vector.
    #[must_use]
    pub fn custom(acceleration: Vector3<f64>) -> Self {
        Self { acceleration }
    }

    /// Compute the gravitational force on a body.
    #[must_use]
    pub fn force_on_mass(&self, mass: f64) -> Vector3<f64> {
        self.acceleration * mass
    }

    /// Check if the gravity vector is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.acceleration.iter().all(|x| x.is_finite())
    }
}

/// Linear and angular acceleration of one body for the current step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyAcceleration {
    /// Linear acceleration of the center of mass (m/s²).
    pub linear: Vector3<f64>,
    /// Angular acceleration in world coordinates (rad/s²).
    pub angular: Vector3<f64>,
}

impl Default for BodyAcceleration {
    fn default() -> Self {
        Self::zero()
    }
}

impl BodyAcceleration {
    /// Create an acceleration pair.
    #[must_use]
    pub const fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        Self { linear, angular }
    }

    /// Zero acceleration.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            linear: Vector3::zeros(),
            angular: Vector3::zeros(),
        }
    }

    /// Check if the acceleration contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.linear.iter().all(|x| x.is_finite()) && self.angular.iter().all(|x| x.is_finite())
    }
}
