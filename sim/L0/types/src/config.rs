//! Configuration types for simulation.
//!
//! This module provides configuration types that control how the simulation
//! runs: timestep, gravity, constraint stabilization, and termination.

use crate::dynamics::Gravity;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default fixed timestep (seconds).
pub const DEFAULT_TIMESTEP: f64 = 0.01;

/// Main configuration for a simulation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Fixed timestep for physics integration (seconds).
    pub timestep: f64,
    /// Gravity configuration.
    pub gravity: Gravity,
    /// Baumgarte gains used when assembling joint rows.
    pub stabilization: StabilizationConfig,
    /// Vertical coordinate at or below which a falling body ends the run.
    pub fall_threshold: Option<f64>,
    /// Maximum simulation time (None for unlimited).
    pub max_time: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: DEFAULT_TIMESTEP,
            gravity: Gravity::earth(),
            stabilization: StabilizationConfig::default(),
            fall_threshold: None,
            max_time: None,
        }
    }
}

impl SimulationConfig {
    /// Create a new simulation config with the given timestep.
    #[must_use]
    pub fn with_timestep(timestep: f64) -> Self {
        Self {
            timestep,
            ..Default::default()
        }
    }

    /// Set the gravity.
    #[must_use]
    pub fn gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = gravity;
        self
    }

    /// Disable gravity (zero-G environment).
    #[must_use]
    pub fn zero_gravity(mut self) -> Self {
        self.gravity = Gravity::zero();
        self
    }

    /// Set the stabilization gains.
    #[must_use]
    pub fn stabilization(mut self, stabilization: StabilizationConfig) -> Self {
        self.stabilization = stabilization;
        self
    }

    /// End the run once any body falls to or below `y`.
    #[must_use]
    pub fn fall_threshold(mut self, y: f64) -> Self {
        self.fall_threshold = Some(y);
        self
    }

    /// Set the maximum simulation time.
    #[must_use]
    pub fn max_time(mut self, max_time: f64) -> Self {
        self.max_time = Some(max_time);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(crate::SimError::InvalidTimestep(self.timestep));
        }

        if self.timestep > 1.0 {
            return Err(crate::SimError::invalid_config(
                "timestep > 1 second is likely an error",
            ));
        }

        if !self.gravity.is_finite() {
            return Err(crate::SimError::invalid_config("gravity must be finite"));
        }

        if let Some(y) = self.fall_threshold {
            if !y.is_finite() {
                return Err(crate::SimError::invalid_config(
                    "fall threshold must be finite",
                ));
            }
        }

        if let Some(t) = self.max_time {
            if !t.is_finite() || t <= 0.0 {
                return Err(crate::SimError::invalid_config(
                    "max_time must be positive and finite",
                ));
            }
        }

        self.stabilization.validate()?;

        Ok(())
    }

    /// Get the frequency in Hz.
    #[must_use]
    pub fn frequency(&self) -> f64 {
        1.0 / self.timestep
    }
}

/// Baumgarte stabilization gains for joint rows.
///
/// Each joint row of the assembled system carries
/// `-position_gain * C - velocity_gain * dC/dt`, where `C` is the vector from
/// the first endpoint's contact point to the second's. The defaults are tuned
/// constants, not physical parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StabilizationConfig {
    /// Gain on the positional residual.
    pub position_gain: f64,
    /// Gain on the relative contact-point velocity.
    pub velocity_gain: f64,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            position_gain: 2.0,
            velocity_gain: 0.5,
        }
    }
}

impl StabilizationConfig {
    /// Create stabilization gains.
    #[must_use]
    pub const fn new(position_gain: f64, velocity_gain: f64) -> Self {
        Self {
            position_gain,
            velocity_gain,
        }
    }

    /// No drift correction at all.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            position_gain: 0.0,
            velocity_gain: 0.0,
        }
    }

    /// Validate the gains.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.position_gain.is_finite() || self.position_gain < 0.0 {
            return Err(crate::SimError::invalid_config(
                "position_gain must be finite and non-negative",
            ));
        }
        if !self.velocity_gain.is_finite() || self.velocity_gain < 0.0 {
            return Err(crate::SimError::invalid_config(
                "velocity_gain must be finite and non-negative",
            ));
        }
        Ok(())
    }
}
