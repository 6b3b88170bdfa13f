//! Core types for constrained rigid-body simulation.
//!
//! This crate provides the foundational types shared by the constraint
//! solver and the stepping engine:
//!
//! - [`RigidBody`] - Position, orientation, velocity, and mass of one body
//! - [`MassProperties`] - Mass and body-local inertia (box formula included)
//! - [`Gravity`] - Uniform gravitational field
//! - [`BodyAcceleration`] - Per-body solve output consumed by the integrator
//! - [`SimulationConfig`] - Timestep, gravity, stabilization gains, termination
//! - [`SimError`] - Everything that can go wrong
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **no rendering dependencies**. Rendering
//! layers read body positions and orientations after each step.
//!
//! # Coordinate System
//!
//! - X: right
//! - Y: up
//! - Z: toward the viewer
//! - Right-handed, gravity along -Y
//!
//! # Example
//!
//! ```
//! use sim_types::{Gravity, RigidBody};
//! use nalgebra::{Point3, Vector3};
//!
//! let body = RigidBody::from_box(1.0, Vector3::new(1.0, 2.0, 3.0))
//!     .unwrap()
//!     .with_position(Point3::new(0.0, 10.0, 0.0));
//!
//! let accel = body.solve_unconstrained(&Gravity::earth()).unwrap();
//! assert!((accel.linear.y + 9.81).abs() < 1e-12);
//! ```

#![doc(html_root_url = "https://docs.rs/sim-types/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::cast_precision_loss,       // usize to f64 is fine for counts
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod body;
mod config;
mod dynamics;
mod error;

pub use body::{BodyId, MassProperties, RigidBody};
pub use config::{SimulationConfig, StabilizationConfig, DEFAULT_TIMESTEP};
pub use dynamics::{BodyAcceleration, Gravity, STANDARD_GRAVITY};
pub use error::SimError;

// Re-export math types for convenience
pub use nalgebra::{Matrix3, Point3, UnitQuaternion, Vector3};

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
