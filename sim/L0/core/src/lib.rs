//! Stepping engine for constrained rigid-body scenes.
//!
//! This crate ties together the body types from `sim-types` and the joint
//! solver from `sim-constraint` into a run loop:
//!
//! - [`Simulation`] - Owns a scene's bodies and joints, the config, and the clock
//! - [`Scene`] - Recipe the simulation builds from and resets to
//! - [`integrators`] - Explicit Euler update of position, velocity, and orientation
//!
//! # Stepping
//!
//! Each step:
//!
//! 1. Solve for accelerations: the coupled joint system when the scene has
//!    joints, an independent Newton-Euler solve per body otherwise
//! 2. Integrate every body with the fixed timestep
//! 3. Refresh the joints' cached contact points
//! 4. Advance time and check termination
//!
//! [`Simulation::tick`] is the clock-driven entry point and only steps while
//! the simulation is [`RunState::Running`].
//!
//! # Example
//!
//! ```
//! use sim_core::{LaunchSpec, Scene, Simulation};
//! use nalgebra::Vector3;
//!
//! let scene = Scene::Launch(
//!     LaunchSpec::default().with_velocity(Vector3::new(0.0, 20.0, 0.0), Vector3::new(1.0, 0.0, 0.0)),
//! );
//! let mut sim = Simulation::from_scene(scene).unwrap();
//!
//! sim.start();
//! while let Some(result) = sim.tick().unwrap() {
//!     if result.completed {
//!         break;
//!     }
//! }
//!
//! // Stopped once the box fell through the floor
//! assert!(!sim.is_running());
//! assert!(sim.bodies()[0].position.y <= LaunchSpec::FLOOR);
//! ```
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **no rendering dependencies**. A renderer reads
//! [`Simulation::observe`] after each tick and places its meshes from the
//! reported positions and orientations.

#![doc(html_root_url = "https://docs.rs/sim-core/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,       // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,           // mul_add style changes aren't always clearer
    clippy::cast_precision_loss,        // usize to f64 is fine for counts
    clippy::doc_markdown,               // Not all technical terms need backticks
)]

pub mod integrators;
mod scene;
mod simulation;

pub use scene::{ChainSpec, LaunchSpec, Scene};
pub use simulation::{BodyPose, Observation, RunState, Simulation, StepResult};

// Re-export the layers below for convenience
pub use sim_constraint::{solve_bodies, ConstraintGraph, PointJoint, SolveOutcome};
pub use sim_types::{
    BodyAcceleration, BodyId, Gravity, RigidBody, SimError, SimulationConfig, StabilizationConfig,
};
