//! Point joints and the coupled solve for articulated rigid bodies.
//!
//! Bodies are connected by ball-joint-like point constraints, either to each
//! other ([`PointJoint::TwoBody`]) or to a fixed world location
//! ([`PointJoint::StaticAnchor`]). Each step, the accelerations of all bodies
//! and the reaction forces of all joints are found together from a single
//! dense linear system.
//!
//! # System Layout
//!
//! For `B` bodies and `J` joints the unknown vector is
//!
//! ```text
//! x = [a_0, α_0, a_1, α_1, ..., λ_0, λ_1, ...]      (6B + 3J scalars)
//! ```
//!
//! and the matrix is symmetric with a zero lower-right block:
//!
//! ```text
//! | m_i I        0       -s I    |   | a_i |   | F_i                    |
//! |   0       I_w,i    -s [r]×ᵀ  | · | α_i | = | τ_i - ω_i × (I_w ω_i)  |
//! | -s I     s [r]×       0      |   | λ_j |   | centripetal + Baumgarte |
//! ```
//!
//! where `s` is `+1` for a joint's first endpoint and `-1` for its second.
//! `λ_j` is the force joint `j` applies to its first endpoint.
//!
//! A chain of `N` bodies hung from one anchor yields a `9N × 9N` system.
//!
//! # Drift Stabilization
//!
//! Joint rows enforce `C̈ + kd·Ċ + kp·C = 0` on the endpoint separation `C`,
//! with gains from [`sim_types::StabilizationConfig`]. This pulls numerically
//! drifted joints back together instead of letting the error grow.
//!
//! # Example
//!
//! ```
//! use sim_constraint::{solve_bodies, ConstraintGraph};
//! use sim_types::{Gravity, RigidBody, StabilizationConfig};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut graph = ConstraintGraph::new();
//! let body = RigidBody::from_box(1.0, Vector3::new(0.5, 1.0, 0.5))
//!     .unwrap()
//!     .with_position(Point3::new(0.0, -1.0, 0.0));
//! let id = graph.add_body(body);
//! graph.add_anchor(id, Point3::origin()).unwrap();
//!
//! let outcome = solve_bodies(&graph, &Gravity::earth(), &StabilizationConfig::default()).unwrap();
//! // Hanging straight down: the anchor carries the full weight.
//! assert!((outcome.reaction_forces[0].y - 9.81).abs() < 1e-9);
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **no rendering dependencies**. It can be used in
//! headless runs, tests, and benchmarks.

#![doc(html_root_url = "https://docs.rs/sim-constraint/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::cast_precision_loss)]

mod assembly;
mod graph;
mod joint;
mod linalg;
mod solver;

pub use assembly::{
    assemble_system, skew, BlockLayout, BlockMatrix, BlockVector, LinearSystem,
};
pub use graph::{Constraint, ConstraintGraph};
pub use joint::{Endpoint, EndpointSide, PointJoint};
pub use linalg::{lu_factor_in_place, lu_solve, lu_solve_factored, SINGULAR_PIVOT_TOLERANCE};
pub use solver::{solve_bodies, SolveOutcome};

// Re-export types needed to build a graph
pub use sim_types::{BodyId, Point3, Vector3};
