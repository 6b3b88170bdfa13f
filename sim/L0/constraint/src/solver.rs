//! Direct solve of the coupled joint system.
//!
//! Every body's linear and angular acceleration and every joint's reaction
//! force are found together from one dense `A x = b`. The system is rebuilt
//! from scratch each step, so there is no warm-starting or iteration state.

use nalgebra::Vector3;
use sim_types::{BodyAcceleration, Gravity, StabilizationConfig};
use tracing::debug;

use crate::graph::ConstraintGraph;
use crate::linalg::lu_solve;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of one coupled solve.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveOutcome {
    /// Accelerations indexed by body id.
    pub accelerations: Vec<BodyAcceleration>,
    /// Reaction force of each joint on its first endpoint, in joint order.
    ///
    /// The second endpoint receives the negation.
    pub reaction_forces: Vec<Vector3<f64>>,
}

impl SolveOutcome {
    /// Check if the solve produced nothing (graph had no joints).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accelerations.is_empty() && self.reaction_forces.is_empty()
    }

    /// Largest reaction force magnitude (0 with no joints).
    #[must_use]
    pub fn max_reaction_force(&self) -> f64 {
        self.reaction_forces
            .iter()
            .map(Vector3::norm)
            .fold(0.0, f64::max)
    }
}

/// Assemble and solve the joint system for the graph's current state.
///
/// Returns an empty [`SolveOutcome`] when the graph has no joints; callers
/// integrate such bodies independently.
///
/// # Errors
///
/// - [`sim_types::SimError::SolverSingular`] if the system matrix is singular,
///   for example when the same point is constrained twice.
/// - [`sim_types::SimError::Diverged`] if the system or its solution is not finite.
/// - [`sim_types::SimError::InvalidBodyId`] if a joint references an unknown body.
pub fn solve_bodies(
    graph: &ConstraintGraph,
    gravity: &Gravity,
    stabilization: &StabilizationConfig,
) -> sim_types::Result<SolveOutcome> {
    let Some(system) = graph.assemble(gravity, stabilization)? else {
        return Ok(SolveOutcome::default());
    };

    let layout = system.layout;
    let solution = lu_solve(system.matrix.as_dense(), &system.rhs.into_dense())?;
    let block = |index: usize| -> Vector3<f64> {
        let start = 3 * index;
        Vector3::new(solution[start], solution[start + 1], solution[start + 2])
    };

    let accelerations = (0..layout.bodies())
        .map(|i| BodyAcceleration::new(block(layout.linear(i)), block(layout.angular(i))))
        .collect();
    let reaction_forces = (0..layout.joints())
        .map(|j| block(layout.joint(j)))
        .collect();

    let outcome = SolveOutcome {
        accelerations,
        reaction_forces,
    };
    debug!(
        dimension = layout.dimension(),
        max_reaction = outcome.max_reaction_force(),
        "solved constraint system"
    );
    Ok(outcome)
}
