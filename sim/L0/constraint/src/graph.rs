//! Bodies and the point joints connecting them.

use nalgebra::{Point3, Vector3};
use sim_types::{BodyId, Gravity, RigidBody, SimError, StabilizationConfig};

use crate::assembly::{assemble_system, BlockLayout, LinearSystem};
use crate::joint::PointJoint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point joint plus its cached world contact point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Constraint {
    /// The joint definition.
    pub joint: PointJoint,
    /// World contact point, refreshed from the first endpoint after each step.
    pub contact_point: Point3<f64>,
}

/// Owns the rigid bodies of a scene and the joints between them.
///
/// Body ids are indices into the body list, assigned in insertion order.
/// The builders in `sim-core` produce anchored chains (one joint per body),
/// but any set of joints between distinct bodies can be assembled.
///
/// # Example
///
/// ```
/// use sim_constraint::ConstraintGraph;
/// use sim_types::{Gravity, RigidBody, StabilizationConfig};
/// use nalgebra::{Point3, Vector3};
///
/// let mut graph = ConstraintGraph::new();
/// let body = RigidBody::from_box(1.0, Vector3::new(1.0, 2.0, 3.0))
///     .unwrap()
///     .with_position(Point3::new(0.0, -2.0, 0.0));
/// let id = graph.add_body(body);
/// graph.add_anchor(id, Point3::origin()).unwrap();
///
/// let system = graph
///     .assemble(&Gravity::earth(), &StabilizationConfig::default())
///     .unwrap()
///     .unwrap();
/// assert_eq!(system.dimension(), 9);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstraintGraph {
    bodies: Vec<RigidBody>,
    constraints: Vec<Constraint>,
}

impl ConstraintGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body and return its id.
    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        let id = BodyId::new(self.bodies.len() as u64);
        self.bodies.push(body);
        id
    }

    /// Pin `body` to a fixed world point.
    ///
    /// The body-local offset is captured from the body's current pose.
    /// Returns the joint index.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBodyId`] for an unknown body.
    pub fn add_anchor(&mut self, body: BodyId, anchor: Point3<f64>) -> sim_types::Result<usize> {
        let joint = PointJoint::anchored((body, self.checked(body)?), anchor);
        Ok(self.push(joint, anchor))
    }

    /// Pin two bodies together at a world point.
    ///
    /// `first` is the first-listed endpoint and receives the joint's reaction
    /// force with positive sign. Returns the joint index.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBodyId`] for an unknown body and
    /// [`SimError::DegenerateGeometry`] if `first == second`.
    pub fn add_joint(
        &mut self,
        first: BodyId,
        second: BodyId,
        point: Point3<f64>,
    ) -> sim_types::Result<usize> {
        let joint =
            PointJoint::between((first, self.checked(first)?), (second, self.checked(second)?), &point)?;
        Ok(self.push(joint, point))
    }

    /// Insert an already-built joint.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBodyId`] if the joint references an unknown body
    /// and [`SimError::DegenerateGeometry`] if both endpoints are the same body.
    pub fn add_constraint(&mut self, joint: PointJoint) -> sim_types::Result<usize> {
        let contact_point = joint.first_contact_point(&self.bodies)?;
        if let Some(second) = joint.second_body() {
            self.checked(second)?;
            if second == joint.first_body() {
                return Err(SimError::degenerate(format!(
                    "joint connects body {second} to itself"
                )));
            }
        }
        Ok(self.push(joint, contact_point))
    }

    fn push(&mut self, joint: PointJoint, contact_point: Point3<f64>) -> usize {
        self.constraints.push(Constraint {
            joint,
            contact_point,
        });
        self.constraints.len() - 1
    }

    fn checked(&self, id: BodyId) -> sim_types::Result<&RigidBody> {
        self.bodies
            .get(id.index())
            .ok_or(SimError::InvalidBodyId(id.raw()))
    }

    /// All bodies, indexed by [`BodyId::index`].
    #[must_use]
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    /// Mutable access to all bodies.
    pub fn bodies_mut(&mut self) -> &mut [RigidBody] {
        &mut self.bodies
    }

    /// Look up a body.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.index())
    }

    /// Look up a body mutably.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id.index())
    }

    /// All constraints in insertion order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Iterate over the joint definitions.
    pub fn joints(&self) -> impl Iterator<Item = &PointJoint> {
        self.constraints.iter().map(|c| &c.joint)
    }

    /// Number of bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of joints.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Check if the graph has no joints.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Layout of the unknowns for the current graph.
    #[must_use]
    pub fn layout(&self) -> BlockLayout {
        BlockLayout::new(self.bodies.len(), self.constraints.len())
    }

    /// Assemble `A x = b` for the current body states.
    ///
    /// Returns `Ok(None)` when the graph has no joints.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBodyId`] if a joint references an unknown body.
    pub fn assemble(
        &self,
        gravity: &Gravity,
        stabilization: &StabilizationConfig,
    ) -> sim_types::Result<Option<LinearSystem>> {
        let joints: Vec<PointJoint> = self.joints().cloned().collect();
        assemble_system(&self.bodies, &joints, gravity, stabilization)
    }

    /// Re-derive each cached contact point from its first endpoint's pose.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBodyId`] if a joint references an unknown body.
    pub fn refresh_contact_points(&mut self) -> sim_types::Result<()> {
        for constraint in &mut self.constraints {
            constraint.contact_point = constraint.joint.first_contact_point(&self.bodies)?;
        }
        Ok(())
    }

    /// Vector from joint `index`'s first contact point to its second.
    ///
    /// Zero for a satisfied joint. Returns `None` for an unknown joint index.
    #[must_use]
    pub fn position_residual(&self, index: usize) -> Option<Vector3<f64>> {
        let constraint = self.constraints.get(index)?;
        let [first, second] = constraint.joint.endpoints(&self.bodies).ok()?;
        Some(second.point - first.point)
    }

    /// Largest positional residual over all joints (0 with no joints).
    #[must_use]
    pub fn max_position_residual(&self) -> f64 {
        (0..self.constraints.len())
            .filter_map(|i| self.position_residual(i))
            .map(|r| r.norm())
            .fold(0.0, f64::max)
    }

    /// Total kinetic energy of all bodies.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(RigidBody::kinetic_energy).sum()
    }
}
