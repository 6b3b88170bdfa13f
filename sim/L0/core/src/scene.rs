//! Initial scene descriptions.
//!
//! A [`Scene`] is the recipe a [`Simulation`](crate::Simulation) rebuilds its
//! bodies and joints from on construction and on every reset.

use nalgebra::{Point3, Vector3};
use sim_constraint::ConstraintGraph;
use sim_types::{RigidBody, SimError, SimulationConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A chain of boxes hanging from a fixed anchor.
///
/// Box `i` is axis-aligned with its `+half_extents` corner on the joint above
/// it and its `-half_extents` corner on the joint below it, so the chain
/// starts out as a straight diagonal with every joint satisfied.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChainSpec {
    /// World position of the static anchor.
    pub anchor: Point3<f64>,
    /// Number of boxes in the chain.
    pub links: usize,
    /// Half extents shared by every box.
    pub half_extents: Vector3<f64>,
    /// Mass of each box.
    pub mass: f64,
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self {
            anchor: Point3::new(20.0, 37.5, 20.0),
            links: 3,
            half_extents: Vector3::new(1.0, 2.0, 3.0),
            mass: 1.0,
        }
    }
}

impl ChainSpec {
    /// Set the number of links.
    #[must_use]
    pub fn with_links(mut self, links: usize) -> Self {
        self.links = links;
        self
    }

    /// Set the anchor position.
    #[must_use]
    pub fn with_anchor(mut self, anchor: Point3<f64>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set the box half extents.
    #[must_use]
    pub fn with_half_extents(mut self, half_extents: Vector3<f64>) -> Self {
        self.half_extents = half_extents;
        self
    }

    /// Set the mass of each box.
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// World position of joint `k`; joint 0 is the anchor.
    #[must_use]
    pub fn joint_position(&self, k: usize) -> Point3<f64> {
        self.anchor - self.half_extents * (2.0 * k as f64)
    }

    /// Initial world position of box `i`'s center of mass.
    #[must_use]
    pub fn link_center(&self, i: usize) -> Point3<f64> {
        self.joint_position(i) - self.half_extents
    }

    fn build(&self) -> sim_types::Result<ConstraintGraph> {
        if self.links == 0 {
            return Err(SimError::invalid_config("chain must have at least one link"));
        }
        if !self.anchor.coords.iter().all(|x| x.is_finite()) {
            return Err(SimError::invalid_config("chain anchor must be finite"));
        }

        let mut graph = ConstraintGraph::new();
        let mut previous = None;
        for i in 0..self.links {
            let body = RigidBody::from_box(self.mass, self.half_extents)?
                .with_position(self.link_center(i));
            let id = graph.add_body(body);
            let joint = self.joint_position(i);
            match previous {
                None => graph.add_anchor(id, joint)?,
                Some(above) => graph.add_joint(above, id, joint)?,
            };
            previous = Some(id);
        }
        Ok(graph)
    }
}

/// A single free box launched from the origin.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaunchSpec {
    /// Box mass.
    pub mass: f64,
    /// Box half extents.
    pub half_extents: Vector3<f64>,
    /// Initial position.
    pub position: Point3<f64>,
    /// Launch linear velocity.
    pub linear_velocity: Vector3<f64>,
    /// Launch angular velocity.
    pub angular_velocity: Vector3<f64>,
}

impl Default for LaunchSpec {
    fn default() -> Self {
        Self {
            mass: 10.0,
            half_extents: Vector3::new(1.0, 2.0, 3.0),
            position: Point3::origin(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl LaunchSpec {
    /// Height at or below which the launch run ends.
    pub const FLOOR: f64 = -50.0;

    /// Set the launch velocities.
    #[must_use]
    pub fn with_velocity(mut self, linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }

    /// Set the box mass.
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    fn build(&self) -> sim_types::Result<ConstraintGraph> {
        let finite = |v: &Vector3<f64>| v.iter().all(|x| x.is_finite());
        if !finite(&self.position.coords)
            || !finite(&self.linear_velocity)
            || !finite(&self.angular_velocity)
        {
            return Err(SimError::invalid_config("launch state must be finite"));
        }

        let body = RigidBody::from_box(self.mass, self.half_extents)?
            .with_position(self.position)
            .with_linear_velocity(self.linear_velocity)
            .with_angular_velocity(self.angular_velocity);

        let mut graph = ConstraintGraph::new();
        graph.add_body(body);
        Ok(graph)
    }
}

/// Everything needed to (re)build a simulation's bodies and joints.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Scene {
    /// Boxes hanging from a static anchor.
    Chain(ChainSpec),
    /// One unconstrained box.
    Launch(LaunchSpec),
}

impl Default for Scene {
    fn default() -> Self {
        Self::Chain(ChainSpec::default())
    }
}

impl Scene {
    /// Build a fresh graph for this scene.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidMassProperties`] for a non-positive mass,
    /// [`SimError::DegenerateGeometry`] for non-positive half extents, and
    /// [`SimError::InvalidConfig`] for an empty chain or a non-finite
    /// initial state.
    pub fn build(&self) -> sim_types::Result<ConstraintGraph> {
        match self {
            Self::Chain(spec) => spec.build(),
            Self::Launch(spec) => spec.build(),
        }
    }

    /// Simulation settings matching how this scene is normally run.
    ///
    /// The launch scene stops once the box falls to [`LaunchSpec::FLOOR`].
    #[must_use]
    pub fn default_config(&self) -> SimulationConfig {
        match self {
            Self::Chain(_) => SimulationConfig::default(),
            Self::Launch(_) => SimulationConfig::default().fall_threshold(LaunchSpec::FLOOR),
        }
    }
}
