//! Rigid body state and mass properties.
//!
//! A [`RigidBody`] carries its full 6-DOF state (center-of-mass position,
//! orientation, linear and angular velocity) together with validated mass
//! properties and the external forces currently applied to it.

use nalgebra::{Matrix3, Point3, UnitQuaternion, Vector3};

use crate::dynamics::{BodyAcceleration, Gravity};
use crate::{Result, SimError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unique identifier for a rigid body in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyId(pub u64);

impl BodyId {
    /// Create a new body ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The ID as an index into a body list.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u64> for BodyId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

/// Mass properties of a rigid body.
///
/// The inertia tensor is expressed about the center of mass in the
/// body-local frame, which is assumed to be axis-aligned with the body.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MassProperties {
    /// Total mass in kg.
    pub mass: f64,
    /// Inertia tensor about center of mass in local coordinates (kg·m²).
    pub inertia: Matrix3<f64>,
}

impl MassProperties {
    /// Create mass properties with given values.
    #[must_use]
    pub const fn new(mass: f64, inertia: Matrix3<f64>) -> Self {
        Self { mass, inertia }
    }

    /// Create mass properties for a uniform box.
    ///
    /// Inertia of a solid box with full dimensions (w, h, d):
    /// - Ixx = (1/12) * m * (h² + d²)
    /// - Iyy = (1/12) * m * (w² + d²)
    /// - Izz = (1/12) * m * (w² + h²)
    #[must_use]
    pub fn box_shape(mass: f64, half_extents: Vector3<f64>) -> Self {
        let w2 = 4.0 * half_extents.x * half_extents.x;
        let h2 = 4.0 * half_extents.y * half_extents.y;
        let d2 = 4.0 * half_extents.z * half_extents.z;

        let ixx = mass * (h2 + d2) / 12.0;
        let iyy = mass * (w2 + d2) / 12.0;
        let izz = mass * (w2 + h2) / 12.0;

        Self {
            mass,
            inertia: Matrix3::from_diagonal(&Vector3::new(ixx, iyy, izz)),
        }
    }

    /// Get the inverse mass.
    #[must_use]
    pub fn inverse_mass(&self) -> f64 {
        1.0 / self.mass
    }

    /// Get the inverse inertia tensor, or `None` if it is singular.
    #[must_use]
    pub fn inverse_inertia(&self) -> Option<Matrix3<f64>> {
        self.inertia.try_inverse()
    }

    /// Validate that the mass properties describe a dynamic body.
    ///
    /// Mass must be strictly positive and finite, and every principal moment
    /// must be strictly positive: a zero moment makes the per-body
    /// Newton-Euler system singular.
    pub fn validate(&self) -> Result<()> {
        if !self.mass.is_finite() {
            return Err(SimError::invalid_mass("mass must be finite"));
        }

        if self.mass <= 0.0 {
            return Err(SimError::invalid_mass(format!(
                "mass must be positive, got {}",
                self.mass
            )));
        }

        if !self.inertia.iter().all(|x| x.is_finite()) {
            return Err(SimError::invalid_mass("inertia tensor must be finite"));
        }

        let diagonal = self.inertia.diagonal();
        if diagonal.iter().any(|&i| i <= 0.0) {
            return Err(SimError::invalid_mass(
                "inertia tensor must have positive principal moments",
            ));
        }

        if self.inverse_inertia().is_none() {
            return Err(SimError::invalid_mass("inertia tensor is not invertible"));
        }

        Ok(())
    }
}

/// A rigid body: state, mass properties, and applied forces.
///
/// Position is the center of mass in world space. Angular velocity is
/// expressed in the world frame. `external_forces` holds the applied forces
/// (gravity excluded); they act on every step until the caller replaces them.
///
/// # Example
///
/// ```
/// use sim_types::{Gravity, RigidBody};
/// use nalgebra::{Point3, Vector3};
///
/// let body = RigidBody::from_box(10.0, Vector3::new(1.0, 2.0, 3.0))
///     .unwrap()
///     .with_position(Point3::new(0.0, 5.0, 0.0));
///
/// let force = body.net_force(&Gravity::earth());
/// assert!((force.y + 98.1).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidBody {
    /// Center of mass in world coordinates.
    pub position: Point3<f64>,
    /// Linear velocity in world coordinates (m/s).
    pub linear_velocity: Vector3<f64>,
    /// Orientation as a unit quaternion.
    pub orientation: UnitQuaternion<f64>,
    /// Angular velocity in world coordinates (rad/s).
    pub angular_velocity: Vector3<f64>,
    /// Forces applied at the center of mass, excluding gravity.
    pub external_forces: Vec<Vector3<f64>>,
    mass_props: MassProperties,
}

impl RigidBody {
    /// Create a body at rest at the origin.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidMassProperties`] if the mass is not
    /// strictly positive or the inertia tensor is not invertible.
    pub fn new(mass_props: MassProperties) -> Result<Self> {
        mass_props.validate()?;
        Ok(Self {
            position: Point3::origin(),
            linear_velocity: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            angular_velocity: Vector3::zeros(),
            external_forces: Vec::new(),
            mass_props,
        })
    }

    /// Create a uniform box body from its mass and half extents.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidMassProperties`] for a non-positive mass and
    /// [`SimError::DegenerateGeometry`] for a non-positive half extent.
    pub fn from_box(mass: f64, half_extents: Vector3<f64>) -> Result<Self> {
        if half_extents.iter().any(|&h| !h.is_finite() || h <= 0.0) {
            return Err(SimError::degenerate(format!(
                "box half extents must be positive, got {half_extents:?}"
            )));
        }
        Self::new(MassProperties::box_shape(mass, half_extents))
    }

    /// Set the center-of-mass position.
    #[must_use]
    pub fn with_position(mut self, position: Point3<f64>) -> Self {
        self.position = position;
        self
    }

    /// Set the orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: UnitQuaternion<f64>) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the linear velocity.
    #[must_use]
    pub fn with_linear_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Set the angular velocity.
    #[must_use]
    pub fn with_angular_velocity(mut self, omega: Vector3<f64>) -> Self {
        self.angular_velocity = omega;
        self
    }

    /// Mass in kg.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass_props.mass
    }

    /// Mass properties.
    #[must_use]
    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass_props
    }

    /// Inertia tensor in the body-local frame.
    #[must_use]
    pub fn local_inertia(&self) -> &Matrix3<f64> {
        &self.mass_props.inertia
    }

    /// Rotation matrix of the current orientation.
    #[must_use]
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.orientation.to_rotation_matrix().into_inner()
    }

    /// Inertia tensor rotated into the world frame: `R · I_local · Rᵀ`.
    ///
    /// Orientation changes every step, so this is recomputed on each call.
    #[must_use]
    pub fn world_inertia_tensor(&self) -> Matrix3<f64> {
        let r = self.rotation_matrix();
        r * self.mass_props.inertia * r.transpose()
    }

    /// Sum of the applied external forces plus `mass * gravity`.
    #[must_use]
    pub fn net_force(&self, gravity: &Gravity) -> Vector3<f64> {
        self.external_forces
            .iter()
            .fold(gravity.force_on_mass(self.mass()), |acc, f| acc + f)
    }

    /// Net external torque about the center of mass.
    ///
    /// No external torques are modeled; applied torques would be added here.
    #[must_use]
    pub fn net_torque(&self) -> Vector3<f64> {
        Vector3::zeros()
    }

    /// Gyroscopic term `ω × (I_world · ω)` of Euler's equations.
    #[must_use]
    pub fn gyroscopic_torque(&self, world_inertia: &Matrix3<f64>) -> Vector3<f64> {
        self.angular_velocity
            .cross(&(world_inertia * self.angular_velocity))
    }

    /// Replace the applied external forces.
    pub fn apply_forces(&mut self, forces: Vec<Vector3<f64>>) {
        self.external_forces = forces;
    }

    /// Remove all applied external forces.
    pub fn clear_forces(&mut self) {
        self.external_forces.clear();
    }

    /// Rotate a body-local offset into the world frame.
    #[must_use]
    pub fn world_offset(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.orientation * local
    }

    /// World position of a point rigidly attached at a body-local offset.
    #[must_use]
    pub fn world_point(&self, local: &Vector3<f64>) -> Point3<f64> {
        self.position + self.world_offset(local)
    }

    /// Body-local offset from the center of mass to a world point.
    #[must_use]
    pub fn local_offset(&self, world: &Point3<f64>) -> Vector3<f64> {
        self.orientation.inverse_transform_vector(&(world - self.position))
    }

    /// Velocity of a material point at world-frame offset `r` from the center of mass.
    ///
    /// `v_point` = `v` + ω × r
    #[must_use]
    pub fn velocity_at_offset(&self, r: &Vector3<f64>) -> Vector3<f64> {
        self.linear_velocity + self.angular_velocity.cross(r)
    }

    /// Solve the unconstrained 6x6 Newton-Euler system.
    ///
    /// `diag(m, m, m) ⊕ I_world` times `[a; α]` equals
    /// `[net_force; net_torque - ω × (I_world · ω)]`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::SolverSingular`] if the world inertia tensor cannot
    /// be inverted, and [`SimError::Diverged`] if the result is not finite.
    pub fn solve_unconstrained(&self, gravity: &Gravity) -> Result<BodyAcceleration> {
        let inertia = self.world_inertia_tensor();
        let torque = self.net_torque() - self.gyroscopic_torque(&inertia);

        let linear = self.net_force(gravity) / self.mass();
        let angular = solve_angular(&inertia, &torque)?;

        let accel = BodyAcceleration::new(linear, angular);
        if !accel.is_finite() {
            return Err(SimError::diverged(
                "non-finite acceleration in unconstrained solve",
            ));
        }
        Ok(accel)
    }

    /// Kinetic energy: `½ m |v|² + ½ ωᵀ I_world ω`.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        let inertia = self.world_inertia_tensor();
        let linear = 0.5 * self.mass() * self.linear_velocity.norm_squared();
        let angular = 0.5 * self.angular_velocity.dot(&(inertia * self.angular_velocity));
        linear + angular
    }

    /// Check if the state contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|x| x.is_finite())
            && self.linear_velocity.iter().all(|x| x.is_finite())
            && self.orientation.coords.iter().all(|x| x.is_finite())
            && self.angular_velocity.iter().all(|x| x.is_finite())
    }
}

/// First row of the angular block in the 6x6 Newton-Euler system.
const ANGULAR_BLOCK_ROW: usize = 3;

/// Solve `I_world · α = τ`.
///
/// nalgebra's LU does not say which pivot failed, so a singular tensor is
/// reported at the first row of the angular block.
fn solve_angular(inertia: &Matrix3<f64>, torque: &Vector3<f64>) -> Result<Vector3<f64>> {
    inertia
        .lu()
        .solve(torque)
        .ok_or(SimError::SolverSingular {
            size: 6,
            pivot_row: ANGULAR_BLOCK_ROW,
        })
}
