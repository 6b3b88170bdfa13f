//! Point joints and their endpoint kinematics.
//!
//! A point joint pins one material point of a body either to a material
//! point of another body ([`PointJoint::TwoBody`]) or to a fixed world
//! location ([`PointJoint::StaticAnchor`]). Offsets are stored in each body's
//! local frame when the joint is created and rotated back into the world
//! frame whenever the joint is evaluated.

use nalgebra::{Point3, Vector3};
use sim_types::{BodyId, RigidBody, SimError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which side of a joint an endpoint sits on.
///
/// The first endpoint receives the joint's reaction force `+λ`, the second
/// receives `-λ`. Every sign in the assembled rows follows from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EndpointSide {
    /// First-listed endpoint.
    First,
    /// Second-listed endpoint.
    Second,
}

impl EndpointSide {
    /// `+1.0` for the first endpoint, `-1.0` for the second.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::First => 1.0,
            Self::Second => -1.0,
        }
    }
}

/// A ball-joint-like point constraint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PointJoint {
    /// Joint between two dynamic bodies.
    TwoBody {
        /// First-listed body.
        first: BodyId,
        /// Second-listed body.
        second: BodyId,
        /// Joint location relative to the first body's center of mass, body frame.
        first_offset: Vector3<f64>,
        /// Joint location relative to the second body's center of mass, body frame.
        second_offset: Vector3<f64>,
    },
    /// Joint between a dynamic body and a fixed world point.
    ///
    /// The body is always the first endpoint; the anchor contributes no unknowns.
    StaticAnchor {
        /// The attached body.
        body: BodyId,
        /// Joint location relative to the body's center of mass, body frame.
        offset: Vector3<f64>,
        /// Fixed world position of the anchor.
        anchor: Point3<f64>,
    },
}

impl PointJoint {
    /// Pin two bodies together at a world point, capturing local offsets from
    /// their current poses.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DegenerateGeometry`] if both ids are the same body.
    pub fn between(
        first: (BodyId, &RigidBody),
        second: (BodyId, &RigidBody),
        point: &Point3<f64>,
    ) -> sim_types::Result<Self> {
        if first.0 == second.0 {
            return Err(SimError::degenerate(format!(
                "joint endpoints must be distinct bodies, got {} twice",
                first.0
            )));
        }
        Ok(Self::TwoBody {
            first: first.0,
            second: second.0,
            first_offset: first.1.local_offset(point),
            second_offset: second.1.local_offset(point),
        })
    }

    /// Pin a body to a fixed world point, capturing the body-local offset of
    /// that point from the body's current pose.
    #[must_use]
    pub fn anchored(body: (BodyId, &RigidBody), anchor: Point3<f64>) -> Self {
        Self::StaticAnchor {
            body: body.0,
            offset: body.1.local_offset(&anchor),
            anchor,
        }
    }

    /// The body id of the first endpoint.
    #[must_use]
    pub fn first_body(&self) -> BodyId {
        match self {
            Self::TwoBody { first, .. } => *first,
            Self::StaticAnchor { body, .. } => *body,
        }
    }

    /// The body id of the second endpoint, `None` for a static anchor.
    #[must_use]
    pub fn second_body(&self) -> Option<BodyId> {
        match self {
            Self::TwoBody { second, .. } => Some(*second),
            Self::StaticAnchor { .. } => None,
        }
    }

    /// Check if the second endpoint is a fixed world point.
    #[must_use]
    pub fn is_anchored(&self) -> bool {
        matches!(self, Self::StaticAnchor { .. })
    }

    /// The same joint with its endpoints listed in the opposite order.
    ///
    /// Static anchors keep the body as first endpoint and are returned as-is.
    #[must_use]
    pub fn reversed(&self) -> Self {
        match self {
            Self::TwoBody {
                first,
                second,
                first_offset,
                second_offset,
            } => Self::TwoBody {
                first: *second,
                second: *first,
                first_offset: *second_offset,
                second_offset: *first_offset,
            },
            Self::StaticAnchor { .. } => self.clone(),
        }
    }

    /// Evaluate both endpoints against the current body states.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBodyId`] if an endpoint references a body
    /// that is not in `bodies`.
    pub fn endpoints(&self, bodies: &[RigidBody]) -> sim_types::Result<[Endpoint; 2]> {
        match self {
            Self::TwoBody {
                first,
                second,
                first_offset,
                second_offset,
            } => Ok([
                Endpoint::on_body(*first, lookup(bodies, *first)?, first_offset),
                Endpoint::on_body(*second, lookup(bodies, *second)?, second_offset),
            ]),
            Self::StaticAnchor {
                body,
                offset,
                anchor,
            } => Ok([
                Endpoint::on_body(*body, lookup(bodies, *body)?, offset),
                Endpoint::fixed(*anchor),
            ]),
        }
    }

    /// World position of the joint as seen from the first endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBodyId`] for an unknown first body.
    pub fn first_contact_point(&self, bodies: &[RigidBody]) -> sim_types::Result<Point3<f64>> {
        let (id, offset) = match self {
            Self::TwoBody {
                first,
                first_offset,
                ..
            } => (*first, first_offset),
            Self::StaticAnchor { body, offset, .. } => (*body, offset),
        };
        Ok(lookup(bodies, id)?.world_point(offset))
    }
}

fn lookup(bodies: &[RigidBody], id: BodyId) -> sim_types::Result<&RigidBody> {
    bodies
        .get(id.index())
        .ok_or(SimError::InvalidBodyId(id.raw()))
}

/// One side of a joint evaluated in the world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    /// Attached body, `None` for a fixed world point.
    pub body: Option<BodyId>,
    /// World-frame lever arm from the body's center of mass to the joint.
    pub offset: Vector3<f64>,
    /// World position of the joint according to this endpoint.
    pub point: Point3<f64>,
    /// World velocity of that material point: `v + ω × r`.
    pub velocity: Vector3<f64>,
    /// Centripetal acceleration of that material point: `ω × (ω × r)`.
    pub centripetal: Vector3<f64>,
}

impl Endpoint {
    fn on_body(id: BodyId, body: &RigidBody, local_offset: &Vector3<f64>) -> Self {
        let offset = body.world_offset(local_offset);
        let omega = body.angular_velocity;
        Self {
            body: Some(id),
            offset,
            point: body.position + offset,
            velocity: body.velocity_at_offset(&offset),
            centripetal: omega.cross(&omega.cross(&offset)),
        }
    }

    fn fixed(point: Point3<f64>) -> Self {
        Self {
            body: None,
            offset: Vector3::zeros(),
            point,
            velocity: Vector3::zeros(),
            centripetal: Vector3::zeros(),
        }
    }
}
