//! Block-structured assembly of the coupled Newton-Euler / joint system.
//!
//! # Layout
//!
//! For `B` bodies and `J` joints the unknown vector has `6B + 3J` entries:
//!
//! ```text
//! x = [ a_0, α_0, a_1, α_1, ..., a_{B-1}, α_{B-1}, λ_0, ..., λ_{J-1} ]
//! ```
//!
//! where `a_i`/`α_i` are body linear/angular accelerations and `λ_j` is the
//! reaction force joint `j` applies to its first endpoint. Every unknown is a
//! 3-vector, so the matrix is addressed in 3x3 blocks.
//!
//! # Matrix
//!
//! ```text
//! ┌                          ┐
//! │  M        Gᵀ             │   M = diag(m_i·I₃, I_world,i)
//! │                          │
//! │  G        0              │   G = joint rows
//! └                          ┘
//! ```
//!
//! For endpoint side `s` (`+1` first, `-1` second) of joint `j` on body `i`
//! with world lever arm `r`:
//!
//! ```text
//! A[λ_j, a_i] = -s·I₃      A[a_i, λ_j] = -s·I₃
//! A[λ_j, α_i] = +s·[r]×    A[α_i, λ_j] = -s·[r]×   ([r]×ᵀ = -[r]×)
//! ```
//!
//! A fixed anchor contributes no unknowns, so only its body side is written.
//!
//! # Right-hand side
//!
//! Body rows carry `F_i` and `τ_i - ω_i × (I_world,i · ω_i)`. Joint rows carry
//! the relative centripetal term `ω₁×(ω₁×r₁) - ω₂×(ω₂×r₂)` plus Baumgarte
//! stabilization `-k_p·(p₂ - p₁) - k_d·(v₂ - v₁)`.

use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use sim_types::{Gravity, RigidBody, StabilizationConfig};
use tracing::debug;

use crate::joint::{EndpointSide, PointJoint};

/// Cross-product matrix: [v]× such that [v]× w = v × w.
#[inline]
#[must_use]
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Block indices of the unknowns for a given body/joint count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    bodies: usize,
    joints: usize,
}

impl BlockLayout {
    /// Layout for `bodies` bodies and `joints` joints.
    #[must_use]
    pub const fn new(bodies: usize, joints: usize) -> Self {
        Self { bodies, joints }
    }

    /// Number of bodies.
    #[must_use]
    pub const fn bodies(&self) -> usize {
        self.bodies
    }

    /// Number of joints.
    #[must_use]
    pub const fn joints(&self) -> usize {
        self.joints
    }

    /// Block holding body `i`'s linear acceleration.
    #[must_use]
    pub const fn linear(&self, body: usize) -> usize {
        2 * body
    }

    /// Block holding body `i`'s angular acceleration.
    #[must_use]
    pub const fn angular(&self, body: usize) -> usize {
        2 * body + 1
    }

    /// Block holding joint `j`'s reaction force.
    #[must_use]
    pub const fn joint(&self, joint: usize) -> usize {
        2 * self.bodies + joint
    }

    /// Total number of 3x3 blocks per row.
    #[must_use]
    pub const fn block_count(&self) -> usize {
        2 * self.bodies + self.joints
    }

    /// Scalar dimension of the system: `6B + 3J`.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        3 * self.block_count()
    }
}

/// Dense matrix written and read in 3x3 blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMatrix {
    blocks: usize,
    data: DMatrix<f64>,
}

impl BlockMatrix {
    /// Zero matrix of `blocks x blocks` 3x3 blocks.
    #[must_use]
    pub fn zeros(blocks: usize) -> Self {
        Self {
            blocks,
            data: DMatrix::zeros(3 * blocks, 3 * blocks),
        }
    }

    /// Number of block rows (and columns).
    #[must_use]
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Overwrite block `(row, col)`.
    pub fn set_block(&mut self, row: usize, col: usize, block: &Matrix3<f64>) {
        self.data
            .fixed_view_mut::<3, 3>(3 * row, 3 * col)
            .copy_from(block);
    }

    /// Accumulate into block `(row, col)`.
    pub fn add_block(&mut self, row: usize, col: usize, block: &Matrix3<f64>) {
        let mut view = self.data.fixed_view_mut::<3, 3>(3 * row, 3 * col);
        view += block;
    }

    /// Read block `(row, col)`.
    #[must_use]
    pub fn block(&self, row: usize, col: usize) -> Matrix3<f64> {
        self.data.fixed_view::<3, 3>(3 * row, 3 * col).into_owned()
    }

    /// Accumulate block `(row, col)` and its transpose at `(col, row)`.
    pub fn add_symmetric_pair(&mut self, row: usize, col: usize, block: &Matrix3<f64>) {
        self.add_block(row, col, block);
        self.add_block(col, row, &block.transpose());
    }

    /// Consume into the dense scalar matrix.
    #[must_use]
    pub fn into_dense(self) -> DMatrix<f64> {
        self.data
    }

    /// Borrow the dense scalar matrix.
    #[must_use]
    pub fn as_dense(&self) -> &DMatrix<f64> {
        &self.data
    }
}

/// Block vector companion to [`BlockMatrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct BlockVector {
    data: DVector<f64>,
}

impl BlockVector {
    /// Zero vector of `blocks` 3-vectors.
    #[must_use]
    pub fn zeros(blocks: usize) -> Self {
        Self {
            data: DVector::zeros(3 * blocks),
        }
    }

    /// Overwrite block `index`.
    pub fn set_block(&mut self, index: usize, value: &Vector3<f64>) {
        self.data.fixed_rows_mut::<3>(3 * index).copy_from(value);
    }

    /// Read block `index`.
    #[must_use]
    pub fn block(&self, index: usize) -> Vector3<f64> {
        self.data.fixed_rows::<3>(3 * index).into_owned()
    }

    /// Consume into the dense scalar vector.
    #[must_use]
    pub fn into_dense(self) -> DVector<f64> {
        self.data
    }
}

/// An assembled `A x = b` system together with its layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    /// Block layout of the unknowns.
    pub layout: BlockLayout,
    /// System matrix `A`.
    pub matrix: BlockMatrix,
    /// Right-hand side `b`.
    pub rhs: BlockVector,
}

impl LinearSystem {
    /// Scalar dimension of the system.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.layout.dimension()
    }
}

/// Assemble the coupled system for `bodies` connected by `joints`.
///
/// Returns `Ok(None)` when there are no joints: nothing couples the bodies
/// and the caller should not attempt a solve.
///
/// # Errors
///
/// Returns [`sim_types::SimError::InvalidBodyId`] if a joint references a
/// body outside `bodies`.
pub fn assemble_system(
    bodies: &[RigidBody],
    joints: &[PointJoint],
    gravity: &Gravity,
    stabilization: &StabilizationConfig,
) -> sim_types::Result<Option<LinearSystem>> {
    if joints.is_empty() {
        debug!(bodies = bodies.len(), "no joints, skipping assembly");
        return Ok(None);
    }

    let layout = BlockLayout::new(bodies.len(), joints.len());
    let mut matrix = BlockMatrix::zeros(layout.block_count());
    let mut rhs = BlockVector::zeros(layout.block_count());

    for (i, body) in bodies.iter().enumerate() {
        let inertia = body.world_inertia_tensor();
        matrix.set_block(
            layout.linear(i),
            layout.linear(i),
            &(Matrix3::identity() * body.mass()),
        );
        matrix.set_block(layout.angular(i), layout.angular(i), &inertia);

        rhs.set_block(layout.linear(i), &body.net_force(gravity));
        rhs.set_block(
            layout.angular(i),
            &(body.net_torque() - body.gyroscopic_torque(&inertia)),
        );
    }

    for (j, joint) in joints.iter().enumerate() {
        let row = layout.joint(j);
        let endpoints = joint.endpoints(bodies)?;

        for (endpoint, side) in endpoints
            .iter()
            .zip([EndpointSide::First, EndpointSide::Second])
        {
            let Some(id) = endpoint.body else {
                continue;
            };
            let s = side.sign();
            let i = id.index();
            matrix.add_symmetric_pair(row, layout.linear(i), &(Matrix3::identity() * -s));
            matrix.add_symmetric_pair(row, layout.angular(i), &(skew(&endpoint.offset) * s));
        }

        let [first, second] = endpoints;
        let centripetal = first.centripetal - second.centripetal;
        let position_residual = second.point - first.point;
        let velocity_residual = second.velocity - first.velocity;
        let correction = -position_residual * stabilization.position_gain
            - velocity_residual * stabilization.velocity_gain;

        rhs.set_block(row, &(centripetal + correction));
    }

    debug!(
        bodies = layout.bodies(),
        joints = layout.joints(),
        dimension = layout.dimension(),
        "assembled constraint system"
    );

    Ok(Some(LinearSystem {
        layout,
        matrix,
        rhs,
    }))
}
