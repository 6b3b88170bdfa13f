//! Integration tests for the sim-* crate stack.
//!
//! These tests drive bodies, joints, and the run loop together:
//! - Free flight of a single body (gravity, spin, quaternion norm)
//! - Anchored pendulums (reaction forces, drift correction)
//! - Chains (system size, endpoint sign convention, rest states)
//! - The run loop state machine (start, stop, reset, termination)

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]

mod chain;
mod common;
mod free_body;
mod pendulum;
mod run_loop;
