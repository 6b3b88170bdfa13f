//! Bodies hanging from a static anchor.

use approx::assert_relative_eq;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use sim_constraint::{solve_bodies, ConstraintGraph, PointJoint};
use sim_types::{BodyId, Gravity, SimulationConfig, StabilizationConfig};

use crate::common::{advance, slab};

fn hanging(mass: f64) -> ConstraintGraph {
    let mut graph = ConstraintGraph::new();
    let id = graph.add_body(slab(mass, Point3::new(0.0, -1.0, 0.0)));
    graph.add_anchor(id, Point3::origin()).unwrap();
    graph
}

/// Joint point one unit above the center, anchor misplaced `gap` above that.
fn stretched(gap: f64) -> ConstraintGraph {
    let mut graph = ConstraintGraph::new();
    let id = graph.add_body(slab(1.0, Point3::new(0.0, -1.0, 0.0)));
    graph
        .add_constraint(PointJoint::StaticAnchor {
            body: id,
            offset: Vector3::new(0.0, 1.0, 0.0),
            anchor: Point3::new(0.0, gap, 0.0),
        })
        .unwrap();
    graph
}

#[test]
fn anchor_carries_weight_at_rest() {
    for mass in [0.5, 1.0, 7.0] {
        let graph = hanging(mass);
        let outcome =
            solve_bodies(&graph, &Gravity::earth(), &StabilizationConfig::default()).unwrap();

        assert_relative_eq!(
            outcome.reaction_forces[0],
            Vector3::new(0.0, mass * 9.81, 0.0),
            epsilon = 1e-9
        );
        assert_relative_eq!(outcome.accelerations[0].linear, Vector3::zeros(), epsilon = 1e-9);
    }
}

#[test]
fn reaction_cancels_gravity_along_rod_when_released() {
    // At zero velocity the contact point has no centripetal load, so the
    // reaction balances the weight along the rod and the rest drives the swing.
    let angle: f64 = 0.6;
    let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, angle);
    let mut graph = ConstraintGraph::new();
    let body = slab(2.0, Point3::from(rotation * Vector3::new(0.0, -1.0, 0.0)))
        .with_orientation(rotation);
    let id = graph.add_body(body);
    graph.add_anchor(id, Point3::origin()).unwrap();

    let outcome = solve_bodies(&graph, &Gravity::earth(), &StabilizationConfig::default()).unwrap();

    let rod = (rotation * Vector3::new(0.0, 1.0, 0.0)).normalize();
    let weight = Vector3::new(0.0, -2.0 * 9.81, 0.0);
    let along_rod = outcome.reaction_forces[0].dot(&rod) + weight.dot(&rod);
    assert_relative_eq!(along_rod, 0.0, epsilon = 1e-9);
    assert!(outcome.accelerations[0].angular.z < 0.0);
}

#[test]
fn stabilization_pulls_drifted_joint_back() {
    let mut graph = stretched(0.5);
    let initial = graph.max_position_residual();
    assert_relative_eq!(initial, 0.5, epsilon = 1e-12);

    advance(&mut graph, &SimulationConfig::default(), 2000);

    let residual = graph.max_position_residual();
    assert!(
        residual < 0.1 * initial,
        "residual grew or stalled: {initial} -> {residual}"
    );
}

#[test]
fn without_stabilization_drift_persists() {
    let mut graph = stretched(0.5);
    let config = SimulationConfig::default().stabilization(StabilizationConfig::disabled());

    advance(&mut graph, &config, 500);

    // Acceleration-level constraint alone keeps the gap from closing
    assert_relative_eq!(graph.max_position_residual(), 0.5, epsilon = 1e-6);
}

#[test]
fn swinging_pendulum_stays_attached() {
    let angle: f64 = 0.8;
    let rotation = UnitQuaternion::from_euler_angles(angle, 0.0, 0.0);
    let mut graph = ConstraintGraph::new();
    let body = slab(1.0, Point3::from(rotation * Vector3::new(0.0, -1.0, 0.0)))
        .with_orientation(rotation);
    let id = graph.add_body(body);
    graph.add_anchor(id, Point3::origin()).unwrap();

    let config = SimulationConfig::default();
    for _ in 0..10 {
        advance(&mut graph, &config, 100);
        assert!(graph.max_position_residual() < 0.05);
        assert!(graph.body(BodyId::new(0)).unwrap().is_finite());
    }
    // The cached contact point tracks the body
    let body = graph.body(BodyId::new(0)).unwrap();
    assert_relative_eq!(
        graph.constraints()[0].contact_point,
        body.world_point(&Vector3::new(0.0, 1.0, 0.0)),
        epsilon = 1e-12
    );
}
