//! Chains of bodies connected by point joints.

use approx::assert_relative_eq;
use nalgebra::{Matrix3, Point3, UnitQuaternion, Vector3};
use sim_constraint::{solve_bodies, ConstraintGraph};
use sim_core::{ChainSpec, Scene, Simulation};
use sim_types::{BodyId, Gravity, RigidBody, SimError, SimulationConfig, StabilizationConfig};

use crate::common::{slab, vertical_chain};

#[test]
fn system_is_9n_square() {
    for links in 1..=3 {
        let graph = Scene::Chain(ChainSpec::default().with_links(links)).build().unwrap();
        let system = graph
            .assemble(&Gravity::earth(), &StabilizationConfig::default())
            .unwrap()
            .unwrap();
        let matrix = system.matrix.as_dense();
        assert_eq!(matrix.nrows(), 9 * links);
        assert_eq!(matrix.ncols(), 9 * links);
        assert_eq!(system.rhs.into_dense().len(), 9 * links);
        assert_relative_eq!(matrix.clone(), matrix.transpose(), epsilon = 1e-12);
    }
}

#[test]
fn chain_at_rest_without_gravity_stays_put() {
    let graph = vertical_chain(2);
    let outcome = solve_bodies(&graph, &Gravity::zero(), &StabilizationConfig::default()).unwrap();
    assert_eq!(outcome.accelerations.len(), 2);
    for accel in &outcome.accelerations {
        assert_relative_eq!(accel.linear, Vector3::zeros(), epsilon = 1e-12);
        assert_relative_eq!(accel.angular, Vector3::zeros(), epsilon = 1e-12);
    }

    let config = SimulationConfig::default().zero_gravity();
    let mut sim = Simulation::new(Scene::Chain(ChainSpec::default().with_links(2)), config).unwrap();
    let before = sim.observe();
    sim.run(100).unwrap();
    let after = sim.observe();
    for (a, b) in before.bodies.iter().zip(&after.bodies) {
        assert_relative_eq!(a.position, b.position, epsilon = 1e-12);
    }
}

#[test]
fn hanging_chain_carries_cumulative_weight() {
    let graph = vertical_chain(3);
    let outcome = solve_bodies(&graph, &Gravity::earth(), &StabilizationConfig::default()).unwrap();

    // Joint k carries every link from k down. The anchor pushes its body up;
    // the other joints pull their first (upper) body down.
    for (k, force) in outcome.reaction_forces.iter().enumerate() {
        let load = (3 - k) as f64 * 9.81;
        let expected = if k == 0 { load } else { -load };
        assert_relative_eq!(*force, Vector3::new(0.0, expected, 0.0), epsilon = 1e-9);
    }
}

fn rotated_pair() -> (ConstraintGraph, ConstraintGraph) {
    let tilt = UnitQuaternion::from_euler_angles(0.2, 0.0, 0.5);
    let upper = slab(1.0, Point3::from(tilt * Vector3::new(0.0, -1.0, 0.0)))
        .with_orientation(tilt)
        .with_angular_velocity(Vector3::new(0.3, -0.2, 0.1));
    let hinge = upper.world_point(&Vector3::new(0.0, -1.0, 0.0));
    let lower = slab(2.0, hinge - Vector3::new(0.0, 1.0, 0.0));

    let build = |reverse: bool| {
        let mut graph = ConstraintGraph::new();
        let a = graph.add_body(upper.clone());
        let b = graph.add_body(lower.clone());
        graph.add_anchor(a, Point3::origin()).unwrap();
        if reverse {
            graph.add_joint(b, a, hinge).unwrap();
        } else {
            graph.add_joint(a, b, hinge).unwrap();
        }
        graph
    };
    (build(false), build(true))
}

#[test]
fn reversing_endpoints_flips_coupling_blocks() {
    let (forward, reversed) = rotated_pair();
    let gravity = Gravity::earth();
    let stab = StabilizationConfig::default();
    let fwd = forward.assemble(&gravity, &stab).unwrap().unwrap();
    let rev = reversed.assemble(&gravity, &stab).unwrap().unwrap();

    let layout = fwd.layout;
    let row = layout.joint(1);
    for body in 0..2 {
        let f_lin = fwd.matrix.block(row, layout.linear(body));
        let r_lin = rev.matrix.block(row, layout.linear(body));
        assert_relative_eq!(f_lin, -r_lin, epsilon = 1e-12);
        let f_ang = fwd.matrix.block(row, layout.angular(body));
        let r_ang = rev.matrix.block(row, layout.angular(body));
        assert_relative_eq!(f_ang, -r_ang, epsilon = 1e-12);
    }
    // First endpoint of the forward joint is body 0
    assert_relative_eq!(
        fwd.matrix.block(row, layout.linear(0)),
        -Matrix3::identity(),
        epsilon = 1e-12
    );
    assert_relative_eq!(fwd.rhs.block(row), -rev.rhs.block(row), epsilon = 1e-12);
}

#[test]
fn reversing_endpoints_keeps_physics() {
    let (forward, reversed) = rotated_pair();
    let gravity = Gravity::earth();
    let stab = StabilizationConfig::default();
    let fwd = solve_bodies(&forward, &gravity, &stab).unwrap();
    let rev = solve_bodies(&reversed, &gravity, &stab).unwrap();

    for (a, b) in fwd.accelerations.iter().zip(&rev.accelerations) {
        assert_relative_eq!(a.linear, b.linear, epsilon = 1e-9);
        assert_relative_eq!(a.angular, b.angular, epsilon = 1e-9);
    }
    assert_relative_eq!(fwd.reaction_forces[1], -rev.reaction_forces[1], epsilon = 1e-9);
    assert_relative_eq!(
        fwd.reaction_forces[1].norm(),
        rev.reaction_forces[1].norm(),
        epsilon = 1e-9
    );
}

#[test]
fn degenerate_inputs_are_rejected() {
    assert!(matches!(
        RigidBody::from_box(0.0, Vector3::new(1.0, 1.0, 1.0)),
        Err(SimError::InvalidMassProperties { .. })
    ));
    assert!(matches!(
        RigidBody::from_box(-1.0, Vector3::new(1.0, 1.0, 1.0)),
        Err(SimError::InvalidMassProperties { .. })
    ));

    let mut graph = ConstraintGraph::new();
    graph.add_body(slab(1.0, Point3::origin()));
    graph.add_body(slab(1.0, Point3::new(3.0, 0.0, 0.0)));
    assert!(graph
        .assemble(&Gravity::earth(), &StabilizationConfig::default())
        .unwrap()
        .is_none());
    assert!(solve_bodies(&graph, &Gravity::earth(), &StabilizationConfig::default())
        .unwrap()
        .is_empty());

    assert_eq!(
        graph.add_joint(BodyId::new(0), BodyId::new(5), Point3::origin()),
        Err(SimError::InvalidBodyId(5))
    );
}

#[test]
fn duplicate_joint_is_singular() {
    let mut graph = vertical_chain(2);
    graph
        .add_joint(BodyId::new(0), BodyId::new(1), Point3::new(0.0, -2.0, 0.0))
        .unwrap();
    let err = solve_bodies(&graph, &Gravity::earth(), &StabilizationConfig::default()).unwrap_err();
    assert!(err.is_singular());
}
