//! Shared scene builders for the integration tests.

use nalgebra::{Point3, Vector3};
use sim_constraint::{solve_bodies, ConstraintGraph};
use sim_core::integrators::integrate_body;
use sim_types::{BodyId, RigidBody, SimulationConfig};

/// A 1 x 2 x 1 box of the given mass centered at `position`.
pub fn slab(mass: f64, position: Point3<f64>) -> RigidBody {
    RigidBody::from_box(mass, Vector3::new(0.5, 1.0, 0.5))
        .unwrap()
        .with_position(position)
}

/// A vertical chain of `links` slabs hanging from the origin.
pub fn vertical_chain(links: usize) -> ConstraintGraph {
    let mut graph = ConstraintGraph::new();
    let mut above: Option<BodyId> = None;
    for i in 0..links {
        let top = Point3::new(0.0, -2.0 * i as f64, 0.0);
        let id = graph.add_body(slab(1.0, top - Vector3::new(0.0, 1.0, 0.0)));
        match above {
            None => graph.add_anchor(id, top).unwrap(),
            Some(prev) => graph.add_joint(prev, id, top).unwrap(),
        };
        above = Some(id);
    }
    graph
}

/// Step a graph directly through solve, integrate, and refresh.
pub fn advance(graph: &mut ConstraintGraph, config: &SimulationConfig, steps: usize) {
    for _ in 0..steps {
        let outcome = solve_bodies(graph, &config.gravity, &config.stabilization).unwrap();
        for (body, accel) in graph.bodies_mut().iter_mut().zip(&outcome.accelerations) {
            integrate_body(body, accel, config.timestep);
        }
        graph.refresh_contact_points().unwrap();
    }
}
