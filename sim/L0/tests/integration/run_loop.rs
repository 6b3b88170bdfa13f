//! Start, stop, reset, and termination of a simulation run.

use approx::assert_relative_eq;
use nalgebra::Vector3;
use sim_core::{ChainSpec, LaunchSpec, RunState, Scene, Simulation};
use sim_types::{BodyId, SimulationConfig};

#[test]
fn idle_simulation_ignores_ticks() {
    let mut sim = Simulation::from_scene(Scene::default()).unwrap();
    let before = sim.observe();
    for _ in 0..10 {
        assert!(sim.tick().unwrap().is_none());
    }
    assert_eq!(sim.observe(), before);
}

#[test]
fn reset_restores_initial_configuration() {
    let mut sim = Simulation::from_scene(Scene::Chain(ChainSpec::default())).unwrap();
    let initial = sim.observe();

    sim.start();
    for _ in 0..250 {
        sim.tick().unwrap();
    }
    assert!(sim.is_running());
    assert_ne!(sim.observe().bodies, initial.bodies);

    sim.reset().unwrap();
    assert_eq!(sim.state(), RunState::Idle);
    assert_eq!(sim.observe(), initial);
    assert_eq!(sim.step_count(), 0);

    // A reset run replays the same trajectory
    sim.start();
    let first: Vec<_> = (0..20).map(|_| sim.tick().unwrap().unwrap().observation).collect();
    sim.reset().unwrap();
    sim.start();
    let second: Vec<_> = (0..20).map(|_| sim.tick().unwrap().unwrap().observation).collect();
    assert_eq!(first, second);
}

#[test]
fn launch_terminates_at_floor() {
    let spec = LaunchSpec::default().with_velocity(Vector3::new(3.0, 25.0, 0.0), Vector3::new(1.0, 0.5, 2.0));
    let mut sim = Simulation::from_scene(Scene::Launch(spec)).unwrap();
    sim.start();

    let mut ticks = 0;
    while let Some(result) = sim.tick().unwrap() {
        ticks += 1;
        assert!(ticks < 100_000, "launch never terminated");
        if !result.completed {
            assert!(result.observation.bodies[0].position.y > LaunchSpec::FLOOR);
        }
    }

    assert_eq!(sim.state(), RunState::Idle);
    assert!(sim.bodies()[0].position.y <= LaunchSpec::FLOOR);

    // y(t) = 25 t - 4.905 t^2 reaches -50 near t = 6.63
    assert_relative_eq!(sim.time(), 6.63, epsilon = 0.05);
}

#[test]
fn forces_persist_until_replaced() {
    let config = SimulationConfig::default().zero_gravity();
    let mut sim = Simulation::new(Scene::Launch(LaunchSpec::default()), config).unwrap();
    let id = BodyId::new(0);

    sim.apply_forces(id, vec![Vector3::new(10.0, 0.0, 0.0)]).unwrap();
    sim.run(100).unwrap();
    assert_relative_eq!(sim.bodies()[0].linear_velocity.x, 1.0, epsilon = 1e-9);

    sim.apply_forces(id, Vec::new()).unwrap();
    sim.run(100).unwrap();
    assert_relative_eq!(sim.bodies()[0].linear_velocity.x, 1.0, epsilon = 1e-9);
}

#[test]
fn observation_reports_every_body() {
    let sim = Simulation::from_scene(Scene::Chain(ChainSpec::default().with_links(4))).unwrap();
    let obs = sim.observe();
    assert_eq!(obs.bodies.len(), 4);
    for (i, pose) in obs.bodies.iter().enumerate() {
        assert_eq!(pose.id, BodyId::new(i as u64));
        assert_eq!(obs.body(pose.id), Some(pose));
    }
    assert_relative_eq!(obs.kinetic_energy, 0.0);
    assert_relative_eq!(obs.max_joint_residual, 0.0, epsilon = 1e-12);
}
