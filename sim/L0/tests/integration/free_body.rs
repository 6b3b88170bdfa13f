//! Single unconstrained body in flight.

use approx::assert_relative_eq;
use nalgebra::Vector3;
use sim_core::{LaunchSpec, Scene, Simulation};
use sim_types::{Gravity, SimulationConfig, STANDARD_GRAVITY};

#[test]
fn free_fall_acceleration_is_gravity() {
    let sim = Simulation::new(Scene::Launch(LaunchSpec::default()), SimulationConfig::default())
        .unwrap();
    let accel = sim.bodies()[0].solve_unconstrained(&Gravity::earth()).unwrap();

    assert_relative_eq!(accel.linear, Vector3::new(0.0, -9.81, 0.0), epsilon = 1e-12);
    assert_relative_eq!(accel.angular, Vector3::zeros(), epsilon = 1e-12);
}

#[test]
fn free_fall_follows_parabola() {
    let config = SimulationConfig::default();
    let dt = config.timestep;
    let mut sim = Simulation::new(Scene::Launch(LaunchSpec::default()), config).unwrap();

    for n in 1..=300 {
        sim.step().unwrap();
        let t = n as f64 * dt;
        let y = sim.bodies()[0].position.y;
        let expected = -0.5 * STANDARD_GRAVITY * t * t;
        // Explicit Euler lags the exact parabola by 0.5 * g * t * dt
        let tolerance = 0.5 * STANDARD_GRAVITY * t * dt + 1e-9;
        assert!(
            (y - expected).abs() <= tolerance,
            "step {n}: y = {y}, expected {expected} +/- {tolerance}"
        );
        assert_relative_eq!(sim.bodies()[0].linear_velocity.y, -STANDARD_GRAVITY * t, epsilon = 1e-9);
    }
}

#[test]
fn spin_keeps_unit_quaternion() {
    let spec = LaunchSpec::default()
        .with_velocity(Vector3::new(2.0, 15.0, -1.0), Vector3::new(3.0, -5.0, 7.0));
    let mut sim = Simulation::new(Scene::Launch(spec), SimulationConfig::default()).unwrap();

    for _ in 0..2000 {
        let result = sim.step().unwrap();
        for pose in &result.observation.bodies {
            assert!((pose.orientation.norm() - 1.0).abs() < 1e-6);
        }
    }
}

#[test]
fn principal_axis_spin_is_steady() {
    // Spinning about a principal axis produces no gyroscopic torque
    let spec = LaunchSpec::default().with_velocity(Vector3::zeros(), Vector3::new(0.0, 4.0, 0.0));
    let config = SimulationConfig::default().zero_gravity();
    let mut sim = Simulation::new(Scene::Launch(spec), config).unwrap();

    sim.run(500).unwrap();

    assert_relative_eq!(
        sim.bodies()[0].angular_velocity,
        Vector3::new(0.0, 4.0, 0.0),
        epsilon = 1e-9
    );
    assert_relative_eq!(sim.bodies()[0].position.coords, Vector3::zeros(), epsilon = 1e-12);
}

#[test]
fn external_force_adds_to_gravity() {
    let mut sim = Simulation::new(Scene::Launch(LaunchSpec::default()), SimulationConfig::default())
        .unwrap();
    // Mass 10: a 98.1 N lift cancels gravity, 20 N sideways gives 2 m/s^2
    sim.apply_forces(
        sim_types::BodyId::new(0),
        vec![Vector3::new(0.0, 98.1, 0.0), Vector3::new(20.0, 0.0, 0.0)],
    )
    .unwrap();

    sim.run(100).unwrap();

    let body = &sim.bodies()[0];
    assert_relative_eq!(body.linear_velocity, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(body.position.y, 0.0, epsilon = 1e-9);
}
