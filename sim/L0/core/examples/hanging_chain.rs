//! Headless run of the hanging chain scene.
//!
//! Run with: cargo run -p sim-core --example hanging_chain
//!
//! Prints each box's pose once per simulated second, plus the energy and the
//! worst joint separation.

#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use nalgebra::Vector3;
use sim_core::{BodyId, ChainSpec, Scene, Simulation};
use sim_types::SimulationConfig;

fn main() {
    let scene = Scene::Chain(ChainSpec::default());
    let config = SimulationConfig::default().max_time(10.0);
    let mut sim = Simulation::new(scene, config).unwrap();

    // A steady sideways push on the last link
    let last = BodyId::new(sim.bodies().len() as u64 - 1);
    sim.apply_forces(last, vec![Vector3::new(2.0, 0.0, 0.0)]).unwrap();

    sim.start();
    while let Some(result) = sim.tick().unwrap() {
        if sim.step_count() % 100 == 0 || result.completed {
            let obs = &result.observation;
            println!(
                "t = {:5.2}  energy = {:8.3}  joint residual = {:.2e}",
                obs.time, obs.kinetic_energy, obs.max_joint_residual
            );
            for pose in &obs.bodies {
                let (roll, pitch, yaw) = pose.orientation.euler_angles();
                println!(
                    "    {}  position = ({:7.3}, {:7.3}, {:7.3})  rpy = ({:6.3}, {:6.3}, {:6.3})",
                    pose.id, pose.position.x, pose.position.y, pose.position.z, roll, pitch, yaw
                );
            }
        }
    }
}
