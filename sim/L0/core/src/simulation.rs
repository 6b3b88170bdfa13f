//! Simulation context and the fixed-step run loop.
//!
//! [`Simulation`] owns everything one run needs: the scene recipe, the
//! configuration, the live bodies and joints, and the clock. There is no
//! ambient state; every operation goes through the context.
//!
//! # Example
//!
//! ```
//! use sim_core::{ChainSpec, RunState, Scene, Simulation};
//! use sim_types::SimulationConfig;
//!
//! let mut sim = Simulation::new(Scene::Chain(ChainSpec::default()), SimulationConfig::default())
//!     .unwrap();
//!
//! // Ticks are ignored until the run is started
//! assert!(sim.tick().unwrap().is_none());
//!
//! sim.start();
//! for _ in 0..100 {
//!     sim.tick().unwrap();
//! }
//! assert_eq!(sim.state(), RunState::Running);
//! assert!((sim.time() - 1.0).abs() < 1e-9);
//!
//! sim.reset().unwrap();
//! assert_eq!(sim.state(), RunState::Idle);
//! assert_eq!(sim.time(), 0.0);
//! ```

use nalgebra::{Point3, UnitQuaternion, Vector3};
use sim_constraint::{solve_bodies, ConstraintGraph};
use sim_types::{BodyAcceleration, BodyId, RigidBody, SimError, SimulationConfig};
use tracing::{debug, info, warn};

use crate::integrators::integrate_body;
use crate::scene::Scene;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether the clock is currently driving the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunState {
    /// Ticks are ignored.
    #[default]
    Idle,
    /// Each tick advances one step.
    Running,
}

/// Pose of one body, as read by a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyPose {
    /// Body this pose belongs to.
    pub id: BodyId,
    /// Center-of-mass position.
    pub position: Point3<f64>,
    /// Orientation.
    pub orientation: UnitQuaternion<f64>,
}

/// Snapshot of the simulation after a step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// Simulation time.
    pub time: f64,
    /// Pose of every body, in id order.
    pub bodies: Vec<BodyPose>,
    /// Total kinetic energy.
    pub kinetic_energy: f64,
    /// Largest joint separation (0 with no joints).
    pub max_joint_residual: f64,
}

impl Observation {
    /// Look up a body's pose.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&BodyPose> {
        self.bodies.get(id.index())
    }
}

/// Result of a simulation step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Observation after the step.
    pub observation: Observation,
    /// Whether a termination condition was reached.
    pub completed: bool,
}

/// One simulation run: scene, configuration, live state, and clock.
#[derive(Debug, Clone)]
pub struct Simulation {
    scene: Scene,
    config: SimulationConfig,
    graph: ConstraintGraph,
    time: f64,
    steps: u64,
    state: RunState,
}

impl Simulation {
    /// Build a simulation from a scene. Starts `Idle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation or the scene cannot
    /// be built.
    pub fn new(scene: Scene, config: SimulationConfig) -> sim_types::Result<Self> {
        config.validate()?;
        let graph = scene.build()?;
        debug!(
            bodies = graph.body_count(),
            joints = graph.joint_count(),
            "built simulation"
        );
        Ok(Self {
            scene,
            config,
            graph,
            time: 0.0,
            steps: 0,
            state: RunState::Idle,
        })
    }

    /// Build a simulation with the scene's usual settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be built.
    pub fn from_scene(scene: Scene) -> sim_types::Result<Self> {
        let config = scene.default_config();
        Self::new(scene, config)
    }

    /// Current run state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Check if ticks currently advance the simulation.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Simulation time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of steps taken since the last reset.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The scene this simulation resets to.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The live bodies and joints.
    #[must_use]
    pub fn graph(&self) -> &ConstraintGraph {
        &self.graph
    }

    /// All bodies, indexed by id.
    #[must_use]
    pub fn bodies(&self) -> &[RigidBody] {
        self.graph.bodies()
    }

    /// Look up a body.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.graph.body(id)
    }

    /// Let the clock drive the simulation.
    pub fn start(&mut self) {
        if self.state == RunState::Idle {
            info!(time = self.time, "simulation started");
        }
        self.state = RunState::Running;
    }

    /// Stop driving the simulation, keeping the current state.
    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            info!(time = self.time, "simulation stopped");
        }
        self.state = RunState::Idle;
    }

    /// Discard all bodies and joints and rebuild them from the scene.
    ///
    /// Time returns to zero and the simulation is left `Idle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be built; the previous state is
    /// kept in that case.
    pub fn reset(&mut self) -> sim_types::Result<()> {
        self.graph = self.scene.build()?;
        self.time = 0.0;
        self.steps = 0;
        self.state = RunState::Idle;
        info!("simulation reset");
        Ok(())
    }

    /// Replace the scene and reset to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the new scene cannot be built; the previous scene
    /// and state are kept in that case.
    pub fn set_scene(&mut self, scene: Scene) -> sim_types::Result<()> {
        let graph = scene.build()?;
        self.scene = scene;
        self.graph = graph;
        self.time = 0.0;
        self.steps = 0;
        self.state = RunState::Idle;
        info!("simulation reset to new scene");
        Ok(())
    }

    /// Set the external forces acting on a body from now on.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBodyId`] for an unknown body.
    pub fn apply_forces(&mut self, id: BodyId, forces: Vec<Vector3<f64>>) -> sim_types::Result<()> {
        let body = self
            .graph
            .body_mut(id)
            .ok_or(SimError::InvalidBodyId(id.raw()))?;
        body.apply_forces(forces);
        Ok(())
    }

    /// Advance one clock tick.
    ///
    /// Does nothing while `Idle`. Otherwise takes one step; a failed step or a
    /// reached termination condition returns the simulation to `Idle`.
    ///
    /// # Errors
    ///
    /// Propagates the error of a failed step.
    pub fn tick(&mut self) -> sim_types::Result<Option<StepResult>> {
        if self.state == RunState::Idle {
            return Ok(None);
        }

        match self.step() {
            Ok(result) => {
                if result.completed {
                    info!(time = self.time, "simulation completed");
                    self.state = RunState::Idle;
                }
                Ok(Some(result))
            }
            Err(err) => {
                warn!(time = self.time, error = %err, "step failed, stopping simulation");
                self.state = RunState::Idle;
                Err(err)
            }
        }
    }

    /// Take one fixed-timestep step, regardless of run state.
    ///
    /// Solves for every body's accelerations, integrates every body, refreshes
    /// the joints' cached contact points, and advances time. Bodies are
    /// integrated into a scratch copy, so a failed step leaves the simulation
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`SimError::SolverSingular`] if the joint system has no unique solution.
    /// - [`SimError::Diverged`] if the state would become non-finite.
    pub fn step(&mut self) -> sim_types::Result<StepResult> {
        let dt = self.config.timestep;
        let accelerations = self.solve()?;

        let mut next = self.graph.bodies().to_vec();
        for (body, accel) in next.iter_mut().zip(&accelerations) {
            integrate_body(body, accel, dt);
        }
        if let Some(i) = next.iter().position(|body| !body.is_finite()) {
            return Err(SimError::diverged(format!(
                "body {i} has non-finite state at t = {}",
                self.time + dt
            )));
        }

        self.graph.bodies_mut().clone_from_slice(&next);
        self.graph.refresh_contact_points()?;
        self.time += dt;
        self.steps += 1;

        Ok(StepResult {
            observation: self.observe(),
            completed: self.is_complete(),
        })
    }

    /// Step until a termination condition is reached or `max_steps` have run.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails.
    pub fn run(&mut self, max_steps: u64) -> sim_types::Result<Vec<Observation>> {
        let mut observations = Vec::new();
        for _ in 0..max_steps {
            let result = self.step()?;
            observations.push(result.observation);
            if result.completed {
                break;
            }
        }
        Ok(observations)
    }

    fn solve(&self) -> sim_types::Result<Vec<BodyAcceleration>> {
        let gravity = &self.config.gravity;
        if self.graph.is_unconstrained() {
            return self
                .graph
                .bodies()
                .iter()
                .map(|body| body.solve_unconstrained(gravity))
                .collect();
        }
        let outcome = solve_bodies(&self.graph, gravity, &self.config.stabilization)?;
        Ok(outcome.accelerations)
    }

    /// Check if a termination condition holds.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let fallen = self.config.fall_threshold.is_some_and(|floor| {
            self.graph
                .bodies()
                .iter()
                .any(|body| body.position.y <= floor)
        });
        let expired = self
            .config
            .max_time
            .is_some_and(|max| self.time >= max - 0.5 * self.config.timestep);
        fallen || expired
    }

    /// Snapshot the current state.
    #[must_use]
    pub fn observe(&self) -> Observation {
        let bodies = self
            .graph
            .bodies()
            .iter()
            .enumerate()
            .map(|(i, body)| BodyPose {
                id: BodyId::new(i as u64),
                position: body.position,
                orientation: body.orientation,
            })
            .collect();

        Observation {
            time: self.time,
            bodies,
            kinetic_energy: self.graph.kinetic_energy(),
            max_joint_residual: self.graph.max_position_residual(),
        }
    }
}
