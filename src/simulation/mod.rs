//! Tick loop, alpha schedule and run state.
//!
//! Nothing here owns a timer. The host advances the layout by calling
//! [`Simulation::tick`] (or iterating [`Simulation::ticks`]) at whatever cadence
//! it likes; each call runs one whole tick before returning, so a stop request
//! can only land between ticks.

mod drag;
mod snapshot;

use tracing::{debug, info, trace};

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::graph::{Graph, Link, LinkSpec, Node, NodeSpec, Vec2};
use crate::physics::{ForceDeltas, ForceSet, QuadTree};

pub use snapshot::{NodePosition, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Stopped,
}

type Observer = Box<dyn FnMut(&Snapshot) + Send>;

pub struct Simulation {
    graph: Graph,
    config: SimulationConfig,
    forces: ForceSet,
    deltas: ForceDeltas,
    alpha: f64,
    state: RunState,
    tick_count: u64,
    observer: Option<Observer>,
}

impl Simulation {
    /// Validates the input and builds an idle simulation. Nothing is returned on
    /// failure.
    pub fn new(
        nodes: Vec<NodeSpec>,
        links: Vec<LinkSpec>,
        config: SimulationConfig,
    ) -> Result<Self> {
        config.validate()?;
        let mut graph = Graph::build(nodes, links)?;
        graph.assign_charges(config.charge_strength);
        let forces = ForceSet::from_config(&graph, &config);

        debug!(
            nodes = graph.len(),
            links = graph.links().len(),
            forces = ?forces.names(),
            "simulation created"
        );

        Ok(Self {
            deltas: ForceDeltas::zeroed(graph.len()),
            alpha: config.alpha_start,
            graph,
            config,
            forces,
            state: RunState::Idle,
            tick_count: 0,
            observer: None,
        })
    }

    /// Replaces the standard force set.
    pub fn with_forces(mut self, forces: ForceSet) -> Self {
        self.forces = forces;
        self
    }

    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn start(&mut self) {
        self.alpha = self.config.alpha_start;
        self.transition(RunState::Running);
    }

    /// Cancels the run. Takes effect between ticks.
    pub fn stop(&mut self) {
        self.transition(RunState::Stopped);
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.transition(RunState::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.transition(RunState::Running);
        }
    }

    /// Sets alpha to `reheat` (or `alphaStart`) and resumes ticking, keeping
    /// positions and velocities.
    pub fn restart(&mut self, reheat: Option<f64>) {
        let alpha = reheat.unwrap_or(self.config.alpha_start);
        self.alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            self.config.alpha_start
        };
        debug!(alpha = self.alpha, "restart");
        self.transition(RunState::Running);
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    pub fn links(&self) -> &[Link] {
        self.graph.links()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick_count,
            alpha: self.alpha,
            nodes: self
                .graph
                .nodes()
                .iter()
                .map(|node| NodePosition {
                    id: node.id.clone(),
                    x: node.position.x,
                    y: node.position.y,
                })
                .collect(),
        }
    }

    /// Id of the node closest to `(x, y)`, optionally limited to `radius`.
    pub fn find(&self, x: f64, y: f64, radius: Option<f64>) -> Option<&str> {
        let index = QuadTree::from_nodes(self.graph.nodes()).nearest(Vec2::new(x, y), radius)?;
        Some(self.graph.nodes()[index].id.as_str())
    }

    /// Runs one tick if the simulation is running and returns its snapshot.
    ///
    /// Forces are evaluated against the positions at the start of the tick,
    /// velocities are damped and positions advanced, pinned nodes are held at
    /// their fixed point, and alpha decays towards its target. The simulation
    /// stops itself once alpha drops below `alphaMin`.
    pub fn tick(&mut self) -> Option<Snapshot> {
        if self.state != RunState::Running {
            return None;
        }

        let index = QuadTree::from_nodes(self.graph.nodes());
        self.forces
            .accumulate(self.graph.nodes(), &index, self.alpha, &mut self.deltas);
        self.integrate();

        self.alpha += (self.config.alpha_target - self.alpha) * self.config.alpha_decay;
        self.tick_count += 1;
        trace!(tick = self.tick_count, alpha = self.alpha, "tick");

        if self.alpha < self.config.alpha_min {
            info!(ticks = self.tick_count, alpha = self.alpha, "layout cooled");
            self.transition(RunState::Stopped);
        }

        let snapshot = self.snapshot();
        if let Some(observer) = self.observer.as_mut() {
            observer(&snapshot);
        }
        Some(snapshot)
    }

    /// Ticks until the simulation stops or `max_ticks` have run. Returns the
    /// number of ticks executed.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let mut ran = 0;
        while ran < max_ticks && self.tick().is_some() {
            ran += 1;
        }
        ran
    }

    /// Iterator of per-tick snapshots; ends when the simulation is no longer
    /// running.
    pub fn ticks(&mut self) -> Ticks<'_> {
        Ticks { simulation: self }
    }

    fn integrate(&mut self) {
        let decay = self.config.velocity_decay;
        let translation = self.deltas.translation;
        for (node, push) in self.graph.nodes_mut().iter_mut().zip(&self.deltas.velocity) {
            if let Some(fixed) = node.fixed {
                node.position = fixed;
                node.velocity = Vec2::zeros();
                continue;
            }

            node.velocity = (node.velocity + push) * decay;
            node.position += node.velocity + translation;
        }
    }

    fn transition(&mut self, next: RunState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "state change");
            self.state = next;
        }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("nodes", &self.graph.len())
            .field("links", &self.graph.links().len())
            .field("alpha", &self.alpha)
            .field("state", &self.state)
            .field("tick_count", &self.tick_count)
            .finish_non_exhaustive()
    }
}

pub struct Ticks<'a> {
    simulation: &'a mut Simulation,
}

impl Iterator for Ticks<'_> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        self.simulation.tick()
    }
}
