#![forbid(unsafe_code)]

//! Headless force-directed graph layout.
//!
//! A [`Simulation`] owns a fixed set of nodes and links and relaxes their
//! positions tick by tick under link, many-body, collision and centering forces
//! while alpha cools. Nodes can be pinned and dragged while the layout runs.

pub mod config;
pub mod error;
pub mod graph;
pub mod input;
pub mod physics;
pub mod simulation;
mod util;

pub use config::SimulationConfig;
pub use error::{Error, Result};
pub use graph::{Graph, Link, LinkSpec, Node, NodeSpec, Vec2};
pub use input::GraphDocument;
pub use physics::{Force, ForceDeltas, ForceSet, QuadTree};
pub use simulation::{NodePosition, RunState, Simulation, Snapshot, Ticks};
pub use util::initial_position;
