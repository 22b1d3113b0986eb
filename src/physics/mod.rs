mod forces;
mod quadtree;

use crate::config::SimulationConfig;
use crate::graph::{Graph, Node, Vec2};

pub use forces::{CenterForce, ChargeForce, CollisionForce, LinkForce};
pub use quadtree::{FieldSource, QuadBounds, QuadNode, QuadTree};

/// Output of one force evaluation.
///
/// `velocity[i]` is added to node `i`'s velocity before damping; `translation`
/// is a rigid shift applied to every node's position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForceDeltas {
    pub velocity: Vec<Vec2>,
    pub translation: Vec2,
}

impl ForceDeltas {
    pub fn zeroed(len: usize) -> Self {
        Self {
            velocity: vec![Vec2::zeros(); len],
            translation: Vec2::zeros(),
        }
    }

    pub fn reset(&mut self, len: usize) {
        self.velocity.clear();
        self.velocity.resize(len, Vec2::zeros());
        self.translation = Vec2::zeros();
    }
}

/// A force reads the tick's node snapshot and adds its contribution to `deltas`.
///
/// Implementations never mutate nodes; everything they need beyond positions,
/// velocities and the spatial index is captured at construction.
pub trait Force {
    fn name(&self) -> &'static str;

    fn apply(&self, nodes: &[Node], index: &QuadTree, alpha: f64, deltas: &mut ForceDeltas);
}

/// Ordered collection of forces. Contributions are summed in insertion order.
#[derive(Default)]
pub struct ForceSet {
    terms: Vec<Box<dyn Force + Send + Sync>>,
}

impl ForceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard set: charge, link, collision, then center. Centering is
    /// left out when the config names no center point.
    pub fn from_config(graph: &Graph, config: &SimulationConfig) -> Self {
        let mut set = Self::new()
            .with(ChargeForce::from_config(config))
            .with(LinkForce::new(graph, config))
            .with(CollisionForce::from_config(config));
        if let Some((x, y)) = config.center() {
            set = set.with(CenterForce::new(Vec2::new(x, y), config.center_strength));
        }
        set
    }

    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Force + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.terms.iter().map(|term| term.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Zeroes `deltas` and sums every force's contribution into it.
    pub fn accumulate(&self, nodes: &[Node], index: &QuadTree, alpha: f64, deltas: &mut ForceDeltas) {
        deltas.reset(nodes.len());
        for term in &self.terms {
            term.apply(nodes, index, alpha, deltas);
        }
    }
}
