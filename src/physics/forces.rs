use crate::config::{DEFAULT_LINK_DISTANCE, SimulationConfig};
use crate::graph::{Graph, Node, Vec2};
use crate::util::{is_zero, jiggle};

use super::quadtree::{FieldSource, QuadTree};
use super::{Force, ForceDeltas};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    pub source: usize,
    pub target: usize,
    pub distance: f64,
    pub strength: f64,
    /// Share of the correction taken by the target; the better-connected end
    /// moves less.
    pub bias: f64,
}

/// Pulls linked nodes towards their rest length.
#[derive(Clone, Debug)]
pub struct LinkForce {
    springs: Vec<Spring>,
    iterations: usize,
}

impl LinkForce {
    pub fn new(graph: &Graph, config: &SimulationConfig) -> Self {
        let nodes = graph.nodes();
        let springs = graph
            .links()
            .iter()
            .filter(|link| !link.is_self_loop())
            .map(|link| {
                let source_degree = graph.degree(link.source).max(1) as f64;
                let target_degree = graph.degree(link.target).max(1) as f64;
                let distance = config.link_distance.unwrap_or_else(|| {
                    nodes[link.source].radius + nodes[link.target].radius + DEFAULT_LINK_DISTANCE
                });

                Spring {
                    source: link.source,
                    target: link.target,
                    distance,
                    strength: (link.value / source_degree.max(target_degree)).min(1.0),
                    bias: source_degree / (source_degree + target_degree),
                }
            })
            .collect();

        Self {
            springs,
            iterations: config.link_iterations,
        }
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }
}

impl Force for LinkForce {
    fn name(&self) -> &'static str {
        "link"
    }

    fn apply(&self, nodes: &[Node], _index: &QuadTree, alpha: f64, deltas: &mut ForceDeltas) {
        if self.springs.is_empty() {
            return;
        }

        let mut local = vec![Vec2::zeros(); nodes.len()];
        for _ in 0..self.iterations {
            for spring in &self.springs {
                let source = &nodes[spring.source];
                let target = &nodes[spring.target];
                let mut delta = (target.position + target.velocity + local[spring.target])
                    - (source.position + source.velocity + local[spring.source]);
                if is_zero(delta) {
                    delta = jiggle(spring.source, spring.target);
                }

                let length = delta.norm();
                let correction =
                    delta * ((length - spring.distance) / length * alpha * spring.strength);
                local[spring.target] -= correction * spring.bias;
                local[spring.source] += correction * (1.0 - spring.bias);
            }
        }

        for (velocity, push) in deltas.velocity.iter_mut().zip(local) {
            *velocity += push;
        }
    }
}

/// Many-body force evaluated through the quadtree.
///
/// Each source pushes along the unit displacement with magnitude
/// `charge * alpha / distance²`. The distance is floored at `distance_min` and
/// sources beyond `distance_max` are ignored.
#[derive(Clone, Copy, Debug)]
pub struct ChargeForce {
    theta: f64,
    distance_min_sq: f64,
    distance_max_sq: f64,
}

impl ChargeForce {
    pub fn new(theta: f64, distance_min: f64, distance_max: Option<f64>) -> Self {
        Self {
            theta,
            distance_min_sq: distance_min * distance_min,
            distance_max_sq: distance_max.map_or(f64::INFINITY, |max| max * max),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.theta,
            config.charge_distance_min,
            config.charge_distance_max,
        )
    }

    fn contribution(&self, point: Vec2, index: usize, source: FieldSource) -> Vec2 {
        let mut delta = source.position - point;
        let mut distance_sq = delta.norm_squared();
        if distance_sq >= self.distance_max_sq {
            return Vec2::zeros();
        }

        if distance_sq == 0.0 {
            delta = jiggle(index, source.index.unwrap_or(index + 1));
            distance_sq = delta.norm_squared();
        }

        let direction = delta / distance_sq.sqrt();
        direction * (source.charge / distance_sq.max(self.distance_min_sq))
    }
}

impl Force for ChargeForce {
    fn name(&self) -> &'static str {
        "charge"
    }

    fn apply(&self, nodes: &[Node], index: &QuadTree, alpha: f64, deltas: &mut ForceDeltas) {
        if nodes.iter().all(|node| node.charge == 0.0) {
            return;
        }

        for (node_index, node) in nodes.iter().enumerate() {
            let mut push = Vec2::zeros();
            index.accumulate(node.position, Some(node_index), self.theta, |source| {
                push += self.contribution(node.position, node_index, source);
            });
            deltas.velocity[node_index] += push * alpha;
        }
    }
}

/// Rigid shift moving the centroid towards `target`.
#[derive(Clone, Copy, Debug)]
pub struct CenterForce {
    target: Vec2,
    strength: f64,
}

impl CenterForce {
    pub fn new(target: Vec2, strength: f64) -> Self {
        Self { target, strength }
    }
}

impl Force for CenterForce {
    fn name(&self) -> &'static str {
        "center"
    }

    fn apply(&self, nodes: &[Node], _index: &QuadTree, _alpha: f64, deltas: &mut ForceDeltas) {
        if nodes.is_empty() {
            return;
        }

        let centroid = nodes
            .iter()
            .fold(Vec2::zeros(), |sum, node| sum + node.position)
            / nodes.len() as f64;
        deltas.translation += (self.target - centroid) * self.strength;
    }
}

/// Pushes overlapping circles apart in proportion to the overlap.
///
/// Each pass tests positions one velocity step ahead, including the pushes of
/// earlier passes, against a quadtree built over those positions. Not scaled by
/// alpha, so overlaps keep resolving while the layout cools.
#[derive(Clone, Copy, Debug)]
pub struct CollisionForce {
    iterations: usize,
    strength: f64,
}

impl CollisionForce {
    pub fn new(iterations: usize, strength: f64) -> Self {
        Self {
            iterations,
            strength,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.collision_iterations, config.collision_strength)
    }
}

impl Force for CollisionForce {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn apply(&self, nodes: &[Node], _index: &QuadTree, _alpha: f64, deltas: &mut ForceDeltas) {
        if self.iterations == 0 || nodes.iter().all(|node| node.radius <= 0.0) {
            return;
        }

        let radii = nodes.iter().map(|node| node.radius).collect::<Vec<_>>();
        let charges = vec![0.0; nodes.len()];
        let mut local = vec![Vec2::zeros(); nodes.len()];

        for _ in 0..self.iterations {
            let predicted = nodes
                .iter()
                .zip(&local)
                .map(|(node, push)| node.position + node.velocity + push)
                .collect::<Vec<_>>();
            let tree = QuadTree::build(&predicted, &charges, &radii);

            tree.for_each_candidate_pair(|from, to| {
                let reach = radii[from] + radii[to];
                let mut delta = predicted[from] - predicted[to];
                let mut distance_sq = delta.norm_squared();
                if distance_sq >= reach * reach {
                    return;
                }

                if distance_sq == 0.0 {
                    delta = jiggle(from, to);
                    distance_sq = delta.norm_squared();
                }
                let distance = distance_sq.sqrt();
                let push = delta * ((reach - distance) / distance * self.strength);

                let from_sq = radii[from] * radii[from];
                let to_sq = radii[to] * radii[to];
                let share = to_sq / (from_sq + to_sq);
                local[from] += push * share;
                local[to] -= push * (1.0 - share);
            });
        }

        for (velocity, push) in deltas.velocity.iter_mut().zip(local) {
            *velocity += push;
        }
    }
}
