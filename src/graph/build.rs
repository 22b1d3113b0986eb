use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::util::initial_position;

use super::{Graph, Link, LinkSpec, Node, NodeSpec, Vec2};

impl Graph {
    /// Validates the records and lays the nodes out at their starting positions.
    ///
    /// Nodes without a caller-supplied coordinate get one derived from their
    /// index, so identical input always produces the identical initial layout.
    pub fn build(node_specs: Vec<NodeSpec>, link_specs: Vec<LinkSpec>) -> Result<Self> {
        let mut index_by_id = HashMap::with_capacity(node_specs.len());
        let mut nodes = Vec::with_capacity(node_specs.len());

        for (index, spec) in node_specs.into_iter().enumerate() {
            if index_by_id.contains_key(&spec.id) {
                return Err(Error::DuplicateNodeId { id: spec.id });
            }

            let radius = spec.radius.unwrap_or(0.0);
            if !radius.is_finite() || radius < 0.0 {
                return Err(Error::invalid_config(
                    "radius",
                    format!("node {} has radius {radius}", spec.id),
                ));
            }

            let placed = initial_position(index);
            let x = spec.initial_x.unwrap_or(placed.x);
            let y = spec.initial_y.unwrap_or(placed.y);
            if !x.is_finite() || !y.is_finite() {
                return Err(Error::invalid_config(
                    "initialX/initialY",
                    format!("node {} starts at ({x}, {y})", spec.id),
                ));
            }

            index_by_id.insert(spec.id.clone(), index);
            nodes.push(Node {
                id: spec.id,
                position: Vec2::new(x, y),
                velocity: Vec2::zeros(),
                fixed: None,
                radius,
                charge: 0.0,
                group: spec.group,
            });
        }

        let mut degree = vec![0usize; nodes.len()];
        let mut weighted_degree = vec![0.0_f64; nodes.len()];
        let mut links = Vec::with_capacity(link_specs.len());
        for (link_index, spec) in link_specs.into_iter().enumerate() {
            let (Some(&source), Some(&target)) =
                (index_by_id.get(&spec.source), index_by_id.get(&spec.target))
            else {
                return Err(Error::InvalidLinkReference {
                    link: link_index,
                    from: spec.source,
                    to: spec.target,
                });
            };

            let value = spec.value.unwrap_or(1.0);
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_config(
                    "value",
                    format!("link {link_index} has value {value}"),
                ));
            }

            degree[source] += 1;
            degree[target] += 1;
            weighted_degree[source] += value;
            weighted_degree[target] += value;
            links.push(Link {
                source,
                target,
                value,
            });
        }

        debug!(nodes = nodes.len(), links = links.len(), "graph built");

        Ok(Self {
            nodes,
            links,
            index_by_id,
            degree,
            weighted_degree,
        })
    }

    /// Charge of each node: the configured strength, scaled up for nodes whose
    /// links carry more weight than a single unit link.
    pub(crate) fn assign_charges(&mut self, strength: f64) {
        for (node, weight) in self.nodes.iter_mut().zip(&self.weighted_degree) {
            node.charge = strength * weight.max(1.0).sqrt();
        }
    }
}
