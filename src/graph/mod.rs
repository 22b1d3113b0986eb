//! Node and link arena.
//!
//! Nodes live in one `Vec` addressed by their position; links refer to their
//! endpoints by that index, so there are no references between records.

mod build;

use std::collections::HashMap;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

pub type Vec2 = Vector2<f64>;

/// Caller-supplied node record.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub id: String,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub initial_x: Option<f64>,
    #[serde(default)]
    pub initial_y: Option<f64>,
    /// Opaque to the layout.
    #[serde(default)]
    pub group: Option<String>,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.initial_x = Some(x);
        self.initial_y = Some(y);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Caller-supplied link record.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LinkSpec {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl LinkSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Pinned position; the integrator holds the node here while set.
    pub fixed: Option<Vec2>,
    pub radius: f64,
    /// Many-body charge, derived from the configured strength and the node's
    /// weighted degree.
    pub charge: f64,
    pub group: Option<String>,
}

impl Node {
    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn fx(&self) -> Option<f64> {
        self.fixed.map(|fixed| fixed.x)
    }

    pub fn fy(&self) -> Option<f64> {
        self.fixed.map(|fixed| fixed.y)
    }

    pub fn is_pinned(&self) -> bool {
        self.fixed.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

impl Link {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Clone, Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    index_by_id: HashMap<String, usize>,
    degree: Vec<usize>,
    weighted_degree: Vec<f64>,
}

impl Graph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    /// Number of links touching the node at `index`.
    pub fn degree(&self, index: usize) -> usize {
        self.degree[index]
    }

    /// Sum of link values touching the node at `index`.
    pub fn weighted_degree(&self, index: usize) -> f64 {
        self.weighted_degree[index]
    }
}
