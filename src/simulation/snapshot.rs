use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodePosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Read-only copy of the layout after a completed tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub alpha: f64,
    pub nodes: Vec<NodePosition>,
}

impl Snapshot {
    pub fn position(&self, id: &str) -> Option<(f64, f64)> {
        self.nodes
            .iter()
            .find(|node| node.id == id)
            .map(|node| (node.x, node.y))
    }
}
