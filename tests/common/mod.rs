#![allow(dead_code)]

use graph_relax::{LinkSpec, NodeSpec, Simulation, SimulationConfig, Snapshot};

/// Small deterministic generator so layouts built from "random" input repeat
/// exactly between runs.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

pub fn nodes(ids: &[&str]) -> Vec<NodeSpec> {
    ids.iter().map(|id| NodeSpec::new(*id)).collect()
}

pub fn ring(count: usize) -> (Vec<NodeSpec>, Vec<LinkSpec>) {
    let nodes = (0..count)
        .map(|index| NodeSpec::new(format!("n{index}")))
        .collect();
    let links = (0..count)
        .map(|index| LinkSpec::new(format!("n{index}"), format!("n{}", (index + 1) % count)))
        .collect();
    (nodes, links)
}

pub fn started(
    nodes: Vec<NodeSpec>,
    links: Vec<LinkSpec>,
    config: SimulationConfig,
) -> Simulation {
    let mut sim = Simulation::new(nodes, links, config).expect("valid simulation");
    sim.start();
    sim
}

pub fn distance(snapshot: &Snapshot, a: &str, b: &str) -> f64 {
    let (ax, ay) = snapshot.position(a).expect("node a");
    let (bx, by) = snapshot.position(b).expect("node b");
    (ax - bx).hypot(ay - by)
}

pub fn pairwise_distances(snapshot: &Snapshot) -> Vec<f64> {
    let mut out = Vec::new();
    for (offset, a) in snapshot.nodes.iter().enumerate() {
        for b in &snapshot.nodes[offset + 1..] {
            out.push((a.x - b.x).hypot(a.y - b.y));
        }
    }
    out
}
