use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::SimulationConfig;
use crate::graph::{LinkSpec, NodeSpec};
use crate::simulation::Simulation;

/// Graph document accepted by the command line tool.
///
/// ```json
/// {
///   "nodes": [{ "id": "a", "radius": 4 }, { "id": "b", "initialX": 10, "initialY": 0 }],
///   "links": [{ "source": "a", "target": "b", "value": 2 }],
///   "config": { "centerX": 0, "centerY": 0 }
/// }
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub config: SimulationConfig,
}

impl GraphDocument {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid graph document")
    }

    pub fn into_simulation(self) -> Result<Simulation> {
        Simulation::new(self.nodes, self.links, self.config)
            .context("graph document does not describe a valid simulation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn parses_minimal_document() {
        let document = GraphDocument::parse(r#"{ "nodes": [{ "id": "a" }, { "id": "b" }] }"#)
            .unwrap();
        assert_eq!(document.nodes.len(), 2);
        assert!(document.links.is_empty());
        assert_eq!(document.config, SimulationConfig::default());
    }

    #[test]
    fn parses_full_document() {
        let raw = r#"{
            "nodes": [
                { "id": "a", "radius": 4, "group": "left" },
                { "id": "b", "initialX": 10, "initialY": -2 }
            ],
            "links": [{ "source": "a", "target": "b", "value": 2.5 }],
            "config": { "alphaDecay": 0.05, "centerX": 1, "centerY": 2 }
        }"#;
        let document = GraphDocument::parse(raw).unwrap();
        assert_eq!(document.nodes[0].radius, Some(4.0));
        assert_eq!(document.nodes[0].group.as_deref(), Some("left"));
        assert_eq!(document.nodes[1].initial_x, Some(10.0));
        assert_eq!(document.links[0].value, Some(2.5));
        assert_eq!(document.config.alpha_decay, 0.05);

        let sim = document.into_simulation().unwrap();
        assert_eq!(sim.node("b").unwrap().y(), -2.0);
    }

    #[test]
    fn surfaces_construction_errors() {
        let raw = r#"{ "nodes": [{ "id": "a" }], "links": [{ "source": "a", "target": "z" }] }"#;
        let error = GraphDocument::parse(raw)
            .unwrap()
            .into_simulation()
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::InvalidLinkReference { .. })
        ));
    }
}
