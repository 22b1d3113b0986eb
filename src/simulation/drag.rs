use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::Vec2;

use super::{RunState, Simulation};

impl Simulation {
    /// Pins `id` at `(x, y)`. A run that has stopped, or cooled below the drag
    /// reheat level, is restarted at that level. A paused run is warmed to the
    /// same level but stays paused.
    pub fn drag_start(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        let index = self.pin(id, x, y)?;

        let reheat = self.config.drag_reheat_alpha;
        let cooled = match self.state {
            RunState::Stopped => true,
            RunState::Running | RunState::Paused => self.alpha < reheat,
            RunState::Idle => false,
        };
        debug!(id, index, x, y, cooled, "drag start");
        match (cooled, self.state) {
            (true, RunState::Paused) => self.alpha = reheat,
            (true, _) => self.restart(Some(reheat)),
            (false, _) => {}
        }
        Ok(())
    }

    /// Moves the pin of `id` without touching alpha.
    pub fn drag_move(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        self.pin(id, x, y)?;
        Ok(())
    }

    /// Releases `id` back into the simulation. Alpha keeps decaying as before.
    pub fn drag_end(&mut self, id: &str) -> Result<()> {
        let index = self.index_of(id)?;
        self.graph.nodes_mut()[index].fixed = None;
        debug!(id, index, "drag end");
        Ok(())
    }

    fn pin(&mut self, id: &str, x: f64, y: f64) -> Result<usize> {
        let index = self.index_of(id)?;
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::NonFiniteCoordinate { id: id.to_owned() });
        }

        let node = &mut self.graph.nodes_mut()[index];
        let point = Vec2::new(x, y);
        node.fixed = Some(point);
        node.position = point;
        node.velocity = Vec2::zeros();
        Ok(index)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.graph
            .index_of(id)
            .ok_or_else(|| Error::UnknownNode { id: id.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::graph::NodeSpec;

    fn simulation() -> Simulation {
        let nodes = vec![NodeSpec::new("a"), NodeSpec::new("b"), NodeSpec::new("c")];
        Simulation::new(nodes, Vec::new(), SimulationConfig::default()).unwrap()
    }

    #[test]
    fn unknown_node_leaves_state_untouched() {
        let mut sim = simulation();
        sim.start();
        sim.run(10);
        let before = sim.snapshot();
        let alpha = sim.alpha();

        assert_eq!(
            sim.drag_start("missing", 1.0, 2.0),
            Err(Error::UnknownNode {
                id: "missing".into()
            })
        );
        assert!(sim.drag_move("missing", 1.0, 2.0).is_err());
        assert!(sim.drag_end("missing").is_err());
        assert_eq!(sim.snapshot(), before);
        assert_eq!(sim.alpha(), alpha);
        assert!(sim.nodes().iter().all(|node| !node.is_pinned()));
    }

    #[test]
    fn non_finite_drag_is_rejected() {
        let mut sim = simulation();
        assert!(matches!(
            sim.drag_start("a", f64::NAN, 0.0),
            Err(Error::NonFiniteCoordinate { .. })
        ));
        assert!(!sim.node("a").unwrap().is_pinned());
    }

    #[test]
    fn drag_warms_a_cooled_pause_without_resuming() {
        let mut sim = simulation();
        sim.start();
        sim.run(100);
        sim.pause();
        assert!(sim.alpha() < sim.config().drag_reheat_alpha);

        sim.drag_start("b", 1.0, 1.0).unwrap();
        assert_eq!(sim.state(), RunState::Paused);
        assert_eq!(sim.alpha(), sim.config().drag_reheat_alpha);
        assert!(sim.tick().is_none());

        sim.resume();
        assert_eq!(sim.run(10), 10);
    }

    #[test]
    fn drag_keeps_a_warm_pause_untouched() {
        let mut sim = simulation();
        sim.start();
        sim.run(2);
        sim.pause();
        let alpha = sim.alpha();

        sim.drag_start("b", 1.0, 1.0).unwrap();
        assert_eq!(sim.state(), RunState::Paused);
        assert_eq!(sim.alpha(), alpha);
    }

    #[test]
    fn drag_on_idle_simulation_does_not_start_it() {
        let mut sim = simulation();
        sim.drag_start("a", 5.0, 5.0).unwrap();
        assert_eq!(sim.state(), RunState::Idle);
        assert_eq!(sim.node("a").unwrap().fx(), Some(5.0));
    }
}
