use std::f64::consts::{PI, TAU};

use crate::graph::Vec2;

const INITIAL_RADIUS: f64 = 10.0;
const JIGGLE_EPSILON: f64 = 1e-6;

/// Phyllotaxis placement for the node at `index`.
///
/// Consecutive indices spiral outwards at the golden angle, so any prefix of the
/// node list is spread evenly around the origin and the layout only depends on
/// the index.
pub fn initial_position(index: usize) -> Vec2 {
    let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
    let radius = INITIAL_RADIUS * (0.5 + index as f64).sqrt();
    let angle = index as f64 * golden_angle;
    Vec2::new(radius * angle.cos(), radius * angle.sin())
}

/// Tiny deterministic offset used when two points coincide.
pub fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f64) * 0.618_034 + (to as f64) * 0.414_214 + 0.37) * TAU;
    Vec2::new(angle.cos(), angle.sin()) * JIGGLE_EPSILON
}

pub fn is_zero(delta: Vec2) -> bool {
    delta.x == 0.0 && delta.y == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_positions_are_distinct_and_deterministic() {
        let first = (0..64).map(initial_position).collect::<Vec<_>>();
        let second = (0..64).map(initial_position).collect::<Vec<_>>();
        assert_eq!(first, second);

        for i in 0..first.len() {
            for j in (i + 1)..first.len() {
                assert!((first[i] - first[j]).norm() > 1.0, "{i} and {j} overlap");
            }
        }
    }

    #[test]
    fn jiggle_is_tiny_but_nonzero() {
        let offset = jiggle(3, 7);
        assert!(!is_zero(offset));
        assert!(offset.norm() <= 1.1e-6);
        assert_eq!(offset, jiggle(3, 7));
    }
}
