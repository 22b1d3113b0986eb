//! Barnes-Hut quadtree, rebuilt from scratch for every tick.

use crate::graph::{Node, Vec2};
use crate::util::jiggle;

const QUADTREE_LEAF_CAPACITY: usize = 4;
const QUADTREE_MAX_DEPTH: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadBounds {
    pub center: Vec2,
    pub half_extent: f64,
}

impl QuadBounds {
    fn from_points(points: &[Vec2]) -> Option<Self> {
        let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);

        for point in points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let center = (min + max) * 0.5;
        let span = (max.x - min.x).max(max.y - min.y).max(1.0);

        Some(Self {
            center,
            half_extent: span * 0.5 + 1.0,
        })
    }

    pub fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => Vec2::new(-quarter, -quarter),
            1 => Vec2::new(quarter, -quarter),
            2 => Vec2::new(-quarter, quarter),
            _ => Vec2::new(quarter, quarter),
        };

        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        let right = point.x >= self.center.x;
        let upper = point.y >= self.center.y;
        match (right, upper) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }

    pub fn side_length(self) -> f64 {
        self.half_extent * 2.0
    }

    /// Squared gap between two boxes, zero when they touch or overlap.
    pub fn distance_sq_to(self, other: Self) -> f64 {
        let reach = self.half_extent + other.half_extent;
        let dx = ((self.center.x - other.center.x).abs() - reach).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - reach).max(0.0);
        dx * dx + dy * dy
    }
}

/// One quadrant with its aggregates.
///
/// `centroid` is weighted by the absolute charge of the points below it (the
/// plain mean when every charge is zero), `charge` is their signed sum,
/// `weight` their absolute sum and `max_radius` the largest radius, used to
/// prune collision queries.
#[derive(Debug)]
pub struct QuadNode {
    pub bounds: QuadBounds,
    pub centroid: Vec2,
    pub charge: f64,
    pub weight: f64,
    pub count: usize,
    pub max_radius: f64,
    pub indices: Vec<usize>,
    pub children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    fn build(bounds: QuadBounds, indices: Vec<usize>, tree: &PointSet, depth: usize) -> Self {
        let mut weighted = Vec2::zeros();
        let mut mean = Vec2::zeros();
        let mut weight = 0.0;
        let mut charge = 0.0;
        let mut max_radius = 0.0_f64;
        for &index in &indices {
            let point = tree.points[index];
            let point_charge = tree.charges[index];
            weighted += point * point_charge.abs();
            mean += point;
            weight += point_charge.abs();
            charge += point_charge;
            max_radius = max_radius.max(tree.radii[index]);
        }

        let count = indices.len();
        let centroid = if weight > 0.0 {
            weighted / weight
        } else if count > 0 {
            mean / count as f64
        } else {
            bounds.center
        };

        let mut node = Self {
            bounds,
            centroid,
            charge,
            weight,
            count,
            max_radius,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= QUADTREE_MAX_DEPTH || node.indices.len() <= QUADTREE_LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &node.indices {
            let quadrant = bounds.quadrant_for(tree.points[index]);
            buckets[quadrant].push(index);
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }

            node.children[quadrant] = Some(Box::new(Self::build(
                bounds.child(quadrant),
                bucket,
                tree,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }

    fn children(&self) -> impl Iterator<Item = &QuadNode> {
        self.children.iter().filter_map(|child| child.as_deref())
    }

    fn depth(&self) -> usize {
        self.children().map(|child| child.depth() + 1).max().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct PointSet {
    points: Vec<Vec2>,
    charges: Vec<f64>,
    radii: Vec<f64>,
}

/// A contribution handed to [`QuadTree::accumulate`] visitors: either a single
/// point or the aggregate of a far-away quadrant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSource {
    pub position: Vec2,
    pub charge: f64,
    /// Index of the point when this is not an aggregate.
    pub index: Option<usize>,
}

#[derive(Debug)]
pub struct QuadTree {
    set: PointSet,
    root: Option<QuadNode>,
}

impl QuadTree {
    /// Builds the tree over `points`. Every point is offset by a tiny
    /// index-derived amount so that coincident inputs separate.
    pub fn build(points: &[Vec2], charges: &[f64], radii: &[f64]) -> Self {
        debug_assert_eq!(points.len(), charges.len());
        debug_assert_eq!(points.len(), radii.len());

        let set = PointSet {
            points: points
                .iter()
                .enumerate()
                .map(|(index, point)| point + jiggle(index, index + 1))
                .collect(),
            charges: charges.to_vec(),
            radii: radii.to_vec(),
        };

        let root = QuadBounds::from_points(&set.points).map(|bounds| {
            let indices = (0..set.points.len()).collect::<Vec<_>>();
            QuadNode::build(bounds, indices, &set, 0)
        });

        Self { set, root }
    }

    pub fn from_nodes(nodes: &[Node]) -> Self {
        let points = nodes.iter().map(|node| node.position).collect::<Vec<_>>();
        let charges = nodes.iter().map(|node| node.charge).collect::<Vec<_>>();
        let radii = nodes.iter().map(|node| node.radius).collect::<Vec<_>>();
        Self::build(&points, &charges, &radii)
    }

    pub fn root(&self) -> Option<&QuadNode> {
        self.root.as_ref()
    }

    pub fn len(&self) -> usize {
        self.set.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.points.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, QuadNode::depth)
    }

    /// Walks the tree on behalf of `point`, calling `visit` with every source
    /// that acts on it.
    ///
    /// A quadrant that does not contain `point` and whose side length divided by
    /// its distance to `point` is below `theta` is reported once through its
    /// aggregate; otherwise the walk descends. Points inside leaves are reported
    /// individually, skipping `exclude`.
    pub fn accumulate<F>(&self, point: Vec2, exclude: Option<usize>, theta: f64, mut visit: F)
    where
        F: FnMut(FieldSource),
    {
        if let Some(root) = &self.root {
            self.accumulate_node(root, point, exclude, theta, &mut visit);
        }
    }

    fn accumulate_node<F>(
        &self,
        node: &QuadNode,
        point: Vec2,
        exclude: Option<usize>,
        theta: f64,
        visit: &mut F,
    ) where
        F: FnMut(FieldSource),
    {
        if node.weight == 0.0 {
            return;
        }

        if node.is_leaf() {
            for &index in &node.indices {
                if Some(index) == exclude {
                    continue;
                }
                visit(FieldSource {
                    position: self.set.points[index],
                    charge: self.set.charges[index],
                    index: Some(index),
                });
            }
            return;
        }

        let distance = (node.centroid - point).norm();
        let can_approximate = !node.bounds.contains(point)
            && distance > 0.0
            && node.bounds.side_length() / distance < theta;

        if can_approximate {
            visit(FieldSource {
                position: node.centroid,
                charge: node.charge,
                index: None,
            });
            return;
        }

        for child in node.children() {
            self.accumulate_node(child, point, exclude, theta, visit);
        }
    }

    /// Calls `visit(i, j)` with `i < j` for every pair whose quadrants are close
    /// enough for their radii to overlap. Pairs are candidates only; callers
    /// still test the actual distance.
    pub fn for_each_candidate_pair<F>(&self, mut visit: F)
    where
        F: FnMut(usize, usize),
    {
        if let Some(root) = &self.root {
            candidate_pairs(root, root, true, &mut visit);
        }
    }

    /// Index of the point closest to `point`, if any lies within `max_distance`.
    pub fn nearest(&self, point: Vec2, max_distance: Option<f64>) -> Option<usize> {
        let root = self.root.as_ref()?;
        let mut best_sq = max_distance.map_or(f64::INFINITY, |distance| distance * distance);
        let mut best = None;
        self.nearest_in(root, point, &mut best_sq, &mut best);
        best
    }

    fn nearest_in(
        &self,
        node: &QuadNode,
        point: Vec2,
        best_sq: &mut f64,
        best: &mut Option<usize>,
    ) {
        let probe = QuadBounds {
            center: point,
            half_extent: 0.0,
        };
        if node.bounds.distance_sq_to(probe) > *best_sq {
            return;
        }

        if node.is_leaf() {
            for &index in &node.indices {
                let distance_sq = (self.set.points[index] - point).norm_squared();
                if distance_sq <= *best_sq {
                    *best_sq = distance_sq;
                    *best = Some(index);
                }
            }
            return;
        }

        let mut children = node.children().collect::<Vec<_>>();
        children.sort_by(|a, b| {
            let da = a.bounds.distance_sq_to(probe);
            let db = b.bounds.distance_sq_to(probe);
            da.total_cmp(&db)
        });
        for child in children {
            self.nearest_in(child, point, best_sq, best);
        }
    }
}

fn candidate_pairs<F>(node_a: &QuadNode, node_b: &QuadNode, same_node: bool, visit: &mut F)
where
    F: FnMut(usize, usize),
{
    let reach = node_a.max_radius + node_b.max_radius;
    if reach <= 0.0 || node_a.bounds.distance_sq_to(node_b.bounds) > reach * reach {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    visit(from.min(to), from.max(to));
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    visit(from.min(to), from.max(to));
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_deref() else {
                continue;
            };

            candidate_pairs(child_a, child_a, true, visit);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_deref() else {
                    continue;
                };
                candidate_pairs(child_a, child_b, false, visit);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children() {
            candidate_pairs(child, node_b, false, visit);
        }
    } else {
        for child in node_b.children() {
            candidate_pairs(node_a, child, false, visit);
        }
    }
}
