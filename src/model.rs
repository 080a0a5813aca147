use std::collections::HashSet;

use crate::graph::NodeId;

/// Sentinel for "no cost known yet". Compared against, never added to.
pub const INFINITE_COST: i64 = i64::MAX;
/// Sentinel for "cheaper than any real cost". Used to pin mandatory edges.
pub const MINUS_INFINITE_COST: i64 = i64::MIN;

/// Consolidated admissibility of a single edge. The variants are ordered by
/// precedence: a mandatory edge is mandatory even if it also lies on the
/// reference tour, and an edge touching a saturated node is excluded even if
/// the model never forbids it explicitly.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EdgeClass {
    Normal,
    Mandatory,
    Forbidden,
    InReference,
}

/// Cost oracle plus the edge admissibility predicates supplied by the host
/// solver. Distances must be symmetric, non-negative and pre-scaled to
/// integers by the caller's precision multiplier.
pub trait CostModel {
    fn distance(&self, a: NodeId, b: NodeId) -> i64;

    /// Optional problem-specific adjusted cost. When present it is preferred
    /// for relaxation and pruning comparisons, but the base distance is still
    /// recorded for pinned edges.
    fn adjusted(&self, a: NodeId, b: NodeId) -> Option<i64> {
        let _ = (a, b);
        None
    }

    /// The edge may never appear in a tree, 1-tree or candidate set.
    fn forbidden(&self, a: NodeId, b: NodeId) -> bool {
        let _ = (a, b);
        false
    }

    /// The edge is fixed by the problem or shared with every merge tour; it
    /// must be selected ahead of any competing relaxation.
    fn mandatory(&self, a: NodeId, b: NodeId) -> bool {
        let _ = (a, b);
        false
    }

    /// The node already holds its full quota of mandatory edges, so no
    /// further edge may be attached to it.
    fn saturated(&self, node: NodeId) -> bool {
        let _ = node;
        false
    }
}

impl<M: CostModel + ?Sized> CostModel for &M {
    fn distance(&self, a: NodeId, b: NodeId) -> i64 {
        (**self).distance(a, b)
    }
    fn adjusted(&self, a: NodeId, b: NodeId) -> Option<i64> {
        (**self).adjusted(a, b)
    }
    fn forbidden(&self, a: NodeId, b: NodeId) -> bool {
        (**self).forbidden(a, b)
    }
    fn mandatory(&self, a: NodeId, b: NodeId) -> bool {
        (**self).mandatory(a, b)
    }
    fn saturated(&self, node: NodeId) -> bool {
        (**self).saturated(node)
    }
}

/// Explicit symmetric distance matrix stored as a lower triangle.
#[derive(Clone, Debug)]
pub struct MatrixModel {
    n: usize,
    entries: Vec<i64>,
}

impl MatrixModel {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            entries: vec![0; n * n.saturating_sub(1) / 2],
        }
    }

    /// Builds a matrix from planar coordinates, rounding each Euclidean
    /// distance to the nearest integer after scaling by `precision`.
    pub fn from_euc2d(points: &[(f64, f64)], precision: i64) -> Self {
        let mut model = Self::new(points.len());
        for a in 1..points.len() {
            for b in 0..a {
                let dx = points[a].0 - points[b].0;
                let dy = points[a].1 - points[b].1;
                let d = (dx * dx + dy * dy).sqrt() * precision as f64;
                model.set(a, b, d.round() as i64);
            }
        }
        model
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn set(&mut self, a: NodeId, b: NodeId, cost: i64) {
        debug_assert!(a != b, "the matrix diagonal is implicitly zero");
        let i = self.index(a, b);
        self.entries[i] = cost;
    }

    fn index(&self, a: NodeId, b: NodeId) -> usize {
        let (hi, lo) = if a > b { (a, b) } else { (b, a) };
        hi * (hi - 1) / 2 + lo
    }
}

impl CostModel for MatrixModel {
    fn distance(&self, a: NodeId, b: NodeId) -> i64 {
        if a == b {
            return 0;
        }
        self.entries[self.index(a, b)]
    }
}

/// Wraps any model with explicit forbidden/mandatory edge sets and saturated
/// nodes, for hosts that carry fixed-edge constraints or merge tours.
#[derive(Clone, Debug)]
pub struct ConstrainedModel<M> {
    inner: M,
    forbidden: HashSet<(NodeId, NodeId)>,
    mandatory: HashSet<(NodeId, NodeId)>,
    saturated: HashSet<NodeId>,
}

impl<M: CostModel> ConstrainedModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            forbidden: HashSet::new(),
            mandatory: HashSet::new(),
            saturated: HashSet::new(),
        }
    }

    pub fn forbid(&mut self, a: NodeId, b: NodeId) -> &mut Self {
        self.forbidden.insert(ordered(a, b));
        self
    }

    pub fn mandate(&mut self, a: NodeId, b: NodeId) -> &mut Self {
        self.mandatory.insert(ordered(a, b));
        self
    }

    pub fn saturate(&mut self, node: NodeId) -> &mut Self {
        self.saturated.insert(node);
        self
    }
}

fn ordered(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a < b { (a, b) } else { (b, a) }
}

impl<M: CostModel> CostModel for ConstrainedModel<M> {
    fn distance(&self, a: NodeId, b: NodeId) -> i64 {
        self.inner.distance(a, b)
    }

    fn adjusted(&self, a: NodeId, b: NodeId) -> Option<i64> {
        self.inner.adjusted(a, b)
    }

    fn forbidden(&self, a: NodeId, b: NodeId) -> bool {
        self.forbidden.contains(&ordered(a, b)) || self.inner.forbidden(a, b)
    }

    fn mandatory(&self, a: NodeId, b: NodeId) -> bool {
        self.mandatory.contains(&ordered(a, b)) || self.inner.mandatory(a, b)
    }

    fn saturated(&self, node: NodeId) -> bool {
        self.saturated.contains(&node) || self.inner.saturated(node)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConstrainedModel, CostModel, MatrixModel};

    #[test]
    fn matrix_stores_symmetric_entries() {
        let mut model = MatrixModel::new(4);
        model.set(2, 0, 17);
        assert_eq!(model.distance(2, 0), 17);
        assert_eq!(model.distance(0, 2), 17);
        assert_eq!(model.distance(1, 1), 0);
    }

    #[test]
    fn euc2d_rounds_to_nearest_scaled_unit() {
        let points = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
        let model = MatrixModel::from_euc2d(&points, 1000);
        assert_eq!(model.distance(0, 1), 1000);
        assert_eq!(model.distance(0, 2), 1414);
        assert_eq!(model.distance(1, 3), 1414);
    }

    #[test]
    fn constrained_model_normalizes_endpoint_order() {
        let mut model = ConstrainedModel::new(MatrixModel::new(3));
        model.forbid(2, 1).mandate(0, 2).saturate(1);
        assert!(model.forbidden(1, 2));
        assert!(model.forbidden(2, 1));
        assert!(model.mandatory(2, 0));
        assert!(model.saturated(1));
        assert!(!model.saturated(0));
    }
}
