use crate::error::{Error, Result};
use crate::model::{CostModel, EdgeClass};

pub type NodeId = usize;

/// One candidate edge endpoint owned by a node's candidate list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Candidate {
    pub to: NodeId,
    pub cost: i64,
    pub alpha: i64,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub dad: Option<NodeId>,
    pub cost: i64,
    pub suc: NodeId,
    pub pred: NodeId,
    pub v: i64,
    pub pi: i64,
    pub candidates: Vec<Candidate>,
    pub ref_pred: Option<NodeId>,
    pub ref_suc: Option<NodeId>,
}

/// The node set of one problem instance. Nodes live in a circular
/// doubly-linked visiting order expressed through `suc`/`pred` index fields
/// plus an explicit `first` index; the spanning tree builder rewrites this
/// order so that every node's parent precedes the node itself.
pub struct Graph {
    nodes: Vec<Node>,
    first: NodeId,
}

impl Graph {
    /// Creates `n` nodes linked in identity order, with node 0 as the
    /// designated first node. `n` must be at least 1.
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "a graph needs at least one node");
        let nodes = (0..n)
            .map(|i| Node {
                dad: None,
                cost: 0,
                suc: (i + 1) % n,
                pred: (i + n - 1) % n,
                v: 0,
                pi: 0,
                candidates: Vec::new(),
                ref_pred: None,
                ref_suc: None,
            })
            .collect();
        Self { nodes, first: 0 }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> NodeId {
        self.first
    }

    pub fn dad(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].dad
    }

    /// Cost of the tree edge from `id` to its parent.
    pub fn tree_cost(&self, id: NodeId) -> i64 {
        self.nodes[id].cost
    }

    pub fn suc(&self, id: NodeId) -> NodeId {
        self.nodes[id].suc
    }

    pub fn pred(&self, id: NodeId) -> NodeId {
        self.nodes[id].pred
    }

    /// Degree minus 2 in the last constructed 1-tree.
    pub fn degree_deficiency(&self, id: NodeId) -> i64 {
        self.nodes[id].v
    }

    pub fn pi(&self, id: NodeId) -> i64 {
        self.nodes[id].pi
    }

    pub fn candidates(&self, id: NodeId) -> &[Candidate] {
        &self.nodes[id].candidates
    }

    /// Installs an adjacency shortlist used by the sparse spanning tree
    /// builder. Entries carry raw (unpenalized) edge costs.
    pub fn set_candidates(&mut self, id: NodeId, candidates: Vec<Candidate>) {
        self.nodes[id].candidates = candidates;
    }

    /// Installs externally produced node potentials, one per node.
    pub fn set_potentials(&mut self, pi: &[i64]) -> Result<()> {
        if pi.len() != self.nodes.len() {
            return Err(Error::invalid_input(format!(
                "expected {} potentials, got {}",
                self.nodes.len(),
                pi.len()
            )));
        }
        for (node, &p) in self.nodes.iter_mut().zip(pi) {
            node.pi = p;
        }
        Ok(())
    }

    /// Designates a reference tour whose edges are treated as maximally
    /// relevant by the candidate generator. `tour` must visit every node
    /// exactly once.
    pub fn set_reference_tour(&mut self, tour: &[NodeId]) -> Result<()> {
        let n = self.nodes.len();
        if tour.len() != n {
            return Err(Error::invalid_input(format!(
                "reference tour visits {} of {} nodes",
                tour.len(),
                n
            )));
        }
        let mut seen = vec![false; n];
        for &id in tour {
            if id >= n || seen[id] {
                return Err(Error::invalid_input(format!(
                    "reference tour is not a permutation at node {id}"
                )));
            }
            seen[id] = true;
        }
        for i in 0..n {
            let id = tour[i];
            self.nodes[id].ref_suc = Some(tour[(i + 1) % n]);
            self.nodes[id].ref_pred = Some(tour[(i + n - 1) % n]);
        }
        Ok(())
    }

    pub fn clear_reference_tour(&mut self) {
        for node in &mut self.nodes {
            node.ref_pred = None;
            node.ref_suc = None;
        }
    }

    pub fn in_reference_tour(&self, a: NodeId, b: NodeId) -> bool {
        let node = &self.nodes[a];
        node.ref_suc == Some(b) || node.ref_pred == Some(b)
    }

    pub(crate) fn reference_neighbors(&self, id: NodeId) -> [Option<NodeId>; 2] {
        [self.nodes[id].ref_pred, self.nodes[id].ref_suc]
    }

    /// The visiting order, starting at the first node.
    pub fn order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut id = self.first;
        loop {
            order.push(id);
            id = self.nodes[id].suc;
            if id == self.first {
                break;
            }
        }
        order
    }

    /// Distance with both node potentials added (the reduced-cost transform).
    pub fn penalized(&self, model: &impl CostModel, a: NodeId, b: NodeId) -> i64 {
        model.distance(a, b) + self.nodes[a].pi + self.nodes[b].pi
    }

    pub(crate) fn adjusted_penalized(
        &self,
        model: &impl CostModel,
        a: NodeId,
        b: NodeId,
    ) -> Option<i64> {
        model
            .adjusted(a, b)
            .map(|c| c + self.nodes[a].pi + self.nodes[b].pi)
    }

    /// Single consolidated admissibility lookup, queried once per edge.
    pub fn classify(&self, model: &impl CostModel, a: NodeId, b: NodeId) -> EdgeClass {
        if model.mandatory(a, b) {
            EdgeClass::Mandatory
        } else if model.saturated(a) || model.saturated(b) || model.forbidden(a, b) {
            EdgeClass::Forbidden
        } else if self.in_reference_tour(a, b) {
            EdgeClass::InReference
        } else {
            EdgeClass::Normal
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub(crate) fn set_first(&mut self, id: NodeId) {
        self.first = id;
    }

    fn link(&mut self, a: NodeId, b: NodeId) {
        self.nodes[a].suc = b;
        self.nodes[b].pred = a;
    }

    /// Moves `x` so that it directly follows `after` in the visiting order.
    pub(crate) fn follow(&mut self, x: NodeId, after: NodeId) {
        if x == after || self.nodes[after].suc == x {
            return;
        }
        let (xp, xs) = (self.nodes[x].pred, self.nodes[x].suc);
        self.link(xp, xs);
        let target_suc = self.nodes[after].suc;
        self.link(x, target_suc);
        self.link(after, x);
    }

    /// Moves `x` so that it directly precedes `before` in the visiting order.
    pub(crate) fn precede(&mut self, x: NodeId, before: NodeId) {
        if x == before || self.nodes[before].pred == x {
            return;
        }
        let (xp, xs) = (self.nodes[x].pred, self.nodes[x].suc);
        self.link(xp, xs);
        let target_pred = self.nodes[before].pred;
        self.link(target_pred, x);
        self.link(x, before);
    }
}
