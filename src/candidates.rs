use crate::error::{Error, Result};
use crate::graph::{Candidate, Graph, NodeId};
use crate::model::{CostModel, EdgeClass, INFINITE_COST, MINUS_INFINITE_COST};
use crate::one_tree::OneTree;

/// Knobs for one candidate generation pass.
#[derive(Clone, Copy, Debug)]
pub struct CandidateParams {
    /// Per-node capacity. Zero skips generation entirely and only installs
    /// reference tour edges, which must then exist for every node.
    pub max_candidates: usize,
    /// Edges with a larger alpha value are rejected. Negative values are
    /// treated as unbounded.
    pub max_alpha: i64,
    /// Mirror every kept edge into the other endpoint's list afterwards.
    pub symmetric: bool,
}

impl Default for CandidateParams {
    fn default() -> Self {
        Self {
            max_candidates: 5,
            max_alpha: INFINITE_COST,
            symmetric: false,
        }
    }
}

/// Associates to each node a bounded list of candidate edges sorted by
/// ascending (alpha, cost), where alpha estimates how much the 1-tree bound
/// would grow if the edge were forced into the optimal structure.
///
/// The graph must hold the 1-tree produced by `minimum_one_tree_cost` in the
/// same pass; `one_tree` carries the closing edge cost of its special node.
/// Alpha values are computed in O(n²) time and O(n) space by memoizing, per
/// "from" node, the maximum tree edge cost on each node's path toward it
/// (Helsgaun's beta recurrence).
pub fn generate_candidates(
    graph: &mut Graph,
    model: &impl CostModel,
    one_tree: &OneTree,
    params: &CandidateParams,
) -> Result<()> {
    let n = graph.len();
    let max_alpha = if params.max_alpha < 0 {
        INFINITE_COST
    } else {
        params.max_alpha
    };
    log::debug!(
        "candidates: generating max_candidates={} max_alpha={max_alpha} symmetric={}",
        params.max_candidates,
        params.symmetric
    );

    for id in 0..n {
        graph.node_mut(id).candidates = Vec::new();
    }
    if params.max_candidates == 0 {
        add_tour_candidates(graph, model);
        for id in 0..n {
            if graph.candidates(id).is_empty() {
                return Err(Error::EmptyCandidateSet { node: id });
            }
        }
        return Ok(());
    }
    for id in 0..n {
        graph.node_mut(id).candidates = Vec::with_capacity(params.max_candidates + 1);
    }

    // Per-pass scratch: beta[x] is the maximum tree edge cost on the path
    // from x toward `from`, valid only while mark[x] names the current
    // `from` or x was recomputed in this inner sweep.
    let mut beta = vec![MINUS_INFINITE_COST; n];
    let mut mark: Vec<Option<NodeId>> = vec![None; n];

    let order = graph.order();
    let first = graph.first();
    for &from in &order {
        if from != first {
            beta[from] = MINUS_INFINITE_COST;
            let mut to = from;
            while let Some(dad) = graph.dad(to) {
                beta[dad] = if graph.classify(model, to, dad) != EdgeClass::Mandatory {
                    beta[to].max(graph.tree_cost(to))
                } else {
                    beta[to]
                };
                mark[dad] = Some(from);
                to = dad;
            }
        }

        let mut count = 0usize;
        for &to in &order {
            if to == from {
                continue;
            }
            let class = graph.classify(model, from, to);
            let mut d = match graph.adjusted_penalized(model, from, to) {
                Some(c) if class != EdgeClass::Mandatory => c,
                _ => graph.penalized(model, from, to),
            };
            let mut a = if from == first {
                if graph.dad(from) == Some(to) {
                    0
                } else {
                    d.saturating_sub(one_tree.closing_cost)
                }
            } else if to == first {
                if graph.dad(to) == Some(from) {
                    0
                } else {
                    d.saturating_sub(one_tree.closing_cost)
                }
            } else {
                if mark[to] != Some(from)
                    && let Some(dad) = graph.dad(to)
                {
                    beta[to] = if graph.classify(model, to, dad) != EdgeClass::Mandatory {
                        beta[dad].max(graph.tree_cost(to))
                    } else {
                        beta[dad]
                    };
                }
                d.saturating_sub(beta[to])
            };

            match class {
                EdgeClass::Mandatory => a = MINUS_INFINITE_COST,
                EdgeClass::Forbidden => continue,
                EdgeClass::InReference => {
                    a = 0;
                    if model.adjusted(from, to).is_some() {
                        d = graph.penalized(model, from, to);
                    }
                }
                EdgeClass::Normal => {
                    if model.adjusted(from, to).is_some() {
                        // Prune on the adjusted value before paying for the
                        // base distance.
                        if a > max_alpha || at_capacity_and_no_better(graph, from, count, params, a, d)
                        {
                            continue;
                        }
                        if graph.dad(from) == Some(to) {
                            d = graph.tree_cost(from);
                            a = 0;
                        } else if graph.dad(to) == Some(from) {
                            d = graph.tree_cost(to);
                            a = 0;
                        } else {
                            // Beta pinned through mandatory tree edges can
                            // saturate alpha at the representable boundary.
                            let exact = graph.penalized(model, from, to);
                            a = a.saturating_sub(d).saturating_add(exact);
                            d = exact;
                        }
                    }
                }
            }

            if a <= max_alpha {
                insert_candidate(graph, from, to, d, a, params.max_candidates, &mut count);
            }
        }
    }

    add_tour_candidates(graph, model);
    if params.symmetric {
        symmetrize_candidate_set(graph);
    }
    log::debug!("candidates: done");
    Ok(())
}

fn at_capacity_and_no_better(
    graph: &Graph,
    from: NodeId,
    count: usize,
    params: &CandidateParams,
    a: i64,
    d: i64,
) -> bool {
    if count < params.max_candidates {
        return false;
    }
    let worst = graph.candidates(from)[count - 1];
    a > worst.alpha || (a == worst.alpha && d >= worst.cost)
}

/// Bounded insertion sort into `from`'s list: shift worse entries down,
/// insert in place, truncate at capacity. First-encountered entries win ties.
fn insert_candidate(
    graph: &mut Graph,
    from: NodeId,
    to: NodeId,
    cost: i64,
    alpha: i64,
    max_candidates: usize,
    count: &mut usize,
) {
    let list = &mut graph.node_mut(from).candidates;
    let mut i = *count;
    while i > 0 {
        let prev = list[i - 1];
        if alpha > prev.alpha || (alpha == prev.alpha && cost >= prev.cost) {
            break;
        }
        i -= 1;
    }
    list.insert(i, Candidate { to, cost, alpha });
    if *count < max_candidates {
        *count += 1;
    }
    list.truncate(*count);
}

/// Unconditionally adds the reference tour's edges to both endpoints' sets,
/// beyond the nominal capacity if necessary, so downstream search always has
/// a feasible tour available.
pub(crate) fn add_tour_candidates(graph: &mut Graph, model: &impl CostModel) {
    for from in 0..graph.len() {
        for neighbor in graph.reference_neighbors(from) {
            let Some(to) = neighbor else {
                continue;
            };
            if to == from || graph.classify(model, from, to) == EdgeClass::Forbidden {
                continue;
            }
            let cost = graph.penalized(model, from, to);
            add_candidate_unbounded(graph, from, to, cost, 0);
        }
    }
}

/// Ensures every kept edge (u, v) also appears in v's list, growing lists
/// past their nominal capacity where needed.
pub(crate) fn symmetrize_candidate_set(graph: &mut Graph) {
    for &from in &graph.order() {
        let live = graph.candidates(from).len();
        for i in 0..live {
            let candidate = graph.candidates(from)[i];
            add_candidate_unbounded(graph, candidate.to, from, candidate.cost, candidate.alpha);
        }
    }
}

fn add_candidate_unbounded(graph: &mut Graph, from: NodeId, to: NodeId, cost: i64, alpha: i64) {
    if graph.candidates(from).iter().any(|c| c.to == to) {
        return;
    }
    let list = &mut graph.node_mut(from).candidates;
    let at = list
        .iter()
        .position(|c| alpha < c.alpha || (alpha == c.alpha && cost < c.cost))
        .unwrap_or(list.len());
    list.insert(at, Candidate { to, cost, alpha });
}
