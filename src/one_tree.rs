use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::model::{CostModel, EdgeClass, INFINITE_COST, MINUS_INFINITE_COST};
use crate::mst::minimum_spanning_tree;

/// Result of a minimum 1-tree computation.
///
/// `cost` already contains the `-2·ΣPi` potential correction, so dividing by
/// the caller's precision multiplier yields a valid lower bound on the
/// optimal tour length. `norm` is the sum of squared degree deficiencies;
/// zero means the 1-tree is itself a tour.
#[derive(Clone, Copy, Debug)]
pub struct OneTree {
    pub cost: i64,
    pub norm: i64,
    /// The node whose leaf edge was closed into a cycle. It is also the
    /// first node of the rebuilt visiting order.
    pub special: NodeId,
    pub closing_to: NodeId,
    pub closing_cost: i64,
}

/// Computes the cost of a minimum 1-tree under the current node potentials.
///
/// The 1-tree is a minimum spanning tree plus the closing edge of the leaf
/// whose cheapest admissible non-tree edge is the most expensive among all
/// leaves. That leaf selection rule is kept exactly as published; it is not
/// the literal "second nearest neighbor" a reader might expect.
pub fn minimum_one_tree_cost(
    graph: &mut Graph,
    model: &impl CostModel,
    sparse: bool,
) -> Result<OneTree> {
    minimum_spanning_tree(graph, model, sparse);

    let first = graph.first();
    let mut sum = 0i64;
    let mut id = first;
    loop {
        let node = graph.node_mut(id);
        node.v = -2;
        sum += node.pi;
        id = graph.suc(id);
        if id == first {
            break;
        }
    }
    sum *= -2;

    // Derive every node's tree degree and accumulate the tree edge costs.
    let mut id = graph.suc(first);
    while id != first {
        let Some(dad) = graph.dad(id) else {
            return Err(Error::invalid_input(format!(
                "node {id} is not connected to the spanning tree"
            )));
        };
        graph.node_mut(id).v += 1;
        graph.node_mut(dad).v += 1;
        sum += graph.tree_cost(id);
        id = graph.suc(id);
    }
    let first_suc = graph.suc(first);
    graph.node_mut(first).dad = Some(first_suc);
    graph.node_mut(first).cost = graph.tree_cost(first_suc);

    // Pick the leaf whose cheapest closing edge costs the most.
    let mut special: Option<NodeId> = None;
    let mut closing_to = first;
    let mut max = MINUS_INFINITE_COST;
    let mut id = first;
    loop {
        if graph.degree_deficiency(id) == -1 {
            let (next, next_cost) = connect(graph, model, id, sparse);
            if next_cost > max
                && let Some(next) = next
            {
                special = Some(id);
                closing_to = next;
                max = next_cost;
            }
        }
        id = graph.suc(id);
        if id == first {
            break;
        }
    }
    let Some(special) = special else {
        return Err(Error::NoClosableLeaf { node: first });
    };

    graph.node_mut(closing_to).v += 1;
    graph.node_mut(special).v += 1;
    sum += max;

    let mut norm = 0i64;
    let mut id = first;
    loop {
        let v = graph.degree_deficiency(id);
        norm += v * v;
        id = graph.suc(id);
        if id == first {
            break;
        }
    }

    // The special node becomes the externally visible first node; the
    // dad-null root of the tree moves accordingly.
    if special == first {
        let suc = graph.suc(special);
        graph.node_mut(suc).dad = None;
    } else {
        graph.node_mut(first).dad = None;
        graph.precede(special, first);
        graph.set_first(special);
    }

    if norm == 0 {
        rederive_tour(graph, model);
    }

    log::debug!("one_tree: cost={sum} norm={norm} special={special}");
    Ok(OneTree {
        cost: sum,
        norm,
        special: graph.first(),
        closing_to,
        closing_cost: max,
    })
}

/// When the 1-tree is already a Hamiltonian cycle, lay the dad chain out
/// along the visiting order and re-derive consistent parent/cost pairs from
/// it, so a caller can read the cycle off as a tour.
fn rederive_tour(graph: &mut Graph, model: &impl CostModel) {
    let first = graph.first();
    let mut prev = first;
    let mut next = graph.dad(first);
    while let Some(id) = next {
        graph.follow(id, prev);
        prev = id;
        next = graph.dad(id);
    }

    let mut id = graph.suc(first);
    while id != first {
        let pred = graph.pred(id);
        let cost = graph.penalized(model, id, pred);
        let node = graph.node_mut(id);
        node.dad = Some(pred);
        node.cost = cost;
        id = graph.suc(id);
    }
    let suc = graph.suc(first);
    graph.node_mut(suc).dad = None;
}

/// Finds a leaf's cheapest admissible non-tree edge. Mandatory edges win
/// outright; the adjusted cost, when present, only prefilters the dense
/// scan. Returns the infinite sentinel cost when no edge is admissible.
pub fn connect(
    graph: &Graph,
    model: &impl CostModel,
    n1: NodeId,
    sparse: bool,
) -> (Option<NodeId>, i64) {
    let mut next = None;
    let mut next_cost = INFINITE_COST;

    if !sparse || graph.candidates(n1).len() < 2 {
        let first = graph.first();
        let mut n = first;
        loop {
            if n != n1 && graph.dad(n1) != Some(n) && graph.dad(n) != Some(n1) {
                match graph.classify(model, n1, n) {
                    EdgeClass::Mandatory => {
                        return (Some(n), graph.penalized(model, n1, n));
                    }
                    EdgeClass::Forbidden => {}
                    _ => {
                        let passes = match graph.adjusted_penalized(model, n1, n) {
                            Some(c) => c < next_cost,
                            None => true,
                        };
                        if passes {
                            let d = graph.penalized(model, n1, n);
                            if d < next_cost {
                                next_cost = d;
                                next = Some(n);
                            }
                        }
                    }
                }
            }
            n = graph.suc(n);
            if n == first {
                break;
            }
        }
    } else {
        for candidate in graph.candidates(n1) {
            let n = candidate.to;
            if n == n1 || graph.dad(n1) == Some(n) || graph.dad(n) == Some(n1) {
                continue;
            }
            let d = candidate.cost + graph.pi(n1) + graph.pi(n);
            match graph.classify(model, n1, n) {
                EdgeClass::Mandatory => return (Some(n), d),
                EdgeClass::Forbidden => {}
                _ => {
                    if d < next_cost {
                        next_cost = d;
                        next = Some(n);
                    }
                }
            }
        }
    }
    (next, next_cost)
}
