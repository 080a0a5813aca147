use crate::graph::{Graph, NodeId};
use crate::heap::DecreaseKeyHeap;
use crate::model::{CostModel, EdgeClass, INFINITE_COST, MINUS_INFINITE_COST};

/// Builds a minimum spanning tree with Prim's algorithm, rooted at the
/// graph's first node.
///
/// On return every node's `dad`/`tree_cost` describe the tree and the
/// visiting order is topological: a node's parent always precedes it. The
/// sparse mode drives the relaxation from each node's adjacency shortlist
/// through a decrease-key heap; it falls back to the dense scan when the
/// root has no shortlist.
pub fn minimum_spanning_tree(graph: &mut Graph, model: &impl CostModel, sparse: bool) {
    let first = graph.first();
    graph.node_mut(first).dad = None;
    if sparse && !graph.candidates(first).is_empty() {
        sparse_tree(graph, model);
    } else {
        dense_tree(graph, model);
    }
}

fn dense_tree(graph: &mut Graph, model: &impl CostModel) {
    let first = graph.first();
    let mut n = graph.suc(first);
    while n != first {
        let node = graph.node_mut(n);
        node.dad = None;
        node.cost = INFINITE_COST;
        n = graph.suc(n);
    }

    // `blue` is the last node included in the tree; non-tree nodes are
    // exactly its successors in the visiting order.
    let mut blue = first;
    loop {
        let mut n = graph.suc(blue);
        if n == first {
            break;
        }
        let mut min = INFINITE_COST;
        let mut next_blue = n;
        loop {
            match graph.classify(model, blue, n) {
                EdgeClass::Mandatory => {
                    let cost = graph.penalized(model, blue, n);
                    let node = graph.node_mut(n);
                    node.dad = Some(blue);
                    node.cost = cost;
                    next_blue = n;
                    min = MINUS_INFINITE_COST;
                }
                class => {
                    if class != EdgeClass::Forbidden {
                        // The adjusted cost is only a prefilter; the base
                        // distance is what gets recorded.
                        let current = graph.node(n).cost;
                        let passes = match graph.adjusted_penalized(model, blue, n) {
                            Some(c) => c < current,
                            None => true,
                        };
                        if passes {
                            let d = graph.penalized(model, blue, n);
                            if d < current {
                                let node = graph.node_mut(n);
                                node.cost = d;
                                node.dad = Some(blue);
                            }
                        }
                    }
                    if graph.node(n).cost < min {
                        min = graph.node(n).cost;
                        next_blue = n;
                    }
                }
            }
            n = graph.suc(n);
            if n == first {
                break;
            }
        }
        graph.follow(next_blue, blue);
        blue = next_blue;
    }
}

fn sparse_tree(graph: &mut Graph, model: &impl CostModel) {
    let first = graph.first();
    let mut heap = DecreaseKeyHeap::with_capacity(graph.len());

    let mut n = graph.suc(first);
    while n != first {
        let node = graph.node_mut(n);
        node.dad = Some(first);
        node.cost = INFINITE_COST;
        heap.lazy_insert(n, INFINITE_COST);
        n = graph.suc(n);
    }

    relax_shortlist(graph, model, &mut heap, first);
    let mut blue = first;
    while let Some(next_blue) = heap.pop_min() {
        graph.follow(next_blue, blue);
        blue = next_blue;
        relax_shortlist(graph, model, &mut heap, blue);
    }
}

fn relax_shortlist(
    graph: &mut Graph,
    model: &impl CostModel,
    heap: &mut DecreaseKeyHeap,
    blue: NodeId,
) {
    for i in 0..graph.candidates(blue).len() {
        let candidate = graph.candidates(blue)[i];
        let n = candidate.to;
        if !heap.contains(n) {
            continue;
        }
        match graph.classify(model, blue, n) {
            EdgeClass::Mandatory => {
                let cost = candidate.cost + graph.pi(blue) + graph.pi(n);
                let node = graph.node_mut(n);
                node.dad = Some(blue);
                node.cost = cost;
                heap.decrease_key(n, MINUS_INFINITE_COST);
            }
            EdgeClass::Forbidden => {}
            _ => {
                // A node pinned by a mandatory edge keeps its overriding key.
                if heap.key(n) == MINUS_INFINITE_COST {
                    continue;
                }
                let d = candidate.cost + graph.pi(blue) + graph.pi(n);
                if d < graph.node(n).cost {
                    let node = graph.node_mut(n);
                    node.dad = Some(blue);
                    node.cost = d;
                    heap.decrease_key(n, d);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::minimum_spanning_tree;
    use crate::graph::{Candidate, Graph};
    use crate::model::{ConstrainedModel, CostModel, MatrixModel};

    fn unit_square() -> (Graph, MatrixModel) {
        let points = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
        (Graph::new(4), MatrixModel::from_euc2d(&points, 1000))
    }

    fn tree_cost(graph: &Graph) -> i64 {
        (0..graph.len())
            .filter(|&id| graph.dad(id).is_some())
            .map(|id| graph.tree_cost(id))
            .sum()
    }

    /// Gives every node the full adjacency as its shortlist, so the sparse
    /// builder sees the same graph as the dense one.
    fn install_complete_shortlists(graph: &mut Graph, model: &MatrixModel) {
        for from in 0..graph.len() {
            let list = (0..graph.len())
                .filter(|&to| to != from)
                .map(|to| Candidate {
                    to,
                    cost: model.distance(from, to),
                    alpha: 0,
                })
                .collect();
            graph.set_candidates(from, list);
        }
    }

    #[test]
    fn tree_has_one_root_and_n_minus_one_parent_links() {
        let (mut graph, model) = unit_square();
        minimum_spanning_tree(&mut graph, &model, false);

        let roots: Vec<_> = (0..4).filter(|&id| graph.dad(id).is_none()).collect();
        assert_eq!(roots, vec![graph.first()]);
        assert_eq!((0..4).filter(|&id| graph.dad(id).is_some()).count(), 3);
    }

    #[test]
    fn visiting_order_is_topological() {
        let (mut graph, model) = unit_square();
        minimum_spanning_tree(&mut graph, &model, false);

        let order = graph.order();
        assert_eq!(order.len(), 4);
        for (pos, &id) in order.iter().enumerate() {
            if let Some(dad) = graph.dad(id) {
                let dad_pos = order.iter().position(|&o| o == dad).expect("dad in order");
                assert!(dad_pos < pos, "parent {dad} must precede node {id}");
            }
        }
    }

    #[test]
    fn unit_square_tree_costs_three_sides() {
        let (mut graph, model) = unit_square();
        minimum_spanning_tree(&mut graph, &model, false);
        assert_eq!(tree_cost(&graph), 3000);
    }

    #[test]
    fn dense_and_sparse_agree_on_complete_shortlists() {
        let mut rng = StdRng::seed_from_u64(42);
        let points: Vec<(f64, f64)> = (0..30)
            .map(|_| (rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
            .collect();
        let model = MatrixModel::from_euc2d(&points, 1000);

        let mut dense = Graph::new(points.len());
        minimum_spanning_tree(&mut dense, &model, false);

        let mut sparse = Graph::new(points.len());
        install_complete_shortlists(&mut sparse, &model);
        minimum_spanning_tree(&mut sparse, &model, true);

        assert_eq!(tree_cost(&dense), tree_cost(&sparse));
    }

    #[test]
    fn sparse_without_shortlist_falls_back_to_dense() {
        let (mut graph, model) = unit_square();
        minimum_spanning_tree(&mut graph, &model, true);
        assert_eq!(tree_cost(&graph), 3000);
    }

    #[test]
    fn mandatory_edge_is_always_selected() {
        let (graph, model) = unit_square();
        let mut graph = graph;
        let mut model = ConstrainedModel::new(model);
        // Force a diagonal that no minimum tree would pick on its own.
        model.mandate(0, 2);
        minimum_spanning_tree(&mut graph, &model, false);

        assert!(graph.dad(2) == Some(0) || graph.dad(0) == Some(2));
    }

    #[test]
    fn forbidden_edges_are_never_used() {
        let (graph, model) = unit_square();
        let mut graph = graph;
        let mut model = ConstrainedModel::new(model);
        model.forbid(0, 1).forbid(2, 3);
        minimum_spanning_tree(&mut graph, &model, false);

        for id in 0..4 {
            if let Some(dad) = graph.dad(id) {
                assert!(!model.forbidden(id, dad), "tree uses forbidden edge {id}-{dad}");
            }
        }
    }

    #[test]
    fn saturated_node_joins_only_through_its_mandatory_edge() {
        let (mut graph, model) = unit_square();
        let mut model = ConstrainedModel::new(model);
        model.mandate(0, 1).saturate(1);
        minimum_spanning_tree(&mut graph, &model, false);

        for id in 0..4 {
            if let Some(dad) = graph.dad(id)
                && (id == 1 || dad == 1)
            {
                assert!(
                    model.mandatory(id, dad),
                    "tree attaches saturated node 1 via {id}-{dad}"
                );
            }
        }
        assert_eq!((0..4).filter(|&id| graph.dad(id).is_some()).count(), 3);
    }

    #[test]
    fn repeated_runs_produce_identical_trees() {
        let (mut a, model) = unit_square();
        minimum_spanning_tree(&mut a, &model, false);
        let mut b = Graph::new(4);
        minimum_spanning_tree(&mut b, &model, false);

        for id in 0..4 {
            assert_eq!(a.dad(id), b.dad(id));
            assert_eq!(a.tree_cost(id), b.tree_cost(id));
        }
        assert_eq!(a.order(), b.order());
    }
}
