use std::fmt;

use crate::candidates::{CandidateParams, generate_candidates};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::model::CostModel;
use crate::one_tree::minimum_one_tree_cost;

/// Options for the preprocessing pass that turns supplied node potentials
/// into a lower bound and a candidate set.
#[derive(Clone, Copy, Debug)]
pub struct PreprocessOptions {
    pub max_candidates: usize,
    /// Fraction of the 1-tree cost admitted as the alpha ceiling. Values at
    /// or below zero mean `1/n`.
    pub excess: f64,
    pub symmetric: bool,
    /// Forwarded to the spanning tree builder.
    pub sparse: bool,
    /// The fixed-precision multiplier the distances were scaled by.
    pub precision: i64,
    /// Known or assumed optimal tour length (unscaled). Used to tighten the
    /// alpha ceiling and to log the gap.
    pub optimum: Option<i64>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            max_candidates: 5,
            excess: 0.0,
            symmetric: false,
            sparse: false,
            precision: 1,
            optimum: None,
        }
    }
}

/// Outcome of a preprocessing pass.
#[derive(Clone, Copy, Debug)]
pub struct BoundSummary {
    /// Scaled 1-tree cost after the potential correction.
    pub cost: i64,
    /// `cost` divided by the precision multiplier.
    pub lower_bound: f64,
    /// Squared degree-deficiency norm; zero means the bound is attained by
    /// an actual tour.
    pub norm: i64,
}

impl fmt::Display for BoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = ryu::Buffer::new();
        write!(
            f,
            "lower_bound={} norm={}",
            buffer.format(self.lower_bound),
            self.norm
        )
    }
}

/// Computes the 1-tree lower bound under the graph's current potentials and
/// generates every node's alpha-nearness candidate set in the same pass.
///
/// The alpha ceiling is `|excess · cost|`, tightened to
/// `optimum · precision − cost` when a finite optimum is supplied. Every
/// node must end up with at least one candidate.
pub fn create_candidate_set(
    graph: &mut Graph,
    model: &impl CostModel,
    options: &PreprocessOptions,
) -> Result<BoundSummary> {
    let one_tree = minimum_one_tree_cost(graph, model, options.sparse)?;
    let lower_bound = one_tree.cost as f64 / options.precision as f64;

    match options.optimum {
        Some(optimum) if optimum != 0 => {
            let gap = 100.0 * (optimum as f64 - lower_bound) / optimum as f64;
            log::info!("preprocess: lower_bound={lower_bound:.1} gap={gap:.2}%");
        }
        _ => log::info!("preprocess: lower_bound={lower_bound:.1}"),
    }

    let excess = if options.excess > 0.0 {
        options.excess
    } else {
        1.0 / graph.len() as f64
    };
    let mut max_alpha = (excess * one_tree.cost as f64).abs() as i64;
    if let Some(optimum) = options.optimum {
        let admitted = optimum * options.precision - one_tree.cost;
        if admitted > 0 && admitted < max_alpha {
            max_alpha = admitted;
        }
    }

    generate_candidates(
        graph,
        model,
        &one_tree,
        &CandidateParams {
            max_candidates: options.max_candidates,
            max_alpha,
            symmetric: options.symmetric,
        },
    )?;

    for id in 0..graph.len() {
        if graph.candidates(id).is_empty() {
            return Err(Error::EmptyCandidateSet { node: id });
        }
    }
    log_candidate_report(graph);

    Ok(BoundSummary {
        cost: one_tree.cost,
        lower_bound,
        norm: one_tree.norm,
    })
}

fn log_candidate_report(graph: &Graph) {
    let mut min = usize::MAX;
    let mut max = 0usize;
    let mut total = 0usize;
    for id in 0..graph.len() {
        let len = graph.candidates(id).len();
        min = min.min(len);
        max = max.max(len);
        total += len;
    }
    log::info!(
        "preprocess: candidates min={min} max={max} avg={:.1}",
        total as f64 / graph.len() as f64
    );
}

#[cfg(test)]
mod tests {
    use super::{PreprocessOptions, create_candidate_set};
    use crate::error::Error;
    use crate::graph::Graph;
    use crate::model::MatrixModel;

    fn unit_square() -> (Graph, MatrixModel) {
        let points = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
        (Graph::new(4), MatrixModel::from_euc2d(&points, 1000))
    }

    #[test]
    fn unit_square_bound_is_the_tour_length() {
        let (mut graph, model) = unit_square();
        let options = PreprocessOptions {
            max_candidates: 3,
            precision: 1000,
            ..PreprocessOptions::default()
        };
        let summary = create_candidate_set(&mut graph, &model, &options).expect("preprocess");

        assert_eq!(summary.cost, 4000);
        assert_eq!(summary.norm, 0);
        assert!((summary.lower_bound - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn small_excess_keeps_only_zero_alpha_edges() {
        let (mut graph, model) = unit_square();
        let options = PreprocessOptions {
            max_candidates: 3,
            excess: 0.0001,
            precision: 1000,
            ..PreprocessOptions::default()
        };
        create_candidate_set(&mut graph, &model, &options).expect("preprocess");

        for id in 0..4 {
            let list = graph.candidates(id);
            assert_eq!(list.len(), 2);
            assert!(list.iter().all(|c| c.alpha == 0));
        }
    }

    #[test]
    fn known_optimum_tightens_the_alpha_ceiling() {
        // A cross: center node 0 and four outliers. The 1-tree bound is
        // 27071 scaled; a claimed optimum of 29 admits 1929 of alpha excess,
        // well under the default excess fraction's 5414.
        let points = [(5.0, 5.0), (0.0, 5.0), (5.0, 0.0), (10.0, 5.0), (5.0, 10.0)];
        let model = MatrixModel::from_euc2d(&points, 1000);

        let mut loose = Graph::new(points.len());
        let options = PreprocessOptions {
            max_candidates: 4,
            precision: 1000,
            ..PreprocessOptions::default()
        };
        create_candidate_set(&mut loose, &model, &options).expect("preprocess");
        assert_eq!(loose.candidates(3).len(), 4);

        let mut tight = Graph::new(points.len());
        let options = PreprocessOptions {
            optimum: Some(29),
            ..options
        };
        create_candidate_set(&mut tight, &model, &options).expect("preprocess");
        let list = tight.candidates(3);
        assert_eq!(list.len(), 1, "only the tree edge survives the ceiling");
        assert_eq!(list[0].to, 0);
        assert_eq!(list[0].alpha, 0);
    }

    #[test]
    fn zero_capacity_without_reference_tour_fails() {
        let (mut graph, model) = unit_square();
        let options = PreprocessOptions {
            max_candidates: 0,
            precision: 1000,
            ..PreprocessOptions::default()
        };
        match create_candidate_set(&mut graph, &model, &options) {
            Err(Error::EmptyCandidateSet { node: 0 }) => {}
            other => panic!("expected EmptyCandidateSet, got {other:?}"),
        }
    }

    #[test]
    fn summary_display_reports_bound_and_norm() {
        let (mut graph, model) = unit_square();
        let options = PreprocessOptions {
            max_candidates: 3,
            precision: 1000,
            ..PreprocessOptions::default()
        };
        let summary = create_candidate_set(&mut graph, &model, &options).expect("preprocess");
        assert_eq!(summary.to_string(), "lower_bound=4.0 norm=0");
    }
}
