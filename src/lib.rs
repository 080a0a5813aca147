//! Alpha-nearness candidate edges and 1-tree lower bounds for symmetric
//! routing instances.
//!
//! The crate is the preprocessing core of a Lin-Kernighan style solver: it
//! builds minimum spanning trees (dense or shortlist-driven), closes them
//! into minimum 1-trees to obtain a Held-Karp style lower bound under
//! externally supplied node potentials, and ranks each node's incident edges
//! by how much forcing them into the optimal structure would raise that
//! bound. Everything runs synchronously in-process; persistence, subgradient
//! ascent and tour improvement belong to the host solver.

mod candidates;
mod error;
mod graph;
mod heap;
pub mod logging;
mod model;
mod mst;
mod one_tree;
mod preprocess;

pub use candidates::{CandidateParams, generate_candidates};
pub use error::{Error, Result};
pub use graph::{Candidate, Graph, NodeId};
pub use heap::DecreaseKeyHeap;
pub use model::{
    ConstrainedModel, CostModel, EdgeClass, INFINITE_COST, MINUS_INFINITE_COST, MatrixModel,
};
pub use mst::minimum_spanning_tree;
pub use one_tree::{OneTree, connect, minimum_one_tree_cost};
pub use preprocess::{BoundSummary, PreprocessOptions, create_candidate_set};
