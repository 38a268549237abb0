mod base;
mod cspf;
#[cfg(test)]
pub(crate) mod fixtures;
mod path_state;
mod queue;
mod samcra;
mod spf;
mod types;

pub use cspf::ConstrainedShortestPathSearch;
pub use path_state::{PathState, PathStatus};
pub use samcra::MultiConstraintSearch;
pub use spf::ShortestPathSearch;
pub use types::{
    AddressFamily, ComputationStatus, ComputedPath, Constraints, PathHop,
};

use crate::graph::{TopologyGraph, VertexId};

/// Algorithm selection for callers that marshal requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmKind {
    Spf,
    Cspf,
    Samcra,
}

pub fn compute_path(
    graph: &TopologyGraph,
    algorithm: AlgorithmKind,
    source: VertexId,
    destination: VertexId,
    constraints: &Constraints,
) -> ComputedPath {
    match algorithm {
        AlgorithmKind::Spf => ShortestPathSearch::new(graph).compute(source, destination, constraints),
        AlgorithmKind::Cspf => {
            ConstrainedShortestPathSearch::new(graph).compute(source, destination, constraints)
        }
        AlgorithmKind::Samcra => {
            MultiConstraintSearch::new(graph).compute(source, destination, constraints)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::fixtures::diamond;

    #[test]
    fn dispatch_reaches_every_algorithm() {
        let graph = diamond();
        for kind in [AlgorithmKind::Spf, AlgorithmKind::Cspf, AlgorithmKind::Samcra] {
            let path = compute_path(&graph, kind, 1, 4, &Constraints::default());
            assert_eq!(path.status, ComputationStatus::Completed, "{kind:?}");
            assert_eq!(path.te_metric, 2, "{kind:?}");
        }
    }
}
