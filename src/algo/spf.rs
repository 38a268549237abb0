use std::collections::BTreeSet;

use tracing::debug;

use crate::graph::{TopologyGraph, VertexId};

use super::base::SearchSession;
use super::path_state::{PathState, PathStatus};
use super::types::{ComputedPath, Constraints};

/// Dijkstra on the TE metric. An edge whose paired reverse edge is
/// marked diverted contributes its metric negatively.
pub struct ShortestPathSearch<'g> {
    graph: &'g TopologyGraph,
}

impl<'g> ShortestPathSearch<'g> {
    pub fn new(graph: &'g TopologyGraph) -> Self {
        Self { graph }
    }

    pub fn compute(
        &self,
        source: VertexId,
        destination: VertexId,
        constraints: &Constraints,
    ) -> ComputedPath {
        let Ok(mut session) =
            SearchSession::initialize(self.graph, source, destination, constraints)
        else {
            return ComputedPath::failed(source, destination);
        };

        let mut visited: BTreeSet<VertexId> = BTreeSet::new();

        loop {
            let states = &session.states;
            let popped = session.queue.pop_min(|vertex, _slot, key| {
                visited.contains(&vertex)
                    || states.get(&vertex).map_or(true, |state| state.key != key)
            });
            let Some((vertex, _, _)) = popped else {
                break;
            };
            visited.insert(vertex);
            let Some(current) = session.states.get(&vertex).cloned() else {
                continue;
            };

            for edge in self.graph.outgoing_edges(vertex) {
                if visited.contains(&edge.destination) {
                    continue;
                }
                if session.prune_edge(edge, &current) {
                    continue;
                }
                let Some(attrs) = edge.attributes.as_ref() else {
                    continue;
                };

                let metric = i64::from(attrs.te_metric);
                let reverse_diverted = edge
                    .reverse
                    .and_then(|id| self.graph.edge(id))
                    .is_some_and(|reverse| reverse.diverted);
                let candidate = if reverse_diverted {
                    current.cost - metric
                } else {
                    current.cost + metric
                };

                let next = session
                    .states
                    .entry(edge.destination)
                    .or_insert_with(|| PathState::new(edge.destination));
                if candidate >= next.cost {
                    continue;
                }
                next.cost = candidate;
                next.delay = current.delay + i64::from(attrs.delay);
                next.key = candidate;
                next.predecessor = Some(vertex);
                next.status = PathStatus::InProgress;
                next.edges = current.edges.clone();
                next.edges.push(edge.id);
                session.queue.push(edge.destination, 0, candidate);
            }
        }

        match session.states.get(&destination) {
            Some(state) if state.cost < i64::MAX => {
                debug!(
                    "spf: {source} -> {destination} cost {} over {} edges",
                    state.cost,
                    state.edges.len()
                );
                session.completed_path(state)
            }
            _ => ComputedPath::no_path(source, destination),
        }
    }
}
