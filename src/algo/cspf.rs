use std::collections::BTreeSet;

use tracing::debug;

use crate::graph::{TopologyGraph, VertexId};

use super::base::SearchSession;
use super::path_state::{PathState, PathStatus};
use super::types::{ComputedPath, Constraints};

/// Constrained shortest path on the TE metric. The output is
/// snapshotted on each improvement of the destination.
pub struct ConstrainedShortestPathSearch<'g> {
    graph: &'g TopologyGraph,
}

impl<'g> ConstrainedShortestPathSearch<'g> {
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
        let mut best: Option<ComputedPath> = None;

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

                let candidate = current.cost + i64::from(attrs.te_metric);
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

                if edge.destination == destination {
                    let Some(reached) = session.states.get(&destination) else {
                        continue;
                    };
                    debug!(
                        "cspf: {source} -> {destination} improved to cost {}",
                        reached.cost
                    );
                    best = Some(session.completed_path(reached));
                }
            }
        }

        best.unwrap_or_else(|| ComputedPath::no_path(source, destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::fixtures::diamond;
    use crate::algo::spf::ShortestPathSearch;
    use crate::algo::types::{ComputationStatus, PathHop};
    use std::net::{IpAddr, Ipv4Addr};

    // The fixture diamond, except 2->4 has bandwidth below any useful
    // floor.
    fn starved_diamond() -> crate::graph::TopologyGraph {
        use crate::algo::fixtures::{add_link, edge, vertex};

        let mut graph = crate::graph::TopologyGraph::new();
        for id in 1..=4 {
            graph.add_vertex(vertex(id));
        }
        add_link(&mut graph, 10, 1, 2, 1, 1);
        let mut starved = edge(20, 2, 4, 1, 1);
        starved.reverse = Some(21);
        if let Some(attrs) = starved.attributes.as_mut() {
            attrs.unreserved_bandwidth = [10; crate::graph::CLASS_TYPE_COUNT];
            attrs.max_link_bandwidth = 10;
            attrs.max_resv_bandwidth = 10;
        }
        graph.add_edge(starved);
        let mut back = edge(21, 4, 2, 1, 1);
        back.reverse = Some(20);
        graph.add_edge(back);
        add_link(&mut graph, 30, 1, 3, 5, 5);
        add_link(&mut graph, 40, 3, 4, 5, 5);
        graph
    }

    #[test]
    fn bandwidth_floor_forces_expensive_branch() {
        let graph = starved_diamond();

        let path = ConstrainedShortestPathSearch::new(&graph).compute(
            1,
            4,
            &Constraints {
                bandwidth: Some(500),
                ..Constraints::default()
            },
        );

        assert_eq!(path.status, ComputationStatus::Completed);
        assert_eq!(path.te_metric, 10);
        assert_eq!(
            path.hops,
            vec![
                PathHop::Ipv4(Ipv4Addr::new(192, 0, 2, 3)),
                PathHop::Ipv4(Ipv4Addr::new(192, 0, 2, 4)),
            ]
        );
    }

    #[test]
    fn unconstrained_matches_spf_objective() {
        let graph = diamond();
        let constrained =
            ConstrainedShortestPathSearch::new(&graph).compute(1, 4, &Constraints::default());
        let plain = ShortestPathSearch::new(&graph).compute(1, 4, &Constraints::default());
        assert_eq!(constrained.te_metric, plain.te_metric);
        assert_eq!(constrained.hops, plain.hops);
    }

    #[test]
    fn tightening_a_constraint_never_beats_spf() {
        let graph = starved_diamond();
        let spf_cost = ShortestPathSearch::new(&graph)
            .compute(1, 4, &Constraints::default())
            .te_metric;

        for bandwidth in [None, Some(500)] {
            let path = ConstrainedShortestPathSearch::new(&graph).compute(
                1,
                4,
                &Constraints {
                    bandwidth,
                    ..Constraints::default()
                },
            );
            assert_eq!(path.status, ComputationStatus::Completed);
            assert!(path.te_metric >= spf_cost);
        }
    }

    #[test]
    fn infeasible_constraints_yield_no_path() {
        let graph = diamond();
        let path = ConstrainedShortestPathSearch::new(&graph).compute(
            1,
            4,
            &Constraints {
                delay: Some(1),
                ..Constraints::default()
            },
        );
        assert_eq!(path.status, ComputationStatus::NoPath);
    }

    #[test]
    fn delay_ceiling_reroutes_even_at_higher_metric() {
        // Cheap branch is slow (delay 10 per hop), expensive branch fast.
        let mut graph = crate::graph::TopologyGraph::new();
        for id in 1..=4 {
            graph.add_vertex(crate::algo::fixtures::vertex(id));
        }
        crate::algo::fixtures::add_link(&mut graph, 10, 1, 2, 1, 10);
        crate::algo::fixtures::add_link(&mut graph, 20, 2, 4, 1, 10);
        crate::algo::fixtures::add_link(&mut graph, 30, 1, 3, 5, 1);
        crate::algo::fixtures::add_link(&mut graph, 40, 3, 4, 5, 1);

        let path = ConstrainedShortestPathSearch::new(&graph).compute(
            1,
            4,
            &Constraints {
                delay: Some(5),
                ..Constraints::default()
            },
        );
        assert_eq!(path.status, ComputationStatus::Completed);
        assert_eq!(path.te_metric, 10);
        assert_eq!(path.delay, 2);
    }

    #[test]
    fn exclude_route_reroutes_around_matching_hops() {
        let graph = diamond();
        let path = ConstrainedShortestPathSearch::new(&graph).compute(
            1,
            4,
            &Constraints {
                exclude_route: vec![IpAddr::V4(Ipv4Addr::new(192, 0, 2, 2))],
                ..Constraints::default()
            },
        );
        assert_eq!(path.status, ComputationStatus::Completed);
        assert_eq!(path.te_metric, 10);
        assert_eq!(
            path.hops,
            vec![
                PathHop::Ipv4(Ipv4Addr::new(192, 0, 2, 3)),
                PathHop::Ipv4(Ipv4Addr::new(192, 0, 2, 4)),
            ]
        );
    }

    #[test]
    fn equal_endpoints_fail() {
        let graph = diamond();
        let path = ConstrainedShortestPathSearch::new(&graph).compute(2, 2, &Constraints::default());
        assert_eq!(path.status, ComputationStatus::Failed);
    }
}
