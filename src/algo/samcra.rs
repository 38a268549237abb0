use std::collections::BTreeMap;

use tracing::debug;

use crate::graph::{Edge, TopologyGraph, VertexId};

use super::base::SearchSession;
use super::path_state::{PathState, PathStatus};
use super::types::{ComputedPath, Constraints};

/// Self-adaptive multi-constraint search (SAMCRA). A vertex may hold
/// several non-dominated candidate paths; a path length of at most 1.0
/// means every active ceiling is respected end to end.
pub struct MultiConstraintSearch<'g> {
    graph: &'g TopologyGraph,
}

#[derive(Debug, Default)]
struct AlternateSet {
    live: usize,
    current: Option<usize>,
    alternates: Vec<PathState>,
}

impl AlternateSet {
    fn current_state(&self) -> Option<&PathState> {
        self.current.and_then(|slot| self.alternates.get(slot))
    }
}

/// Returns (candidate_dominated, alternate_dominated) over the active
/// dimensions only; with no active dimension neither holds.
fn dominance(
    cost: i64,
    delay: i64,
    alternate: &PathState,
    te_active: bool,
    delay_active: bool,
) -> (bool, bool) {
    if !te_active && !delay_active {
        return (false, false);
    }
    let mut candidate_dominated = true;
    let mut alternate_dominated = true;
    if te_active {
        if cost >= alternate.cost {
            alternate_dominated = false;
        } else {
            candidate_dominated = false;
        }
    }
    if delay_active {
        if delay >= alternate.delay {
            alternate_dominated = false;
        } else {
            candidate_dominated = false;
        }
    }
    (candidate_dominated, alternate_dominated)
}

fn path_length(cost: i64, delay: i64, te_ceiling: Option<u32>, delay_ceiling: Option<u32>) -> f32 {
    let mut length = 1.0_f32;
    let mut te_length = 0.0_f32;
    if let Some(ceiling) = te_ceiling.filter(|ceiling| *ceiling > 0) {
        te_length = cost as f32 / ceiling as f32;
        length = te_length;
    }
    if let Some(ceiling) = delay_ceiling.filter(|ceiling| *ceiling > 0) {
        let delay_length = delay as f32 / ceiling as f32;
        if delay_length > te_length {
            length = delay_length;
        }
    }
    length
}

impl<'g> MultiConstraintSearch<'g> {
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

        let mut alternates: BTreeMap<VertexId, AlternateSet> = BTreeMap::new();
        if let Some(mut source_state) = session.states.get(&source).cloned() {
            source_state.status = PathStatus::Selected;
            alternates.insert(
                source,
                AlternateSet {
                    live: 1,
                    current: Some(0),
                    alternates: vec![source_state],
                },
            );
        }
        alternates.insert(destination, AlternateSet::default());

        let mut best: Option<ComputedPath> = None;
        let mut best_length = 1.0_f32;

        loop {
            let sets = &alternates;
            let popped = session.queue.pop_min(|vertex, slot, key| {
                let Some(set) = sets.get(&vertex) else {
                    return true;
                };
                if set.current != Some(slot) {
                    return true;
                }
                match set.alternates.get(slot) {
                    Some(state) => state.status != PathStatus::Selected || state.key != key,
                    None => true,
                }
            });
            let Some((vertex, slot, _)) = popped else {
                break;
            };
            let Some(current) = alternates
                .get(&vertex)
                .and_then(|set| set.alternates.get(slot))
                .cloned()
            else {
                continue;
            };

            for edge in self.graph.outgoing_edges(vertex) {
                if session.prune_edge(edge, &current) {
                    continue;
                }
                let reached_destination =
                    self.relax(&mut session, &mut alternates, edge, &current);
                if !reached_destination {
                    continue;
                }

                // Keep only the shortest feasible path seen at the
                // destination.
                let Some(dest_current) = alternates
                    .get(&destination)
                    .and_then(AlternateSet::current_state)
                else {
                    continue;
                };
                if dest_current.path_length <= best_length {
                    best_length = dest_current.path_length;
                    debug!(
                        "samcra: {source} -> {destination} candidate length {} cost {} delay {}",
                        dest_current.path_length, dest_current.cost, dest_current.delay
                    );
                    best = Some(session.completed_path(dest_current));
                }
            }

            // Re-inject the vertex with its shortest remaining active
            // alternate. The source has exactly one state.
            if vertex != source {
                if let Some(set) = alternates.get_mut(&vertex) {
                    set.live = set.live.saturating_sub(1);
                    debug!(
                        "samcra: vertex {vertex} processed, {} live alternates remain",
                        set.live
                    );
                    let mut reselected: Option<usize> = None;
                    let mut shortest = f32::INFINITY;
                    for (idx, alternate) in set.alternates.iter_mut().enumerate() {
                        match alternate.status {
                            PathStatus::Selected => alternate.status = PathStatus::Processed,
                            PathStatus::Active if alternate.path_length < shortest => {
                                shortest = alternate.path_length;
                                reselected = Some(idx);
                            }
                            _ => {}
                        }
                    }
                    match reselected {
                        Some(idx) => {
                            if let Some(state) = set.alternates.get_mut(idx) {
                                state.status = PathStatus::Selected;
                                session.queue.push(vertex, idx, state.key);
                            }
                            set.current = Some(idx);
                        }
                        None => set.current = None,
                    }
                }
            }
        }

        best.unwrap_or_else(|| ComputedPath::no_path(source, destination))
    }

    /// Returns true when the neighbor is the destination and the new
    /// state was recorded.
    fn relax(
        &self,
        session: &mut SearchSession<'_>,
        alternates: &mut BTreeMap<VertexId, AlternateSet>,
        edge: &Edge,
        current: &PathState,
    ) -> bool {
        let neighbor = edge.destination;
        if current.predecessor == Some(neighbor) {
            return false;
        }
        let Some(attrs) = edge.attributes.as_ref() else {
            return false;
        };

        let te_ceiling = session.constraints.te_metric;
        let delay_ceiling = session.constraints.delay;
        let te_active = te_ceiling.is_some();
        let delay_active = delay_ceiling.is_some();

        let te_cost = current.cost + i64::from(attrs.te_metric);
        let delay_cost = current.delay + i64::from(attrs.delay);

        let set = alternates.entry(neighbor).or_default();
        for alternate in set.alternates.iter_mut() {
            if alternate.status == PathStatus::Dominated {
                continue;
            }
            let (candidate_dominated, alternate_dominated) =
                dominance(te_cost, delay_cost, alternate, te_active, delay_active);
            if candidate_dominated {
                return false;
            }
            if alternate_dominated {
                alternate.status = PathStatus::Dominated;
                set.live = set.live.saturating_sub(1);
            }
        }

        let length = path_length(te_cost, delay_cost, te_ceiling, delay_ceiling);
        let mut state = PathState::new(neighbor);
        state.cost = te_cost;
        state.delay = delay_cost;
        state.path_length = length;
        state.key = (100.0 * length) as i64;
        state.predecessor = Some(current.vertex);
        state.status = PathStatus::Active;
        state.edges = current.edges.clone();
        state.edges.push(edge.id);

        set.alternates.push(state);
        set.live += 1;
        let slot = set.alternates.len() - 1;

        let promote = match set.current_state() {
            None => true,
            Some(selected) => length < selected.path_length,
        };
        if promote {
            for alternate in set.alternates.iter_mut() {
                if alternate.status == PathStatus::Selected {
                    alternate.status = PathStatus::Active;
                }
            }
            if let Some(state) = set.alternates.get_mut(slot) {
                state.status = PathStatus::Selected;
                session.queue.push(neighbor, slot, state.key);
            }
            set.current = Some(slot);
        }

        neighbor == session.destination
    }
}
