use std::collections::BTreeMap;
use std::net::IpAddr;

use tracing::warn;

use crate::graph::{Edge, EdgeId, TopologyGraph, VertexId};

use super::path_state::{PathState, PathStatus};
use super::queue::CandidateQueue;
use super::types::{AddressFamily, ComputationStatus, ComputedPath, Constraints, PathHop};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetupError {
    EqualEndpoints,
    UnknownSource,
    UnknownDestination,
}

/// Per-invocation working state shared by the three search algorithms.
/// Created per `compute` call and discarded.
pub(crate) struct SearchSession<'g> {
    pub graph: &'g TopologyGraph,
    pub constraints: Constraints,
    pub source: VertexId,
    pub destination: VertexId,
    pub states: BTreeMap<VertexId, PathState>,
    pub queue: CandidateQueue,
}

impl<'g> SearchSession<'g> {
    pub fn initialize(
        graph: &'g TopologyGraph,
        source: VertexId,
        destination: VertexId,
        constraints: &Constraints,
    ) -> Result<Self, SetupError> {
        if source == destination {
            warn!("path request rejected: source and destination are equal ({source})");
            return Err(SetupError::EqualEndpoints);
        }
        if graph.vertex(source).is_none() {
            warn!("path request rejected: unknown source vertex {source}");
            return Err(SetupError::UnknownSource);
        }
        if graph.vertex(destination).is_none() {
            warn!("path request rejected: unknown destination vertex {destination}");
            return Err(SetupError::UnknownDestination);
        }

        let mut source_state = PathState::new(source);
        source_state.cost = 0;
        source_state.key = 0;
        source_state.status = PathStatus::InProgress;

        let mut destination_state = PathState::new(destination);
        destination_state.status = PathStatus::NoPath;

        let mut states = BTreeMap::new();
        states.insert(source, source_state);
        states.insert(destination, destination_state);

        let mut queue = CandidateQueue::new();
        queue.push(source, 0, 0);

        Ok(Self {
            graph,
            constraints: constraints.clone(),
            source,
            destination,
            states,
            queue,
        })
    }

    /// True when the edge must be pruned from relaxation.
    pub fn prune_edge(&self, edge: &Edge, state: &PathState) -> bool {
        let Some(attrs) = edge.attributes.as_ref() else {
            return true;
        };

        match self.constraints.address_family {
            AddressFamily::Ipv4 => {
                if attrs.remote_address.is_none() {
                    return true;
                }
            }
            AddressFamily::Ipv6 => {
                if attrs.remote_address6.is_none() {
                    return true;
                }
            }
            AddressFamily::SrIpv4 | AddressFamily::SrIpv6 => {
                if self
                    .node_sid(edge.destination, self.constraints.address_family)
                    .is_none()
                {
                    return true;
                }
            }
        }

        if let Some(admin_group) = self.constraints.admin_group {
            if attrs.admin_group != admin_group {
                return true;
            }
        }

        if self.excluded(edge) {
            return true;
        }

        if self.constraints.path_diversity && edge.diverted {
            return true;
        }

        if let Some(max_te) = self.constraints.te_metric {
            if i64::from(attrs.te_metric) + state.cost > i64::from(max_te) {
                return true;
            }
        }

        if let Some(max_delay) = self.constraints.delay {
            if i64::from(attrs.delay) + state.delay > i64::from(max_delay) {
                return true;
            }
        }

        if let Some(max_loss) = self.constraints.loss {
            if attrs.loss > max_loss {
                return true;
            }
        }

        if let Some(floor) = self.constraints.bandwidth {
            let class_type = usize::from(self.constraints.class_type.unwrap_or(0));
            let unreserved = attrs
                .unreserved_bandwidth
                .get(class_type)
                .copied()
                .unwrap_or(0);
            if unreserved < floor
                || attrs.max_link_bandwidth < floor
                || attrs.max_resv_bandwidth < floor
            {
                return true;
            }
        }

        false
    }

    fn excluded(&self, edge: &Edge) -> bool {
        if self.constraints.exclude_route.is_empty() {
            return false;
        }
        let Some(attrs) = edge.attributes.as_ref() else {
            return false;
        };

        let ipv4 = self.constraints.address_family.is_ipv4();
        for address in &self.constraints.exclude_route {
            let hit = match (address, ipv4) {
                (IpAddr::V4(excluded), true) => attrs.remote_address == Some(*excluded),
                (IpAddr::V6(excluded), false) => attrs.remote_address6 == Some(*excluded),
                _ => false,
            };
            if hit {
                return true;
            }
            let prefix_hit = self
                .graph
                .vertex(edge.destination)
                .map(|vertex| {
                    vertex
                        .prefixes
                        .iter()
                        .any(|prefix| prefix.address == *address)
                })
                .unwrap_or(false);
            if prefix_hit {
                return true;
            }
        }
        false
    }

    /// SRGB lower bound plus the advertised prefix-SID index.
    pub fn node_sid(&self, vertex: VertexId, family: AddressFamily) -> Option<u32> {
        let vertex = self.graph.vertex(vertex)?;
        let srgb = vertex.srgb?;
        vertex.prefixes.iter().find_map(|prefix| {
            let index = prefix.node_sid?;
            let family_match = if family.is_ipv4() {
                prefix.address.is_ipv4()
            } else {
                prefix.address.is_ipv6()
            };
            family_match.then_some(srgb.lower_bound + index)
        })
    }

    /// Edges with missing data are skipped, not fatal.
    pub fn path_description(&self, edges: &[EdgeId]) -> Vec<PathHop> {
        let family = self.constraints.address_family;
        let mut hops = Vec::with_capacity(edges.len());
        for edge_id in edges {
            let Some(edge) = self.graph.edge(*edge_id) else {
                continue;
            };
            let Some(attrs) = edge.attributes.as_ref() else {
                continue;
            };
            let hop = match family {
                AddressFamily::Ipv4 => attrs.remote_address.map(PathHop::Ipv4),
                AddressFamily::Ipv6 => attrs.remote_address6.map(PathHop::Ipv6),
                AddressFamily::SrIpv4 | AddressFamily::SrIpv6 => {
                    self.node_sid(edge.destination, family).map(PathHop::SrLabel)
                }
            };
            let Some(hop) = hop else {
                continue;
            };
            hops.push(hop);
        }
        hops
    }

    pub fn completed_path(&self, state: &PathState) -> ComputedPath {
        ComputedPath {
            source: self.source,
            destination: self.destination,
            status: ComputationStatus::Completed,
            hops: self.path_description(&state.edges),
            te_metric: state.cost,
            delay: state.delay,
        }
    }
}
