use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::graph::VertexId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressFamily {
    #[default]
    Ipv4,
    Ipv6,
    SrIpv4,
    SrIpv6,
}

impl AddressFamily {
    pub fn is_segment_routing(self) -> bool {
        matches!(self, Self::SrIpv4 | Self::SrIpv6)
    }

    pub fn is_ipv4(self) -> bool {
        matches!(self, Self::Ipv4 | Self::SrIpv4)
    }
}

/// Ceilings are end-to-end accumulated values except loss, which is
/// checked per edge. Empty constraints admit every edge of the family.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub address_family: AddressFamily,
    pub te_metric: Option<u32>,
    pub delay: Option<u32>,
    pub loss: Option<u32>,
    pub bandwidth: Option<u64>,
    pub class_type: Option<u8>,
    pub admin_group: Option<u32>,
    pub path_diversity: bool,
    pub exclude_route: Vec<IpAddr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputationStatus {
    Completed,
    NoPath,
    Failed,
}

/// One element of a path description, consistent with the requested
/// address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathHop {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    SrLabel(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedPath {
    pub source: VertexId,
    pub destination: VertexId,
    pub status: ComputationStatus,
    pub hops: Vec<PathHop>,
    pub te_metric: i64,
    pub delay: i64,
}

impl ComputedPath {
    pub(crate) fn failed(source: VertexId, destination: VertexId) -> Self {
        Self {
            source,
            destination,
            status: ComputationStatus::Failed,
            hops: Vec::new(),
            te_metric: 0,
            delay: 0,
        }
    }

    pub(crate) fn no_path(source: VertexId, destination: VertexId) -> Self {
        Self {
            source,
            destination,
            status: ComputationStatus::NoPath,
            hops: Vec::new(),
            te_metric: 0,
            delay: 0,
        }
    }
}
