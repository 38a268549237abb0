use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::graph::{
    Edge, EdgeAttributes, Prefix, SrgbRange, TopologyGraph, Vertex, CLASS_TYPE_COUNT,
};

pub(crate) fn vertex(id: u64) -> Vertex {
    Vertex {
        id,
        name: format!("v{id}"),
        srgb: Some(SrgbRange {
            lower_bound: 16000,
            range_size: 1000,
        }),
        prefixes: vec![
            Prefix {
                address: IpAddr::V4(Ipv4Addr::new(10, 0, 0, id as u8)),
                length: 32,
                node_sid: Some(id as u32),
            },
            Prefix {
                address: IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, id as u16)),
                length: 128,
                node_sid: Some(100 + id as u32),
            },
        ],
    }
}

pub(crate) fn attributes(te_metric: u32, delay: u32, remote: u8) -> EdgeAttributes {
    EdgeAttributes {
        te_metric,
        delay,
        loss: 0,
        admin_group: 0,
        max_link_bandwidth: 10_000,
        max_resv_bandwidth: 10_000,
        unreserved_bandwidth: [10_000; CLASS_TYPE_COUNT],
        remote_address: Some(Ipv4Addr::new(192, 0, 2, remote)),
        remote_address6: Some(Ipv6Addr::new(0x2001, 0xdb8, 0, 1, 0, 0, 0, remote as u16)),
    }
}

pub(crate) fn edge(id: u64, source: u64, destination: u64, te_metric: u32, delay: u32) -> Edge {
    Edge {
        id,
        source,
        destination,
        attributes: Some(attributes(te_metric, delay, destination as u8)),
        reverse: None,
        diverted: false,
    }
}

/// Bidirectional link: forward and backward edges wired as reverse pairs.
pub(crate) fn add_link(
    graph: &mut TopologyGraph,
    forward_id: u64,
    a: u64,
    b: u64,
    te_metric: u32,
    delay: u32,
) {
    let backward_id = forward_id + 1;
    let mut forward = edge(forward_id, a, b, te_metric, delay);
    forward.reverse = Some(backward_id);
    let mut backward = edge(backward_id, b, a, te_metric, delay);
    backward.reverse = Some(forward_id);
    graph.add_edge(forward);
    graph.add_edge(backward);
}

/// The diamond used across the algorithm tests: 1-2-4 cheap (metric and
/// delay 1 per hop), 1-3-4 expensive (5 per hop).
pub(crate) fn diamond() -> TopologyGraph {
    let mut graph = TopologyGraph::new();
    for id in 1..=4 {
        graph.add_vertex(vertex(id));
    }
    add_link(&mut graph, 10, 1, 2, 1, 1);
    add_link(&mut graph, 20, 2, 4, 1, 1);
    add_link(&mut graph, 30, 1, 3, 5, 5);
    add_link(&mut graph, 40, 3, 4, 5, 5);
    graph
}
