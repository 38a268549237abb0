use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::topology::TopologyGraph;
use super::types::{Edge, EdgeAttributes, Prefix, SrgbRange, Vertex, CLASS_TYPE_COUNT};

#[derive(Debug, Deserialize)]
struct RawSrgb {
    lower_bound: u32,
    range_size: u32,
}

#[derive(Debug, Deserialize)]
struct RawPrefix {
    address: String,
    length: u8,
    node_sid: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawVertex {
    id: u64,
    name: Option<String>,
    srgb: Option<RawSrgb>,
    #[serde(default)]
    prefixes: Vec<RawPrefix>,
}

#[derive(Debug, Deserialize, Default)]
struct RawEdgeAttributes {
    te_metric: Option<u32>,
    delay: Option<u32>,
    loss: Option<u32>,
    admin_group: Option<u32>,
    max_link_bandwidth: Option<u64>,
    max_resv_bandwidth: Option<u64>,
    #[serde(default)]
    unreserved_bandwidth: Vec<u64>,
    remote_address: Option<String>,
    remote_address6: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    id: u64,
    source: u64,
    destination: u64,
    attributes: Option<RawEdgeAttributes>,
    reverse: Option<u64>,
    #[serde(default)]
    diverted: bool,
}

#[derive(Debug, Deserialize)]
struct RawTopology {
    #[serde(default)]
    vertices: Vec<RawVertex>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

pub fn load_topology(path: &Path) -> Result<TopologyGraph> {
    let raw_text = fs::read_to_string(path)
        .with_context(|| format!("failed to read topology file {}", path.display()))?;
    parse_topology(&raw_text)
}

pub fn parse_topology(raw_text: &str) -> Result<TopologyGraph> {
    let raw: RawTopology =
        serde_yaml::from_str(raw_text).context("failed to parse topology yaml")?;

    let mut graph = TopologyGraph::new();
    for raw_vertex in raw.vertices {
        graph.add_vertex(build_vertex(raw_vertex)?);
    }
    for raw_edge in raw.edges {
        let edge = build_edge(raw_edge)?;
        if graph.vertex(edge.source).is_none() {
            bail!("edge {} references unknown source vertex {}", edge.id, edge.source);
        }
        if graph.vertex(edge.destination).is_none() {
            bail!(
                "edge {} references unknown destination vertex {}",
                edge.id,
                edge.destination
            );
        }
        graph.add_edge(edge);
    }
    Ok(graph)
}

fn build_vertex(raw: RawVertex) -> Result<Vertex> {
    let mut prefixes = Vec::with_capacity(raw.prefixes.len());
    for raw_prefix in raw.prefixes {
        let address: IpAddr = raw_prefix
            .address
            .parse()
            .with_context(|| format!("invalid prefix address {}", raw_prefix.address))?;
        prefixes.push(Prefix {
            address,
            length: raw_prefix.length,
            node_sid: raw_prefix.node_sid,
        });
    }

    Ok(Vertex {
        name: raw.name.unwrap_or_else(|| format!("vertex-{}", raw.id)),
        id: raw.id,
        srgb: raw.srgb.map(|srgb| SrgbRange {
            lower_bound: srgb.lower_bound,
            range_size: srgb.range_size,
        }),
        prefixes,
    })
}

fn build_edge(raw: RawEdge) -> Result<Edge> {
    let attributes = match raw.attributes {
        Some(attrs) => Some(build_edge_attributes(raw.id, attrs)?),
        None => None,
    };

    Ok(Edge {
        id: raw.id,
        source: raw.source,
        destination: raw.destination,
        attributes,
        reverse: raw.reverse,
        diverted: raw.diverted,
    })
}

fn build_edge_attributes(edge_id: u64, raw: RawEdgeAttributes) -> Result<EdgeAttributes> {
    let remote_address = raw
        .remote_address
        .map(|text| {
            text.parse::<Ipv4Addr>()
                .with_context(|| format!("edge {edge_id}: invalid remote address {text}"))
        })
        .transpose()?;
    let remote_address6 = raw
        .remote_address6
        .map(|text| {
            text.parse::<Ipv6Addr>()
                .with_context(|| format!("edge {edge_id}: invalid remote address6 {text}"))
        })
        .transpose()?;

    let mut unreserved_bandwidth = [0u64; CLASS_TYPE_COUNT];
    for (slot, value) in unreserved_bandwidth
        .iter_mut()
        .zip(raw.unreserved_bandwidth.iter())
    {
        *slot = *value;
    }

    Ok(EdgeAttributes {
        te_metric: raw.te_metric.unwrap_or(0),
        delay: raw.delay.unwrap_or(0),
        loss: raw.loss.unwrap_or(0),
        admin_group: raw.admin_group.unwrap_or(0),
        max_link_bandwidth: raw.max_link_bandwidth.unwrap_or(0),
        max_resv_bandwidth: raw.max_resv_bandwidth.unwrap_or(0),
        unreserved_bandwidth,
        remote_address,
        remote_address6,
    })
}
