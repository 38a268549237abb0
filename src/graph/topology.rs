use std::collections::BTreeMap;

use super::types::{Edge, EdgeId, Vertex, VertexId};

/// Read-only topology snapshot queried by the path computations. Only
/// the per-edge diversion flag may change between computations.
#[derive(Debug, Default, Clone)]
pub struct TopologyGraph {
    vertices: BTreeMap<VertexId, Vertex>,
    edges: BTreeMap<EdgeId, Edge>,
    outgoing: BTreeMap<VertexId, Vec<EdgeId>>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: Vertex) {
        self.outgoing.entry(vertex.id).or_default();
        self.vertices.insert(vertex.id, vertex);
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.outgoing.entry(edge.source).or_default().push(edge.id);
        self.edges.insert(edge.id, edge);
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn outgoing_edges(&self, id: VertexId) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys().copied()
    }

    /// Marks an edge as used by a previously computed path. Returns
    /// false for unknown edges.
    pub fn set_diverted(&mut self, id: EdgeId, diverted: bool) -> bool {
        let Some(edge) = self.edges.get_mut(&id) else {
            return false;
        };
        edge.diverted = diverted;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(id: u64) -> Vertex {
        Vertex {
            id,
            name: format!("v{id}"),
            srgb: None,
            prefixes: Vec::new(),
        }
    }

    fn edge(id: u64, source: u64, destination: u64) -> Edge {
        Edge {
            id,
            source,
            destination,
            attributes: None,
            reverse: None,
            diverted: false,
        }
    }

    #[test]
    fn outgoing_edges_follow_insertion_order() {
        let mut graph = TopologyGraph::new();
        graph.add_vertex(vertex(1));
        graph.add_vertex(vertex(2));
        graph.add_vertex(vertex(3));
        graph.add_edge(edge(10, 1, 2));
        graph.add_edge(edge(11, 1, 3));

        let ids: Vec<u64> = graph.outgoing_edges(1).map(|edge| edge.id).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(graph.outgoing_edges(2).count(), 0);
    }

    #[test]
    fn set_diverted_flips_known_edges_only() {
        let mut graph = TopologyGraph::new();
        graph.add_vertex(vertex(1));
        graph.add_vertex(vertex(2));
        graph.add_edge(edge(10, 1, 2));

        assert!(graph.set_diverted(10, true));
        assert!(graph.edge(10).is_some_and(|edge| edge.diverted));
        assert!(!graph.set_diverted(99, true));
    }
}
