mod loader;
mod topology;
mod types;

pub use loader::{load_topology, parse_topology};
pub use topology::TopologyGraph;
pub use types::{
    Edge, EdgeAttributes, EdgeId, Prefix, SrgbRange, Vertex, VertexId, CLASS_TYPE_COUNT,
};
