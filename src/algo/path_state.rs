use crate::graph::{EdgeId, VertexId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    NotStarted,
    InProgress,
    Selected,
    Processed,
    Dominated,
    Active,
    Completed,
    NoPath,
    Failed,
}

/// Working record for one candidate path ending at `vertex`.
#[derive(Debug, Clone)]
pub struct PathState {
    pub vertex: VertexId,
    /// Accumulated TE metric, signed: diverted reverse edges subtract.
    pub cost: i64,
    pub delay: i64,
    /// Queue key: the cost for SPF/CSPF, floor(100 * length) for SAMCRA.
    pub key: i64,
    /// Normalized length, SAMCRA only.
    pub path_length: f32,
    pub predecessor: Option<VertexId>,
    pub status: PathStatus,
    /// Edge sequence from the source.
    pub edges: Vec<EdgeId>,
}

impl PathState {
    /// Undiscovered state: any real candidate improves on it.
    pub fn new(vertex: VertexId) -> Self {
        Self {
            vertex,
            cost: i64::MAX,
            delay: 0,
            key: i64::MAX,
            path_length: 0.0,
            predecessor: None,
            status: PathStatus::NotStarted,
            edges: Vec::new(),
        }
    }
}
