//! Read query parameter and result types.

use crate::{EdgeId, LabelId, NodeId, PropKeyId, RelTypeId, TagId};
use crate::graph::schema::VectorF32;

/// Edge endpoint direction relative to the queried node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Out,
    In,
    Both,
}

/// One adjacency row: one per edge endpoint walked. `Both` queries emit
/// the Out sweep followed by the In sweep without de-duplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjacency {
    pub neighbor_id: NodeId,
    pub edge_id: EdgeId,
    pub type_id: RelTypeId,
    pub direction: Direction,
}

/// List adjacency rows around a node. `limit == 0` means no limit.
#[derive(Debug, Clone, Copy)]
pub struct ListAdjacency {
    pub node: NodeId,
    pub direction: Direction,
    pub limit: u32,
}

/// Neighbor ids around a node, with optional relationship-type and
/// neighbor-label filters. `Both` de-duplicates by neighbor and the In
/// sweep runs only while the limit is unexhausted. `limit == 0` means no
/// limit.
#[derive(Debug, Clone)]
pub struct Neighbors {
    pub node: NodeId,
    pub direction: Direction,
    pub limit: u32,
    /// Keep only edges whose type is in this list; empty keeps all.
    pub rel_type_in: Vec<RelTypeId>,
    /// Keep only neighbors carrying all of these labels; empty keeps all.
    pub neighbor_has_labels: Vec<LabelId>,
}

/// Fetch properties of a node. An empty `key_ids` means all properties,
/// hot then cold.
#[derive(Debug, Clone, Default)]
pub struct GetNodeProps {
    pub id: NodeId,
    pub key_ids: Vec<PropKeyId>,
}

/// Fetch vectors of a node. An empty `tag_ids` means all vectors.
#[derive(Debug, Clone, Default)]
pub struct GetVectors {
    pub id: NodeId,
    pub tag_ids: Vec<TagId>,
}

/// Fetch properties of an edge. An empty `key_ids` means all properties.
#[derive(Debug, Clone, Default)]
pub struct GetEdgeProps {
    pub edge_id: EdgeId,
    pub key_ids: Vec<PropKeyId>,
}

/// Scan node ids carrying a label, ascending. `limit == 0` means no limit.
#[derive(Debug, Clone, Copy)]
pub struct ScanNodesByLabel {
    pub label_id: LabelId,
    pub limit: u32,
}

/// Count adjacency rows around a node.
#[derive(Debug, Clone, Copy)]
pub struct Degree {
    pub node: NodeId,
    pub direction: Direction,
}

/// Exact k-nearest-neighbor query over one vector tag, by cosine
/// similarity. The query byte length must decode to exactly the tag's
/// pinned dim.
#[derive(Debug, Clone)]
pub struct Knn {
    pub tag_id: TagId,
    pub query: VectorF32,
    pub k: u32,
}

/// One KNN hit. Results are emitted in descending score order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnnHit {
    pub id: NodeId,
    pub score: f32,
}
