//! Write operation parameter types and the batch mutation enum.
//!
//! Label, type, and property-key fields carry interned u32 ids; adapters
//! translate wire names through the interner before constructing these.

use crate::codec::Property;
use crate::graph::schema::{EdgeRef, TaggedVector, VectorF32};
use crate::{EdgeId, LabelId, NodeId, PropKeyId, RelTypeId, TagId};

/// Create a node with labels, inline hot properties, out-of-line cold
/// properties, and tagged vectors. Labels are sorted and de-duplicated
/// before the header is written.
#[derive(Debug, Clone, Default)]
pub struct CreateNode {
    pub labels: Vec<LabelId>,
    pub hot_props: Vec<Property>,
    pub cold_props: Vec<Property>,
    pub vectors: Vec<TaggedVector>,
}

/// Upsert node properties. Unset applies before set, so that
/// `unset(k) + set(k)` yields the set value.
#[derive(Debug, Clone, Default)]
pub struct UpsertNodeProps {
    pub id: NodeId,
    pub set_hot: Vec<Property>,
    pub set_cold: Vec<Property>,
    pub unset_keys: Vec<PropKeyId>,
}

/// Merge label changes into a node's sorted unique label set.
#[derive(Debug, Clone, Default)]
pub struct SetNodeLabels {
    pub id: NodeId,
    pub add: Vec<LabelId>,
    pub remove: Vec<LabelId>,
}

/// Upsert one tagged vector on a node. The byte length must be a multiple
/// of 4 and, once the tag has a pinned dim, match it exactly.
#[derive(Debug, Clone)]
pub struct UpsertVector {
    pub id: NodeId,
    pub tag_id: TagId,
    pub vector: VectorF32,
}

/// Delete one tagged vector. Absent is success.
#[derive(Debug, Clone, Copy)]
pub struct DeleteVector {
    pub id: NodeId,
    pub tag_id: TagId,
}

/// Create a typed directed edge with properties.
#[derive(Debug, Clone, Default)]
pub struct AddEdge {
    pub src: NodeId,
    pub dst: NodeId,
    pub type_id: RelTypeId,
    pub props: Vec<Property>,
}

/// Upsert edge properties; same unset-before-set rule as nodes.
#[derive(Debug, Clone, Default)]
pub struct UpdateEdgeProps {
    pub edge_id: EdgeId,
    pub set: Vec<Property>,
    pub unset_keys: Vec<PropKeyId>,
}

/// One operation in a write batch.
///
/// A batch is an ordered list of these; each dispatches to the matching
/// store method in its own transaction. The batch as a whole is not
/// atomic: a failing op aborts only itself and earlier ops stay committed.
#[derive(Debug, Clone)]
pub enum Mutation {
    CreateNode(CreateNode),
    UpsertNodeProps(UpsertNodeProps),
    SetNodeLabels(SetNodeLabels),
    UpsertVector(UpsertVector),
    DeleteVector(DeleteVector),
    AddEdge(AddEdge),
    UpdateEdgeProps(UpdateEdgeProps),
}

impl From<CreateNode> for Mutation {
    fn from(m: CreateNode) -> Self {
        Mutation::CreateNode(m)
    }
}

impl From<UpsertNodeProps> for Mutation {
    fn from(m: UpsertNodeProps) -> Self {
        Mutation::UpsertNodeProps(m)
    }
}

impl From<SetNodeLabels> for Mutation {
    fn from(m: SetNodeLabels) -> Self {
        Mutation::SetNodeLabels(m)
    }
}

impl From<UpsertVector> for Mutation {
    fn from(m: UpsertVector) -> Self {
        Mutation::UpsertVector(m)
    }
}

impl From<DeleteVector> for Mutation {
    fn from(m: DeleteVector) -> Self {
        Mutation::DeleteVector(m)
    }
}

impl From<AddEdge> for Mutation {
    fn from(m: AddEdge) -> Self {
        Mutation::AddEdge(m)
    }
}

impl From<UpdateEdgeProps> for Mutation {
    fn from(m: UpdateEdgeProps) -> Self {
        Mutation::UpdateEdgeProps(m)
    }
}

/// What a committed batch operation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The op committed and returned nothing.
    Applied,
    /// A `CreateNode` op committed; the allocated node id.
    NodeCreated(NodeId),
    /// An `AddEdge` op committed; the allocated edge identity.
    EdgeAdded(EdgeRef),
}
