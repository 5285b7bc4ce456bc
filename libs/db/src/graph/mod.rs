//! Graph module: the store facade over the environment.
//!
//! ## Module structure
//!
//! - `mod.rs` - the [`Store`] facade, one transaction per operation
//! - `schema.rs` - column families and composite key codecs
//! - `mutation.rs` - write parameter types and the batch enum
//! - `query.rs` - read parameter and result types
//! - `interner.rs` - name ↔ id dictionaries
//! - `ops/` - operation bodies executed inside transactions

use std::sync::Arc;

pub mod interner;
pub mod mutation;
pub mod query;
pub(crate) mod schema;

mod ops;


pub use interner::Dict;
pub use mutation::{
    AddEdge, BatchOutcome, CreateNode, DeleteVector, Mutation, SetNodeLabels, UpdateEdgeProps,
    UpsertNodeProps, UpsertVector,
};
pub use query::{
    Adjacency, Degree, Direction, GetEdgeProps, GetNodeProps, GetVectors, Knn, KnnHit,
    ListAdjacency, Neighbors, ScanNodesByLabel,
};
pub use schema::{EdgeRef, TaggedVector, VectorF32};

use crate::codec::{NodeHeader, Property, Value};
use crate::error::Result;
use crate::storage::Environment;
use crate::{EdgeId, LabelId, NodeId, PropKeyId, RelTypeId, TagId, TextId};

/// The storage engine and query layer.
///
/// Every method runs in its own transaction: writes open a write
/// transaction and commit on success; reads observe one consistent
/// snapshot. The store does not schedule — callers must keep to one
/// writer at a time, as the environment requires.
#[derive(Clone)]
pub struct Store {
    env: Arc<Environment>,
}

impl Store {
    pub fn new(env: Arc<Environment>) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Create a node; returns the allocated id and the stored header.
    pub fn create_node(&self, params: &CreateNode) -> Result<(NodeId, NodeHeader)> {
        let txn = self.env.write_txn();
        let created = ops::node::create_node(&txn, params)?;
        txn.commit()?;
        Ok(created)
    }

    pub fn upsert_node_props(&self, params: &UpsertNodeProps) -> Result<()> {
        let txn = self.env.write_txn();
        ops::node::upsert_node_props(&txn, params)?;
        txn.commit()
    }

    pub fn set_node_labels(&self, params: &SetNodeLabels) -> Result<()> {
        let txn = self.env.write_txn();
        ops::node::set_node_labels(&txn, params)?;
        txn.commit()
    }

    pub fn upsert_vector(&self, params: &UpsertVector) -> Result<()> {
        let txn = self.env.write_txn();
        ops::vector::put_vector(&txn, params.id, params.tag_id, &params.vector)?;
        txn.commit()
    }

    /// Delete one tagged vector. Absent is success.
    pub fn delete_vector(&self, params: &DeleteVector) -> Result<()> {
        let txn = self.env.write_txn();
        ops::vector::delete_vector(&txn, params.id, params.tag_id)?;
        txn.commit()
    }

    pub fn add_edge(&self, params: &AddEdge) -> Result<EdgeRef> {
        let txn = self.env.write_txn();
        let edge = ops::edge::add_edge(&txn, params)?;
        txn.commit()?;
        Ok(edge)
    }

    pub fn update_edge_props(&self, params: &UpdateEdgeProps) -> Result<()> {
        let txn = self.env.write_txn();
        ops::edge::update_edge_props(&txn, params)?;
        txn.commit()
    }

    /// Delete a node, cascading to its props, vectors, label index rows,
    /// and every incident edge.
    pub fn delete_node(&self, id: NodeId) -> Result<()> {
        let txn = self.env.write_txn();
        ops::node::delete_node(&txn, id)?;
        txn.commit()
    }

    /// Delete an edge. A missing id is success.
    pub fn delete_edge(&self, edge_id: EdgeId) -> Result<()> {
        let txn = self.env.write_txn();
        ops::edge::delete_edge(&txn, edge_id)?;
        txn.commit()
    }

    // ------------------------------------------------------------------
    // Reads and queries
    // ------------------------------------------------------------------

    pub fn get_node(&self, id: NodeId) -> Result<NodeHeader> {
        ops::node::load_header(&self.env.read_txn(), id)
    }

    pub fn get_node_props(&self, params: &GetNodeProps) -> Result<Vec<Property>> {
        ops::read::get_node_props(&self.env.read_txn(), params)
    }

    pub fn get_vectors(&self, params: &GetVectors) -> Result<Vec<TaggedVector>> {
        ops::read::get_vectors(&self.env.read_txn(), params)
    }

    pub fn get_edge(&self, edge_id: EdgeId) -> Result<EdgeRef> {
        ops::read::get_edge(&self.env.read_txn(), edge_id)
    }

    /// Edge identity plus its type id, discovered from the forward index.
    pub fn get_edge_header(&self, edge_id: EdgeId) -> Result<(EdgeRef, RelTypeId)> {
        ops::read::get_edge_header(&self.env.read_txn(), edge_id)
    }

    pub fn get_edge_props(&self, params: &GetEdgeProps) -> Result<Vec<Property>> {
        ops::read::get_edge_props(&self.env.read_txn(), params)
    }

    pub fn list_adjacency(&self, params: &ListAdjacency) -> Result<Vec<Adjacency>> {
        ops::read::list_adjacency(&self.env.read_txn(), params)
    }

    /// Filtered neighbor listing; see [`Neighbors`].
    pub fn neighbors(&self, params: &Neighbors) -> Result<Vec<NodeId>> {
        ops::read::neighbors(&self.env.read_txn(), params)
    }

    pub fn neighbors_out(&self, node: NodeId, limit: u32) -> Result<Vec<NodeId>> {
        self.neighbors(&Neighbors {
            node,
            direction: Direction::Out,
            limit,
            rel_type_in: Vec::new(),
            neighbor_has_labels: Vec::new(),
        })
    }

    pub fn neighbors_in(&self, node: NodeId, limit: u32) -> Result<Vec<NodeId>> {
        self.neighbors(&Neighbors {
            node,
            direction: Direction::In,
            limit,
            rel_type_in: Vec::new(),
            neighbor_has_labels: Vec::new(),
        })
    }

    /// Exact cosine KNN over one tag. An unknown tag yields no hits.
    pub fn knn(&self, params: &Knn) -> Result<Vec<KnnHit>> {
        ops::vector::knn(&self.env.read_txn(), params)
    }

    pub fn scan_nodes_by_label(&self, params: &ScanNodesByLabel) -> Result<Vec<NodeId>> {
        ops::read::scan_nodes_by_label(&self.env.read_txn(), params)
    }

    pub fn degree(&self, params: &Degree) -> Result<u64> {
        ops::read::degree(&self.env.read_txn(), params)
    }

    // ------------------------------------------------------------------
    // Interning
    // ------------------------------------------------------------------

    pub fn get_or_create_label_id(&self, name: &str, create_if_missing: bool) -> Result<LabelId> {
        interner::resolve_or_allocate(&self.env, Dict::Label, name, create_if_missing)
    }

    pub fn get_or_create_rel_type_id(
        &self,
        name: &str,
        create_if_missing: bool,
    ) -> Result<RelTypeId> {
        interner::resolve_or_allocate(&self.env, Dict::RelType, name, create_if_missing)
    }

    pub fn get_or_create_prop_key_id(
        &self,
        name: &str,
        create_if_missing: bool,
    ) -> Result<PropKeyId> {
        interner::resolve_or_allocate(&self.env, Dict::PropKey, name, create_if_missing)
    }

    /// Resolve or allocate a vector tag. `dim` optionally pins the tag's
    /// dimension at creation time.
    pub fn get_or_create_vec_tag_id(
        &self,
        name: &str,
        create_if_missing: bool,
        dim: Option<u16>,
    ) -> Result<TagId> {
        interner::resolve_or_allocate_vec_tag(&self.env, name, create_if_missing, dim)
    }

    pub fn get_or_create_text_id(&self, name: &str, create_if_missing: bool) -> Result<TextId> {
        interner::resolve_or_allocate(&self.env, Dict::Text, name, create_if_missing)
    }

    pub fn label_name(&self, id: LabelId) -> Result<String> {
        interner::lookup_name(&self.env.read_txn(), Dict::Label, id)
    }

    pub fn rel_type_name(&self, id: RelTypeId) -> Result<String> {
        interner::lookup_name(&self.env.read_txn(), Dict::RelType, id)
    }

    pub fn prop_key_name(&self, id: PropKeyId) -> Result<String> {
        interner::lookup_name(&self.env.read_txn(), Dict::PropKey, id)
    }

    pub fn vec_tag_name(&self, id: TagId) -> Result<String> {
        interner::lookup_name(&self.env.read_txn(), Dict::VecTag, id)
    }

    pub fn text_name(&self, id: TextId) -> Result<String> {
        interner::lookup_name(&self.env.read_txn(), Dict::Text, id)
    }

    /// Adapter policy: intern wire text as a `TextId` value (empty text
    /// stays a bytes value).
    pub fn intern_text(&self, text: &str) -> Result<Value> {
        interner::intern_text(&self.env, text)
    }

    /// Adapter policy: intern wire bytes as a `TextId` value when the
    /// content is non-empty valid UTF-8; anything else stays bytes.
    pub fn intern_bytes(&self, bytes: Vec<u8>) -> Result<Value> {
        interner::intern_bytes(&self.env, bytes)
    }

    /// Expand an interned text value for the wire. Non-text values yield
    /// `None`.
    pub fn text_value(&self, value: &Value) -> Result<Option<String>> {
        interner::text_of(&self.env.read_txn(), value)
    }

    // ------------------------------------------------------------------
    // Batch
    // ------------------------------------------------------------------

    /// Apply a heterogeneous write batch in order, one transaction per
    /// operation. The batch is not atomic: the first failing op aborts
    /// itself and propagates, leaving earlier ops committed.
    pub fn apply_batch(&self, mutations: Vec<Mutation>) -> Result<Vec<BatchOutcome>> {
        let mut outcomes = Vec::with_capacity(mutations.len());
        for mutation in &mutations {
            let outcome = match mutation {
                Mutation::CreateNode(params) => {
                    let (id, _) = self.create_node(params)?;
                    BatchOutcome::NodeCreated(id)
                }
                Mutation::UpsertNodeProps(params) => {
                    self.upsert_node_props(params)?;
                    BatchOutcome::Applied
                }
                Mutation::SetNodeLabels(params) => {
                    self.set_node_labels(params)?;
                    BatchOutcome::Applied
                }
                Mutation::UpsertVector(params) => {
                    self.upsert_vector(params)?;
                    BatchOutcome::Applied
                }
                Mutation::DeleteVector(params) => {
                    self.delete_vector(params)?;
                    BatchOutcome::Applied
                }
                Mutation::AddEdge(params) => BatchOutcome::EdgeAdded(self.add_edge(params)?),
                Mutation::UpdateEdgeProps(params) => {
                    self.update_edge_props(params)?;
                    BatchOutcome::Applied
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}
