//! Edge write operations: add, property update, delete.
//!
//! Every edge lives in exactly three families: `edges_by_id` (identity),
//! `edges_by_src_type` and `edges_by_dst_type` (the two adjacency
//! indexes). All three carry the same (id, src, dst, type) tuple.

use crate::codec::encode_value_to_vec;
use crate::error::Result;
use crate::graph::mutation::{AddEdge, UpdateEdgeProps};
use crate::graph::ops::node::delete_prefix;
use crate::graph::ops::util::{bump_seq, sort_unique};
use crate::graph::schema::{
    self, EdgeProps, EdgeRef, EdgesByDstType, EdgesBySrcType, EdgesById,
};
use crate::storage::{ColumnFamily, StorageRead, WriteTxn};
use crate::{EdgeId, RelTypeId};

pub(crate) fn add_edge(txn: &WriteTxn<'_>, params: &AddEdge) -> Result<EdgeRef> {
    let id = bump_seq(txn, schema::META_EDGE_SEQ)?;
    tracing::debug!(id, src = params.src, dst = params.dst, "add_edge");

    let edge = EdgeRef {
        id,
        src: params.src,
        dst: params.dst,
    };
    txn.put(
        EdgesById::CF_NAME,
        &EdgesById::key(id),
        &EdgesById::encode_ref(&edge),
    )?;
    txn.put(
        EdgesBySrcType::CF_NAME,
        &EdgesBySrcType::key(edge.src, params.type_id, edge.dst, edge.id),
        &[],
    )?;
    txn.put(
        EdgesByDstType::CF_NAME,
        &EdgesByDstType::key(edge.dst, params.type_id, edge.src, edge.id),
        &[],
    )?;

    for prop in &params.props {
        txn.put(
            EdgeProps::CF_NAME,
            &EdgeProps::key(edge.id, prop.key_id),
            &encode_value_to_vec(&prop.value),
        )?;
    }

    Ok(edge)
}

pub(crate) fn update_edge_props(txn: &WriteTxn<'_>, params: &UpdateEdgeProps) -> Result<()> {
    tracing::debug!(edge_id = params.edge_id, "update_edge_props");

    // Unset applies before set, same rule as node props.
    let mut unset = params.unset_keys.clone();
    sort_unique(&mut unset);
    for &key_id in &unset {
        txn.delete(EdgeProps::CF_NAME, &EdgeProps::key(params.edge_id, key_id))?;
    }
    for prop in &params.set {
        txn.put(
            EdgeProps::CF_NAME,
            &EdgeProps::key(params.edge_id, prop.key_id),
            &encode_value_to_vec(&prop.value),
        )?;
    }
    Ok(())
}

/// Find the type id of an edge by scanning the forward index from
/// `(src, 0, 0, 0)` until the (dst, edgeId) pair matches. The identity
/// row does not carry the type, so this discovery walk is shared by
/// `delete_edge` and the edge-header read.
pub(crate) fn discover_type_id(
    txn: &impl StorageRead,
    edge: &EdgeRef,
) -> Result<Option<RelTypeId>> {
    let prefix = EdgesBySrcType::prefix(edge.src);
    let mut found = None;
    txn.scan_from(EdgesBySrcType::CF_NAME, &prefix, &mut |key, _| {
        if !key.starts_with(&prefix) {
            return Ok(false);
        }
        let (_, type_id, dst, edge_id) = EdgesBySrcType::decode_key(key)?;
        if dst == edge.dst && edge_id == edge.id {
            found = Some(type_id);
            return Ok(false);
        }
        Ok(true)
    })?;
    Ok(found)
}

/// Delete an edge: both index rows (located via type discovery), the
/// identity row, and its property range. A missing id is success.
pub(crate) fn delete_edge(txn: &WriteTxn<'_>, edge_id: EdgeId) -> Result<()> {
    tracing::debug!(edge_id, "delete_edge");

    if let Some(bytes) = txn.get(EdgesById::CF_NAME, &EdgesById::key(edge_id))? {
        let edge = EdgesById::decode_ref(&bytes)?;
        if let Some(type_id) = discover_type_id(txn, &edge)? {
            txn.delete(
                EdgesBySrcType::CF_NAME,
                &EdgesBySrcType::key(edge.src, type_id, edge.dst, edge.id),
            )?;
            txn.delete(
                EdgesByDstType::CF_NAME,
                &EdgesByDstType::key(edge.dst, type_id, edge.src, edge.id),
            )?;
        }
    }

    txn.delete(EdgesById::CF_NAME, &EdgesById::key(edge_id))?;
    delete_prefix(txn, EdgeProps::CF_NAME, &EdgeProps::prefix(edge_id))?;

    Ok(())
}
