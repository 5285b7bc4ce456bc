//! Node write operations: create, property upsert, label merge, and the
//! cascading delete.

use std::collections::BTreeSet;

use crate::codec::{decode_node_header, encode_node_header, encode_value_to_vec, NodeHeader};
use crate::error::{Error, Result};
use crate::graph::mutation::{CreateNode, SetNodeLabels, UpsertNodeProps};
use crate::graph::ops::util::{bump_seq, sort_unique};
use crate::graph::ops::vector::put_vector;
use crate::graph::schema::{
    self, EdgeProps, EdgesByDstType, EdgesBySrcType, EdgesById, LabelIndex, NodeColdProps,
    NodeVectors, Nodes,
};
use crate::storage::{ColumnFamily, StorageRead, WriteTxn};
use crate::{EdgeId, NodeId};

pub(crate) fn load_header(txn: &impl StorageRead, id: NodeId) -> Result<NodeHeader> {
    let bytes = txn
        .get(Nodes::CF_NAME, &Nodes::key(id))?
        .ok_or(Error::NotFound("node"))?;
    decode_node_header(&bytes)
}

pub(crate) fn create_node(
    txn: &WriteTxn<'_>,
    params: &CreateNode,
) -> Result<(NodeId, NodeHeader)> {
    let id = bump_seq(txn, schema::META_NODE_SEQ)?;
    tracing::debug!(id, labels = params.labels.len(), "create_node");

    let mut labels = params.labels.clone();
    sort_unique(&mut labels);

    let header = NodeHeader {
        id,
        labels,
        hot_props: params.hot_props.clone(),
    };
    txn.put(Nodes::CF_NAME, &Nodes::key(id), &encode_node_header(&header))?;

    for prop in &params.cold_props {
        txn.put(
            NodeColdProps::CF_NAME,
            &NodeColdProps::key(id, prop.key_id),
            &encode_value_to_vec(&prop.value),
        )?;
    }

    for tagged in &params.vectors {
        put_vector(txn, id, tagged.tag_id, &tagged.vector)?;
    }

    for &label_id in &header.labels {
        txn.put(LabelIndex::CF_NAME, &LabelIndex::key(label_id, id), &[])?;
    }

    Ok((id, header))
}

pub(crate) fn upsert_node_props(txn: &WriteTxn<'_>, params: &UpsertNodeProps) -> Result<()> {
    tracing::debug!(id = params.id, "upsert_node_props");
    let mut header = load_header(txn, params.id)?;

    // Unset applies before set so that unset(k) + set(k) keeps the value.
    if !params.unset_keys.is_empty() {
        let mut unset = params.unset_keys.clone();
        sort_unique(&mut unset);
        header
            .hot_props
            .retain(|p| unset.binary_search(&p.key_id).is_err());
        for &key_id in &unset {
            txn.delete(
                NodeColdProps::CF_NAME,
                &NodeColdProps::key(params.id, key_id),
            )?;
        }
    }

    for prop in &params.set_hot {
        match header
            .hot_props
            .iter_mut()
            .find(|p| p.key_id == prop.key_id)
        {
            Some(existing) => existing.value = prop.value.clone(),
            None => header.hot_props.push(prop.clone()),
        }
    }

    txn.put(
        Nodes::CF_NAME,
        &Nodes::key(params.id),
        &encode_node_header(&header),
    )?;

    for prop in &params.set_cold {
        txn.put(
            NodeColdProps::CF_NAME,
            &NodeColdProps::key(params.id, prop.key_id),
            &encode_value_to_vec(&prop.value),
        )?;
    }

    Ok(())
}

pub(crate) fn set_node_labels(txn: &WriteTxn<'_>, params: &SetNodeLabels) -> Result<()> {
    tracing::debug!(
        id = params.id,
        add = params.add.len(),
        remove = params.remove.len(),
        "set_node_labels"
    );
    let mut header = load_header(txn, params.id)?;
    sort_unique(&mut header.labels);
    let before = header.labels.clone();

    let mut remove = params.remove.clone();
    sort_unique(&mut remove);
    let mut add = params.add.clone();
    sort_unique(&mut add);

    // Remove first, then add, preserving sort.
    header
        .labels
        .retain(|id| remove.binary_search(id).is_err());
    for id in add {
        if let Err(pos) = header.labels.binary_search(&id) {
            header.labels.insert(pos, id);
        }
    }

    txn.put(
        Nodes::CF_NAME,
        &Nodes::key(params.id),
        &encode_node_header(&header),
    )?;

    // The label index mirrors the header exactly: index the labels that
    // appeared and unindex the ones that are gone.
    for &label_id in header.labels.iter().filter(|id| before.binary_search(id).is_err()) {
        txn.put(
            LabelIndex::CF_NAME,
            &LabelIndex::key(label_id, params.id),
            &[],
        )?;
    }
    for &label_id in before.iter().filter(|id| header.labels.binary_search(id).is_err()) {
        txn.delete(LabelIndex::CF_NAME, &LabelIndex::key(label_id, params.id))?;
    }

    Ok(())
}

/// Delete a node and everything that references it: cold props, vectors,
/// label index rows, and every incident edge with its props and index
/// entries. Missing nodes are a no-op.
pub(crate) fn delete_node(txn: &WriteTxn<'_>, id: NodeId) -> Result<()> {
    tracing::debug!(id, "delete_node");

    let header = match txn.get(Nodes::CF_NAME, &Nodes::key(id))? {
        Some(bytes) => Some(decode_node_header(&bytes)?),
        None => None,
    };

    // Incident edges, walked via both indexes in key order. Index keys
    // are collected first; deleting while the cursor runs would mutate
    // the range under it.
    let mut index_keys: Vec<(&'static str, Vec<u8>)> = Vec::new();
    let mut edge_ids: BTreeSet<EdgeId> = BTreeSet::new();

    let prefix = EdgesBySrcType::prefix(id);
    txn.scan_from(EdgesBySrcType::CF_NAME, &prefix, &mut |key, _| {
        if !key.starts_with(&prefix) {
            return Ok(false);
        }
        let (src, type_id, dst, edge_id) = EdgesBySrcType::decode_key(key)?;
        index_keys.push((EdgesBySrcType::CF_NAME, key.to_vec()));
        index_keys.push((
            EdgesByDstType::CF_NAME,
            EdgesByDstType::key(dst, type_id, src, edge_id).to_vec(),
        ));
        edge_ids.insert(edge_id);
        Ok(true)
    })?;

    let prefix = EdgesByDstType::prefix(id);
    txn.scan_from(EdgesByDstType::CF_NAME, &prefix, &mut |key, _| {
        if !key.starts_with(&prefix) {
            return Ok(false);
        }
        let (dst, type_id, src, edge_id) = EdgesByDstType::decode_key(key)?;
        index_keys.push((EdgesByDstType::CF_NAME, key.to_vec()));
        index_keys.push((
            EdgesBySrcType::CF_NAME,
            EdgesBySrcType::key(src, type_id, dst, edge_id).to_vec(),
        ));
        edge_ids.insert(edge_id);
        Ok(true)
    })?;

    for (cf, key) in index_keys {
        txn.delete(cf, &key)?;
    }

    for &edge_id in &edge_ids {
        txn.delete(EdgesById::CF_NAME, &EdgesById::key(edge_id))?;
        delete_prefix(txn, EdgeProps::CF_NAME, &EdgeProps::prefix(edge_id))?;
    }

    delete_prefix(txn, NodeColdProps::CF_NAME, &NodeColdProps::prefix(id))?;
    delete_prefix(txn, NodeVectors::CF_NAME, &NodeVectors::prefix(id))?;

    if let Some(header) = header {
        for &label_id in &header.labels {
            txn.delete(LabelIndex::CF_NAME, &LabelIndex::key(label_id, id))?;
        }
    }

    txn.delete(Nodes::CF_NAME, &Nodes::key(id))?;

    Ok(())
}

/// Range-delete every key starting with `prefix`.
pub(crate) fn delete_prefix(
    txn: &WriteTxn<'_>,
    cf: &'static str,
    prefix: &[u8],
) -> Result<()> {
    let mut keys = Vec::new();
    txn.scan_from(cf, prefix, &mut |key, _| {
        if !key.starts_with(prefix) {
            return Ok(false);
        }
        keys.push(key.to_vec());
        Ok(true)
    })?;
    for key in keys {
        txn.delete(cf, &key)?;
    }
    Ok(())
}

/// Keep hot props well-formed for tests and debug assertions: at most one
/// entry per key id.
#[cfg(test)]
pub(crate) fn hot_keys_unique(props: &[crate::codec::Property]) -> bool {
    let mut keys: Vec<_> = props.iter().map(|p| p.key_id).collect();
    let len = keys.len();
    keys.sort_unstable();
    keys.dedup();
    keys.len() == len
}
