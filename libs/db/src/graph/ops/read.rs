//! Read operations: point lookups, adjacency walks, label scans, degree.
//!
//! Everything here works against any [`StorageRead`], so the same logic
//! serves snapshot reads and read-your-writes inside a write transaction.

use std::collections::HashSet;

use crate::codec::{decode_value, Property};
use crate::error::{Error, Result};
use crate::graph::ops::edge::discover_type_id;
use crate::graph::ops::node::load_header;
use crate::graph::ops::util::labels_contains_all;
use crate::graph::query::{
    Adjacency, Degree, Direction, GetEdgeProps, GetNodeProps, GetVectors, ListAdjacency,
    Neighbors, ScanNodesByLabel,
};
use crate::graph::schema::{
    EdgeProps, EdgeRef, EdgesByDstType, EdgesBySrcType, EdgesById, LabelIndex, NodeColdProps,
    NodeVectors, Nodes, TaggedVector, VecTagMeta, VectorF32,
};
use crate::storage::{ColumnFamily, StorageRead};
use crate::{NodeId, RelTypeId};

pub(crate) fn get_node_props(
    txn: &impl StorageRead,
    params: &GetNodeProps,
) -> Result<Vec<Property>> {
    let header = load_header(txn, params.id)?;
    let mut props = Vec::new();

    if params.key_ids.is_empty() {
        props.extend(header.hot_props.iter().cloned());
        let prefix = NodeColdProps::prefix(params.id);
        txn.scan_from(NodeColdProps::CF_NAME, &prefix, &mut |key, value| {
            if !key.starts_with(&prefix) {
                return Ok(false);
            }
            let (_, key_id) = NodeColdProps::decode_key(key)?;
            props.push(Property {
                key_id,
                value: decode_value(value)?,
            });
            Ok(true)
        })?;
    } else {
        for &key_id in &params.key_ids {
            // Hot and cold never share a key in a well-formed database;
            // if they do, hot wins.
            if let Some(prop) = header.hot_props.iter().find(|p| p.key_id == key_id) {
                props.push(prop.clone());
                continue;
            }
            if let Some(bytes) =
                txn.get(NodeColdProps::CF_NAME, &NodeColdProps::key(params.id, key_id))?
            {
                props.push(Property {
                    key_id,
                    value: decode_value(&bytes)?,
                });
            }
        }
    }

    Ok(props)
}

fn tag_dim(txn: &impl StorageRead, tag_id: u32) -> Result<u16> {
    match txn.get(VecTagMeta::CF_NAME, &VecTagMeta::key(tag_id))? {
        Some(bytes) => Ok(VecTagMeta::decode_dim(&bytes)? as u16),
        None => Ok(0),
    }
}

pub(crate) fn get_vectors(
    txn: &impl StorageRead,
    params: &GetVectors,
) -> Result<Vec<TaggedVector>> {
    let mut vectors = Vec::new();

    if params.tag_ids.is_empty() {
        let prefix = NodeVectors::prefix(params.id);
        let mut rows: Vec<(u32, Vec<u8>)> = Vec::new();
        txn.scan_from(NodeVectors::CF_NAME, &prefix, &mut |key, value| {
            if !key.starts_with(&prefix) {
                return Ok(false);
            }
            let (_, tag_id) = NodeVectors::decode_key(key)?;
            rows.push((tag_id, value.to_vec()));
            Ok(true)
        })?;
        for (tag_id, data) in rows {
            vectors.push(TaggedVector {
                tag_id,
                vector: VectorF32 {
                    dim: tag_dim(txn, tag_id)?,
                    data,
                },
            });
        }
    } else {
        for &tag_id in &params.tag_ids {
            if let Some(data) = txn.get(NodeVectors::CF_NAME, &NodeVectors::key(params.id, tag_id))?
            {
                vectors.push(TaggedVector {
                    tag_id,
                    vector: VectorF32 {
                        dim: tag_dim(txn, tag_id)?,
                        data,
                    },
                });
            }
        }
    }

    Ok(vectors)
}

pub(crate) fn get_edge(txn: &impl StorageRead, edge_id: u64) -> Result<EdgeRef> {
    let bytes = txn
        .get(EdgesById::CF_NAME, &EdgesById::key(edge_id))?
        .ok_or(Error::NotFound("edge"))?;
    EdgesById::decode_ref(&bytes)
}

/// Edge identity plus its type id, discovered from the forward index.
pub(crate) fn get_edge_header(
    txn: &impl StorageRead,
    edge_id: u64,
) -> Result<(EdgeRef, RelTypeId)> {
    let edge = get_edge(txn, edge_id)?;
    let type_id = discover_type_id(txn, &edge)?.ok_or(Error::NotFound("edge type"))?;
    Ok((edge, type_id))
}

pub(crate) fn get_edge_props(
    txn: &impl StorageRead,
    params: &GetEdgeProps,
) -> Result<Vec<Property>> {
    let mut props = Vec::new();

    if params.key_ids.is_empty() {
        let prefix = EdgeProps::prefix(params.edge_id);
        txn.scan_from(EdgeProps::CF_NAME, &prefix, &mut |key, value| {
            if !key.starts_with(&prefix) {
                return Ok(false);
            }
            let (_, key_id) = EdgeProps::decode_key(key)?;
            props.push(Property {
                key_id,
                value: decode_value(value)?,
            });
            Ok(true)
        })?;
    } else {
        for &key_id in &params.key_ids {
            if let Some(bytes) =
                txn.get(EdgeProps::CF_NAME, &EdgeProps::key(params.edge_id, key_id))?
            {
                props.push(Property {
                    key_id,
                    value: decode_value(&bytes)?,
                });
            }
        }
    }

    Ok(props)
}

/// Walk one adjacency index for `node`, invoking `emit` per row with
/// (neighbor, edgeId, typeId). `emit` returns false to stop early.
fn walk_adjacency(
    txn: &impl StorageRead,
    node: NodeId,
    out_dir: bool,
    emit: &mut dyn FnMut(NodeId, u64, RelTypeId) -> Result<bool>,
) -> Result<()> {
    let cf = if out_dir {
        EdgesBySrcType::CF_NAME
    } else {
        EdgesByDstType::CF_NAME
    };
    let prefix = node.to_be_bytes();
    txn.scan_from(cf, &prefix, &mut |key, _| {
        if !key.starts_with(&prefix) {
            return Ok(false);
        }
        // Both indexes share the layout (major, typeId, minor, edgeId);
        // minor is the neighbor on either side.
        let (_, type_id, neighbor, edge_id) = EdgesBySrcType::decode_key(key)?;
        emit(neighbor, edge_id, type_id)
    })
}

pub(crate) fn list_adjacency(
    txn: &impl StorageRead,
    params: &ListAdjacency,
) -> Result<Vec<Adjacency>> {
    let limit = params.limit as usize;
    let unlimited = limit == 0;
    let mut rows = Vec::new();

    if matches!(params.direction, Direction::Out | Direction::Both) {
        walk_adjacency(txn, params.node, true, &mut |neighbor, edge_id, type_id| {
            rows.push(Adjacency {
                neighbor_id: neighbor,
                edge_id,
                type_id,
                direction: Direction::Out,
            });
            Ok(unlimited || rows.len() < limit)
        })?;
    }

    if matches!(params.direction, Direction::In | Direction::Both)
        && (unlimited || rows.len() < limit)
    {
        walk_adjacency(txn, params.node, false, &mut |neighbor, edge_id, type_id| {
            rows.push(Adjacency {
                neighbor_id: neighbor,
                edge_id,
                type_id,
                direction: Direction::In,
            });
            Ok(unlimited || rows.len() < limit)
        })?;
    }

    Ok(rows)
}

/// True when `node` exists and carries every label in `need` (empty keeps
/// all; a missing neighbor header filters the row out).
fn neighbor_has_labels(txn: &impl StorageRead, node: NodeId, need: &[u32]) -> Result<bool> {
    if need.is_empty() {
        return Ok(true);
    }
    match txn.get(Nodes::CF_NAME, &Nodes::key(node))? {
        Some(bytes) => {
            let header = crate::codec::decode_node_header(&bytes)?;
            Ok(labels_contains_all(&header.labels, need))
        }
        None => Ok(false),
    }
}

/// Neighbor ids with optional type and label filters. `Both` emits each
/// neighbor once; the In sweep runs only while the limit is unexhausted.
pub(crate) fn neighbors(txn: &impl StorageRead, params: &Neighbors) -> Result<Vec<NodeId>> {
    let limit = params.limit as usize;
    let unlimited = limit == 0;
    let dedup = params.direction == Direction::Both;
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut result = Vec::new();

    for out_dir in [true, false] {
        let wanted = if out_dir {
            matches!(params.direction, Direction::Out | Direction::Both)
        } else {
            matches!(params.direction, Direction::In | Direction::Both)
        };
        if !wanted || !(unlimited || result.len() < limit) {
            continue;
        }
        walk_adjacency(txn, params.node, out_dir, &mut |neighbor, _, type_id| {
            if !params.rel_type_in.is_empty() && !params.rel_type_in.contains(&type_id) {
                return Ok(true);
            }
            if !neighbor_has_labels(txn, neighbor, &params.neighbor_has_labels)? {
                return Ok(true);
            }
            if dedup {
                if seen.insert(neighbor) {
                    result.push(neighbor);
                }
            } else {
                result.push(neighbor);
            }
            Ok(unlimited || result.len() < limit)
        })?;
    }

    Ok(result)
}

pub(crate) fn scan_nodes_by_label(
    txn: &impl StorageRead,
    params: &ScanNodesByLabel,
) -> Result<Vec<NodeId>> {
    let limit = params.limit as usize;
    let unlimited = limit == 0;
    let prefix = LabelIndex::prefix(params.label_id);
    let mut nodes = Vec::new();

    txn.scan_from(LabelIndex::CF_NAME, &prefix, &mut |key, _| {
        if !key.starts_with(&prefix) {
            return Ok(false);
        }
        let (_, node_id) = LabelIndex::decode_key(key)?;
        nodes.push(node_id);
        Ok(unlimited || nodes.len() < limit)
    })?;

    Ok(nodes)
}

pub(crate) fn degree(txn: &impl StorageRead, params: &Degree) -> Result<u64> {
    let mut count = 0u64;
    if matches!(params.direction, Direction::Out | Direction::Both) {
        walk_adjacency(txn, params.node, true, &mut |_, _, _| {
            count += 1;
            Ok(true)
        })?;
    }
    if matches!(params.direction, Direction::In | Direction::Both) {
        walk_adjacency(txn, params.node, false, &mut |_, _, _| {
            count += 1;
            Ok(true)
        })?;
    }
    Ok(count)
}
