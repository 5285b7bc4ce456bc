//! Tagged-vector operations: upsert and delete with tag-wide dim locking,
//! and the exact cosine KNN scan.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use aster_core::distance;

use crate::error::{Error, Result};
use crate::graph::query::{Knn, KnnHit};
use crate::graph::schema::{NodeVectors, VecTagMeta, VectorF32};
use crate::storage::{ColumnFamily, ReadTxn, StorageRead, WriteTxn};
use crate::{NodeId, TagId};

/// Validate and write one vector row, pinning the tag's dim on first use.
///
/// The byte length must be a multiple of 4. A dim of 0 in the input means
/// "derive from the byte length"; a nonzero dim must agree with it. Once a
/// tag has a pinned dim, every vector under it must match exactly.
pub(crate) fn put_vector(
    txn: &WriteTxn<'_>,
    id: NodeId,
    tag_id: TagId,
    vector: &VectorF32,
) -> Result<()> {
    let data = &vector.data;
    if data.len() % 4 != 0 {
        return Err(Error::DimMismatch(format!(
            "byte length {} is not a multiple of 4",
            data.len()
        )));
    }
    let dim = (data.len() / 4) as u32;
    if vector.dim != 0 && u32::from(vector.dim) != dim {
        return Err(Error::DimMismatch(format!(
            "declared dim {} does not match {} bytes",
            vector.dim,
            data.len()
        )));
    }

    let meta_key = VecTagMeta::key(tag_id);
    match txn.get(VecTagMeta::CF_NAME, &meta_key)? {
        Some(bytes) => {
            let pinned = VecTagMeta::decode_dim(&bytes)?;
            if pinned != dim {
                return Err(Error::DimMismatch(format!(
                    "tag {tag_id} is pinned to dim {pinned}, got {dim}"
                )));
            }
        }
        None => {
            // First use pins the dim, atomically with the vector write.
            txn.put(VecTagMeta::CF_NAME, &meta_key, &VecTagMeta::encode_dim(dim))?;
        }
    }

    txn.put(NodeVectors::CF_NAME, &NodeVectors::key(id, tag_id), data)?;
    Ok(())
}

/// Delete one tagged vector. Idempotent: absent is success.
pub(crate) fn delete_vector(txn: &WriteTxn<'_>, id: NodeId, tag_id: TagId) -> Result<()> {
    txn.delete(NodeVectors::CF_NAME, &NodeVectors::key(id, tag_id))
}

fn decode_f32s(bytes: &[u8], out: &mut Vec<f32>) {
    out.clear();
    out.reserve(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(chunk);
        out.push(f32::from_le_bytes(buf));
    }
}

/// Exact k-nearest-neighbor scan by cosine similarity over one tag.
///
/// A single snapshot walks the whole vector family, skipping rows under
/// other tags and rows whose length disagrees with the pinned dim. A
/// bounded min-heap keeps the best k; results come out score-descending.
/// An unknown tag yields no hits rather than an error.
pub(crate) fn knn(txn: &ReadTxn<'_>, params: &Knn) -> Result<Vec<KnnHit>> {
    let k = params.k as usize;
    if k == 0 {
        return Ok(Vec::new());
    }

    let dim = match txn.get(VecTagMeta::CF_NAME, &VecTagMeta::key(params.tag_id))? {
        Some(bytes) => VecTagMeta::decode_dim(&bytes)?,
        None => return Ok(Vec::new()),
    };

    let query_bytes = &params.query.data;
    if query_bytes.len() % 4 != 0 {
        return Err(Error::DimMismatch(format!(
            "query byte length {} is not a multiple of 4",
            query_bytes.len()
        )));
    }
    if (query_bytes.len() / 4) as u32 != dim {
        return Err(Error::DimMismatch(format!(
            "query has dim {}, tag {} is pinned to {dim}",
            query_bytes.len() / 4,
            params.tag_id
        )));
    }

    let mut query = Vec::new();
    decode_f32s(query_bytes, &mut query);
    let qnorm = {
        let n = distance::norm(&query);
        // A zero query scores every candidate exactly 0.
        if n == 0.0 {
            1.0
        } else {
            n
        }
    };

    tracing::debug!(tag_id = params.tag_id, k, dim, "knn scan");

    // Min-heap of at most k candidates, ordered by score ascending, so
    // "replace the minimum if better" is O(log k).
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f32>, NodeId)>> =
        BinaryHeap::with_capacity(k.min(1024));
    let mut candidate = Vec::new();
    let expected_len = dim as usize * 4;

    txn.scan_from(NodeVectors::CF_NAME, &[], &mut |key, value| {
        let Ok((node_id, tag_id)) = NodeVectors::decode_key(key) else {
            return Ok(true);
        };
        if tag_id != params.tag_id {
            return Ok(true);
        }
        if value.len() != expected_len {
            tracing::warn!(node_id, tag_id, len = value.len(), "skipping corrupt vector row");
            return Ok(true);
        }

        decode_f32s(value, &mut candidate);
        let xnorm = distance::norm(&candidate);
        let score = if xnorm == 0.0 {
            0.0
        } else {
            distance::dot(&query, &candidate) / (qnorm * xnorm)
        };

        let entry = Reverse((OrderedFloat(score), node_id));
        if heap.len() < k {
            heap.push(entry);
        } else if let Some(&Reverse((min_score, _))) = heap.peek() {
            if OrderedFloat(score) > min_score {
                heap.pop();
                heap.push(entry);
            }
        }
        Ok(true)
    })?;

    // Sorting ascending by `Reverse` puts the highest score first, which
    // is exactly the descending emission order.
    let hits: Vec<KnnHit> = heap
        .into_sorted_vec()
        .into_iter()
        .map(|Reverse((score, id))| KnnHit { id, score: score.0 })
        .collect();
    Ok(hits)
}
