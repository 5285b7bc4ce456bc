//! Physical schema: column families and their composite key codecs.
//!
//! All composite keys are fixed-width big-endian integers concatenated
//! without delimiters, so byte-wise lexicographic order equals tuple order.
//! Range scans seed a cursor with the fixed-width prefix and walk while
//! the key still starts with it.
//!
//! ## Layouts
//!
//! | family | key | value |
//! |---|---|---|
//! | `graph/nodes` | u64 nodeId | encoded NodeHeader |
//! | `graph/node_cold_props` | u64 nodeId ‖ u32 propKeyId | encoded Value |
//! | `graph/node_vectors` | u64 nodeId ‖ u32 tagId | raw float32 bytes |
//! | `graph/edges_by_src_type` | u64 src ‖ u32 typeId ‖ u64 dst ‖ u64 edgeId | empty |
//! | `graph/edges_by_dst_type` | u64 dst ‖ u32 typeId ‖ u64 src ‖ u64 edgeId | empty |
//! | `graph/edges_by_id` | u64 edgeId | 24 bytes: edgeId ‖ src ‖ dst |
//! | `graph/edge_props` | u64 edgeId ‖ u32 propKeyId | encoded Value |
//! | `graph/label_index` | u32 labelId ‖ u64 nodeId | empty |
//! | `dict/*_ids` | u32 id | UTF-8 name |
//! | `dict/*_by_name` | UTF-8 name | u32 id (BE) |
//! | `dict/vec_tag_meta` | u32 tagId | u32 dim (BE) |
//! | `meta` | ASCII label | u64/u32 (BE) |
//!
//! These layouts are the on-disk format; field widths and endianness are
//! normative.

use rocksdb::{Cache, ColumnFamilyDescriptor};

use crate::error::{Error, Result};
use crate::storage::cf::{point_lookup_options, range_scan_options, BlockCacheConfig, ColumnFamily};
use crate::{EdgeId, LabelId, NodeId, PropKeyId, RelTypeId, TagId};

// ============================================================================
// Domain structs
// ============================================================================

/// Identity triple of an edge, exactly as stored in `graph/edges_by_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef {
    pub id: EdgeId,
    pub src: NodeId,
    pub dst: NodeId,
}

/// Raw float32 vector. `data.len()` must be `dim * 4` once the dim is
/// known; a dim of 0 means "derive from the byte length".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VectorF32 {
    pub dim: u16,
    pub data: Vec<u8>,
}

/// A vector under a named tag partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedVector {
    pub tag_id: TagId,
    pub vector: VectorF32,
}

// ============================================================================
// Meta keys
// ============================================================================

pub(crate) const META_NODE_SEQ: &[u8] = b"nodeSeq";
pub(crate) const META_EDGE_SEQ: &[u8] = b"edgeSeq";
pub(crate) const META_SCHEMA_VERSION: &[u8] = b"schemaVersion";
pub(crate) const META_LABEL_SEQ: &[u8] = b"labelSeq";
pub(crate) const META_REL_TYPE_SEQ: &[u8] = b"relTypeSeq";
pub(crate) const META_PROP_KEY_SEQ: &[u8] = b"propKeySeq";
pub(crate) const META_VEC_TAG_SEQ: &[u8] = b"vecTagSeq";
pub(crate) const META_TEXT_SEQ: &[u8] = b"textSeq";

pub(crate) const SCHEMA_VERSION_INITIAL: u32 = 1;

// ============================================================================
// Dictionary family names
// ============================================================================

pub(crate) const DICT_LABEL_IDS: &str = "dict/label_ids";
pub(crate) const DICT_LABELS_BY_NAME: &str = "dict/labels_by_name";
pub(crate) const DICT_REL_TYPE_IDS: &str = "dict/rel_type_ids";
pub(crate) const DICT_REL_TYPES_BY_NAME: &str = "dict/rel_types_by_name";
pub(crate) const DICT_PROP_KEY_IDS: &str = "dict/prop_key_ids";
pub(crate) const DICT_PROP_KEYS_BY_NAME: &str = "dict/prop_keys_by_name";
pub(crate) const DICT_VEC_TAG_IDS: &str = "dict/vec_tag_ids";
pub(crate) const DICT_VEC_TAGS_BY_NAME: &str = "dict/vec_tags_by_name";
pub(crate) const DICT_TEXT_IDS: &str = "dict/text_ids";
pub(crate) const DICT_TEXTS_BY_NAME: &str = "dict/texts_by_name";

// ============================================================================
// Byte helpers
// ============================================================================

fn be_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(buf)
}

fn be_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_be_bytes(buf)
}

// ============================================================================
// Nodes
// ============================================================================

/// Node header rows keyed by node id.
pub(crate) struct Nodes;

impl ColumnFamily for Nodes {
    const CF_NAME: &'static str = "graph/nodes";
}

impl Nodes {
    pub fn key(id: NodeId) -> [u8; 8] {
        id.to_be_bytes()
    }
}

// ============================================================================
// NodeColdProps
// ============================================================================

/// Out-of-line property rows keyed by (nodeId, propKeyId).
pub(crate) struct NodeColdProps;

impl ColumnFamily for NodeColdProps {
    const CF_NAME: &'static str = "graph/node_cold_props";
}

impl NodeColdProps {
    pub fn key(id: NodeId, key_id: PropKeyId) -> [u8; 12] {
        let mut key = [0u8; 12];
        key[..8].copy_from_slice(&id.to_be_bytes());
        key[8..].copy_from_slice(&key_id.to_be_bytes());
        key
    }

    pub fn prefix(id: NodeId) -> [u8; 8] {
        id.to_be_bytes()
    }

    pub fn decode_key(bytes: &[u8]) -> Result<(NodeId, PropKeyId)> {
        if bytes.len() != 12 {
            return Err(Error::CorruptEncoding("node cold prop key length"));
        }
        Ok((be_u64(&bytes[..8]), be_u32(&bytes[8..])))
    }
}

// ============================================================================
// NodeVectors
// ============================================================================

/// Raw vector rows keyed by (nodeId, tagId). The KNN scan walks this
/// family end to end, so its options carry no prefix extractor.
pub(crate) struct NodeVectors;

impl ColumnFamily for NodeVectors {
    const CF_NAME: &'static str = "graph/node_vectors";
}

impl NodeVectors {
    pub fn key(id: NodeId, tag_id: TagId) -> [u8; 12] {
        let mut key = [0u8; 12];
        key[..8].copy_from_slice(&id.to_be_bytes());
        key[8..].copy_from_slice(&tag_id.to_be_bytes());
        key
    }

    pub fn prefix(id: NodeId) -> [u8; 8] {
        id.to_be_bytes()
    }

    pub fn decode_key(bytes: &[u8]) -> Result<(NodeId, TagId)> {
        if bytes.len() != 12 {
            return Err(Error::CorruptEncoding("node vector key length"));
        }
        Ok((be_u64(&bytes[..8]), be_u32(&bytes[8..])))
    }
}

// ============================================================================
// Edge indexes
// ============================================================================

/// Forward adjacency index keyed by (src, typeId, dst, edgeId); empty value.
pub(crate) struct EdgesBySrcType;

impl ColumnFamily for EdgesBySrcType {
    const CF_NAME: &'static str = "graph/edges_by_src_type";
}

/// Reverse adjacency index keyed by (dst, typeId, src, edgeId); empty value.
pub(crate) struct EdgesByDstType;

impl ColumnFamily for EdgesByDstType {
    const CF_NAME: &'static str = "graph/edges_by_dst_type";
}

/// Shared layout of the two adjacency indexes:
/// [major (8)] ‖ [typeId (4)] ‖ [minor (8)] ‖ [edgeId (8)] = 28 bytes,
/// where major is src (forward) or dst (reverse) and minor the other end.
fn edge_index_key(major: NodeId, type_id: RelTypeId, minor: NodeId, edge_id: EdgeId) -> [u8; 28] {
    let mut key = [0u8; 28];
    key[..8].copy_from_slice(&major.to_be_bytes());
    key[8..12].copy_from_slice(&type_id.to_be_bytes());
    key[12..20].copy_from_slice(&minor.to_be_bytes());
    key[20..].copy_from_slice(&edge_id.to_be_bytes());
    key
}

fn edge_index_decode(bytes: &[u8]) -> Result<(NodeId, RelTypeId, NodeId, EdgeId)> {
    if bytes.len() != 28 {
        return Err(Error::CorruptEncoding("edge index key length"));
    }
    Ok((
        be_u64(&bytes[..8]),
        be_u32(&bytes[8..12]),
        be_u64(&bytes[12..20]),
        be_u64(&bytes[20..]),
    ))
}

impl EdgesBySrcType {
    pub fn key(src: NodeId, type_id: RelTypeId, dst: NodeId, edge_id: EdgeId) -> [u8; 28] {
        edge_index_key(src, type_id, dst, edge_id)
    }

    pub fn prefix(src: NodeId) -> [u8; 8] {
        src.to_be_bytes()
    }

    /// Decode to (src, typeId, dst, edgeId).
    pub fn decode_key(bytes: &[u8]) -> Result<(NodeId, RelTypeId, NodeId, EdgeId)> {
        edge_index_decode(bytes)
    }
}

impl EdgesByDstType {
    pub fn key(dst: NodeId, type_id: RelTypeId, src: NodeId, edge_id: EdgeId) -> [u8; 28] {
        edge_index_key(dst, type_id, src, edge_id)
    }

    pub fn prefix(dst: NodeId) -> [u8; 8] {
        dst.to_be_bytes()
    }

    /// Decode to (dst, typeId, src, edgeId).
    pub fn decode_key(bytes: &[u8]) -> Result<(NodeId, RelTypeId, NodeId, EdgeId)> {
        edge_index_decode(bytes)
    }
}

// ============================================================================
// EdgesById
// ============================================================================

/// Edge identity rows: 24-byte value of edgeId ‖ src ‖ dst.
pub(crate) struct EdgesById;

impl ColumnFamily for EdgesById {
    const CF_NAME: &'static str = "graph/edges_by_id";
}

impl EdgesById {
    pub fn key(edge_id: EdgeId) -> [u8; 8] {
        edge_id.to_be_bytes()
    }

    pub fn encode_ref(edge: &EdgeRef) -> [u8; 24] {
        let mut value = [0u8; 24];
        value[..8].copy_from_slice(&edge.id.to_be_bytes());
        value[8..16].copy_from_slice(&edge.src.to_be_bytes());
        value[16..].copy_from_slice(&edge.dst.to_be_bytes());
        value
    }

    pub fn decode_ref(bytes: &[u8]) -> Result<EdgeRef> {
        if bytes.len() != 24 {
            return Err(Error::CorruptEncoding("edge ref length"));
        }
        Ok(EdgeRef {
            id: be_u64(&bytes[..8]),
            src: be_u64(&bytes[8..16]),
            dst: be_u64(&bytes[16..]),
        })
    }
}

// ============================================================================
// EdgeProps
// ============================================================================

/// Edge property rows keyed by (edgeId, propKeyId).
pub(crate) struct EdgeProps;

impl ColumnFamily for EdgeProps {
    const CF_NAME: &'static str = "graph/edge_props";
}

impl EdgeProps {
    pub fn key(edge_id: EdgeId, key_id: PropKeyId) -> [u8; 12] {
        let mut key = [0u8; 12];
        key[..8].copy_from_slice(&edge_id.to_be_bytes());
        key[8..].copy_from_slice(&key_id.to_be_bytes());
        key
    }

    pub fn prefix(edge_id: EdgeId) -> [u8; 8] {
        edge_id.to_be_bytes()
    }

    pub fn decode_key(bytes: &[u8]) -> Result<(EdgeId, PropKeyId)> {
        if bytes.len() != 12 {
            return Err(Error::CorruptEncoding("edge prop key length"));
        }
        Ok((be_u64(&bytes[..8]), be_u32(&bytes[8..])))
    }
}

// ============================================================================
// LabelIndex
// ============================================================================

/// Label membership index keyed by (labelId, nodeId); empty value.
/// Mirrors exactly the union of label sets across node headers.
pub(crate) struct LabelIndex;

impl ColumnFamily for LabelIndex {
    const CF_NAME: &'static str = "graph/label_index";
}

impl LabelIndex {
    pub fn key(label_id: LabelId, node_id: NodeId) -> [u8; 12] {
        let mut key = [0u8; 12];
        key[..4].copy_from_slice(&label_id.to_be_bytes());
        key[4..].copy_from_slice(&node_id.to_be_bytes());
        key
    }

    pub fn prefix(label_id: LabelId) -> [u8; 4] {
        label_id.to_be_bytes()
    }

    pub fn decode_key(bytes: &[u8]) -> Result<(LabelId, NodeId)> {
        if bytes.len() != 12 {
            return Err(Error::CorruptEncoding("label index key length"));
        }
        Ok((be_u32(&bytes[..4]), be_u64(&bytes[4..])))
    }
}

// ============================================================================
// VecTagMeta
// ============================================================================

/// Per-tag pinned dimension, written once on first use.
pub(crate) struct VecTagMeta;

impl ColumnFamily for VecTagMeta {
    const CF_NAME: &'static str = "dict/vec_tag_meta";
}

impl VecTagMeta {
    pub fn key(tag_id: TagId) -> [u8; 4] {
        tag_id.to_be_bytes()
    }

    pub fn encode_dim(dim: u32) -> [u8; 4] {
        dim.to_be_bytes()
    }

    pub fn decode_dim(bytes: &[u8]) -> Result<u32> {
        if bytes.len() != 4 {
            return Err(Error::CorruptEncoding("vec tag meta length"));
        }
        Ok(be_u32(bytes))
    }
}

// ============================================================================
// Meta
// ============================================================================

/// Sequences and the schema version, under ASCII keys.
pub(crate) struct Meta;

impl ColumnFamily for Meta {
    const CF_NAME: &'static str = "meta";
}

// ============================================================================
// Environment wiring
// ============================================================================

/// Every column family the environment opens, in a fixed order.
pub(crate) const ALL_COLUMN_FAMILIES: &[&str] = &[
    Nodes::CF_NAME,
    NodeColdProps::CF_NAME,
    NodeVectors::CF_NAME,
    EdgesBySrcType::CF_NAME,
    EdgesByDstType::CF_NAME,
    EdgesById::CF_NAME,
    EdgeProps::CF_NAME,
    LabelIndex::CF_NAME,
    DICT_LABEL_IDS,
    DICT_LABELS_BY_NAME,
    DICT_REL_TYPE_IDS,
    DICT_REL_TYPES_BY_NAME,
    DICT_PROP_KEY_IDS,
    DICT_PROP_KEYS_BY_NAME,
    DICT_VEC_TAG_IDS,
    DICT_VEC_TAGS_BY_NAME,
    DICT_TEXT_IDS,
    DICT_TEXTS_BY_NAME,
    VecTagMeta::CF_NAME,
    Meta::CF_NAME,
];

/// Build descriptors for every family with per-family options.
pub(crate) fn column_family_descriptors(
    cache: &Cache,
    config: &BlockCacheConfig,
) -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(Nodes::CF_NAME, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(
            NodeColdProps::CF_NAME,
            range_scan_options(cache, config, Some(8)),
        ),
        // No prefix extractor: the KNN scan walks the whole family.
        ColumnFamilyDescriptor::new(
            NodeVectors::CF_NAME,
            range_scan_options(cache, config, None),
        ),
        ColumnFamilyDescriptor::new(
            EdgesBySrcType::CF_NAME,
            range_scan_options(cache, config, Some(8)),
        ),
        ColumnFamilyDescriptor::new(
            EdgesByDstType::CF_NAME,
            range_scan_options(cache, config, Some(8)),
        ),
        ColumnFamilyDescriptor::new(EdgesById::CF_NAME, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(
            EdgeProps::CF_NAME,
            range_scan_options(cache, config, Some(8)),
        ),
        ColumnFamilyDescriptor::new(
            LabelIndex::CF_NAME,
            range_scan_options(cache, config, Some(4)),
        ),
        ColumnFamilyDescriptor::new(DICT_LABEL_IDS, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(DICT_LABELS_BY_NAME, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(DICT_REL_TYPE_IDS, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(DICT_REL_TYPES_BY_NAME, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(DICT_PROP_KEY_IDS, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(DICT_PROP_KEYS_BY_NAME, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(DICT_VEC_TAG_IDS, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(DICT_VEC_TAGS_BY_NAME, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(DICT_TEXT_IDS, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(DICT_TEXTS_BY_NAME, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(VecTagMeta::CF_NAME, point_lookup_options(cache, config)),
        ColumnFamilyDescriptor::new(Meta::CF_NAME, point_lookup_options(cache, config)),
    ]
}
