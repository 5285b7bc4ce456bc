//! String interning: bidirectional name ↔ u32 id mappings for labels,
//! relationship types, property keys, vector tags, and interned text
//! values.
//!
//! Each dictionary holds two families (id → name, name → id) and a
//! monotonic sequence in the meta family. Names are allocated once and
//! never deleted; an interned name maps to exactly one id and vice versa.
//!
//! Returned strings are owned copies; nothing borrows storage memory past
//! the transaction that read it.

use crate::codec::Value;
use crate::error::{Error, Result};
use crate::graph::ops::util::bump_seq;
use crate::graph::schema::{self, VecTagMeta};
use crate::storage::{ColumnFamily, Environment, StorageRead};
use crate::TagId;

/// The five dictionary kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dict {
    Label,
    RelType,
    PropKey,
    VecTag,
    Text,
}

impl Dict {
    pub(crate) const fn ids_cf(self) -> &'static str {
        match self {
            Dict::Label => schema::DICT_LABEL_IDS,
            Dict::RelType => schema::DICT_REL_TYPE_IDS,
            Dict::PropKey => schema::DICT_PROP_KEY_IDS,
            Dict::VecTag => schema::DICT_VEC_TAG_IDS,
            Dict::Text => schema::DICT_TEXT_IDS,
        }
    }

    pub(crate) const fn by_name_cf(self) -> &'static str {
        match self {
            Dict::Label => schema::DICT_LABELS_BY_NAME,
            Dict::RelType => schema::DICT_REL_TYPES_BY_NAME,
            Dict::PropKey => schema::DICT_PROP_KEYS_BY_NAME,
            Dict::VecTag => schema::DICT_VEC_TAGS_BY_NAME,
            Dict::Text => schema::DICT_TEXTS_BY_NAME,
        }
    }

    pub(crate) const fn seq_key(self) -> &'static [u8] {
        match self {
            Dict::Label => schema::META_LABEL_SEQ,
            Dict::RelType => schema::META_REL_TYPE_SEQ,
            Dict::PropKey => schema::META_PROP_KEY_SEQ,
            Dict::VecTag => schema::META_VEC_TAG_SEQ,
            Dict::Text => schema::META_TEXT_SEQ,
        }
    }

    pub(crate) const fn what(self) -> &'static str {
        match self {
            Dict::Label => "label",
            Dict::RelType => "relationship type",
            Dict::PropKey => "property key",
            Dict::VecTag => "vector tag",
            Dict::Text => "text",
        }
    }
}

/// Look up a name's id, if interned.
pub(crate) fn lookup_id(txn: &impl StorageRead, dict: Dict, name: &str) -> Result<Option<u32>> {
    match txn.get(dict.by_name_cf(), name.as_bytes())? {
        Some(bytes) => {
            if bytes.len() != 4 {
                return Err(Error::CorruptEncoding("interned id length"));
            }
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes);
            Ok(Some(u32::from_be_bytes(buf)))
        }
        None => Ok(None),
    }
}

/// Resolve an id back to its name. Unknown ids are a hard error.
pub(crate) fn lookup_name(txn: &impl StorageRead, dict: Dict, id: u32) -> Result<String> {
    let bytes = txn
        .get(dict.ids_cf(), &id.to_be_bytes())?
        .ok_or(Error::NotFound(dict.what()))?;
    String::from_utf8(bytes).map_err(|_| Error::CorruptEncoding("interned name not UTF-8"))
}

/// Resolve a name, allocating a new id when missing and allowed.
///
/// The fast path is a snapshot lookup. On a miss with `create_if_missing`,
/// a write transaction re-checks the mapping (another allocation may have
/// committed since the snapshot; the single-writer rule makes the re-check
/// race-safe), then assigns `id = seq + 1` and persists both mapping rows
/// atomically.
pub(crate) fn resolve_or_allocate(
    env: &Environment,
    dict: Dict,
    name: &str,
    create_if_missing: bool,
) -> Result<u32> {
    {
        let txn = env.read_txn();
        if let Some(id) = lookup_id(&txn, dict, name)? {
            return Ok(id);
        }
    }
    if !create_if_missing {
        return Err(Error::NotFound(dict.what()));
    }
    allocate(env, dict, name, None)
}

/// Vector-tag variant: optionally pins the tag's dim at creation time, in
/// the same transaction that allocates the id. A dim pinned here is
/// enforced by every later vector upsert.
pub(crate) fn resolve_or_allocate_vec_tag(
    env: &Environment,
    name: &str,
    create_if_missing: bool,
    dim: Option<u16>,
) -> Result<TagId> {
    {
        let txn = env.read_txn();
        if let Some(id) = lookup_id(&txn, Dict::VecTag, name)? {
            return Ok(id);
        }
    }
    if !create_if_missing {
        return Err(Error::NotFound(Dict::VecTag.what()));
    }
    allocate(env, Dict::VecTag, name, dim)
}

fn allocate(env: &Environment, dict: Dict, name: &str, vec_tag_dim: Option<u16>) -> Result<u32> {
    let txn = env.write_txn();
    if let Some(id) = lookup_id(&txn, dict, name)? {
        txn.abort()?;
        return Ok(id);
    }
    let id = bump_seq(&txn, dict.seq_key())? as u32;
    txn.put(dict.ids_cf(), &id.to_be_bytes(), name.as_bytes())?;
    txn.put(dict.by_name_cf(), name.as_bytes(), &id.to_be_bytes())?;
    if let Some(dim) = vec_tag_dim {
        let meta_key = VecTagMeta::key(id);
        if txn.get(VecTagMeta::CF_NAME, &meta_key)?.is_none() {
            txn.put(
                VecTagMeta::CF_NAME,
                &meta_key,
                &VecTagMeta::encode_dim(u32::from(dim)),
            )?;
        }
    }
    txn.commit()?;
    tracing::debug!(kind = dict.what(), name, id, "interned name");
    Ok(id)
}

// ============================================================================
// Adapter text-interning policy
// ============================================================================

/// Intern a wire text value. Non-empty text becomes `Value::TextId`;
/// the empty string stays a bytes value.
pub(crate) fn intern_text(env: &Environment, text: &str) -> Result<Value> {
    if text.is_empty() {
        return Ok(Value::Bytes(Vec::new()));
    }
    let id = resolve_or_allocate(env, Dict::Text, text, true)?;
    Ok(Value::TextId(id))
}

/// Intern a wire bytes value opportunistically: non-empty valid UTF-8
/// becomes `Value::TextId`; anything else stays bytes.
pub(crate) fn intern_bytes(env: &Environment, bytes: Vec<u8>) -> Result<Value> {
    if bytes.is_empty() {
        return Ok(Value::Bytes(bytes));
    }
    match String::from_utf8(bytes) {
        Ok(text) => {
            let id = resolve_or_allocate(env, Dict::Text, &text, true)?;
            Ok(Value::TextId(id))
        }
        Err(err) => Ok(Value::Bytes(err.into_bytes())),
    }
}

/// Expand an interned text value back to its string for the wire.
/// Non-text values yield `None`.
pub(crate) fn text_of(txn: &impl StorageRead, value: &Value) -> Result<Option<String>> {
    match value {
        Value::TextId(id) => Ok(Some(lookup_name(txn, Dict::Text, *id)?)),
        _ => Ok(None),
    }
}
