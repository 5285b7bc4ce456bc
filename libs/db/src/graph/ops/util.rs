//! Shared helpers for graph ops: meta sequences and label-set utilities.

use crate::error::Result;
use crate::graph::schema::{self, Meta};
use crate::storage::{ColumnFamily, StorageRead, WriteTxn};

/// Sort ascending and drop duplicates in place.
pub(crate) fn sort_unique(ids: &mut Vec<u32>) {
    ids.sort_unstable();
    ids.dedup();
}

/// True when `have` (sorted ascending) contains every id in `need`
/// (sorted ascending).
pub(crate) fn labels_contains_all(have: &[u32], need: &[u32]) -> bool {
    if need.is_empty() {
        return true;
    }
    let mut i = 0;
    let mut j = 0;
    while i < have.len() && j < need.len() {
        if have[i] < need[j] {
            i += 1;
        } else if have[i] == need[j] {
            i += 1;
            j += 1;
        } else {
            return false;
        }
    }
    j == need.len()
}

/// Initialize the schema version to 1 the first time any sequence is
/// touched. The version never decreases afterwards.
pub(crate) fn ensure_schema_version(txn: &WriteTxn<'_>) -> Result<()> {
    if txn.get(Meta::CF_NAME, schema::META_SCHEMA_VERSION)?.is_none() {
        txn.put(
            Meta::CF_NAME,
            schema::META_SCHEMA_VERSION,
            &schema::SCHEMA_VERSION_INITIAL.to_be_bytes(),
        )?;
    }
    Ok(())
}

/// Allocate the next value of a meta sequence: read, add one, write back
/// in the same transaction. Identifiers are therefore strictly increasing
/// and never reused; 0 is never handed out.
pub(crate) fn bump_seq(txn: &WriteTxn<'_>, key: &'static [u8]) -> Result<u64> {
    ensure_schema_version(txn)?;
    let current = match txn.get(Meta::CF_NAME, key)? {
        Some(bytes) if bytes.len() == 8 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes);
            u64::from_be_bytes(buf)
        }
        _ => 0,
    };
    let next = current + 1;
    txn.put(Meta::CF_NAME, key, &next.to_be_bytes())?;
    Ok(next)
}
