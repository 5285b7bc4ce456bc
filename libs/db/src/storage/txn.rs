//! Read and write transaction wrappers.
//!
//! A [`ReadTxn`] is a snapshot: it observes the state of the database at
//! the moment it was opened and is released on drop. A [`WriteTxn`] wraps
//! a RocksDB transaction with read-your-writes semantics; commit is
//! explicit and any non-commit exit path rolls back.

use rocksdb::{Direction, IteratorMode, SnapshotWithThreadMode, Transaction, TransactionDB};

use crate::error::{Error, Result};
use crate::storage::env::Environment;

/// Read access shared by both transaction kinds.
///
/// `scan_from` is the cursor primitive: seek to `start`, then walk forward
/// while the visitor returns `true`. The canonical prefix walk seeds
/// `start` with the fixed-width prefix and stops when the key no longer
/// begins with it.
pub trait StorageRead {
    fn get(&self, cf: &'static str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn scan_from(
        &self,
        cf: &'static str,
        start: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool>,
    ) -> Result<()>;
}

// ============================================================================
// ReadTxn
// ============================================================================

/// A read-only snapshot transaction. Auto-released on drop.
pub struct ReadTxn<'e> {
    snapshot: SnapshotWithThreadMode<'e, TransactionDB>,
    env: &'e Environment,
}

impl<'e> ReadTxn<'e> {
    pub(crate) fn new(env: &'e Environment) -> Self {
        Self {
            snapshot: env.db().snapshot(),
            env,
        }
    }
}

impl StorageRead for ReadTxn<'_> {
    fn get(&self, cf: &'static str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let handle = self.env.cf(cf)?;
        Ok(self.snapshot.get_cf(handle, key)?)
    }

    fn scan_from(
        &self,
        cf: &'static str,
        start: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool>,
    ) -> Result<()> {
        let handle = self.env.cf(cf)?;
        let iter = self
            .snapshot
            .iterator_cf(handle, IteratorMode::From(start, Direction::Forward));
        for item in iter {
            let (key, value) = item?;
            if !visit(&key, &value)? {
                break;
            }
        }
        Ok(())
    }
}

// ============================================================================
// WriteTxn
// ============================================================================

/// A read-write transaction. `Active → (Committed | Aborted)`: commit and
/// abort consume the handle; an interior handle that was already taken
/// surfaces [`Error::TxnClosed`]. Dropping an active transaction rolls it
/// back.
pub struct WriteTxn<'e> {
    txn: Option<Transaction<'e, TransactionDB>>,
    env: &'e Environment,
}

impl<'e> WriteTxn<'e> {
    pub(crate) fn new(env: &'e Environment) -> Self {
        Self {
            txn: Some(env.db().transaction()),
            env,
        }
    }

    fn txn(&self) -> Result<&Transaction<'e, TransactionDB>> {
        self.txn.as_ref().ok_or(Error::TxnClosed)
    }

    pub fn put(&self, cf: &'static str, key: &[u8], value: &[u8]) -> Result<()> {
        let handle = self.env.cf(cf)?;
        self.txn()?.put_cf(handle, key, value)?;
        Ok(())
    }

    /// Delete a key. Absent keys are not an error.
    pub fn delete(&self, cf: &'static str, key: &[u8]) -> Result<()> {
        let handle = self.env.cf(cf)?;
        self.txn()?.delete_cf(handle, key)?;
        Ok(())
    }

    /// Commit all writes atomically.
    pub fn commit(mut self) -> Result<()> {
        let txn = self.txn.take().ok_or(Error::TxnClosed)?;
        txn.commit()?;
        Ok(())
    }

    /// Roll back all writes.
    pub fn abort(mut self) -> Result<()> {
        let txn = self.txn.take().ok_or(Error::TxnClosed)?;
        txn.rollback()?;
        Ok(())
    }
}

impl StorageRead for WriteTxn<'_> {
    /// Reads observe uncommitted writes of this transaction.
    fn get(&self, cf: &'static str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let handle = self.env.cf(cf)?;
        Ok(self.txn()?.get_cf(handle, key)?)
    }

    fn scan_from(
        &self,
        cf: &'static str,
        start: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool>,
    ) -> Result<()> {
        let handle = self.env.cf(cf)?;
        let iter = self
            .txn()?
            .iterator_cf(handle, IteratorMode::From(start, Direction::Forward));
        for item in iter {
            let (key, value) = item?;
            if !visit(&key, &value)? {
                break;
            }
        }
        Ok(())
    }
}

impl Drop for WriteTxn<'_> {
    fn drop(&mut self) {
        // RocksDB rolls the inner transaction back when it is dropped
        // uncommitted; nothing else to release here.
        if self.txn.is_some() {
            tracing::debug!("write transaction dropped without commit, rolling back");
        }
    }
}
