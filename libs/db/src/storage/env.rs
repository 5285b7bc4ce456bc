//! The environment: a process-owned database directory with a fixed set of
//! column families, producing read and write transactions.

use std::path::{Path, PathBuf};

use rocksdb::{Cache, Options, TransactionDB, TransactionDBOptions};

use crate::error::{Error, Result};
use crate::graph::schema;
use crate::storage::cf::BlockCacheConfig;
use crate::storage::txn::{ReadTxn, WriteTxn};

/// Environment configuration. Defaults are sized for an embedded store.
#[derive(Debug, Clone)]
pub struct Config {
    pub cache: BlockCacheConfig,
    /// Per-memtable write buffer size.
    pub write_buffer_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: BlockCacheConfig::default(),
            write_buffer_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Owns the backing `TransactionDB` and its column families.
///
/// The store supports many concurrent readers and one writer at a time;
/// the environment does not arbitrate. Callers must not open two write
/// transactions simultaneously, and concurrent processes must not open
/// the same directory.
pub struct Environment {
    db: TransactionDB,
    path: PathBuf,
}

impl Environment {
    /// Open (creating if missing) the database directory with defaults.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, Config::default())
    }

    /// Open with explicit configuration.
    pub fn open_with(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let cache = Cache::new_lru_cache(config.cache.cache_bytes);

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_bytes);
        let num_cpus = std::thread::available_parallelism()
            .map(|p| p.get() as i32)
            .unwrap_or(4);
        opts.increase_parallelism(num_cpus);

        let descriptors = schema::column_family_descriptors(&cache, &config.cache);
        let txn_db_opts = TransactionDBOptions::default();
        let db = TransactionDB::open_cf_descriptors(&opts, &txn_db_opts, &path, descriptors)?;

        tracing::debug!(path = %path.display(), "opened environment");
        Ok(Self { db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn db(&self) -> &TransactionDB {
        &self.db
    }

    /// Look up a column family handle opened at construction.
    pub(crate) fn cf(&self, name: &'static str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Backend(format!("column family missing: {name}")))
    }

    /// Begin a read transaction: a consistent snapshot, released on drop.
    pub fn read_txn(&self) -> ReadTxn<'_> {
        ReadTxn::new(self)
    }

    /// Begin a write transaction. Commit is explicit; dropping the
    /// transaction without committing rolls it back.
    pub fn write_txn(&self) -> WriteTxn<'_> {
        WriteTxn::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::cf::ColumnFamily;
    use crate::storage::txn::StorageRead;
    use tempfile::TempDir;

    #[test]
    fn open_creates_all_column_families() {
        let dir = TempDir::new().unwrap();
        let env = Environment::open(dir.path().join("db")).unwrap();
        for name in schema::ALL_COLUMN_FAMILIES {
            assert!(env.db.cf_handle(name).is_some(), "missing cf {name}");
        }
    }

    #[test]
    fn write_then_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let env = Environment::open(dir.path().join("db")).unwrap();

        let txn = env.write_txn();
        txn.put(schema::Meta::CF_NAME, b"probe", b"value").unwrap();
        txn.commit().unwrap();

        let txn = env.read_txn();
        let got = txn.get(schema::Meta::CF_NAME, b"probe").unwrap();
        assert_eq!(got.as_deref(), Some(b"value".as_slice()));
    }

    #[test]
    fn dropped_write_txn_rolls_back() {
        let dir = TempDir::new().unwrap();
        let env = Environment::open(dir.path().join("db")).unwrap();

        {
            let txn = env.write_txn();
            txn.put(schema::Meta::CF_NAME, b"probe", b"value").unwrap();
            // dropped without commit
        }

        let txn = env.read_txn();
        assert!(txn.get(schema::Meta::CF_NAME, b"probe").unwrap().is_none());
    }

    #[test]
    fn snapshot_is_isolated_from_later_commits() {
        let dir = TempDir::new().unwrap();
        let env = Environment::open(dir.path().join("db")).unwrap();

        let before = env.read_txn();

        let txn = env.write_txn();
        txn.put(schema::Meta::CF_NAME, b"probe", b"value").unwrap();
        txn.commit().unwrap();

        assert!(before
            .get(schema::Meta::CF_NAME, b"probe")
            .unwrap()
            .is_none());
        let after = env.read_txn();
        assert!(after.get(schema::Meta::CF_NAME, b"probe").unwrap().is_some());
    }
}
