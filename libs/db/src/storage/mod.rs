//! Storage infrastructure: the RocksDB environment, column family traits,
//! and transaction wrappers.

pub(crate) mod cf;
mod env;
mod txn;

pub use cf::{BlockCacheConfig, ColumnFamily};
pub use env::{Config, Environment};
pub use txn::{ReadTxn, StorageRead, WriteTxn};
