//! aster-db: an embeddable hybrid graph + vector database.
//!
//! Nodes carry labels, hot/cold key-value properties, and tagged float32
//! vectors; directed typed edges carry properties. Queries cover identity
//! lookups, adjacency filtered on direction/type/neighbor labels, label
//! scans, degree, and exact cosine k-nearest-neighbor search.
//!
//! Everything is stored in a RocksDB `TransactionDB` under a fixed set of
//! column families with big-endian composite keys, so lexicographic byte
//! order equals logical order and every range query is a prefix walk.
//!
//! ```no_run
//! use std::sync::Arc;
//! use aster_db::{Environment, Store};
//! use aster_db::graph::CreateNode;
//!
//! # fn main() -> aster_db::Result<()> {
//! let env = Arc::new(Environment::open("/var/lib/aster")?);
//! let store = Store::new(env);
//!
//! let label = store.get_or_create_label_id("person", true)?;
//! let (id, _header) = store.create_node(&CreateNode {
//!     labels: vec![label],
//!     ..Default::default()
//! })?;
//! assert!(id > 0);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod graph;
pub mod storage;

pub use codec::{NodeHeader, Property, Value};
pub use error::{Error, Result};
pub use graph::{EdgeRef, Store, TaggedVector, VectorF32};
pub use storage::{Config, Environment, ReadTxn, StorageRead, WriteTxn};

/// Node identifier: strictly increasing, never reused; 0 is "none".
pub type NodeId = u64;
/// Edge identifier: strictly increasing, never reused; 0 is "none".
pub type EdgeId = u64;
/// Interned label id.
pub type LabelId = u32;
/// Interned relationship type id.
pub type RelTypeId = u32;
/// Interned property key id.
pub type PropKeyId = u32;
/// Interned vector tag id.
pub type TagId = u32;
/// Interned text value id.
pub type TextId = u32;
