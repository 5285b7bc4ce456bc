//! Column family trait and shared option builders.
//!
//! Each column family is represented by a marker struct in the graph schema
//! implementing [`ColumnFamily`]. Options are built from a shared LRU block
//! cache so the whole environment stays within one memory budget.

use rocksdb::{BlockBasedOptions, Cache, Options, SliceTransform};

/// Base marker trait for column family types. `CF_NAME` is the single
/// source of truth for the family name.
pub trait ColumnFamily {
    /// Column family name (with prefix, e.g. `graph/nodes`, `dict/label_ids`).
    const CF_NAME: &'static str;
}

/// Sizing knobs for the shared block cache.
#[derive(Debug, Clone)]
pub struct BlockCacheConfig {
    /// Total LRU block cache capacity shared by every column family.
    pub cache_bytes: usize,
    /// Block size for data blocks.
    pub block_size: usize,
    /// Keep index and filter blocks in the block cache.
    pub cache_index_and_filter_blocks: bool,
}

impl Default for BlockCacheConfig {
    fn default() -> Self {
        Self {
            cache_bytes: 64 * 1024 * 1024,
            block_size: 4 * 1024,
            cache_index_and_filter_blocks: true,
        }
    }
}

fn base_block_opts(cache: &Cache, config: &BlockCacheConfig) -> BlockBasedOptions {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_cache(cache);
    block_opts.set_block_size(config.block_size);
    if config.cache_index_and_filter_blocks {
        block_opts.set_cache_index_and_filter_blocks(true);
        block_opts.set_pin_l0_filter_and_index_blocks_in_cache(true);
    }
    block_opts
}

/// Options for point-lookup families (nodes, edges-by-id, dictionaries,
/// meta): bloom filter for fast negative lookups.
pub(crate) fn point_lookup_options(cache: &Cache, config: &BlockCacheConfig) -> Options {
    let mut opts = Options::default();
    let mut block_opts = base_block_opts(cache, config);
    block_opts.set_bloom_filter(10.0, false);
    opts.set_block_based_table_factory(&block_opts);
    opts
}

/// Options for range-scanned families. `prefix_len` installs a fixed-prefix
/// extractor so scans over one owner (node, edge, label) stay prefix-local;
/// pass `None` for families that are also scanned end to end.
pub(crate) fn range_scan_options(
    cache: &Cache,
    config: &BlockCacheConfig,
    prefix_len: Option<usize>,
) -> Options {
    let mut opts = Options::default();
    let block_opts = base_block_opts(cache, config);
    opts.set_block_based_table_factory(&block_opts);
    if let Some(len) = prefix_len {
        opts.set_prefix_extractor(SliceTransform::create_fixed_prefix(len));
        opts.set_memtable_prefix_bloom_ratio(0.2);
    }
    opts
}
