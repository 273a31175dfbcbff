//! RocksDB storage layer backing durable account wallets

use crate::errors::{EngineResult, StorageError};
use rocksdb::{Options, DB};
use std::path::Path;
use std::sync::Arc;

/// Thin, cloneable handle over a RocksDB instance.
///
/// All calls block; async callers run them on `spawn_blocking`.
#[derive(Clone)]
pub struct WalletDb {
    db: Arc<DB>,
}

impl WalletDb {
    /// Open (or create) the database at `path`, optionally wiping it first
    pub fn open<P: AsRef<Path>>(path: P, clear_on_start: bool) -> EngineResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(16 * 1024 * 1024);
        opts.set_max_write_buffer_number(2);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        if clear_on_start && path.as_ref().exists() {
            DB::destroy(&opts, path.as_ref())
                .map_err(|e| StorageError::DatabaseOpenFailed(format!("clear failed: {}", e)))?;
        }

        let db = DB::open(&opts, path).map_err(|e| StorageError::DatabaseOpenFailed(e.to_string()))?;
        Ok(Self { db: Arc::new(db) })
    }

    pub fn get(&self, key: &[u8]) -> EngineResult<Option<Vec<u8>>> {
        self.db
            .get(key)
            .map_err(|e| StorageError::ReadFailed(e.to_string()).into())
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> EngineResult<()> {
        self.db.put(key, value)?;
        Ok(())
    }
}
