//! Persistence gateway.
//!
//! Boards persist as one record per board id plus a separate board-order
//! key. The collection owns a gateway implementation and writes through it
//! after every mutation; entities never touch storage directly.

mod sqlite;

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::BoardRecord;

pub use sqlite::SqliteStore;

pub trait PersistenceGateway {
    fn put(&mut self, board_id: &str, record: &BoardRecord) -> Result<()>;
    fn get(&self, board_id: &str) -> Result<Option<BoardRecord>>;
    fn delete(&mut self, board_id: &str) -> Result<()>;
    fn put_order(&mut self, order: &[String]) -> Result<()>;
    /// The persisted board order; empty when nothing has been stored yet.
    fn get_order(&self) -> Result<Vec<String>>;
    /// Remove every board record and the order key.
    fn clear(&mut self) -> Result<()>;
}

/// In-memory gateway for tests and embedding. Records are stored in their
/// serialized form so reads exercise the same decode path as the sqlite
/// backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, String>,
    order: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceGateway for MemoryStore {
    fn put(&mut self, board_id: &str, record: &BoardRecord) -> Result<()> {
        let serialized =
            serde_json::to_string(record).map_err(|err| Error::Persistence(err.to_string()))?;
        self.records.insert(board_id.to_string(), serialized);
        Ok(())
    }

    fn get(&self, board_id: &str) -> Result<Option<BoardRecord>> {
        let Some(serialized) = self.records.get(board_id) else {
            return Ok(None);
        };
        let record = serde_json::from_str(serialized)
            .map_err(|err| Error::Persistence(format!("corrupt record for {board_id}: {err}")))?;
        Ok(Some(record))
    }

    fn delete(&mut self, board_id: &str) -> Result<()> {
        self.records.remove(board_id);
        Ok(())
    }

    fn put_order(&mut self, order: &[String]) -> Result<()> {
        self.order = order.to_vec();
        Ok(())
    }

    fn get_order(&self) -> Result<Vec<String>> {
        Ok(self.order.clone())
    }

    fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.order.clear();
        Ok(())
    }
}
