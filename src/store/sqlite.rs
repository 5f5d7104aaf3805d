//! Sqlite-backed persistence gateway.
//!
//! One key-value table for board records plus a positional table for the
//! board order. Records are stored as JSON text so the on-disk shape stays
//! identical to the export format.

use std::{fs, path::Path};

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Error, Result};
use crate::store::PersistenceGateway;
use crate::types::BoardRecord;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();

        if path_ref != Path::new(":memory:")
            && let Some(parent) = path_ref.parent()
        {
            fs::create_dir_all(parent).map_err(|err| {
                Error::Persistence(format!(
                    "failed to create parent directories for {}: {err}",
                    path_ref.display()
                ))
            })?;
        }

        let conn = Connection::open(path_ref).map_err(|err| {
            Error::Persistence(format!(
                "failed to open sqlite db at {}: {err}",
                path_ref.display()
            ))
        })?;

        let store = Self { conn };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS boards (
                    id TEXT PRIMARY KEY,
                    record TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS board_order (
                    position INTEGER PRIMARY KEY,
                    board_id TEXT NOT NULL
                );",
            )
            .map_err(|err| Error::Persistence(format!("failed to run migrations: {err}")))?;
        Ok(())
    }
}

impl PersistenceGateway for SqliteStore {
    fn put(&mut self, board_id: &str, record: &BoardRecord) -> Result<()> {
        let serialized =
            serde_json::to_string(record).map_err(|err| Error::Persistence(err.to_string()))?;
        self.conn.execute(
            "INSERT INTO boards (id, record) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET record = excluded.record",
            params![board_id, serialized],
        )?;
        Ok(())
    }

    fn get(&self, board_id: &str) -> Result<Option<BoardRecord>> {
        let serialized: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM boards WHERE id = ?1",
                params![board_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(serialized) = serialized else {
            return Ok(None);
        };
        let record = serde_json::from_str(&serialized)
            .map_err(|err| Error::Persistence(format!("corrupt record for {board_id}: {err}")))?;
        Ok(Some(record))
    }

    fn delete(&mut self, board_id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM boards WHERE id = ?1", params![board_id])?;
        Ok(())
    }

    fn put_order(&mut self, order: &[String]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM board_order", params![])?;
        for (position, board_id) in order.iter().enumerate() {
            tx.execute(
                "INSERT INTO board_order (position, board_id) VALUES (?1, ?2)",
                params![position as i64, board_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_order(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT board_id FROM board_order ORDER BY position ASC")?;
        let order = stmt
            .query_map(params![], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(order)
    }

    fn clear(&mut self) -> Result<()> {
        self.conn
            .execute_batch("DELETE FROM boards; DELETE FROM board_order;")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoryRecord, TaskRecord};

    fn sample_record(id: &str) -> BoardRecord {
        BoardRecord {
            id: id.to_string(),
            board_name: "Work".to_string(),
            board_color_index: Some(0),
            categories: vec![CategoryRecord {
                id: "category-1".to_string(),
                name: "To Do".to_string(),
                tasks: vec![TaskRecord {
                    id: "task-1".to_string(),
                    text: "write report".to_string(),
                    sub_tasks: vec![],
                }],
            }],
        }
    }

    #[test]
    fn test_put_get_round_trip() {
        let mut store = SqliteStore::open_in_memory().expect("store should open");
        let record = sample_record("board-1");

        store.put("board-1", &record).expect("put should succeed");
        assert_eq!(
            store.get("board-1").expect("get should succeed"),
            Some(record.clone())
        );

        // overwrite replaces the record
        let mut updated = record;
        updated.board_name = "Home".to_string();
        store.put("board-1", &updated).expect("put should succeed");
        assert_eq!(
            store
                .get("board-1")
                .expect("get should succeed")
                .map(|r| r.board_name),
            Some("Home".to_string())
        );
    }

    #[test]
    fn test_get_missing_board_is_none() {
        let store = SqliteStore::open_in_memory().expect("store should open");
        assert_eq!(store.get("board-gone").expect("get should succeed"), None);
    }

    #[test]
    fn test_order_round_trip_and_replacement() {
        let mut store = SqliteStore::open_in_memory().expect("store should open");
        assert!(store.get_order().expect("order should load").is_empty());

        let order = vec!["board-2".to_string(), "board-1".to_string()];
        store.put_order(&order).expect("order should save");
        assert_eq!(store.get_order().expect("order should load"), order);

        let shorter = vec!["board-1".to_string()];
        store.put_order(&shorter).expect("order should save");
        assert_eq!(store.get_order().expect("order should load"), shorter);
    }

    #[test]
    fn test_delete_and_clear() {
        let mut store = SqliteStore::open_in_memory().expect("store should open");
        store
            .put("board-1", &sample_record("board-1"))
            .expect("put should succeed");
        store
            .put("board-2", &sample_record("board-2"))
            .expect("put should succeed");
        store
            .put_order(&["board-1".to_string(), "board-2".to_string()])
            .expect("order should save");

        store.delete("board-1").expect("delete should succeed");
        assert_eq!(store.get("board-1").expect("get should succeed"), None);
        assert!(store.get("board-2").expect("get should succeed").is_some());

        store.clear().expect("clear should succeed");
        assert_eq!(store.get("board-2").expect("get should succeed"), None);
        assert!(store.get_order().expect("order should load").is_empty());
    }

    #[test]
    fn test_creates_parent_directories() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("nested").join("boards.sqlite");
        let _store = SqliteStore::open(&path).expect("store should open");
        assert!(path.exists());
    }
}
