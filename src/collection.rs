//! BoardCollection: the ordered list of boards, board lifecycle, color
//! assignment, import/export, and persistence orchestration.
//!
//! All mutations flow through the collection so that every operation ends
//! with exactly one write of the affected board record (plus the order key
//! when the board list itself changed). Drag-surface events land here as
//! the `apply_*` and `move_task` handlers; stale ids in those paths degrade
//! to no-ops instead of raising.

use rand::Rng;
use tracing::debug;

use crate::board::Board;
use crate::error::{Error, Result};
use crate::id::{self, IdKind};
use crate::order::reconcile_by_ids;
use crate::store::PersistenceGateway;
use crate::types::BoardRecord;

/// Shipped board color palette. A single entry, so the exclude-last filter
/// in [`BoardCollection::select_color`] always empties and falls back to
/// the unrestricted pick.
pub const DEFAULT_PALETTE: [&str; 1] = ["#edeae1"];

pub struct BoardCollection<S> {
    store: S,
    boards: Vec<Board>,
    palette: Vec<String>,
    last_color_index: Option<usize>,
}

impl<S: PersistenceGateway> BoardCollection<S> {
    /// Start with an empty collection, ignoring anything in the store.
    pub fn new(store: S, palette: Vec<String>) -> Self {
        Self {
            store,
            boards: Vec::new(),
            palette: non_empty_palette(palette),
            last_color_index: None,
        }
    }

    /// Rebuild the collection from the persisted board order. Ids in the
    /// order with no stored record are skipped.
    pub fn load(store: S, palette: Vec<String>) -> Result<Self> {
        let mut collection = Self::new(store, palette);
        for board_id in collection.store.get_order()? {
            let Some(record) = collection.store.get(&board_id)? else {
                continue;
            };
            if let Some(index) = record.board_color_index {
                collection.last_color_index = Some(index);
            }
            let name = record.board_name.clone();
            collection.create_board_internal(name, Some(board_id), Some(&record), false, false)?;
        }
        Ok(collection)
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn board(&self, board_id: &str) -> Option<&Board> {
        self.boards.iter().find(|board| board.id == board_id)
    }

    /// The palette color a board renders with, `None` when its recorded
    /// index points outside the configured palette.
    pub fn color_of(&self, board: &Board) -> Option<&str> {
        self.palette.get(board.color_index).map(String::as_str)
    }

    pub fn create_board(&mut self, name: &str) -> Result<String> {
        self.create_board_internal(name.trim().to_string(), None, None, false, true)
    }

    pub fn rename_board(&mut self, board_id: &str, name: &str) -> Result<()> {
        self.board_mut(board_id)?.rename(name);
        self.persist_board(board_id)
    }

    pub fn delete_board(&mut self, board_id: &str) -> Result<()> {
        let position = self
            .boards
            .iter()
            .position(|board| board.id == board_id)
            .ok_or_else(|| Error::not_found("board", board_id))?;
        self.boards.remove(position);
        self.store.delete(board_id)?;
        self.persist_order()
    }

    /// Deep-copy a board under a new identity: the clone gets " (Copy)"
    /// appended to its name and fresh ids for the board and every
    /// descendant category, task, and sub-task.
    pub fn copy_board(&mut self, board_id: &str) -> Result<String> {
        let source = self
            .board(board_id)
            .ok_or_else(|| Error::not_found("board", board_id))?;
        let source_record = source.to_record();
        // flush the source before cloning so the copy starts from saved state
        self.store.put(board_id, &source_record)?;

        let mut copied = source_record;
        copied.board_name.push_str(" (Copy)");
        regenerate_ids(&mut copied);

        let name = copied.board_name.clone();
        self.create_board_internal(name, None, Some(&copied), true, true)
    }

    /// Re-derive the board order from a drag report and persist it.
    pub fn apply_board_order(&mut self, reported: &[String]) -> Result<()> {
        reconcile_by_ids(&mut self.boards, reported, |board| board.id.as_str());
        self.persist_order()
    }

    pub fn add_category(&mut self, board_id: &str, name: &str) -> Result<String> {
        let category_id = self.board_mut(board_id)?.add_category(name)?;
        self.persist_board(board_id)?;
        Ok(category_id)
    }

    pub fn rename_category(
        &mut self,
        board_id: &str,
        category_id: &str,
        name: &str,
    ) -> Result<()> {
        self.board_mut(board_id)?
            .category_mut(category_id)
            .ok_or_else(|| Error::not_found("category", category_id))?
            .rename(name)?;
        self.persist_board(board_id)
    }

    /// Delete a category and everything it contains.
    pub fn delete_category(&mut self, board_id: &str, category_id: &str) -> Result<()> {
        self.board_mut(board_id)?.remove_category(category_id)?;
        self.persist_board(board_id)
    }

    pub fn apply_category_order(&mut self, board_id: &str, reported: &[String]) -> Result<()> {
        let Some(board) = self.boards.iter_mut().find(|b| b.id == board_id) else {
            debug!(board_id, "ignoring category reorder for unknown board");
            return Ok(());
        };
        board.reorder_categories(reported);
        self.persist_board(board_id)
    }

    /// Create a task in a category. Only the inbox category accepts this.
    pub fn add_task(&mut self, board_id: &str, category_id: &str, text: &str) -> Result<String> {
        let task_id = self
            .board_mut(board_id)?
            .category_mut(category_id)
            .ok_or_else(|| Error::not_found("category", category_id))?
            .add_task(text)?;
        self.persist_board(board_id)?;
        Ok(task_id)
    }

    /// Edit task text. Applies to top-level tasks and sub-tasks alike.
    pub fn rename_task(&mut self, board_id: &str, task_id: &str, text: &str) -> Result<()> {
        self.board_mut(board_id)?
            .task_by_id_mut(task_id)
            .ok_or_else(|| Error::not_found("task", task_id))?
            .rename(text);
        self.persist_board(board_id)
    }

    /// Delete a task or sub-task, detaching it from its owner. A deleted
    /// task takes its sub-tasks with it.
    pub fn delete_task(&mut self, board_id: &str, task_id: &str) -> Result<()> {
        let board = self.board_mut(board_id)?;

        let mut removed = false;
        'search: for category in &mut board.categories {
            if category.remove_task(task_id).is_some() {
                removed = true;
                break;
            }
            for task in &mut category.tasks {
                if task.remove_sub_task(task_id).is_some() {
                    removed = true;
                    break 'search;
                }
            }
        }

        if !removed {
            return Err(Error::not_found("task", task_id));
        }
        self.persist_board(board_id)
    }

    pub fn add_sub_task(&mut self, board_id: &str, task_id: &str, text: &str) -> Result<String> {
        let sub_task_id = self
            .board_mut(board_id)?
            .task_by_id_mut(task_id)
            .ok_or_else(|| Error::not_found("task", task_id))?
            .add_sub_task(text)?;
        self.persist_board(board_id)?;
        Ok(sub_task_id)
    }

    pub fn apply_task_order(
        &mut self,
        board_id: &str,
        category_id: &str,
        reported: &[String],
    ) -> Result<()> {
        let Some(board) = self.boards.iter_mut().find(|b| b.id == board_id) else {
            debug!(board_id, "ignoring task reorder for unknown board");
            return Ok(());
        };
        let Some(category) = board.category_mut(category_id) else {
            debug!(category_id, "ignoring task reorder for unknown category");
            return Ok(());
        };
        category.reorder_tasks(reported);
        self.persist_board(board_id)
    }

    pub fn apply_sub_task_order(
        &mut self,
        board_id: &str,
        task_id: &str,
        reported: &[String],
    ) -> Result<()> {
        let Some(board) = self.boards.iter_mut().find(|b| b.id == board_id) else {
            debug!(board_id, "ignoring sub-task reorder for unknown board");
            return Ok(());
        };
        let Some(task) = board.task_by_id_mut(task_id) else {
            debug!(task_id, "ignoring sub-task reorder for unknown task");
            return Ok(());
        };
        task.reorder_sub_tasks(reported);
        self.persist_board(board_id)
    }

    /// A task identity was dropped into a different category at `index`.
    /// Detach from the source, attach to the destination, update the
    /// category back-references, and persist once. Stale ids (deleted
    /// tasks, sub-task identities, vanished containers) make the whole
    /// event a no-op.
    pub fn move_task(
        &mut self,
        board_id: &str,
        task_id: &str,
        dest_category_id: &str,
        index: usize,
    ) -> Result<()> {
        let Some(board) = self.boards.iter_mut().find(|b| b.id == board_id) else {
            debug!(board_id, "ignoring move for unknown board");
            return Ok(());
        };
        if board.category(dest_category_id).is_none() {
            debug!(dest_category_id, "ignoring move to unknown category");
            return Ok(());
        }
        // sub-task ids resolve through task_by_id but never sit in a
        // top-level list, so category_by_task filters them out here
        let Some(source) = board.category_by_task(task_id) else {
            debug!(task_id, "ignoring move for unknown or nested task");
            return Ok(());
        };
        let source_category_id = source.id.clone();

        let Some(task) = board
            .category_mut(&source_category_id)
            .and_then(|category| category.remove_task(task_id))
        else {
            return Ok(());
        };

        match board.category_mut(dest_category_id) {
            Some(destination) => destination.insert_task(task, index),
            None => {
                if let Some(source) = board.category_mut(&source_category_id) {
                    source.insert_task(task, 0);
                }
            }
        }

        self.persist_board(board_id)
    }

    /// Serialize every board, in order, to a JSON array. Pure read.
    pub fn export_all(&self, pretty: bool) -> Result<String> {
        let records: Vec<BoardRecord> = self.boards.iter().map(Board::to_record).collect();
        let json = if pretty {
            serde_json::to_string_pretty(&records)
        } else {
            serde_json::to_string(&records)
        };
        json.map_err(|err| Error::Persistence(err.to_string()))
    }

    /// Replace everything with the boards in an exported document. The
    /// document is parsed in full before any state is touched; parse and
    /// shape failures leave the collection and the store intact. Imported
    /// ids are preserved.
    pub fn import_all(&mut self, json: &str) -> Result<usize> {
        let records: Vec<BoardRecord> =
            serde_json::from_str(json).map_err(|err| Error::Import(err.to_string()))?;

        // the destructive step; everything after this rebuilds from records
        self.store.clear()?;
        self.boards.clear();

        for record in &records {
            self.create_board_internal(record.board_name.clone(), None, Some(record), false, true)?;
        }
        self.persist_order()?;
        Ok(records.len())
    }

    /// Drop every board, persisted and in-memory.
    pub fn clear_all(&mut self) -> Result<()> {
        self.store.clear()?;
        self.boards.clear();
        Ok(())
    }

    /// Resolve an id (explicit → imported non-copy → generated) and a color
    /// index, construct the board, load record data into it, and append.
    fn create_board_internal(
        &mut self,
        name: String,
        explicit_id: Option<String>,
        record: Option<&BoardRecord>,
        is_copy: bool,
        persist: bool,
    ) -> Result<String> {
        let board_id = match explicit_id {
            Some(board_id) => board_id,
            None => match record {
                Some(record) if !is_copy => record.id.clone(),
                _ => id::new_id(IdKind::Board),
            },
        };

        let color_index = self.select_color(record, is_copy);
        let mut board = Board::new(board_id.clone(), name, color_index);
        if let Some(record) = record {
            board.load_record(record);
        }

        let stored = board.to_record();
        self.boards.push(board);

        if persist {
            self.store.put(&board_id, &stored)?;
            self.persist_order()?;
        }
        Ok(board_id)
    }

    /// Pick a color index. Fresh boards and copies roll a random index,
    /// avoiding an immediate repeat of the last pick when the palette
    /// allows it; loaded records reuse their recorded index; records
    /// without one default to the first entry.
    fn select_color(&mut self, record: Option<&BoardRecord>, is_copy: bool) -> usize {
        if is_copy || record.is_none() {
            let mut rng = rand::rng();
            let available: Vec<usize> = (0..self.palette.len())
                .filter(|&index| Some(index) != self.last_color_index)
                .collect();
            let index = if available.is_empty() {
                rng.random_range(0..self.palette.len())
            } else {
                available[rng.random_range(0..available.len())]
            };
            self.last_color_index = Some(index);
            index
        } else if let Some(index) = record.and_then(|record| record.board_color_index) {
            index
        } else {
            0
        }
    }

    fn board_mut(&mut self, board_id: &str) -> Result<&mut Board> {
        self.boards
            .iter_mut()
            .find(|board| board.id == board_id)
            .ok_or_else(|| Error::not_found("board", board_id))
    }

    fn persist_board(&mut self, board_id: &str) -> Result<()> {
        let record = self
            .board(board_id)
            .map(Board::to_record)
            .ok_or_else(|| Error::not_found("board", board_id))?;
        self.store.put(board_id, &record)
    }

    fn persist_order(&mut self) -> Result<()> {
        let order: Vec<String> = self.boards.iter().map(|board| board.id.clone()).collect();
        self.store.put_order(&order)
    }
}

fn non_empty_palette(palette: Vec<String>) -> Vec<String> {
    if palette.is_empty() {
        DEFAULT_PALETTE.iter().map(|color| color.to_string()).collect()
    } else {
        palette
    }
}

/// Give a cloned record subtree a fresh identity at every level.
fn regenerate_ids(record: &mut BoardRecord) {
    record.id = id::new_id(IdKind::Board);
    for category in &mut record.categories {
        category.id = id::new_id(IdKind::Category);
        for task in &mut category.tasks {
            task.id = id::new_id(IdKind::Task);
            for sub_task in &mut task.sub_tasks {
                sub_task.id = id::new_id(IdKind::Task);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::HashSet;

    fn collection() -> BoardCollection<MemoryStore> {
        BoardCollection::new(MemoryStore::new(), Vec::new())
    }

    fn board_with_content(collection: &mut BoardCollection<MemoryStore>) -> String {
        let board_id = collection.create_board("Work").expect("board created");
        let inbox_id = collection
            .board(&board_id)
            .and_then(|b| b.inbox())
            .expect("inbox exists")
            .id
            .clone();
        let task_id = collection
            .add_task(&board_id, &inbox_id, "write report")
            .expect("task created");
        collection
            .add_sub_task(&board_id, &task_id, "collect numbers")
            .expect("sub-task created");
        board_id
    }

    fn all_ids(record: &BoardRecord) -> HashSet<String> {
        let mut ids = HashSet::new();
        ids.insert(record.id.clone());
        for category in &record.categories {
            ids.insert(category.id.clone());
            for task in &category.tasks {
                ids.insert(task.id.clone());
                for sub_task in &task.sub_tasks {
                    ids.insert(sub_task.id.clone());
                }
            }
        }
        ids
    }

    #[test]
    fn test_create_board_persists_record_and_order() {
        let mut collection = collection();
        let board_id = collection.create_board("Work").expect("board created");

        let store = &collection.store;
        assert!(store.get(&board_id).expect("get works").is_some());
        assert_eq!(store.get_order().expect("order loads"), vec![board_id]);
    }

    #[test]
    fn test_single_entry_palette_always_picks_index_zero() {
        let mut collection = collection();
        let first = collection.create_board("One").expect("board created");
        let second = collection.create_board("Two").expect("board created");

        // the exclude-last filter empties on a one-color palette and the
        // fallback pick must not fail
        assert_eq!(collection.board(&first).map(|b| b.color_index), Some(0));
        assert_eq!(collection.board(&second).map(|b| b.color_index), Some(0));
    }

    #[test]
    fn test_copy_board_regenerates_every_id_and_keeps_structure() {
        let mut collection = collection();
        let board_id = board_with_content(&mut collection);
        let copy_id = collection.copy_board(&board_id).expect("copy created");

        let original = collection.board(&board_id).expect("original exists");
        let copy = collection.board(&copy_id).expect("copy exists");

        assert_eq!(copy.name, "Work (Copy)");
        let original_ids = all_ids(&original.to_record());
        let copy_ids = all_ids(&copy.to_record());
        assert!(original_ids.is_disjoint(&copy_ids));

        let original_names: Vec<&str> =
            original.categories.iter().map(|c| c.name.as_str()).collect();
        let copy_names: Vec<&str> = copy.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(original_names, copy_names);
        assert_eq!(
            copy.categories[0].tasks[0].text,
            original.categories[0].tasks[0].text
        );
        assert_eq!(copy.categories[0].tasks[0].sub_tasks.len(), 1);
    }

    #[test]
    fn test_move_task_between_categories() {
        let mut collection = collection();
        let board_id = board_with_content(&mut collection);
        let (task_id, in_progress_id, inbox_id) = {
            let board = collection.board(&board_id).expect("board exists");
            (
                board.categories[0].tasks[0].id.clone(),
                board.categories[1].id.clone(),
                board.categories[0].id.clone(),
            )
        };

        collection
            .move_task(&board_id, &task_id, &in_progress_id, 0)
            .expect("move succeeds");

        let board = collection.board(&board_id).expect("board exists");
        assert!(board.category(&inbox_id).expect("inbox exists").tasks.is_empty());
        let moved = &board.category(&in_progress_id).expect("dest exists").tasks[0];
        assert_eq!(moved.id, task_id);
        assert_eq!(moved.category_id, in_progress_id);
        assert!(moved
            .sub_tasks
            .iter()
            .all(|sub_task| sub_task.category_id == in_progress_id));
    }

    #[test]
    fn test_move_task_stale_ids_are_no_ops() {
        let mut collection = collection();
        let board_id = board_with_content(&mut collection);
        let board = collection.board(&board_id).expect("board exists");
        let in_progress_id = board.categories[1].id.clone();
        let sub_task_id = board.categories[0].tasks[0].sub_tasks[0].id.clone();

        // deleted/unknown task id
        collection
            .move_task(&board_id, "task-gone", &in_progress_id, 0)
            .expect("stale task id is a no-op");
        // sub-task identity must never cross containers
        collection
            .move_task(&board_id, &sub_task_id, &in_progress_id, 0)
            .expect("sub-task id is a no-op");
        // unknown destination
        collection
            .move_task(&board_id, &sub_task_id, "category-gone", 0)
            .expect("unknown destination is a no-op");

        let board = collection.board(&board_id).expect("board exists");
        assert_eq!(board.categories[0].tasks.len(), 1);
        assert!(board.categories[1].tasks.is_empty());
    }

    #[test]
    fn test_import_all_replaces_state_and_keeps_ids() {
        let mut collection = collection();
        let board_id = board_with_content(&mut collection);
        let exported = collection.export_all(true).expect("export succeeds");

        let imported = collection.import_all(&exported).expect("import succeeds");
        assert_eq!(imported, 1);
        assert_eq!(collection.boards().len(), 1);
        assert_eq!(collection.boards()[0].id, board_id);
        assert_eq!(
            collection.export_all(true).expect("re-export succeeds"),
            exported
        );
    }

    #[test]
    fn test_import_all_malformed_json_leaves_state_intact() {
        let mut collection = collection();
        let board_id = board_with_content(&mut collection);

        let result = collection.import_all("{not json");
        assert!(matches!(result, Err(Error::Import(_))));
        assert_eq!(collection.boards().len(), 1);
        assert!(collection.store.get(&board_id).expect("get works").is_some());
    }

    #[test]
    fn test_import_all_malformed_shape_leaves_state_intact() {
        let mut collection = collection();
        board_with_content(&mut collection);

        // valid JSON, wrong shape: entries must be board objects
        let result = collection.import_all(r#"["just a string"]"#);
        assert!(matches!(result, Err(Error::Import(_))));
        assert_eq!(collection.boards().len(), 1);
    }

    #[test]
    fn test_load_restores_boards_in_persisted_order() {
        let mut collection = collection();
        let first = collection.create_board("First").expect("board created");
        let second = collection.create_board("Second").expect("board created");

        collection
            .apply_board_order(&[second.clone(), first.clone()])
            .expect("reorder succeeds");

        let store = std::mem::take(&mut collection.store);
        let reloaded = BoardCollection::load(store, Vec::new()).expect("load succeeds");
        let ids: Vec<&str> = reloaded.boards().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec![second.as_str(), first.as_str()]);
    }

    #[test]
    fn test_delete_board_removes_record_and_order_entry() {
        let mut collection = collection();
        let board_id = collection.create_board("Work").expect("board created");
        collection.delete_board(&board_id).expect("delete succeeds");

        assert!(collection.boards().is_empty());
        assert!(collection.store.get(&board_id).expect("get works").is_none());
        assert!(collection.store.get_order().expect("order loads").is_empty());

        assert!(matches!(
            collection.delete_board(&board_id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_add_task_guard_routes_through_category() {
        let mut collection = collection();
        let board_id = collection.create_board("Work").expect("board created");
        let done_id = collection.board(&board_id).expect("board exists").categories[2]
            .id
            .clone();

        let result = collection.add_task(&board_id, &done_id, "sneaky");
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_clear_all_empties_collection_and_store() {
        let mut collection = collection();
        board_with_content(&mut collection);

        collection.clear_all().expect("clear succeeds");
        assert!(collection.boards().is_empty());
        assert!(collection.store.get_order().expect("order loads").is_empty());
    }
}
