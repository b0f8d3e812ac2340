use serde::{Deserialize, Serialize};

use crate::board::UndoRecord;
use crate::moves::{Move, MoveAnnotation};

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct HistoryEntry {
    pub undo: UndoRecord,
    pub annotation: MoveAnnotation,
}

/// Append-only log of applied moves with the state needed to reverse each
/// one, plus a cursor for review mode. Standard undo-stack semantics:
/// recording at a cursor that is not at the end discards the redo tail.
///
/// The history never touches the board itself; `Game` keeps the two in step.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize, Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        History {
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// Append at the cursor, truncating any redo tail, and advance.
    pub fn record(&mut self, undo: UndoRecord, annotation: MoveAnnotation) {
        self.entries.truncate(self.cursor);
        self.entries.push(HistoryEntry { undo, annotation });
        self.cursor = self.entries.len();
    }

    /// Step the cursor back and hand out the record to reverse, or `None`
    /// when there is nothing to undo. The undone entry stays in the log as a
    /// redo tail until a new move truncates it.
    pub fn step_back(&mut self) -> Option<&UndoRecord> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor].undo)
    }

    pub(crate) fn set_cursor(&mut self, index: usize) {
        debug_assert!(index <= self.entries.len());
        self.cursor = index;
    }

    /// Number of moves at or before the cursor.
    pub fn move_count(&self) -> usize {
        self.cursor
    }

    /// Total recorded moves, redo tail included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn move_at(&self, index: usize) -> Option<&Move> {
        self.entries.get(index).map(|e| &e.undo.mv)
    }

    pub fn annotation_at(&self, index: usize) -> Option<&MoveAnnotation> {
        self.entries.get(index).map(|e| &e.annotation)
    }

    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.cursor.checked_sub(1).map(|i| &self.entries[i])
    }

    pub(crate) fn last_entry_mut(&mut self) -> Option<&mut HistoryEntry> {
        self.cursor.checked_sub(1).map(|i| &mut self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries[..self.cursor].iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::piece::Color;

    fn undo_for(board: &mut Board, notation: &str) -> UndoRecord {
        let (from, to) = Move::parse_notation(notation).unwrap();
        let mv = board
            .moves_from(from)
            .into_iter()
            .find(|m| m.to == to)
            .unwrap();
        board.apply_move(&mv).unwrap()
    }

    #[test]
    fn empty_history_has_nothing_to_undo() {
        let mut history = History::new();
        assert!(history.step_back().is_none());
        assert_eq!(history.move_count(), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn record_advances_cursor() {
        let mut board = Board::new();
        let mut history = History::new();
        history.record(undo_for(&mut board, "E2E4"), MoveAnnotation::default());
        history.record(undo_for(&mut board, "E7E5"), MoveAnnotation::default());

        assert_eq!(history.move_count(), 2);
        assert_eq!(history.move_at(0).unwrap().notation(), "E2E4");
        assert_eq!(history.move_at(1).unwrap().notation(), "E7E5");
        assert!(history.move_at(2).is_none());
    }

    #[test]
    fn step_back_keeps_redo_tail_until_truncated() {
        let mut board = Board::new();
        let mut history = History::new();
        history.record(undo_for(&mut board, "E2E4"), MoveAnnotation::default());
        history.record(undo_for(&mut board, "E7E5"), MoveAnnotation::default());

        let undo = history.step_back().cloned().unwrap();
        board.undo_move(&undo);
        assert_eq!(history.move_count(), 1);
        assert_eq!(history.len(), 2, "undone entry kept as redo tail");
        assert_eq!(board.side_to_move(), Color::Black);

        // A new move after stepping back discards the stale future.
        history.record(undo_for(&mut board, "D7D5"), MoveAnnotation::default());
        assert_eq!(history.move_count(), 2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.move_at(1).unwrap().notation(), "D7D5");
    }

    #[test]
    fn annotations_are_carried_per_entry() {
        let mut board = Board::new();
        let mut history = History::new();
        let note = MoveAnnotation {
            comment: "book move".to_string(),
            start: None,
            end: None,
        };
        history.record(undo_for(&mut board, "E2E4"), note.clone());
        assert_eq!(history.annotation_at(0), Some(&note));
    }
}
