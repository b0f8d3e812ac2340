use crate::board::{Board, GameStatus};
use crate::error::ChessError;
use crate::history::History;
use crate::moves::{Move, MoveAnnotation, MoveRecord};
use crate::piece::{Piece, PieceType};
use crate::square::Square;

/// One game: a board plus the history needed to review and undo it. The
/// session is the single owner of both; callers get read-only accessors and
/// mutate only through `make_move`/`undo_last`/`replay_to`.
///
/// Single-threaded by design. A session represents exactly one game; the
/// surrounding application runs one session per game and serializes calls to
/// it.
#[derive(Clone, Default, Debug)]
pub struct Game {
    board: Board,
    history: History,
}

impl Game {
    /// A new game at the standard starting position with empty history.
    pub fn new() -> Self {
        Game {
            board: Board::new(),
            history: History::new(),
        }
    }

    /// Rebuild a game from persisted move records by replaying them in play
    /// order, promotions and annotations included.
    pub fn from_move_records(records: &[MoveRecord]) -> Result<Game, ChessError> {
        let mut game = Game::new();
        for record in records {
            game.make_move_from_notation(&record.notation)?;
            if let Some(name) = &record.promotion {
                let pt = PieceType::from_name(name)
                    .filter(|pt| pt.is_promotion_target())
                    .ok_or_else(|| ChessError::InvalidNotation(name.clone()))?;
                game.change_promotion(pt);
            }
            game.annotate_last(MoveAnnotation {
                comment: record.comment.clone(),
                start: record.start,
                end: record.end,
            });
        }
        Ok(game)
    }

    /// Serialize the moves up to the cursor in the shape the persistence
    /// layer stores: notation, promotion name, and caller annotations.
    pub fn to_move_records(&self) -> Vec<MoveRecord> {
        self.history
            .iter()
            .map(|entry| {
                let mv = &entry.undo.mv;
                MoveRecord {
                    notation: mv.notation(),
                    promotion: mv.promotion.map(|pt| pt.name().to_string()),
                    comment: entry.annotation.comment.clone(),
                    start: entry.annotation.start,
                    end: entry.annotation.end,
                }
            })
            .collect()
    }

    // -- queries -----------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    /// Legal moves for the piece on (file, rank). Empty for out-of-range
    /// coordinates, empty squares, and pieces of the side not on move, so
    /// UI code can probe any cell it likes.
    pub fn available_moves(&self, file: i32, rank: i32) -> Vec<Move> {
        match Square::new(file, rank) {
            Some(sq) => self.board.moves_from(sq),
            None => Vec::new(),
        }
    }

    pub fn move_count(&self) -> usize {
        self.history.move_count()
    }

    pub fn move_at(&self, index: usize) -> Option<&Move> {
        self.history.move_at(index)
    }

    pub fn annotation_at(&self, index: usize) -> Option<&MoveAnnotation> {
        self.history.annotation_at(index)
    }

    /// The most recently applied move, for board highlights.
    pub fn last_move(&self) -> Option<Move> {
        self.history.last_entry().map(|e| e.undo.mv)
    }

    /// Where the last move captured, if it did. For en passant this is the
    /// victim's own square, not the move's destination.
    pub fn last_capture_square(&self) -> Option<Square> {
        self.history.last_entry().and_then(|e| e.undo.captured_square)
    }

    /// The promotion piece of the last move, while one is on the board. The
    /// front-end uses this to offer the promotion dialog.
    pub fn last_move_promotion(&self) -> Option<PieceType> {
        self.history.last_entry().and_then(|e| e.undo.mv.promotion)
    }

    // -- mutations ---------------------------------------------------------

    /// Apply a move and record it. Any redo tail beyond the cursor is
    /// discarded. A promotion move with no chosen piece resolves to Queen.
    /// Errors with `IllegalMove` if the move is not in the legal set, which
    /// also covers play after checkmate or stalemate: terminal positions
    /// have no legal moves at all.
    pub fn make_move(&mut self, mv: &Move) -> Result<GameStatus, ChessError> {
        let undo = self.board.apply_move(mv)?;
        self.history.record(undo, MoveAnnotation::default());
        Ok(self.board.status())
    }

    /// Apply a move given as "E2E4"-style notation. A pawn reaching the back
    /// rank promotes to Queen by default; use `change_promotion` to amend it
    /// before the move is confirmed.
    pub fn make_move_from_notation(&mut self, notation: &str) -> Result<GameStatus, ChessError> {
        let (from, to) = Move::parse_notation(notation)
            .ok_or_else(|| ChessError::InvalidNotation(notation.to_string()))?;
        let candidates = self.board.moves_from(from);
        let chosen = *candidates
            .iter()
            .filter(|m| m.to == to)
            .min_by_key(|m| m.ordering_key())
            .ok_or_else(|| ChessError::IllegalMove {
                mv: notation.to_string(),
            })?;
        self.make_move(&chosen)
    }

    /// Amend the pending promotion of the newest move: swap the promoted
    /// piece on the board and in the recorded move. Returns false when the
    /// last move was not a promotion or the piece is not a valid promotion
    /// target. The undo record stays valid either way, because undoing a
    /// promotion always restores the pawn.
    pub fn change_promotion(&mut self, piece_type: PieceType) -> bool {
        if !piece_type.is_promotion_target() {
            return false;
        }
        let board = &mut self.board;
        match self.history.last_entry_mut() {
            Some(entry) if entry.undo.mv.promotion.is_some() => {
                let to = entry.undo.mv.to;
                let color = match board.piece_at(to) {
                    Some(p) => p.color,
                    None => return false,
                };
                board.put_piece(to, Piece::new(piece_type, color));
                entry.undo.mv.promotion = Some(piece_type);
                true
            }
            _ => false,
        }
    }

    /// Attach caller-owned metadata (comment, think time) to the newest
    /// history entry.
    pub fn annotate_last(&mut self, annotation: MoveAnnotation) {
        if let Some(entry) = self.history.last_entry_mut() {
            entry.annotation = annotation;
        }
    }

    /// Reverse the newest move in O(1) via its undo record. Returns false
    /// when there is nothing to undo; that is a normal condition, not an
    /// error.
    pub fn undo_last(&mut self) -> bool {
        match self.history.step_back().cloned() {
            Some(undo) => {
                self.board.undo_move(&undo);
                true
            }
            None => false,
        }
    }

    /// Jump to the position after move `index` by replaying from the
    /// initial position. O(index), which is fine at game lengths; replay
    /// guarantees correctness regardless of the direction of travel.
    pub fn replay_to(&mut self, index: usize) -> Result<(), ChessError> {
        if index > self.history.len() {
            return Err(ChessError::ReplayOutOfRange {
                index,
                len: self.history.len(),
            });
        }
        let mut board = Board::new();
        for i in 0..index {
            let mv = match self.history.move_at(i) {
                Some(mv) => *mv,
                None => unreachable!("history entry {i} missing during replay"),
            };
            board.apply_move(&mv)?;
        }
        self.board = board;
        self.history.set_cursor(index);
        Ok(())
    }
}
