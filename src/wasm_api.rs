//! WebAssembly bindings for the browser front-end. The same engine that
//! runs natively is exposed here as a single `Game` object, so the web UI
//! consumes the one canonical rule implementation instead of carrying its
//! own.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::board::GameStatus;
use crate::game::Game as Session;
use crate::moves::{Move, MoveRecord};
use crate::piece::{Color, PieceType};
use crate::square::Square;

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: String,
}

#[derive(Serialize)]
struct MoveJson {
    from: [u8; 2],
    to: [u8; 2],
    promotion: Option<String>,
    is_capture: bool,
    is_castle: bool,
    is_en_passant: bool,
}

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<Option<SquarePiece>>>,
    side_to_move: String,
    status: String,
    is_in_check: bool,
    move_count: usize,
    last_move: Option<MoveJson>,
    last_capture_square: Option<[u8; 2]>,
    pending_promotion: Option<String>,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    error: Option<String>,
}

fn piece_type_to_string(pt: PieceType) -> String {
    pt.name().to_string()
}

fn color_to_string(c: Color) -> String {
    match c {
        Color::White => "White".to_string(),
        Color::Black => "Black".to_string(),
    }
}

fn status_to_string(status: GameStatus) -> String {
    match status {
        GameStatus::Normal => "Normal",
        GameStatus::Check => "Check",
        GameStatus::Checkmate => "Checkmate",
        GameStatus::Stalemate => "Stalemate",
    }
    .to_string()
}

fn move_to_json(mv: &Move) -> MoveJson {
    MoveJson {
        from: [mv.from.file, mv.from.rank],
        to: [mv.to.file, mv.to.rank],
        promotion: mv.promotion.map(piece_type_to_string),
        is_capture: mv.flags.is_capture,
        is_castle: mv.flags.is_castle,
        is_en_passant: mv.flags.is_en_passant,
    }
}

fn build_board_state(session: &Session) -> BoardState {
    let board = session.board();
    let squares: Vec<Vec<Option<SquarePiece>>> = (0..8u8)
        .map(|rank| {
            (0..8u8)
                .map(|file| {
                    board.piece_at(Square { file, rank }).map(|p| SquarePiece {
                        piece_type: piece_type_to_string(p.piece_type),
                        color: color_to_string(p.color),
                    })
                })
                .collect()
        })
        .collect();

    BoardState {
        squares,
        side_to_move: color_to_string(board.side_to_move()),
        status: status_to_string(session.status()),
        is_in_check: board.is_in_check(board.side_to_move()),
        move_count: session.move_count(),
        last_move: session.last_move().as_ref().map(move_to_json),
        last_capture_square: session.last_capture_square().map(|sq| [sq.file, sq.rank]),
        pending_promotion: session.last_move_promotion().map(piece_type_to_string),
    }
}

fn move_result(result: Result<&Session, String>) -> JsValue {
    let result = match result {
        Ok(session) => MoveResult {
            board_state: Some(build_board_state(session)),
            error: None,
        },
        Err(e) => MoveResult {
            board_state: None,
            error: Some(e),
        },
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub struct Game {
    session: Session,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        Game {
            session: Session::new(),
        }
    }

    pub fn get_board_state(&self) -> JsValue {
        let state = build_board_state(&self.session);
        serde_wasm_bindgen::to_value(&state).unwrap_or(JsValue::NULL)
    }

    /// Legal moves for the piece on (file, rank); empty for any square the
    /// UI probes that holds nothing movable, out-of-range cells included.
    pub fn get_available_moves(&self, file: i32, rank: i32) -> JsValue {
        let moves: Vec<MoveJson> = self
            .session
            .available_moves(file, rank)
            .iter()
            .map(move_to_json)
            .collect();
        serde_wasm_bindgen::to_value(&moves).unwrap_or(JsValue::NULL)
    }

    /// Apply a move given as "E2E4"-style notation. Promotion defaults to
    /// Queen; call `change_promotion` before confirming to amend it.
    pub fn make_move(&mut self, notation: &str) -> JsValue {
        match self.session.make_move_from_notation(notation) {
            Ok(_) => move_result(Ok(&self.session)),
            Err(e) => move_result(Err(e.to_string())),
        }
    }

    pub fn change_promotion(&mut self, name: &str) -> bool {
        match PieceType::from_name(name) {
            Some(pt) => self.session.change_promotion(pt),
            None => false,
        }
    }

    /// Take back the newest move (the cancel path of the confirmation
    /// dialog). False when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.session.undo_last()
    }

    /// Jump to the position after move `index`, for move-by-move review.
    pub fn replay_to(&mut self, index: usize) -> JsValue {
        match self.session.replay_to(index) {
            Ok(()) => move_result(Ok(&self.session)),
            Err(e) => move_result(Err(e.to_string())),
        }
    }

    pub fn move_count(&self) -> usize {
        self.session.move_count()
    }

    /// Load a persisted game: an array of move records in play order.
    pub fn load_moves(&mut self, records: JsValue) -> JsValue {
        let records: Vec<MoveRecord> = match serde_wasm_bindgen::from_value(records) {
            Ok(r) => r,
            Err(e) => return move_result(Err(e.to_string())),
        };
        match Session::from_move_records(&records) {
            Ok(session) => {
                self.session = session;
                move_result(Ok(&self.session))
            }
            Err(e) => move_result(Err(e.to_string())),
        }
    }

    /// Export the moves up to the cursor as persistable records.
    pub fn export_moves(&self) -> JsValue {
        let records = self.session.to_move_records();
        serde_wasm_bindgen::to_value(&records).unwrap_or(JsValue::NULL)
    }

    /// Attach a comment to the newest move, preserving any timestamps the
    /// caller already set through `load_moves`.
    pub fn set_comment(&mut self, comment: &str) {
        let index = match self.session.move_count().checked_sub(1) {
            Some(i) => i,
            None => return,
        };
        let mut annotation = self
            .session
            .annotation_at(index)
            .cloned()
            .unwrap_or_default();
        annotation.comment = comment.to_string();
        self.session.annotate_last(annotation);
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
