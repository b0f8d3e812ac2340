use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;
use crate::moves::{Move, MoveFlags};
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> Self {
        CastlingRights {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    fn clear_both(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// A king or rook leaving (or an enemy piece landing on) a corner or the
    /// king's home square kills the corresponding right permanently.
    fn clear_for_square(&mut self, sq: Square) {
        match (sq.file, sq.rank) {
            (0, 0) => self.white_queenside = false,
            (7, 0) => self.white_kingside = false,
            (4, 0) => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            (0, 7) => self.black_queenside = false,
            (7, 7) => self.black_kingside = false,
            (4, 7) => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
            _ => {}
        }
    }
}

/// Position classification for the side to move, recomputed after every
/// mutation and never cached across them.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum GameStatus {
    Normal,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    /// Terminal positions accept no further moves; the legal-move set is
    /// empty for every square, so no separate gate is needed.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

/// State saved by `apply_move` so the move can be reversed exactly, without
/// recomputation. The captured square is stored separately from `mv.to`
/// because the en-passant victim sits on a different square.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct UndoRecord {
    pub mv: Move,
    pub captured: Option<Piece>,
    pub captured_square: Option<Square>,
    pub castling_rights: CastlingRights,
    pub en_passant_target: Option<Square>,
    pub halfmove_clock: u32,
}

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const STRAIGHT_DIRS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAGONAL_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const PROMOTION_PIECES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

/// The 8×8 position: piece placement, side to move, castling rights,
/// en-passant target and move counters. Squares are indexed `[rank][file]`
/// with rank 0 = White's back rank. Mutation goes exclusively through
/// `apply_move`/`undo_move`; everything else is a read-only accessor.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
    side_to_move: Color,
    castling_rights: CastlingRights,
    en_passant_target: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board with no pieces and no castling rights. Useful for
    /// setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
            side_to_move: Color::White,
            castling_rights: CastlingRights::none(),
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// The standard starting position: White to move, full castling rights,
    /// no en-passant target, counters reset.
    pub fn new() -> Self {
        let mut board = Board::empty();
        board.castling_rights = CastlingRights::all();

        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        for (file, &pt) in back_rank.iter().enumerate() {
            board.squares[0][file] = Some(Piece::new(pt, Color::White));
            board.squares[1][file] = Some(Piece::new(PieceType::Pawn, Color::White));
            board.squares[6][file] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[7][file] = Some(Piece::new(pt, Color::Black));
        }
        board
    }

    // -- accessors ---------------------------------------------------------

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.rank as usize][sq.file as usize]
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Place a piece directly. Only for building test positions; regular
    /// play mutates through `apply_move`/`undo_move`.
    pub fn put_piece(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.rank as usize][sq.file as usize] = Some(piece);
    }

    /// See `put_piece`.
    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.rank as usize][sq.file as usize] = piece;
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        for rank in 0..8 {
            for file in 0..8 {
                if self.squares[rank][file] == Some(Piece::new(PieceType::King, color)) {
                    return Square::new(file as i32, rank as i32);
                }
            }
        }
        None
    }

    // -- attack detection --------------------------------------------------

    /// Whether any piece of `attacker` attacks `sq`. Sliders are blocked by
    /// the first piece of either color on the ray, kings included, which is
    /// what makes the simulate-then-test legality filter below correct.
    pub fn is_square_attacked_by(&self, sq: Square, attacker: Color) -> bool {
        for (df, dr) in KNIGHT_OFFSETS {
            if let Some(from) = sq.offset(df, dr) {
                if self.piece_at(from) == Some(Piece::new(PieceType::Knight, attacker)) {
                    return true;
                }
            }
        }

        for (df, dr) in KING_OFFSETS {
            if let Some(from) = sq.offset(df, dr) {
                if self.piece_at(from) == Some(Piece::new(PieceType::King, attacker)) {
                    return true;
                }
            }
        }

        // A pawn one rank behind (from the attacker's point of view) on an
        // adjacent file attacks this square.
        let pawn_dir: i32 = if attacker == Color::White { 1 } else { -1 };
        for df in [-1, 1] {
            if let Some(from) = sq.offset(df, -pawn_dir) {
                if self.piece_at(from) == Some(Piece::new(PieceType::Pawn, attacker)) {
                    return true;
                }
            }
        }

        self.ray_attack(sq, attacker, &STRAIGHT_DIRS, PieceType::Rook)
            || self.ray_attack(sq, attacker, &DIAGONAL_DIRS, PieceType::Bishop)
    }

    fn ray_attack(
        &self,
        sq: Square,
        attacker: Color,
        dirs: &[(i32, i32)],
        slider: PieceType,
    ) -> bool {
        for &(df, dr) in dirs {
            let mut cur = sq.offset(df, dr);
            while let Some(s) = cur {
                if let Some(p) = self.piece_at(s) {
                    if p.color == attacker
                        && (p.piece_type == slider || p.piece_type == PieceType::Queen)
                    {
                        return true;
                    }
                    break;
                }
                cur = s.offset(df, dr);
            }
        }
        false
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(sq) => self.is_square_attacked_by(sq, color.opposite()),
            None => false,
        }
    }

    // -- move generation ---------------------------------------------------

    /// Legal moves for the piece on `sq`, or empty if the square is empty or
    /// holds a piece of the side not on move. Sorted by destination square,
    /// then promotion piece, so fixtures are deterministic.
    pub fn moves_from(&self, sq: Square) -> Vec<Move> {
        let piece = match self.piece_at(sq) {
            Some(p) if p.color == self.side_to_move => p,
            _ => return Vec::new(),
        };

        let mut moves = Vec::new();
        self.pseudo_moves_for(sq, piece, &mut moves);
        self.retain_legal(&mut moves);
        moves.sort_by_key(|m| m.ordering_key());
        moves
    }

    /// All legal moves for `color`. Empty exactly when the position is
    /// checkmate or stalemate for that side.
    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        if color != self.side_to_move {
            return Vec::new();
        }
        let mut moves = Vec::new();
        for rank in 0..8 {
            for file in 0..8 {
                let sq = Square {
                    file: file as u8,
                    rank: rank as u8,
                };
                if let Some(p) = self.piece_at(sq) {
                    if p.color == color {
                        self.pseudo_moves_for(sq, p, &mut moves);
                    }
                }
            }
        }
        self.retain_legal(&mut moves);
        moves
    }

    /// Drop candidates that would leave the mover's own king attacked, by
    /// applying each on a scratch copy and testing for check.
    fn retain_legal(&self, moves: &mut Vec<Move>) {
        let mover = self.side_to_move;
        moves.retain(|m| {
            let mut scratch = self.clone();
            scratch.apply_unchecked(m);
            !scratch.is_in_check(mover)
        });
    }

    fn pseudo_moves_for(&self, sq: Square, piece: Piece, moves: &mut Vec<Move>) {
        match piece.piece_type {
            PieceType::Pawn => self.pawn_moves(sq, piece.color, moves),
            PieceType::Knight => self.offset_moves(sq, piece.color, &KNIGHT_OFFSETS, moves),
            PieceType::Bishop => self.sliding_moves(sq, piece.color, &DIAGONAL_DIRS, moves),
            PieceType::Rook => self.sliding_moves(sq, piece.color, &STRAIGHT_DIRS, moves),
            PieceType::Queen => {
                self.sliding_moves(sq, piece.color, &STRAIGHT_DIRS, moves);
                self.sliding_moves(sq, piece.color, &DIAGONAL_DIRS, moves);
            }
            PieceType::King => {
                self.offset_moves(sq, piece.color, &KING_OFFSETS, moves);
                self.castling_moves(sq, piece.color, moves);
            }
        }
    }

    fn push_pawn_move(from: Square, to: Square, flags: MoveFlags, moves: &mut Vec<Move>) {
        if to.rank == 0 || to.rank == 7 {
            // Promotion variants are enumerated as distinct candidates.
            for pt in PROMOTION_PIECES {
                moves.push(Move {
                    from,
                    to,
                    promotion: Some(pt),
                    flags,
                });
            }
        } else {
            moves.push(Move {
                from,
                to,
                promotion: None,
                flags,
            });
        }
    }

    fn pawn_moves(&self, sq: Square, color: Color, moves: &mut Vec<Move>) {
        let (dir, start_rank): (i32, u8) = match color {
            Color::White => (1, 1),
            Color::Black => (-1, 6),
        };

        // Advances go only onto empty squares.
        if let Some(one) = sq.offset(0, dir) {
            if self.piece_at(one).is_none() {
                Self::push_pawn_move(sq, one, MoveFlags::default(), moves);

                if sq.rank == start_rank {
                    if let Some(two) = sq.offset(0, 2 * dir) {
                        if self.piece_at(two).is_none() {
                            Self::push_pawn_move(sq, two, MoveFlags::default(), moves);
                        }
                    }
                }
            }
        }

        // Diagonal captures, onto enemy pieces or the en-passant target.
        for df in [-1, 1] {
            let to = match sq.offset(df, dir) {
                Some(s) => s,
                None => continue,
            };
            let enemy_there = self
                .piece_at(to)
                .map(|p| p.color != color)
                .unwrap_or(false);
            if enemy_there {
                let flags = MoveFlags {
                    is_capture: true,
                    ..MoveFlags::default()
                };
                Self::push_pawn_move(sq, to, flags, moves);
            } else if self.en_passant_target == Some(to) {
                let flags = MoveFlags {
                    is_capture: true,
                    is_en_passant: true,
                    ..MoveFlags::default()
                };
                Self::push_pawn_move(sq, to, flags, moves);
            }
        }
    }

    fn offset_moves(
        &self,
        sq: Square,
        color: Color,
        offsets: &[(i32, i32)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in offsets {
            let to = match sq.offset(df, dr) {
                Some(s) => s,
                None => continue,
            };
            match self.piece_at(to) {
                Some(p) if p.color == color => {}
                occupant => moves.push(Move {
                    from: sq,
                    to,
                    promotion: None,
                    flags: MoveFlags {
                        is_capture: occupant.is_some(),
                        ..MoveFlags::default()
                    },
                }),
            }
        }
    }

    fn sliding_moves(
        &self,
        sq: Square,
        color: Color,
        dirs: &[(i32, i32)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in dirs {
            let mut cur = sq.offset(df, dr);
            while let Some(to) = cur {
                match self.piece_at(to) {
                    Some(p) => {
                        if p.color != color {
                            moves.push(Move {
                                from: sq,
                                to,
                                promotion: None,
                                flags: MoveFlags {
                                    is_capture: true,
                                    ..MoveFlags::default()
                                },
                            });
                        }
                        break;
                    }
                    None => {
                        moves.push(Move {
                            from: sq,
                            to,
                            promotion: None,
                            flags: MoveFlags::default(),
                        });
                        cur = to.offset(df, dr);
                    }
                }
            }
        }
    }

    fn castling_moves(&self, sq: Square, color: Color, moves: &mut Vec<Move>) {
        let back_rank = match color {
            Color::White => 0u8,
            Color::Black => 7u8,
        };

        // The king must be on its home square and not currently in check.
        if sq.rank != back_rank || sq.file != 4 || self.is_in_check(color) {
            return;
        }

        let enemy = color.opposite();
        let rook = Some(Piece::new(PieceType::Rook, color));
        let at = |file: u8| Square {
            file,
            rank: back_rank,
        };

        if self.castling_rights.kingside(color)
            && self.piece_at(at(5)).is_none()
            && self.piece_at(at(6)).is_none()
            && self.piece_at(at(7)) == rook
            && !self.is_square_attacked_by(at(5), enemy)
            && !self.is_square_attacked_by(at(6), enemy)
        {
            moves.push(Move {
                from: sq,
                to: at(6),
                promotion: None,
                flags: MoveFlags {
                    is_castle: true,
                    ..MoveFlags::default()
                },
            });
        }

        if self.castling_rights.queenside(color)
            && self.piece_at(at(1)).is_none()
            && self.piece_at(at(2)).is_none()
            && self.piece_at(at(3)).is_none()
            && self.piece_at(at(0)) == rook
            && !self.is_square_attacked_by(at(3), enemy)
            && !self.is_square_attacked_by(at(2), enemy)
        {
            moves.push(Move {
                from: sq,
                to: at(2),
                promotion: None,
                flags: MoveFlags {
                    is_castle: true,
                    ..MoveFlags::default()
                },
            });
        }
    }

    // -- apply / undo ------------------------------------------------------

    /// Apply a move after validating it against the current legal set.
    /// Callers normally pass moves obtained from `moves_from`, but the
    /// contract validates regardless; flags are taken from the generator's
    /// canonical copy, not the argument. A pawn-to-back-rank move arriving
    /// with no promotion choice resolves to the Queen variant.
    pub fn apply_move(&mut self, mv: &Move) -> Result<UndoRecord, ChessError> {
        let candidates = self.moves_from(mv.from);
        let mut canonical = candidates
            .iter()
            .find(|c| c.to == mv.to && c.promotion == mv.promotion);
        if canonical.is_none() && mv.promotion.is_none() {
            canonical = candidates
                .iter()
                .find(|c| c.to == mv.to && c.promotion == Some(PieceType::Queen));
        }
        let canonical = *canonical.ok_or_else(|| ChessError::IllegalMove { mv: mv.notation() })?;
        Ok(self.apply_unchecked(&canonical))
    }

    /// Mutation without legality validation. Also used on scratch boards by
    /// the legality filter, so it must never call back into move generation.
    fn apply_unchecked(&mut self, mv: &Move) -> UndoRecord {
        let piece = match self.piece_at(mv.from) {
            Some(p) => p,
            None => unreachable!("apply_unchecked on empty square {}", mv.from),
        };
        debug_assert_eq!(piece.color, self.side_to_move);

        let captured_square = if mv.flags.is_en_passant {
            // The victim sits beside the pawn, on the from-rank.
            Some(Square {
                file: mv.to.file,
                rank: mv.from.rank,
            })
        } else {
            self.piece_at(mv.to).map(|_| mv.to)
        };
        let captured = captured_square.and_then(|sq| self.piece_at(sq));

        let undo = UndoRecord {
            mv: *mv,
            captured,
            captured_square,
            castling_rights: self.castling_rights,
            en_passant_target: self.en_passant_target,
            halfmove_clock: self.halfmove_clock,
        };

        if let Some(sq) = captured_square {
            self.set(sq, None);
        }

        let landing = match mv.promotion {
            Some(pt) => Piece::new(pt, piece.color),
            None => piece,
        };
        self.set(mv.to, Some(landing));
        self.set(mv.from, None);

        if mv.flags.is_castle {
            let (rook_from, rook_to) = Self::castling_rook_squares(mv.to);
            let rook = self.piece_at(rook_from);
            self.set(rook_to, rook);
            self.set(rook_from, None);
        }

        if piece.piece_type == PieceType::King {
            self.castling_rights.clear_both(piece.color);
        }
        self.castling_rights.clear_for_square(mv.from);
        self.castling_rights.clear_for_square(mv.to);

        // En-passant target is valid for exactly one ply after a double step.
        let double_step =
            piece.piece_type == PieceType::Pawn && (mv.from.rank as i32 - mv.to.rank as i32).abs() == 2;
        self.en_passant_target = if double_step {
            Some(Square {
                file: mv.from.file,
                rank: (mv.from.rank + mv.to.rank) / 2,
            })
        } else {
            None
        };

        if piece.piece_type == PieceType::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.opposite();

        undo
    }

    /// Exact inverse of `apply_move`, driven entirely by the record.
    pub fn undo_move(&mut self, undo: &UndoRecord) {
        let mv = &undo.mv;
        let mover = self.side_to_move.opposite();

        let landing = match self.piece_at(mv.to) {
            Some(p) => p,
            None => unreachable!("undo_move with empty destination {}", mv.to),
        };
        // A promoted piece reverts to the pawn that made the move.
        let original = if mv.promotion.is_some() {
            Piece::new(PieceType::Pawn, landing.color)
        } else {
            landing
        };
        self.set(mv.from, Some(original));
        self.set(mv.to, None);

        if let Some(sq) = undo.captured_square {
            self.set(sq, undo.captured);
        }

        if mv.flags.is_castle {
            let (rook_from, rook_to) = Self::castling_rook_squares(mv.to);
            let rook = self.piece_at(rook_to);
            self.set(rook_from, rook);
            self.set(rook_to, None);
        }

        self.castling_rights = undo.castling_rights;
        self.en_passant_target = undo.en_passant_target;
        self.halfmove_clock = undo.halfmove_clock;
        if mover == Color::Black {
            self.fullmove_number -= 1;
        }
        self.side_to_move = mover;
    }

    /// Rook start/end squares for a castling move, keyed off the king's
    /// destination file (6 = kingside, 2 = queenside).
    fn castling_rook_squares(king_to: Square) -> (Square, Square) {
        let rank = king_to.rank;
        if king_to.file == 6 {
            (Square { file: 7, rank }, Square { file: 5, rank })
        } else {
            (Square { file: 0, rank }, Square { file: 3, rank })
        }
    }

    // -- classification ----------------------------------------------------

    /// Classify the position for the side to move: check status combined
    /// with whether any legal move exists.
    pub fn status(&self) -> GameStatus {
        let in_check = self.is_in_check(self.side_to_move);
        let has_moves = !self.legal_moves(self.side_to_move).is_empty();
        match (in_check, has_moves) {
            (true, false) => GameStatus::Checkmate,
            (true, true) => GameStatus::Check,
            (false, false) => GameStatus::Stalemate,
            (false, true) => GameStatus::Normal,
        }
    }

    /// Advisory fifty-move-rule flag from the halfmove clock. Repetition
    /// detection is left to the caller.
    pub fn is_fifty_move_rule(&self) -> bool {
        self.halfmove_clock >= 100
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                match self.squares[rank][file] {
                    Some(p) => write!(f, " {}", p.piece_type.to_char(p.color))?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "   A B C D E F G H")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_notation(s).unwrap()
    }

    /// Look up the generated move from->to (ignoring promotion variants).
    fn find_move(board: &Board, from: &str, to: &str) -> Move {
        let from = sq(from);
        let to = sq(to);
        board
            .moves_from(from)
            .into_iter()
            .find(|m| m.to == to)
            .unwrap_or_else(|| panic!("no move {from}->{to} in\n{board}"))
    }

    fn play(board: &mut Board, from: &str, to: &str) -> UndoRecord {
        let mv = find_move(board, from, to);
        board.apply_move(&mv).unwrap()
    }

    #[test]
    fn starting_position_has_twenty_moves() {
        let board = Board::new();
        let moves = board.legal_moves(Color::White);
        assert_eq!(moves.len(), 20, "16 pawn moves + 4 knight moves");
    }

    #[test]
    fn empty_and_enemy_squares_yield_no_moves() {
        let board = Board::new();
        assert!(board.moves_from(sq("E4")).is_empty(), "empty square");
        assert!(board.moves_from(sq("E7")).is_empty(), "not this side's turn");
    }

    #[test]
    fn moves_from_is_sorted_by_destination() {
        let board = Board::new();
        let moves = board.moves_from(sq("B1"));
        let notations: Vec<String> = moves.iter().map(|m| m.notation()).collect();
        assert_eq!(notations, ["B1A3", "B1C3"]);
    }

    #[test]
    fn apply_then_undo_restores_position() {
        let board = Board::new();
        for mv in board.legal_moves(Color::White) {
            let mut scratch = board.clone();
            let undo = scratch.apply_move(&mv).unwrap();
            scratch.undo_move(&undo);
            assert_eq!(scratch, board, "round trip failed for {}", mv.notation());
        }
    }

    #[test]
    fn no_legal_move_leaves_own_king_attacked() {
        let mut board = Board::new();
        // A short scripted opening so pins actually occur: Bb5 pins the
        // d7-pawn against the king on e8.
        for (from, to) in [("E2", "E4"), ("E7", "E5"), ("F1", "B5")] {
            play(&mut board, from, to);
        }
        assert!(
            board.moves_from(sq("D7")).is_empty(),
            "the pinned d7-pawn may not advance"
        );
        let mover = board.side_to_move();
        for mv in board.legal_moves(mover) {
            let mut scratch = board.clone();
            scratch.apply_move(&mv).unwrap();
            let king = scratch.find_king(mover).unwrap();
            assert!(
                !scratch.is_square_attacked_by(king, mover.opposite()),
                "{} leaves own king in check",
                mv.notation()
            );
        }
    }

    #[test]
    fn pinned_knight_cannot_move() {
        let mut board = Board::empty();
        board.put_piece(sq("E1"), Piece::new(PieceType::King, Color::White));
        board.put_piece(sq("E3"), Piece::new(PieceType::Knight, Color::White));
        board.put_piece(sq("E8"), Piece::new(PieceType::King, Color::Black));
        board.put_piece(sq("E7"), Piece::new(PieceType::Queen, Color::Black));
        assert!(
            board.moves_from(sq("E3")).is_empty(),
            "knight is pinned to the king"
        );
    }

    #[test]
    fn illegal_move_is_rejected() {
        let mut board = Board::new();
        let mv = Move {
            from: sq("E2"),
            to: sq("E5"),
            promotion: None,
            flags: MoveFlags::default(),
        };
        let before = board.clone();
        match board.apply_move(&mv) {
            Err(ChessError::IllegalMove { mv }) => assert_eq!(mv, "E2E5"),
            other => panic!("expected IllegalMove, got {other:?}"),
        }
        assert_eq!(board, before, "failed apply must not mutate");
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut board = Board::new();
        for (from, to) in [("F2", "F3"), ("E7", "E5"), ("G2", "G4"), ("D8", "H4")] {
            play(&mut board, from, to);
        }
        assert_eq!(board.status(), GameStatus::Checkmate);
        assert!(board.status().is_terminal());
        assert!(board.legal_moves(Color::White).is_empty());
    }

    #[test]
    fn check_is_reported_before_mate() {
        let mut board = Board::new();
        for (from, to) in [("E2", "E4"), ("F7", "F6"), ("D1", "H5")] {
            play(&mut board, from, to);
        }
        assert_eq!(board.status(), GameStatus::Check);
        assert!(!board.status().is_terminal());
    }

    #[test]
    fn king_and_queen_stalemate() {
        let mut board = Board::empty();
        board.put_piece(sq("H8"), Piece::new(PieceType::King, Color::Black));
        board.put_piece(sq("F7"), Piece::new(PieceType::King, Color::White));
        board.put_piece(sq("G6"), Piece::new(PieceType::Queen, Color::White));
        board.set_side_to_move(Color::Black);

        assert!(!board.is_in_check(Color::Black));
        assert!(board.legal_moves(Color::Black).is_empty());
        assert_eq!(board.status(), GameStatus::Stalemate);
    }

    #[test]
    fn en_passant_capture_removes_passed_pawn() {
        let mut board = Board::new();
        for (from, to) in [("E2", "E4"), ("A7", "A6"), ("E4", "E5"), ("D7", "D5")] {
            play(&mut board, from, to);
        }
        assert_eq!(board.en_passant_target(), Some(sq("D6")));

        let ep = find_move(&board, "E5", "D6");
        assert!(ep.flags.is_en_passant);
        assert!(ep.flags.is_capture);

        let undo = board.apply_move(&ep).unwrap();
        assert_eq!(undo.captured, Some(Piece::new(PieceType::Pawn, Color::Black)));
        assert_eq!(undo.captured_square, Some(sq("D5")), "victim is not on the to-square");
        assert_eq!(board.piece_at(sq("D5")), None, "double-stepped pawn removed");
        assert_eq!(
            board.piece_at(sq("D6")),
            Some(Piece::new(PieceType::Pawn, Color::White))
        );

        // And the whole thing reverses exactly.
        board.undo_move(&undo);
        assert_eq!(board.en_passant_target(), Some(sq("D6")));
        assert_eq!(
            board.piece_at(sq("D5")),
            Some(Piece::new(PieceType::Pawn, Color::Black))
        );
    }

    #[test]
    fn en_passant_window_is_one_ply() {
        let mut board = Board::new();
        for (from, to) in [
            ("E2", "E4"),
            ("A7", "A6"),
            ("E4", "E5"),
            ("D7", "D5"),
            // White declines the en-passant capture.
            ("H2", "H3"),
            ("A6", "A5"),
        ] {
            play(&mut board, from, to);
        }
        assert_eq!(board.en_passant_target(), None);
        assert!(
            board.moves_from(sq("E5")).iter().all(|m| m.to != sq("D6")),
            "en passant no longer available"
        );
    }

    #[test]
    fn kingside_castling_executes_and_reverses() {
        let mut board = Board::new();
        for (from, to) in [
            ("E2", "E4"),
            ("E7", "E5"),
            ("G1", "F3"),
            ("B8", "C6"),
            ("F1", "C4"),
            ("G8", "F6"),
        ] {
            play(&mut board, from, to);
        }

        let castle = find_move(&board, "E1", "G1");
        assert!(castle.flags.is_castle);
        let undo = board.apply_move(&castle).unwrap();

        assert_eq!(board.piece_at(sq("G1")), Some(Piece::new(PieceType::King, Color::White)));
        assert_eq!(board.piece_at(sq("F1")), Some(Piece::new(PieceType::Rook, Color::White)));
        assert_eq!(board.piece_at(sq("E1")), None);
        assert_eq!(board.piece_at(sq("H1")), None);
        assert!(!board.castling_rights().white_kingside);
        assert!(!board.castling_rights().white_queenside);

        board.undo_move(&undo);
        assert_eq!(board.piece_at(sq("E1")), Some(Piece::new(PieceType::King, Color::White)));
        assert_eq!(board.piece_at(sq("H1")), Some(Piece::new(PieceType::Rook, Color::White)));
        assert!(board.castling_rights().white_kingside);
    }

    #[test]
    fn castling_blocked_through_attacked_square() {
        let mut board = Board::empty();
        board.castling_rights = CastlingRights::all();
        board.put_piece(sq("E1"), Piece::new(PieceType::King, Color::White));
        board.put_piece(sq("H1"), Piece::new(PieceType::Rook, Color::White));
        board.put_piece(sq("E8"), Piece::new(PieceType::King, Color::Black));
        // Rook covers F1: the king would castle through an attacked square.
        board.put_piece(sq("F8"), Piece::new(PieceType::Rook, Color::Black));

        assert!(
            board.moves_from(sq("E1")).iter().all(|m| !m.flags.is_castle),
            "castling through attack must be excluded"
        );
    }

    #[test]
    fn castling_excluded_while_king_in_check() {
        let mut board = Board::empty();
        board.castling_rights = CastlingRights::all();
        board.put_piece(sq("E1"), Piece::new(PieceType::King, Color::White));
        board.put_piece(sq("H1"), Piece::new(PieceType::Rook, Color::White));
        board.put_piece(sq("E8"), Piece::new(PieceType::King, Color::Black));
        // Rook gives check along the e-file: the king's start square itself
        // is attacked.
        board.put_piece(sq("E5"), Piece::new(PieceType::Rook, Color::Black));

        assert!(board.is_in_check(Color::White));
        assert!(
            board.moves_from(sq("E1")).iter().all(|m| !m.flags.is_castle),
            "castling out of check must be excluded"
        );
    }

    #[test]
    fn rook_move_revokes_right_permanently() {
        let mut board = Board::new();
        for (from, to) in [
            ("H2", "H4"),
            ("A7", "A6"),
            ("H1", "H3"), // rook leaves H1
            ("A6", "A5"),
            ("H3", "H1"), // and returns
            ("A5", "A4"),
        ] {
            play(&mut board, from, to);
        }
        assert!(!board.castling_rights().white_kingside, "right lost for good");
        assert!(board.castling_rights().white_queenside);
    }

    #[test]
    fn rook_capture_revokes_right() {
        let mut board = Board::empty();
        board.castling_rights = CastlingRights::all();
        board.put_piece(sq("E1"), Piece::new(PieceType::King, Color::White));
        board.put_piece(sq("H1"), Piece::new(PieceType::Rook, Color::White));
        board.put_piece(sq("E8"), Piece::new(PieceType::King, Color::Black));
        board.put_piece(sq("H8"), Piece::new(PieceType::Rook, Color::Black));
        board.set_side_to_move(Color::Black);

        play(&mut board, "H8", "H1");
        assert!(!board.castling_rights().white_kingside);
        assert!(!board.castling_rights().black_kingside, "rook moved off H8");
    }

    #[test]
    fn promotion_variants_are_distinct_candidates() {
        let mut board = Board::empty();
        board.put_piece(sq("E1"), Piece::new(PieceType::King, Color::White));
        board.put_piece(sq("E8"), Piece::new(PieceType::King, Color::Black));
        board.put_piece(sq("A7"), Piece::new(PieceType::Pawn, Color::White));

        let moves = board.moves_from(sq("A7"));
        assert_eq!(moves.len(), 4);
        assert!(moves.iter().all(|m| m.to == sq("A8")));
        let promos: Vec<Option<PieceType>> = moves.iter().map(|m| m.promotion).collect();
        assert_eq!(
            promos,
            [
                Some(PieceType::Queen),
                Some(PieceType::Rook),
                Some(PieceType::Bishop),
                Some(PieceType::Knight)
            ],
            "deterministic promotion order"
        );

        // Applying one and undoing restores the pawn.
        let before = board.clone();
        let undo = board.apply_move(&moves[0]).unwrap();
        assert_eq!(
            board.piece_at(sq("A8")),
            Some(Piece::new(PieceType::Queen, Color::White))
        );
        board.undo_move(&undo);
        assert_eq!(board, before);
    }

    #[test]
    fn unresolved_promotion_applies_as_queen() {
        let mut board = Board::empty();
        board.put_piece(sq("E1"), Piece::new(PieceType::King, Color::White));
        board.put_piece(sq("E8"), Piece::new(PieceType::King, Color::Black));
        board.put_piece(sq("A7"), Piece::new(PieceType::Pawn, Color::White));

        // A caller-built move with no promotion choice; the generator only
        // emits explicit variants, so matching must fall back to Queen.
        let mv = Move {
            from: sq("A7"),
            to: sq("A8"),
            promotion: None,
            flags: MoveFlags::default(),
        };
        let undo = board.apply_move(&mv).unwrap();
        assert_eq!(
            board.piece_at(sq("A8")),
            Some(Piece::new(PieceType::Queen, Color::White))
        );
        assert_eq!(
            undo.mv.promotion,
            Some(PieceType::Queen),
            "record carries the resolved piece"
        );
    }

    #[test]
    fn counters_track_pawn_moves_and_captures() {
        let mut board = Board::new();
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 1);

        play(&mut board, "G1", "F3");
        assert_eq!(board.halfmove_clock(), 1);
        play(&mut board, "B8", "C6");
        assert_eq!(board.halfmove_clock(), 2);
        assert_eq!(board.fullmove_number(), 2);

        play(&mut board, "E2", "E4"); // pawn move resets the clock
        assert_eq!(board.halfmove_clock(), 0);
        assert!(!board.is_fifty_move_rule());
    }
}
