use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::piece::PieceType;
use crate::square::Square;

#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Debug)]
pub struct MoveFlags {
    pub is_capture: bool,
    pub is_castle: bool,
    pub is_en_passant: bool,
}

/// One half-move. Immutable once produced by the move generator; the flags
/// describe how `Board::apply_move` must execute it.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
    pub flags: MoveFlags,
}

impl Move {
    /// Four-character notation used in persisted games, e.g. "E2E4".
    /// Promotion choice travels separately (see [`MoveRecord`]).
    pub fn notation(&self) -> String {
        format!("{}{}", self.from, self.to)
    }

    /// Parse "E2E4"-style notation into a from/to pair. Flags and promotion
    /// are not encoded in the notation; the board resolves them when the
    /// move is matched against the legal set.
    pub fn parse_notation(s: &str) -> Option<(Square, Square)> {
        if s.len() != 4 {
            return None;
        }
        let from = Square::from_notation(s.get(..2)?)?;
        let to = Square::from_notation(s.get(2..)?)?;
        Some((from, to))
    }

    /// Sort key for deterministic move ordering: destination square first,
    /// then promotion piece. Test fixtures depend on this being stable.
    pub(crate) fn ordering_key(&self) -> (u8, u8, u8) {
        let promo = match self.promotion {
            None => 0,
            Some(PieceType::Queen) => 1,
            Some(PieceType::Rook) => 2,
            Some(PieceType::Bishop) => 3,
            Some(PieceType::Knight) => 4,
            Some(_) => 5,
        };
        (self.to.rank, self.to.file, promo)
    }
}

/// Caller-owned metadata attached to a history entry. The engine never
/// interprets it; it only carries it through the persistence round trip.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct MoveAnnotation {
    pub comment: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Wire shape exchanged with the persistence layer: one record per
/// half-move, in play order. The board can be fully reconstructed by
/// replaying these sequentially.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct MoveRecord {
    /// "E2E4"-style from/to notation.
    #[serde(rename = "move")]
    pub notation: String,
    /// Promotion piece name ("Queen", "Rook", "Bishop", "Knight"), present
    /// only for promotion moves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notation_round_trip() {
        let mv = Move {
            from: Square::new(4, 1).unwrap(),
            to: Square::new(4, 3).unwrap(),
            promotion: None,
            flags: MoveFlags::default(),
        };
        assert_eq!(mv.notation(), "E2E4");
        assert_eq!(Move::parse_notation("E2E4"), Some((mv.from, mv.to)));
        assert_eq!(Move::parse_notation("E2E"), None);
        assert_eq!(Move::parse_notation("E2E9"), None);
        assert_eq!(Move::parse_notation("E2E4Q"), None);
    }

    #[test]
    fn move_record_json_shape() {
        let record = MoveRecord {
            notation: "A7A8".to_string(),
            promotion: Some("Queen".to_string()),
            comment: "promoting".to_string(),
            start: None,
            end: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"move\":\"A7A8\""));
        assert!(json.contains("\"promotion\":\"Queen\""));
        // Absent timestamps are omitted entirely, not serialized as null.
        assert!(!json.contains("start"));

        let parsed: MoveRecord = serde_json::from_str("{\"move\":\"E2E4\"}").unwrap();
        assert_eq!(parsed.notation, "E2E4");
        assert_eq!(parsed.promotion, None);
        assert_eq!(parsed.comment, "");
    }
}
