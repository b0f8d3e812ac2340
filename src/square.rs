use std::fmt;

use serde::{Deserialize, Serialize};

/// A board coordinate. `file` 0–7 maps to files A–H, `rank` 0–7 maps to
/// ranks 1–8 (rank 0 is White's back rank). A constructed `Square` is always
/// in range; out-of-range input is rejected at the boundary.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Debug)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    /// Build a square from possibly out-of-range coordinates. UI callers
    /// probe arbitrary pixel-derived cells, so this returns `None` instead
    /// of panicking.
    pub fn new(file: i32, rank: i32) -> Option<Square> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    /// Offset by a (file, rank) delta, staying on the board.
    pub fn offset(self, df: i32, dr: i32) -> Option<Square> {
        Square::new(self.file as i32 + df, self.rank as i32 + dr)
    }

    /// Parse the two-character notation used in persisted games, e.g. "E2".
    /// Accepts lowercase file letters as well.
    pub fn from_notation(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = match bytes[0] {
            b'A'..=b'H' => bytes[0] - b'A',
            b'a'..=b'h' => bytes[0] - b'a',
            _ => return None,
        };
        let rank = match bytes[1] {
            b'1'..=b'8' => bytes[1] - b'1',
            _ => return None,
        };
        Some(Square { file, rank })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'A' + self.file) as char,
            (b'1' + self.rank) as char
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(Square::new(8, 0).is_none());
        assert!(Square::new(0, 8).is_none());
        assert!(Square::new(-1, 3).is_none());
        assert!(Square::new(3, -2).is_none());
        assert!(Square::new(7, 7).is_some());
    }

    #[test]
    fn offset_stays_on_board() {
        let e2 = Square::new(4, 1).unwrap();
        assert_eq!(e2.offset(0, 1), Square::new(4, 2));
        assert_eq!(e2.offset(-4, 0), Square::new(0, 1));
        assert_eq!(e2.offset(-5, 0), None);
        assert_eq!(e2.offset(0, -2), None);
    }

    #[test]
    fn notation_round_trip() {
        for file in 0..8 {
            for rank in 0..8 {
                let sq = Square::new(file, rank).unwrap();
                assert_eq!(Square::from_notation(&sq.to_string()), Some(sq));
            }
        }
        assert_eq!(Square::from_notation("e2"), Square::new(4, 1));
        assert_eq!(Square::from_notation("I1"), None);
        assert_eq!(Square::from_notation("A9"), None);
        assert_eq!(Square::from_notation("A"), None);
    }
}
