/// Domain errors for the engine.
///
/// Deliberately small: out-of-range square queries return empty results,
/// undo on an empty history is a no-op, and an unresolved promotion defaults
/// to Queen. None of those are error conditions.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("illegal move for the current position: {mv}")]
    IllegalMove { mv: String },

    #[error("invalid move notation: {0}")]
    InvalidNotation(String),

    #[error("replay index {index} out of range (history has {len} moves)")]
    ReplayOutOfRange { index: usize, len: usize },
}
