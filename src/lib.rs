pub mod board;
pub mod error;
pub mod game;
pub mod history;
pub mod moves;
pub mod piece;
pub mod square;

#[cfg(target_arch = "wasm32")]
mod wasm_api;
