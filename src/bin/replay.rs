//! Replay a persisted game from a JSON move list and print the resulting
//! position, one status line per move. Reads the record array the backend
//! stores, e.g.:
//!
//!   [{"move":"E2E4","comment":"","start":"2020-05-01T10:00:00Z",...}, ...]
//!
//! Usage: replay <moves.json> [index]

use std::io::Read;

use chess_core::game::Game;
use chess_core::moves::MoveRecord;

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: replay <moves.json> [index]")?;
    let index: Option<usize> = match args.next() {
        Some(raw) => Some(raw.parse()?),
        None => None,
    };

    let json = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&path)?
    };
    let records: Vec<MoveRecord> = serde_json::from_str(&json)?;

    let mut game = Game::from_move_records(&records)?;

    for (i, record) in records.iter().enumerate() {
        let side = if i % 2 == 0 { "White" } else { "Black" };
        let mut line = format!("{:3}. {} {}", i + 1, side, record.notation);
        if let Some(promotion) = &record.promotion {
            line.push_str(&format!("={promotion}"));
        }
        if !record.comment.is_empty() {
            line.push_str(&format!("  ; {}", record.comment));
        }
        println!("{line}");
    }

    if let Some(index) = index {
        game.replay_to(index)?;
        println!("\nPosition after move {index}:");
    } else {
        println!("\nFinal position after {} moves:", game.move_count());
    }
    println!("{}", game.board());
    println!("Status: {:?}", game.status());
    if game.board().is_fifty_move_rule() {
        println!("Fifty-move rule applies: a draw may be claimed.");
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("replay: {e}");
        std::process::exit(1);
    }
}
