//! Core engine for crossword-board game analysis: move generation, Monte-Carlo
//! simulation, and rack inference over a 15x15 bonus-square board.
//!
//! GCG/CGP parsing pipelines, the UCGI protocol loop, and file formats for
//! KWG/KLV/letter-distribution data are treated as external collaborators;
//! this crate specifies their in-memory contract, not their on-disk layout.

pub mod board;
pub mod combinatorics;
pub mod config;
pub mod control;
pub mod error;
pub mod game;
pub mod infer;
pub mod lexicon;
pub mod movegen;
pub mod simulate;
pub mod tiles;

pub use error::Error;

/// Number of tiles on a standard rack.
pub const RACK_SIZE: usize = 7;
/// Board dimension (rows == cols) for the classic crossword-game board.
pub const BOARD_DIM: usize = 15;
/// Bonus awarded for playing all `RACK_SIZE` tiles in one placement.
pub const DEFAULT_BINGO_BONUS: i32 = 50;
/// Consecutive scoreless turns (across both players) that end the game.
pub const MAX_SCORELESS_TURNS: u8 = 6;
/// Backup-stack depth bound used by the simulator's try/unplay discipline.
pub const MAX_SEARCH_DEPTH: usize = 32;
/// Hard ceiling on worker thread count for any parallel operation.
pub const MAX_THREADS: usize = 512;

/// High bit of a machine-letter byte: set when the letter was played from a blank.
pub const BLANK_MASK: u8 = 0x80;
/// Sentinel tile value used inside a placement's tile array to mean
/// "use whatever letter is already on the board at this square."
pub const PLAYED_THROUGH_MARKER: u8 = 0x7F;
/// Sentinel marking an empty board square.
pub const EMPTY_SQUARE_MARKER: u8 = 0;

/// Strip the blank-origin bit from a machine letter.
pub const fn unblank(ml: u8) -> u8 {
    ml & !BLANK_MASK
}
/// Set the blank-origin bit on a machine letter.
pub const fn blanked(ml: u8) -> u8 {
    ml | BLANK_MASK
}
/// Whether this machine letter was played from a blank tile.
pub const fn is_blanked(ml: u8) -> bool {
    ml & BLANK_MASK != 0
}

/// Z-values for the simulator's normal-approximation stopping condition.
pub mod z_value {
    pub const Z95: f32 = 1.96;
    pub const Z98: f32 = 2.326;
    pub const Z99: f32 = 2.576;
}

/// initialize a combined terminal logger.
pub fn init_logging() {
    use simplelog::*;
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    let term = TermLogger::new(
        LevelFilter::Info,
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
    let _ = CombinedLogger::init(vec![term]);
}
