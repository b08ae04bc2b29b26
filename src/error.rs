//! Error types for the draft and scoring engine

use thiserror::Error;

/// Errors returned by engine entry points.
///
/// Data-completeness problems are not errors; the mapper returns them as
/// warnings alongside its output.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(
        "draft needs {required} picks ({player_count} players x {picks_per_player} picks) \
         but only {available} slots exist ({contestant_count} contestants x {max_owners} owners)"
    )]
    Capacity {
        required: usize,
        available: usize,
        player_count: usize,
        picks_per_player: usize,
        contestant_count: usize,
        max_owners: usize,
    },

    #[error(
        "a team cannot hold {picks_per_player} distinct contestants \
         from a pool of {contestant_count}"
    )]
    RosterTooLarge {
        picks_per_player: usize,
        contestant_count: usize,
    },

    #[error("player {player} has no draftable manual pick left (round {round}, pick {pick})")]
    ManualPicksExhausted {
        player: usize,
        round: usize,
        pick: usize,
    },

    #[error("no draftable contestant for player {player} (round {round}, pick {pick})")]
    NoDraftableContestant {
        player: usize,
        round: usize,
        pick: usize,
    },

    #[error("season {0} not found")]
    SeasonNotFound(u32),

    #[error("contestant {0} not found")]
    ContestantNotFound(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
