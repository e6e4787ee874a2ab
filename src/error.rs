use thiserror::Error;

use crate::{Rank, Seat};

/// Rejected input, reported before any search starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidHandError {
    #[error("rank {rank:?} is held by both {first:?} and {second:?}")]
    Overlap {
        rank: Rank,
        first: Seat,
        second: Seat,
    },

    #[error("rank {0:?} appears more than once in one hand")]
    Duplicate(Rank),

    #[error("entries must not be negative: {0}")]
    NegativeEntries(i64),

    #[error("bad entry count: {0}")]
    BadEntries(String),

    #[error("rank out of range: {0}")]
    RankOutOfRange(u8),

    #[error("bad rank symbol: {0}")]
    BadSymbol(char),

    #[error("bad layout: {0}")]
    BadLayout(String),
}
