//! Typed error surface for every fallible boundary in the engine.
//!
//! Internal invariants (cross-set consistency, anchor consistency, shadow-pass
//! prune validity) are not represented here: a violation indicates a bug in
//! this crate, not a caller mistake, and is `debug_assert!`-guarded at the
//! call site instead.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A CGP position string did not have the expected four whitespace-separated fields.
    MalformedCgp(String),
    /// A rack or board string contained a glyph not present in the letter distribution.
    InvalidRackLetter(String),
    /// An exchange was attempted with fewer than `RACK_SIZE` tiles in the bag.
    ExchangeNotAllowed,
    /// A rack would exceed `RACK_SIZE` tiles.
    RackOverflow,
    /// A named lexicon has no corresponding loaded KWG/KLV.
    UnknownLexicon(String),
    /// The two players' lexicons disagree in a context that requires them to match.
    IncompatiblePlayerLexicons,
    /// Inference precondition: the observed move played no tiles.
    NoTilesPlayed,
    /// Inference precondition: the input describes both a placement and an exchange.
    BothPlayAndExchange,
    /// Inference precondition: an exchange was reported with a nonzero score.
    ExchangeScoreNotZero,
    /// Inference precondition: a tile claimed as played is not available in the bag-as-rack.
    TilesPlayedNotInBag,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedCgp(s) => write!(f, "malformed CGP string: {s}"),
            Error::InvalidRackLetter(s) => write!(f, "invalid letter in rack/board string: {s}"),
            Error::ExchangeNotAllowed => write!(f, "exchange not allowed: fewer than RACK_SIZE tiles in bag"),
            Error::RackOverflow => write!(f, "rack would exceed RACK_SIZE tiles"),
            Error::UnknownLexicon(s) => write!(f, "unknown lexicon: {s}"),
            Error::IncompatiblePlayerLexicons => write!(f, "players' lexicons are incompatible for this operation"),
            Error::NoTilesPlayed => write!(f, "inference: observed move played no tiles"),
            Error::BothPlayAndExchange => write!(f, "inference: move cannot be both a play and an exchange"),
            Error::ExchangeScoreNotZero => write!(f, "inference: exchange reported a nonzero score"),
            Error::TilesPlayedNotInBag => write!(f, "inference: played tiles are not available in the bag"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
