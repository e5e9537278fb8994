use thiserror::Error;

/// The type returned by multiscan operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while ingesting patterns or selecting an engine.
///
/// Scanning itself has no error path: once a pattern set has been
/// validated and an engine built over it, `scan` cannot fail on any
/// input buffer.
#[derive(Debug, Error)]
pub enum Error {
    /// An engine was requested over a pattern set with no patterns.
    #[error("pattern set is empty")]
    EmptyPatternSet,

    /// A pattern with no bytes was handed to the core.
    #[error("pattern {0} is empty")]
    EmptyPattern(usize),

    /// A pattern exceeded the implementation ceiling.
    #[error("pattern {id} is {len} bytes long, limit is {max}")]
    PatternTooLong {
        /// Index of the offending pattern.
        id: usize,
        /// Its length in bytes.
        len: usize,
        /// The ceiling it exceeded.
        max: usize,
    },

    /// The algorithm selector letter was not recognised.
    #[error("invalid algorithm selector: {0:?}")]
    InvalidAlgorithm(char),

    /// An unknown pattern flag letter.
    #[error("invalid pattern flag: {0:?}")]
    InvalidFlag(char),

    /// A rules or payload file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
