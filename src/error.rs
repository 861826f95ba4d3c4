use thiserror::Error;

/// The `Error` enum defines the possible errors that this crate can return.
///
/// Every error is synchronous: a failing call returns `Err` immediately and
/// never leaves partially-initialized state behind (matrices allocated by a
/// failing solve are freed before the error propagates).
#[derive(Debug, Error)]
pub enum Error {
    /// The requested `(F, T, SS, Al, WS)` combination violates the OTI /
    /// partition constraints (`Al in [1,8]`, `T % Al == 0`, `Al <= SS <= T`,
    /// `SS % Al == 0`, `F <= max transfer length`, or the padded
    /// source-symbol count per block exceeds the largest tabulated `K'`).
    #[error("construction rejected: {0}")]
    ConstructionRejected(String),

    /// `decode` was invoked with fewer received symbols than there are
    /// gaps in the source block; the caller must supply more repair
    /// symbols before decoding can be attempted.
    #[error("insufficient symbols: {gaps} gaps but only {repairs} repair symbols received")]
    InsufficientSymbols {
        /// number of source symbols still missing
        gaps: usize,
        /// number of repair symbols received so far
        repairs: usize,
    },

    /// Phase 1 could not find a nonzero row, or Phase 2 could not find a
    /// pivot: the received set is insufficient *in rank*, even though it
    /// was sufficient in count. The caller should request one or more
    /// additional, distinct repair symbols and retry.
    #[error("singular system: received symbols do not have full rank")]
    Singular,

    /// An encoded-symbol identifier `>= 2^20` was rejected.
    #[error("esi {0} is out of range")]
    InvalidEsi(u32),
}

#[allow(dead_code)]
impl Error {
    pub(crate) fn construction_rejected(msg: impl Into<String>) -> Self {
        Self::ConstructionRejected(msg.into())
    }
}

/// A specialized `Result` type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
