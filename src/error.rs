/// Errors produced while compressing or decompressing.
#[derive(Debug, thiserror::Error)]
pub enum HuffError {
    /// The input held no symbols, so there is no tree to build.
    #[error("input is empty, nothing to compress")]
    EmptyInput,

    /// More entries were inserted into the priority queue than it can hold.
    #[error("priority queue overflow: capacity is {capacity} entries")]
    QueueOverflow { capacity: usize },

    /// The priority queue was read while empty.
    #[error("priority queue is empty")]
    QueueUnderflow,

    /// The compressed stream is not in the expected format or ends early.
    #[error("malformed stream: {0}")]
    MalformedStream(String),

    /// A symbol to encode has no code in the table.
    #[error("no code for symbol {0:#04x}")]
    UnknownSymbol(u8),

    /// The input holds more symbols than the header can record.
    #[error("input too large: {0} symbols do not fit in the header")]
    InputTooLarge(usize),
}

pub type Result<T> = std::result::Result<T, HuffError>;

impl HuffError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        HuffError::MalformedStream(reason.into())
    }
}
