use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("payload truncated: wanted {wanted} bytes at offset {offset}, have {have}")]
    Truncated {
        offset: usize,
        wanted: usize,
        have: usize,
    },

    #[error("uint at offset {0} does not fit the target width")]
    Overflow(usize),

    #[error("word at offset {0} is not a valid boolean")]
    InvalidBool(usize),

    #[error("word at offset {0} is not a left-padded address")]
    InvalidAddress(usize),

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("aggregated call {0} reported failure")]
    CallFailed(usize),

    #[error("log is missing its indexed proposal id topic")]
    MissingTopic,
}
