use thiserror::Error;

/// Why a prompt or answer does not fit the on-screen layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooLong {
    /// The prompt needs more wrapped lines than the quiz window shows.
    PromptLines { max: usize },
    /// An answer is wider than an answer button.
    Answer { length: usize, max: usize },
    /// The stored question block overflows its one-byte length prefix.
    Block { length: usize, max: usize },
}

impl std::fmt::Display for TooLong {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TooLong::PromptLines { max } => write!(f, "prompt wraps to more than {} lines", max),
            TooLong::Answer { length, max } => write!(f, "answer has {} characters, max is {}", length, max),
            TooLong::Block { length, max } => write!(f, "question block is {} bytes, max is {}", length, max),
        }
    }
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("disallowed character {character:?}: {reason}")]
    DisallowedCharacter { character: char, reason: &'static str },

    #[error("text too long: {0}")]
    TextTooLong(TooLong),

    #[error("expected {expected} answers, found {found}")]
    AnswerCount { expected: usize, found: usize },

    #[error("reference table has no byte for proper noun index {index}")]
    UnmappedProperNoun { index: usize },

    #[error("dictionary index {index} cannot be addressed by a two-byte token")]
    TokenIndexOutOfRange { index: usize },

    #[error("encoded question block is {length} bytes, a block must fit its one-byte length prefix")]
    BlockTooLong { length: usize },

    #[error("{count} categories present, at most {max} are supported")]
    TooManyCategories { count: usize, max: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("bad pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed question file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuizError>;
