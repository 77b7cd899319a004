use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Overlapping alphabets, undeclared symbols or a bad axiom.
    #[error("invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("invalid symbol `{0}`: not a symbol of the grammar")]
    InvalidSymbol(char),

    #[error("repeated cell ({non_terminal}, {terminal})")]
    RepeatedCell { non_terminal: char, terminal: char },

    #[error("syntax error: {0}")]
    Syntax(String),

    /// Raised by the grammar notation reader.
    #[error("Line {line}: {message}")]
    Notation { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
