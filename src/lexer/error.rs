use thiserror::Error;

/// Recoverable problems found while scanning. Lexing never stops on these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexDiagnostic {
    #[error("Unexpected character '{character}' at line {line}, column {column}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Unterminated string literal at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },
    #[error("Integer literal '{literal}' does not fit in 64 bits at line {line}, column {column}")]
    IntegerOverflow {
        literal: String,
        line: usize,
        column: usize,
    },
}
