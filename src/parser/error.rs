use thiserror::Error;

/// Fatal parse failures. No partial program is produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expected '{expected}' {context}, found {found} at line {line}, column {column}")]
    ExpectedToken {
        expected: &'static str,
        context: String,
        found: String,
        line: usize,
        column: usize,
    },
    #[error("Expected variable name after '{keyword}', found {found} at line {line}, column {column}")]
    ExpectedName {
        keyword: String,
        found: String,
        line: usize,
        column: usize,
    },
    #[error("Expected expression after '{keyword}' at line {line}, column {column}")]
    ExpectedExpression {
        keyword: String,
        line: usize,
        column: usize,
    },
    #[error("Unexpected '{keyword}' without a preceding condition at line {line}, column {column}")]
    UnexpectedKeyword {
        keyword: String,
        line: usize,
        column: usize,
    },
}
