use thiserror::Error;

/// Faults raised while running generated text.
///
/// Messages follow the host dialect's own wording because they are shown to
/// the user verbatim after an `Error: ` prefix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Invalid or unexpected token")]
    InvalidToken,
    /// `found` reads like "number", "identifier 'x'" or "token ';'".
    #[error("Unexpected {found}")]
    Unexpected { found: String },
    #[error("Missing initializer in const declaration")]
    MissingInitializer,
    #[error("Invalid left-hand side in assignment")]
    InvalidAssignmentTarget,
    #[error("Identifier '{name}' has already been declared")]
    Redeclaration { name: String },
    #[error("{name} is not defined")]
    UndefinedVariable { name: String },
    #[error("Cannot access '{name}' before initialization")]
    UninitializedBinding { name: String },
    #[error("Assignment to constant variable.")]
    ConstantAssignment { name: String },
    #[error("{callee} is not a function")]
    NotCallable { callee: String },
    #[error("Cannot read properties of {target} (reading '{property}')")]
    NullishPropertyAccess { target: String, property: String },
    #[error("Execution step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },
}

impl RuntimeError {
    /// True for faults detected before any statement ran.
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken
                | Self::Unexpected { .. }
                | Self::MissingInitializer
                | Self::InvalidAssignmentTarget
                | Self::Redeclaration { .. }
        )
    }
}
