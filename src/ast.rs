//! Syntax tree built by the parser and lowered by the code generator.
//!
//! Only statement structure is modelled. Expressions and conditions stay as
//! [`RawExpression`] text: the front end never parses them, the generator
//! splices them into the output verbatim, and the host dialect is the first
//! thing to give them meaning.

use std::fmt;

/// Expression text captured from source tokens. Not parsed, re-emitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawExpression(String);

impl RawExpression {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RawExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    /// Single assignment; the default for every declaration.
    #[default]
    Immutable,
    /// Reassignable; only produced for a for-loop initializer.
    Mutable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: Option<RawExpression>,
    pub binding: Binding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Declaration(Declaration),
    Print {
        expression: RawExpression,
    },
    If {
        condition: RawExpression,
        body: Program,
        else_body: Option<Program>,
    },
    For {
        init: Option<Box<Statement>>,
        condition: RawExpression,
        increment: RawExpression,
        body: Program,
    },
}

impl Statement {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Declaration(_) => "declaration",
            Self::Print { .. } => "print",
            Self::If { .. } => "if",
            Self::For { .. } => "for",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub body: Vec<Statement>,
}
