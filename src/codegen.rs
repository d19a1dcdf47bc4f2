use thiserror::Error;

use crate::ast::{Binding, Declaration, Program, Statement};

/// Internal inconsistencies between the parser and the generator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Loop initializer must be a declaration, found {found} statement")]
    UnsupportedLoopInitializer { found: &'static str },
}

/// Lowers a [`Program`] into host-dialect (JavaScript subset) source.
///
/// One line per statement, nested bodies indented by four spaces. The output
/// depends only on statement roles, so equivalent programs written in either
/// lexicon lower to identical text.
pub struct CodeGenerator;

impl CodeGenerator {
    pub fn generate(&self, program: &Program) -> Result<String, GenerateError> {
        let mut output = String::new();
        self.emit_block(program, 0, &mut output)?;
        Ok(output)
    }

    fn emit_block(&self, program: &Program, indent: usize, output: &mut String) -> Result<(), GenerateError> {
        for statement in &program.body {
            self.emit_statement(statement, indent, output)?;
        }
        Ok(())
    }

    fn emit_statement(
        &self,
        statement: &Statement,
        indent: usize,
        output: &mut String,
    ) -> Result<(), GenerateError> {
        match statement {
            Statement::Declaration(declaration) => {
                let declaration = self.emit_declaration(declaration);
                self.push_line(output, indent, &format!("{declaration};"));
            }
            Statement::Print { expression } => {
                self.push_line(output, indent, &format!("console.log({expression});"));
            }
            Statement::If {
                condition,
                body,
                else_body,
            } => {
                self.push_line(output, indent, &format!("if ({condition}) {{"));
                self.emit_block(body, indent + 1, output)?;
                if let Some(else_body) = else_body {
                    self.push_line(output, indent, "} else {");
                    self.emit_block(else_body, indent + 1, output)?;
                }
                self.push_line(output, indent, "}");
            }
            Statement::For {
                init,
                condition,
                increment,
                body,
            } => {
                let init = match init.as_deref() {
                    None => String::new(),
                    Some(Statement::Declaration(declaration)) => self.emit_declaration(declaration),
                    Some(other) => {
                        return Err(GenerateError::UnsupportedLoopInitializer {
                            found: other.kind_name(),
                        });
                    }
                };
                self.push_line(
                    output,
                    indent,
                    &format!("for ({init}; {condition}; {increment}) {{"),
                );
                self.emit_block(body, indent + 1, output)?;
                self.push_line(output, indent, "}");
            }
        }
        Ok(())
    }

    fn emit_declaration(&self, declaration: &Declaration) -> String {
        let keyword = match declaration.binding {
            Binding::Immutable => "const",
            Binding::Mutable => "let",
        };
        let value = declaration
            .value
            .as_ref()
            .map(|value| value.as_str())
            .unwrap_or("null");
        format!("{keyword} {} = {value}", declaration.name)
    }

    fn push_line(&self, output: &mut String, indent: usize, line: &str) {
        for _ in 0..indent {
            output.push_str("    ");
        }
        output.push_str(line);
        output.push('\n');
    }
}

pub fn generate(program: &Program) -> Result<String, GenerateError> {
    CodeGenerator.generate(program)
}
