use log::{debug, trace};

use crate::ast::{Binding, Declaration, Program, RawExpression, Statement};
use crate::keywords::{KeywordTable, Role};
use crate::token::{Operator, Token, TokenKind};

mod error;

pub use error::ParseError;

/// Recursive-descent parser over an immutable token slice.
///
/// Consumption is a cursor move. Block bodies are located by delimiter
/// matching and handed to a fresh parser over the sub-slice.
pub struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    position: usize,
    keywords: &'t KeywordTable,
}

impl<'t, 'a> Parser<'t, 'a> {
    pub fn new(tokens: &'t [Token<'a>], keywords: &'t KeywordTable) -> Self {
        Self {
            tokens,
            position: 0,
            keywords,
        }
    }

    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        while let Some(token) = self.advance() {
            match self.role(token) {
                Some(role) => body.push(self.parse_statement(role, token)?),
                None => debug!(
                    "Skipping stray token {} at line {}, column {}",
                    token.kind, token.span.line, token.span.column
                ),
            }
        }
        Ok(Program { body })
    }

    fn parse_statement(
        &mut self,
        role: Role,
        keyword: &'t Token<'a>,
    ) -> Result<Statement, ParseError> {
        match role {
            Role::Declare => self.parse_declaration(keyword).map(Statement::Declaration),
            Role::Print => self.parse_print(keyword),
            Role::If => self.parse_if(keyword),
            Role::Else => Err(ParseError::UnexpectedKeyword {
                keyword: keyword.kind.to_string(),
                line: keyword.span.line,
                column: keyword.span.column,
            }),
            Role::For => self.parse_for(keyword),
        }
    }

    fn parse_declaration(&mut self, keyword: &'t Token<'a>) -> Result<Declaration, ParseError> {
        let name = match self.peek() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => {
                self.advance();
                name.to_string()
            }
            found => {
                let (line, column) = self.location(found);
                return Err(ParseError::ExpectedName {
                    keyword: keyword.kind.to_string(),
                    found: describe(found),
                    line,
                    column,
                });
            }
        };

        let value = if matches!(
            self.peek().map(Token::kind),
            Some(TokenKind::Operator(Operator::Assign))
        ) {
            self.advance();
            Some(self.capture_expression())
        } else {
            None
        };
        self.skip_terminator();

        Ok(Declaration {
            name,
            value,
            binding: Binding::Immutable,
        })
    }

    fn parse_print(&mut self, keyword: &'t Token<'a>) -> Result<Statement, ParseError> {
        let expression = self.capture_expression();
        if expression.is_empty() {
            return Err(ParseError::ExpectedExpression {
                keyword: keyword.kind.to_string(),
                line: keyword.span.line,
                column: keyword.span.column,
            });
        }
        self.skip_terminator();
        Ok(Statement::Print { expression })
    }

    fn parse_if(&mut self, keyword: &'t Token<'a>) -> Result<Statement, ParseError> {
        self.expect(TokenKind::LParen, "(", &format!("after '{}'", keyword.kind))?;
        let condition = raw_text(self.delimited(
            TokenKind::LParen,
            TokenKind::RParen,
            ")",
            "after condition",
        )?);
        let body = self.parse_block("after condition", "after if body")?;

        let else_body = match self.peek() {
            Some(token) if self.role(token) == Some(Role::Else) => {
                self.advance();
                let context = format!("after '{}'", token.kind);
                Some(self.parse_block(&context, "after else body")?)
            }
            _ => None,
        };

        Ok(Statement::If {
            condition,
            body,
            else_body,
        })
    }

    fn parse_for(&mut self, keyword: &'t Token<'a>) -> Result<Statement, ParseError> {
        self.expect(TokenKind::LParen, "(", &format!("after '{}'", keyword.kind))?;
        let init_tokens = self.until_semicolon("after loop initializer")?;
        let condition = raw_text(self.until_semicolon("after loop condition")?);
        let increment = raw_text(self.delimited(
            TokenKind::LParen,
            TokenKind::RParen,
            ")",
            "after loop increment",
        )?);
        let body = self.parse_block("after loop header", "after loop body")?;

        let init = Parser::new(init_tokens, self.keywords)
            .parse_program()?
            .body
            .into_iter()
            .next()
            .map(|statement| match statement {
                Statement::Declaration(declaration) => Statement::Declaration(Declaration {
                    binding: Binding::Mutable,
                    ..declaration
                }),
                other => other,
            })
            .map(Box::new);

        Ok(Statement::For {
            init,
            condition,
            increment,
            body,
        })
    }

    fn parse_block(&mut self, open_context: &str, close_context: &str) -> Result<Program, ParseError> {
        self.expect(TokenKind::LBrace, "{", open_context)?;
        let inner = self.delimited(TokenKind::LBrace, TokenKind::RBrace, "}", close_context)?;
        trace!("Parsing block of {} tokens", inner.len());
        Parser::new(inner, self.keywords).parse_program()
    }

    /// Captures tokens up to the next keyword, `}` or `;`.
    fn capture_expression(&mut self) -> RawExpression {
        let tokens = self.tokens;
        let start = self.position;
        while let Some(token) = self.peek() {
            if matches!(
                token.kind,
                TokenKind::Keyword(_) | TokenKind::RBrace | TokenKind::Semicolon
            ) {
                break;
            }
            self.advance();
        }
        raw_text(&tokens[start..self.position])
    }

    /// Returns the tokens before the `close` matching an already consumed
    /// `open`, and consumes the `close`.
    fn delimited(
        &mut self,
        open: TokenKind<'a>,
        close: TokenKind<'a>,
        expected: &'static str,
        context: &str,
    ) -> Result<&'t [Token<'a>], ParseError> {
        let tokens = self.tokens;
        let start = self.position;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                if depth == 0 {
                    let inner = &tokens[start..self.position];
                    self.advance();
                    return Ok(inner);
                }
                depth -= 1;
            }
            self.advance();
        }
        Err(self.expected(expected, context, None))
    }

    /// Returns the tokens before the next top-level `;` and consumes it.
    fn until_semicolon(&mut self, context: &str) -> Result<&'t [Token<'a>], ParseError> {
        let tokens = self.tokens;
        let start = self.position;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Semicolon if depth == 0 => {
                    let inner = &tokens[start..self.position];
                    self.advance();
                    return Ok(inner);
                }
                TokenKind::LParen => depth += 1,
                TokenKind::RParen if depth == 0 => break,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            self.advance();
        }
        Err(self.expected(";", context, self.peek()))
    }

    fn expect(
        &mut self,
        kind: TokenKind<'a>,
        expected: &'static str,
        context: &str,
    ) -> Result<(), ParseError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.advance();
                Ok(())
            }
            found => Err(self.expected(expected, context, found)),
        }
    }

    fn skip_terminator(&mut self) {
        if matches!(self.peek().map(Token::kind), Some(TokenKind::Semicolon)) {
            self.advance();
        }
    }

    fn role(&self, token: &Token<'a>) -> Option<Role> {
        match token.kind {
            TokenKind::Keyword(word) => self.keywords.role_of(word),
            _ => None,
        }
    }

    fn advance(&mut self) -> Option<&'t Token<'a>> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.position)
    }

    /// Position of `found`, or of the last token when input ran out.
    fn location(&self, found: Option<&Token<'a>>) -> (usize, usize) {
        found
            .or(self.tokens.last())
            .map(|token| (token.span.line, token.span.column))
            .unwrap_or((1, 0))
    }

    fn expected(&self, expected: &'static str, context: &str, found: Option<&Token<'a>>) -> ParseError {
        let (line, column) = self.location(found);
        ParseError::ExpectedToken {
            expected,
            context: context.to_string(),
            found: describe(found),
            line,
            column,
        }
    }
}

fn describe(token: Option<&Token<'_>>) -> String {
    match token {
        Some(token) => format!("'{}'", token.kind),
        None => "end of input".to_string(),
    }
}

/// Concatenates tokens, keeping a single space only where the source had a
/// gap. Adjacent operators such as `+` `+` or `!=` `=` rejoin as `++` and `!==`.
fn raw_text(tokens: &[Token<'_>]) -> RawExpression {
    let mut text = String::new();
    let mut previous_end = None;
    for token in tokens {
        let span = token.span();
        if let Some(end) = previous_end
            && end < span.start
        {
            text.push(' ');
        }
        text.push_str(&token.kind.to_string());
        previous_end = Some(span.end);
    }
    RawExpression::new(text)
}

/// Parses a whole token sequence into a [`Program`].
pub fn parse(tokens: &[Token<'_>], keywords: &KeywordTable) -> Result<Program, ParseError> {
    Parser::new(tokens, keywords).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::Language;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse_source(source: &str, language: Language) -> Result<Program, ParseError> {
        let keywords = language.keywords();
        let tokens = tokenize(source, keywords);
        parse(&tokens, keywords)
    }

    fn raw(text: &str) -> RawExpression {
        RawExpression::new(text)
    }

    fn declare(name: &str, value: &str) -> Statement {
        Statement::Declaration(Declaration {
            name: name.to_string(),
            value: Some(raw(value)),
            binding: Binding::Immutable,
        })
    }

    fn print(expression: &str) -> Statement {
        Statement::Print {
            expression: raw(expression),
        }
    }

    #[test]
    fn parses_simple_program() {
        let input = indoc! {"
            srsti x = 10
            srsti y = 20
            srsti sum = x + y
            mudrisu sum
        "};
        let program = parse_source(input, Language::Kannada).expect("parse failed");

        let expected = Program {
            body: vec![
                declare("x", "10"),
                declare("y", "20"),
                declare("sum", "x + y"),
                print("sum"),
            ],
        };
        assert_eq!(program, expected);
    }

    #[test]
    fn semicolons_terminate_statements() {
        let program = parse_source("srsti x = 10; srsti y; mudrisu x;", Language::Kannada)
            .expect("parse failed");
        assert_eq!(
            program.body,
            vec![
                declare("x", "10"),
                Statement::Declaration(Declaration {
                    name: "y".to_string(),
                    value: None,
                    binding: Binding::Immutable,
                }),
                print("x"),
            ]
        );
    }

    #[test]
    fn print_requotes_string_literals_and_captures_expressions() {
        let program = parse_source("mudran \"namaste\" mudran x * 2", Language::Sanskrit)
            .expect("parse failed");
        assert_eq!(program.body, vec![print("\"namaste\""), print("x * 2")]);
    }

    #[test]
    fn parses_if_else_with_recursive_bodies() {
        let input = indoc! {"
            yadhi (x > y) {
                mudran x
            } anyatha {
                srsti z = y
                mudran z
            }
        "};
        let program = parse_source(input, Language::Sanskrit).expect("parse failed");
        assert_eq!(
            program.body,
            vec![Statement::If {
                condition: raw("x > y"),
                body: Program {
                    body: vec![print("x")],
                },
                else_body: Some(Program {
                    body: vec![declare("z", "y"), print("z")],
                }),
            }]
        );
    }

    #[test]
    fn nested_blocks_match_their_own_braces() {
        let input = indoc! {"
            onduVele (a) {
                onduVele ((b)) {
                    mudrisu b
                }
                mudrisu a
            }
            mudrisu c
        "};
        let program = parse_source(input, Language::Kannada).expect("parse failed");
        assert_eq!(
            program.body,
            vec![
                Statement::If {
                    condition: raw("a"),
                    body: Program {
                        body: vec![
                            Statement::If {
                                condition: raw("(b)"),
                                body: Program {
                                    body: vec![print("b")],
                                },
                                else_body: None,
                            },
                            print("a"),
                        ],
                    },
                    else_body: None,
                },
                print("c"),
            ]
        );
    }

    #[test]
    fn for_initializer_is_promoted_to_mutable_binding() {
        let program = parse_source(
            "matte (srsti i = 0; i < 5; i = i + 1) { mudrisu i }",
            Language::Kannada,
        )
        .expect("parse failed");
        assert_eq!(
            program.body,
            vec![Statement::For {
                init: Some(Box::new(Statement::Declaration(Declaration {
                    name: "i".to_string(),
                    value: Some(raw("0")),
                    binding: Binding::Mutable,
                }))),
                condition: raw("i < 5"),
                increment: raw("i = i + 1"),
                body: Program {
                    body: vec![print("i")],
                },
            }]
        );
    }

    #[test]
    fn both_lexicons_build_the_same_tree() {
        let kannada = parse_source(
            "srsti n = 3 onduVele (n == 3) { mudrisu n } illadiddare { mudrisu 0 }",
            Language::Kannada,
        )
        .expect("kannada parse failed");
        let sanskrit = parse_source(
            "srsti n = 3 yadhi (n == 3) { mudran n } anyatha { mudran 0 }",
            Language::Sanskrit,
        )
        .expect("sanskrit parse failed");
        assert_eq!(kannada, sanskrit);
    }

    #[test]
    fn skips_tokens_outside_statements() {
        let program = parse_source("x ; } mudrisu x", Language::Kannada).expect("parse failed");
        assert_eq!(program.body, vec![print("x")]);
    }

    #[test]
    fn errors_on_missing_condition_paren() {
        let error = parse_source("onduVele x > 1 { mudrisu x }", Language::Kannada)
            .expect_err("expected parse failure");
        assert_eq!(
            error,
            ParseError::ExpectedToken {
                expected: "(",
                context: "after 'onduVele'".to_string(),
                found: "'x'".to_string(),
                line: 1,
                column: 9,
            }
        );
    }

    #[test]
    fn errors_on_unclosed_block() {
        let error = parse_source("yadhi (x) { mudran x", Language::Sanskrit)
            .expect_err("expected parse failure");
        assert!(
            error
                .to_string()
                .starts_with("Expected '}' after if body, found end of input")
        );
    }

    #[test]
    fn errors_on_missing_name_and_expression() {
        let error = parse_source("srsti = 4", Language::Kannada).expect_err("expected failure");
        assert!(matches!(error, ParseError::ExpectedName { ref keyword, .. } if keyword == "srsti"));

        for source in ["srsti 5 = 1", "srsti \"x\" = 1", "srsti ( = 1"] {
            let error = parse_source(source, Language::Kannada).expect_err("expected failure");
            assert!(
                matches!(error, ParseError::ExpectedName { line: 1, column: 6, .. }),
                "{source}: {error:?}"
            );
        }

        let error = parse_source("mudrisu", Language::Kannada).expect_err("expected failure");
        assert_eq!(
            error,
            ParseError::ExpectedExpression {
                keyword: "mudrisu".to_string(),
                line: 1,
                column: 0,
            }
        );
    }

    #[test]
    fn errors_on_else_without_if() {
        let error = parse_source("anyatha { mudran 1 }", Language::Sanskrit)
            .expect_err("expected failure");
        assert!(matches!(error, ParseError::UnexpectedKeyword { .. }));
    }

    #[test]
    fn errors_on_malformed_loop_header() {
        let error = parse_source("punah (srsti i = 0) { mudran i }", Language::Sanskrit)
            .expect_err("expected failure");
        assert!(
            error
                .to_string()
                .starts_with("Expected ';' after loop initializer, found ')'")
        );
    }

    #[test]
    fn adjacent_operators_rejoin_into_host_operators() {
        let program = parse_source(
            "matte (srsti i = 0; i < 3; i++) { i += 1 mudrisu a !== b }",
            Language::Kannada,
        )
        .expect("parse failed");
        let Statement::For {
            condition,
            increment,
            body,
            ..
        } = &program.body[0]
        else {
            panic!("expected for statement, got {program:?}");
        };
        assert_eq!(condition, &raw("i < 3"));
        assert_eq!(increment, &raw("i++"));
        assert_eq!(body.body, vec![print("a !== b")]);
    }

    #[test]
    fn raw_text_keeps_source_gaps() {
        let program = parse_source("mudrisu x - -1 mudrisu (x+1)*2", Language::Kannada)
            .expect("parse failed");
        assert_eq!(program.body, vec![print("x - -1"), print("(x+1)*2")]);
    }

    #[test]
    fn compound_assignment_increment_is_rejoined() {
        let program = parse_source("punah (srsti i = 9; i > 0; i += -3) { mudran i }", Language::Sanskrit)
            .expect("parse failed");
        assert!(matches!(
            &program.body[0],
            Statement::For { increment, .. } if increment.as_str() == "i += -3"
        ));
    }
}
