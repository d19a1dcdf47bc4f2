use std::{iter::Peekable, str::CharIndices};

use log::warn;

use crate::keywords::KeywordTable;
use crate::token::{Operator, Span, Token, TokenKind};

mod error;

pub use error::LexDiagnostic;

pub struct Lexer<'a, 'k> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    keywords: &'k KeywordTable,
    diagnostics: Vec<LexDiagnostic>,
    line: usize,
    column: usize,
}

impl<'a, 'k> Lexer<'a, 'k> {
    pub fn new(input: &'a str, keywords: &'k KeywordTable) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            keywords,
            diagnostics: Vec::new(),
            line: 1,
            column: 0,
        }
    }

    /// Diagnostics reported so far, in source order.
    pub fn diagnostics(&self) -> &[LexDiagnostic] {
        &self.diagnostics
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        loop {
            self.skip_whitespace();

            let &(start, ch) = self.chars.peek()?;
            let line = self.line;
            let column = self.column;
            let punctuation = match ch {
                '(' => Some(TokenKind::LParen),
                ')' => Some(TokenKind::RParen),
                '{' => Some(TokenKind::LBrace),
                '}' => Some(TokenKind::RBrace),
                ';' => Some(TokenKind::Semicolon),
                _ => None,
            };
            if let Some(kind) = punctuation {
                self.advance_char();
                return Some(self.token(kind, start, line, column));
            }

            match ch {
                c if c.is_ascii_alphabetic() || c == '_' => {
                    return Some(self.read_word(start, line, column));
                }
                c if c.is_ascii_digit() => return Some(self.read_number(start, line, column)),
                '"' => return Some(self.read_string(start, line, column)),
                c => {
                    if let Some(op) = Operator::from_char(c) {
                        return Some(self.read_operator(op, start, line, column));
                    }
                    self.advance_char();
                    self.report(LexDiagnostic::UnexpectedCharacter {
                        character: c,
                        line,
                        column,
                    });
                }
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first char
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }

        let end = self.current_index();
        let word = &self.input[start..end];
        let kind = if self.keywords.is_keyword(word) {
            TokenKind::Keyword(word)
        } else {
            TokenKind::Identifier(word)
        };
        self.token(kind, start, line, column)
    }

    fn read_number(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first digit
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance_char();
            } else {
                break;
            }
        }

        let end = self.current_index();
        let literal = &self.input[start..end];
        let value = literal.parse::<i64>().unwrap_or_else(|_| {
            self.report(LexDiagnostic::IntegerOverflow {
                literal: literal.to_string(),
                line,
                column,
            });
            i64::MAX
        });
        self.token(
            TokenKind::Number {
                value,
                text: literal,
            },
            start,
            line,
            column,
        )
    }

    fn read_string(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume opening quote
        let content_start = start + 1;
        while let Some(&(idx, c)) = self.chars.peek() {
            if c == '"' {
                let content = &self.input[content_start..idx];
                self.advance_char(); // Consume closing quote
                return self.token(TokenKind::String(content), start, line, column);
            }
            self.advance_char();
        }

        self.report(LexDiagnostic::UnterminatedString { line, column });
        let content = &self.input[content_start..];
        self.token(TokenKind::String(content), start, line, column)
    }

    fn read_operator(&mut self, op: Operator, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char();
        let op = match op.with_equals() {
            Some(compound) if matches!(self.chars.peek(), Some(&(_, '='))) => {
                self.advance_char();
                compound
            }
            _ => op,
        };
        self.token(TokenKind::Operator(op), start, line, column)
    }

    fn report(&mut self, diagnostic: LexDiagnostic) {
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    fn token(&mut self, kind: TokenKind<'a>, start: usize, line: usize, column: usize) -> Token<'a> {
        Token::new(
            kind,
            Span {
                start,
                end: self.current_index(),
                line,
                column,
            },
        )
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

impl<'a> Iterator for Lexer<'a, '_> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Scans `input` into tokens, classifying words against `keywords`.
///
/// Unexpected characters, unterminated strings and oversized integers are
/// logged and skipped over; use [`Lexer`] directly to inspect them.
pub fn tokenize<'a>(input: &'a str, keywords: &KeywordTable) -> Vec<Token<'a>> {
    Lexer::new(input, keywords).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::Language;
    use indoc::indoc;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn kinds<'a>(input: &'a str, language: Language) -> Vec<TokenKind<'a>> {
        tokenize(input, language.keywords())
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_simple_program() {
        let input = indoc! {"
            srsti x = 10
            onduVele (x >= 5) {
                mudrisu \"big\"
            }
        "};
        let expected_tokens = vec![
            TokenKind::Keyword("srsti"),
            TokenKind::Identifier("x"),
            TokenKind::Operator(Operator::Assign),
            TokenKind::Number { value: 10, text: "10" },
            TokenKind::Keyword("onduVele"),
            TokenKind::LParen,
            TokenKind::Identifier("x"),
            TokenKind::Operator(Operator::GreaterEqual),
            TokenKind::Number { value: 5, text: "5" },
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Keyword("mudrisu"),
            TokenKind::String("big"),
            TokenKind::RBrace,
        ];
        assert_eq!(kinds(input, Language::Kannada), expected_tokens);
    }

    #[test]
    fn keyword_classification_depends_on_selected_table() {
        assert_eq!(
            kinds("mudran x", Language::Kannada),
            vec![TokenKind::Identifier("mudran"), TokenKind::Identifier("x")]
        );
        assert_eq!(
            kinds("mudran x", Language::Sanskrit),
            vec![TokenKind::Keyword("mudran"), TokenKind::Identifier("x")]
        );
    }

    #[test]
    fn recognizes_compound_operators() {
        let expected = [
            Operator::EqualEqual,
            Operator::BangEqual,
            Operator::LessEqual,
            Operator::GreaterEqual,
            Operator::Less,
            Operator::Bang,
            Operator::Assign,
            Operator::Minus,
            Operator::Percent,
        ]
        .into_iter()
        .map(TokenKind::Operator)
        .collect::<Vec<_>>();
        assert_eq!(kinds("== != <= >= < ! = - %", Language::Kannada), expected);
    }

    #[test]
    fn minus_is_a_separate_operator_token() {
        assert_eq!(
            kinds("-42", Language::Kannada),
            vec![TokenKind::Operator(Operator::Minus), TokenKind::Number { value: 42, text: "42" }]
        );
    }

    #[test]
    fn unterminated_string_keeps_scanned_content() {
        init_logger();
        let keywords = Language::Kannada.keywords();
        let mut lexer = Lexer::new("mudrisu \"namaskara", keywords);
        let tokens = lexer.by_ref().collect::<Vec<_>>();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::String("namaskara"));
        assert_eq!(
            lexer.diagnostics(),
            &[LexDiagnostic::UnterminatedString { line: 1, column: 8 }]
        );
    }

    #[test]
    fn skips_unexpected_characters_and_keeps_lexing() {
        init_logger();
        let keywords = Language::Kannada.keywords();
        let mut lexer = Lexer::new("srsti x = 1 @ 2\nmudrisu x", keywords);
        let tokens = lexer
            .by_ref()
            .map(|token| token.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            tokens,
            vec![
                TokenKind::Keyword("srsti"),
                TokenKind::Identifier("x"),
                TokenKind::Operator(Operator::Assign),
                TokenKind::Number { value: 1, text: "1" },
                TokenKind::Number { value: 2, text: "2" },
                TokenKind::Keyword("mudrisu"),
                TokenKind::Identifier("x"),
            ]
        );
        assert_eq!(
            lexer.diagnostics(),
            &[LexDiagnostic::UnexpectedCharacter {
                character: '@',
                line: 1,
                column: 12,
            }]
        );
    }

    #[test]
    fn oversized_integers_keep_their_digits() {
        init_logger();
        let keywords = Language::Kannada.keywords();
        let mut lexer = Lexer::new("99999999999999999999999999", keywords);
        let token = lexer.next_token().expect("number token");
        assert_eq!(
            token.kind,
            TokenKind::Number {
                value: i64::MAX,
                text: "99999999999999999999999999",
            }
        );
        assert_eq!(token.kind.to_string(), "99999999999999999999999999");
        assert!(matches!(
            lexer.diagnostics(),
            [LexDiagnostic::IntegerOverflow { .. }]
        ));
    }

    #[test]
    fn tracks_spans_across_lines() {
        let tokens = tokenize("srsti a\n  mudrisu a", Language::Kannada.keywords());
        let print = &tokens[2];
        assert_eq!(print.kind, TokenKind::Keyword("mudrisu"));
        assert_eq!(
            print.span,
            Span {
                start: 10,
                end: 17,
                line: 2,
                column: 2,
            }
        );
    }

    #[test]
    fn skips_unicode_whitespace() {
        assert_eq!(
            kinds("srsti\u{00a0}x\u{2003}=\t1", Language::Kannada),
            vec![
                TokenKind::Keyword("srsti"),
                TokenKind::Identifier("x"),
                TokenKind::Operator(Operator::Assign),
                TokenKind::Number { value: 1, text: "1" },
            ]
        );
    }
}
