use std::{iter::Peekable, str::CharIndices};

use super::RuntimeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Punct {
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    Comma,
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    Increment,
    Decrement,
    Bang,
    Equal,
    StrictEqual,
    NotEqual,
    StrictNotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

/// Longest spellings first so that prefix matching picks `===` over `==`.
const PUNCTUATORS: [(&str, Punct); 31] = [
    ("===", Punct::StrictEqual),
    ("!==", Punct::StrictNotEqual),
    ("==", Punct::Equal),
    ("!=", Punct::NotEqual),
    ("<=", Punct::LessEqual),
    (">=", Punct::GreaterEqual),
    ("&&", Punct::And),
    ("||", Punct::Or),
    ("++", Punct::Increment),
    ("--", Punct::Decrement),
    ("+=", Punct::PlusAssign),
    ("-=", Punct::MinusAssign),
    ("*=", Punct::StarAssign),
    ("/=", Punct::SlashAssign),
    ("%=", Punct::PercentAssign),
    ("(", Punct::LParen),
    (")", Punct::RParen),
    ("{", Punct::LBrace),
    ("}", Punct::RBrace),
    (";", Punct::Semicolon),
    (",", Punct::Comma),
    (".", Punct::Dot),
    ("+", Punct::Plus),
    ("-", Punct::Minus),
    ("*", Punct::Star),
    ("/", Punct::Slash),
    ("%", Punct::Percent),
    ("=", Punct::Assign),
    ("!", Punct::Bang),
    ("<", Punct::Less),
    (">", Punct::Greater),
];

impl Punct {
    pub(super) fn as_str(self) -> &'static str {
        PUNCTUATORS
            .iter()
            .find(|(_, punct)| *punct == self)
            .map(|(text, _)| *text)
            .unwrap_or("?")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum HostToken {
    Number(f64),
    String(String),
    Identifier(String),
    Punct(Punct),
}

impl HostToken {
    /// Wording used by "Unexpected ..." syntax errors.
    pub(super) fn describe(&self) -> String {
        match self {
            Self::Number(_) => "number".to_string(),
            Self::String(_) => "string".to_string(),
            Self::Identifier(name) if is_reserved(name) => format!("token '{name}'"),
            Self::Identifier(name) => format!("identifier '{name}'"),
            Self::Punct(punct) => format!("token '{}'", punct.as_str()),
        }
    }
}

pub(super) fn is_reserved(word: &str) -> bool {
    matches!(
        word,
        "const" | "let" | "var" | "if" | "else" | "for" | "while" | "true" | "false" | "null"
    )
}

struct HostLexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> HostLexer<'a> {
    fn next_token(&mut self) -> Result<Option<HostToken>, RuntimeError> {
        self.skip_trivia();
        let Some(&(start, ch)) = self.chars.peek() else {
            return Ok(None);
        };

        let token = match ch {
            c if c.is_alphabetic() || c == '_' || c == '$' => self.read_identifier(start),
            c if c.is_ascii_digit() => self.read_number(start)?,
            '"' | '\'' => self.read_string(ch)?,
            _ => {
                let rest = &self.input[start..];
                let (text, punct) = PUNCTUATORS
                    .iter()
                    .find(|(text, _)| rest.starts_with(text))
                    .ok_or(RuntimeError::InvalidToken)?;
                for _ in 0..text.len() {
                    self.chars.next();
                }
                HostToken::Punct(*punct)
            }
        };
        Ok(Some(token))
    }

    fn skip_trivia(&mut self) {
        while let Some(&(idx, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else if self.input[idx..].starts_with("//") {
                while let Some(&(_, c)) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.chars.next();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self, start: usize) -> HostToken {
        self.chars.next();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.chars.next();
            } else {
                break;
            }
        }
        let end = self.current_index();
        HostToken::Identifier(self.input[start..end].to_string())
    }

    fn read_number(&mut self, start: usize) -> Result<HostToken, RuntimeError> {
        self.consume_digits();
        if matches!(self.chars.peek(), Some(&(_, '.'))) {
            let mut ahead = self.chars.clone();
            ahead.next();
            if matches!(ahead.peek(), Some(&(_, c)) if c.is_ascii_digit()) {
                self.chars.next();
                self.consume_digits();
            }
        }
        // `3x` is not two tokens in the host dialect.
        if matches!(self.chars.peek(), Some(&(_, c)) if c.is_alphabetic() || c == '_' || c == '$') {
            return Err(RuntimeError::InvalidToken);
        }

        let end = self.current_index();
        let value = self.input[start..end]
            .parse::<f64>()
            .map_err(|_| RuntimeError::InvalidToken)?;
        Ok(HostToken::Number(value))
    }

    fn consume_digits(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self, quote: char) -> Result<HostToken, RuntimeError> {
        self.chars.next(); // Consume opening quote
        let mut value = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                c if c == quote => return Ok(HostToken::String(value)),
                '\n' => return Err(RuntimeError::InvalidToken),
                '\\' => {
                    let (_, escaped) = self.chars.next().ok_or(RuntimeError::InvalidToken)?;
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        other => other,
                    });
                }
                c => value.push(c),
            }
        }
        Err(RuntimeError::InvalidToken)
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

pub(super) fn tokenize(input: &str) -> Result<Vec<HostToken>, RuntimeError> {
    let mut lexer = HostLexer {
        input,
        chars: input.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_generated_statement() {
        let tokens = tokenize("const sum = x + 2.5; // done").expect("tokenize failed");
        assert_eq!(
            tokens,
            vec![
                HostToken::Identifier("const".to_string()),
                HostToken::Identifier("sum".to_string()),
                HostToken::Punct(Punct::Assign),
                HostToken::Identifier("x".to_string()),
                HostToken::Punct(Punct::Plus),
                HostToken::Number(2.5),
                HostToken::Punct(Punct::Semicolon),
            ]
        );
    }

    #[test]
    fn prefers_longest_punctuator() {
        let tokens = tokenize("a === b !== c <= d ++").expect("tokenize failed");
        let puncts = tokens
            .into_iter()
            .filter_map(|token| match token {
                HostToken::Punct(punct) => Some(punct),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            puncts,
            vec![
                Punct::StrictEqual,
                Punct::StrictNotEqual,
                Punct::LessEqual,
                Punct::Increment
            ]
        );
    }

    #[test]
    fn decodes_string_escapes() {
        let tokens = tokenize(r#"'it\'s' "a\tb""#).expect("tokenize failed");
        assert_eq!(
            tokens,
            vec![
                HostToken::String("it's".to_string()),
                HostToken::String("a\tb".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_unknown_characters_and_unterminated_strings() {
        assert_eq!(tokenize("a # b"), Err(RuntimeError::InvalidToken));
        assert_eq!(tokenize("\"open"), Err(RuntimeError::InvalidToken));
        assert_eq!(tokenize("3x"), Err(RuntimeError::InvalidToken));
    }
}
