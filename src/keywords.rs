//! Bilingual keyword tables.
//!
//! Both lexicons share one grammar. A keyword's meaning comes from its
//! position in the selected table, never from its spelling, so the parser
//! asks the table for a role instead of comparing against literal words.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Surface lexicon selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Kannada,
    Sanskrit,
}

impl Language {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Kannada => "kannada",
            Self::Sanskrit => "sanskrit",
        }
    }

    pub fn keywords(self) -> &'static KeywordTable {
        KeywordTable::for_language(self)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown language '{tag}', expected 'kannada' or 'sanskrit'")]
pub struct UnknownLanguage {
    pub tag: String,
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "kannada" => Ok(Self::Kannada),
            "sanskrit" => Ok(Self::Sanskrit),
            _ => Err(UnknownLanguage {
                tag: tag.to_string(),
            }),
        }
    }
}

/// Grammatical role of a keyword, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Declare,
    Print,
    If,
    Else,
    For,
}

impl Role {
    pub const ALL: [Role; KEYWORD_COUNT] =
        [Role::Declare, Role::Print, Role::If, Role::Else, Role::For];

    pub fn index(self) -> usize {
        match self {
            Self::Declare => 0,
            Self::Print => 1,
            Self::If => 2,
            Self::Else => 3,
            Self::For => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

pub const KEYWORD_COUNT: usize = 5;

/// Positional mapping from [`Role`] to surface keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    words: [&'static str; KEYWORD_COUNT],
}

static KANNADA: KeywordTable = KeywordTable {
    words: ["srsti", "mudrisu", "onduVele", "illadiddare", "matte"],
};

static SANSKRIT: KeywordTable = KeywordTable {
    words: ["srsti", "mudran", "yadhi", "anyatha", "punah"],
};

impl KeywordTable {
    pub fn for_language(language: Language) -> &'static Self {
        match language {
            Language::Kannada => &KANNADA,
            Language::Sanskrit => &SANSKRIT,
        }
    }

    pub fn word(&self, role: Role) -> &'static str {
        self.words[role.index()]
    }

    pub fn position(&self, word: &str) -> Option<usize> {
        self.words.iter().position(|candidate| *candidate == word)
    }

    pub fn role_of(&self, word: &str) -> Option<Role> {
        self.position(word).and_then(Role::from_index)
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.position(word).is_some()
    }
}
