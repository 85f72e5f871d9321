//! Preprocessor tokens
//!
//! Tokens arrive pre-lexed from the host front end; Macrosight only ever
//! inspects their spelling and location.

use crate::location::SourceLocation;
use serde::{Deserialize, Serialize};

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Identifier,
    Punctuator,
    Literal,
    Other,
}

/// One preprocessor token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub spelling: String,
    pub kind: TokenKind,
    pub loc: SourceLocation,
}

impl Token {
    pub fn new(spelling: impl Into<String>, kind: TokenKind, loc: SourceLocation) -> Self {
        Self {
            spelling: spelling.into(),
            kind,
            loc,
        }
    }

    pub fn ident(spelling: impl Into<String>, loc: SourceLocation) -> Self {
        Self::new(spelling, TokenKind::Identifier, loc)
    }

    pub fn punct(spelling: impl Into<String>, loc: SourceLocation) -> Self {
        Self::new(spelling, TokenKind::Punctuator, loc)
    }

    pub fn literal(spelling: impl Into<String>, loc: SourceLocation) -> Self {
        Self::new(spelling, TokenKind::Literal, loc)
    }

    /// The stringification operator `#`
    pub fn is_hash(&self) -> bool {
        self.kind == TokenKind::Punctuator && self.spelling == "#"
    }

    /// The token-pasting operator `##`
    pub fn is_hash_hash(&self) -> bool {
        self.kind == TokenKind::Punctuator && self.spelling == "##"
    }
}

/// Whether a macro body uses the stringification operator
pub fn has_stringification(tokens: &[Token]) -> bool {
    tokens.iter().any(Token::is_hash)
}

/// Whether a macro body uses the token-pasting operator
pub fn has_token_paste(tokens: &[Token]) -> bool {
    tokens.iter().any(Token::is_hash_hash)
}

/// Number of identifier tokens spelled `name`.
///
/// Applied to a macro body this counts how many times a parameter is
/// expanded, which is what argument alignment is checked against.
pub fn count_identifier_uses(tokens: &[Token], name: &str) -> usize {
    tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Identifier && t.spelling == name)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(n: u32) -> SourceLocation {
        SourceLocation(n)
    }

    #[test]
    fn test_operator_detection() {
        let body = vec![
            Token::punct("#", loc(1)),
            Token::ident("x", loc(2)),
        ];
        assert!(has_stringification(&body));
        assert!(!has_token_paste(&body));

        let body = vec![
            Token::ident("a", loc(1)),
            Token::punct("##", loc(2)),
            Token::ident("b", loc(3)),
        ];
        assert!(!has_stringification(&body));
        assert!(has_token_paste(&body));
    }

    #[test]
    fn test_count_identifier_uses() {
        // ((x)*(x))
        let body = vec![
            Token::punct("(", loc(1)),
            Token::punct("(", loc(2)),
            Token::ident("x", loc(3)),
            Token::punct(")", loc(4)),
            Token::punct("*", loc(5)),
            Token::punct("(", loc(6)),
            Token::ident("x", loc(7)),
            Token::punct(")", loc(8)),
            Token::punct(")", loc(9)),
        ];
        assert_eq!(count_identifier_uses(&body, "x"), 2);
        assert_eq!(count_identifier_uses(&body, "y"), 0);
    }

    #[test]
    fn test_literal_spelling_is_not_identifier() {
        let body = vec![Token::literal("\"x\"", loc(1))];
        assert_eq!(count_identifier_uses(&body, "x"), 0);
    }
}
