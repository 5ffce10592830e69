//! Definition lexer. Tokenizes `{ field: 1, "other": -1 }`.

use crate::{Error, Result};

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Integer, Float, StringLiteral,

    // Bare field names
    Identifier,

    // Punctuation
    LBrace, RBrace, Colon, Comma,

    Eof,
}

/// Tokenize a definition string.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => { chars.next(); }

            // String literals
            '\'' | '"' => {
                let quote = ch;
                chars.next(); // consume opening quote
                let start = pos;
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => {
                            if let Some((_, escaped)) = chars.next() {
                                match escaped {
                                    'n' => s.push('\n'),
                                    't' => s.push('\t'),
                                    '\\' => s.push('\\'),
                                    c if c == quote => s.push(c),
                                    c => { s.push('\\'); s.push(c); }
                                }
                            }
                        }
                        Some((end, c)) if c == quote => {
                            tokens.push(Token {
                                kind: TokenKind::StringLiteral,
                                span: Span { start, end: end + 1 },
                                text: s,
                            });
                            break;
                        }
                        Some((_, c)) => s.push(c),
                        None => return Err(Error::InvalidDefinition {
                            position: start,
                            message: "Unterminated string literal".into(),
                        }),
                    }
                }
            }

            // Numbers, optionally signed
            c if c.is_ascii_digit() || c == '-' || c == '+' => {
                let start = pos;
                let mut num = String::new();
                if c == '-' || c == '+' {
                    num.push(c);
                    chars.next();
                    if !matches!(chars.peek(), Some(&(_, d)) if d.is_ascii_digit()) {
                        return Err(Error::InvalidDefinition {
                            position: start,
                            message: format!("Expected digit after '{c}'"),
                        });
                    }
                }
                let mut is_float = false;
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() {
                        num.push(c);
                        chars.next();
                    } else if c == '.' && !is_float {
                        is_float = true;
                        num.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: if is_float { TokenKind::Float } else { TokenKind::Integer },
                    span: Span { start, end: start + num.len() },
                    text: num,
                });
            }

            // Bare field names. Dotted paths and `$` are allowed.
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = pos;
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '$' || c == '.' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Identifier,
                    span: Span { start, end: start + ident.len() },
                    text: ident,
                });
            }

            '{' => { chars.next(); tokens.push(punct(TokenKind::LBrace, pos, "{")); }
            '}' => { chars.next(); tokens.push(punct(TokenKind::RBrace, pos, "}")); }
            ':' => { chars.next(); tokens.push(punct(TokenKind::Colon, pos, ":")); }
            ',' => { chars.next(); tokens.push(punct(TokenKind::Comma, pos, ",")); }

            other => {
                return Err(Error::InvalidDefinition {
                    position: pos,
                    message: format!("Unexpected character: '{other}'"),
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span { start: input.len(), end: input.len() },
        text: String::new(),
    });

    Ok(tokens)
}

fn punct(kind: TokenKind, pos: usize, text: &str) -> Token {
    Token {
        kind,
        span: Span { start: pos, end: pos + text.len() },
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_definition() {
        let tokens = tokenize("{ first: 1, second: -1 }").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![
            TokenKind::LBrace,
            TokenKind::Identifier, // first
            TokenKind::Colon,
            TokenKind::Integer,    // 1
            TokenKind::Comma,
            TokenKind::Identifier, // second
            TokenKind::Colon,
            TokenKind::Integer,    // -1
            TokenKind::RBrace,
            TokenKind::Eof,
        ]);
        assert_eq!(tokens[7].text, "-1");
    }

    #[test]
    fn test_quoted_field_names() {
        let tokens = tokenize(r#"{"a b": 1, 'c': 1}"#).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[1].text, "a b");
        assert_eq!(tokens[5].text, "c");
    }

    #[test]
    fn test_dotted_identifier() {
        let tokens = tokenize("{ address.city: 1 }").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].text, "address.city");
    }

    #[test]
    fn test_float_literal() {
        let tokens = tokenize("1.0").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Float);
        assert_eq!(tokens[0].span, Span { start: 0, end: 3 });
    }

    #[test]
    fn test_lone_sign_is_rejected() {
        let err = tokenize("{ a: - }").unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { position: 5, .. }));
    }

    #[test]
    fn test_unterminated_string() {
        assert!(tokenize(r#"{ "a: 1 }"#).is_err());
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("{ a = 1 }").unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { position: 4, .. }));
    }
}
