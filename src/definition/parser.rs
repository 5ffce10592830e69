//! Definition parser: token stream to `KeySequence`.
//!
//! Grammar:
//!
//! ```text
//! definition := '{' ( entry ( ',' entry )* )? '}' EOF
//! entry      := field ':' direction
//! field      := Identifier | StringLiteral
//! direction  := Integer | Float | StringLiteral
//! ```

use crate::model::{Direction, KeySequence};
use crate::{Error, Result};
use super::lexer::{Token, TokenKind};

/// Token slice plus cursor.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &'t Token {
        let tokens = self.tokens;
        &tokens[self.pos.min(tokens.len() - 1)]
    }

    fn advance(&mut self) -> &'t Token {
        let tok = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'t Token> {
        let tok = self.peek();
        if tok.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {:?}, got {:?} '{}'", kind, tok.kind, tok.text)))
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, msg: String) -> Error {
        Error::InvalidDefinition {
            position: self.peek().span.start,
            message: msg,
        }
    }
}

/// Parse a complete definition from tokens.
pub fn parse_definition(tokens: &[Token]) -> Result<KeySequence> {
    if tokens.is_empty() {
        return Err(Error::InvalidDefinition { position: 0, message: "Empty token stream".into() });
    }

    let mut p = Parser::new(tokens);
    let mut keys = KeySequence::new();

    p.expect(TokenKind::LBrace)?;
    if !p.eat(TokenKind::RBrace) {
        loop {
            let field = parse_field(&mut p)?;
            p.expect(TokenKind::Colon)?;
            let direction = parse_direction(&mut p)?;
            keys.push(field, direction);

            if p.eat(TokenKind::Comma) {
                continue;
            }
            p.expect(TokenKind::RBrace)?;
            break;
        }
    }
    p.expect(TokenKind::Eof)?;

    Ok(keys)
}

fn parse_field(p: &mut Parser<'_>) -> Result<String> {
    let tok = p.peek();
    match tok.kind {
        TokenKind::Identifier | TokenKind::StringLiteral => {
            if tok.text.is_empty() {
                return Err(p.error("Field name must not be empty".into()));
            }
            p.advance();
            Ok(tok.text.clone())
        }
        kind => Err(p.error(format!("Expected field name, got {:?} '{}'", kind, tok.text))),
    }
}

/// Integral decimals (`1.0`) normalize to integers here so matching can
/// compare directions exactly.
fn parse_direction(p: &mut Parser<'_>) -> Result<Direction> {
    let tok = p.peek();
    let direction = match tok.kind {
        TokenKind::Integer => {
            let value: i64 = tok.text.parse()
                .map_err(|_| p.error(format!("Direction out of range: {}", tok.text)))?;
            Direction::Int(value)
        }
        TokenKind::Float => {
            let value: f64 = tok.text.parse()
                .map_err(|_| p.error(format!("Invalid direction: {}", tok.text)))?;
            if value.fract() != 0.0 || value.abs() >= i64::MAX as f64 {
                return Err(p.error(format!("Direction must be an integer, got {}", tok.text)));
            }
            Direction::Int(value as i64)
        }
        TokenKind::StringLiteral if !tok.text.is_empty() => Direction::Named(tok.text.clone()),
        kind => return Err(p.error(format!("Expected direction, got {:?} '{}'", kind, tok.text))),
    };
    p.advance();
    Ok(direction)
}
