//! Scope requirement expressions
//!
//! A tiny hand-rolled evaluator for boolean requirements over a
//! principal's scope set. The grammar is fixed and closed, which keeps a
//! general expression-language dependency out of the authorization path:
//!
//! ```text
//! expr   := term (OR term)*
//! term   := factor (AND factor)*
//! factor := hasScope('<scope>') | '(' expr ')'
//! ```
//!
//! Keywords are case-insensitive. Parse failures are configuration
//! defects, not authorization denials.

use std::collections::HashSet;

use crate::types::{Error, Result};

/// Parsed scope requirement, evaluated against a principal's scope set
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeExpr {
    /// `hasScope('x')` - true when the scope set contains `x`
    Has(String),
    And(Box<ScopeExpr>, Box<ScopeExpr>),
    Or(Box<ScopeExpr>, Box<ScopeExpr>),
}

impl ScopeExpr {
    /// Parse an expression, rejecting anything outside the grammar
    pub fn parse(input: &str) -> Result<Self> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            input,
            tokens,
            pos: 0,
        };
        let expr = parser.expr()?;
        if parser.pos != parser.tokens.len() {
            return Err(parser.error("trailing input after expression"));
        }
        Ok(expr)
    }

    /// Evaluate against a scope set. Pure function, no side effects.
    pub fn evaluate(&self, scopes: &HashSet<String>) -> bool {
        match self {
            Self::Has(scope) => scopes.contains(scope),
            Self::And(lhs, rhs) => lhs.evaluate(scopes) && rhs.evaluate(scopes),
            Self::Or(lhs, rhs) => lhs.evaluate(scopes) || rhs.evaluate(scopes),
        }
    }
}

/// Parse and evaluate in one step
pub fn evaluate(input: &str, scopes: &HashSet<String>) -> Result<bool> {
    Ok(ScopeExpr::parse(input)?.evaluate(scopes))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    HasScope(String),
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let invalid = |msg: &str| Error::Config(format!("Invalid scope expression {:?}: {}", input, msg));

    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if word.eq_ignore_ascii_case("and") {
                    tokens.push(Token::And);
                } else if word.eq_ignore_ascii_case("or") {
                    tokens.push(Token::Or);
                } else if word.eq_ignore_ascii_case("hasscope") {
                    tokens.push(Token::HasScope(read_scope_argument(&mut chars, &invalid)?));
                } else {
                    return Err(invalid(&format!("unexpected word {:?}", word)));
                }
            }
            other => return Err(invalid(&format!("unexpected character {:?}", other))),
        }
    }

    Ok(tokens)
}

/// Consume `('<scope>')` after the `hasScope` keyword
fn read_scope_argument(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    invalid: &dyn Fn(&str) -> Error,
) -> Result<String> {
    if chars.next() != Some('(') {
        return Err(invalid("expected '(' after hasScope"));
    }
    if chars.next() != Some('\'') {
        return Err(invalid("expected quoted scope name"));
    }
    let mut scope = String::new();
    loop {
        match chars.next() {
            Some('\'') => break,
            Some(c) => scope.push(c),
            None => return Err(invalid("unterminated scope name")),
        }
    }
    if chars.next() != Some(')') {
        return Err(invalid("expected ')' after scope name"));
    }
    if scope.is_empty() {
        return Err(invalid("empty scope name"));
    }
    Ok(scope)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, msg: &str) -> Error {
        Error::Config(format!("Invalid scope expression {:?}: {}", self.input, msg))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expr(&mut self) -> Result<ScopeExpr> {
        let mut lhs = self.term()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = ScopeExpr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<ScopeExpr> {
        let mut lhs = self.factor()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = ScopeExpr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<ScopeExpr> {
        match self.peek().cloned() {
            Some(Token::HasScope(scope)) => {
                self.pos += 1;
                Ok(ScopeExpr::Has(scope))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expr()?;
                if self.peek() != Some(&Token::RParen) {
                    return Err(self.error("expected ')'"));
                }
                self.pos += 1;
                Ok(inner)
            }
            _ => Err(self.error("expected hasScope(...) or '('")),
        }
    }
}
