// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Arithmetic expressions over named spec values.
//!
//! ```text
//! expr   ::= term (('+' | '-') term)*
//! term   ::= factor (('*' | '/') factor)*
//! factor ::= integer | identifier | '(' expr ')'
//! ```
//!
//! Evaluation is done in floating point and the final result is rounded up,
//! so `MAX_VALIDATORS/32` yields the number of chunks needed.

use crate::error::SpecError;

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(u64),
    Name(String),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(u64),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Eof,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if !pred(ch) {
                break;
            }
            self.next_char();
        }
        &self.input[start..self.pos]
    }

    fn next_token(&mut self) -> Result<Token, String> {
        self.read_while(char::is_whitespace);

        let ch = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let single = match ch {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            _ => None,
        };
        if let Some(token) = single {
            self.next_char();
            return Ok(token);
        }

        if ch.is_ascii_digit() {
            let digits = self.read_while(|c| c.is_ascii_alphanumeric());
            let value = match digits.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => digits.parse::<u64>(),
            };
            return value
                .map(Token::Number)
                .map_err(|e| format!("invalid number '{}': {}", digits, e));
        }

        if ch.is_alphabetic() || ch == '_' {
            let name = self.read_while(|c| c.is_alphanumeric() || c == '_' || c == '.');
            return Ok(Token::Name(name.to_string()));
        }

        Err(format!("unexpected character '{}'", ch))
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, String> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> Result<(), String> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn parse_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_term()?;
        loop {
            let build: fn(Box<Expr>, Box<Expr>) -> Expr = match self.current {
                Token::Plus => Expr::Add,
                Token::Minus => Expr::Sub,
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.parse_term()?;
            left = build(Box::new(left), Box::new(right));
        }
    }

    fn parse_term(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_factor()?;
        loop {
            let build: fn(Box<Expr>, Box<Expr>) -> Expr = match self.current {
                Token::Star => Expr::Mul,
                Token::Slash => Expr::Div,
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.parse_factor()?;
            left = build(Box::new(left), Box::new(right));
        }
    }

    fn parse_factor(&mut self) -> Result<Expr, String> {
        match std::mem::replace(&mut self.current, Token::Eof) {
            Token::Number(n) => {
                self.advance()?;
                Ok(Expr::Number(n))
            }
            Token::Name(name) => {
                self.advance()?;
                Ok(Expr::Name(name))
            }
            Token::LParen => {
                self.advance()?;
                let inner = self.parse_expr()?;
                if self.current != Token::RParen {
                    return Err("expected ')'".to_string());
                }
                self.advance()?;
                Ok(inner)
            }
            other => Err(format!("unexpected token {:?}", other)),
        }
    }
}

impl Expr {
    /// Parse expression text.
    pub fn parse(text: &str) -> Result<Self, SpecError> {
        let to_err = |reason: String| SpecError::Parse {
            expr: text.to_string(),
            reason,
        };

        let mut parser = Parser::new(text).map_err(to_err)?;
        if parser.current == Token::Eof {
            return Err(to_err("empty expression".to_string()));
        }
        let expr = parser.parse_expr().map_err(to_err)?;
        if parser.current != Token::Eof {
            return Err(to_err(format!("unexpected trailing {:?}", parser.current)));
        }
        Ok(expr)
    }

    /// Evaluate against `lookup`. `Ok(None)` when a name has no value.
    pub fn eval(
        &self,
        text: &str,
        lookup: &mut dyn FnMut(&str) -> Option<u64>,
    ) -> Result<Option<u64>, SpecError> {
        let Some(value) = self.eval_f64(text, lookup)? else {
            return Ok(None);
        };
        let rounded = value.ceil();
        if !(0.0..=u64::MAX as f64).contains(&rounded) {
            return Err(SpecError::Overflow(text.to_string()));
        }
        Ok(Some(rounded as u64))
    }

    fn eval_f64(
        &self,
        text: &str,
        lookup: &mut dyn FnMut(&str) -> Option<u64>,
    ) -> Result<Option<f64>, SpecError> {
        let (left, right) = match self {
            Self::Number(n) => return Ok(Some(*n as f64)),
            Self::Name(name) => return Ok(lookup(name).map(|v| v as f64)),
            Self::Add(l, r) | Self::Sub(l, r) | Self::Mul(l, r) | Self::Div(l, r) => (l, r),
        };

        let Some(l) = left.eval_f64(text, lookup)? else {
            return Ok(None);
        };
        let Some(r) = right.eval_f64(text, lookup)? else {
            return Ok(None);
        };

        let value = match self {
            Self::Add(..) => l + r,
            Self::Sub(..) => l - r,
            Self::Mul(..) => l * r,
            _ => {
                if r == 0.0 {
                    return Err(SpecError::DivisionByZero(text.to_string()));
                }
                l / r
            }
        };
        Ok(Some(value))
    }

    /// Names referenced by the expression.
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Number(_) => {}
            Self::Name(name) => out.push(name),
            Self::Add(l, r) | Self::Sub(l, r) | Self::Mul(l, r) | Self::Div(l, r) => {
                l.collect_names(out);
                r.collect_names(out);
            }
        }
    }
}
