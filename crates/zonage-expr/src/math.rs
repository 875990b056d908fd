#![forbid(unsafe_code)]

//! Arithmetic evaluation.
//!
//! The grammar is deliberately tiny: decimal literals, `+ - * /`, unary
//! sign, and parentheses, with the usual precedence. Anything outside that
//! character set is stripped before parsing so that stray units or names do
//! not abort a whole rule.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | '(' expr ')'
//! ```

use std::sync::LazyLock;

use regex_lite::Regex;
use zonage_core::{ComparisonOperator, UNIT_MARKER};

use crate::error::ExprError;

/// Absolute tolerance used by equality comparisons.
pub const FLOATING_POINT_TOLERANCE: f64 = 0.001;

static SIMPLE_BINARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*([+\-*/])\s*(\d+(?:\.\d+)?)")
        .unwrap_or_else(|err| unreachable!("static pattern: {err}"))
});

// ── Tokenizer ──

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

impl Token {
    fn describe(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Plus => "+".into(),
            Self::Minus => "-".into(),
            Self::Star => "*".into(),
            Self::Slash => "/".into(),
            Self::Open => "(".into(),
            Self::Close => ")".into(),
        }
    }
}

fn is_math_char(c: char) -> bool {
    c.is_ascii_digit()
        || c.is_ascii_whitespace()
        || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.')
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, ExprError> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let token = match c {
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => {
                i += 1;
                continue;
            }
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'(' => Token::Open,
            b')' => Token::Close,
            b'0'..=b'9' | b'.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let literal = &text[start..i];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber {
                        literal: literal.to_owned(),
                    })?;
                tokens.push((Token::Number(value), start));
                continue;
            }
            _ => {
                return Err(ExprError::UnexpectedToken {
                    token: char::from(c).to_string(),
                    offset: i,
                });
            }
        };
        tokens.push((token, i));
        i += 1;
    }
    Ok(tokens)
}

// ── Parser ──

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn bump(&mut self) -> Option<(Token, usize)> {
        let next = self.tokens.get(self.pos).copied();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus {
                value + rhs
            } else {
                value - rhs
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                value / rhs
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, ExprError> {
        match self.bump() {
            Some((Token::Number(n), _)) => Ok(n),
            Some((Token::Open, _)) => {
                let value = self.expr()?;
                match self.bump() {
                    Some((Token::Close, _)) => Ok(value),
                    Some((other, offset)) => Err(ExprError::UnexpectedToken {
                        token: other.describe(),
                        offset,
                    }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some((other, offset)) => Err(ExprError::UnexpectedToken {
                token: other.describe(),
                offset,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

/// Evaluate arithmetic text, reporting why it failed.
///
/// Characters other than digits, `.`, whitespace, parentheses and the four
/// operators are removed first. Division by zero yields
/// [`ExprError::NonFinite`].
pub fn try_evaluate_math(text: &str) -> Result<f64, ExprError> {
    let cleaned: String = text.chars().filter(|c| is_math_char(*c)).collect();
    let tokens = tokenize(&cleaned)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if let Some((_, offset)) = parser.bump() {
        return Err(ExprError::TrailingInput { offset });
    }
    if !value.is_finite() {
        return Err(ExprError::NonFinite { value });
    }
    Ok(value)
}

/// Evaluate arithmetic text, never failing.
///
/// Empty input evaluates to `0` silently; any other failure evaluates to `0`
/// and logs a warning.
pub fn evaluate_math(text: &str) -> f64 {
    match try_evaluate_math(text) {
        Ok(value) => value,
        Err(ExprError::Empty) => 0.0,
        Err(err) => {
            tracing::warn!(expression = text, error = %err, "math evaluation failed, using 0");
            0.0
        }
    }
}

/// Render a number the way substituted text expects it: shortest
/// round-trip form, no exponent, `-0` collapsed to `0`.
pub(crate) fn format_number(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0".to_owned();
    }
    format!("{value}")
}

/// Fold every `a op b` literal pair in one left-to-right pass.
///
/// Integer results are written plainly, fractional ones with two decimals,
/// and `x / 0` folds to `0`. Text that does not match is left untouched.
pub fn evaluate_simple_arithmetic(text: &str) -> String {
    SIMPLE_BINARY
        .replace_all(text, |caps: &regex_lite::Captures<'_>| {
            let a: f64 = caps[1].parse().unwrap_or(0.0);
            let b: f64 = caps[3].parse().unwrap_or(0.0);
            let result = match &caps[2] {
                "+" => a + b,
                "-" => a - b,
                "*" => a * b,
                _ if b == 0.0 => 0.0,
                _ => a / b,
            };
            if result.fract() == 0.0 {
                format_number(result)
            } else {
                format!("{result:.2}")
            }
        })
        .into_owned()
}

/// Byte range of the first balanced `( ... )` group's contents.
fn first_paren_group(text: &str) -> Option<&str> {
    let open = text.find('(')?;
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[open + 1..open + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Numeric value of a fixed-size division part such as `"500mm"` or
/// `"(2*250) mm"`.
///
/// The unit marker is removed. A bare number is parsed directly; otherwise
/// the first parenthesized group is evaluated; otherwise the whole
/// remainder. An empty remainder is `0`.
pub fn extract_millimeter_value(part: &str) -> f64 {
    let rest = part.replacen(UNIT_MARKER, "", 1);
    let rest = rest.trim();
    if rest.is_empty() {
        return 0.0;
    }
    if let Ok(value) = rest.parse::<f64>()
        && value.is_finite()
    {
        return value;
    }
    match first_paren_group(rest) {
        Some(inner) => evaluate_math(inner),
        None => evaluate_math(rest),
    }
}

/// Compare `a` to `b`; equality tests use [`FLOATING_POINT_TOLERANCE`].
pub fn compare_values(a: f64, b: f64, operator: ComparisonOperator) -> bool {
    match operator {
        ComparisonOperator::Eq => (a - b).abs() < FLOATING_POINT_TOLERANCE,
        ComparisonOperator::Ne => (a - b).abs() >= FLOATING_POINT_TOLERANCE,
        ComparisonOperator::Gt => a > b,
        ComparisonOperator::Lt => a < b,
        ComparisonOperator::Ge => a >= b,
        ComparisonOperator::Le => a <= b,
    }
}

/// [`compare_values`] with a textual operator; unknown operators compare
/// for tolerant equality.
pub fn compare_values_raw(a: f64, b: f64, operator: &str) -> bool {
    let op = operator
        .trim()
        .parse::<ComparisonOperator>()
        .unwrap_or(ComparisonOperator::Eq);
    compare_values(a, b, op)
}
