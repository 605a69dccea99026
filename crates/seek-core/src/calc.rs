//! Expression evaluation for the Calculator provider.
//!
//! The provider only relies on the [`ExpressionEvaluator`] contract: text in,
//! a [`Value`] or an [`EvalError`] out. [`ArithmeticEvaluator`] is the
//! built-in implementation: numbers, string literals, `+ - * / % **`,
//! parentheses, the constants `PI` and `E`, and a handful of math functions.

use std::fmt;
use thiserror::Error;

/// The value an expression produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    /// Produced by an empty expression
    Undefined,
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Why an expression produced no value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The text is not a well-formed expression
    #[error("parse error at offset {offset}: {reason}")]
    Parse { offset: usize, reason: String },

    /// The expression is well-formed but could not be evaluated
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Evaluates calculator input.
pub trait ExpressionEvaluator: Send + Sync {
    fn evaluate(&self, source: &str) -> Result<Value, EvalError>;
}

/// Built-in arithmetic evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticEvaluator;

impl ExpressionEvaluator for ArithmeticEvaluator {
    fn evaluate(&self, source: &str) -> Result<Value, EvalError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Ok(Value::Undefined);
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expression()?;
        if let Some(token) = parser.peek() {
            return Err(EvalError::Parse {
                offset: token.offset,
                reason: format!("unexpected {}", token.kind),
            });
        }
        expr.eval()
    }
}

/// Render a number the way a calculator display shows it.
///
/// Integral values print without a fractional part, non-finite values
/// print as `NaN` / `Infinity`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

// === Tokens ===

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Str(_) => write!(f, "string"),
            TokenKind::Ident(name) => write!(f, "identifier `{}`", name),
            TokenKind::Plus => write!(f, "`+`"),
            TokenKind::Minus => write!(f, "`-`"),
            TokenKind::Star => write!(f, "`*`"),
            TokenKind::StarStar => write!(f, "`**`"),
            TokenKind::Slash => write!(f, "`/`"),
            TokenKind::Percent => write!(f, "`%`"),
            TokenKind::LParen => write!(f, "`(`"),
            TokenKind::RParen => write!(f, "`)`"),
            TokenKind::Comma => write!(f, "`,`"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut end = offset;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &source[offset..end];
                let value = text.parse::<f64>().map_err(|_| EvalError::Parse {
                    offset,
                    reason: format!("invalid number `{}`", text),
                })?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    offset,
                });
                continue;
            }
            '"' | '\'' => {
                let quote = c;
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                for (_, ch) in chars.by_ref() {
                    if ch == quote {
                        closed = true;
                        break;
                    }
                    text.push(ch);
                }
                if !closed {
                    return Err(EvalError::Parse {
                        offset,
                        reason: "unterminated string".to_string(),
                    });
                }
                tokens.push(Token {
                    kind: TokenKind::Str(text),
                    offset,
                });
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        name.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(name),
                    offset,
                });
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '*'))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::StarStar,
                        offset,
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Star,
                        offset,
                    });
                }
                continue;
            }
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            other => {
                return Err(EvalError::Parse {
                    offset,
                    reason: format!("unexpected character `{}`", other),
                })
            }
        };
        chars.next();
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

// === Syntax tree ===

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Debug, Clone)]
enum Expr {
    Number(f64),
    Str(String),
    Name(String),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().map_or(false, |t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, reason: impl Into<String>) -> EvalError {
        let offset = self
            .peek()
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.offset);
        EvalError::Parse {
            offset,
            reason: reason.into(),
        }
    }

    fn expression(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.eat(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat(&TokenKind::Star) {
                BinaryOp::Mul
            } else if self.eat(&TokenKind::Slash) {
                BinaryOp::Div
            } else if self.eat(&TokenKind::Percent) {
                BinaryOp::Rem
            } else {
                return Ok(lhs);
            };
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        if self.eat(&TokenKind::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat(&TokenKind::Plus) {
            return self.unary();
        }
        self.power()
    }

    // `**` binds tighter than unary minus on its left and is right-associative.
    fn power(&mut self) -> Result<Expr, EvalError> {
        let base = self.primary()?;
        if self.eat(&TokenKind::StarStar) {
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        let Some(token) = self.advance() else {
            return Err(self.error("unexpected end of input"));
        };
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::Str(s) => Ok(Expr::Str(s)),
            TokenKind::LParen => {
                let inner = self.expression()?;
                if !self.eat(&TokenKind::RParen) {
                    return Err(self.error("expected `)`"));
                }
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                if !self.eat(&TokenKind::LParen) {
                    return Ok(Expr::Name(name));
                }
                let mut args = Vec::new();
                if !self.eat(&TokenKind::RParen) {
                    loop {
                        args.push(self.expression()?);
                        if self.eat(&TokenKind::RParen) {
                            break;
                        }
                        if !self.eat(&TokenKind::Comma) {
                            return Err(self.error("expected `,` or `)`"));
                        }
                    }
                }
                Ok(Expr::Call(name, args))
            }
            other => Err(EvalError::Parse {
                offset: token.offset,
                reason: format!("unexpected {}", other),
            }),
        }
    }
}

impl Expr {
    fn eval(&self) -> Result<Value, EvalError> {
        match self {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Text(s.clone())),
            Expr::Name(name) => constant(name)
                .map(Value::Number)
                .ok_or_else(|| EvalError::Runtime(format!("{} is not defined", name))),
            Expr::Neg(inner) => Ok(Value::Number(-number(inner.eval()?, "-")?)),
            Expr::Binary(op, lhs, rhs) => binary(*op, lhs.eval()?, rhs.eval()?),
            Expr::Call(name, args) => {
                let values = args
                    .iter()
                    .map(|arg| number(arg.eval()?, name))
                    .collect::<Result<Vec<_>, _>>()?;
                call(name, &values).map(Value::Number)
            }
        }
    }
}

fn number(value: Value, context: &str) -> Result<f64, EvalError> {
    match value {
        Value::Number(n) => Ok(n),
        Value::Text(_) => Err(EvalError::Runtime(format!(
            "`{}` expects a number, got a string",
            context
        ))),
        Value::Undefined => Err(EvalError::Runtime(format!(
            "`{}` expects a number, got nothing",
            context
        ))),
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    // `+` concatenates as soon as either side is text.
    if op == BinaryOp::Add {
        match (&lhs, &rhs) {
            (Value::Text(a), other) => return Ok(Value::Text(format!("{}{}", a, display(other)))),
            (other, Value::Text(b)) => return Ok(Value::Text(format!("{}{}", display(other), b))),
            _ => {}
        }
    }

    let symbol = match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Rem => "%",
        BinaryOp::Pow => "**",
    };
    let a = number(lhs, symbol)?;
    let b = number(rhs, symbol)?;

    Ok(Value::Number(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        BinaryOp::Pow => a.powf(b),
    }))
}

fn display(value: &Value) -> String {
    match value {
        Value::Number(n) => format_number(*n),
        Value::Text(s) => s.clone(),
        Value::Undefined => "undefined".to_string(),
    }
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "PI" | "pi" => Some(std::f64::consts::PI),
        "E" | "e" => Some(std::f64::consts::E),
        "Infinity" => Some(f64::INFINITY),
        "NaN" => Some(f64::NAN),
        _ => None,
    }
}

fn call(name: &str, args: &[f64]) -> Result<f64, EvalError> {
    let unary = |f: fn(f64) -> f64| match args {
        [x] => Ok(f(*x)),
        _ => Err(EvalError::Runtime(format!(
            "{} takes 1 argument, got {}",
            name,
            args.len()
        ))),
    };

    match name {
        "sqrt" => unary(f64::sqrt),
        "abs" => unary(f64::abs),
        "floor" => unary(f64::floor),
        "ceil" => unary(f64::ceil),
        "round" => unary(f64::round),
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "tan" => unary(f64::tan),
        "ln" => unary(f64::ln),
        "log" => unary(f64::log10),
        "exp" => unary(f64::exp),
        "min" if !args.is_empty() => Ok(args.iter().copied().fold(f64::INFINITY, f64::min)),
        "max" if !args.is_empty() => Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        "pow" => match args {
            [base, exponent] => Ok(base.powf(*exponent)),
            _ => Err(EvalError::Runtime(format!(
                "pow takes 2 arguments, got {}",
                args.len()
            ))),
        },
        _ => Err(EvalError::Runtime(format!("{} is not a function", name))),
    }
}
