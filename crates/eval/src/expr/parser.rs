// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Shunting-yard parser and RPN evaluator.

use super::error::EvalError;
use super::token::{BinOp, Token};
use super::Env;

/// Precedence of unary minus; binds tighter than `^`.
const UNARY_PREC: u8 = 4;

/// Known functions and their arities.
fn function_arity(name: &str) -> Option<u8> {
    match name {
        "abs" => Some(1),
        "min" | "max" => Some(2),
        "clamp" => Some(3),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RpnItem {
    Number(f64),
    Ident(String),
    Neg,
    Bin(BinOp),
    Call { name: String, arity: u8 },
}

/// A parsed expression in reverse Polish order.
#[derive(Debug, Clone, PartialEq)]
pub struct Rpn {
    items: Vec<RpnItem>,
}

/// Operator-stack entries during parsing.
enum StackItem {
    Bin(BinOp),
    Neg,
    /// `(` that opened a grouping (not a call).
    Paren,
    /// `name(` that opened a call; `args` counts comma-separated arguments.
    Call { name: String, args: u8, saw_value: bool },
}

/// Parse a token stream into RPN with explicit function arities.
pub fn parse(tokens: Vec<Token>) -> Result<Rpn, EvalError> {
    let mut output: Vec<RpnItem> = Vec::new();
    let mut stack: Vec<StackItem> = Vec::new();
    // True when the previous token completed a value, so an operator here
    // is binary and `(` would be a syntax error after `)` etc.
    let mut have_value = false;

    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        match token {
            Token::Number(v) => {
                if have_value {
                    return Err(EvalError::UnexpectedToken(v.to_string()));
                }
                output.push(RpnItem::Number(v));
                mark_value(&mut stack, &mut have_value);
            }
            Token::Ident(name) => {
                if have_value {
                    return Err(EvalError::UnexpectedToken(name));
                }
                if matches!(iter.peek(), Some(Token::LParen)) {
                    if function_arity(&name).is_none() {
                        return Err(EvalError::UnknownFunction(name));
                    }
                    iter.next(); // consume '('
                    stack.push(StackItem::Call { name, args: 0, saw_value: false });
                } else {
                    output.push(RpnItem::Ident(name));
                    mark_value(&mut stack, &mut have_value);
                }
            }
            Token::Op(BinOp::Sub) if !have_value => {
                // Unary minus; nothing on the stack can outrank it.
                stack.push(StackItem::Neg);
            }
            Token::Op(op) => {
                if !have_value {
                    return Err(EvalError::UnexpectedToken(op.to_string()));
                }
                pop_higher(&mut output, &mut stack, op);
                stack.push(StackItem::Bin(op));
                have_value = false;
            }
            Token::LParen => {
                if have_value {
                    return Err(EvalError::UnexpectedToken("(".to_string()));
                }
                stack.push(StackItem::Paren);
            }
            Token::RParen => {
                pop_until_group(&mut output, &mut stack)?;
                match stack.pop() {
                    Some(StackItem::Paren) => {
                        if !have_value {
                            return Err(EvalError::UnexpectedToken(")".to_string()));
                        }
                    }
                    Some(StackItem::Call { name, args, saw_value }) => {
                        let got = args + u8::from(saw_value);
                        let expected = function_arity(&name).unwrap_or(0);
                        if got != expected {
                            return Err(EvalError::BadArity { name, expected, got });
                        }
                        output.push(RpnItem::Call { name, arity: got });
                    }
                    _ => return Err(EvalError::UnbalancedParens),
                }
                // The closed group is itself a value for any enclosing call.
                mark_value(&mut stack, &mut have_value);
            }
            Token::Comma => {
                if !have_value {
                    return Err(EvalError::UnexpectedToken(",".to_string()));
                }
                pop_until_group(&mut output, &mut stack)?;
                match stack.last_mut() {
                    Some(StackItem::Call { args, saw_value, .. }) => {
                        *args += 1;
                        *saw_value = false;
                    }
                    _ => return Err(EvalError::UnexpectedToken(",".to_string())),
                }
                have_value = false;
            }
        }
    }

    if !have_value {
        return Err(EvalError::Malformed);
    }
    while let Some(item) = stack.pop() {
        match item {
            StackItem::Bin(op) => output.push(RpnItem::Bin(op)),
            StackItem::Neg => output.push(RpnItem::Neg),
            StackItem::Paren | StackItem::Call { .. } => {
                return Err(EvalError::UnbalancedParens)
            }
        }
    }
    Ok(Rpn { items: output })
}

/// A value just landed in the output: unary minuses stacked directly below
/// apply immediately (they bind tightest), and the innermost call frame has
/// seen an argument value.
fn mark_value(stack: &mut Vec<StackItem>, have_value: &mut bool) {
    *have_value = true;
    for item in stack.iter_mut().rev() {
        if let StackItem::Call { saw_value, .. } = item {
            *saw_value = true;
            break;
        }
    }
}

/// Pop operators that outrank `op` onto the output.
fn pop_higher(output: &mut Vec<RpnItem>, stack: &mut Vec<StackItem>, op: BinOp) {
    while let Some(top) = stack.last() {
        let top_prec = match top {
            StackItem::Bin(t) => t.precedence(),
            StackItem::Neg => UNARY_PREC,
            StackItem::Paren | StackItem::Call { .. } => break,
        };
        let pop = if op.right_assoc() {
            top_prec > op.precedence()
        } else {
            top_prec >= op.precedence()
        };
        if !pop {
            break;
        }
        match stack.pop() {
            Some(StackItem::Bin(t)) => output.push(RpnItem::Bin(t)),
            Some(StackItem::Neg) => output.push(RpnItem::Neg),
            _ => break,
        }
    }
}

/// Pop operators until a `(` or call frame is on top (not popped).
fn pop_until_group(
    output: &mut Vec<RpnItem>,
    stack: &mut Vec<StackItem>,
) -> Result<(), EvalError> {
    loop {
        match stack.last() {
            Some(StackItem::Bin(_)) => {
                if let Some(StackItem::Bin(op)) = stack.pop() {
                    output.push(RpnItem::Bin(op));
                }
            }
            Some(StackItem::Neg) => {
                stack.pop();
                output.push(RpnItem::Neg);
            }
            Some(StackItem::Paren | StackItem::Call { .. }) => return Ok(()),
            None => return Err(EvalError::UnbalancedParens),
        }
    }
}

impl Rpn {
    /// Evaluate against an environment.
    ///
    /// Division by zero evaluates to 0 rather than failing; this matches the
    /// operation contract and is relied on by compound configs.
    pub fn eval(&self, env: &Env) -> Result<f64, EvalError> {
        let mut stack: Vec<f64> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match item {
                RpnItem::Number(v) => stack.push(*v),
                RpnItem::Ident(name) => match env.get(name) {
                    Some(v) => stack.push(v),
                    None => return Err(EvalError::UnknownIdent(name.clone())),
                },
                RpnItem::Neg => {
                    let v = stack.pop().ok_or(EvalError::Malformed)?;
                    stack.push(-v);
                }
                RpnItem::Bin(op) => {
                    let rhs = stack.pop().ok_or(EvalError::Malformed)?;
                    let lhs = stack.pop().ok_or(EvalError::Malformed)?;
                    stack.push(apply_bin(*op, lhs, rhs));
                }
                RpnItem::Call { name, arity } => {
                    let mut args = [0.0f64; 3];
                    for slot in (0..*arity as usize).rev() {
                        args[slot] = stack.pop().ok_or(EvalError::Malformed)?;
                    }
                    stack.push(apply_call(name, &args[..*arity as usize])?);
                }
            }
        }
        match (stack.pop(), stack.is_empty()) {
            (Some(v), true) => Ok(v),
            _ => Err(EvalError::Malformed),
        }
    }
}

fn apply_bin(op: BinOp, lhs: f64, rhs: f64) -> f64 {
    match op {
        BinOp::Add => lhs + rhs,
        BinOp::Sub => lhs - rhs,
        BinOp::Mul => lhs * rhs,
        BinOp::Div => {
            if rhs == 0.0 {
                0.0
            } else {
                lhs / rhs
            }
        }
        BinOp::Pow => lhs.powf(rhs),
    }
}

fn apply_call(name: &str, args: &[f64]) -> Result<f64, EvalError> {
    match (name, args) {
        ("abs", [x]) => Ok(x.abs()),
        ("min", [a, b]) => Ok(a.min(*b)),
        ("max", [a, b]) => Ok(a.max(*b)),
        // Written out so a reversed range cannot panic.
        ("clamp", [x, lo, hi]) => Ok(x.max(*lo).min(*hi)),
        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
