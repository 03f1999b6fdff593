// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Expression tokenizer.

use super::error::EvalError;
use super::token::{BinOp, Token};

/// Tokenize an expression string.
///
/// Whitespace separates tokens and is otherwise ignored. `-` is produced as
/// `BinOp::Sub`; the parser decides whether it is unary from context.
pub fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_ascii_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                tokens.push(read_number(input, &mut chars, pos)?);
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                tokens.push(read_ident(input, &mut chars, pos));
            }
            '+' => op(&mut chars, &mut tokens, BinOp::Add),
            '-' => op(&mut chars, &mut tokens, BinOp::Sub),
            '*' => op(&mut chars, &mut tokens, BinOp::Mul),
            '/' => op(&mut chars, &mut tokens, BinOp::Div),
            '^' => op(&mut chars, &mut tokens, BinOp::Pow),
            '(' => push(&mut chars, &mut tokens, Token::LParen),
            ')' => push(&mut chars, &mut tokens, Token::RParen),
            ',' => push(&mut chars, &mut tokens, Token::Comma),
            _ => return Err(EvalError::UnexpectedChar { ch, pos }),
        }
    }

    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }
    Ok(tokens)
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn push(chars: &mut Chars<'_>, tokens: &mut Vec<Token>, token: Token) {
    chars.next();
    tokens.push(token);
}

fn op(chars: &mut Chars<'_>, tokens: &mut Vec<Token>, op: BinOp) {
    push(chars, tokens, Token::Op(op));
}

/// Read `digits [. digits] [eE [+-] digits]` starting at `start`.
fn read_number(input: &str, chars: &mut Chars<'_>, start: usize) -> Result<Token, EvalError> {
    let mut end = start;
    let mut seen_dot = false;

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            '0'..='9' => {
                end = pos + 1;
                chars.next();
            }
            '.' if !seen_dot => {
                seen_dot = true;
                end = pos + 1;
                chars.next();
            }
            'e' | 'E' => {
                end = pos + 1;
                chars.next();
                if let Some(&(sign_pos, sign)) = chars.peek() {
                    if sign == '+' || sign == '-' {
                        end = sign_pos + 1;
                        chars.next();
                    }
                }
                let mut exp_digits = false;
                while let Some(&(dpos, d)) = chars.peek() {
                    if d.is_ascii_digit() {
                        exp_digits = true;
                        end = dpos + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }
                if !exp_digits {
                    return Err(EvalError::MalformedNumber { pos: start });
                }
                break;
            }
            _ => break,
        }
    }

    input[start..end]
        .parse::<f64>()
        .map(Token::Number)
        .map_err(|_| EvalError::MalformedNumber { pos: start })
}

/// Read `[A-Za-z_][A-Za-z0-9_.]*`.
fn read_ident(input: &str, chars: &mut Chars<'_>, start: usize) -> Token {
    let mut end = start;
    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
            end = pos + 1;
            chars.next();
        } else {
            break;
        }
    }
    Token::Ident(input[start..end].to_string())
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;
