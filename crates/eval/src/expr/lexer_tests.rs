// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

use super::*;
use yare::parameterized;

#[test]
fn tokenizes_mixed_expression() {
    let tokens = tokenize("clamp(x, 0.5, 2e3) + foo.bar_2 * -1").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Ident("clamp".to_string()),
            Token::LParen,
            Token::Ident("x".to_string()),
            Token::Comma,
            Token::Number(0.5),
            Token::Comma,
            Token::Number(2000.0),
            Token::RParen,
            Token::Op(BinOp::Add),
            Token::Ident("foo.bar_2".to_string()),
            Token::Op(BinOp::Mul),
            Token::Op(BinOp::Sub),
            Token::Number(1.0),
        ]
    );
}

#[parameterized(
    plain = { "42", 42.0 },
    fractional = { "3.25", 3.25 },
    leading_dot_fraction = { "0.5", 0.5 },
    exponent = { "1e3", 1000.0 },
    exponent_signed = { "2.5e-2", 0.025 },
    exponent_upper = { "1E2", 100.0 },
)]
fn tokenizes_numbers(input: &str, expected: f64) {
    assert_eq!(tokenize(input).unwrap(), vec![Token::Number(expected)]);
}

#[test]
fn whitespace_is_insignificant() {
    assert_eq!(tokenize(" 1 +\t2 ").unwrap(), tokenize("1+2").unwrap());
}

#[test]
fn rejects_unexpected_character() {
    assert_eq!(
        tokenize("1 $ 2"),
        Err(EvalError::UnexpectedChar { ch: '$', pos: 2 })
    );
}

#[test]
fn rejects_exponent_without_digits() {
    assert_eq!(tokenize("1e"), Err(EvalError::MalformedNumber { pos: 0 }));
    assert_eq!(tokenize("1e+"), Err(EvalError::MalformedNumber { pos: 0 }));
}

#[test]
fn rejects_lone_dot() {
    assert!(matches!(tokenize("."), Err(EvalError::MalformedNumber { .. })));
}

#[test]
fn rejects_empty_input() {
    assert_eq!(tokenize(""), Err(EvalError::Empty));
    assert_eq!(tokenize("   "), Err(EvalError::Empty));
}

#[test]
fn idents_may_contain_dots_and_digits() {
    let tokens = tokenize("veh.speed_01").unwrap();
    assert_eq!(tokens, vec![Token::Ident("veh.speed_01".to_string())]);
}
