// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

use super::*;
use crate::MAX_LINE_BYTES;
use tokio::io::BufReader;

async fn read_all(input: &[u8], max: usize) -> Vec<ReadOutcome> {
    let mut reader = BufReader::new(input);
    let mut outcomes = Vec::new();
    loop {
        let outcome = read_line_capped(&mut reader, max).await.unwrap();
        let done = outcome == ReadOutcome::Eof;
        outcomes.push(outcome);
        if done {
            return outcomes;
        }
    }
}

#[tokio::test]
async fn reads_multiple_lines() {
    let outcomes = read_all(b"alpha\nbeta\n", 64).await;
    assert_eq!(
        outcomes,
        vec![
            ReadOutcome::Line("alpha".to_string()),
            ReadOutcome::Line("beta".to_string()),
            ReadOutcome::Eof,
        ]
    );
}

#[tokio::test]
async fn strips_carriage_return() {
    let outcomes = read_all(b"hello\r\n", 64).await;
    assert_eq!(outcomes[0], ReadOutcome::Line("hello".to_string()));
}

#[tokio::test]
async fn empty_line_is_a_line() {
    let outcomes = read_all(b"\n", 64).await;
    assert_eq!(outcomes[0], ReadOutcome::Line(String::new()));
}

#[tokio::test]
async fn line_exactly_at_cap_is_accepted() {
    let payload = vec![b'x'; 16];
    let mut input = payload.clone();
    input.push(b'\n');
    let mut reader = BufReader::new(&input[..]);
    let outcome = read_line_capped(&mut reader, 16).await.unwrap();
    assert_eq!(outcome, ReadOutcome::Line("x".repeat(16)));
}

#[tokio::test]
async fn line_one_past_cap_overflows() {
    let mut input = vec![b'x'; 17];
    input.push(b'\n');
    let mut reader = BufReader::new(&input[..]);
    let outcome = read_line_capped(&mut reader, 16).await.unwrap();
    assert_eq!(outcome, ReadOutcome::Overflow);
}

#[tokio::test]
async fn unterminated_stream_past_cap_overflows() {
    let input = vec![b'x'; 64];
    let mut reader = BufReader::new(&input[..]);
    let outcome = read_line_capped(&mut reader, 16).await.unwrap();
    assert_eq!(outcome, ReadOutcome::Overflow);
}

#[tokio::test]
async fn eof_mid_line_is_eof() {
    let outcomes = {
        let mut reader = BufReader::new(&b"partial"[..]);
        vec![read_line_capped(&mut reader, 64).await.unwrap()]
    };
    assert_eq!(outcomes, vec![ReadOutcome::Eof]);
}

#[tokio::test]
async fn invalid_utf8_is_flagged() {
    let mut reader = BufReader::new(&b"\xff\xfe\n"[..]);
    let outcome = read_line_capped(&mut reader, 64).await.unwrap();
    assert_eq!(outcome, ReadOutcome::BadUtf8);
}

#[tokio::test]
async fn write_line_is_compact_and_terminated() {
    let mut out: Vec<u8> = Vec::new();
    write_line(&mut out, &serde_json::json!({"ok": true, "result": [1, 2]}))
        .await
        .unwrap();
    assert_eq!(out, b"{\"ok\":true,\"result\":[1,2]}\n");
}

#[tokio::test]
async fn written_lines_read_back() {
    let mut out: Vec<u8> = Vec::new();
    let value = serde_json::json!({"v": 1, "op": "ping"});
    write_line(&mut out, &value).await.unwrap();
    write_line(&mut out, &value).await.unwrap();

    let mut reader = BufReader::new(&out[..]);
    for _ in 0..2 {
        match read_line_capped(&mut reader, MAX_LINE_BYTES).await.unwrap() {
            ReadOutcome::Line(line) => {
                let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
                assert_eq!(parsed, value);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
