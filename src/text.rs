//! Dialogue cleaning and two-line wrapping.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::Cleaning;

static ASIDE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));

/// Reduces raw dialogue to one logical line according to `mode`.
pub fn clean_dialogue(raw: &str, mode: Cleaning) -> String {
    match mode {
        Cleaning::StripAsides => normalize_ws(&ASIDE.replace_all(raw, "")),
        Cleaning::KeepAsides => normalize_ws(raw),
    }
}

/// Collapses every whitespace run (line breaks included) into one space and trims.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Splits off the longest leading line of at most `limit` characters.
///
/// Breaks at the nearest space at or before `limit` that does not follow another
/// space; without one the text is cut at exactly `limit` characters. Returns the
/// line and the trimmed remainder, if any.
pub fn break_line(text: &str, limit: usize) -> (String, Option<String>) {
    let limit = limit.max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= limit {
        return (text.to_string(), None);
    }

    let split = (1..=limit).rev().find(|&i| chars[i] == ' ' && chars[i - 1] != ' ');

    let (head, tail): (String, String) = match split {
        Some(i) => (chars[..i].iter().collect(), chars[i + 1..].iter().collect()),
        None => (chars[..limit].iter().collect(), chars[limit..].iter().collect()),
    };

    let tail = tail.trim();
    let rest = (!tail.is_empty()).then(|| tail.to_string());
    (head.trim().to_string(), rest)
}

/// Wraps dialogue onto at most two lines. The first line never exceeds `limit`;
/// the second keeps whatever is left, however long.
pub fn wrap_two_lines(text: &str, limit: usize) -> String {
    match break_line(text, limit) {
        (first, Some(second)) => format!("{first}\n{second}"),
        (first, None) => first,
    }
}

/// Cuts text into display blocks of at most two lines, each line at most `limit`
/// characters. Every block but the last is full; the last may be a single line.
pub fn split_blocks(text: &str, limit: usize) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut rest = Some(text.to_string());

    while let Some(current) = rest.take() {
        let (first, after_first) = break_line(&current, limit);
        match after_first {
            None => blocks.push(first),
            Some(remaining) => {
                let (second, overflow) = break_line(&remaining, limit);
                blocks.push(format!("{first}\n{second}"));
                rest = overflow;
            }
        }
    }

    blocks
}
