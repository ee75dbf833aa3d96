//! Position and confidence extraction from role responses.
//!
//! Pure text pattern matching over free-form LLM output, no I/O.
//!
//! # Recognized lines
//!
//! | Line | Meaning |
//! |------|---------|
//! | `POSITION [topic]: stance` | stance on a named topic |
//! | `POSITION (topic): stance` | same, parenthesized topic |
//! | `POSITION: stance` | untopiced statement |
//! | `CONFIDENCE: 0.8` / `CONFIDENCE: 80%` | self-reported confidence |
//!
//! Keywords are case-insensitive and may be preceded by list markers
//! (`-`, `*`, `1.`) or markdown emphasis.

use serde::{Deserialize, Serialize};

/// Confidence assumed when a role does not report one
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// A position statement extracted from a role's response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub stance: String,
}

impl Position {
    pub fn new(topic: Option<String>, stance: impl Into<String>) -> Self {
        Self {
            topic,
            stance: stance.into(),
        }
    }
}

/// Extract position statements from a response.
///
/// Falls back to the first non-empty, non-confidence line as a single
/// untopiced statement when no `POSITION` line is present. Returns an
/// empty list only for blank content.
pub fn extract_positions(content: &str) -> Vec<Position> {
    let positions: Vec<Position> = content.lines().filter_map(parse_position_line).collect();
    if !positions.is_empty() {
        return positions;
    }

    content
        .lines()
        .map(strip_line_decoration)
        .find(|line| !line.is_empty() && keyword_value(line, "confidence").is_none())
        .map(|line| vec![Position::new(None, line)])
        .unwrap_or_default()
}

/// Parse self-reported confidence; returns [`DEFAULT_CONFIDENCE`] when absent.
///
/// Values above 1 are read as percentages. The last occurrence wins.
pub fn parse_confidence(content: &str) -> f64 {
    content
        .lines()
        .filter_map(|line| keyword_value(strip_line_decoration(line), "confidence"))
        .filter_map(|value| {
            let number = value.trim().trim_end_matches('%').trim();
            let number = number.split_whitespace().next()?;
            number.parse::<f64>().ok()
        })
        .next_back()
        .map(|v| if v > 1.0 { v / 100.0 } else { v })
        .map(crate::lifecycle::energy::clamp_unit)
        .unwrap_or(DEFAULT_CONFIDENCE)
}

fn parse_position_line(line: &str) -> Option<Position> {
    let line = strip_line_decoration(line);
    let head = line.get(.."position".len())?;
    if !head.eq_ignore_ascii_case("position") {
        return None;
    }
    let rest = line["position".len()..].trim_start();

    let (topic, rest) = match rest.chars().next() {
        Some(open @ ('[' | '(')) => {
            let close = if open == '[' { ']' } else { ')' };
            let end = rest.find(close)?;
            let topic = rest[1..end].trim();
            let topic = (!topic.is_empty()).then(|| topic.to_string());
            (topic, rest[end + 1..].trim_start())
        }
        _ => (None, rest),
    };

    let stance = rest
        .strip_prefix(':')?
        .trim_start_matches(['*', '_'])
        .trim();
    if stance.is_empty() {
        return None;
    }
    Some(Position::new(topic, stance))
}

/// Return the text after `keyword:` if the line starts with it
fn keyword_value<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    line[keyword.len()..].trim_start().strip_prefix(':')
}

fn strip_line_decoration(line: &str) -> &str {
    let mut line = line.trim();
    loop {
        let before = line;
        line = line.trim_start_matches(['-', '*', '>', '#', '_']).trim_start();
        let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits > 0 && line[digits..].starts_with('.') {
            line = line[digits + 1..].trim_start();
        }
        if line == before {
            break;
        }
    }
    line.trim_end_matches(['*', '_']).trim_end()
}
