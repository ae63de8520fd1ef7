// SPDX-License-Identifier: GPL-3.0-only

//! Delimiter detection for settings tables
//!
//! For each candidate character the number of unquoted occurrences is counted
//! on every non-empty line. A delimiter should appear the same number of times
//! on (nearly) every line, so the candidate whose modal count is shared by the
//! largest fraction of lines wins. Ties go to the earlier candidate in
//! [`DELIMITER_CANDIDATES`].

use crate::constants::{DELIMITER_CANDIDATES, DELIMITER_MIN_CONSISTENCY};
use std::collections::HashMap;
use tracing::debug;

/// Detect the field delimiter of delimited text
///
/// Only reads the text; callers keep the original for parsing.
/// Returns `None` when no candidate is consistent enough.
pub fn detect_delimiter(text: &str) -> Option<char> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return None;
    }

    let mut best: Option<(char, f64)> = None;

    for candidate in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_unquoted(line, candidate))
            .collect();

        let Some(mode) = modal_count(&counts) else {
            continue;
        };
        if mode == 0 {
            continue;
        }

        let agreeing = counts.iter().filter(|&&c| c == mode).count();
        let consistency = agreeing as f64 / lines.len() as f64;
        debug!(
            delimiter = ?candidate,
            mode,
            consistency,
            "Delimiter candidate"
        );

        if consistency < DELIMITER_MIN_CONSISTENCY {
            continue;
        }
        if best.is_none_or(|(_, score)| consistency > score) {
            best = Some((candidate, consistency));
        }
    }

    best.map(|(delimiter, _)| delimiter)
}

/// Count occurrences of `delimiter` outside double-quoted sections
fn count_unquoted(line: &str, delimiter: char) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Most frequent value; ties resolve to the larger value
fn modal_count(counts: &[usize]) -> Option<usize> {
    let mut frequency: HashMap<usize, usize> = HashMap::new();
    for &count in counts {
        *frequency.entry(count).or_default() += 1;
    }
    frequency
        .into_iter()
        .max_by_key(|&(value, freq)| (freq, value))
        .map(|(value, _)| value)
}
