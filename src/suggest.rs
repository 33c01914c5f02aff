//! "Did you mean" suggestions for unrecognized flags.

use tracing::trace;

/// Best matches scoring below this similarity are not suggested.
pub const SUGGESTION_THRESHOLD: f64 = 0.1;

/// Flags that are never offered as suggestions.
pub const HELP_FLAGS: [&str; 2] = ["--help", "-h"];

/// Compute the Levenshtein (edit) distance between two strings, in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // Single rolling row of the DP table.
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut diagonal = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            let next = (row[j] + 1).min(row[j - 1] + 1).min(diagonal + cost);
            diagonal = row[j];
            row[j] = next;
        }
    }
    row[b.len()]
}

/// Normalized similarity in `[0, 1]`; 1 means identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Find the candidate flag closest to `unknown`.
///
/// Leading dashes are ignored on both sides. Ties keep the first candidate
/// seen. The candidate is returned as given (with its dashes).
pub fn suggest<'a, I>(unknown: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = unknown.trim_start_matches('-');
    let mut best: Option<(&str, f64)> = None;

    for candidate in candidates {
        if HELP_FLAGS.contains(&candidate) {
            continue;
        }
        let score = similarity(needle, candidate.trim_start_matches('-'));
        trace!(unknown, candidate, score, "scored suggestion candidate");
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }

    best.filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .map(|(candidate, _)| candidate.to_string())
}
