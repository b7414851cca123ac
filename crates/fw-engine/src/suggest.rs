//! "Did you mean" hints for rejected commands.

use strsim::jaro_winkler;

/// Minimum similarity score for a suggestion (0.0-1.0).
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Commands that are always worth suggesting.
pub const BUILTIN_COMMANDS: &[&str] = &[
    "look",
    "inventory",
    "score",
    "undo",
    "log",
    "quit",
    "talk",
    "solve puzzle",
];

/// Candidates similar to `input`, best first, at most `limit` of them.
pub fn suggest<'a>(
    input: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> Vec<String> {
    let input = input.to_lowercase();
    let mut scored: Vec<(&str, f64)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let score = jaro_winkler(&input, &candidate.to_lowercase());
            (score >= SUGGESTION_THRESHOLD).then_some((candidate, score))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    scored.dedup_by(|a, b| a.0 == b.0);
    scored
        .into_iter()
        .take(limit)
        .map(|(candidate, _)| candidate.to_string())
        .collect()
}
