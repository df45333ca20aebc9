use strsim::normalized_levenshtein;

/// Minimum similarity ratio for a fuzzy match to count
///
/// Queries scoring below this against every catalog title resolve to nothing.
pub const MATCH_CUTOFF: f64 = 0.5;

/// Lowercases, trims, and collapses runs of whitespace
///
/// "The  Dark Knight " and "the dark knight" normalize to the same string, so
/// spacing and casing never cost a query its match.
pub fn normalize(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Finds the candidate title closest to the query
///
/// Scores every candidate with a normalized Levenshtein ratio and returns the
/// best one at or above the cutoff. Ties keep the earliest candidate.
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized_query = normalize(query);
    let mut best: Option<(&str, f64)> = None;

    for candidate in candidates {
        let score = normalized_levenshtein(&normalized_query, &normalize(candidate));
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }

    best.filter(|(_, score)| *score >= MATCH_CUTOFF)
        .map(|(candidate, _)| candidate)
}

/// Ranks all candidates at or above the cutoff, best first
///
/// Ties keep candidate order, so results are deterministic for autocomplete
/// use. `limit` bounds the returned list.
pub fn ranked_matches<'a, I>(query: &str, candidates: I, limit: usize) -> Vec<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized_query = normalize(query);

    let mut scored: Vec<(&str, f64)> = candidates
        .into_iter()
        .map(|candidate| {
            let score = normalized_levenshtein(&normalized_query, &normalize(candidate));
            (candidate, score)
        })
        .filter(|(_, score)| *score >= MATCH_CUTOFF)
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(limit);
    scored
}
