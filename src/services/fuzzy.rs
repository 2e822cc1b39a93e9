//! Approximate matching for short free-text queries against course and
//! teacher names.

/// Candidates must score strictly above this to count as a match.
pub const MATCH_THRESHOLD: f64 = 60.0;

/// At most this many best-scoring candidates are kept.
pub const CANDIDATE_LIMIT: usize = 3;

/// Best-window similarity of the shorter string inside the longer one,
/// on a 0-100 scale.
///
/// Windows range from the needle's length up to twice that, so an
/// abbreviation such as `高数` still lines up with `高等数` inside
/// `高等数学`.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let (needle, haystack) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if needle.is_empty() {
        return 0.0;
    }

    let needle_str: String = needle.iter().collect();
    let max_width = haystack.len().min(needle.len() * 2);
    let mut best = 0.0_f64;

    for width in needle.len()..=max_width {
        for start in 0..=(haystack.len() - width) {
            let window: String = haystack[start..start + width].iter().collect();
            let score = strsim::normalized_levenshtein(&needle_str, &window);
            if score > best {
                best = score;
                if best >= 1.0 {
                    return 100.0;
                }
            }
        }
    }

    best * 100.0
}

/// Score every candidate against `query` and keep the best few that clear
/// the threshold. Ties keep the candidates' original order.
pub fn extract<'a, I>(query: &str, candidates: I) -> Vec<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(&'a str, f64)> = candidates
        .into_iter()
        .map(|candidate| (candidate, partial_ratio(query, candidate)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(CANDIDATE_LIMIT);
    scored.retain(|(_, score)| *score > MATCH_THRESHOLD);
    scored
}
