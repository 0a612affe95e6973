use chrono::{DateTime, Utc};
use nucleo::{Matcher, Utf32Str};

/// Normalize a fuzzy query: lowercase ASCII and drop whitespace and
/// control characters that would never appear in a display name.
pub fn normalize_fuzzy_needle(query: &str) -> String {
    query
        .chars()
        .filter(|ch| !ch.is_whitespace() && !ch.is_control())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// Cheap pre-filter before running the fuzzy matcher: the needle must
/// appear as a case-insensitive subsequence of the haystack.
pub fn ascii_case_insensitive_subsequence(haystack: &str, needle: &str) -> bool {
    let mut needle_chars = needle.chars().map(|ch| ch.to_ascii_lowercase());
    let Some(mut current) = needle_chars.next() else {
        return true;
    };

    for ch in haystack.chars() {
        if ch.to_ascii_lowercase() == current {
            match needle_chars.next() {
                Some(next) => current = next,
                None => return true,
            }
        }
    }
    false
}

/// Run `fuzzy_indices` with the degenerate inputs the matcher does not
/// tolerate filtered out first.
pub fn safe_fuzzy_indices(
    matcher: &mut Matcher,
    haystack: Utf32Str<'_>,
    needle: Utf32Str<'_>,
    indices: &mut Vec<u32>,
) -> Option<u16> {
    if needle.len() == 0 || needle.len() > haystack.len() {
        return None;
    }
    matcher.fuzzy_indices(haystack, needle, indices)
}

pub fn recency_frequency_bonus(
    use_count: i64,
    last_used_rfc3339: &str,
    now: DateTime<Utc>,
    frequency_weight: f64,
    recency_weight: f64,
    recency_half_life_hours: f64,
    scale: f64,
) -> f64 {
    let normalized_frequency = (1.0 + use_count.max(0) as f64).ln();
    let recency_bonus = DateTime::parse_from_rfc3339(last_used_rfc3339)
        .ok()
        .map(|last_used| {
            let hours_since_last_used =
                (now - last_used.with_timezone(&Utc)).num_seconds().max(0) as f64 / 3600.0;
            2f64.powf(-hours_since_last_used / recency_half_life_hours)
        })
        .unwrap_or(0.0);

    (normalized_frequency * frequency_weight + recency_bonus * recency_weight) * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use nucleo::Config;

    #[test]
    fn test_normalize_strips_whitespace_and_lowercases() {
        assert_eq!(normalize_fuzzy_needle("A\nL\tP"), "alp");
        assert_eq!(normalize_fuzzy_needle("  New Task "), "newtask");
        assert_eq!(normalize_fuzzy_needle(""), "");
    }

    #[test]
    fn test_subsequence_matches_in_order() {
        assert!(ascii_case_insensitive_subsequence("Alpha Task", "alp"));
        assert!(ascii_case_insensitive_subsequence("Alpha Task", "AT"));
        assert!(ascii_case_insensitive_subsequence("Alpha Task", ""));
        assert!(!ascii_case_insensitive_subsequence("Alpha Task", "pla"));
        assert!(!ascii_case_insensitive_subsequence("", "a"));
    }

    #[test]
    fn test_safe_fuzzy_indices_rejects_degenerate_needles() {
        let mut matcher = Matcher::new(Config::DEFAULT);
        let mut haystack_buf = Vec::new();
        let mut needle_buf = Vec::new();
        let mut indices = Vec::new();

        let haystack = Utf32Str::new("task", &mut haystack_buf);
        let empty = Utf32Str::new("", &mut needle_buf);
        assert_eq!(
            safe_fuzzy_indices(&mut matcher, haystack, empty, &mut indices),
            None
        );

        let mut long_buf = Vec::new();
        let longer = Utf32Str::new("taskpalette", &mut long_buf);
        assert_eq!(
            safe_fuzzy_indices(&mut matcher, haystack, longer, &mut indices),
            None
        );
    }

    #[test]
    fn test_safe_fuzzy_indices_scores_real_match() {
        let mut matcher = Matcher::new(Config::DEFAULT);
        let mut haystack_buf = Vec::new();
        let mut needle_buf = Vec::new();
        let mut indices = Vec::new();

        let haystack = Utf32Str::new("new task", &mut haystack_buf);
        let needle = Utf32Str::new("ntask", &mut needle_buf);
        let score = safe_fuzzy_indices(&mut matcher, haystack, needle, &mut indices);

        assert!(score.is_some());
        assert!(!indices.is_empty());
    }

    #[test]
    fn test_recency_beats_staleness_at_equal_counts() {
        let now = Utc::now();
        let recent = (now - Duration::hours(1)).to_rfc3339();
        let stale = (now - Duration::hours(240)).to_rfc3339();

        let recent_bonus = recency_frequency_bonus(5, &recent, now, 0.3, 0.7, 24.0, 100.0);
        let stale_bonus = recency_frequency_bonus(5, &stale, now, 0.3, 0.7, 24.0, 100.0);

        assert!(recent_bonus > stale_bonus);
    }

    #[test]
    fn test_unparseable_timestamp_drops_recency_term() {
        let now = Utc::now();
        let bonus = recency_frequency_bonus(5, "not-a-timestamp", now, 0.3, 0.7, 24.0, 100.0);
        let expected = (1.0 + 5.0f64).ln() * 0.3 * 100.0;
        assert!((bonus - expected).abs() < 1e-9);
    }
}
