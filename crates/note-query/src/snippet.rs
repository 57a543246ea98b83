//! Context snippet derivation.
//!
//! All widths count characters, not bytes, so Japanese text is windowed
//! correctly. When a side of the window is truncated, the ellipsis marker is
//! budgeted inside that side's width, keeping the whole snippet within
//! `2 * width + term_length` characters.

const ELLIPSIS: &str = "...";

/// Derive a snippet from plaintext for the given query.
///
/// Query terms are tried in whitespace-split order; the first term with a
/// case-insensitive occurrence wins and is windowed with `width` characters
/// of context on each side. With no match, the leading `2 * width`
/// characters are returned instead.
pub fn derive_snippet(plaintext: &str, query: &str, width: usize) -> String {
    let chars: Vec<char> = plaintext.chars().collect();

    match find_first_term(&chars, query) {
        Some((start, len)) => window_around(&chars, start, len, width),
        None => leading_snippet(plaintext, 2 * width),
    }
}

/// Snippet from the indexed body, used when the live file is unreadable.
pub fn fallback_snippet(body_raw: &str, width: usize) -> String {
    leading_snippet(body_raw, width)
}

/// Lowercase one char without changing the char count, so window indexes
/// into the original text stay aligned.
fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Locate the first query term present in the text (query-term order, first
/// match wins). Returns the char offset and char length of the hit.
fn find_first_term(chars: &[char], query: &str) -> Option<(usize, usize)> {
    let haystack: Vec<char> = chars.iter().copied().map(fold_char).collect();

    for term in query.split_whitespace() {
        let needle: Vec<char> = term.chars().map(fold_char).collect();
        if needle.is_empty() || needle.len() > haystack.len() {
            continue;
        }
        for start in 0..=haystack.len() - needle.len() {
            if haystack[start..start + needle.len()] == needle[..] {
                return Some((start, needle.len()));
            }
        }
    }
    None
}

fn window_around(chars: &[char], start: usize, len: usize, width: usize) -> String {
    let end = start + len;
    let marker_len = ELLIPSIS.chars().count();

    let mut snippet = String::new();

    if start > width {
        // Truncated: the marker eats into this side's budget.
        let context = width.saturating_sub(marker_len);
        if width > marker_len {
            snippet.push_str(ELLIPSIS);
        }
        snippet.extend(&chars[start - context..start]);
    } else {
        snippet.extend(&chars[..start]);
    }

    snippet.extend(&chars[start..end]);

    let remaining = chars.len() - end;
    if remaining > width {
        let context = width.saturating_sub(marker_len);
        snippet.extend(&chars[end..end + context]);
        if width > marker_len {
            snippet.push_str(ELLIPSIS);
        }
    } else {
        snippet.extend(&chars[end..]);
    }

    snippet
}

fn leading_snippet(text: &str, max_chars: usize) -> String {
    let mut snippet: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_in_middle_has_both_ellipses() {
        let text = format!("{}needle{}", "a".repeat(50), "b".repeat(50));
        let snippet = derive_snippet(&text, "needle", 10);

        assert!(snippet.contains("needle"));
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert!(snippet.chars().count() <= 2 * 10 + "needle".chars().count());
    }

    #[test]
    fn test_match_near_start_has_no_leading_ellipsis() {
        let text = format!("needle{}", "b".repeat(50));
        let snippet = derive_snippet(&text, "needle", 10);

        assert!(snippet.starts_with("needle"));
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_short_text_returned_whole() {
        let snippet = derive_snippet("just a needle here", "needle", 20);
        assert_eq!(snippet, "just a needle here");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let snippet = derive_snippet("Obsidian is great", "obsidian", 10);
        assert!(snippet.contains("Obsidian"));
    }

    #[test]
    fn test_first_matching_term_wins_in_query_order() {
        let text = "alpha then beta";
        // "missing" has no hit, so "beta" is the first matching term even
        // though "alpha" appears earlier in the text.
        let snippet = derive_snippet(text, "missing beta", 5);
        assert!(snippet.contains("beta"));
    }

    #[test]
    fn test_no_match_returns_leading_double_window() {
        let text = "x".repeat(100);
        let snippet = derive_snippet(&text, "absent", 10);
        assert_eq!(snippet.chars().count(), 2 * 10 + 3);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_no_match_short_text_untruncated() {
        let snippet = derive_snippet("short body", "absent", 10);
        assert_eq!(snippet, "short body");
    }

    #[test]
    fn test_japanese_window_counts_chars() {
        let text = format!("{}東京{}", "あ".repeat(30), "い".repeat(30));
        let snippet = derive_snippet(&text, "東京", 5);

        assert!(snippet.contains("東京"));
        assert!(snippet.chars().count() <= 2 * 5 + 2);
    }

    #[test]
    fn test_fallback_truncates_with_ellipsis() {
        let body = "Obsidian is great and has many plugins";
        let snippet = fallback_snippet(body, 10);
        assert_eq!(snippet, "Obsidian i...");
    }

    #[test]
    fn test_fallback_short_body_untouched() {
        let snippet = fallback_snippet("Obsidian is great", 100);
        assert_eq!(snippet, "Obsidian is great");
    }
}
