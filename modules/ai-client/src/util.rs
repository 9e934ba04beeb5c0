/// Truncate a string to at most `max_chars` characters.
///
/// Counts Unicode scalar values, not bytes, so the cut never lands inside a
/// multi-byte character.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        let text = "Hello 世界!";
        assert_eq!(truncate_chars(text, 7), "Hello 世");
    }

    #[test]
    fn test_truncate_within_bounds() {
        let text = "Hello";
        assert_eq!(truncate_chars(text, 100), "Hello");
        assert_eq!(truncate_chars(text, 5), "Hello");
    }

    #[test]
    fn test_truncate_to_zero() {
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("{}"), "{}");
    }
}
