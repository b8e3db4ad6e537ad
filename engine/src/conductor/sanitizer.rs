//! Response sanitizing and positional truncation helpers.

use regex::Regex;
use std::sync::OnceLock;

/// Code fence with an optional language tag and the newline that follows it
static FENCE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn fence_pattern() -> &'static Regex {
    FENCE_PATTERN.get_or_init(|| {
        Regex::new(r"```(?:python|json|yaml|plaintext)?\n?").expect("Invalid fence pattern")
    })
}

/// Strip markdown code fences from raw model text and trim it.
pub fn sanitize_response(text: &str) -> String {
    fence_pattern().replace_all(text, "").trim().to_string()
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_json_fence() {
        let raw = "```json\n{\"subtasks\": [\"a\"]}\n```";
        assert_eq!(sanitize_response(raw), "{\"subtasks\": [\"a\"]}");
    }

    #[test]
    fn test_strips_bare_fence() {
        assert_eq!(sanitize_response("```\nhello\n```  "), "hello");
    }

    #[test]
    fn test_plain_text_only_trimmed() {
        assert_eq!(sanitize_response("  42 \n"), "42");
    }

    #[test]
    fn test_unknown_tag_is_kept_as_text() {
        assert_eq!(sanitize_response("```rust\nfn main() {}\n```"), "rust\nfn main() {}");
    }

    #[test]
    fn test_truncate_shorter_input_is_whole() {
        assert_eq!(truncate_chars("abc", 500), "abc");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_chars("ação", 2), "aç");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
