//! Shared utility functions.

/// Bounded diagnostic preview of an upstream body: at most `max_chars`
/// characters, with `...` appended when cut.
pub fn preview(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_keeps_short_bodies() {
        assert_eq!(preview("{\"ok\":1}", 240), "{\"ok\":1}");
        assert_eq!(preview("", 240), "");
    }

    #[test]
    fn test_preview_cuts_long_bodies() {
        let body = "x".repeat(300);
        let cut = preview(&body, 240);
        assert_eq!(cut.len(), 243);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_preview_counts_characters() {
        assert_eq!(preview("あのね", 2), "あの...");
    }
}
