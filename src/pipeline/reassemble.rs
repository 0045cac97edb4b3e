/// Delimiter placed between consecutive chunk outputs
pub const CHUNK_DELIMITER: &str = "\n\n";

/// Join per-chunk outputs in the order given.
///
/// No deduplication happens here; repeated context is handled by the prompts.
pub fn join<S: AsRef<str>>(outputs: &[S]) -> String {
    outputs
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(CHUNK_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_keeps_order() {
        let outputs = vec!["first".to_string(), "second".to_string(), "third".to_string()];
        assert_eq!(join(&outputs), "first\n\nsecond\n\nthird");
    }

    #[test]
    fn test_join_single_and_empty() {
        assert_eq!(join(&["only"]), "only");
        assert_eq!(join::<String>(&[]), "");
    }

    #[test]
    fn test_join_does_not_merge_repeated_content() {
        assert_eq!(join(&["same", "same"]), "same\n\nsame");
    }
}
