// src/utils/html.rs

/// Sanitizes quiz-authoring text (titles, prompts, options, explanations)
/// with ammonia's whitelist before it is stored. Managers author this
/// content, but it is later rendered to every quiz taker, so stored XSS
/// is still in scope.
pub fn clean_text(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_tags() {
        let cleaned = clean_text("Which port? <script>alert(1)</script>");
        assert!(!cleaned.contains("<script>"));
        assert!(cleaned.contains("Which port?"));
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(clean_text("What is 2 + 2?"), "What is 2 + 2?");
    }
}
