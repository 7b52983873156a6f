//! Prompt enrichment.

/// Append style instructions to a prompt, comma separated.
///
/// Gives every generation a uniform look that survives the seven-colour panel.
/// Blank styles are skipped.
pub fn enrich_prompt<S: AsRef<str>>(prompt: &str, styles: &[S]) -> String {
    let mut parts = vec![prompt.trim()];
    parts.extend(
        styles
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty()),
    );
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_styles_in_order() {
        assert_eq!(
            enrich_prompt("a lighthouse", &["in the style of thomas kinkade"]),
            "a lighthouse, in the style of thomas kinkade"
        );
        assert_eq!(enrich_prompt("a fox", &["oil", "warm light"]), "a fox, oil, warm light");
    }

    #[test]
    fn no_styles_leaves_prompt() {
        let none: [&str; 0] = [];
        assert_eq!(enrich_prompt("  a fox ", &none), "a fox");
        assert_eq!(enrich_prompt("a fox", &["", "  "]), "a fox");
    }
}
