use scraper::Html;

/// Removes every tag from an HTML/XML fragment and collapses whitespace.
/// Entities are decoded by the HTML parser.
pub fn strip_markup(input: &str) -> String {
    if !input.contains('<') && !input.contains('&') {
        return collapse_whitespace(input);
    }

    let fragment = Html::parse_fragment(input);
    let text: String = fragment.root_element().text().collect();
    collapse_whitespace(&text)
}

/// Truncates to at most `max_chars` characters, ending with "..." when cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let head: String = s.chars().take(keep).collect();
    format!("{}...", head.trim_end())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
