/// Characters that may not appear in an archive path component.
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Lookup key for aliases, person tokens and medical companies:
/// trimmed, inner whitespace collapsed to one space, lower-cased.
pub fn normalize_key(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Strip control characters and reserved glyphs, then collapse whitespace.
pub fn sanitize_component(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| !(*c < '\u{20}' || RESERVED.contains(c)))
        .collect();
    collapse_whitespace(&kept)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
