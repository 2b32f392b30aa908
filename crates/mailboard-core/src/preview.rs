//! Short plain-text previews of message bodies.

/// Default preview length in characters.
pub const DEFAULT_PREVIEW_LENGTH: usize = 150;

const ELLIPSIS: &str = "...";

/// Generates a preview: tags stripped, whitespace collapsed, and cut to
/// `max_length` characters with an ellipsis appended when longer.
///
/// Tag stripping removes any `<...>` span; it is a pattern, not an HTML
/// parser. Applying this to its own output returns the same string.
#[must_use]
pub fn generate_preview(body: &str, max_length: usize) -> String {
    let stripped = strip_tags(body);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > max_length {
        let truncated: String = collapsed.chars().take(max_length).collect();
        format!("{truncated}{ELLIPSIS}")
    } else {
        collapsed
    }
}

/// Removes every `<` ... `>` span. A `<` with no closing `>` after it is
/// kept as text.
fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                rest = &rest[open..];
                break;
            }
        }
    }

    result.push_str(rest);
    result
}
