//! Source spans for manifest values.
//!
//! Serde does not keep spans for values inside arrays of tables, so errors
//! found after parsing locate their value by searching the source. When a
//! value cannot be located the error is reported without a label rather than
//! pointing at the wrong place.

use miette::SourceSpan;

/// Span of the `nth` occurrence of `key = "value"`, in either quote style.
pub(crate) fn find_assignment_span(
    src: &str,
    key: &str,
    value: &str,
    nth: usize,
) -> Option<SourceSpan> {
    quoted_positions(src, value)
        .into_iter()
        .filter(|&start| assigned_to(&src[..start - 1], key))
        .nth(nth)
        .map(|start| SourceSpan::from((start, value.len())))
}

/// Span of the `nth` quoted occurrence of `value`, e.g. an array item.
pub(crate) fn find_quoted_span(src: &str, value: &str, nth: usize) -> Option<SourceSpan> {
    quoted_positions(src, value)
        .into_iter()
        .nth(nth)
        .map(|start| SourceSpan::from((start, value.len())))
}

/// Start offsets of `value` wherever it appears quoted.
fn quoted_positions(src: &str, value: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    for quote in ['"', '\''] {
        let needle = format!("{quote}{value}{quote}");
        positions.extend(src.match_indices(&needle).map(|(pos, _)| pos + 1));
    }
    positions.sort_unstable();
    positions
}

/// Whether the text before an opening quote ends with `key =`.
fn assigned_to(before: &str, key: &str) -> bool {
    let Some(before) = before.trim_end().strip_suffix('=') else {
        return false;
    };
    let Some(prefix) = before.trim_end().strip_suffix(key) else {
        return false;
    };
    prefix
        .chars()
        .last()
        .is_none_or(|c| c.is_whitespace() || c == '{' || c == ',')
}

/// Kind names become path segments and translation-key prefixes.
pub(crate) fn is_kind_name(kind: &str) -> bool {
    !kind.is_empty()
        && kind
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
