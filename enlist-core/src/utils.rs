//! Shared string utilities.

/// Derive a display name from an entry path (e.g., "polished_andesite" -> "Polished Andesite").
///
/// Only the last path segment is used, so `"stone/smooth_slab"` becomes `"Smooth Slab"`.
pub fn to_english_name(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_english_name() {
        assert_eq!(to_english_name("torch"), "Torch");
        assert_eq!(to_english_name("polished_andesite"), "Polished Andesite");
        assert_eq!(to_english_name("stone/smooth_slab"), "Smooth Slab");
        assert_eq!(to_english_name("double__underscore"), "Double Underscore");
        assert_eq!(to_english_name(""), "");
    }
}
