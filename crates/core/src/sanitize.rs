//! Filesystem-safe leaf names from arbitrary titles.

/// Maximum length of a sanitized name, in characters.
pub const MAX_NAME_CHARS: usize = 150;

/// Maximum length of a sanitized name, in bytes.
///
/// Leaves room for the `.mp3` extension under the 255-byte leaf limit of
/// common file systems.
pub const MAX_NAME_BYTES: usize = 255 - ".mp3".len();

/// Characters that are never allowed in a produced file name.
pub const RESERVED_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Returns true if `c` may not appear in a sanitized name.
pub fn is_reserved(c: char) -> bool {
    RESERVED_CHARS.contains(&c) || c.is_control()
}

/// Turns an arbitrary title or file stem into a safe file-system leaf.
///
/// Reserved characters and control characters are removed, the result is
/// truncated to [`MAX_NAME_CHARS`] characters and at most [`MAX_NAME_BYTES`]
/// bytes on a character boundary, and surrounding whitespace is trimmed. An empty return value means there is no usable name; callers must
/// fail the unit instead of writing to an ambiguous path.
///
/// The operation is idempotent: `sanitize_name(&sanitize_name(s)) == sanitize_name(s)`.
pub fn sanitize_name(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !is_reserved(*c)).collect();
    let trimmed = stripped.trim();
    let mut truncated = String::new();
    for c in trimmed.chars().take(MAX_NAME_CHARS) {
        if truncated.len() + c.len_utf8() > MAX_NAME_BYTES {
            break;
        }
        truncated.push(c);
    }
    truncated.trim_end().to_string()
}

/// Like [`sanitize_name`], but returns `None` when nothing usable is left.
pub fn usable_name(raw: &str) -> Option<String> {
    let name = sanitize_name(raw);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_reserved_characters() {
        assert_eq!(sanitize_name("Ep 1: Intro?"), "Ep 1 Intro");
        assert_eq!(sanitize_name(r#"a\b/c:d*e?f"g<h>i|j"#), "abcdefghij");
    }

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(sanitize_name("line\none\ttab"), "lineonetab");
    }

    #[test]
    fn test_truncates_to_limit() {
        let long = "x".repeat(400);
        assert_eq!(sanitize_name(&long).chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn test_multibyte_title_fits_leaf_limit() {
        let name = sanitize_name(&"第".repeat(MAX_NAME_CHARS));
        assert!(name.len() + ".mp3".len() <= 255);
        assert_eq!(name.chars().count(), MAX_NAME_BYTES / 3);
        assert!(name.chars().all(|c| c == '第'));
    }

    #[test]
    fn test_byte_cut_lands_on_char_boundary() {
        // 1 + 3n bytes never lines up exactly with the limit
        let raw = format!("a{}", "日".repeat(100));
        let name = sanitize_name(&raw);
        assert!(name.len() <= MAX_NAME_BYTES);
        assert!(name.starts_with('a'));
        assert_eq!(name.len(), 1 + 3 * ((MAX_NAME_BYTES - 1) / 3));
    }

    #[test]
    fn test_byte_cut_does_not_leave_trailing_space() {
        let raw = format!("{} 日日", "日".repeat(83));
        let name = sanitize_name(&raw);
        assert_eq!(name, "日".repeat(83));
    }

    #[test]
    fn test_empty_after_stripping() {
        assert_eq!(sanitize_name("???"), "");
        assert_eq!(sanitize_name("   "), "");
        assert!(usable_name("<>|").is_none());
        assert_eq!(usable_name("ok"), Some("ok".to_string()));
    }

    #[test]
    fn test_truncation_does_not_leave_trailing_space() {
        let raw = format!("{} tail", "a".repeat(MAX_NAME_CHARS - 1));
        let name = sanitize_name(&raw);
        assert_eq!(name, "a".repeat(MAX_NAME_CHARS - 1));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Ep 1: Intro?",
            "  padded / name  ",
            "",
            "normal",
            "a:b\u{7}c",
            &format!("{} :: {}", "y".repeat(149), "z".repeat(10)),
            &"第".repeat(120),
            &format!("{} 日", "é".repeat(125)),
        ];
        for raw in inputs {
            let once = sanitize_name(raw);
            let twice = sanitize_name(&once);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
            assert!(once.chars().count() <= MAX_NAME_CHARS);
            assert!(once.len() <= MAX_NAME_BYTES);
            assert!(!once.chars().any(is_reserved));
        }
    }
}
