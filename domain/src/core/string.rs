//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Canonical form used wherever two free-text statements are compared.
///
/// Lowercases, turns every non-alphanumeric character into a space and
/// collapses runs of whitespace. Pure and deterministic.
pub fn normalize(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("あのね", 30), "あのね");
        // 9 bytes, max 7 -> target 4 -> back to boundary 3
        assert_eq!(truncate("あのね", 7), "あ...");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Use   PostgreSQL! "), "use postgresql");
        assert_eq!(normalize("use-postgresql"), "use postgresql");
        assert_eq!(normalize("..."), "");
    }
}
