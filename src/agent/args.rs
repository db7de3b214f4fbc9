//! Argument resolution for tool invocations.
//!
//! Raw argument text from the model is turned into a positional argument
//! list using the tool's declared arity. The preferred multi-argument
//! delimiter is the pipe; a bounded comma split accommodates models that
//! ignore the convention.

/// Resolve raw argument text into a positional argument list.
///
/// Policy, applied in order:
/// 1. Empty or the literal token `none` → no arguments.
/// 2. Arity exactly one → the whole trimmed text as a single argument,
///    internal delimiters preserved (source code, free text).
/// 3. Split on `|` into up to `arity` fields, dropping empty fields.
/// 4. No pipe present → split on `,` limited to `arity - 1` splits, so
///    the final field may itself contain commas.
/// 5. Unknown arity → pipe split with no limit.
pub fn resolve_args(raw: &str, arity: Option<usize>) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        return Vec::new();
    }

    match arity {
        None => split_fields(raw.split('|'), usize::MAX),
        Some(0) => Vec::new(),
        Some(1) => vec![raw.to_string()],
        Some(n) => {
            if raw.contains('|') {
                split_fields(raw.split('|'), n)
            } else {
                split_fields(raw.splitn(n, ','), n)
            }
        }
    }
}

fn split_fields<'a>(parts: impl Iterator<Item = &'a str>, limit: usize) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_none_yield_no_args() {
        assert!(resolve_args("", Some(2)).is_empty());
        assert!(resolve_args("   ", Some(2)).is_empty());
        assert!(resolve_args("none", Some(2)).is_empty());
        assert!(resolve_args("NONE", None).is_empty());
    }

    #[test]
    fn test_arity_one_is_verbatim() {
        assert_eq!(resolve_args("a|b|c", Some(1)), vec!["a|b|c"]);
        assert_eq!(
            resolve_args("  print(1, 2)  ", Some(1)),
            vec!["print(1, 2)"]
        );
    }

    #[test]
    fn test_pipe_split() {
        assert_eq!(
            resolve_args("notes.txt | hello world", Some(2)),
            vec!["notes.txt", "hello world"]
        );
    }

    #[test]
    fn test_pipe_split_drops_empty_fields() {
        assert_eq!(resolve_args("a || b", Some(3)), vec!["a", "b"]);
    }

    #[test]
    fn test_comma_fallback_bounded_by_arity() {
        assert_eq!(
            resolve_args("x, y, z, extra", Some(3)),
            vec!["x", "y", "z, extra"]
        );
    }

    #[test]
    fn test_comma_fallback_single_field() {
        assert_eq!(resolve_args("just one", Some(3)), vec!["just one"]);
    }

    #[test]
    fn test_unknown_arity_pipe_splits_unlimited() {
        assert_eq!(
            resolve_args("a | b | c | d", None),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn test_arity_zero_ignores_text() {
        assert!(resolve_args("whatever", Some(0)).is_empty());
    }
}
