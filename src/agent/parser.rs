//! Tool-call extraction from assistant replies.
//!
//! Models are instructed to request tools with tagged blocks:
//!
//! ```text
//! <tool>
//! TOOL: list_files
//! ARGS: .
//! </tool>
//! ```
//!
//! Older models emitted a bare `TOOL: name ... ARGS: args` line with no
//! delimiters, terminated by a blank line or end of text. Both dialects
//! are accepted, tried in that order; the first one that matches anything
//! wins and the dialects are never mixed within one reply.

use regex::Regex;
use std::sync::LazyLock;

/// One tool request extracted from a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Lowercased tool name.
    pub name: String,
    /// Raw argument text, trimmed, delimiters untouched.
    pub raw_args: String,
}

/// Result of scanning a reply for tool calls.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Neither dialect matched; the reply is final conversational text.
    NoMatch,
    /// Tool calls in document order.
    Calls(Vec<ToolCall>),
}

// The TOOL: label is optional inside a block; a block containing just the
// name where the label is expected still parses. The ARGS: section may be
// absent entirely (a no-argument call).
static TAGGED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<tool>\s*(?:tool:\s*)?(\w+)\s*(?:args:\s*(.*?))?\s*</tool>")
        .expect("tagged dialect regex")
});

static LEGACY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)tool:\s*(\w+)\W.*?args:\s*(.*?)(?:\n\s*\n|\z)").expect("legacy dialect regex")
});

// Cleanup patterns for text bound for the user. An unterminated <tool>
// block is swept up too, in case the model ran out of tokens mid-markup.
static TAGGED_RESIDUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tool>.*?(?:</tool>|\z)").expect("tagged residue regex"));

static LEGACY_RESIDUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)tool:\s*\w+\W.*?args:\s*.*?(?:\n\s*\n|\z)").expect("legacy residue regex")
});

/// Extract tool calls from an assistant reply.
///
/// Pure and stateless; safe to call on any text.
pub fn extract_calls(text: &str) -> Extraction {
    let tagged: Vec<ToolCall> = TAGGED
        .captures_iter(text)
        .map(|cap| ToolCall {
            name: cap[1].to_lowercase(),
            raw_args: cap
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default(),
        })
        .collect();

    if !tagged.is_empty() {
        return Extraction::Calls(tagged);
    }

    let legacy: Vec<ToolCall> = LEGACY
        .captures_iter(text)
        .map(|cap| ToolCall {
            name: cap[1].to_lowercase(),
            raw_args: cap[2].trim().to_string(),
        })
        .collect();

    if !legacy.is_empty() {
        return Extraction::Calls(legacy);
    }

    Extraction::NoMatch
}

/// Remove any tool-call markup from text destined for the user.
///
/// Raw tool syntax must never reach a human, even when the dialects
/// failed to match malformed markup.
pub fn strip_tool_markup(text: &str) -> String {
    let without_tagged = TAGGED_RESIDUE.replace_all(text, "");
    let without_legacy = LEGACY_RESIDUE.replace_all(&without_tagged, "");
    without_legacy.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_no_match() {
        assert_eq!(extract_calls("Here is your answer."), Extraction::NoMatch);
    }

    #[test]
    fn test_tagged_single_call() {
        let text = "Let me check.\n<tool>\nTOOL: list_files\nARGS: .\n</tool>";
        match extract_calls(text) {
            Extraction::Calls(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name, "list_files");
                assert_eq!(calls[0].raw_args, ".");
            }
            Extraction::NoMatch => panic!("expected a call"),
        }
    }

    #[test]
    fn test_tagged_multiple_calls_in_order() {
        let text = r#"<tool>
TOOL: create_folder
ARGS: projects
</tool>
<tool>
TOOL: create_file
ARGS: projects/notes.txt | hello
</tool>"#;
        match extract_calls(text) {
            Extraction::Calls(calls) => {
                assert_eq!(calls.len(), 2);
                assert_eq!(calls[0].name, "create_folder");
                assert_eq!(calls[1].name, "create_file");
                assert_eq!(calls[1].raw_args, "projects/notes.txt | hello");
            }
            Extraction::NoMatch => panic!("expected two calls"),
        }
    }

    #[test]
    fn test_tagged_label_is_optional() {
        let text = "<tool>\nsystem_info\n</tool>";
        match extract_calls(text) {
            Extraction::Calls(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name, "system_info");
                assert_eq!(calls[0].raw_args, "");
            }
            Extraction::NoMatch => panic!("expected a call"),
        }
    }

    #[test]
    fn test_tagged_is_case_insensitive() {
        let text = "<TOOL>\ntool: Read_File\nArgs: notes.txt\n</TOOL>";
        match extract_calls(text) {
            Extraction::Calls(calls) => {
                assert_eq!(calls[0].name, "read_file");
                assert_eq!(calls[0].raw_args, "notes.txt");
            }
            Extraction::NoMatch => panic!("expected a call"),
        }
    }

    #[test]
    fn test_legacy_dialect() {
        let text = "TOOL: search_web\nARGS: rust async traits";
        match extract_calls(text) {
            Extraction::Calls(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name, "search_web");
                assert_eq!(calls[0].raw_args, "rust async traits");
            }
            Extraction::NoMatch => panic!("expected a call"),
        }
    }

    #[test]
    fn test_legacy_terminates_at_blank_line() {
        let text = "TOOL: read_file\nARGS: a.txt\n\nSome trailing commentary.";
        match extract_calls(text) {
            Extraction::Calls(calls) => {
                assert_eq!(calls[0].raw_args, "a.txt");
            }
            Extraction::NoMatch => panic!("expected a call"),
        }
    }

    #[test]
    fn test_legacy_allows_words_between_name_and_args() {
        let text = "TOOL: read_file with ARGS: a.txt";
        match extract_calls(text) {
            Extraction::Calls(calls) => {
                assert_eq!(calls[0].name, "read_file");
                assert_eq!(calls[0].raw_args, "a.txt");
            }
            Extraction::NoMatch => panic!("expected a call"),
        }
    }

    #[test]
    fn test_tagged_wins_over_legacy() {
        // The block body also matches the legacy pattern; only the tagged
        // dialect may produce calls for this reply.
        let text = "<tool>\nTOOL: read_file\nARGS: a.txt\n</tool>";
        match extract_calls(text) {
            Extraction::Calls(calls) => assert_eq!(calls.len(), 1),
            Extraction::NoMatch => panic!("expected a call"),
        }
    }

    #[test]
    fn test_args_preserve_internal_delimiters() {
        let text = "<tool>\nTOOL: run_python\nARGS: print(1 | 2)\n</tool>";
        match extract_calls(text) {
            Extraction::Calls(calls) => {
                assert_eq!(calls[0].raw_args, "print(1 | 2)");
            }
            Extraction::NoMatch => panic!("expected a call"),
        }
    }

    #[test]
    fn test_strip_removes_tagged_blocks() {
        let text = "Done!\n<tool>\nTOOL: read_file\nARGS: a.txt\n</tool>\nAnything else?";
        let cleaned = strip_tool_markup(text);
        assert!(!cleaned.contains("<tool>"));
        assert!(!cleaned.contains("TOOL:"));
        assert!(cleaned.contains("Done!"));
        assert!(cleaned.contains("Anything else?"));
    }

    #[test]
    fn test_strip_removes_unterminated_block() {
        let text = "Working on it.\n<tool>\nTOOL: read_file\nARGS: a.txt";
        let cleaned = strip_tool_markup(text);
        assert_eq!(cleaned, "Working on it.");
    }

    #[test]
    fn test_strip_removes_legacy_fragment() {
        let text = "Sure.\nTOOL: search_web\nARGS: weather";
        let cleaned = strip_tool_markup(text);
        assert_eq!(cleaned, "Sure.");
    }

    #[test]
    fn test_strip_removes_wordy_legacy_fragment() {
        let text = "Sure.\nTOOL: search_web now ARGS: weather";
        let cleaned = strip_tool_markup(text);
        assert_eq!(cleaned, "Sure.");
    }

    #[test]
    fn test_strip_leaves_plain_text_alone() {
        let text = "The tools I used found 3 files.";
        assert_eq!(strip_tool_markup(text), text);
    }
}
