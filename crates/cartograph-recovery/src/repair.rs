//! Text-level repairs for the defects the generator is known to produce.
//!
//! Each function is pure and independently testable. The comma and tail
//! repairs are pattern based and may touch string contents; they only run
//! after a direct parse has already failed. Newline escaping and the
//! bracket scanners track string literals and escapes.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// A comma followed, ignoring whitespace, by a closing bracket.
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[\]}])").expect("Invalid trailing comma regex"));

/// A comma followed by a key/value fragment that never closes.
static INCOMPLETE_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#",\s*(?:"[^"]*"?\s*(?::\s*(?:"[^"]*"?|[-+.\w]*))?)?\s*$"#)
        .expect("Invalid incomplete tail regex")
});

/// Slices from the first `{` to the last `}` inclusive.
pub fn bound(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Removes every comma that directly precedes `]` or `}`.
pub fn strip_trailing_commas(text: &str) -> Cow<'_, str> {
    TRAILING_COMMA.replace_all(text, "$1")
}

/// Replaces raw `\n` and `\r\n` line breaks inside string literals with an
/// escaped `\n`, in a single pass. Line breaks between tokens are kept.
pub fn escape_string_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\n') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut changed = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                '\r' if chars.peek() == Some(&'\n') => {
                    chars.next();
                    out.push_str("\\n");
                    changed = true;
                    continue;
                }
                '\n' => {
                    out.push_str("\\n");
                    changed = true;
                    continue;
                }
                _ => {}
            }
        } else if c == '"' {
            in_string = true;
        }
        out.push(c);
    }

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(text)
    }
}

/// Drops a trailing `, "key": value` fragment that has no closing delimiter.
pub fn strip_incomplete_tail(text: &str) -> Cow<'_, str> {
    INCOMPLETE_TAIL.replace(text, "")
}

/// Containers left open at the end of `text`, and whether it ends inside a
/// string literal.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OpenState {
    /// Opening brackets in the order they were opened.
    pub stack: Vec<char>,
    pub in_string: bool,
}

impl OpenState {
    /// Text that closes everything still open, most recently opened first.
    pub fn closing_sequence(&self) -> String {
        let mut closers = String::with_capacity(self.stack.len() + 1);
        if self.in_string {
            closers.push('"');
        }
        closers.extend(self.stack.iter().rev().map(|open| match open {
            '[' => ']',
            _ => '}',
        }));
        closers
    }
}

/// Scans `text` tracking open containers, skipping brackets inside strings.
pub fn open_state(text: &str) -> OpenState {
    let mut state = OpenState::default();
    let mut escaped = false;

    for c in text.chars() {
        if state.in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => state.in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => state.in_string = true,
            '{' | '[' => state.stack.push(c),
            '}' | ']' => {
                state.stack.pop();
            }
            _ => {}
        }
    }

    state
}

/// Balances a truncated object: drops an incomplete trailing fragment,
/// closes every open container, then re-normalizes trailing commas that
/// the new closers may expose.
pub fn close_truncated(text: &str) -> String {
    let trimmed = strip_incomplete_tail(text.trim_end());
    let mut balanced = trimmed.into_owned();
    balanced.push_str(&open_state(&balanced).closing_sequence());
    strip_trailing_commas(&balanced).into_owned()
}

/// Byte index of the bracket closing the one at `open`, honoring strings.
pub fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in text[open..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound() {
        assert_eq!(bound("think {\"a\":1} done"), Some("{\"a\":1}"));
        assert_eq!(bound("x {\"a\":{\"b\":2}} y }"), Some("{\"a\":{\"b\":2}} y }"));
        assert_eq!(bound("no braces here"), None);
        assert_eq!(bound("only { open"), None);
        assert_eq!(bound("} backwards {"), None);
    }

    #[test]
    fn test_strip_trailing_commas() {
        assert_eq!(
            strip_trailing_commas("{\"nodes\":[{\"id\":\"a\"},],\"edges\":[],}"),
            "{\"nodes\":[{\"id\":\"a\"}],\"edges\":[]}"
        );
        assert_eq!(strip_trailing_commas("[1,\n  ]"), "[1\n  ]");
        assert!(matches!(strip_trailing_commas("[1,2]"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_string_newlines() {
        let broken = "{\"purpose\": \"line one\nline two\nline three\", \"x\": 1}";
        assert_eq!(
            escape_string_newlines(broken),
            "{\"purpose\": \"line one\\nline two\\nline three\", \"x\": 1}"
        );

        let pretty = "{\n  \"a\": \"b\",\n  \"c\": 1\n}";
        assert!(matches!(escape_string_newlines(pretty), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_string_newlines_after_escaped_quotes() {
        let broken = "{\"p\": \"say \\\"hi\\\"\nmore\", \"q\": [\"a\r\nb\"]\n}";
        assert_eq!(
            escape_string_newlines(broken),
            "{\"p\": \"say \\\"hi\\\"\\nmore\", \"q\": [\"a\\nb\"]\n}"
        );
    }

    #[test]
    fn test_escape_string_newlines_many_lines_in_one_value() {
        let lines = vec!["step"; 200];
        let broken = format!("{{\"purpose\": \"{}\"}}", lines.join("\n"));
        let repaired = escape_string_newlines(&broken);

        assert!(!repaired.contains('\n'));
        assert_eq!(repaired.matches("\\n").count(), 199);
    }

    #[test]
    fn test_strip_incomplete_tail() {
        assert_eq!(strip_incomplete_tail("{\"a\":1, \"b\": \"unfin"), "{\"a\":1");
        assert_eq!(strip_incomplete_tail("{\"a\":1, \"b\":"), "{\"a\":1");
        assert_eq!(strip_incomplete_tail("{\"a\":1, \"b"), "{\"a\":1");
        assert_eq!(strip_incomplete_tail("[{\"a\":1},"), "[{\"a\":1}");
        assert_eq!(strip_incomplete_tail("{\"a\":1, \"b\":2}"), "{\"a\":1, \"b\":2}");
        assert_eq!(strip_incomplete_tail("[{\"id\":\"a\"},{\"id\":\"b\"}"), "[{\"id\":\"a\"},{\"id\":\"b\"}");
    }

    #[test]
    fn test_open_state_ignores_strings() {
        let state = open_state("{\"a\":[\"}]\\\"\",{");
        assert_eq!(state.stack, vec!['{', '[', '{']);
        assert!(!state.in_string);
        assert_eq!(state.closing_sequence(), "}]}");

        let state = open_state("{\"a\":\"open");
        assert!(state.in_string);
        assert_eq!(state.closing_sequence(), "\"}");
    }

    #[test]
    fn test_close_truncated() {
        assert_eq!(
            close_truncated("{\"nodes\":[{\"id\":\"a\"},{\"id\":\"b\"}"),
            "{\"nodes\":[{\"id\":\"a\"},{\"id\":\"b\"}]}"
        );
        assert_eq!(
            close_truncated("{\"nodes\":[{\"id\":\"a\"}], \"links\": [{\"source\":\"a\"}, \"tar"),
            "{\"nodes\":[{\"id\":\"a\"}], \"links\": [{\"source\":\"a\"}]}"
        );
    }

    #[test]
    fn test_matching_close() {
        let text = "\"nodes\": [{\"id\":\"]\"}, [1]] tail";
        let open = text.find('[').unwrap();
        let close = matching_close(text, open).unwrap();
        assert_eq!(&text[open..=close], "[{\"id\":\"]\"}, [1]]");

        assert_eq!(matching_close("[1, [2", 0), None);
    }
}
