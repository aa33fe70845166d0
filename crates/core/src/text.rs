//! Helpers for measuring and laying out text that may contain terminal escape sequences.

use std::sync::OnceLock;

use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

fn escape_regex() -> &'static Regex {
    static ESCAPE: OnceLock<Regex> = OnceLock::new();
    ESCAPE.get_or_init(|| Regex::new("\x1b[^m]+?m").expect("valid escape regex"))
}

fn trailing_whitespace_regex() -> &'static Regex {
    static TRAILING: OnceLock<Regex> = OnceLock::new();
    TRAILING.get_or_init(|| Regex::new("[ \t\n]+$").expect("valid trailing whitespace regex"))
}

/// Removes SGR escape sequences.
pub fn strip_ansi(text: &str) -> String {
    escape_regex().replace_all(text, "").into_owned()
}

/// Display width of `text`, not counting escape sequences.
pub fn real_len(text: &str) -> usize {
    strip_ansi(text).width()
}

/// Splits `text` into its body and its trailing spaces, tabs and newlines.
pub fn remove_capture_whitespace(text: &str) -> (&str, &str) {
    match trailing_whitespace_regex().find(text) {
        Some(found) => (&text[..found.start()], found.as_str()),
        None => (text, ""),
    }
}

/// Appends `insert` before any trailing whitespace, unless the body already ends with it.
pub fn insert_before_whitespace(text: &str, insert: &str) -> String {
    let (body, whitespace) = remove_capture_whitespace(text);
    let mut result = body.to_string();
    if !body.ends_with(insert) {
        result.push_str(insert);
    }
    result.push_str(whitespace);
    result
}

/// Greedy word wrap of a single line, measuring with [`real_len`].
///
/// A line that already fits is returned untouched. Otherwise words are packed onto lines of at
/// most `width` columns, words longer than a whole line are split, and the whitespace at each
/// break is dropped.
pub fn wrap(line: &str, width: usize) -> Vec<String> {
    if width == 0 || real_len(line) <= width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut pending_space = String::new();

    for chunk in split_chunks(line) {
        if chunk.starts_with([' ', '\t']) {
            pending_space.push_str(chunk);
            continue;
        }

        let space = std::mem::take(&mut pending_space);
        if real_len(&current) + real_len(&space) + real_len(chunk) <= width {
            current.push_str(&space);
            current.push_str(chunk);
            continue;
        }

        if real_len(chunk) <= width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(chunk);
            continue;
        }

        // Too long for any line: fill what is left of this one, then whole lines.
        let mut rest = chunk;
        let mut room = width.saturating_sub(real_len(&current) + real_len(&space));
        if room > 0 && !current.is_empty() {
            current.push_str(&space);
        } else if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            room = width;
        } else {
            room = width;
        }

        while real_len(rest) > room {
            let (head, tail) = split_at_width(rest, room);
            current.push_str(head);
            lines.push(std::mem::take(&mut current));
            rest = tail;
            room = width;
        }
        current.push_str(rest);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect()
}

/// Alternating runs of whitespace and non-whitespace.
fn split_chunks(line: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (i, c) in line.char_indices() {
        let is_space = c == ' ' || c == '\t';
        match in_space {
            Some(previous) if previous != is_space => {
                chunks.push(&line[start..i]);
                start = i;
            }
            _ => {}
        }
        in_space = Some(is_space);
    }
    if start < line.len() {
        chunks.push(&line[start..]);
    }
    chunks
}

/// Splits after at most `width` visible columns.
///
/// Escape sequences take no room and are never cut, and the head always holds at least one
/// visible character.
fn split_at_width(text: &str, width: usize) -> (&str, &str) {
    let mut used = 0;
    let mut i = 0;
    while let Some(c) = text[i..].chars().next() {
        if c == '\x1b' {
            if let Some(escape) = escape_regex().find(&text[i..]).filter(|m| m.start() == 0) {
                i += escape.end();
                continue;
            }
        }

        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
        if used > 0 && used + char_width > width {
            return text.split_at(i);
        }
        used += char_width;
        i += c.len_utf8();
    }
    (text, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_len_ignores_escapes() {
        assert_eq!(real_len("\x1b[31mred\x1b[0m"), 3);
        assert_eq!(real_len("plain"), 5);
        assert_eq!(real_len(""), 0);
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1m\x1b[4mbold\x1b[0m!"), "bold!");
    }

    #[test]
    fn test_remove_capture_whitespace() {
        assert_eq!(remove_capture_whitespace("Name?  "), ("Name?", "  "));
        assert_eq!(remove_capture_whitespace("Name?\n"), ("Name?", "\n"));
        assert_eq!(remove_capture_whitespace("Name?"), ("Name?", ""));
        assert_eq!(remove_capture_whitespace("   "), ("", "   "));
    }

    #[test]
    fn test_insert_before_whitespace() {
        assert_eq!(
            insert_before_whitespace("Continue?  ", "  (y or n)"),
            "Continue?  (y or n)  "
        );
        assert_eq!(
            insert_before_whitespace("Continue?  (y or n) ", "  (y or n)"),
            "Continue?  (y or n) "
        );
    }

    #[test]
    fn test_wrap_keeps_short_lines() {
        assert_eq!(wrap("short  line  ", 80), vec!["short  line  "]);
        assert_eq!(wrap("", 80), vec![""]);
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn test_wrap_splits_colored_long_words() {
        let word = "\x1b[31mabcdefgh\x1b[0m";
        assert_eq!(wrap(word, 4), vec!["\x1b[31mabcd", "efgh\x1b[0m"]);
        assert_eq!(
            wrap(word, 3),
            vec!["\x1b[31mabc", "def", "gh\x1b[0m"]
        );

        let lines = wrap("see \x1b[1mabcdefghij\x1b[0m now", 5);
        assert_eq!(
            lines,
            vec!["see \x1b[1ma", "bcdef", "ghij\x1b[0m", "now"]
        );
        for line in &lines {
            assert!(real_len(line) > 0 && real_len(line) <= 5, "bad line {line:?}");
            assert!(!strip_ansi(line).contains('\x1b'), "cut escape in {line:?}");
        }
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("ab cdefghij", 5), vec!["ab cd", "efghi", "j"]);
    }

    #[test]
    fn test_wrap_measures_without_escapes() {
        let colored = "\x1b[31mred\x1b[0m \x1b[32mgreen\x1b[0m";
        assert_eq!(wrap(colored, 9), vec![colored.to_string()]);
        assert_eq!(
            wrap(colored, 6),
            vec!["\x1b[31mred\x1b[0m", "\x1b[32mgreen\x1b[0m"]
        );
    }
}
