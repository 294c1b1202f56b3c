// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line helpers for the game's `key=value` configuration files
// (`decor.cfg`, `font.cfg`, `localization.cfg`).

use std::collections::BTreeMap;

/// `true` for non-empty lines starting with `#`.
pub fn is_comment_line(line: &str) -> bool {
    line.starts_with('#')
}

/// Trim spaces and tabs (not other whitespace) from both ends.
pub fn extract_value(line: &str) -> &str {
    line.trim_matches([' ', '\t'])
}

/// Text between the first `"` and the next quote that is not escaped by an
/// odd number of backslashes. Escape sequences are left in place; run
/// [`unescape`] on the result. Returns an empty string when there is no quote.
/// An unterminated value runs to the end of the line.
pub fn extract_quoted_value(line: &str) -> String {
    let Some(start) = line.find('"') else {
        return String::new();
    };
    let bytes = line.as_bytes();
    let body = start + 1;

    let mut end = bytes.len();
    for i in body..bytes.len() {
        if bytes[i] != b'"' {
            continue;
        }
        let backslashes = bytes[body..i]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        if backslashes % 2 == 0 {
            end = i;
            break;
        }
    }
    // Both boundaries sit on ASCII bytes, so the slice is valid UTF-8.
    line[body..end].to_owned()
}

/// Expand `\n`, `\t` (four spaces), `\\` and `\"`. Unknown escapes are kept
/// verbatim, a trailing lone backslash too.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push_str("    "),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Rewrite the value of `key` in place, or append `key=value`.
///
/// Keys are compared with all whitespace removed. The left-hand side and the
/// spacing after `=` of an existing line are preserved. Newlines in `value`
/// are stored as `\n` so the entry stays on one line; quoted values also
/// escape `\` and `"`, so [`extract_quoted_value`] plus [`unescape`] give
/// `value` back.
pub fn update_or_add_line(lines: &mut Vec<String>, key: &str, value: &str, quoted: bool) {
    let clean_key: String = key.chars().filter(|c| !c.is_whitespace()).collect();
    let formatted = if quoted {
        format!("\"{}\"", escape(value))
    } else {
        value.replace('\n', "\\n")
    };

    for line in lines.iter_mut() {
        if line.is_empty() || is_comment_line(line) {
            continue;
        }
        let Some(eq) = line.find('=') else {
            continue;
        };
        let left = &line[..eq];
        let current_key: String = left.chars().filter(|c| !c.is_whitespace()).collect();
        if current_key != clean_key {
            continue;
        }

        let spacing: String = line[eq + 1..]
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect();
        *line = format!("{left}={spacing}{formatted}");
        return;
    }

    lines.push(format!("{key}={formatted}"));
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// `name=true|false` lines to a map. Anything but the literal `true` is
/// `false`; comment lines and lines without `=` are skipped.
pub fn parse_toggles<S: AsRef<str>>(lines: &[S]) -> BTreeMap<String, bool> {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !is_comment_line(line))
        .filter_map(|line| line.split_once('='))
        .map(|(name, value)| (name.to_owned(), value == "true"))
        .collect()
}
