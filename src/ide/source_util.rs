//! Lexical helpers for completion.
//!
//! Completion does not consult the syntax tree: a half-typed line is
//! exactly where the tree is least reliable. These helpers work on the
//! raw text instead.

use rustc_hash::FxHashSet;

/// The contiguous block of non-blank lines around `line_no`, stopping
/// at comment lines on either side.
pub fn consecutive_block_at_line(code: &str, line_no: usize) -> String {
    let code_lines: Vec<&str> = code.lines().collect();
    if line_no >= code_lines.len() {
        return String::new();
    }
    let mut start = line_no;
    while start > 0 && !code_lines[start - 1].is_empty() {
        let stripped = code_lines[start - 1].trim();
        if stripped.starts_with("//") || stripped.ends_with("*/") {
            break;
        }
        start -= 1;
    }
    let mut end = line_no;
    while end + 1 < code_lines.len() && !code_lines[end + 1].is_empty() {
        let stripped = code_lines[end + 1].trim();
        if stripped.starts_with("//") || stripped.starts_with("/*") {
            break;
        }
        end += 1;
    }
    code_lines[start..=end].join("\n")
}

/// Distinct identifier-like words in the block around `line_no`.
pub fn words_in_block(code: &str, line_no: usize) -> FxHashSet<String> {
    let block = consecutive_block_at_line(code, line_no);
    block
        .split(|c: char| !is_word_char(c))
        .filter(|word| !word.is_empty())
        .map(|word| word.to_string())
        .collect()
}

fn is_word_char(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}

/// Running bracket depth per line and character, for parentheses and
/// braces separately.
///
/// Each line carries at least one value: the depth at the "beginning"
/// of the line before any character, which is the depth carried in
/// from the previous line. This keeps empty lines addressable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketDepths {
    lines: Vec<Vec<(i32, i32)>>,
}

impl BracketDepths {
    pub fn of(code: &str) -> Self {
        let mut lines = Vec::new();
        let mut paren = 0i32;
        let mut brace = 0i32;
        for line in code.lines() {
            let mut depths = vec![(paren, brace)];
            for c in line.chars() {
                match c {
                    '(' => paren += 1,
                    ')' => paren -= 1,
                    '{' => brace += 1,
                    '}' => brace -= 1,
                    _ => {}
                }
                depths.push((paren, brace));
            }
            lines.push(depths);
        }
        Self { lines }
    }

    /// Depth pair before the character at `(line, character)`.
    pub fn at(&self, line: usize, character: usize) -> Option<(i32, i32)> {
        self.lines.get(line)?.get(character).copied()
    }

    pub fn is_zero_at(&self, line: usize, character: usize) -> bool {
        self.at(line, character) == Some((0, 0))
    }
}

/// The whitespace-delimited token before the cursor, skipping the
/// partial token the cursor is in the middle of: scan backward over a
/// run of non-whitespace, then a run of whitespace, then collect the
/// token.
pub fn token_before(code: &str, line_no: usize, char_no: usize) -> String {
    let chars: Vec<char> = code.chars().collect();
    let mut offset = 0usize;
    for (i, line) in code.split_inclusive('\n').enumerate() {
        if i == line_no {
            break;
        }
        offset += line.chars().count();
    }
    let mut j = (offset + char_no).min(chars.len()) as isize - 1;

    while j > -1 && !chars[j as usize].is_whitespace() {
        j -= 1;
    }
    while j > -1 && chars[j as usize].is_whitespace() {
        j -= 1;
    }

    let mut word_chars = Vec::new();
    while j > -1 && !chars[j as usize].is_whitespace() {
        word_chars.push(chars[j as usize]);
        j -= 1;
    }
    word_chars.reverse();
    word_chars.into_iter().collect()
}
